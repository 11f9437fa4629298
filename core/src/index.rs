use crate::config::IndexConfig;
use crate::error::IndexError;
use crate::term_table::TermTable;
use serde::{Deserialize, Serialize};

pub type DocId = u32;

/// Display metadata resolved for a document outside the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocMeta {
    pub title: String,
    pub url: Option<String>,
}

/// Sorted term dictionary with parallel postings lists.
///
/// `terms` is strictly ascending by byte value and every postings list is
/// strictly ascending, so lookups are a binary search and the set operations
/// can walk lists with two cursors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvertedIndex {
    terms: Vec<String>,
    postings: Vec<Vec<DocId>>,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    /// Trusts the caller that `terms` is already sorted, as the on-disk reader does.
    pub fn from_sorted_parts(terms: Vec<String>, postings: Vec<Vec<DocId>>) -> Self {
        debug_assert_eq!(terms.len(), postings.len());
        Self { terms, postings }
    }

    pub fn len(&self) -> usize { self.terms.len() }
    pub fn is_empty(&self) -> bool { self.terms.is_empty() }
    pub fn terms(&self) -> &[String] { &self.terms }

    /// Postings for an exact term; unknown terms give an empty slice.
    pub fn postings(&self, term: &str) -> &[DocId] {
        match self.terms.binary_search_by(|t| t.as_bytes().cmp(term.as_bytes())) {
            Ok(i) => self.postings[i].as_slice(),
            Err(_) => &[],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[DocId])> {
        self.terms.iter().map(String::as_str).zip(self.postings.iter().map(Vec::as_slice))
    }

    /// Dictionary strictly ascending, postings non-empty and strictly ascending.
    pub fn is_well_formed(&self) -> bool {
        self.terms.len() == self.postings.len()
            && self.terms.windows(2).all(|w| w[0] < w[1])
            && self.postings.iter().all(|p| !p.is_empty() && p.windows(2).all(|w| w[0] < w[1]))
    }

    /// Number of distinct document ids across all postings.
    pub fn num_docs(&self) -> usize {
        let mut ids: Vec<DocId> = self.postings.iter().flatten().copied().collect();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }
}

/// Accumulates per-document stems into term postings.
pub struct IndexBuilder {
    table: TermTable,
    terms: Vec<String>,
    postings: Vec<Vec<DocId>>,
    documents: usize,
}

impl IndexBuilder {
    pub fn new(config: &IndexConfig) -> Self {
        Self {
            table: TermTable::with_capacity(config.initial_table_capacity, config.max_load_factor),
            terms: Vec::new(),
            postings: Vec::new(),
            documents: 0,
        }
    }

    pub fn documents(&self) -> usize { self.documents }
    pub fn distinct_terms(&self) -> usize { self.terms.len() }

    /// Add one document's stems; repeated stems count once.
    pub fn add_document(&mut self, doc_id: DocId, mut stems: Vec<String>) -> Result<(), IndexError> {
        if stems.is_empty() {
            return Ok(());
        }
        stems.sort();
        stems.dedup();
        for term in stems {
            match self.table.get(&term) {
                Some(slot) => self.postings[slot].push(doc_id),
                None => {
                    let slot = self.terms.len();
                    self.table.insert(term.clone(), slot)?;
                    self.terms.push(term);
                    self.postings.push(vec![doc_id]);
                }
            }
        }
        self.documents += 1;
        Ok(())
    }

    /// Co-sort terms with their postings, then sort and dedup every postings list.
    pub fn finish(self) -> InvertedIndex {
        let mut entries: Vec<(String, Vec<DocId>)> = self.terms.into_iter().zip(self.postings).collect();
        entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

        let mut terms = Vec::with_capacity(entries.len());
        let mut postings = Vec::with_capacity(entries.len());
        for (term, mut list) in entries {
            list.sort_unstable();
            list.dedup();
            if list.is_empty() { continue; }
            terms.push(term);
            postings.push(list);
        }
        InvertedIndex { terms, postings }
    }
}

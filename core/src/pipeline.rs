//! Batch stages: documents -> token files -> stem files -> inverted index.
//!
//! Each stage consumes its whole input directory before the next one starts.
//! Tokenizing and stemming are per-document and run on the rayon pool; the
//! index build reads stem files in parallel but funnels every insert through
//! one lock, since the term table is not safe to probe concurrently.

use crate::config::IndexConfig;
use crate::persist::{list_numbered_files, numbered_file, read_bytes, read_lines, write_lines, STEMS_EXT, TOKENS_EXT, DOCS_EXT};
use crate::stemmer::StemFilter;
use crate::tokenizer::Tokenizer;
use crate::{DocId, IndexBuilder, InvertedIndex};
use anyhow::Result;
use parking_lot::Mutex;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

const PROGRESS_EVERY: usize = 1000;

#[derive(Debug, Default, Clone)]
pub struct StageStats {
    pub documents: usize,
    /// Documents that produced nothing and were not written.
    pub skipped: usize,
    pub failed: usize,
    pub items: u64,
    pub item_chars: u64,
    pub input_bytes: u64,
    pub elapsed: Duration,
}

impl StageStats {
    pub fn avg_item_chars(&self) -> f64 {
        if self.items == 0 { 0.0 } else { self.item_chars as f64 / self.items as f64 }
    }

    pub fn kib_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 { self.input_bytes as f64 / 1024.0 / secs } else { 0.0 }
    }
}

#[derive(Default)]
struct Counters {
    documents: AtomicUsize,
    skipped: AtomicUsize,
    failed: AtomicUsize,
    items: AtomicU64,
    item_chars: AtomicU64,
    input_bytes: AtomicU64,
}

impl Counters {
    fn record(&self, items: &[String], input_bytes: usize, started: Instant, stage: &str) {
        self.items.fetch_add(items.len() as u64, Ordering::Relaxed);
        self.item_chars.fetch_add(items.iter().map(|t| t.chars().count() as u64).sum(), Ordering::Relaxed);
        let total_bytes = self.input_bytes.fetch_add(input_bytes as u64, Ordering::Relaxed) + input_bytes as u64;
        let done = self.documents.fetch_add(1, Ordering::Relaxed) + 1;
        if done % PROGRESS_EVERY == 0 {
            let secs = started.elapsed().as_secs_f64();
            let kib_s = if secs > 0.0 { total_bytes as f64 / 1024.0 / secs } else { 0.0 };
            tracing::info!(stage, documents = done, items = self.items.load(Ordering::Relaxed), kib_s, "progress");
        }
    }

    fn into_stats(self, started: Instant) -> StageStats {
        StageStats {
            documents: self.documents.into_inner(),
            skipped: self.skipped.into_inner(),
            failed: self.failed.into_inner(),
            items: self.items.into_inner(),
            item_chars: self.item_chars.into_inner(),
            input_bytes: self.input_bytes.into_inner(),
            elapsed: started.elapsed(),
        }
    }
}

/// Tokenize every `<id>.txt` under `docs_dir` into `<tokens_dir>/<id>.tokens`.
pub fn tokenize_corpus(docs_dir: &Path, tokens_dir: &Path, tokenizer: &Tokenizer) -> Result<StageStats> {
    let docs = list_numbered_files(docs_dir, DOCS_EXT)?;
    std::fs::create_dir_all(tokens_dir)?;
    let started = Instant::now();
    let counters = Counters::default();

    docs.par_iter().for_each(|(doc_id, path)| {
        match tokenize_document(*doc_id, path, tokens_dir, tokenizer) {
            Ok(Some((tokens, bytes))) => counters.record(&tokens, bytes, started, "tokenize"),
            Ok(None) => { counters.skipped.fetch_add(1, Ordering::Relaxed); }
            Err(err) => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(doc_id, error = %err, "tokenizing document failed");
            }
        }
    });

    let stats = counters.into_stats(started);
    tracing::info!(
        documents = stats.documents,
        skipped = stats.skipped,
        failed = stats.failed,
        tokens = stats.items,
        avg_token_chars = stats.avg_item_chars(),
        kib_s = stats.kib_per_sec(),
        elapsed_s = stats.elapsed.as_secs_f64(),
        "tokenization complete"
    );
    Ok(stats)
}

fn tokenize_document(doc_id: DocId, path: &Path, tokens_dir: &Path, tokenizer: &Tokenizer) -> Result<Option<(Vec<String>, usize)>> {
    let text = read_bytes(path)?;
    if text.is_empty() {
        return Ok(None);
    }
    let tokens = tokenizer.tokenize(&text);
    if tokens.is_empty() {
        tracing::debug!(doc_id, "no tokens, document not written");
        return Ok(None);
    }
    write_lines(&numbered_file(tokens_dir, doc_id, TOKENS_EXT), &tokens)?;
    Ok(Some((tokens, text.len())))
}

/// Stem every `<id>.tokens` under `tokens_dir` into `<stems_dir>/<id>.stems`.
pub fn stem_corpus(tokens_dir: &Path, stems_dir: &Path, filter: &StemFilter) -> Result<StageStats> {
    let files = list_numbered_files(tokens_dir, TOKENS_EXT)?;
    std::fs::create_dir_all(stems_dir)?;
    let started = Instant::now();
    let counters = Counters::default();

    files.par_iter().for_each(|(doc_id, path)| {
        let result = (|| -> Result<(Vec<String>, usize)> {
            let bytes = std::fs::metadata(path)?.len() as usize;
            let tokens = read_lines(path)?;
            let stems = filter.stem_tokens(&tokens);
            write_lines(&numbered_file(stems_dir, *doc_id, STEMS_EXT), &stems)?;
            Ok((stems, bytes))
        })();
        match result {
            Ok((stems, bytes)) => counters.record(&stems, bytes, started, "stem"),
            Err(err) => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(doc_id, error = %err, "stemming document failed");
            }
        }
    });

    let stats = counters.into_stats(started);
    tracing::info!(
        files = stats.documents,
        failed = stats.failed,
        stems = stats.items,
        mib_s = stats.kib_per_sec() / 1024.0,
        elapsed_s = stats.elapsed.as_secs_f64(),
        "stemming complete"
    );
    Ok(stats)
}

/// Build the inverted index from every `<id>.stems` under `stems_dir`.
///
/// Unreadable stem files are logged and skipped; an exhausted term table aborts the build.
pub fn build_index(stems_dir: &Path, config: &IndexConfig) -> Result<InvertedIndex> {
    let files = list_numbered_files(stems_dir, STEMS_EXT)?;
    let started = Instant::now();
    let builder = Mutex::new(IndexBuilder::new(config));

    files.par_iter().try_for_each(|(doc_id, path): &(DocId, PathBuf)| -> Result<()> {
        let stems = match read_lines(path) {
            Ok(stems) => stems,
            Err(err) => {
                tracing::warn!(doc_id, error = %err, "stem file skipped");
                return Ok(());
            }
        };
        if stems.is_empty() {
            return Ok(());
        }
        let mut builder = builder.lock();
        builder.add_document(*doc_id, stems)?;
        let done = builder.documents();
        if done % PROGRESS_EVERY == 0 {
            tracing::info!(documents = done, terms = builder.distinct_terms(), "indexing progress");
        }
        Ok(())
    })?;

    let builder = builder.into_inner();
    let documents = builder.documents();
    let index = builder.finish();
    tracing::info!(
        documents,
        terms = index.len(),
        elapsed_s = started.elapsed().as_secs_f64(),
        "index build complete"
    );
    Ok(index)
}

/// Token counts over a corpus, ranked by frequency.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TermFrequencies {
    pub total: u64,
    /// Most frequent first; ties ordered by term bytes.
    pub ranked: Vec<(String, u64)>,
}

impl TermFrequencies {
    pub fn unique(&self) -> usize { self.ranked.len() }
}

pub fn count_terms<I, S>(tokens: I) -> TermFrequencies
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut counts: HashMap<String, u64> = HashMap::new();
    let mut total = 0u64;
    for token in tokens {
        let token = token.as_ref().trim();
        if token.is_empty() { continue; }
        total += 1;
        *counts.entry(token.to_string()).or_insert(0) += 1;
    }
    let mut ranked: Vec<(String, u64)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.as_bytes().cmp(b.0.as_bytes())));
    TermFrequencies { total, ranked }
}

/// Rank/frequency table over every `<id>.tokens` under `tokens_dir`.
pub fn corpus_frequencies(tokens_dir: &Path) -> Result<TermFrequencies> {
    let files = list_numbered_files(tokens_dir, TOKENS_EXT)?;
    let tokens: Vec<String> = files
        .par_iter()
        .filter_map(|(doc_id, path)| match read_lines(path) {
            Ok(lines) => Some(lines),
            Err(err) => {
                tracing::warn!(doc_id, error = %err, "token file skipped");
                None
            }
        })
        .flatten()
        .collect();
    let freqs = count_terms(&tokens);
    tracing::info!(files = files.len(), total = freqs.total, unique = freqs.unique(), "token statistics");
    Ok(freqs)
}

/// A few entries from the middle of the dictionary, for eyeballing a fresh build.
pub fn sample_entries(index: &InvertedIndex, count: usize) -> Vec<String> {
    let n = index.len();
    let start = if n > count { n / 2 - count / 2 } else { 0 };
    index
        .iter()
        .skip(start)
        .take(count)
        .map(|(term, ids)| {
            let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
            format!("{term}: {}", ids.join(","))
        })
        .collect()
}

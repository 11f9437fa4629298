use crate::error::QueryError;
use crate::setops::{difference, intersect, union};
use crate::{DocId, InvertedIndex};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

/// A boolean query over at most two terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Term(String),
    And(String, String),
    Or(String, String),
    AndNot(String, String),
}

impl Query {
    /// Accepts `t`, `t and t`, `t or t` and `t and not t`, operators in any case.
    pub fn parse(input: &str) -> Result<Self, QueryError> {
        let normalized: String = input.nfc().collect();
        let tokens: Vec<String> = normalized.split_whitespace().map(str::to_lowercase).collect();
        let words: Vec<&str> = tokens.iter().map(String::as_str).collect();
        match words.as_slice() {
            [] => Err(QueryError::Empty),
            [t] => Ok(Query::Term(t.to_string())),
            [a, "and", b] => Ok(Query::And(a.to_string(), b.to_string())),
            [a, "or", b] => Ok(Query::Or(a.to_string(), b.to_string())),
            [a, "and", "not", b] => Ok(Query::AndNot(a.to_string(), b.to_string())),
            _ => Err(QueryError::Unsupported(input.trim().to_string())),
        }
    }

    /// Matching document ids, ascending.
    pub fn execute(&self, index: &InvertedIndex) -> Vec<DocId> {
        match self {
            Query::Term(t) => index.postings(t).to_vec(),
            Query::And(a, b) => intersect(index.postings(a), index.postings(b)),
            Query::Or(a, b) => union(index.postings(a), index.postings(b)),
            Query::AndNot(a, b) => difference(index.postings(a), index.postings(b)),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Term(t) => write!(f, "{t}"),
            Query::And(a, b) => write!(f, "{a} AND {b}"),
            Query::Or(a, b) => write!(f, "{a} OR {b}"),
            Query::AndNot(a, b) => write!(f, "{a} AND NOT {b}"),
        }
    }
}

/// Parse and run in one step.
pub fn search(index: &InvertedIndex, input: &str) -> Result<Vec<DocId>, QueryError> {
    let query = Query::parse(input)?;
    let ids = query.execute(index);
    tracing::debug!(query = %query, hits = ids.len(), "query executed");
    Ok(ids)
}

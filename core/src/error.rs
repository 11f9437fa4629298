//! Error types shared by the indexing pipeline and the query engine.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building the inverted index.
#[derive(Debug, Clone, Error)]
pub enum IndexError {
    /// Every slot of the term table was probed without finding room for the key
    #[error("term table exhausted: {capacity} slots probed for {key:?}")]
    CapacityExhausted { capacity: usize, key: String },
}

/// Errors raised while parsing a boolean query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("empty query")]
    Empty,
    /// Query does not have one of the shapes `t`, `t and t`, `t or t`, `t and not t`
    #[error("unsupported query: {0}")]
    Unsupported(String),
}

/// Setup errors that make a pipeline run pointless.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("input directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),
    #[error("index file not found: {}", .0.display())]
    MissingIndex(PathBuf),
}

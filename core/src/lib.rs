pub mod config;
pub mod error;
pub mod index;
pub mod metadata;
pub mod persist;
pub mod pipeline;
pub mod query;
pub mod setops;
pub mod stemmer;
pub mod term_table;
pub mod tokenizer;

pub use index::*;

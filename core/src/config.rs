use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Limits applied while scanning raw document text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    /// Input is cut to this many bytes before scanning.
    pub max_text_bytes: usize,
    /// Longest accepted word, in code points.
    pub max_word_chars: usize,
    pub max_number_digits: usize,
    /// Letters required on each side of an internal hyphen.
    pub min_hyphen_side_letters: usize,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self { max_text_bytes: 100_000, max_word_chars: 20, max_number_digits: 4, min_hyphen_side_letters: 2 }
    }
}

/// Length thresholds for the stemmer, all measured in code points.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StemmerConfig {
    pub min_special_stem_chars: usize,
    pub min_suffix_stem_chars: usize,
    /// Stems shorter than this are dropped from the stem file.
    pub min_kept_stem_chars: usize,
    pub remove_stopwords: bool,
}

impl Default for StemmerConfig {
    fn default() -> Self {
        Self { min_special_stem_chars: 2, min_suffix_stem_chars: 3, min_kept_stem_chars: 2, remove_stopwords: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub initial_table_capacity: usize,
    pub max_load_factor: f64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self { initial_table_capacity: 1 << 16, max_load_factor: 0.7 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub tokenizer: TokenizerConfig,
    pub stemmer: StemmerConfig,
    pub index: IndexConfig,
}

impl PipelineConfig {
    /// Read a JSON config file; missing sections and fields keep their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
        let cfg: PipelineConfig = serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))?;
        Ok(cfg)
    }

    /// Defaults when no path is given.
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: PipelineConfig = serde_json::from_str(r#"{"stemmer":{"min_suffix_stem_chars":2}}"#).unwrap();
        assert_eq!(cfg.stemmer.min_suffix_stem_chars, 2);
        assert_eq!(cfg.stemmer.min_special_stem_chars, 2);
        assert_eq!(cfg.tokenizer.max_text_bytes, 100_000);
        assert_eq!(cfg.index.initial_table_capacity, 1 << 16);
    }
}

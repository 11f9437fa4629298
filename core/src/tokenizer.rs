use crate::config::TokenizerConfig;
use std::collections::HashMap;

/// Known abbreviations keyed by their case-folded form.
#[derive(Debug, Clone, Default)]
pub struct Abbreviations {
    by_folded: HashMap<String, String>,
}

impl Abbreviations {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut by_folded = HashMap::new();
        for entry in entries {
            let canonical: String = entry.into();
            let canonical = canonical.trim().to_string();
            if canonical.is_empty() { continue; }
            // first listed spelling wins
            by_folded.entry(fold_lower(&canonical)).or_insert(canonical);
        }
        Self { by_folded }
    }

    /// Canonical spelling for `run`, matched case-insensitively.
    pub fn lookup(&self, run: &str) -> Option<&str> {
        self.by_folded.get(&fold_lower(run)).map(String::as_str)
    }

    pub fn len(&self) -> usize { self.by_folded.len() }
    pub fn is_empty(&self) -> bool { self.by_folded.is_empty() }
}

pub struct Tokenizer {
    config: TokenizerConfig,
    abbreviations: Abbreviations,
}

impl Tokenizer {
    pub fn new(config: TokenizerConfig, abbreviations: Abbreviations) -> Self {
        Self { config, abbreviations }
    }

    /// Split raw UTF-8 bytes into normalized tokens, in input order.
    ///
    /// Word characters are ASCII alphanumerics, `-` and two-byte Cyrillic
    /// sequences (`0xD0`/`0xD1` lead byte); every other byte ends the current
    /// run. Runs matching a known abbreviation are emitted in canonical form,
    /// everything else is lowercased and validated. Invalid runs are dropped.
    pub fn tokenize(&self, text: &[u8]) -> Vec<String> {
        let text = &text[..text.len().min(self.config.max_text_bytes)];
        let mut tokens = Vec::new();
        let mut run: Vec<u8> = Vec::new();
        let mut i = 0;
        while i < text.len() {
            let c = text[i];
            let next = text.get(i + 1).copied().unwrap_or(0);
            if is_word_byte(c, next) {
                if c < 0x80 {
                    run.push(c);
                    i += 1;
                } else {
                    run.push(c);
                    run.push(next);
                    i += 2;
                }
            } else {
                self.flush(&mut run, &mut tokens);
                i += 1;
            }
        }
        self.flush(&mut run, &mut tokens);
        tokens
    }

    pub fn tokenize_str(&self, text: &str) -> Vec<String> {
        self.tokenize(text.as_bytes())
    }

    fn flush(&self, run: &mut Vec<u8>, tokens: &mut Vec<String>) {
        if run.is_empty() { return; }
        let candidate = std::str::from_utf8(run).ok().map(|s| s.trim_matches('-'));
        if let Some(candidate) = candidate.filter(|s| !s.is_empty()) {
            if let Some(abbrev) = self.abbreviations.lookup(candidate) {
                tokens.push(abbrev.to_string());
            } else {
                let lower = fold_lower(candidate);
                if self.is_valid_token(&lower) {
                    tokens.push(lower);
                }
            }
        }
        run.clear();
    }

    pub fn is_valid_token(&self, token: &str) -> bool {
        is_pure_number(token, self.config.max_number_digits) || self.is_valid_word(token)
    }

    /// Cyrillic letters with at most one internal hyphen.
    fn is_valid_word(&self, word: &str) -> bool {
        if word.is_empty() || word.chars().count() > self.config.max_word_chars {
            return false;
        }
        if has_excessive_repeats(word) {
            return false;
        }
        if !word.chars().all(|c| c == '-' || is_cyrillic_letter(c)) {
            return false;
        }
        let mut parts = word.split('-');
        let left = parts.next().unwrap_or("");
        match (parts.next(), parts.next()) {
            (None, _) => true,
            (Some(right), None) => {
                let min = self.config.min_hyphen_side_letters.max(1);
                left.chars().count() >= min && right.chars().count() >= min
            }
            _ => false,
        }
    }
}

fn is_word_byte(c: u8, next: u8) -> bool {
    if c < 0x80 {
        return c.is_ascii_alphanumeric() || c == b'-';
    }
    (c == 0xD0 || c == 0xD1) && (0x80..=0xBF).contains(&next)
}

/// `А`..`я` plus the extended block up to `џ`, which includes `ё`.
fn is_cyrillic_letter(c: char) -> bool {
    ('\u{0410}'..='\u{045F}').contains(&c)
}

fn is_pure_number(s: &str, max_digits: usize) -> bool {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    s == "0" || (!s.starts_with('0') && s.len() <= max_digits)
}

/// Three or more identical characters in a row. A hyphen breaks a run.
fn has_excessive_repeats(s: &str) -> bool {
    let mut prev: Option<char> = None;
    let mut count = 0;
    for c in s.chars() {
        if c == '-' {
            prev = None;
            count = 0;
            continue;
        }
        if Some(c) == prev {
            count += 1;
            if count >= 3 { return true; }
        } else {
            prev = Some(c);
            count = 1;
        }
    }
    false
}

/// Lowercase ASCII and Russian Cyrillic, including `Ё` -> `ё`. Other characters pass through.
pub fn fold_lower(s: &str) -> String {
    s.chars().map(fold_char).collect()
}

fn fold_char(c: char) -> char {
    match c {
        'A'..='Z' => c.to_ascii_lowercase(),
        'А'..='Я' => char::from_u32(c as u32 + 0x20).unwrap_or(c),
        'Ё' => 'ё',
        _ => c,
    }
}

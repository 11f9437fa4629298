use crate::config::StemmerConfig;
use lazy_static::lazy_static;
use std::collections::HashSet;

/// Irregular words returned untouched.
const EXCEPTIONS: &[&str] = &[
    "быть", "есть", "мочь", "хотеть", "знать", "идти", "дать", "видеть", "думать", "сказать",
];

/// Tried in table order; the first rule whose result is long enough wins.
const SPECIAL_RULES: &[(&str, &str)] = &[
    ("ирование", "ир"),
    ("ование", "ир"),
    ("ание", ""),
    ("ение", ""),
    ("ться", ""),
    ("иться", ""),
    ("тель", ""),
    ("ник", ""),
    ("щик", ""),
    ("ция", "ц"),
    ("ки", "к"),
    ("ка", "к"),
    ("ала", ""),
    ("онный", "он"),
    ("нный", "н"),
    ("ия", ""),
    ("ие", ""),
    ("ающ", ""),
    ("ющ", ""),
];

const REFLEXIVE_SUFFIXES: &[&str] = &["ся", "сь"];
const INFINITIVE_MARKER: &str = "ть";

/// Verb, participle, adjective and noun endings.
const SUFFIXES: &[&str] = &[
    "ующийся", "ующаяся", "ующееся", "ющиеся",
    "овавшийся", "евавшийся", "ивавшийся",
    "оваться", "еваться", "иваться",
    "ующий", "ующая", "ующее", "ющих",
    "емый", "емая", "емое", "емыми",
    "имый", "имая", "имое", "имыми",
    "ивший", "ившая", "ившее", "ившие",
    "ывший", "ывшая", "ывшее", "ывшие",
    "вший", "вшая", "вшее", "вшие",
    "анный", "янный", "енный", "онный",
    "аешь", "аете", "ается", "аются", "ающий", "ающая", "ающее", "ающие",
    "ишь", "ите", "ится", "ятся", "ищий", "ищая", "ищее", "ищие",
    "ешь", "ете", "ется", "ются", "ющий", "ющая", "ущее", "ющие",
    "ить", "еть", "ать", "ять", "уть", "оть",
    "ит", "ет", "ат", "ят", "ут", "ют",
    "ла", "ло", "ли", "ал", "ял", "ил", "ел", "ол",
    "ем", "ом", "им", "ым",
    "ость", "ости", "остью", "остей",
    "ство", "ства", "ству", "ством",
    "альный", "ельный", "ильный", "ольный",
    "ий", "ая", "ое", "ые", "ой", "ый", "ью",
    "его", "ему", "ими",
    "ого", "ому", "ыми", "ых", "их",
    "а", "у", "ы", "о", "е", "и", "ь", "я", "й", "ю",
];

lazy_static! {
    /// `SUFFIXES` ordered longest first; equal lengths keep table order.
    static ref SUFFIXES_BY_LENGTH: Vec<&'static str> = {
        let mut v: Vec<&'static str> = Vec::with_capacity(SUFFIXES.len());
        for &s in SUFFIXES {
            if !v.contains(&s) { v.push(s); }
        }
        v.sort_by(|a, b| char_len(b).cmp(&char_len(a)));
        v
    };
}

fn char_len(s: &str) -> usize { s.chars().count() }

/// Greedy single-pass affix stripper for Russian surface forms.
pub struct Stemmer {
    config: StemmerConfig,
}

impl Stemmer {
    pub fn new(config: StemmerConfig) -> Self { Self { config } }

    pub fn is_exception(word: &str) -> bool { EXCEPTIONS.contains(&word) }

    pub fn stem(&self, word: &str) -> String {
        if char_len(word) < 3 || Self::is_exception(word) {
            return word.to_string();
        }

        for (suffix, replacement) in SPECIAL_RULES {
            if let Some(base) = word.strip_suffix(suffix) {
                if char_len(base) + char_len(replacement) >= self.config.min_special_stem_chars {
                    return format!("{base}{replacement}");
                }
            }
        }

        let mut w = word;
        if let Some(base) = REFLEXIVE_SUFFIXES.iter().find_map(|s| w.strip_suffix(s)) {
            if char_len(base) >= 2 {
                w = base;
                if let Some(inf) = w.strip_suffix(INFINITIVE_MARKER) {
                    if char_len(inf) >= 2 { w = inf; }
                }
            }
        }

        let min = self.config.min_suffix_stem_chars;
        for suffix in SUFFIXES_BY_LENGTH.iter() {
            if let Some(base) = w.strip_suffix(suffix) {
                if char_len(base) >= min {
                    return base.to_string();
                }
            }
        }
        w.to_string()
    }
}

/// Turns a document's tokens into the stems that go into its stem file.
pub struct StemFilter {
    stemmer: Stemmer,
    stopwords: HashSet<String>,
}

impl StemFilter {
    pub fn new(stemmer: Stemmer, stopwords: HashSet<String>) -> Self {
        Self { stemmer, stopwords }
    }

    /// `None` when the token or its stem is a stop-word, or the stem is too short.
    pub fn stem_token(&self, token: &str) -> Option<String> {
        let filter_stops = self.stemmer.config.remove_stopwords;
        if filter_stops && self.stopwords.contains(token) {
            return None;
        }
        let stem = self.stemmer.stem(token);
        if char_len(&stem) < self.stemmer.config.min_kept_stem_chars {
            return None;
        }
        if filter_stops && self.stopwords.contains(&stem) {
            return None;
        }
        Some(stem)
    }

    pub fn stem_tokens<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<String> {
        tokens.iter().filter_map(|t| self.stem_token(t.as_ref())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stemmer() -> Stemmer { Stemmer::new(StemmerConfig::default()) }

    #[test]
    fn known_forms() {
        let s = stemmer();
        let cases = [
            ("кошки", "кошк"),
            ("собаки", "собак"),
            ("играют", "игра"),
            ("операция", "операц"),
            ("программирование", "программир"),
            ("формирование", "формир"),
            ("читать", "чит"),
            ("читаешь", "чит"),
            ("делать", "дел"),
            ("говорить", "говор"),
            ("красивый", "красив"),
            ("красивая", "красив"),
            ("хороший", "хорош"),
            ("хорошие", "хорош"),
            ("читающий", "чит"),
            ("работала", "работ"),
            ("операционный", "операцион"),
            ("активность", "активн"),
            ("равенство", "равен"),
            ("читатель", "чита"),
            ("работник", "работ"),
            ("мыться", "мы"),
            ("готовиться", "готови"),
        ];
        for (word, expected) in cases {
            assert_eq!(s.stem(word), expected, "stem({word})");
        }
    }

    #[test]
    fn exceptions_and_short_words_unchanged() {
        let s = stemmer();
        for w in ["быть", "мочь", "сказать", "он", "я", "42"] {
            assert_eq!(s.stem(w), w);
        }
    }

    #[test]
    fn too_short_special_rule_falls_through_to_later_rule() {
        // "ание" would leave only "д"; "ие" further down the table applies
        assert_eq!(stemmer().stem("дание"), "дан");
    }

    #[test]
    fn reflexive_then_suffix_table() {
        // "ся" goes, then "ет" from the suffix table
        assert_eq!(stemmer().stem("смеется"), "сме");
        assert_eq!(stemmer().stem("умывались"), "умыва");
    }

    #[test]
    fn suffixes_sorted_longest_first() {
        let lens: Vec<usize> = SUFFIXES_BY_LENGTH.iter().map(|s| char_len(s)).collect();
        assert!(lens.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(SUFFIXES_BY_LENGTH[0], "овавшийся");
    }

    #[test]
    fn filter_drops_stopwords_and_short_stems() {
        let stops: HashSet<String> = ["на", "это"].iter().map(|s| s.to_string()).collect();
        let f = StemFilter::new(stemmer(), stops);
        let out = f.stem_tokens(&["кошки", "на", "это", "я", "собаки"]);
        assert_eq!(out, vec!["кошк", "собак"]);
    }

    #[test]
    fn filter_can_keep_stopwords() {
        let cfg = StemmerConfig { remove_stopwords: false, ..StemmerConfig::default() };
        let stops: HashSet<String> = ["на"].iter().map(|s| s.to_string()).collect();
        let f = StemFilter::new(Stemmer::new(cfg), stops);
        assert_eq!(f.stem_tokens(&["на"]), vec!["на"]);
    }
}

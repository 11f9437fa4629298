use textindex::config::TokenizerConfig;
use textindex::tokenizer::{Abbreviations, Tokenizer};

fn tokenizer() -> Tokenizer {
    Tokenizer::new(TokenizerConfig::default(), Abbreviations::new(["США", "МГУ", "IT"]))
}

#[test]
fn it_normalizes_case_and_yo() {
    let toks = tokenizer().tokenize_str("Ёжик ВЫШЕЛ из ТУМАНА.");
    assert_eq!(toks, vec!["ёжик", "вышел", "из", "тумана"]);
}

#[test]
fn it_drops_invalid_runs_silently() {
    let toks = tokenizer().tokenize_str("abc 12345 01 ааааа ok-ок 1999 нормально");
    assert_eq!(toks, vec!["1999", "нормально"]);
}

#[test]
fn it_is_idempotent_on_its_own_output() {
    let t = tokenizer();
    let text = "В 2023 году студенты МГУ и сша-шники обсуждали IT-проекты, кто-то — по-русски, кто-то нет!";
    let first = t.tokenize_str(text);
    assert!(!first.is_empty());
    let second = t.tokenize_str(&first.join("\n"));
    assert_eq!(first, second);
}

#[test]
fn it_handles_invalid_utf8_as_delimiters() {
    let mut bytes = "кот".as_bytes().to_vec();
    bytes.extend_from_slice(&[0xFF, 0xD0]);
    bytes.extend_from_slice("пёс".as_bytes());
    bytes.push(0xD1);
    assert_eq!(tokenizer().tokenize(&bytes), vec!["кот", "пёс"]);
}

#[test]
fn it_caps_input_length() {
    let text = "слово ".repeat(50_000);
    let toks = tokenizer().tokenize_str(&text);
    // 11 bytes per "слово ": 9090 whole repeats, then a last "слово" ending right at the cut
    assert_eq!(toks.len(), 9091);
}

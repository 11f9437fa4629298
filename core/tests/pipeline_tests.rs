use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tempfile::tempdir;
use textindex::config::PipelineConfig;
use textindex::error::PipelineError;
use textindex::persist::{load_index, read_lines, save_index, IndexPaths};
use textindex::pipeline::{build_index, sample_entries, stem_corpus, tokenize_corpus};
use textindex::query::search;
use textindex::stemmer::{StemFilter, Stemmer};
use textindex::tokenizer::{Abbreviations, Tokenizer};
use textindex::InvertedIndex;

fn write_docs(dir: &Path, docs: &[(&str, &str)]) {
    fs::create_dir_all(dir).unwrap();
    for (name, text) in docs {
        fs::write(dir.join(name), text).unwrap();
    }
}

fn run_pipeline(docs: &Path, work: &IndexPaths) -> InvertedIndex {
    let cfg = PipelineConfig::default();
    let tokenizer = Tokenizer::new(cfg.tokenizer.clone(), Abbreviations::default());
    let stopwords: HashSet<String> = ["и", "в"].iter().map(|s| s.to_string()).collect();
    let filter = StemFilter::new(Stemmer::new(cfg.stemmer.clone()), stopwords);
    tokenize_corpus(docs, &work.tokens_dir(), &tokenizer).unwrap();
    stem_corpus(&work.tokens_dir(), &work.stems_dir(), &filter).unwrap();
    build_index(&work.stems_dir(), &cfg.index).unwrap()
}

#[test]
fn cats_and_dogs_scenario() {
    let dir = tempdir().unwrap();
    let docs = dir.path().join("docs");
    write_docs(&docs, &[
        ("1.txt", "Кошки играют."),
        ("2.txt", "Кошки и собаки"),
        ("3.txt", "hello world"),
        ("4.txt", ""),
    ]);
    let work = IndexPaths::new(dir.path().join("work"));
    let index = run_pipeline(&docs, &work);

    assert_eq!(read_lines(&work.tokens_dir().join("1.tokens")).unwrap(), vec!["кошки", "играют"]);
    assert_eq!(read_lines(&work.stems_dir().join("1.stems")).unwrap(), vec!["кошк", "игра"]);
    assert_eq!(read_lines(&work.stems_dir().join("2.stems")).unwrap(), vec!["кошк", "собак"]);
    assert!(!work.tokens_dir().join("3.tokens").exists());
    assert!(!work.tokens_dir().join("4.tokens").exists());

    save_index(&work.index_file(), &index).unwrap();
    let text = fs::read_to_string(work.index_file()).unwrap();
    assert_eq!(text, "игра:1\nкошк:1,2\nсобак:2\n");

    assert_eq!(search(&index, "кошк and игра").unwrap(), vec![1]);
    assert_eq!(search(&index, "кошк or собак").unwrap(), vec![1, 2]);
    assert_eq!(search(&index, "кошк and not игра").unwrap(), vec![2]);
    assert!(search(&index, "неизвестный").unwrap().is_empty());
}

#[test]
fn reloaded_index_answers_like_the_built_one() {
    let dir = tempdir().unwrap();
    let docs = dir.path().join("docs");
    write_docs(&docs, &[
        ("1.txt", "Красивая кошка читала книгу о программировании."),
        ("2.txt", "Собаки читают газеты, кошки спят."),
        ("7.txt", "Программирование и формирование красивых решений."),
        ("12.txt", "Книги, газеты и журналы. Кошка спит."),
    ]);
    let work = IndexPaths::new(dir.path().join("work"));
    let built = run_pipeline(&docs, &work);
    assert!(built.is_well_formed());

    save_index(&work.index_file(), &built).unwrap();
    let loaded = load_index(&work.index_file()).unwrap();
    assert_eq!(loaded, built);

    let terms: Vec<String> = built.terms().to_vec();
    for a in &terms {
        for b in &terms {
            for op in ["and", "or", "and not"] {
                let q = format!("{a} {op} {b}");
                assert_eq!(search(&built, &q).unwrap(), search(&loaded, &q).unwrap(), "{q}");
            }
        }
    }
    assert_eq!(sample_entries(&built, 3).len(), 3.min(built.len()));
}

#[test]
fn missing_docs_directory_is_fatal() {
    let dir = tempdir().unwrap();
    let tokenizer = Tokenizer::new(Default::default(), Abbreviations::default());
    let err = tokenize_corpus(&dir.path().join("absent"), &dir.path().join("tokens"), &tokenizer).unwrap_err();
    assert!(matches!(err.downcast_ref::<PipelineError>(), Some(PipelineError::MissingDirectory(_))));
}

#[test]
fn stems_never_grow() {
    let stemmer = Stemmer::new(Default::default());
    let words = [
        "кошки", "играют", "собаками", "умывались", "программирование", "бегать", "красивейший",
        "быть", "он", "на", "читающийся", "нормально", "стол", "ёжики", "кто-то", "2024", "США",
    ];
    for w in words {
        let s = stemmer.stem(w);
        assert!(s.chars().count() <= w.chars().count(), "{w} -> {s}");
        if w.chars().count() < 3 || Stemmer::is_exception(w) {
            assert_eq!(s, w);
        }
    }
}

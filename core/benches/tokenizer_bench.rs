use criterion::{criterion_group, criterion_main, Criterion};
use textindex::config::{StemmerConfig, TokenizerConfig};
use textindex::stemmer::Stemmer;
use textindex::tokenizer::{Abbreviations, Tokenizer};

const SAMPLE: &str = "Кошки играют во дворе, а собаки спят у ворот. В 2024 году МГУ \
    опубликовал отчёт о программировании и формировании учебных планов; \
    студенты читали, говорили и работали над проектами по-новому.";

fn bench_tokenize(c: &mut Criterion) {
    let tokenizer = Tokenizer::new(TokenizerConfig::default(), Abbreviations::new(["МГУ"]));
    let text = SAMPLE.repeat(200);
    c.bench_function("tokenize_sample", |b| b.iter(|| tokenizer.tokenize_str(&text)));

    let stemmer = Stemmer::new(StemmerConfig::default());
    let tokens = tokenizer.tokenize_str(&text);
    c.bench_function("stem_sample", |b| b.iter(|| tokens.iter().map(|t| stemmer.stem(t)).count()));
}

criterion_group!(benches, bench_tokenize);
criterion_main!(benches);

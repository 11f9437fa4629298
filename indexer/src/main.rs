use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use textindex::config::PipelineConfig;
use textindex::metadata::{import_jsonl, SledMetadataStore};
use textindex::persist::{load_word_list, meta_path, save_index, save_meta, IndexPaths, MetaFile};
use textindex::pipeline::{build_index, corpus_frequencies, sample_entries, stem_corpus, tokenize_corpus};
use textindex::stemmer::{StemFilter, Stemmer};
use textindex::tokenizer::{Abbreviations, Tokenizer};
use textindex::InvertedIndex;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Tokenize, stem and build a boolean inverted index", long_about = None)]
struct Cli {
    /// Optional JSON pipeline config; defaults apply to anything left out
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct AbbrevList {
    /// Known abbreviations, one per line
    #[arg(long, default_value = "data/known_abbrevs.txt")]
    abbrevs: PathBuf,
}

#[derive(Args)]
struct StopList {
    /// Stop-words, one per line
    #[arg(long, default_value = "data/stopwords.txt")]
    stopwords: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Turn `<id>.txt` documents into `<id>.tokens` files
    Tokenize {
        #[arg(long)]
        docs: PathBuf,
        #[arg(long, default_value = "tokens")]
        out: PathBuf,
        #[command(flatten)]
        abbrevs: AbbrevList,
    },
    /// Turn `<id>.tokens` files into `<id>.stems` files
    Stem {
        #[arg(long, default_value = "tokens")]
        tokens: PathBuf,
        #[arg(long, default_value = "stems")]
        out: PathBuf,
        #[command(flatten)]
        stopwords: StopList,
    },
    /// Build the index file from `<id>.stems` files
    Build {
        #[arg(long, default_value = "stems")]
        stems: PathBuf,
        #[arg(long, default_value = "boolean_index.txt")]
        output: PathBuf,
    },
    /// Run all three stages into a working directory
    Run {
        #[arg(long)]
        docs: PathBuf,
        /// Receives tokens/, stems/ and boolean_index.txt
        #[arg(long, default_value = "./index")]
        work: PathBuf,
        #[command(flatten)]
        abbrevs: AbbrevList,
        #[command(flatten)]
        stopwords: StopList,
    },
    /// Corpus statistics over `<id>.tokens` files: totals and the rank/frequency head
    Stats {
        #[arg(long, default_value = "tokens")]
        tokens: PathBuf,
        /// How many top-ranked terms to log
        #[arg(long, default_value_t = 20)]
        top: usize,
    },
    /// Load document titles and URLs from JSON lines into the metadata store
    ImportMeta {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value = "./index/meta.db")]
        db: PathBuf,
    },
}

fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = PipelineConfig::load_or_default(cli.config.as_deref())?;
    match cli.command {
        Commands::Tokenize { docs, out, abbrevs } => {
            tokenize_corpus(&docs, &out, &make_tokenizer(&config, &abbrevs.abbrevs))?;
        }
        Commands::Stem { tokens, out, stopwords } => {
            stem_corpus(&tokens, &out, &make_filter(&config, &stopwords.stopwords))?;
        }
        Commands::Build { stems, output } => {
            let index = build_index(&stems, &config.index)?;
            write_outputs(&output, &index)?;
        }
        Commands::Run { docs, work, abbrevs, stopwords } => {
            let paths = IndexPaths::new(&work);
            tokenize_corpus(&docs, &paths.tokens_dir(), &make_tokenizer(&config, &abbrevs.abbrevs))?;
            stem_corpus(&paths.tokens_dir(), &paths.stems_dir(), &make_filter(&config, &stopwords.stopwords))?;
            let index = build_index(&paths.stems_dir(), &config.index)?;
            write_outputs(&paths.index_file(), &index)?;
        }
        Commands::Stats { tokens, top } => {
            let freqs = corpus_frequencies(&tokens)?;
            for (rank, (term, count)) in freqs.ranked.iter().take(top).enumerate() {
                tracing::info!(rank = rank + 1, term = %term, count, "frequency");
            }
        }
        Commands::ImportMeta { input, db } => {
            let store = SledMetadataStore::open(&db)?;
            let f = File::open(&input).with_context(|| format!("opening {}", input.display()))?;
            let imported = import_jsonl(&store, BufReader::new(f))?;
            tracing::info!(imported, total = store.len(), db = %db.display(), "metadata import complete");
        }
    }
    Ok(())
}

fn make_tokenizer(config: &PipelineConfig, abbrevs: &Path) -> Tokenizer {
    let abbreviations = Abbreviations::new(load_word_list(abbrevs));
    tracing::info!(count = abbreviations.len(), "known abbreviations loaded");
    Tokenizer::new(config.tokenizer.clone(), abbreviations)
}

fn make_filter(config: &PipelineConfig, stopwords: &Path) -> StemFilter {
    let stopwords: HashSet<String> = load_word_list(stopwords).into_iter().collect();
    tracing::info!(count = stopwords.len(), "stop-words loaded");
    StemFilter::new(Stemmer::new(config.stemmer.clone()), stopwords)
}

fn write_outputs(output: &Path, index: &InvertedIndex) -> Result<()> {
    save_index(output, index)?;
    let meta = MetaFile {
        num_docs: index.num_docs() as u32,
        num_terms: index.len() as u32,
        created_at: time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339).unwrap_or_else(|_| "".into()),
        version: 1,
    };
    save_meta(&meta_path(output), &meta)?;
    if index.is_empty() {
        tracing::warn!("index is empty");
    } else {
        for line in sample_entries(index, 10) {
            tracing::info!(entry = %line, "sample");
        }
    }
    tracing::info!(output = %output.display(), terms = index.len(), "index written");
    Ok(())
}

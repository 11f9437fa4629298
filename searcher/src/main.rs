use clap::Parser;
use searcher::{OutputMode, Session};
use std::io;
use std::path::PathBuf;
use textindex::error::PipelineError;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "searcher")]
#[command(about = "Answer boolean queries against an index file; type `exit` to quit", long_about = None)]
struct Args {
    /// Index file produced by `indexer build`
    #[arg(long, default_value = "./index/boolean_index.txt")]
    index: PathBuf,
    /// Print document ids instead of titles and URLs
    #[arg(long, default_value_t = false)]
    ids_only: bool,
    /// Metadata store written by `indexer import-meta`
    #[arg(long)]
    meta_db: Option<PathBuf>,
}

fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let args = Args::parse();
    let mode = if args.ids_only { OutputMode::IdsOnly } else { OutputMode::Metadata };

    let session = match Session::load(&args.index, mode, args.meta_db.as_deref()) {
        Ok(session) => session,
        Err(err) => {
            match err.downcast_ref::<PipelineError>() {
                Some(missing) => eprintln!("{missing}"),
                None => eprintln!("failed to load index: {err:#}"),
            }
            std::process::exit(1);
        }
    };

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    if let Err(err) = session.run(stdin.lock(), &mut stdout) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

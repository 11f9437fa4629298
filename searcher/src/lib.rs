use anyhow::Result;
use std::io::{BufRead, Write};
use std::path::Path;
use textindex::metadata::{MetadataStore, SledMetadataStore};
use textindex::persist::{load_index, load_meta};
use textindex::query::search;
use textindex::{DocId, InvertedIndex};

pub const EXIT_COMMAND: &str = "exit";
const PROMPT: &str = "Enter a query:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    IdsOnly,
    Metadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Exit,
}

/// A loaded index plus how results are rendered. Read-only once built.
pub struct Session {
    index: InvertedIndex,
    mode: OutputMode,
    store: Option<Box<dyn MetadataStore>>,
}

impl Session {
    pub fn new(index: InvertedIndex, mode: OutputMode, store: Option<Box<dyn MetadataStore>>) -> Self {
        if mode == OutputMode::Metadata && store.is_none() {
            tracing::warn!("no metadata store configured, results will show ids only");
        }
        Self { index, mode, store }
    }

    /// Load the index file and, in metadata mode, open the metadata store if one is given.
    pub fn load(index_path: &Path, mode: OutputMode, meta_db: Option<&Path>) -> Result<Self> {
        let index = load_index(index_path)?;
        tracing::info!(terms = index.len(), path = %index_path.display(), "index loaded");
        match load_meta(index_path) {
            Ok(Some(meta)) => tracing::info!(
                num_docs = meta.num_docs,
                num_terms = meta.num_terms,
                created_at = %meta.created_at,
                "index built"
            ),
            Ok(None) => tracing::debug!("no build metadata next to the index"),
            Err(err) => tracing::warn!(error = %err, "build metadata unreadable"),
        }
        let store: Option<Box<dyn MetadataStore>> = match (mode, meta_db) {
            (OutputMode::Metadata, Some(db)) => match SledMetadataStore::open(db) {
                Ok(store) => Some(Box::new(store) as Box<dyn MetadataStore>),
                Err(err) => {
                    tracing::warn!(error = %err, "metadata store unavailable");
                    None
                }
            },
            _ => None,
        };
        Ok(Self::new(index, mode, store))
    }

    /// Read queries until `exit` or end of input. Lines that are not UTF-8 are reported and skipped.
    pub fn run<R: BufRead, W: Write>(&self, mut input: R, out: &mut W) -> Result<()> {
        let mut buf = Vec::new();
        loop {
            writeln!(out, "{PROMPT}")?;
            out.flush()?;
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            match std::str::from_utf8(&buf) {
                Ok(line) => {
                    if self.handle_line(line, out)? == Control::Exit {
                        break;
                    }
                }
                Err(err) => {
                    eprintln!("query is not valid UTF-8: {err}");
                    writeln!(out)?;
                }
            }
        }
        Ok(())
    }

    pub fn handle_line<W: Write>(&self, line: &str, out: &mut W) -> Result<Control> {
        let line = line.trim_end_matches(&['\r', '\n'][..]);
        if line == EXIT_COMMAND {
            return Ok(Control::Exit);
        }
        if line.trim().is_empty() {
            return Ok(Control::Continue);
        }
        match search(&self.index, line) {
            Ok(ids) => self.render(&ids, out)?,
            Err(err) => {
                eprintln!("{err}");
                writeln!(out)?;
            }
        }
        Ok(Control::Continue)
    }

    fn render<W: Write>(&self, ids: &[DocId], out: &mut W) -> Result<()> {
        match (&self.store, self.mode) {
            (Some(store), OutputMode::Metadata) => {
                if ids.is_empty() {
                    writeln!(out, "Nothing found.\n")?;
                    return Ok(());
                }
                match store.fetch(ids) {
                    Ok(found) => {
                        writeln!(out, "Found: {} documents", found.len())?;
                        for (id, meta) in &found {
                            let title = if meta.title.is_empty() { "(untitled)" } else { meta.title.as_str() };
                            writeln!(out, "[id: {id}] {title} - {}", meta.url.as_deref().unwrap_or(""))?;
                        }
                        writeln!(out, "Found: {} documents\n", found.len())?;
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "metadata lookup failed, showing ids");
                        write_ids(ids, out)?;
                    }
                }
            }
            _ => write_ids(ids, out)?,
        }
        Ok(())
    }
}

fn write_ids<W: Write>(ids: &[DocId], out: &mut W) -> Result<()> {
    writeln!(out, "Found: {} documents", ids.len())?;
    for id in ids {
        writeln!(out, "{id}")?;
    }
    writeln!(out, "Found: {} documents\n", ids.len())?;
    Ok(())
}

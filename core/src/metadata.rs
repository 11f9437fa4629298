use crate::{DocId, DocMeta};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::io::BufRead;
use std::path::Path;

/// Resolves display metadata for query results. Never consulted by the index itself.
pub trait MetadataStore {
    /// Metadata for every id that has some, in the order of `ids`.
    fn fetch(&self, ids: &[DocId]) -> Result<Vec<(DocId, DocMeta)>>;
}

/// `sled` tree keyed by big-endian document id, values are `bincode`-encoded `DocMeta`.
pub struct SledMetadataStore {
    db: sled::Db,
}

impl SledMetadataStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let db = sled::open(path).with_context(|| format!("opening metadata db {}", path.display()))?;
        Ok(Self { db })
    }

    pub fn put(&self, id: DocId, meta: &DocMeta) -> Result<()> {
        let bytes = bincode::serialize(meta)?;
        self.db.insert(id.to_be_bytes(), bytes)?;
        Ok(())
    }

    pub fn len(&self) -> usize { self.db.len() }
    pub fn is_empty(&self) -> bool { self.db.is_empty() }

    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}

impl MetadataStore for SledMetadataStore {
    fn fetch(&self, ids: &[DocId]) -> Result<Vec<(DocId, DocMeta)>> {
        let mut out = Vec::with_capacity(ids.len());
        for &id in ids {
            if let Some(raw) = self.db.get(id.to_be_bytes())? {
                let meta: DocMeta = bincode::deserialize(&raw)?;
                out.push((id, meta));
            }
        }
        Ok(out)
    }
}

#[derive(Debug, Deserialize)]
struct InputMeta {
    id: DocId,
    #[serde(default)]
    title: String,
    url: Option<String>,
}

/// Load `{"id":..,"title":..,"url":..}` lines into the store. Bad lines are skipped.
pub fn import_jsonl<R: BufRead>(store: &SledMetadataStore, reader: R) -> Result<usize> {
    let mut imported = 0;
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        match serde_json::from_str::<InputMeta>(&line) {
            Ok(doc) => {
                store.put(doc.id, &DocMeta { title: doc.title, url: doc.url })?;
                imported += 1;
            }
            Err(err) => tracing::warn!(line = lineno + 1, error = %err, "metadata line skipped"),
        }
    }
    store.flush()?;
    Ok(imported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn import_and_fetch() {
        let dir = tempdir().unwrap();
        let store = SledMetadataStore::open(dir.path().join("meta")).unwrap();
        let input = concat!(
            r#"{"id":1,"title":"Кошки","url":"https://example.org/1"}"#, "\n",
            "not json\n",
            r#"{"id":2,"url":null}"#, "\n",
        );
        assert_eq!(import_jsonl(&store, input.as_bytes()).unwrap(), 2);
        let found = store.fetch(&[2, 1, 9]).unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].0, 2);
        assert_eq!(found[0].1.title, "");
        assert_eq!(found[1].1.url.as_deref(), Some("https://example.org/1"));
    }
}

use crate::error::PipelineError;
use crate::{DocId, InvertedIndex};
use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

lazy_static! {
    static ref NUMBERED_FILE: Regex = Regex::new(r"^([0-9]+)\.([A-Za-z]+)$").expect("valid regex");
}

pub const TOKENS_EXT: &str = "tokens";
pub const STEMS_EXT: &str = "stems";
pub const DOCS_EXT: &str = "txt";

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub num_terms: u32,
    pub created_at: String,
    pub version: u32,
}

/// Layout of a working directory used by a full pipeline run.
pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn tokens_dir(&self) -> PathBuf { self.root.join("tokens") }
    pub fn stems_dir(&self) -> PathBuf { self.root.join("stems") }
    pub fn index_file(&self) -> PathBuf { self.root.join("boolean_index.txt") }
}

/// Sidecar metadata path: `<index>.meta.json`.
pub fn meta_path(index_file: &Path) -> PathBuf {
    let mut name = index_file.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".meta.json");
    index_file.with_file_name(name)
}

pub fn numbered_file(dir: &Path, doc_id: DocId, ext: &str) -> PathBuf {
    dir.join(format!("{doc_id}.{ext}"))
}

/// Files named `<id>.<ext>` directly under `dir`, sorted by id.
///
/// Id `0` and names that do not parse as `u32` are skipped with a warning.
pub fn list_numbered_files(dir: &Path, ext: &str) -> Result<Vec<(DocId, PathBuf)>> {
    if !dir.is_dir() {
        return Err(PipelineError::MissingDirectory(dir.to_path_buf()).into());
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() { continue; }
        let name = entry.file_name().to_string_lossy();
        let Some(caps) = NUMBERED_FILE.captures(&name) else { continue };
        if &caps[2] != ext { continue; }
        match caps[1].parse::<DocId>() {
            Ok(id) if id > 0 => files.push((id, entry.path().to_path_buf())),
            _ => tracing::warn!(file = %entry.path().display(), "skipping file without a positive document id"),
        }
    }
    files.sort_by_key(|(id, _)| *id);
    Ok(files)
}

/// One entry per line, each terminated by `\n`.
pub fn write_lines<S: AsRef<str>>(path: &Path, lines: &[S]) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    let mut out = BufWriter::new(File::create(path).with_context(|| format!("creating {}", path.display()))?);
    for line in lines {
        out.write_all(line.as_ref().as_bytes())?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

/// Non-empty lines with any trailing `\r` removed.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut lines = Vec::new();
    for line in BufReader::new(f).lines() {
        let line = line?;
        let line = line.strip_suffix('\r').unwrap_or(&line);
        if !line.is_empty() {
            lines.push(line.to_string());
        }
    }
    Ok(lines)
}

pub fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    let mut f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    Ok(buf)
}

/// Trimmed, non-empty lines of an optional word list; a missing file yields an empty list.
pub fn load_word_list(path: &Path) -> Vec<String> {
    match read_lines(path) {
        Ok(lines) => lines.into_iter().map(|l| l.trim().to_string()).filter(|l| !l.is_empty()).collect(),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "word list unavailable, using an empty list");
            Vec::new()
        }
    }
}

pub fn write_index<W: Write>(out: &mut W, index: &InvertedIndex) -> Result<()> {
    for (term, postings) in index.iter() {
        if postings.is_empty() { continue; }
        out.write_all(term.as_bytes())?;
        out.write_all(b":")?;
        for (i, id) in postings.iter().enumerate() {
            if i > 0 { out.write_all(b",")?; }
            write!(out, "{id}")?;
        }
        out.write_all(b"\n")?;
    }
    Ok(())
}

pub fn save_index(path: &Path, index: &InvertedIndex) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    let mut out = BufWriter::new(File::create(path).with_context(|| format!("creating {}", path.display()))?);
    write_index(&mut out, index)?;
    out.flush()?;
    Ok(())
}

/// Parse `term:id,id,...` lines. Malformed lines and ids are skipped with a warning.
pub fn read_index<R: BufRead>(reader: R) -> Result<InvertedIndex> {
    let mut terms: Vec<String> = Vec::new();
    let mut postings: Vec<Vec<DocId>> = Vec::new();
    for (lineno, bytes) in reader.split(b'\n').enumerate() {
        let bytes = bytes?;
        let line = match std::str::from_utf8(&bytes) {
            Ok(line) => line,
            Err(err) => {
                tracing::warn!(line = lineno + 1, error = %err, "index line is not valid UTF-8, skipped");
                continue;
            }
        };
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() { continue; }
        let Some((term, rest)) = line.split_once(':') else {
            tracing::warn!(line = lineno + 1, "index line without ':' skipped");
            continue;
        };
        if term.is_empty() {
            tracing::warn!(line = lineno + 1, "index line with empty term skipped");
            continue;
        }
        let mut ids = Vec::new();
        for raw in rest.split(',').filter(|s| !s.is_empty()) {
            match raw.trim().parse::<DocId>() {
                Ok(id) => ids.push(id),
                Err(_) => tracing::warn!(line = lineno + 1, id = raw, "malformed document id skipped"),
            }
        }
        if ids.is_empty() { continue; }
        terms.push(term.to_string());
        postings.push(ids);
    }
    let index = InvertedIndex::from_sorted_parts(terms, postings);
    if !index.is_well_formed() {
        tracing::warn!("index dictionary or postings are not strictly ascending; lookups may miss terms");
    }
    Ok(index)
}

pub fn load_index(path: &Path) -> Result<InvertedIndex> {
    if !path.is_file() {
        return Err(PipelineError::MissingIndex(path.to_path_buf()).into());
    }
    let f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    read_index(BufReader::new(f))
}

pub fn save_meta(path: &Path, meta: &MetaFile) -> Result<()> {
    let mut f = File::create(path)?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

/// Build sidecar next to an index file, if one was written.
pub fn load_meta(index_file: &Path) -> Result<Option<MetaFile>> {
    let path = meta_path(index_file);
    if !path.is_file() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    let meta = serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    Ok(Some(meta))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IndexBuilder;
    use crate::config::IndexConfig;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn index_text_format() {
        let mut b = IndexBuilder::new(&IndexConfig::default());
        b.add_document(2, vec!["кошк".into(), "собак".into()]).unwrap();
        b.add_document(1, vec!["кошк".into()]).unwrap();
        let mut buf = Vec::new();
        write_index(&mut buf, &b.finish()).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "кошк:1,2\nсобак:2\n");
    }

    #[test]
    fn reader_skips_bad_lines_and_ids() {
        let mut text = "альфа:1,2\r\nмусор\n\n".as_bytes().to_vec();
        text.extend_from_slice(&[0xFF, b':', b'2', b'\n']);
        text.extend_from_slice("бета:3,x,5\nгамма:\nдельта:7,\n".as_bytes());
        let idx = read_index(text.as_slice()).unwrap();
        assert_eq!(idx.terms(), &["альфа", "бета", "дельта"]);
        assert_eq!(idx.postings("бета"), &[3, 5]);
        assert_eq!(idx.postings("дельта"), &[7]);
    }

    #[test]
    fn missing_index_is_reported() {
        let dir = tempdir().unwrap();
        let err = load_index(&dir.path().join("none.txt")).unwrap_err();
        assert!(matches!(err.downcast_ref::<PipelineError>(), Some(PipelineError::MissingIndex(_))));
    }

    #[test]
    fn lists_numbered_files_only() {
        let dir = tempdir().unwrap();
        for name in ["3.txt", "10.txt", "0.txt", "notes.txt", "4.tokens", "x1.txt"] {
            fs::write(dir.path().join(name), "x").unwrap();
        }
        let ids: Vec<DocId> = list_numbered_files(dir.path(), DOCS_EXT).unwrap().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![3, 10]);
    }

    #[test]
    fn missing_word_list_is_empty() {
        let dir = tempdir().unwrap();
        assert!(load_word_list(&dir.path().join("stopwords.txt")).is_empty());
        let path = dir.path().join("abbrevs.txt");
        fs::write(&path, "США\r\n  IT \n\n").unwrap();
        assert_eq!(load_word_list(&path), vec!["США", "IT"]);
    }

    #[test]
    fn meta_sidecar_round_trip() {
        let dir = tempdir().unwrap();
        let index_file = dir.path().join("boolean_index.txt");
        assert!(load_meta(&index_file).unwrap().is_none());
        let meta = MetaFile { num_docs: 2, num_terms: 3, created_at: "2024-01-01T00:00:00Z".into(), version: 1 };
        save_meta(&meta_path(&index_file), &meta).unwrap();
        let loaded = load_meta(&index_file).unwrap().unwrap();
        assert_eq!((loaded.num_docs, loaded.num_terms), (2, 3));
    }

    #[test]
    fn meta_sidecar_path() {
        assert_eq!(meta_path(Path::new("out/boolean_index.txt")), PathBuf::from("out/boolean_index.txt.meta.json"));
    }
}

//! Ingestion adapter: turns files on disk into `RawDocument`s.
//!
//! Plain `.txt` files are identified by their file name. `.json` (object or array) and `.jsonl`
//! files hold structured records whose fields are flattened into one text.

use crate::{MatchError, RawDocument};
use anyhow::Result;
use serde::Deserialize;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Deserialize)]
struct InputDoc {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(alias = "text")]
    body: String,
    #[serde(default)]
    skills: Vec<String>,
}

impl InputDoc {
    fn into_raw(self) -> RawDocument {
        let mut text = String::new();
        if let Some(title) = self.title {
            text.push_str(&title);
            text.push('\n');
        }
        text.push_str(&self.body);
        if !self.skills.is_empty() {
            text.push('\n');
            text.push_str(&self.skills.join(", "));
        }
        RawDocument::text(self.id, text)
    }
}

/// Everything read from an input path, in deterministic order.
#[derive(Debug, Default)]
pub struct Ingested {
    pub documents: Vec<RawDocument>,
    /// Records that could not be read; reported, never fatal.
    pub rejected: Vec<MatchError>,
}

pub fn is_supported(path: &Path) -> bool {
    matches!(path.extension().and_then(|s| s.to_str()), Some("txt" | "json" | "jsonl"))
}

/// Read a single file or every supported file under a directory, sorted by path.
///
/// Files that cannot be read are reported in `rejected`; only a missing input path is an error.
pub fn load_path(input: &Path) -> Result<Ingested> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && is_supported(p) {
                files.push(p.to_path_buf());
            }
        }
        files.sort();
    } else if input.is_file() {
        files.push(input.to_path_buf());
    } else {
        anyhow::bail!("input path does not exist: {}", input.display());
    }

    let mut out = Ingested::default();
    for file in files {
        let loaded = match file.extension().and_then(|s| s.to_str()) {
            Some("jsonl") => load_jsonl(&file, &mut out),
            Some("json") => load_json(&file, &mut out),
            _ => fs::read(&file).map(|bytes| out.documents.push(RawDocument::new(file_id(&file), bytes))),
        };
        // An unreadable file costs only its own records.
        if let Err(e) = loaded {
            out.rejected.push(MatchError::MalformedDocument { id: file_id(&file), reason: e.to_string() });
        }
    }
    for err in &out.rejected {
        tracing::warn!(error = %err, "rejected input record");
    }
    tracing::info!(input = %input.display(), documents = out.documents.len(), rejected = out.rejected.len(), "ingested");
    Ok(out)
}

fn file_id(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn load_jsonl(file: &Path, out: &mut Ingested) -> io::Result<()> {
    let reader = BufReader::new(File::open(file)?);
    for (lineno, line) in reader.split(b'\n').enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                // Records read so far are kept; the rest of the file is unreachable.
                out.rejected.push(MatchError::MalformedDocument {
                    id: format!("{}:{}", file_id(file), lineno + 1),
                    reason: e.to_string(),
                });
                break;
            }
        };
        if line.iter().all(u8::is_ascii_whitespace) { continue; }
        match serde_json::from_slice::<InputDoc>(&line) {
            Ok(doc) => out.documents.push(doc.into_raw()),
            Err(e) => out.rejected.push(MatchError::MalformedDocument {
                id: format!("{}:{}", file_id(file), lineno + 1),
                reason: e.to_string(),
            }),
        }
    }
    Ok(())
}

fn load_json(file: &Path, out: &mut Ingested) -> io::Result<()> {
    let bytes = fs::read(file)?;
    let json: serde_json::Value = match serde_json::from_slice(&bytes) {
        Ok(v) => v,
        Err(e) => {
            out.rejected.push(MatchError::MalformedDocument { id: file_id(file), reason: e.to_string() });
            return Ok(());
        }
    };
    let values = match json {
        serde_json::Value::Array(arr) => arr,
        v @ serde_json::Value::Object(_) => vec![v],
        _ => {
            out.rejected.push(MatchError::MalformedDocument {
                id: file_id(file),
                reason: "expected a JSON object or array".into(),
            });
            return Ok(());
        }
    };
    for (i, v) in values.into_iter().enumerate() {
        match serde_json::from_value::<InputDoc>(v) {
            Ok(doc) => out.documents.push(doc.into_raw()),
            Err(e) => out.rejected.push(MatchError::MalformedDocument {
                id: format!("{}[{}]", file_id(file), i),
                reason: e.to_string(),
            }),
        }
    }
    Ok(())
}

//! Input discovery and opening: a single dump file, or every dump under a
//! directory. `.zst` files are decoded on the fly.

use crate::progress::ProgressReader;
use crate::util::open_with_backoff;
use anyhow::{bail, Context, Result};
use indicatif::ProgressBar;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zstd::stream::read::Decoder;

/// Compression of one input file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind {
    Plain, // .jsonl / .ndjson / .json / anything given explicitly
    Zstd,  // .zst
}

#[derive(Clone, Debug)]
pub struct InputFile {
    pub kind: InputKind,
    pub path: PathBuf,
    pub size: u64,
}

const DUMP_EXTENSIONS: &[&str] = &["jsonl", "ndjson", "json", "zst"];

fn kind_for(path: &Path) -> InputKind {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("zst") => InputKind::Zstd,
        _ => InputKind::Plain,
    }
}

fn input_file(path: PathBuf) -> InputFile {
    let size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
    InputFile { kind: kind_for(&path), path, size }
}

/// Resolve `path` into the list of files to read, in stable (sorted) order.
/// A file is taken as-is regardless of extension; a directory is walked for dump files.
pub fn discover_inputs(path: &Path) -> Result<Vec<InputFile>> {
    let meta = fs::metadata(path).with_context(|| format!("cannot open input {}", path.display()))?;
    if meta.is_file() {
        return Ok(vec![input_file(path.to_path_buf())]);
    }
    if !meta.is_dir() {
        bail!("input {} is neither a file nor a directory", path.display());
    }

    // Anything the walk cannot read (dangling symlink, permission denied, loop)
    // is fatal, same as an unreadable input file.
    let mut files: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(path).follow_links(true) {
        let entry = entry.with_context(|| format!("cannot open input under {}", path.display()))?;
        let is_dump = entry
            .path()
            .extension()
            .and_then(|x| x.to_str())
            .is_some_and(|x| DUMP_EXTENSIONS.iter().any(|d| x.eq_ignore_ascii_case(d)));
        if entry.file_type().is_file() && is_dump {
            files.push(entry.into_path());
        }
    }
    files.sort();

    if files.is_empty() {
        tracing::warn!("No dump files found under {}", path.display());
    }
    Ok(files.into_iter().map(input_file).collect())
}

pub fn total_input_size(files: &[InputFile]) -> u64 {
    files.iter().map(|f| f.size).sum()
}

/// Open one input as a buffered line source. `pb` advances by on-disk bytes read.
pub fn open_input(file: &InputFile, read_buf_bytes: usize, pb: Option<ProgressBar>) -> Result<Box<dyn BufRead>> {
    let f = open_with_backoff(&file.path, 16, 50)
        .with_context(|| format!("cannot open input {}", file.path.display()))?;
    let counted = ProgressReader::new(f, pb);
    let cap = read_buf_bytes.max(8 * 1024);
    match file.kind {
        InputKind::Plain => Ok(Box::new(BufReader::with_capacity(cap, counted))),
        InputKind::Zstd => {
            let mut decoder = Decoder::new(counted)
                .with_context(|| format!("zstd decoder for {}", file.path.display()))?;
            // large-window frames are common in monthly dumps
            decoder.window_log_max(31)?;
            Ok(Box::new(BufReader::with_capacity(cap, decoder)))
        }
    }
}

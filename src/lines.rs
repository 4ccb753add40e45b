use crate::util::{create_with_backoff, replace_file_atomic_backoff};
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{self, BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Byte-line reader over any buffered source (plain file or zstd decoder).
/// Lines are handed out without their `\r?\n` terminator, with a 1-based line number.
pub struct LineReader<R> {
    rdr: R,
    buf: Vec<u8>,
    line_no: u64,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(rdr: R) -> Self {
        Self { rdr, buf: Vec::with_capacity(16 * 1024), line_no: 0 }
    }

    /// Returns `None` at EOF. A final line without a newline is still returned.
    pub fn next_line(&mut self) -> io::Result<Option<(u64, &[u8])>> {
        self.buf.clear();
        let n = self.rdr.read_until(b'\n', &mut self.buf)?;
        if n == 0 {
            return Ok(None);
        }
        if self.buf.ends_with(b"\n") {
            self.buf.pop();
            if self.buf.ends_with(b"\r") {
                self.buf.pop();
            }
        }
        self.line_no += 1;
        Ok(Some((self.line_no, &self.buf)))
    }

    pub fn lines_read(&self) -> u64 {
        self.line_no
    }
}

/// Staging file that is removed on drop unless it was promoted.
struct StagedFile {
    path: PathBuf,
    promoted: bool,
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.promoted {
            let _ = fs::remove_file(&self.path);
        }
    }
}

/// Buffered text writer that writes next to its destination as
/// `<name>.inprogress` and only replaces the destination in `finish()`.
/// Dropping it unfinished, or a failed `finish()`, removes the staging file.
pub struct LineWriter {
    // field order matters: the file is closed before the staging file is removed
    w: BufWriter<File>,
    staged: StagedFile,
    final_path: PathBuf,
    lines: u64,
}

impl LineWriter {
    pub fn create(final_path: &Path, buf_bytes: usize) -> Result<Self> {
        let mut name = final_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".inprogress");
        let tmp_path = final_path.with_file_name(name);
        let f = create_with_backoff(&tmp_path, 16, 50)
            .with_context(|| format!("create {}", tmp_path.display()))?;
        Ok(Self {
            w: BufWriter::with_capacity(buf_bytes.max(8 * 1024), f),
            staged: StagedFile { path: tmp_path, promoted: false },
            final_path: final_path.to_path_buf(),
            lines: 0,
        })
    }

    /// Write `s` followed by `\n`.
    #[inline]
    pub fn write_line(&mut self, s: &str) -> io::Result<()> {
        self.w.write_all(s.as_bytes())?;
        self.w.write_all(b"\n")?;
        self.lines += 1;
        Ok(())
    }

    pub fn lines_written(&self) -> u64 {
        self.lines
    }

    /// Path of the staging file while the writer is open.
    pub fn staging_path(&self) -> &Path {
        &self.staged.path
    }

    /// Flush, close, and move the file into place. Returns the final path.
    pub fn finish(self) -> Result<PathBuf> {
        let LineWriter { mut w, mut staged, final_path, .. } = self;
        let flushed = w.flush();
        drop(w);
        flushed.with_context(|| format!("flush {}", staged.path.display()))?;
        replace_file_atomic_backoff(&staged.path, &final_path)?;
        staged.promoted = true;
        Ok(final_path)
    }
}

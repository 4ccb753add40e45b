use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::thread::sleep;
use std::time::Duration;

static INIT_ONCE: std::sync::Once = std::sync::Once::new();

/// Install the fmt subscriber once per process. `RUST_LOG` wins; default is `info`.
pub fn init_tracing_once() {
    INIT_ONCE.call_once(|| {
        let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let _ = tracing_subscriber::fmt().with_env_filter(env_filter).try_init();
    });
}

// -------- file ops with backoff (AV scanners, network shares, sharing violations) --------

/// Transient OS error codes worth retrying: access denied / sharing / lock
/// violations, AV-blocked files, device-not-ready and I/O device errors.
fn is_retriable_io_error(e: &io::Error) -> bool {
    matches!(e.raw_os_error(), Some(5 | 21 | 32 | 33 | 225 | 433 | 1006 | 1117 | 1224))
}

/// Run `op` up to `tries` times, sleeping `delay_ms * attempt` between retriable failures.
fn with_backoff<T>(what: &str, path: &Path, tries: usize, delay_ms: u64, mut op: impl FnMut() -> io::Result<T>) -> io::Result<T> {
    let tries = tries.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op() {
            Ok(v) => return Ok(v),
            Err(e) if attempt < tries && is_retriable_io_error(&e) => {
                tracing::debug!("{} {} failed ({}), retry {}/{}", what, path.display(), e, attempt, tries - 1);
                sleep(Duration::from_millis(delay_ms.saturating_mul(attempt as u64)));
            }
            Err(e) => return Err(e),
        }
    }
}

/// Open a file for reading, retrying transient errors.
pub fn open_with_backoff(path: &Path, tries: usize, delay_ms: u64) -> io::Result<File> {
    with_backoff("open", path, tries, delay_ms, || File::open(path))
}

/// Create (truncate) a file, retrying transient errors.
pub fn create_with_backoff(path: &Path, tries: usize, delay_ms: u64) -> io::Result<File> {
    with_backoff("create", path, tries, delay_ms, || File::create(path))
}

/// Replace `dest` with `tmp`. Falls back to copy+remove when rename keeps failing.
pub fn replace_file_atomic_backoff(tmp: &Path, dest: &Path) -> Result<()> {
    let (tries, delay_ms) = (20usize, 50u64);
    if dest.exists() {
        with_backoff("remove", dest, tries, delay_ms, || match fs::remove_file(dest) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        })
        .with_context(|| format!("remove {}", dest.display()))?;
    }
    if with_backoff("rename", tmp, tries, delay_ms, || fs::rename(tmp, dest)).is_ok() {
        return Ok(());
    }
    with_backoff("copy", tmp, tries, delay_ms, || fs::copy(tmp, dest))
        .with_context(|| format!("copy {} -> {}", tmp.display(), dest.display()))?;
    with_backoff("remove", tmp, tries, delay_ms, || fs::remove_file(tmp))
        .with_context(|| format!("remove {}", tmp.display()))?;
    Ok(())
}

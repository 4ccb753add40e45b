//! Progress reporting: byte bar for input reading, count bar for output files.

use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Read};
use std::time::Duration;

const TICK: Duration = Duration::from_millis(100);

fn styled(pb: ProgressBar, template: &str) -> ProgressBar {
    let style = ProgressStyle::with_template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");
    pb.set_style(style);
    pb.enable_steady_tick(TICK);
    pb
}

/// Byte-based bar sized to the total on-disk input size.
pub fn make_bytes_progress(total_bytes: u64, label: &str) -> ProgressBar {
    let pb = styled(
        ProgressBar::new(total_bytes),
        "{spinner:.green} {msg} {bytes:>10}/{total_bytes:<10} [{bar:.cyan/blue}] {percent:>3}%  \
         {bytes_per_sec}  elapsed: {elapsed_precise}  eta: {eta_precise}",
    );
    pb.set_message(label.to_string());
    pb
}

/// Count-style bar (items out of total).
pub fn make_count_progress(total: u64, label: &str) -> ProgressBar {
    let pb = styled(
        ProgressBar::new(total),
        "{spinner:.green} {msg} {pos}/{len} [{bar:.cyan/blue}] {percent:>3}%  elapsed: {elapsed_precise}",
    );
    pb.set_message(label.to_string());
    pb
}

/// `Read` wrapper that advances a progress bar by the bytes read from the
/// underlying file (compressed bytes for `.zst` inputs).
pub struct ProgressReader<R> {
    inner: R,
    pb: Option<ProgressBar>,
}

impl<R: Read> ProgressReader<R> {
    pub fn new(inner: R, pb: Option<ProgressBar>) -> Self {
        Self { inner, pb }
    }
}

impl<R: Read> Read for ProgressReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if let Some(pb) = &self.pb {
            pb.inc(n as u64);
        }
        Ok(n)
    }
}

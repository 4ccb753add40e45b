//! Plain-text writers for an aggregation result: one id file per month,
//! plus the general and per-language statistics files.

use crate::aggregate::PostStats;
use crate::config::{GENERAL_STATS_FILE, LANGUAGES_FILE};
use crate::date::format_timestamp;
use crate::lines::LineWriter;
use crate::progress::make_count_progress;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Write `<dir>/<tweet_ids_YYYY_MM>.txt` for every month, one id per line.
/// Ids are sorted so reruns produce identical files. Returns paths in month order.
pub fn write_monthly_files(stats: &PostStats, dir: &Path, write_buf_bytes: usize, progress: bool) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;

    let pb = progress.then(|| make_count_progress(stats.monthly().len() as u64, "Monthly files"));
    let mut written = Vec::with_capacity(stats.monthly().len());

    for (ym, ids) in stats.monthly() {
        let path = dir.join(format!("{}.txt", ym.file_stem()));
        let mut sorted: Vec<&str> = ids.iter().map(String::as_str).collect();
        sorted.sort_unstable();

        let mut w = LineWriter::create(&path, write_buf_bytes)?;
        for id in sorted {
            w.write_line(id).with_context(|| format!("write {}", path.display()))?;
        }
        tracing::debug!("{}: {} ids", ym, w.lines_written());
        written.push(w.finish()?);

        if let Some(pb) = &pb { pb.inc(1); }
    }

    if let Some(pb) = pb { pb.finish_with_message("Monthly files written"); }
    Ok(written)
}

fn format_optional(ts: Option<time::PrimitiveDateTime>) -> String {
    ts.map(format_timestamp).unwrap_or_else(|| "n/a".to_string())
}

/// Write `general_stats.txt` and `tweets_by_language.txt` into `dir`.
/// Returns both paths, general stats first.
pub fn write_statistics(stats: &PostStats, dir: &Path, write_buf_bytes: usize) -> Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;

    let general = dir.join(GENERAL_STATS_FILE);
    let mut w = LineWriter::create(&general, write_buf_bytes)?;
    let lines = [
        format!("Total tweets: {}", stats.total()),
        format!("Total unique authors: {}", stats.unique_authors().len()),
        format!("First tweet date: {}", format_optional(stats.first_timestamp())),
        format!("Last tweet date: {}", format_optional(stats.last_timestamp())),
    ];
    for line in &lines {
        w.write_line(line).with_context(|| format!("write {}", general.display()))?;
    }
    let general = w.finish()?;

    let langs = dir.join(LANGUAGES_FILE);
    let mut w = LineWriter::create(&langs, write_buf_bytes)?;
    for (lang, count) in stats.languages().most_common() {
        w.write_line(&format!("{lang}: {count}"))
            .with_context(|| format!("write {}", langs.display()))?;
    }
    let langs = w.finish()?;

    Ok((general, langs))
}

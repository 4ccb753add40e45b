use crate::aggregate::{aggregate_reader_into, PostStats};
use crate::config::StatsOptions;
use crate::input::{discover_inputs, open_input, total_input_size};
use crate::output::{write_monthly_files, write_statistics};
use crate::progress::make_bytes_progress;
use crate::util::init_tracing_once;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

#[derive(Clone, Default)]
pub struct TweetStats {
    pub(crate) opts: StatsOptions,
}

/// Everything one `run()` produced.
#[derive(Debug)]
pub struct RunReport {
    pub stats: PostStats,
    pub monthly_files: Vec<PathBuf>,
    pub general_stats_file: PathBuf,
    pub languages_file: PathBuf,
}

impl TweetStats {
    pub fn new() -> Self {
        Self { opts: StatsOptions::default() }
    }

    pub fn with_options(opts: StatsOptions) -> Self {
        Self { opts }
    }

    // -------- Builder methods --------
    pub fn input(mut self, path: impl AsRef<Path>) -> Self { self.opts = self.opts.with_input(path); self }
    pub fn output_dir(mut self, dir: impl AsRef<Path>) -> Self { self.opts = self.opts.with_output_dir(dir); self }
    pub fn monthly_subdir(mut self, name: impl Into<String>) -> Self { self.opts = self.opts.with_monthly_subdir(name); self }
    pub fn progress(mut self, yes: bool) -> Self { self.opts = self.opts.with_progress(yes); self }
    pub fn progress_label(mut self, label: impl Into<String>) -> Self { self.opts = self.opts.with_progress_label(label); self }
    pub fn io_read_buffer(mut self, bytes: usize) -> Self { self.opts = self.opts.with_io_read_buffer(bytes); self }
    pub fn io_write_buffer(mut self, bytes: usize) -> Self { self.opts = self.opts.with_io_write_buffer(bytes); self }
    pub fn io_buffers(mut self, read_bytes: usize, write_bytes: usize) -> Self {
        self.opts = self.opts.with_io_read_buffer(read_bytes).with_io_write_buffer(write_bytes);
        self
    }

    pub fn options(&self) -> &StatsOptions {
        &self.opts
    }

    // -------- Operations --------

    /// Read every input line once and build the statistics.
    /// Malformed lines are logged and skipped; only I/O failures are errors.
    pub fn aggregate(&self) -> Result<PostStats> {
        init_tracing_once();

        let files = discover_inputs(&self.opts.input)?;
        tracing::info!("Planned {} input file(s) under {}", files.len(), self.opts.input.display());

        let pb = if self.opts.progress {
            let label = self.opts.progress_label.as_deref().unwrap_or("Reading posts");
            Some(make_bytes_progress(total_input_size(&files), label))
        } else {
            None
        };

        let mut stats = PostStats::new();
        for file in &files {
            let reader = open_input(file, self.opts.read_buffer_bytes, pb.clone())?;
            let source = file.path.display().to_string();
            aggregate_reader_into(&mut stats, &source, reader)
                .with_context(|| format!("reading {}", file.path.display()))?;
            tracing::debug!("{}: running total {}", source, stats.total());
        }

        if let Some(pb) = pb { pb.finish_with_message("done"); }

        let skipped = stats.skipped();
        tracing::info!(
            total = stats.total(),
            months = stats.monthly().len(),
            authors = stats.unique_authors().len(),
            languages = stats.languages().len(),
            skipped_invalid_json = skipped.invalid_json,
            skipped_missing_field = skipped.missing_field,
            skipped_bad_timestamp = skipped.bad_timestamp,
            skipped_blank = skipped.blank,
            "Aggregation finished"
        );
        Ok(stats)
    }

    /// Write one id file per month under `<output_dir>/<monthly_subdir>`.
    pub fn write_monthly(&self, stats: &PostStats) -> Result<Vec<PathBuf>> {
        write_monthly_files(stats, &self.opts.monthly_dir(), self.opts.write_buffer_bytes, self.opts.progress)
    }

    /// Write `general_stats.txt` and `tweets_by_language.txt` under `output_dir`.
    pub fn write_statistics(&self, stats: &PostStats) -> Result<(PathBuf, PathBuf)> {
        write_statistics(stats, &self.opts.output_dir, self.opts.write_buffer_bytes)
    }

    /// Aggregate, then write all outputs.
    pub fn run(&self) -> Result<RunReport> {
        let stats = self.aggregate()?;
        let monthly_files = self.write_monthly(&stats)?;
        let (general_stats_file, languages_file) = self.write_statistics(&stats)?;
        Ok(RunReport { stats, monthly_files, general_stats_file, languages_file })
    }
}

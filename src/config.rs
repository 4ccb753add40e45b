use std::path::{Path, PathBuf};

pub const DEFAULT_INPUT: &str = "datasets/tweets.jsonl";
pub const DEFAULT_OUTPUT_DIR: &str = "datasets/tweet_stats";
pub const MONTHLY_SUBDIR: &str = "monthly_tweet_ids";
pub const GENERAL_STATS_FILE: &str = "general_stats.txt";
pub const LANGUAGES_FILE: &str = "tweets_by_language.txt";

/// User-facing options with sensible defaults and builder chaining.
#[derive(Clone, Debug)]
pub struct StatsOptions {
    pub input: PathBuf,               // dump file, .zst dump, or directory of dumps
    pub output_dir: PathBuf,
    pub monthly_subdir: String,       // relative to output_dir
    pub progress: bool,               // show progress bars
    pub progress_label: Option<String>,

    // IO tuning
    pub read_buffer_bytes: usize,     // BufReader capacity
    pub write_buffer_bytes: usize,    // BufWriter capacity
}

impl Default for StatsOptions {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            monthly_subdir: MONTHLY_SUBDIR.to_string(),
            progress: true,
            progress_label: None,
            read_buffer_bytes: 256 * 1024,
            write_buffer_bytes: 64 * 1024,
        }
    }
}

impl StatsOptions {
    pub fn with_input(mut self, path: impl AsRef<Path>) -> Self {
        self.input = path.as_ref().to_path_buf();
        self
    }
    pub fn with_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }
    pub fn with_monthly_subdir(mut self, name: impl Into<String>) -> Self {
        self.monthly_subdir = name.into();
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
    pub fn with_progress_label(mut self, label: impl Into<String>) -> Self {
        self.progress_label = Some(label.into());
        self
    }
    pub fn with_io_read_buffer(mut self, bytes: usize) -> Self {
        self.read_buffer_bytes = bytes.max(8 * 1024);
        self
    }
    pub fn with_io_write_buffer(mut self, bytes: usize) -> Self {
        self.write_buffer_bytes = bytes.max(8 * 1024);
        self
    }

    /// Directory the per-month id files go to.
    pub fn monthly_dir(&self) -> PathBuf {
        self.output_dir.join(&self.monthly_subdir)
    }
}

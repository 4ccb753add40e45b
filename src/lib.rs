mod config;
mod date;
mod record;
mod util;
mod progress;

mod lines;
mod input;
mod aggregate;
mod output;
mod pipeline;

pub use crate::config::{StatsOptions, DEFAULT_INPUT, DEFAULT_OUTPUT_DIR, GENERAL_STATS_FILE, LANGUAGES_FILE, MONTHLY_SUBDIR};
pub use crate::date::{format_timestamp, parse_created_at, YearMonth};
pub use crate::pipeline::{RunReport, TweetStats};

// Aggregation core, usable without the file pipeline.
pub use crate::aggregate::{aggregate_lines, aggregate_reader, aggregate_reader_into, IdSet, LanguageCounts, PostStats, SkipCounts, SkipReason};
pub use crate::record::{parse_record, PostRecord};

// Input discovery and writers for application code.
pub use crate::input::{discover_inputs, open_input, InputFile, InputKind};
pub use crate::output::{write_monthly_files, write_statistics};

// Line I/O and robust file ops.
pub use crate::lines::{LineReader, LineWriter};
pub use crate::util::{create_with_backoff, init_tracing_once, open_with_backoff, replace_file_atomic_backoff};

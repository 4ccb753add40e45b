//! Single-pass aggregation over post lines.
//!
//! `PostStats` is the whole accumulator: month buckets of ids, total count,
//! unique authors, language frequencies and the first/last timestamps. Each
//! line goes through `PostStats::ingest_line`; lines that cannot be used are
//! counted in `SkipCounts` and reported as a `SkipReason` instead of failing
//! the run.

use crate::date::{parse_created_at, YearMonth};
use crate::lines::LineReader;
use crate::record::{parse_record, PostRecord};
use ahash::RandomState;
use anyhow::Result;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::io::BufRead;
use time::PrimitiveDateTime;

pub type IdSet = HashSet<String, RandomState>;

/// Why a line did not contribute to the statistics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// Empty or whitespace-only line.
    Blank,
    /// Not UTF-8, not JSON, or JSON that is not an object.
    InvalidJson(String),
    /// `id` or `created_at` absent or falsy.
    MissingField(&'static str),
    /// `created_at` is not a string or does not parse as `YYYY-MM-DDTHH:MM:SS.ffffffZ`.
    BadTimestamp(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Blank => write!(f, "blank line"),
            SkipReason::InvalidJson(e) => write!(f, "invalid JSON ({e})"),
            SkipReason::MissingField(field) => write!(f, "missing required field `{field}`"),
            SkipReason::BadTimestamp(raw) => write!(f, "malformed created_at {raw:?}"),
        }
    }
}

/// Per-reason tallies of skipped lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SkipCounts {
    pub blank: u64,
    pub invalid_json: u64,
    pub missing_field: u64,
    pub bad_timestamp: u64,
}

impl SkipCounts {
    fn record(&mut self, reason: &SkipReason) {
        match reason {
            SkipReason::Blank => self.blank += 1,
            SkipReason::InvalidJson(_) => self.invalid_json += 1,
            SkipReason::MissingField(_) => self.missing_field += 1,
            SkipReason::BadTimestamp(_) => self.bad_timestamp += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.blank + self.invalid_json + self.missing_field + self.bad_timestamp
    }
}

/// Language frequency table that remembers first-seen order.
/// `most_common` sorts by descending count and keeps first-seen order on ties.
#[derive(Clone, Debug, Default)]
pub struct LanguageCounts {
    counts: Vec<(String, u64)>,
    index: HashMap<String, usize, RandomState>,
}

impl LanguageCounts {
    pub fn increment(&mut self, lang: &str) {
        match self.index.get(lang) {
            Some(&i) => self.counts[i].1 += 1,
            None => {
                self.index.insert(lang.to_string(), self.counts.len());
                self.counts.push((lang.to_string(), 1));
            }
        }
    }

    pub fn get(&self, lang: &str) -> u64 {
        self.index.get(lang).map_or(0, |&i| self.counts[i].1)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|(_, n)| n).sum()
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, n)| (k.as_str(), *n))
    }

    pub fn most_common(&self) -> Vec<(&str, u64)> {
        let mut v: Vec<(&str, u64)> = self.iter().collect();
        // stable: ties stay in first-seen order
        v.sort_by(|a, b| b.1.cmp(&a.1));
        v
    }
}

impl PartialEq for LanguageCounts {
    fn eq(&self, other: &Self) -> bool {
        self.counts == other.counts
    }
}

impl Eq for LanguageCounts {}

/// The aggregation result. Built by ingesting lines, then only read.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PostStats {
    monthly: BTreeMap<YearMonth, IdSet>,
    total: u64,
    authors: IdSet,
    languages: LanguageCounts,
    first: Option<PrimitiveDateTime>,
    last: Option<PrimitiveDateTime>,
    skipped: SkipCounts,
}

impl PostStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest one raw line. On skip, the reason is tallied and returned.
    pub fn ingest_line(&mut self, line: &str) -> Result<(), SkipReason> {
        let res = if line.trim().is_empty() {
            Err(SkipReason::Blank)
        } else {
            parse_record(line)
                .map_err(|e| SkipReason::InvalidJson(e.to_string()))
                .and_then(|rec| self.ingest_record(&rec))
        };
        if let Err(reason) = &res {
            self.skipped.record(reason);
        }
        res
    }

    /// Same as `ingest_line` for a line that failed UTF-8 decoding upstream.
    pub(crate) fn reject_line(&mut self, reason: SkipReason) {
        self.skipped.record(&reason);
    }

    /// Fold a decoded record into the statistics. Does not touch skip tallies.
    pub fn ingest_record(&mut self, rec: &PostRecord) -> Result<(), SkipReason> {
        let id = rec.id_key().ok_or(SkipReason::MissingField("id"))?;
        if !rec.has_created_at() {
            return Err(SkipReason::MissingField("created_at"));
        }
        let raw_ts = rec.created_at_str().ok_or_else(|| {
            SkipReason::BadTimestamp(rec.created_at.as_ref().map(|v| v.to_string()).unwrap_or_default())
        })?;
        let ts = parse_created_at(raw_ts).ok_or_else(|| SkipReason::BadTimestamp(raw_ts.to_string()))?;

        if self.first.map_or(true, |f| ts < f) {
            self.first = Some(ts);
        }
        if self.last.map_or(true, |l| ts > l) {
            self.last = Some(ts);
        }

        self.monthly.entry(YearMonth::from_datetime(ts)).or_default().insert(id);
        self.total += 1;

        if let Some(author) = rec.author_key() {
            self.authors.insert(author);
        }
        if let Some(lang) = rec.lang_key() {
            self.languages.increment(&lang);
        }
        Ok(())
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Month buckets in calendar order.
    pub fn monthly(&self) -> &BTreeMap<YearMonth, IdSet> {
        &self.monthly
    }

    pub fn month(&self, ym: YearMonth) -> Option<&IdSet> {
        self.monthly.get(&ym)
    }

    pub fn unique_authors(&self) -> &IdSet {
        &self.authors
    }

    pub fn languages(&self) -> &LanguageCounts {
        &self.languages
    }

    pub fn first_timestamp(&self) -> Option<PrimitiveDateTime> {
        self.first
    }

    pub fn last_timestamp(&self) -> Option<PrimitiveDateTime> {
        self.last
    }

    pub fn skipped(&self) -> SkipCounts {
        self.skipped
    }
}

const PREVIEW_CHARS: usize = 200;

fn preview(line: &str) -> &str {
    match line.char_indices().nth(PREVIEW_CHARS) {
        Some((i, _)) => &line[..i],
        None => line,
    }
}

/// Ingest one line and log the diagnostic for a skip. Blank lines log at `debug`.
pub(crate) fn observe_line(stats: &mut PostStats, source: &str, line_no: u64, line: &str) {
    match stats.ingest_line(line) {
        Ok(()) => {}
        Err(SkipReason::Blank) => {
            tracing::debug!("{}:{}: skipping blank line", source, line_no);
        }
        Err(reason @ SkipReason::MissingField(_)) => {
            tracing::warn!("{}:{}: skipping post with {}: {}", source, line_no, reason, preview(line));
        }
        Err(reason) => {
            tracing::warn!("{}:{}: skipping line, {}: {}", source, line_no, reason, preview(line));
        }
    }
}

/// Aggregate in-memory lines into a fresh `PostStats`, logging skipped lines.
pub fn aggregate_lines<I, S>(lines: I) -> PostStats
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut stats = PostStats::new();
    for (i, line) in lines.into_iter().enumerate() {
        observe_line(&mut stats, "<memory>", i as u64 + 1, line.as_ref());
    }
    stats
}

/// Stream every line of `reader` into `stats`. Only I/O errors are returned;
/// non-UTF-8 lines are skipped like invalid JSON.
pub fn aggregate_reader_into<R: BufRead>(stats: &mut PostStats, source: &str, reader: R) -> Result<()> {
    let mut lines = LineReader::new(reader);
    while let Some((line_no, bytes)) = lines.next_line()? {
        match std::str::from_utf8(bytes) {
            Ok(line) => observe_line(stats, source, line_no, line),
            Err(e) => {
                tracing::warn!("{}:{}: skipping line, not valid UTF-8 ({})", source, line_no, e);
                stats.reject_line(SkipReason::InvalidJson(e.to_string()));
            }
        }
    }
    Ok(())
}

/// Aggregate a single reader into a fresh `PostStats`.
pub fn aggregate_reader<R: BufRead>(reader: R) -> Result<PostStats> {
    let mut stats = PostStats::new();
    aggregate_reader_into(&mut stats, "<reader>", reader)?;
    Ok(stats)
}

use std::fmt;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::PrimitiveDateTime;

/// `created_at` layouts, tried in order. The dumps write `2023-04-01T12:00:00.000000Z`;
/// month, day and time fields may also be unpadded (`2023-4-1T1:2:3.5Z`) and the
/// day may be space-padded, as `strptime("%Y-%m-%dT%H:%M:%S.%fZ")` allows.
/// Input is upper-cased first, so `t`/`z` are accepted too.
const CREATED_AT_FORMATS: [&[FormatItem<'static>]; 2] = [
    format_description!(
        "[year]-[month padding:none]-[day padding:none]T[hour padding:none]:[minute padding:none]:[second padding:none].[subsecond digits:1+]Z"
    ),
    format_description!(
        "[year]-[month padding:none]-[day padding:space]T[hour padding:none]:[minute padding:none]:[second padding:none].[subsecond digits:1+]Z"
    ),
];

/// Layout used in `general_stats.txt`.
const DISPLAY_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Parse a `created_at` string. Returns `None` for anything outside the
/// accepted layouts, including more than six fractional digits.
pub fn parse_created_at(s: &str) -> Option<PrimitiveDateTime> {
    let s = s.to_ascii_uppercase();
    let frac = s.rsplit_once('.').map(|(_, rest)| rest.trim_end_matches('Z').len());
    if matches!(frac, Some(n) if n > 6) {
        return None;
    }
    CREATED_AT_FORMATS
        .iter()
        .find_map(|layout| PrimitiveDateTime::parse(&s, *layout).ok())
}

/// Format a timestamp as `YYYY-MM-DD HH:MM:SS` (sub-second part dropped).
pub fn format_timestamp(dt: PrimitiveDateTime) -> String {
    dt.format(DISPLAY_FORMAT).unwrap_or_else(|_| dt.to_string())
}

/// Calendar month key with ordering, used to bucket post ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: u16,
    pub month: u8, // 1..=12
}

impl YearMonth {
    pub fn new(year: u16, month: u8) -> Self {
        assert!((1..=12).contains(&month), "Month must be 1..=12");
        Self { year, month }
    }

    pub fn from_datetime(dt: PrimitiveDateTime) -> Self {
        let year = dt.year().clamp(0, u16::MAX as i32) as u16;
        Self::new(year, dt.month() as u8)
    }

    /// Output file stem for this month, e.g. `tweet_ids_2023_04`.
    pub fn file_stem(&self) -> String {
        format!("tweet_ids_{:04}_{:02}", self.year, self.month)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

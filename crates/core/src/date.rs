use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unrecognised date: {0:?}")]
pub struct DateParseError(pub String);

/// Formats tried, in order, when the caller supplies no candidate formats.
const LENIENT_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
];

/// A candidate date format.
///
/// Accepts either dayjs-style tokens (`YYYY-MM-DD HH:mm:ss`, `DD/MM/YYYY`,
/// `[T]` for literals) or a raw chrono strftime pattern, recognised by the
/// presence of `%`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormat {
    source: String,
    pattern: String,
}

impl DateFormat {
    pub fn new(source: &str) -> Self {
        let pattern = if source.contains('%') {
            source.to_string()
        } else {
            translate_tokens(source)
        };
        Self {
            source: source.to_string(),
            pattern,
        }
    }

    /// The format as written by the user.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The chrono pattern this format compiles to.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Strict parse: the whole input must match. Date-only formats yield
    /// midnight; instants without an offset are taken as UTC.
    pub fn parse(&self, raw: &str) -> Option<DateTime<Utc>> {
        parse_with(raw, &self.pattern)
    }
}

impl From<&str> for DateFormat {
    fn from(s: &str) -> Self {
        DateFormat::new(s)
    }
}

fn parse_with(raw: &str, pattern: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_str(raw, pattern) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, pattern) {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(raw, pattern)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Parses `raw` with the first matching format, or leniently when `formats`
/// is empty.
pub fn parse_instant(raw: &str, formats: &[DateFormat]) -> Result<DateTime<Utc>, DateParseError> {
    let s = raw.trim();

    let parsed = if formats.is_empty() {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| LENIENT_FORMATS.iter().find_map(|fmt| parse_with(s, fmt)))
    } else {
        formats.iter().find_map(|fmt| fmt.parse(s))
    };

    parsed.ok_or_else(|| DateParseError(raw.to_string()))
}

/// ISO-8601 with millisecond precision and a `Z` suffix.
pub fn to_iso_millis(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn translate_tokens(source: &str) -> String {
    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '[' {
            i += 1;
            while i < chars.len() && chars[i] != ']' {
                push_literal(&mut out, chars[i]);
                i += 1;
            }
            i += 1;
            continue;
        }

        if !c.is_ascii_alphabetic() {
            push_literal(&mut out, c);
            i += 1;
            continue;
        }

        let run = chars[i..].iter().take_while(|&&x| x == c).count();
        match (c, run) {
            ('Y', 4) => out.push_str("%Y"),
            ('Y', 2) => out.push_str("%y"),
            ('M', 4) => out.push_str("%B"),
            ('M', 3) => out.push_str("%b"),
            ('M', 1 | 2) => out.push_str("%m"),
            ('D', 1 | 2) => out.push_str("%d"),
            ('H', 1 | 2) => out.push_str("%H"),
            ('h', 1 | 2) => out.push_str("%I"),
            ('m', 1 | 2) => out.push_str("%M"),
            ('s', 1 | 2) => out.push_str("%S"),
            ('S', 3) => out.push_str("%3f"),
            ('A' | 'a', 1) => out.push_str("%p"),
            ('Z', 1 | 2) => out.push_str("%z"),
            _ => chars[i..i + run].iter().for_each(|&x| push_literal(&mut out, x)),
        }
        i += run;
    }

    out
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}

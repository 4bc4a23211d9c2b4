//! Timestamp and duration display utilities.

use std::fmt;

use jiff::{tz::TimeZone, Timestamp};

/// A `Timestamp` shown in the system timezone as `YYYY-MM-DD HH:MM:SS TZ`.
pub struct LocalDateTime<'a>(pub &'a Timestamp);

impl fmt::Display for LocalDateTime<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.0
                .to_zoned(TimeZone::system())
                .strftime("%Y-%m-%d %H:%M:%S %Z")
        )
    }
}

/// Time between two timestamps, shown as `850ms`, `12.4s` or `3m 05s`.
///
/// A missing end, or an end before the start, shows as `-`.
pub struct Elapsed<'a> {
    pub start: &'a Timestamp,
    pub end: Option<&'a Timestamp>,
}

impl<'a> Elapsed<'a> {
    pub fn between(start: &'a Timestamp, end: Option<&'a Timestamp>) -> Self {
        Self { start, end }
    }
}

impl fmt::Display for Elapsed<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(end) = self.end else {
            return f.write_str("-");
        };
        let millis = end.as_millisecond() - self.start.as_millisecond();
        match millis {
            ms if ms < 0 => f.write_str("-"),
            ms if ms < 1_000 => write!(f, "{ms}ms"),
            ms if ms < 60_000 => write!(f, "{:.1}s", ms as f64 / 1_000.0),
            ms => write!(f, "{}m {:02}s", ms / 60_000, (ms % 60_000) / 1_000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ms: i64) -> Timestamp {
        Timestamp::from_millisecond(ms).expect("valid timestamp")
    }

    #[test]
    fn test_elapsed_units() {
        let start = at(1_700_000_000_000);
        let cases = [(850, "850ms"), (12_400, "12.4s"), (185_000, "3m 05s")];
        for (offset, expected) in cases {
            let end = at(1_700_000_000_000 + offset);
            assert_eq!(Elapsed::between(&start, Some(&end)).to_string(), expected);
        }
        assert_eq!(Elapsed::between(&start, None).to_string(), "-");
    }
}

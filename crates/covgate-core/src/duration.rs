//! Human duration literals: `5m`, `1h30m`, `1.5h`, `2w 3d`, `10 minutes`.
//!
//! Rendering follows the compact `1h30m0s` style so a parsed threshold can be
//! printed and read back without drift.

use std::fmt;
use std::time::Duration;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;
const NANOS_PER_MIN: u128 = 60 * NANOS_PER_SEC;
const NANOS_PER_HOUR: u128 = 60 * NANOS_PER_MIN;
const NANOS_PER_DAY: u128 = 24 * NANOS_PER_HOUR;
const NANOS_PER_WEEK: u128 = 7 * NANOS_PER_DAY;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DurationParseError {
    #[error("empty duration")]
    Empty,
    #[error("expected a number at \"{0}\"")]
    MissingNumber(String),
    #[error("missing unit after {0}")]
    MissingUnit(String),
    #[error("unknown unit \"{0}\"")]
    UnknownUnit(String),
    #[error("duration out of range")]
    Overflow,
}

fn unit_nanos(unit: &str) -> Option<u128> {
    let n = match unit {
        "ns" | "nsec" | "nanosecond" | "nanoseconds" => 1,
        "us" | "µs" | "μs" | "usec" | "microsecond" | "microseconds" => NANOS_PER_MICRO,
        "ms" | "msec" | "millisecond" | "milliseconds" => NANOS_PER_MILLI,
        "s" | "sec" | "secs" | "second" | "seconds" => NANOS_PER_SEC,
        "m" | "min" | "mins" | "minute" | "minutes" => NANOS_PER_MIN,
        "h" | "hr" | "hrs" | "hour" | "hours" => NANOS_PER_HOUR,
        "d" | "day" | "days" => NANOS_PER_DAY,
        "w" | "week" | "weeks" => NANOS_PER_WEEK,
        _ => return None,
    };
    Some(n)
}

/// Parse a compound duration literal.
pub fn parse_duration(input: &str) -> Result<Duration, DurationParseError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(DurationParseError::Empty);
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total: u128 = 0;
    let mut rest = s;
    while !rest.is_empty() {
        let num_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let number = &rest[..num_len];
        if number.is_empty() || number == "." || number.matches('.').count() > 1 {
            return Err(DurationParseError::MissingNumber(rest.to_string()));
        }
        rest = rest[num_len..].trim_start();

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.' || c.is_whitespace())
            .unwrap_or(rest.len());
        let unit = &rest[..unit_len];
        if unit.is_empty() {
            return Err(DurationParseError::MissingUnit(number.to_string()));
        }
        let scale =
            unit_nanos(unit).ok_or_else(|| DurationParseError::UnknownUnit(unit.to_string()))?;
        rest = rest[unit_len..].trim_start();

        total = total
            .checked_add(scaled(number, scale)?)
            .ok_or(DurationParseError::Overflow)?;
    }

    let nanos = u64::try_from(total).map_err(|_| DurationParseError::Overflow)?;
    Ok(Duration::from_nanos(nanos))
}

// Integer arithmetic keeps `1.5h` exact.
fn scaled(number: &str, scale: u128) -> Result<u128, DurationParseError> {
    let (whole, frac) = number.split_once('.').unwrap_or((number, ""));
    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| DurationParseError::Overflow)?
    };
    let mut nanos = whole
        .checked_mul(scale)
        .ok_or(DurationParseError::Overflow)?;
    if !frac.is_empty() {
        let digits = frac.len().min(18);
        let frac_val: u128 = frac[..digits]
            .parse()
            .map_err(|_| DurationParseError::Overflow)?;
        let denom = 10u128.pow(digits as u32);
        nanos = nanos
            .checked_add(frac_val.saturating_mul(scale) / denom)
            .ok_or(DurationParseError::Overflow)?;
    }
    Ok(nanos)
}

/// Display wrapper rendering a duration as `1h30m0s`, `10m1s`, `1.5s`, `250ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct HumanDuration(pub Duration);

impl HumanDuration {
    /// Build from a nanosecond count as reported by test runners. Negative and
    /// non-finite values clamp to zero; fractional nanoseconds are truncated.
    pub fn from_nanos_f64(nanos: f64) -> Self {
        if !nanos.is_finite() || nanos <= 0.0 {
            return HumanDuration(Duration::ZERO);
        }
        HumanDuration(Duration::from_nanos(nanos.min(u64::MAX as f64) as u64))
    }
}

impl From<Duration> for HumanDuration {
    fn from(d: Duration) -> Self {
        HumanDuration(d)
    }
}

impl fmt::Display for HumanDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nanos = self.0.as_nanos();
        if nanos == 0 {
            return write!(f, "0s");
        }
        if nanos < NANOS_PER_MICRO {
            return write!(f, "{nanos}ns");
        }
        if nanos < NANOS_PER_MILLI {
            return write!(f, "{}µs", decimal(nanos, NANOS_PER_MICRO));
        }
        if nanos < NANOS_PER_SEC {
            return write!(f, "{}ms", decimal(nanos, NANOS_PER_MILLI));
        }

        let hours = nanos / NANOS_PER_HOUR;
        let minutes = (nanos % NANOS_PER_HOUR) / NANOS_PER_MIN;
        let seconds = decimal(nanos % NANOS_PER_MIN, NANOS_PER_SEC);
        if hours > 0 {
            write!(f, "{hours}h{minutes}m{seconds}s")
        } else if minutes > 0 {
            write!(f, "{minutes}m{seconds}s")
        } else {
            write!(f, "{seconds}s")
        }
    }
}

fn decimal(value: u128, unit: u128) -> String {
    let whole = value / unit;
    let frac = value % unit;
    if frac == 0 {
        return whole.to_string();
    }
    let width = unit.ilog10() as usize;
    let digits = format!("{frac:0width$}");
    format!("{whole}.{}", digits.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mins(m: u64) -> Duration {
        Duration::from_secs(m * 60)
    }

    #[test]
    fn simple_units() {
        assert_eq!(parse_duration("5m").unwrap(), mins(5));
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("2h").unwrap(), mins(120));
        assert_eq!(parse_duration("1d").unwrap(), mins(24 * 60));
        assert_eq!(parse_duration("1w").unwrap(), mins(7 * 24 * 60));
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("0").unwrap(), Duration::ZERO);
    }

    #[test]
    fn compound_and_spaced() {
        assert_eq!(parse_duration("1h30m").unwrap(), mins(90));
        assert_eq!(parse_duration("1h 30m").unwrap(), mins(90));
        assert_eq!(parse_duration("10 minutes").unwrap(), mins(10));
        assert_eq!(
            parse_duration("1w2d3h").unwrap(),
            Duration::from_secs(((7 + 2) * 24 + 3) * 3600)
        );
    }

    #[test]
    fn fractional_values_are_exact() {
        assert_eq!(parse_duration("1.5h").unwrap(), mins(90));
        assert_eq!(parse_duration(".5s").unwrap(), Duration::from_millis(500));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_duration(""), Err(DurationParseError::Empty));
        assert!(matches!(
            parse_duration("10"),
            Err(DurationParseError::MissingUnit(_))
        ));
        assert!(matches!(
            parse_duration("10 parsecs"),
            Err(DurationParseError::UnknownUnit(_))
        ));
        assert!(matches!(
            parse_duration("m"),
            Err(DurationParseError::MissingNumber(_))
        ));
        assert!(matches!(
            parse_duration("-5m"),
            Err(DurationParseError::MissingNumber(_))
        ));
        assert!(matches!(
            parse_duration("1.2.3s"),
            Err(DurationParseError::MissingNumber(_))
        ));
    }

    #[test]
    fn renders_compact_form() {
        assert_eq!(HumanDuration(mins(10)).to_string(), "10m0s");
        assert_eq!(HumanDuration(mins(90)).to_string(), "1h30m0s");
        assert_eq!(
            HumanDuration(Duration::from_secs(601)).to_string(),
            "10m1s"
        );
        assert_eq!(
            HumanDuration(Duration::from_millis(1500)).to_string(),
            "1.5s"
        );
        assert_eq!(
            HumanDuration(Duration::from_millis(250)).to_string(),
            "250ms"
        );
        assert_eq!(HumanDuration(Duration::from_nanos(42)).to_string(), "42ns");
        assert_eq!(HumanDuration(Duration::ZERO).to_string(), "0s");
    }

    #[test]
    fn render_and_reparse_is_stable() {
        let first = parse_duration("1h30m").unwrap();
        let mut current = first;
        for _ in 0..5 {
            let text = HumanDuration(current).to_string();
            current = parse_duration(&text).unwrap();
            assert_eq!(current, first);
        }
        assert_eq!(current.as_nanos(), 5_400_000_000_000);
    }

    #[test]
    fn float_nanos_clamp() {
        assert_eq!(HumanDuration::from_nanos_f64(-3.0).0, Duration::ZERO);
        assert_eq!(HumanDuration::from_nanos_f64(f64::NAN).0, Duration::ZERO);
        assert_eq!(
            HumanDuration::from_nanos_f64(601_000_000_000.0).to_string(),
            "10m1s"
        );
    }
}

use std::time::Duration;

use covgate_core::duration::parse_duration;
use covgate_core::errors::{ThresholdGrammar, ThresholdParseError};

fn invalid(grammar: ThresholdGrammar, input: &str, reason: impl Into<String>) -> ThresholdParseError {
    ThresholdParseError {
        grammar,
        input: input.to_string(),
        reason: reason.into(),
    }
}

fn parse_number(grammar: ThresholdGrammar, input: &str, rest: &str) -> Result<f64, ThresholdParseError> {
    let n: f64 = rest
        .trim()
        .parse()
        .map_err(|e| invalid(grammar, input, format!("{e}")))?;
    if !n.is_finite() {
        return Err(invalid(grammar, input, "not a finite number"));
    }
    Ok(n)
}

/// `"80%"` or `"80"` → `80.0`.
pub fn parse_percentage(input: &str) -> Result<f64, ThresholdParseError> {
    let trimmed = input.trim();
    let rest = trimmed.strip_suffix('%').unwrap_or(trimmed);
    parse_number(ThresholdGrammar::Percentage, input, rest)
}

/// `"1:1.2"` or `"1.2"` → `1.2`.
pub fn parse_ratio(input: &str) -> Result<f64, ThresholdParseError> {
    let trimmed = input.trim();
    let rest = trimmed.strip_prefix("1:").unwrap_or(trimmed);
    parse_number(ThresholdGrammar::Ratio, input, rest)
}

/// `"1h30m"` → 90 minutes.
pub fn parse_duration_threshold(input: &str) -> Result<Duration, ThresholdParseError> {
    parse_duration(input).map_err(|e| invalid(ThresholdGrammar::Duration, input, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage() {
        assert_eq!(parse_percentage("80%").unwrap(), 80.0);
        assert_eq!(parse_percentage(" 72.5 ").unwrap(), 72.5);
        assert!(parse_percentage("80%%").is_err());
        assert!(parse_percentage("abc%").is_err());
        assert!(parse_percentage("inf%").is_err());
    }

    #[test]
    fn ratio() {
        assert_eq!(parse_ratio("1:1.2").unwrap(), 1.2);
        assert_eq!(parse_ratio("0.8").unwrap(), 0.8);
        assert!(parse_ratio("2:1").is_err());
        assert!(parse_ratio("1:").is_err());
    }

    #[test]
    fn duration() {
        assert_eq!(
            parse_duration_threshold("1h30m").unwrap(),
            Duration::from_secs(90 * 60)
        );
        let err = parse_duration_threshold("ten minutes").unwrap_err();
        assert_eq!(err.grammar, ThresholdGrammar::Duration);
        assert!(err.to_string().contains("\"ten minutes\""));
    }
}

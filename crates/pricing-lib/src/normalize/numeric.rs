//! Numeric input coercion and bounds checking
//!
//! Accepts messy input such as "512GB", "1,024", "2 kg" or "sixteen" and
//! turns it into a value of the expected kind. Out-of-range values are
//! rejected, never clamped.

use crate::error::Rejection;
use crate::events::EventLogger;
use crate::models::{Bounds, NumericKind, NumericValue};
use regex::Regex;
use std::sync::OnceLock;

/// Number words understood by the coercer, in lookup order
const NUMBER_WORDS: &[(&str, f64)] = &[
    ("zero", 0.0),
    ("none", 0.0),
    ("nil", 0.0),
    ("no", 0.0),
    ("one", 1.0),
    ("two", 2.0),
    ("three", 3.0),
    ("four", 4.0),
    ("five", 5.0),
    ("six", 6.0),
    ("seven", 7.0),
    ("eight", 8.0),
    ("nine", 9.0),
    ("ten", 10.0),
    ("twelve", 12.0),
    ("sixteen", 16.0),
    ("twenty", 20.0),
    ("thirty two", 32.0),
    ("thirty-two", 32.0),
    ("sixty four", 64.0),
    ("sixty-four", 64.0),
    ("one hundred", 100.0),
    ("one hundred twenty eight", 128.0),
    ("one hundred twenty-eight", 128.0),
    ("two hundred fifty six", 256.0),
    ("two hundred fifty-six", 256.0),
    ("five hundred twelve", 512.0),
    ("one thousand twenty four", 1024.0),
    ("one thousand twenty-four", 1024.0),
];

/// Unit tokens and their multipliers; longer tokens first
const UNITS: &[(&str, f64)] = &[
    ("inches", 1.0),
    ("inch", 1.0),
    ("kgs", 1.0),
    ("gib", 1.0),
    ("kg", 1.0),
    ("gb", 1.0),
    ("tb", 1024.0),
    ("in", 1.0),
    ("g", 1.0),
    ("\"", 1.0),
];

fn numeric_literal() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-?\d+(?:\.\d+)?").expect("numeric literal pattern is valid"))
}

/// First number in the input, with the unit directly attached to it
fn quantity() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(-?\d+(?:\.\d+)?)\s*(?:(inches|inch|kgs|gib|kg|gb|tb|in|g)\b|("))?"#)
            .expect("quantity pattern is valid")
    })
}

fn unit_factor(unit: &str) -> f64 {
    UNITS
        .iter()
        .find(|(token, _)| *token == unit)
        .map(|(_, factor)| *factor)
        .unwrap_or(1.0)
}

fn word_value(s: &str) -> Option<f64> {
    NUMBER_WORDS
        .iter()
        .find(|(word, _)| *word == s)
        .map(|(_, value)| *value)
}

/// Number word followed by a unit, e.g. "thirty-two gb"
fn word_with_unit(s: &str) -> Option<f64> {
    UNITS.iter().find_map(|(unit, factor)| {
        let words = s.strip_suffix(unit)?;
        if !words.ends_with(char::is_whitespace) {
            return None;
        }
        word_value(words.trim_end()).map(|value| value * factor)
    })
}

/// Extract a number from messy input, or `None` if nothing numeric is present
pub fn coerce(raw: &str) -> Option<f64> {
    let s = raw
        .to_lowercase()
        .replace(',', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if let Some(value) = word_value(&s) {
        return Some(value);
    }

    match quantity().captures(&s) {
        Some(caps) => {
            let value = caps[1].parse::<f64>().ok()?;
            let factor = caps
                .get(2)
                .or_else(|| caps.get(3))
                .map(|unit| unit_factor(unit.as_str()))
                .unwrap_or(1.0);
            Some(value * factor)
        }
        None => word_with_unit(&s),
    }
}

/// Value of the input when it is nothing but a numeric literal
fn plain_literal(trimmed: &str) -> Option<f64> {
    numeric_literal()
        .find(trimmed)
        .filter(|m| m.start() == 0 && m.end() == trimmed.len())
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

fn cast(value: f64, kind: NumericKind) -> Option<NumericValue> {
    if !value.is_finite() {
        return None;
    }
    match kind {
        NumericKind::Float => Some(NumericValue::Float(value)),
        NumericKind::Integer => {
            let truncated = value.trunc();
            if truncated < i64::MIN as f64 || truncated > i64::MAX as f64 {
                None
            } else {
                Some(NumericValue::Int(truncated as i64))
            }
        }
    }
}

/// Coerce, cast and bounds-check a raw numeric input.
///
/// Empty input yields `default` when one is configured. Every rejection is
/// logged as an error; a successful coercion from anything other than a plain
/// literal of the same value is logged as a warning.
pub fn validate_numeric(
    raw: &str,
    kind: NumericKind,
    bounds: Bounds,
    default: Option<NumericValue>,
    field: &str,
    events: &EventLogger,
) -> Result<NumericValue, Rejection> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return match default {
            Some(value) => Ok(value),
            None => {
                events.error(field, raw, "Empty input with no default");
                Err(Rejection::Empty)
            }
        };
    }

    let Some(coerced) = coerce(trimmed) else {
        events.error(field, raw, "Unparseable numeric input");
        return Err(Rejection::Unparseable);
    };

    let Some(value) = cast(coerced, kind) else {
        events.error(field, raw, format!("Cast to {} failed after coercion", kind));
        return Err(Rejection::Unparseable);
    };

    let v = value.as_f64();
    if let Some(min) = bounds.min.filter(|min| v < *min) {
        events.error(field, raw, format!("Below min ({}) after coercion -> {}", min, value));
        return Err(Rejection::TooLow { min });
    }
    if let Some(max) = bounds.max.filter(|max| v > *max) {
        events.error(field, raw, format!("Above max ({}) after coercion -> {}", max, value));
        return Err(Rejection::TooHigh { max });
    }

    if plain_literal(trimmed) != Some(v) {
        events.warn(field, raw, format!("Auto-coerced to {}", value));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn logger() -> (TempDir, EventLogger) {
        let dir = TempDir::new().unwrap();
        let logger = EventLogger::new(dir.path().join("events.log"));
        (dir, logger)
    }

    fn log_lines(dir: &TempDir) -> Vec<String> {
        std::fs::read_to_string(dir.path().join("events.log"))
            .map(|s| s.lines().map(String::from).collect())
            .unwrap_or_default()
    }

    fn int(raw: &str, bounds: Bounds, default: Option<i64>) -> Result<NumericValue, Rejection> {
        let events = EventLogger::disabled();
        validate_numeric(
            raw,
            NumericKind::Integer,
            bounds,
            default.map(NumericValue::Int),
            "SSD",
            &events,
        )
    }

    #[test]
    fn test_unit_suffix_is_stripped() {
        let (dir, events) = logger();
        let value = validate_numeric(
            "512GB",
            NumericKind::Integer,
            Bounds::at_least(0.0),
            None,
            "SSD",
            &events,
        );
        assert_eq!(value, Ok(NumericValue::Int(512)));

        let lines = log_lines(&dir);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("WARN | Field: SSD | Value: '512GB' | Auto-coerced to 512"));
    }

    #[test]
    fn test_number_words() {
        assert_eq!(int("zero", Bounds::default(), None), Ok(NumericValue::Int(0)));
        assert_eq!(int("Sixteen", Bounds::default(), None), Ok(NumericValue::Int(16)));
        assert_eq!(int("thirty-two gb", Bounds::default(), None), Ok(NumericValue::Int(32)));
        assert_eq!(
            int("one hundred twenty eight", Bounds::default(), None),
            Ok(NumericValue::Int(128))
        );
    }

    #[test]
    fn test_empty_uses_default_only_when_configured() {
        assert_eq!(int("", Bounds::default(), Some(0)), Ok(NumericValue::Int(0)));
        assert_eq!(int("   ", Bounds::default(), None), Err(Rejection::Empty));
    }

    #[test]
    fn test_out_of_range_is_rejected_not_clamped() {
        assert_eq!(
            int("9999", Bounds::at_most(128.0), None),
            Err(Rejection::TooHigh { max: 128.0 })
        );
        assert_eq!(
            int("1", Bounds::new(2.0, 128.0), Some(8)),
            Err(Rejection::TooLow { min: 2.0 })
        );
        assert_eq!(
            int("-5", Bounds::at_least(0.0), None),
            Err(Rejection::TooLow { min: 0.0 })
        );
    }

    #[test]
    fn test_rejections_are_logged_as_errors() {
        let (dir, events) = logger();
        let result = validate_numeric(
            "9999",
            NumericKind::Integer,
            Bounds::at_most(128.0),
            None,
            "Ram",
            &events,
        );
        assert!(result.is_err());
        let result = validate_numeric(
            "lots",
            NumericKind::Integer,
            Bounds::default(),
            None,
            "Ram",
            &events,
        );
        assert_eq!(result, Err(Rejection::Unparseable));

        let lines = log_lines(&dir);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("ERROR | Field: Ram | Value: '9999' | Above max (128) after coercion -> 9999"));
        assert!(lines[1].contains("ERROR | Field: Ram | Value: 'lots' | Unparseable numeric input"));
    }

    #[test]
    fn test_plain_literal_is_silent() {
        let (dir, events) = logger();
        let ram = validate_numeric(
            "8",
            NumericKind::Integer,
            Bounds::new(2.0, 128.0),
            None,
            "Ram",
            &events,
        );
        let weight = validate_numeric(
            "2",
            NumericKind::Float,
            Bounds::new(0.5, 5.0),
            None,
            "Weight",
            &events,
        );
        assert_eq!(ram, Ok(NumericValue::Int(8)));
        assert_eq!(weight, Ok(NumericValue::Float(2.0)));
        assert!(log_lines(&dir).is_empty());
    }

    #[test]
    fn test_integer_truncation_is_reported() {
        let (dir, events) = logger();
        let ram = validate_numeric(
            "8.7",
            NumericKind::Integer,
            Bounds::default(),
            None,
            "Ram",
            &events,
        );
        assert_eq!(ram, Ok(NumericValue::Int(8)));
        assert_eq!(log_lines(&dir).len(), 1);
    }

    #[test]
    fn test_coerce_variants() {
        assert_eq!(coerce("1,024"), Some(1024.0));
        assert_eq!(coerce("2.5 kg"), Some(2.5));
        assert_eq!(coerce("15.6\""), Some(15.6));
        assert_eq!(coerce("15.6 inches"), Some(15.6));
        assert_eq!(coerce("1TB"), Some(1024.0));
        assert_eq!(coerce("about 8 gigs"), Some(8.0));
        assert_eq!(coerce("8 gigs"), Some(8.0));
        assert_eq!(coerce("lots"), None);
        assert_eq!(coerce(""), None);
    }

    #[test]
    fn test_unit_attached_to_number_inside_text() {
        assert_eq!(coerce("1 TB SSD"), Some(1024.0));
        assert_eq!(coerce("2tb hdd"), Some(2048.0));
        assert_eq!(coerce("512 GB NVMe"), Some(512.0));
        assert_eq!(coerce("1.8 kg approx"), Some(1.8));
        assert_eq!(coerce("15.6\" FHD"), Some(15.6));
        assert_eq!(coerce("256gb ssd + 1tb hdd"), Some(256.0));

        let (dir, events) = logger();
        let ssd = validate_numeric(
            "1 TB SSD",
            NumericKind::Integer,
            Bounds::new(0.0, 4000.0),
            Some(NumericValue::Int(0)),
            "SSD",
            &events,
        );
        assert_eq!(ssd, Ok(NumericValue::Int(1024)));
        assert!(log_lines(&dir)[0].contains("Value: '1 TB SSD' | Auto-coerced to 1024"));
    }

    #[test]
    fn test_coercion_is_deterministic() {
        let first = int("256 GB", Bounds::default(), None);
        for _ in 0..10 {
            assert_eq!(int("256 GB", Bounds::default(), None), first);
        }
    }
}

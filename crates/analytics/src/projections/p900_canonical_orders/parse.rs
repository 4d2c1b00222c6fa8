use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

/// Zoned formats beyond RFC 3339 (Postgres `timestamptz` text output)
const ZONED_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Largest magnitude of a single amount; anything above is unreadable
const MAX_AMOUNT: i64 = 1_000_000_000_000;

/// Decimal places kept for an amount
const AMOUNT_SCALE: u32 = 4;

/// Parse a monetary value.
///
/// Numbers are taken as-is. Strings are stripped of everything except digits,
/// `.` and `-` first, so `"$1,234.50"` reads as `1234.50`. The result is
/// rounded to four decimal places; magnitudes above one trillion are rejected
/// so that sums and growth figures stay inside the `Decimal` range.
pub fn parse_amount(value: &Value) -> Option<Decimal> {
    let amount = parse_decimal(value)?.round_dp(AMOUNT_SCALE);
    (amount.abs() <= Decimal::from(MAX_AMOUNT)).then_some(amount)
}

fn parse_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            let s = n.to_string();
            Decimal::from_str(&s)
                .or_else(|_| Decimal::from_scientific(&s))
                .ok()
        }
        Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            if cleaned.is_empty() {
                return None;
            }
            Decimal::from_str(&cleaned).ok()
        }
        _ => None,
    }
}

/// Parse an order timestamp; naive values are taken as UTC
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let s = match value {
        Value::String(s) => s.trim(),
        _ => return None,
    };
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ZONED_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(DateTime::from_naive_utc_and_offset(ndt, Utc));
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|ndt| DateTime::from_naive_utc_and_offset(ndt, Utc));
        }
    }
    None
}

/// Trimmed text of a scalar value; empty strings and nulls are absent
pub fn parse_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

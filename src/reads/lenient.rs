//! Tolerant decoding for read-record fields
//!
//! Records come from a store that may hold hand-edited or legacy data. A
//! field that cannot be understood decodes as missing instead of failing the
//! whole record, so one bad value only drops out of the statistics that need
//! it.

use super::types::{Rating, ReadRecord};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Parse a calendar date (`YYYY-MM-DD`, or the date prefix of an RFC 3339
/// timestamp)
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
        raw.get(..10)
            .filter(|_| raw.as_bytes().get(10) == Some(&b'T'))
            .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
    })
}

/// Decode a page count from a JSON value
pub fn page_count_from_value(value: &Value) -> Option<u32> {
    let n = value.as_f64()?;
    if !n.is_finite() || n < 0.0 || n.fract() != 0.0 || n > u32::MAX as f64 {
        return None;
    }
    Some(n as u32)
}

/// Decode a fetched collection one record at a time
///
/// A record that can't be decoded at all (unknown category, missing title)
/// is skipped with a warning instead of failing the whole collection.
pub fn records_from_values(values: Vec<Value>) -> Vec<ReadRecord> {
    let total = values.len();
    let records: Vec<ReadRecord> = values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<ReadRecord>(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping read at position {}: {}", index, e);
                None
            }
        })
        .collect();
    if records.len() < total {
        tracing::warn!("Decoded {} of {} fetched reads", records.len(), total);
    }
    records
}

pub(crate) fn date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().and_then(parse_date))
}

pub(crate) fn page_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(page_count_from_value(&value))
}

pub(crate) fn rating<'de, D>(deserializer: D) -> Result<Option<Rating>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_f64().and_then(Rating::from_stars))
}

/// `null` and non-boolean values decode as `false`
pub(crate) fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_bool().unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_date_plain() {
        assert_eq!(
            parse_date("2024-03-10"),
            NaiveDate::from_ymd_opt(2024, 3, 10)
        );
        assert_eq!(
            parse_date(" 2024-03-10 "),
            NaiveDate::from_ymd_opt(2024, 3, 10)
        );
    }

    #[test]
    fn test_parse_date_timestamp_prefix() {
        assert_eq!(
            parse_date("2023-12-31T22:00:00Z"),
            NaiveDate::from_ymd_opt(2023, 12, 31)
        );
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert!(parse_date("").is_none());
        assert!(parse_date("not a date").is_none());
        assert!(parse_date("2024-13-01").is_none());
        assert!(parse_date("2024-02-30").is_none());
        assert!(parse_date("2024-03-10x").is_none());
    }

    #[test]
    fn test_records_from_values_skips_bad_elements() {
        let values = vec![
            json!({"id": 1, "title": "Monster", "author": "Naoki Urasawa",
                   "book_type": "Manga", "finish_date": "2024-03-01",
                   "demographic": "Seinen", "fiction": true}),
            json!({"id": 2, "title": "Spice and Wolf", "author": "Isuna Hasekura",
                   "book_type": "Light Novel", "demographic": "Adult", "fiction": true}),
            json!("not an object"),
        ];

        let records = records_from_values(values);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 1);
        assert_eq!(records[0].reading_year(), Some(2024));
    }

    #[test]
    fn test_page_count_values() {
        assert_eq!(page_count_from_value(&json!(300)), Some(300));
        assert_eq!(page_count_from_value(&json!(0)), Some(0));
        assert_eq!(page_count_from_value(&json!(250.0)), Some(250));
        assert_eq!(page_count_from_value(&json!(12.5)), None);
        assert_eq!(page_count_from_value(&json!(-4)), None);
        assert_eq!(page_count_from_value(&json!("300")), None);
        assert_eq!(page_count_from_value(&Value::Null), None);
    }
}

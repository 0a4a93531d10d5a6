//! Wire formats shared by the DTOs.
//!
//! Stock forms exchange their dates as `yyyy-MM-dd HH:mm:ss` local timestamps
//! rather than RFC 3339, and inventory periods are addressed as `YYYY-MM`.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serializer};

pub const FORM_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `#[serde(with = "form_datetime")]` for `NaiveDateTime` fields.
pub mod form_datetime {
    use super::*;

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(FORM_DATETIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(raw.trim(), FORM_DATETIME_FORMAT)
            .map_err(|_| serde::de::Error::custom("expected a date formatted as yyyy-MM-dd HH:mm:ss"))
    }
}

/// Same as [`form_datetime`] for optional fields; `null` and `""` both mean absent.
pub mod option_form_datetime {
    use super::*;

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => form_datetime::serialize(v, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => NaiveDateTime::parse_from_str(raw.trim(), FORM_DATETIME_FORMAT)
                .map(Some)
                .map_err(|_| {
                    serde::de::Error::custom("expected a date formatted as yyyy-MM-dd HH:mm:ss")
                }),
            None => Ok(None),
        }
    }
}

/// Parses `YYYY-MM` into the first day of that month.
pub fn parse_month(raw: &str) -> Option<NaiveDate> {
    let (year, month) = raw.trim().split_once('-')?;
    if year.len() != 4 || month.len() != 2 {
        return None;
    }
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
}

/// First day of the month after `period`.
pub fn next_month(period: NaiveDate) -> Option<NaiveDate> {
    period.checked_add_months(chrono::Months::new(1))
}

pub fn deserialize_month<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_month(&raw).ok_or_else(|| serde::de::Error::custom("expected a month formatted as YYYY-MM"))
}

pub fn serialize_month<S>(value: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.format("%Y-%m").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Form {
        #[serde(with = "form_datetime")]
        date_in: NaiveDateTime,
        #[serde(default, with = "option_form_datetime")]
        date_out: Option<NaiveDateTime>,
    }

    #[test]
    fn test_form_datetime_roundtrip_shape() {
        let form: Form = serde_json::from_str(r#"{"date_in":"2024-03-05 14:30:00"}"#).unwrap();
        assert_eq!(form.date_in.to_string(), "2024-03-05 14:30:00");
        assert!(form.date_out.is_none());

        let json = serde_json::to_string(&form).unwrap();
        assert!(json.contains(r#""date_in":"2024-03-05 14:30:00""#));
    }

    #[test]
    fn test_form_datetime_rejects_iso8601() {
        let result: Result<Form, _> = serde_json::from_str(r#"{"date_in":"2024-03-05T14:30:00Z"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_optional_form_datetime_empty_string() {
        let form: Form =
            serde_json::from_str(r#"{"date_in":"2024-03-05 14:30:00","date_out":""}"#).unwrap();
        assert!(form.date_out.is_none());
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(
            parse_month("2024-02"),
            NaiveDate::from_ymd_opt(2024, 2, 1)
        );
        assert_eq!(parse_month("2024-13"), None);
        assert_eq!(parse_month("2024-2"), None);
        assert_eq!(parse_month("24-02"), None);
        assert_eq!(parse_month("garbage"), None);
    }

    #[test]
    fn test_next_month_rolls_year() {
        let december = NaiveDate::from_ymd_opt(2023, 12, 1).unwrap();
        assert_eq!(next_month(december), NaiveDate::from_ymd_opt(2024, 1, 1));
    }
}

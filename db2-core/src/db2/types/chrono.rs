use crate::db2::types::ColumnValue;
use crate::db2::Db2Value;
use crate::error::BoxDynError;
use crate::model::PropertyValue;
use crate::sql::ParameterizedSql;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

const TIMESTAMP_EXPR: &str = "to_timestamp(?,'yyyy-mm-dd hh24:mi:ss.ff3')";
const DATE_EXPR: &str = "to_date(?,'yyyy-mm-dd')";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    // DB2's own TIMESTAMP rendering
    "%Y-%m-%d-%H.%M.%S%.f",
    // Date#toString, once the zone name is cut off
    "%a %b %d %Y %H:%M:%S",
];

enum Temporal {
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
}

impl Temporal {
    fn into_datetime(self) -> DateTime<Utc> {
        match self {
            Temporal::Date(date) => Utc.from_utc_datetime(&date.and_time(NaiveTime::default())),
            Temporal::DateTime(ts) => ts,
        }
    }
}

/// Cuts a trailing `GMT...` or ` UTC` zone name; the remaining text is read as UTC.
fn strip_zone_name(text: &str) -> &str {
    let text = match text.find("GMT") {
        Some(at) => &text[..at],
        None => text,
    };
    let text = text.trim();
    text.strip_suffix(" UTC").unwrap_or(text).trim_end()
}

fn parse_text(text: &str) -> Result<Temporal, BoxDynError> {
    let text = strip_zone_name(text);

    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Ok(Temporal::DateTime(ts.with_timezone(&Utc)));
    }

    for format in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(Temporal::DateTime(Utc.from_utc_datetime(&ts)));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Ok(Temporal::Date(date));
    }

    Err(format!("invalid date/time value {:?}", text).into())
}

fn from_millis(millis: f64) -> Result<Temporal, BoxDynError> {
    if !millis.is_finite() {
        return Err(format!("invalid epoch milliseconds {}", millis).into());
    }

    Utc.timestamp_millis_opt(millis.trunc() as i64)
        .single()
        .map(Temporal::DateTime)
        .ok_or_else(|| format!("epoch milliseconds {} out of range", millis).into())
}

fn temporal_of(value: &Db2Value) -> Result<Temporal, BoxDynError> {
    match value {
        Db2Value::Int(millis) => from_millis(*millis as f64),
        Db2Value::Double(millis) => from_millis(*millis),
        Db2Value::Text(text) => parse_text(text),
        Db2Value::Bytes(bytes) => parse_text(&String::from_utf8_lossy(bytes)),
        Db2Value::Null => Err("NULL is not a date/time value".into()),
    }
}

pub(crate) fn to_datetime(value: &Db2Value) -> Result<DateTime<Utc>, BoxDynError> {
    temporal_of(value).map(Temporal::into_datetime)
}

pub(crate) fn decode(value: &Db2Value) -> Result<PropertyValue, BoxDynError> {
    to_datetime(value).map(PropertyValue::DateTime)
}

pub(crate) fn encode(value: &PropertyValue) -> Result<ColumnValue, BoxDynError> {
    let temporal = match value {
        PropertyValue::DateTime(ts) => Temporal::DateTime(*ts),
        PropertyValue::Date(date) => Temporal::Date(*date),
        PropertyValue::String(text) => parse_text(text)?,
        PropertyValue::Number(millis) => from_millis(*millis)?,
        PropertyValue::Json(serde_json::Value::String(text)) => parse_text(text)?,
        PropertyValue::Json(serde_json::Value::Number(millis)) => {
            from_millis(millis.as_f64().unwrap_or(f64::NAN))?
        }
        PropertyValue::Raw(value) => temporal_of(value)?,
        other => return Err(format!("{:?} is not a date/time value", other).into()),
    };

    let expr = match temporal {
        Temporal::DateTime(ts) => ParameterizedSql::new(
            TIMESTAMP_EXPR,
            vec![Db2Value::Text(ts.format("%Y-%m-%d %H:%M:%S%.3f").to_string())],
        ),
        Temporal::Date(date) => ParameterizedSql::new(
            DATE_EXPR,
            vec![Db2Value::Text(date.format("%Y-%m-%d").to_string())],
        ),
    };

    Ok(ColumnValue::Expression(expr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap() + Duration::milliseconds(6)
    }

    fn decoded(text: &str) -> DateTime<Utc> {
        to_datetime(&Db2Value::from(text)).unwrap()
    }

    #[test]
    fn test_decode_driver_renderings() {
        assert_eq!(decoded("2024-01-02T03:04:05.006Z"), sample());
        assert_eq!(decoded("2024-01-02 03:04:05.006"), sample());
        assert_eq!(decoded("2024-01-02-03.04.05.006000"), sample());
        assert_eq!(decoded("2024-01-02 03:04:05.006 UTC"), sample());
        assert_eq!(
            decoded("2024-01-02 03:04:05"),
            Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
        );
    }

    #[test]
    fn test_decode_strips_gmt_suffix() {
        assert_eq!(
            decoded("Tue Jan 02 2024 03:04:05 GMT+0000 (Coordinated Universal Time)"),
            Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
        );
    }

    #[test]
    fn test_decode_dates_and_epochs() {
        assert_eq!(
            decoded("2024-01-02"),
            Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()
        );
        assert_eq!(to_datetime(&Db2Value::Int(1_704_164_645_006)).unwrap(), sample());
        assert!(to_datetime(&Db2Value::from("not a date")).is_err());
        assert!(to_datetime(&Db2Value::Double(f64::NAN)).is_err());
    }

    #[test]
    fn test_encode_timestamp() {
        let expected = ColumnValue::Expression(ParameterizedSql::new(
            TIMESTAMP_EXPR,
            vec![Db2Value::from("2024-01-02 03:04:05.006")],
        ));

        assert_eq!(encode(&PropertyValue::DateTime(sample())).unwrap(), expected);
        assert_eq!(
            encode(&PropertyValue::from("2024-01-02T03:04:05.006Z")).unwrap(),
            expected
        );
        assert_eq!(
            encode(&PropertyValue::Number(1_704_164_645_006.0)).unwrap(),
            expected
        );
    }

    #[test]
    fn test_encode_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let expected = ColumnValue::Expression(ParameterizedSql::new(
            DATE_EXPR,
            vec![Db2Value::from("2024-01-02")],
        ));

        assert_eq!(encode(&PropertyValue::Date(date)).unwrap(), expected);
        assert_eq!(encode(&PropertyValue::from("2024-01-02")).unwrap(), expected);
        assert!(encode(&PropertyValue::Boolean(true)).is_err());
    }
}

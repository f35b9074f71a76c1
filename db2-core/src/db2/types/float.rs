use crate::db2::types::ColumnValue;
use crate::db2::Db2Value;
use crate::error::BoxDynError;
use crate::model::PropertyValue;

/// Reads numeric text the way the ORM's runtime does: surrounding whitespace is ignored, empty
/// text is zero, and anything unparsable is NaN.
pub(crate) fn parse_number(text: &str) -> f64 {
    let text = text.trim();
    if text.is_empty() {
        return 0.0;
    }

    let (sign, unsigned) = match text.as_bytes()[0] {
        b'-' => (-1.0, &text[1..]),
        b'+' => (1.0, &text[1..]),
        _ => (1.0, text),
    };

    if unsigned == "Infinity" {
        return sign * f64::INFINITY;
    }

    // only the decimal form may carry a sign
    if sign == 1.0 && unsigned.len() == text.len() {
        let radix = match unsigned.get(..2) {
            Some("0x" | "0X") => Some(16),
            Some("0o" | "0O") => Some(8),
            Some("0b" | "0B") => Some(2),
            _ => None,
        };
        if let Some(radix) = radix {
            return parse_radix(&unsigned[2..], radix);
        }
    }

    // Rust also accepts "inf" and "nan", which are not numbers here
    if !unsigned
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'))
    {
        return f64::NAN;
    }

    text.parse().unwrap_or(f64::NAN)
}

/// Digits are accumulated as a float, so literals wider than 64 bits stay finite.
fn parse_radix(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }

    digits
        .chars()
        .try_fold(0.0, |acc: f64, c| {
            c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
        })
        .unwrap_or(f64::NAN)
}

pub(crate) fn to_number(value: &Db2Value) -> f64 {
    match value {
        Db2Value::Null => 0.0,
        Db2Value::Int(i) => *i as f64,
        Db2Value::Double(f) => *f,
        Db2Value::Text(text) => parse_number(text),
        Db2Value::Bytes(bytes) => parse_number(&String::from_utf8_lossy(bytes)),
    }
}

pub(crate) fn decode(value: &Db2Value) -> PropertyValue {
    PropertyValue::Number(to_number(value))
}

pub(crate) fn encode(value: &PropertyValue) -> Result<ColumnValue, BoxDynError> {
    let value = match value {
        PropertyValue::Null => Db2Value::Null,
        PropertyValue::Number(n) => Db2Value::Double(*n),
        PropertyValue::String(s) => Db2Value::Text(s.clone()),
        PropertyValue::Boolean(b) => Db2Value::Int(i64::from(*b)),
        PropertyValue::Raw(value) => value.clone(),
        PropertyValue::Json(serde_json::Value::Number(n)) => match n.as_i64() {
            Some(i) => Db2Value::Int(i),
            None => Db2Value::Double(n.as_f64().unwrap_or(f64::NAN)),
        },
        other => return Err(format!("cannot store {:?} in a numeric column", other).into()),
    };

    Ok(ColumnValue::Value(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("42"), 42.0);
        assert_eq!(parse_number("  -3.5 "), -3.5);
        assert_eq!(parse_number("1e3"), 1000.0);
        assert_eq!(parse_number(".5"), 0.5);
        assert_eq!(parse_number(""), 0.0);
        assert_eq!(parse_number("0x1F"), 31.0);
        // wider than u64
        assert_eq!(parse_number("0x1FFFFFFFFFFFFFFFF"), 2f64.powi(65));
        assert!(parse_number("0b102").is_nan());
        assert!(parse_number("0x").is_nan());
        assert_eq!(parse_number("-Infinity"), f64::NEG_INFINITY);
        assert!(parse_number("12abc").is_nan());
        assert!(parse_number("inf").is_nan());
        assert!(parse_number("NaN").is_nan());
        assert!(parse_number("-0x10").is_nan());
    }

    #[test]
    fn test_to_number() {
        assert_eq!(to_number(&Db2Value::Int(7)), 7.0);
        // DECIMAL columns arrive as text
        assert_eq!(to_number(&Db2Value::from("1234.50")), 1234.5);
        assert_eq!(to_number(&Db2Value::Bytes(b"8".to_vec())), 8.0);
    }

    #[test]
    fn test_encode_rejects_temporal_values() {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert!(encode(&PropertyValue::Date(date)).is_err());
        assert_eq!(
            encode(&PropertyValue::from("12")).unwrap(),
            ColumnValue::Value(Db2Value::from("12"))
        );
    }
}

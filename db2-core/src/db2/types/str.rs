use crate::db2::types::ColumnValue;
use crate::db2::Db2Value;
use crate::model::PropertyValue;
use chrono::SecondsFormat;

/// Renders a number without a trailing `.0`, with infinities spelled out.
pub(crate) fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_owned()
    } else if n.is_infinite() {
        let name = if n > 0.0 { "Infinity" } else { "-Infinity" };
        name.to_owned()
    } else if n == 0.0 {
        // covers -0
        "0".to_owned()
    } else {
        n.to_string()
    }
}

pub(crate) fn value_to_string(value: &Db2Value) -> String {
    match value {
        Db2Value::Null => "null".to_owned(),
        Db2Value::Int(i) => i.to_string(),
        Db2Value::Double(f) => format_number(*f),
        Db2Value::Text(text) => text.clone(),
        Db2Value::Bytes(bytes) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

pub(crate) fn property_to_string(value: &PropertyValue) -> String {
    match value {
        PropertyValue::Null => "null".to_owned(),
        PropertyValue::Number(n) => format_number(*n),
        PropertyValue::String(s) => s.clone(),
        PropertyValue::Boolean(b) => b.to_string(),
        PropertyValue::Date(date) => date.format("%Y-%m-%d").to_string(),
        PropertyValue::DateTime(ts) => ts.to_rfc3339_opts(SecondsFormat::Millis, true),
        PropertyValue::Json(serde_json::Value::String(s)) => s.clone(),
        PropertyValue::Json(json) => json.to_string(),
        PropertyValue::Raw(value) => value_to_string(value),
    }
}

pub(crate) fn decode(value: &Db2Value) -> PropertyValue {
    PropertyValue::String(value_to_string(value))
}

pub(crate) fn encode(value: &PropertyValue) -> ColumnValue {
    ColumnValue::Value(Db2Value::Text(property_to_string(value)))
}

use crate::db2::types::ColumnValue;
use crate::db2::Db2Value;
use crate::model::PropertyValue;

/// DB2 has no boolean column type; booleans are stored as a single character.
const TRUE: &str = "Y";
const FALSE: &str = "N";

pub(crate) fn text_is_truthy(text: &str) -> bool {
    let text = text.trim();
    !(text.is_empty()
        || ["N", "NO", "F", "FALSE", "0"]
            .iter()
            .any(|falsy| text.eq_ignore_ascii_case(falsy)))
}

fn number_is_truthy(n: f64) -> bool {
    n != 0.0 && !n.is_nan()
}

pub(crate) fn value_is_truthy(value: &Db2Value) -> bool {
    match value {
        Db2Value::Null => false,
        Db2Value::Int(i) => *i != 0,
        Db2Value::Double(f) => number_is_truthy(*f),
        Db2Value::Text(text) => text_is_truthy(text),
        Db2Value::Bytes(bytes) => text_is_truthy(&String::from_utf8_lossy(bytes)),
    }
}

pub(crate) fn property_is_truthy(value: &PropertyValue) -> bool {
    match value {
        PropertyValue::Null => false,
        PropertyValue::Boolean(b) => *b,
        PropertyValue::Number(n) => number_is_truthy(*n),
        PropertyValue::String(s) => text_is_truthy(s),
        PropertyValue::Date(_) | PropertyValue::DateTime(_) => true,
        PropertyValue::Json(json) => match json {
            serde_json::Value::Null => false,
            serde_json::Value::Bool(b) => *b,
            serde_json::Value::Number(n) => n.as_f64().map_or(false, number_is_truthy),
            serde_json::Value::String(s) => text_is_truthy(s),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
        },
        PropertyValue::Raw(value) => value_is_truthy(value),
    }
}

pub(crate) fn decode(value: &Db2Value) -> PropertyValue {
    PropertyValue::Boolean(value_is_truthy(value))
}

pub(crate) fn encode(value: &PropertyValue) -> ColumnValue {
    let flag = if property_is_truthy(value) { TRUE } else { FALSE };
    ColumnValue::Value(Db2Value::from(flag))
}

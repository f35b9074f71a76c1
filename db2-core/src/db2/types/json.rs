use crate::db2::types::ColumnValue;
use crate::db2::Db2Value;
use crate::error::BoxDynError;
use crate::model::PropertyValue;

/// Object columns hold JSON text; anything that does not parse is handed back as is.
pub(crate) fn decode(value: Db2Value) -> PropertyValue {
    let parsed = match &value {
        Db2Value::Text(text) => serde_json::from_str(text).ok(),
        Db2Value::Bytes(bytes) => serde_json::from_slice(bytes).ok(),
        _ => None,
    };

    match parsed {
        Some(json) => PropertyValue::Json(json),
        None => PropertyValue::Raw(value),
    }
}

pub(crate) fn encode(value: &PropertyValue) -> Result<ColumnValue, BoxDynError> {
    let text = serde_json::to_string(value)?;
    Ok(ColumnValue::Value(Db2Value::Text(text)))
}

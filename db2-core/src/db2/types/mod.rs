//! Conversions between driver values and model property values.
//!
//! | Property type          | Read from storage                   | Written to storage              |
//! |------------------------|-------------------------------------|---------------------------------|
//! | `Number`               | `f64`                               | unchanged                       |
//! | `String`               | `String`                            | text                            |
//! | `Boolean`              | truthiness of the value             | `'Y'` / `'N'`                   |
//! | `Date`, `Timestamp`    | `DateTime<Utc>`                     | `to_timestamp(?, ..)` / `to_date(?, ..)` |
//! | `Object`               | parsed JSON, or the raw value       | JSON text                       |
//! | `Array`, `Model`       | the raw value                       | JSON text                       |
//! | `Custom`               | the type's converter                | JSON text                       |
//!
//! `NULL` stays null in both directions, whatever the declared type.

use crate::db2::Db2Value;
use crate::error::{BoxDynError, Error};
use crate::model::{PropertyDescriptor, PropertyType, PropertyValue};
use crate::sql::ParameterizedSql;

pub mod bool;
pub mod chrono;
pub mod float;
pub mod json;
pub mod str;

/// A value ready to be written to a column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    /// A value bound directly to a placeholder.
    Value(Db2Value),
    /// A SQL expression that stands in for the placeholder, with its own bound values.
    Expression(ParameterizedSql),
}

impl ColumnValue {
    /// The SQL fragment for this value: `?` bound to the value, or the expression itself.
    pub fn into_parameterized(self) -> ParameterizedSql {
        match self {
            ColumnValue::Value(value) => ParameterizedSql::new("?", vec![value]),
            ColumnValue::Expression(expr) => expr,
        }
    }

    pub fn as_value(&self) -> Option<&Db2Value> {
        match self {
            ColumnValue::Value(value) => Some(value),
            ColumnValue::Expression(_) => None,
        }
    }
}

impl From<Db2Value> for ColumnValue {
    fn from(value: Db2Value) -> Self {
        ColumnValue::Value(value)
    }
}

/// Converts a value read from a column into the declared property type.
///
/// Without a descriptor the value is returned as [`PropertyValue::Raw`].
pub fn from_column_value(
    prop: Option<&PropertyDescriptor>,
    value: Db2Value,
) -> Result<PropertyValue, Error> {
    if value.is_null() {
        return Ok(PropertyValue::Null);
    }

    let prop = match prop {
        Some(prop) => prop,
        None => return Ok(PropertyValue::Raw(value)),
    };

    let decoded: Result<PropertyValue, BoxDynError> = match &prop.property_type {
        PropertyType::Number => Ok(float::decode(&value)),
        PropertyType::String => Ok(str::decode(&value)),
        PropertyType::Boolean => Ok(bool::decode(&value)),
        PropertyType::Date | PropertyType::Timestamp => chrono::decode(&value),
        PropertyType::Object => Ok(json::decode(value)),
        // structured values are handed back untouched
        PropertyType::Array(_) | PropertyType::Model(_) => Ok(PropertyValue::Raw(value)),
        PropertyType::Custom { from_storage, .. } => from_storage(value),
    };

    decoded.map_err(Error::Decode)
}

/// Converts a property value into what gets written to its column.
pub fn to_column_value(
    prop: Option<&PropertyDescriptor>,
    value: &PropertyValue,
) -> Result<ColumnValue, Error> {
    if value.is_null() {
        return Ok(ColumnValue::Value(Db2Value::Null));
    }

    let prop = match prop {
        Some(prop) => prop,
        None => return json::encode(value).map_err(Error::Encode),
    };

    let encoded = match &prop.property_type {
        PropertyType::String => Ok(str::encode(value)),
        PropertyType::Number => float::encode(value),
        PropertyType::Date | PropertyType::Timestamp => chrono::encode(value),
        PropertyType::Boolean => Ok(bool::encode(value)),
        PropertyType::Object
        | PropertyType::Array(_)
        | PropertyType::Model(_)
        | PropertyType::Custom { .. } => json::encode(value),
    };

    encoded.map_err(Error::Encode)
}

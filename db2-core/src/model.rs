//! Model metadata handed over by the ORM: property kinds, descriptors and values.

use crate::db2::Db2Value;
use crate::error::BoxDynError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{self, Debug, Formatter};
use std::str::FromStr;
use std::sync::Arc;

/// Converter invoked for [`PropertyType::Custom`] properties when reading from storage.
pub type CustomConverter =
    Arc<dyn Fn(Db2Value) -> Result<PropertyValue, BoxDynError> + Send + Sync + 'static>;

/// The declared semantic type of a model property.
///
/// Resolved once from the model definition (see the [`FromStr`] impl) rather than at every
/// conversion.
#[derive(Clone)]
pub enum PropertyType {
    Number,
    String,
    Boolean,
    Date,
    Timestamp,
    /// Free-form structured value, stored as JSON text.
    Object,
    Array(Box<PropertyType>),
    /// A nested model, identified by its name.
    Model(String),
    Custom {
        name: String,
        from_storage: CustomConverter,
    },
}

impl PropertyType {
    pub fn custom<F>(name: impl Into<String>, from_storage: F) -> Self
    where
        F: Fn(Db2Value) -> Result<PropertyValue, BoxDynError> + Send + Sync + 'static,
    {
        PropertyType::Custom {
            name: name.into(),
            from_storage: Arc::new(from_storage),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            PropertyType::Number => "Number",
            PropertyType::String => "String",
            PropertyType::Boolean => "Boolean",
            PropertyType::Date => "Date",
            PropertyType::Timestamp => "Timestamp",
            PropertyType::Object => "Object",
            PropertyType::Array(_) => "Array",
            PropertyType::Model(name) => name,
            PropertyType::Custom { name, .. } => name,
        }
    }
}

impl Debug for PropertyType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PropertyType::Array(item) => f.debug_tuple("Array").field(item).finish(),
            PropertyType::Model(name) => f.debug_tuple("Model").field(name).finish(),
            PropertyType::Custom { name, .. } => f.debug_tuple("Custom").field(name).finish(),
            other => f.write_str(other.name()),
        }
    }
}

impl PartialEq for PropertyType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PropertyType::Array(a), PropertyType::Array(b)) => a == b,
            (PropertyType::Model(a), PropertyType::Model(b)) => a == b,
            (
                PropertyType::Custom {
                    name: a,
                    from_storage: fa,
                },
                PropertyType::Custom {
                    name: b,
                    from_storage: fb,
                },
            ) => a == b && Arc::ptr_eq(fa, fb),
            (a, b) => std::mem::discriminant(a) == std::mem::discriminant(b),
        }
    }
}

impl FromStr for PropertyType {
    type Err = std::convert::Infallible;

    /// Resolves a type name from a model definition.
    ///
    /// Built-in names match case-insensitively, `[Item]` or `Array` denote arrays, and any
    /// other name refers to a nested model.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(item) = s.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            let item = if item.trim().is_empty() {
                PropertyType::Object
            } else {
                item.parse()?
            };
            return Ok(PropertyType::Array(Box::new(item)));
        }

        Ok(match s.to_ascii_lowercase().as_str() {
            "number" => PropertyType::Number,
            "string" => PropertyType::String,
            "boolean" => PropertyType::Boolean,
            "date" => PropertyType::Date,
            "timestamp" => PropertyType::Timestamp,
            "object" | "json" | "any" => PropertyType::Object,
            "array" => PropertyType::Array(Box::new(PropertyType::Object)),
            _ => PropertyType::Model(s.to_owned()),
        })
    }
}

impl<'de> Deserialize<'de> for PropertyType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Declared {
            Name(String),
            Array(Vec<String>),
        }

        Ok(match Declared::deserialize(deserializer)? {
            Declared::Name(name) => match name.parse() {
                Ok(ty) => ty,
                Err(never) => match never {},
            },
            Declared::Array(items) => {
                let item = match items.first() {
                    Some(name) => match name.parse() {
                        Ok(ty) => ty,
                        Err(never) => match never {},
                    },
                    None => PropertyType::Object,
                };
                PropertyType::Array(Box::new(item))
            }
        })
    }
}

/// DB2 specific settings of a property.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Db2PropertySettings {
    pub column_name: Option<String>,
}

/// Metadata describing one model property.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PropertyDescriptor {
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    #[serde(default)]
    pub db2: Option<Db2PropertySettings>,
}

impl PropertyDescriptor {
    pub fn new(property_type: PropertyType) -> Self {
        Self {
            property_type,
            db2: None,
        }
    }

    pub fn with_column_name(mut self, column_name: impl Into<String>) -> Self {
        self.db2 = Some(Db2PropertySettings {
            column_name: Some(column_name.into()),
        });
        self
    }

    /// The column backing this property, when it differs from the property name.
    pub fn column_name(&self) -> Option<&str> {
        self.db2.as_ref().and_then(|s| s.column_name.as_deref())
    }
}

impl From<PropertyType> for PropertyDescriptor {
    fn from(property_type: PropertyType) -> Self {
        PropertyDescriptor::new(property_type)
    }
}

/// A model: its name and its properties, in declaration order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelDefinition {
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_properties")]
    pub properties: Vec<(String, PropertyDescriptor)>,
}

impl ModelDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
        }
    }

    pub fn property(
        mut self,
        name: impl Into<String>,
        descriptor: impl Into<PropertyDescriptor>,
    ) -> Self {
        self.properties.push((name.into(), descriptor.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, descriptor)| descriptor)
    }
}

fn deserialize_properties<'de, D>(
    deserializer: D,
) -> Result<Vec<(String, PropertyDescriptor)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;

    impl<'de> serde::de::Visitor<'de> for Visitor {
        type Value = Vec<(String, PropertyDescriptor)>;

        fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
            f.write_str("a map of property names to descriptors")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: serde::de::MapAccess<'de>,
        {
            let mut properties = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry()? {
                properties.push(entry);
            }
            Ok(properties)
        }
    }

    deserializer.deserialize_map(Visitor)
}

/// A typed model property value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Null,
    Number(f64),
    String(String),
    Boolean(bool),
    /// A calendar date without a time of day.
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    Json(serde_json::Value),
    /// A driver value left unconverted.
    Raw(Db2Value),
}

impl PropertyValue {
    pub fn is_null(&self) -> bool {
        matches!(
            self,
            PropertyValue::Null
                | PropertyValue::Raw(Db2Value::Null)
                | PropertyValue::Json(serde_json::Value::Null)
        )
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Number(f64::from(value))
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Boolean(value)
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_owned())
    }
}

impl From<NaiveDate> for PropertyValue {
    fn from(value: NaiveDate) -> Self {
        PropertyValue::Date(value)
    }
}

impl From<DateTime<Utc>> for PropertyValue {
    fn from(value: DateTime<Utc>) -> Self {
        PropertyValue::DateTime(value)
    }
}

impl From<serde_json::Value> for PropertyValue {
    fn from(value: serde_json::Value) -> Self {
        PropertyValue::Json(value)
    }
}

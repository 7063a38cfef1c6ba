use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;

use serde::Deserialize;
use serde::Serialize;

use crate::error::FieldError;
use crate::error::SchemaError;
use crate::json_ext::Value;

/// The internal value an enum label stands for.
///
/// Internal values come either as plain strings or as symbol-like tokens. The two
/// representations compare equal when they spell the same text: `String("str")` and
/// `Symbol("str")` are the same value for encoding, filtering and hashing.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub enum InternalValue {
    String(String),
    Symbol(String),
}

impl InternalValue {
    pub fn string(value: impl Into<String>) -> Self {
        InternalValue::String(value.into())
    }

    pub fn symbol(value: impl Into<String>) -> Self {
        InternalValue::Symbol(value.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            InternalValue::String(s) | InternalValue::Symbol(s) => s.as_str(),
        }
    }

    pub fn is_symbol(&self) -> bool {
        matches!(self, InternalValue::Symbol(_))
    }
}

impl PartialEq for InternalValue {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Hash for InternalValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state)
    }
}

impl fmt::Display for InternalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InternalValue::String(s) => write!(f, "{s}"),
            InternalValue::Symbol(s) => write!(f, ":{s}"),
        }
    }
}

impl From<&str> for InternalValue {
    fn from(value: &str) -> Self {
        InternalValue::String(value.to_owned())
    }
}

impl From<String> for InternalValue {
    fn from(value: String) -> Self {
        InternalValue::String(value)
    }
}

impl From<InternalValue> for Value {
    fn from(value: InternalValue) -> Self {
        match value {
            InternalValue::String(s) | InternalValue::Symbol(s) => Value::String(s.into()),
        }
    }
}

/// One value of an enum type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValueDescriptor {
    /// The label exposed on the wire.
    pub label: String,
    /// The value the label stands for.
    pub value: InternalValue,
    pub description: Option<String>,
    pub deprecation_reason: Option<String>,
}

impl EnumValueDescriptor {
    /// A value whose internal value is its own label.
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            value: InternalValue::String(label.clone()),
            label,
            description: None,
            deprecation_reason: None,
        }
    }

    pub fn internal(&mut self, value: InternalValue) -> &mut Self {
        self.value = value;
        self
    }

    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = Some(description.into());
        self
    }

    pub fn deprecated(&mut self, reason: impl Into<String>) -> &mut Self {
        self.deprecation_reason = Some(reason.into());
        self
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecation_reason.is_some()
    }
}

/// The values of an enum type, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumType {
    name: String,
    values: Vec<EnumValueDescriptor>,
}

impl EnumType {
    pub(crate) fn new(
        name: impl Into<String>,
        values: Vec<EnumValueDescriptor>,
    ) -> Result<Self, SchemaError> {
        let name = name.into();
        for (index, value) in values.iter().enumerate() {
            if values[..index].iter().any(|v| v.label == value.label) {
                return Err(SchemaError::InvalidSchema(format!(
                    "enum '{name}' declares label '{}' twice",
                    value.label
                )));
            }
        }
        Ok(Self { name, values })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> impl Iterator<Item = &EnumValueDescriptor> {
        self.values.iter()
    }

    pub fn value(&self, label: &str) -> Option<&EnumValueDescriptor> {
        self.values.iter().find(|v| v.label == label)
    }

    /// Turns a wire label into the internal value it stands for.
    ///
    /// Deprecated labels still decode; their reason stays available through [`Self::value`].
    pub fn decode(&self, label: &str) -> Result<&InternalValue, FieldError> {
        let value = self
            .value(label)
            .ok_or_else(|| FieldError::UnknownEnumLabel {
                enum_name: self.name.clone(),
                label: label.to_string(),
            })?;
        if let Some(reason) = &value.deprecation_reason {
            tracing::debug!(
                enum_name = %self.name,
                label,
                reason = %reason,
                "decoding deprecated enum value"
            );
        }
        Ok(&value.value)
    }

    /// Turns an internal value into its wire label.
    ///
    /// The first registered value equal to `value` wins.
    pub fn encode(&self, value: &InternalValue) -> Result<&str, FieldError> {
        self.values
            .iter()
            .find(|v| &v.value == value)
            .map(|v| v.label.as_str())
            .ok_or_else(|| FieldError::UnknownEnumValue {
                enum_name: self.name.clone(),
                value: value.to_string(),
            })
    }

    pub fn contains(&self, label: &str) -> bool {
        self.value(label).is_some()
    }
}

//! JSON helpers shared by the resolution pipeline.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json_bytes::ByteString;
use serde_json_bytes::Map;
pub use serde_json_bytes::Value;

/// A JSON object.
pub type Object = Map<ByteString, Value>;

/// Extension trait for [`serde_json_bytes::Value`].
pub trait ValueExt {
    /// Returns the name of the JSON kind of this value, used in error messages.
    fn json_type_name(&self) -> &'static str;

    /// Returns `true` if the value can be coerced to a GraphQL `Int`.
    fn is_valid_int_input(&self) -> bool;

    /// Returns `true` if the value can be coerced to a GraphQL `Float`.
    fn is_valid_float_input(&self) -> bool;

    /// Returns `true` if the value can be coerced to a GraphQL `ID`.
    fn is_valid_id_input(&self) -> bool;
}

impl ValueExt for Value {
    fn json_type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(n) if n.is_f64() => "float",
            Value::Number(_) => "integer",
            Value::String(_) => "string",
            Value::Array(_) => "list",
            Value::Object(_) => "object",
        }
    }

    // Spec: https://spec.graphql.org/June2018/#sec-Int
    fn is_valid_int_input(&self) -> bool {
        self.as_i64()
            .and_then(|x| i32::try_from(x).ok())
            .is_some()
            || self.as_u64().and_then(|x| i32::try_from(x).ok()).is_some()
    }

    // Spec: https://spec.graphql.org/draft/#sec-Float.Input-Coercion
    fn is_valid_float_input(&self) -> bool {
        self.is_f64() || self.is_valid_int_input()
    }

    fn is_valid_id_input(&self) -> bool {
        self.is_string() || self.is_i64() || self.is_u64()
    }
}

/// A GraphQL path element that is composed of strings or numbers.
/// e.g `/ensembles/0/name`
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathElement {
    /// An index path element.
    Index(usize),

    /// A key path element.
    Key(String),
}

impl fmt::Display for PathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathElement::Index(index) => write!(f, "{index}"),
            PathElement::Key(key) => write!(f, "{key}"),
        }
    }
}

impl From<usize> for PathElement {
    fn from(index: usize) -> Self {
        PathElement::Index(index)
    }
}

impl From<&str> for PathElement {
    fn from(key: &str) -> Self {
        PathElement::Key(key.to_owned())
    }
}

impl From<String> for PathElement {
    fn from(key: String) -> Self {
        PathElement::Key(key)
    }
}

/// A path into the result document.
///
/// This can be composed of strings and numbers.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(pub Vec<PathElement>);

impl Path {
    /// The path of the response root.
    pub fn empty() -> Path {
        Path(Vec::new())
    }

    /// Returns a new path with `element` appended.
    pub fn join(&self, element: impl Into<PathElement>) -> Path {
        let mut elements = self.0.clone();
        elements.push(element.into());
        Path(elements)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathElement> {
        self.0.iter()
    }
}

impl<T> From<T> for Path
where
    T: AsRef<str>,
{
    fn from(s: T) -> Self {
        Self(
            s.as_ref()
                .split('/')
                .filter(|s| !s.is_empty())
                .map(|s| match s.parse::<usize>() {
                    Ok(index) => PathElement::Index(index),
                    Err(_) => PathElement::Key(s.to_string()),
                })
                .collect(),
        )
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for element in self.iter() {
            write!(f, "/{element}")?;
        }
        Ok(())
    }
}

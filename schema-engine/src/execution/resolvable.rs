use std::fmt;
use std::sync::Arc;

use crate::error::FieldError;
use crate::execution::ResolveInfo;
use crate::global_id::Identifiable;
use crate::json_ext::Object;
use crate::json_ext::Value;
use crate::json_ext::ValueExt;
use crate::spec::InternalValue;
use crate::spec::TYPENAME;

/// A runtime object fields resolve against.
///
/// Everything has a default, so a type only answers what it knows about.
pub trait Resolvable: Send + Sync {
    /// The concrete kind of the object, used to pick a concrete type for abstract fields.
    /// Any module path is ignored.
    fn kind(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Call a named method. `None` means the object has no such method.
    fn call_method(
        &self,
        _method: &str,
        _info: &ResolveInfo<'_>,
    ) -> Option<Result<Resolved, FieldError>> {
        None
    }

    /// Read a named property. `None` means the object has no such property.
    fn property(&self, _key: &str) -> Option<Resolved> {
        None
    }

    fn as_identifiable(&self) -> Option<&dyn Identifiable> {
        None
    }
}

/// Plain JSON objects resolve through their keys and name their kind with `__typename`.
impl Resolvable for Object {
    fn kind(&self) -> &str {
        self.get(TYPENAME)
            .and_then(Value::as_str)
            .unwrap_or("Object")
    }

    fn property(&self, key: &str) -> Option<Resolved> {
        self.get(key).cloned().map(Resolved::Value)
    }
}

/// What a base resolver returns, before completion against the field type.
#[derive(Clone)]
pub enum Resolved {
    Null,
    Value(Value),
    Enum(InternalValue),
    Object(Arc<dyn Resolvable>),
    List(Vec<Resolved>),
}

impl Resolved {
    pub fn object(object: impl Resolvable + 'static) -> Self {
        Resolved::Object(Arc::new(object))
    }

    pub fn list<T: Into<Resolved>>(items: impl IntoIterator<Item = T>) -> Self {
        Resolved::List(items.into_iter().map(Into::into).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Resolved::Null | Resolved::Value(Value::Null))
    }

    /// The value as an enum internal value, for strings and enum values.
    pub fn as_internal_value(&self) -> Option<InternalValue> {
        match self {
            Resolved::Enum(value) => Some(value.clone()),
            Resolved::Value(Value::String(s)) => Some(InternalValue::string(s.as_str())),
            _ => None,
        }
    }

    pub(crate) fn type_name(&self) -> &'static str {
        match self {
            Resolved::Null => "null",
            Resolved::Value(value) => value.json_type_name(),
            Resolved::Enum(_) => "enum value",
            Resolved::Object(_) => "object",
            Resolved::List(_) => "list",
        }
    }
}

impl fmt::Debug for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolved::Null => write!(f, "Null"),
            Resolved::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Resolved::Enum(value) => f.debug_tuple("Enum").field(value).finish(),
            Resolved::Object(object) => f.debug_tuple("Object").field(&object.kind()).finish(),
            Resolved::List(items) => f.debug_tuple("List").field(items).finish(),
        }
    }
}

impl From<Value> for Resolved {
    fn from(value: Value) -> Self {
        Resolved::Value(value)
    }
}

impl From<&str> for Resolved {
    fn from(value: &str) -> Self {
        Resolved::Value(Value::from(value))
    }
}

impl From<String> for Resolved {
    fn from(value: String) -> Self {
        Resolved::Value(Value::from(value))
    }
}

impl From<bool> for Resolved {
    fn from(value: bool) -> Self {
        Resolved::Value(Value::Bool(value))
    }
}

impl From<InternalValue> for Resolved {
    fn from(value: InternalValue) -> Self {
        Resolved::Enum(value)
    }
}

impl<T: Resolvable + 'static> From<Arc<T>> for Resolved {
    fn from(object: Arc<T>) -> Self {
        Resolved::Object(object)
    }
}

impl<T: Into<Resolved>> From<Option<T>> for Resolved {
    fn from(value: Option<T>) -> Self {
        value.map_or(Resolved::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use serde_json_bytes::json;

    use super::*;

    #[test]
    fn json_objects_resolve_properties() {
        let object = match json!({"__typename": "Ensemble", "name": "The Spinners"}) {
            Value::Object(object) => object,
            _ => unreachable!(),
        };
        assert_eq!(object.kind(), "Ensemble");
        assert!(matches!(
            object.property("name"),
            Some(Resolved::Value(Value::String(ref s))) if s.as_str() == "The Spinners"
        ));
        assert!(object.property("formedAt").is_none());
        assert_eq!(Object::new().kind(), "Object");
    }

    #[test]
    fn internal_values_from_strings_and_enums() {
        assert_eq!(
            Resolved::from("str").as_internal_value(),
            Some(InternalValue::symbol("str"))
        );
        assert_eq!(
            Resolved::from(InternalValue::symbol("str")).as_internal_value(),
            Some(InternalValue::string("str"))
        );
        assert_eq!(Resolved::from(true).as_internal_value(), None);
    }

    #[test]
    fn options_resolve_to_null() {
        assert!(Resolved::from(None::<String>).is_null());
        assert!(!Resolved::from(Some("Flute")).is_null());
    }
}

use std::sync::Arc;

use derivative::Derivative;
use heck::ToSnakeCase;

use crate::error::FieldError;
use crate::execution::ResolveInfo;
use crate::execution::Resolved;
use crate::json_ext::Object;
use crate::json_ext::Value;
use crate::json_ext::ValueExt;
use crate::spec::FieldType;
use crate::spec::InputType;

/// An inline base resolver.
pub type ResolverFn = Arc<dyn Fn(&ResolveInfo<'_>) -> Result<Resolved, FieldError> + Send + Sync>;

/// How the base value of a field is obtained.
#[derive(Clone, Default, Derivative)]
#[derivative(Debug)]
pub enum Resolver {
    /// Method named after the snake-cased field name, then the property of that name, then the
    /// property named like the field.
    #[default]
    Default,
    /// An explicit method binding. No name derivation happens.
    Method(String),
    /// Read one property of the object.
    HashKey(String),
    Function(#[derivative(Debug = "ignore")] ResolverFn),
}

/// A named post-processing step attached to a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoratorSpec {
    pub name: String,
    pub parameters: Object,
}

impl DecoratorSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Object::new(),
        }
    }

    pub fn with_parameter(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.parameters.insert(key, value.into());
        self
    }
}

/// A post-processing transform.
///
/// Decorators see one non-null leaf at a time: the pipeline skips `null` and maps lists
/// element-wise before calling [`Decorator::apply`].
pub trait Decorator: Send + Sync {
    fn apply(&self, value: Value, parameters: &Object) -> Result<Value, FieldError>;
}

impl<F> Decorator for F
where
    F: Fn(Value, &Object) -> Result<Value, FieldError> + Send + Sync,
{
    fn apply(&self, value: Value, parameters: &Object) -> Result<Value, FieldError> {
        self(value, parameters)
    }
}

fn map_string(
    decorator: &str,
    value: Value,
    f: impl FnOnce(&str) -> String,
) -> Result<Value, FieldError> {
    match value {
        Value::String(s) => Ok(Value::String(f(s.as_str()).into())),
        other => Err(FieldError::DecoratorTypeMismatch {
            decorator: decorator.to_string(),
            expected: "string".to_string(),
            found: other.json_type_name().to_string(),
        }),
    }
}

pub(crate) fn upcase(value: Value, _parameters: &Object) -> Result<Value, FieldError> {
    map_string("upcase", value, str::to_uppercase)
}

pub(crate) fn downcase(value: Value, _parameters: &Object) -> Result<Value, FieldError> {
    map_string("downcase", value, str::to_lowercase)
}

pub(crate) fn append(value: Value, parameters: &Object) -> Result<Value, FieldError> {
    let suffix = parameters
        .get("suffix")
        .and_then(Value::as_str)
        .unwrap_or_default();
    map_string("append", value, |s| format!("{s}{suffix}"))
}

/// A field of an object or interface type.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub name: String,
    pub field_type: FieldType,
    pub description: Option<String>,
    pub deprecation_reason: Option<String>,
    pub resolver: Resolver,
    /// Applied in order, after the value is completed.
    pub decorators: Vec<DecoratorSpec>,
    pub arguments: InputType,
}

impl FieldDescriptor {
    /// `owner` names the type the field belongs to; it prefixes the argument set name.
    pub fn new(owner: &str, name: impl Into<String>, field_type: FieldType) -> Self {
        let name = name.into();
        Self {
            arguments: InputType::empty(format!("{owner}.{name}")),
            name,
            field_type,
            description: None,
            deprecation_reason: None,
            resolver: Resolver::Default,
            decorators: Vec::new(),
        }
    }

    /// The method name the default resolver derives from the field name.
    pub fn method_name(&self) -> String {
        self.name.to_snake_case()
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecation_reason.is_some()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json_bytes::json;

    use super::*;

    #[test]
    fn upcase_strings() {
        assert_eq!(
            upcase(json!("bela fleck"), &Object::new()).unwrap(),
            json!("BELA FLECK")
        );
    }

    #[test]
    fn decorators_require_strings() {
        assert_eq!(
            upcase(json!(4), &Object::new()).unwrap_err(),
            FieldError::DecoratorTypeMismatch {
                decorator: "upcase".to_string(),
                expected: "string".to_string(),
                found: "integer".to_string(),
            }
        );
    }

    #[test]
    fn append_suffix() {
        let spec = DecoratorSpec::new("append").with_parameter("suffix", "!");
        assert_eq!(
            append(json!("Flute"), &spec.parameters).unwrap(),
            json!("Flute!")
        );
    }

    #[test]
    fn closures_are_decorators() {
        let reverse = |value: Value, _: &Object| -> Result<Value, FieldError> {
            Ok(Value::String(
                value.as_str().unwrap_or_default().chars().rev().collect::<String>().into(),
            ))
        };
        let decorator: &dyn Decorator = &reverse;
        assert_eq!(
            decorator.apply(json!("abc"), &Object::new()).unwrap(),
            json!("cba")
        );
    }

    #[rstest]
    #[case("name", "name")]
    #[case("upcaseName", "upcase_name")]
    #[case("hashyEnsemble", "hashy_ensemble")]
    fn method_names(#[case] field: &str, #[case] method: &str) {
        let descriptor = FieldDescriptor::new("Query", field, FieldType::String);
        assert_eq!(descriptor.method_name(), method);
        assert_eq!(descriptor.arguments.name(), format!("Query.{field}"));
    }
}

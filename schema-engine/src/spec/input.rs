use std::sync::Arc;

use derivative::Derivative;
use heck::ToSnakeCase;
use indexmap::IndexMap;
use serde_json_bytes::ByteString;

use crate::context::Context;
use crate::error::FieldError;
use crate::error::ResolveError;
use crate::error::SchemaError;
use crate::json_ext::Object;
use crate::json_ext::Value;
use crate::json_ext::ValueExt;
use crate::spec::FieldType;
use crate::spec::InternalValue;
use crate::spec::Schema;
use crate::spec::TypeDefinition;

/// One argument of an input type or of a field.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentDescriptor {
    pub name: String,
    pub field_type: FieldType,
    pub description: Option<String>,
    /// Used when the argument is absent from the raw mapping.
    pub default_value: Option<Value>,
    pub deprecation_reason: Option<String>,
}

impl ArgumentDescriptor {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            description: None,
            default_value: None,
            deprecation_reason: None,
        }
    }

    /// Absent values are rejected with [`FieldError::MissingRequiredArgument`].
    pub fn is_required(&self) -> bool {
        self.field_type.is_non_null() && self.default_value.is_none()
    }
}

/// An input type, or the anonymous argument set of a field.
#[derive(Debug, Clone, PartialEq)]
pub struct InputType {
    name: String,
    arguments: IndexMap<String, ArgumentDescriptor>,
}

impl InputType {
    pub(crate) fn new(
        name: impl Into<String>,
        arguments: Vec<ArgumentDescriptor>,
    ) -> Result<Self, SchemaError> {
        let name = name.into();
        let mut map = IndexMap::with_capacity(arguments.len());
        for argument in arguments {
            if map.contains_key(&argument.name) {
                return Err(SchemaError::InvalidSchema(format!(
                    "'{name}' declares argument '{}' twice",
                    argument.name
                )));
            }
            map.insert(argument.name.clone(), argument);
        }
        Ok(Self {
            name,
            arguments: map,
        })
    }

    pub(crate) fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arguments(&self) -> impl Iterator<Item = &ArgumentDescriptor> {
        self.arguments.values()
    }

    pub fn argument(&self, name: &str) -> Option<&ArgumentDescriptor> {
        self.arguments.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    /// Validate `raw` against the declared arguments and build an immutable [`InputObject`].
    ///
    /// Nested input-typed arguments are coerced recursively, including arguments whose type is
    /// this very input type. Recursion stops where the raw data stops.
    pub fn coerce(
        &self,
        raw: &Object,
        schema: &Schema,
        context: &Context,
    ) -> Result<InputObject, ResolveError> {
        if let Some(unknown) = raw
            .keys()
            .find(|key| !self.arguments.contains_key(key.as_str()))
        {
            return Err(FieldError::InvalidArgumentType {
                argument: unknown.as_str().to_string(),
                expected: format!("an argument of '{}'", self.name),
                found: "an undeclared argument".to_string(),
            }
            .into());
        }

        let mut values = IndexMap::with_capacity(self.arguments.len());
        for (name, descriptor) in &self.arguments {
            let value = match raw.get(name.as_str()) {
                Some(value) => {
                    coerce_argument(name, &descriptor.field_type, value, schema, context)?
                }
                None => match &descriptor.default_value {
                    Some(default) => {
                        coerce_argument(name, &descriptor.field_type, default, schema, context)?
                    }
                    None if descriptor.field_type.is_non_null() => {
                        return Err(FieldError::MissingRequiredArgument {
                            type_name: self.name.clone(),
                            argument: name.clone(),
                        }
                        .into());
                    }
                    None => continue,
                },
            };
            values.insert(name.clone(), value);
        }

        Ok(InputObject {
            type_name: self.name.clone(),
            values,
            context: context.clone(),
        })
    }
}

fn invalid(argument: &str, expected: &FieldType, found: &Value) -> ResolveError {
    FieldError::InvalidArgumentType {
        argument: argument.to_string(),
        expected: expected.to_string(),
        found: found.json_type_name().to_string(),
    }
    .into()
}

// Spec: https://spec.graphql.org/draft/#sec-Input-Values
fn coerce_argument(
    argument: &str,
    ty: &FieldType,
    value: &Value,
    schema: &Schema,
    context: &Context,
) -> Result<ArgumentValue, ResolveError> {
    match (ty, value) {
        (FieldType::NonNull(_), Value::Null) => Err(invalid(argument, ty, value)),
        (FieldType::NonNull(inner), _) => coerce_argument(argument, inner, value, schema, context),
        (_, Value::Null) => Ok(ArgumentValue::Null),
        (FieldType::List(inner), Value::Array(items)) => items
            .iter()
            .map(|item| coerce_argument(argument, inner, item, schema, context))
            .collect::<Result<Vec<_>, _>>()
            .map(ArgumentValue::List),
        // A single value stands for a list of one.
        (FieldType::List(inner), _) => Ok(ArgumentValue::List(vec![coerce_argument(
            argument, inner, value, schema, context,
        )?])),
        (FieldType::String, Value::String(_)) | (FieldType::Boolean, Value::Bool(_)) => {
            Ok(ArgumentValue::Scalar(value.clone()))
        }
        (FieldType::Int, _) if value.is_valid_int_input() => Ok(ArgumentValue::Scalar(value.clone())),
        (FieldType::Float, _) if value.is_valid_float_input() => {
            Ok(ArgumentValue::Scalar(value.clone()))
        }
        (FieldType::Id, Value::String(_)) => Ok(ArgumentValue::Scalar(value.clone())),
        (FieldType::Id, Value::Number(n)) if value.is_valid_id_input() => {
            Ok(ArgumentValue::Scalar(Value::String(n.to_string().into())))
        }
        (FieldType::Named(type_name), _) => {
            match schema.lookup(type_name)?.definition() {
                TypeDefinition::Enum(enum_type) => match value {
                    Value::String(label) => Ok(ArgumentValue::Enum(
                        enum_type.decode(label.as_str())?.clone(),
                    )),
                    _ => Err(invalid(argument, ty, value)),
                },
                TypeDefinition::Input(input_type) => match value {
                    Value::Object(raw) => Ok(ArgumentValue::Input(Arc::new(
                        input_type.coerce(raw, schema, context)?,
                    ))),
                    _ => Err(invalid(argument, ty, value)),
                },
                TypeDefinition::Scalar(scalar) => scalar
                    .coerce_input(value)
                    .map(ArgumentValue::Scalar)
                    .map_err(|reason| {
                        ResolveError::Field(FieldError::InvalidArgumentType {
                            argument: argument.to_string(),
                            expected: type_name.clone(),
                            found: reason,
                        })
                    }),
                TypeDefinition::Object(_)
                | TypeDefinition::Interface(_)
                | TypeDefinition::Union(_) => Err(SchemaError::InvalidSchema(format!(
                    "argument '{argument}' uses output type '{type_name}'"
                ))
                .into()),
            }
        }
        _ => Err(invalid(argument, ty, value)),
    }
}

/// A coerced argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentValue {
    Null,
    Scalar(Value),
    Enum(InternalValue),
    List(Vec<ArgumentValue>),
    Input(Arc<InputObject>),
}

impl ArgumentValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ArgumentValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgumentValue::Scalar(Value::String(s)) => Some(s.as_str()),
            ArgumentValue::Enum(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ArgumentValue::Scalar(value) => value.as_i64(),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&InternalValue> {
        match self {
            ArgumentValue::Enum(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_input(&self) -> Option<&InputObject> {
        match self {
            ArgumentValue::Input(input) => Some(input),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            ArgumentValue::Null => Value::Null,
            ArgumentValue::Scalar(value) => value.clone(),
            ArgumentValue::Enum(value) => value.clone().into(),
            ArgumentValue::List(items) => {
                Value::Array(items.iter().map(ArgumentValue::to_value).collect())
            }
            ArgumentValue::Input(input) => input.to_value(),
        }
    }
}

/// A symbol-like key, equivalent to the plain string key with the same text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol<'a>(pub &'a str);

/// The ways an argument can be addressed on an [`InputObject`] by its exposed name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentKey<'a> {
    Name(&'a str),
    Symbol(&'a str),
}

impl ArgumentKey<'_> {
    fn as_str(&self) -> &str {
        match self {
            ArgumentKey::Name(name) | ArgumentKey::Symbol(name) => name,
        }
    }
}

impl<'a> From<&'a str> for ArgumentKey<'a> {
    fn from(name: &'a str) -> Self {
        ArgumentKey::Name(name)
    }
}

impl<'a> From<&'a String> for ArgumentKey<'a> {
    fn from(name: &'a String) -> Self {
        ArgumentKey::Name(name.as_str())
    }
}

impl<'a> From<Symbol<'a>> for ArgumentKey<'a> {
    fn from(symbol: Symbol<'a>) -> Self {
        ArgumentKey::Symbol(symbol.0)
    }
}

/// A coerced, immutable input instance.
///
/// Every argument can be read by exposed string key, by [`Symbol`] key, or through the
/// snake-cased accessor name with [`InputObject::method`]. All three return the same value.
#[derive(Clone, Derivative)]
#[derivative(Debug, PartialEq)]
pub struct InputObject {
    type_name: String,
    values: IndexMap<String, ArgumentValue>,
    #[derivative(Debug = "ignore", PartialEq = "ignore")]
    context: Context,
}

impl InputObject {
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn get<'a>(&self, key: impl Into<ArgumentKey<'a>>) -> Option<&ArgumentValue> {
        self.values.get(key.into().as_str())
    }

    /// Read an argument through its snake-cased accessor, e.g. `string_value` for `stringValue`.
    ///
    /// Accessor names follow the same rule as field methods, so `ensembleID` is `ensemble_id`.
    pub fn method(&self, name: &str) -> Option<&ArgumentValue> {
        self.values
            .iter()
            .find(|(key, _)| key.to_snake_case() == name)
            .map(|(_, value)| value)
    }

    pub fn contains_key<'a>(&self, key: impl Into<ArgumentKey<'a>>) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgumentValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The resolution context the instance was coerced in.
    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn to_value(&self) -> Value {
        Value::Object(
            self.values
                .iter()
                .map(|(k, v)| (ByteString::from(k.as_str()), v.to_value()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use serde_json_bytes::json;

    use super::*;
    use crate::spec::TypeDescriptor;

    fn schema() -> Schema {
        let mut schema = Schema::new();
        schema
            .register(
                TypeDescriptor::define_input("LegacyInput", |t| {
                    t.argument("intValue", "Int!");
                })
                .unwrap(),
            )
            .unwrap();
        schema
            .register(
                TypeDescriptor::define_input("InspectableInput", |t| {
                    t.argument("stringValue", "String!");
                    t.argument("nestedInput", "InspectableInput");
                    t.argument("legacyInput", "LegacyInput");
                    t.argument("tags", "[String!]")
                        .default_value(json!(["swing"]));
                })
                .unwrap(),
            )
            .unwrap();
        schema
            .register(
                TypeDescriptor::define_enum("Family", |t| {
                    t.value("STRING").internal(InternalValue::symbol("str"));
                    t.value("WOODWIND");
                })
                .unwrap(),
            )
            .unwrap();
        schema
    }

    fn inspectable(schema: &Schema) -> &InputType {
        match schema.lookup("InspectableInput").unwrap().definition() {
            TypeDefinition::Input(input) => input,
            _ => unreachable!(),
        }
    }

    fn raw(value: Value) -> Object {
        match value {
            Value::Object(object) => object,
            _ => unreachable!(),
        }
    }

    #[test]
    fn coerce_self_referential_input() {
        let schema = schema();
        let context = Context::new();
        let input = inspectable(&schema)
            .coerce(
                &raw(json!({
                    "stringValue": "a",
                    "nestedInput": {"stringValue": "b", "nestedInput": null}
                })),
                &schema,
                &context,
            )
            .unwrap();

        let nested = input.get("nestedInput").and_then(ArgumentValue::as_input).unwrap();
        assert_eq!(nested.get("stringValue").and_then(ArgumentValue::as_str), Some("b"));
        assert_eq!(nested.get("nestedInput"), Some(&ArgumentValue::Null));
        assert_eq!(input.get("legacyInput"), None);
        assert_eq!(
            input.get("tags"),
            Some(&ArgumentValue::List(vec![ArgumentValue::Scalar(json!("swing"))]))
        );
    }

    #[test]
    fn three_access_paths_agree() {
        let schema = schema();
        let input = inspectable(&schema)
            .coerce(&raw(json!({"stringValue": "a"})), &schema, &Context::new())
            .unwrap();
        let by_name = input.get("stringValue");
        assert!(by_name.is_some());
        assert_eq!(by_name, input.get(Symbol("stringValue")));
        assert_eq!(by_name, input.method("string_value"));
    }

    #[test]
    fn accessor_names_follow_field_method_naming() {
        let mut schema = Schema::new();
        schema
            .register(
                TypeDescriptor::define_input("Lookup", |t| {
                    t.argument("ensembleID", "ID!");
                })
                .unwrap(),
            )
            .unwrap();
        let lookup = match schema.lookup("Lookup").unwrap().definition() {
            TypeDefinition::Input(input) => input,
            _ => unreachable!(),
        };
        let input = lookup
            .coerce(&raw(json!({"ensembleID": "Ensemble/Flecktones"})), &schema, &Context::new())
            .unwrap();
        let by_name = input.get("ensembleID");
        assert_eq!(
            by_name,
            Some(&ArgumentValue::Scalar(json!("Ensemble/Flecktones")))
        );
        assert_eq!(by_name, input.get(Symbol("ensembleID")));
        assert_eq!(by_name, input.method("ensemble_id"));
        assert_eq!(input.method("ensembleID"), None);
    }

    #[test]
    fn missing_required_argument() {
        let schema = schema();
        let error = inspectable(&schema)
            .coerce(&Object::new(), &schema, &Context::new())
            .unwrap_err();
        assert_eq!(
            error,
            ResolveError::Field(FieldError::MissingRequiredArgument {
                type_name: "InspectableInput".to_string(),
                argument: "stringValue".to_string(),
            })
        );
    }

    #[test]
    fn explicit_null_for_required_argument_is_a_type_error() {
        let schema = schema();
        let error = inspectable(&schema)
            .coerce(&raw(json!({"stringValue": null})), &schema, &Context::new())
            .unwrap_err();
        assert!(matches!(
            error,
            ResolveError::Field(FieldError::InvalidArgumentType { .. })
        ));
    }

    #[test]
    fn nested_errors_surface() {
        let schema = schema();
        let error = inspectable(&schema)
            .coerce(
                &raw(json!({"stringValue": "a", "legacyInput": {"intValue": "four"}})),
                &schema,
                &Context::new(),
            )
            .unwrap_err();
        assert_eq!(
            error,
            ResolveError::Field(FieldError::InvalidArgumentType {
                argument: "intValue".to_string(),
                expected: "Int".to_string(),
                found: "string".to_string(),
            })
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let schema = schema();
        let error = inspectable(&schema)
            .coerce(
                &raw(json!({"stringValue": "a", "volume": 11})),
                &schema,
                &Context::new(),
            )
            .unwrap_err();
        assert!(matches!(
            error,
            ResolveError::Field(FieldError::InvalidArgumentType { argument, .. }) if argument == "volume"
        ));
    }

    #[test]
    fn enum_arguments_decode() {
        let schema = schema();
        let mut arguments = InputType::empty("Query.instruments");
        arguments.arguments.insert(
            "family".to_string(),
            ArgumentDescriptor::new("family", FieldType::named("Family")),
        );
        let input = arguments
            .coerce(&raw(json!({"family": "STRING"})), &schema, &Context::new())
            .unwrap();
        assert_eq!(
            input.get("family").and_then(ArgumentValue::as_enum),
            Some(&InternalValue::symbol("str"))
        );

        let error = arguments
            .coerce(&raw(json!({"family": "KAZOO"})), &schema, &Context::new())
            .unwrap_err();
        assert!(matches!(
            error,
            ResolveError::Field(FieldError::UnknownEnumLabel { .. })
        ));
    }

    #[test]
    fn input_keeps_its_context() {
        let schema = schema();
        let context = Context::new();
        context.insert("message", "hi".to_string()).unwrap();
        let input = inspectable(&schema)
            .coerce(
                &raw(json!({"stringValue": "a", "nestedInput": {"stringValue": "b"}})),
                &schema,
                &context,
            )
            .unwrap();
        let nested = input.method("nested_input").and_then(ArgumentValue::as_input).unwrap();
        assert_eq!(nested.context().get_str("message").as_deref(), Some("hi"));
    }
}

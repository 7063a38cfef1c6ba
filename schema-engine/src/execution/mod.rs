//! Field resolution.
//!
//! A field resolves in three steps: the base resolver produces a [`Resolved`] value, completion
//! shapes it after the field type (dispatching abstract types to a concrete one and recursing into
//! sub-selections), and the field decorators run last on the completed value.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]

mod resolvable;

use std::sync::Arc;

use derivative::Derivative;
use heck::ToSnakeCase;
pub use resolvable::*;

use crate::configuration::Configuration;
use crate::context::Context;
use crate::error::FieldError;
use crate::error::ResolveError;
use crate::error::SchemaError;
use crate::graphql::Error;
use crate::graphql::Response;
use crate::json_ext::Object;
use crate::json_ext::Path;
use crate::json_ext::Value;
use crate::json_ext::ValueExt;
use crate::spec::Decorator;
use crate::spec::DecoratorSpec;
use crate::spec::FieldDescriptor;
use crate::spec::FieldType;
use crate::spec::InputObject;
use crate::spec::OperationKind;
use crate::spec::Resolver;
use crate::spec::Schema;
use crate::spec::Selection;
use crate::spec::TYPENAME;
use crate::spec::TypeDefinition;
use crate::spec::TypeDescriptor;
use crate::store::Store;

/// Everything a base resolver can look at.
pub struct ResolveInfo<'a> {
    /// The object the field is resolved on.
    pub object: &'a Arc<dyn Resolvable>,
    pub parent_type: &'a TypeDescriptor,
    pub field: &'a FieldDescriptor,
    /// The coerced field arguments.
    pub arguments: &'a InputObject,
    pub context: &'a Context,
    pub store: &'a Store,
    pub schema: &'a Schema,
    pub configuration: &'a Configuration,
    /// Where the field lands in the response.
    pub path: &'a Path,
}

/// One operation to run.
#[derive(Clone, Derivative)]
#[derivative(Debug)]
pub struct Request {
    pub kind: OperationKind,
    #[derivative(Debug = "ignore")]
    pub root: Arc<dyn Resolvable>,
    pub selections: Vec<Selection>,
    pub context: Context,
}

#[buildstructor::buildstructor]
impl Request {
    /// Returns a builder for a [`Request`].
    ///
    /// `kind` defaults to a query and `context` to an empty one.
    #[builder(visibility = "pub")]
    fn new(
        kind: Option<OperationKind>,
        root: Arc<dyn Resolvable>,
        selections: Vec<Selection>,
        context: Option<Context>,
    ) -> Self {
        Self {
            kind: kind.unwrap_or(OperationKind::Query),
            root,
            selections,
            context: context.unwrap_or_default(),
        }
    }
}

/// A completed schema together with the engine configuration.
#[derive(Debug, Clone)]
pub struct Engine {
    schema: Arc<Schema>,
    configuration: Arc<Configuration>,
}

impl Engine {
    /// Completes `schema` (see [`Schema::complete`]) and wraps it for execution.
    pub fn new(mut schema: Schema, configuration: Configuration) -> Result<Self, SchemaError> {
        schema.complete()?;
        Ok(Self {
            schema: Arc::new(schema),
            configuration: Arc::new(configuration),
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Resolve `request` against `store`.
    ///
    /// Field errors are collected into the response next to the data of their siblings. Schema
    /// errors abort the whole operation.
    #[tracing::instrument(skip_all, level = "trace", fields(operation = %request.kind))]
    pub fn execute(&self, store: &Store, request: Request) -> Result<Response, SchemaError> {
        let executor = Executor {
            schema: &self.schema,
            store,
            context: &request.context,
            configuration: &self.configuration,
        };
        let root_type = self.schema.root_type(request.kind)?;
        let mut errors = Vec::new();
        let mut output = Object::new();
        let data = match executor.apply_selection_set(
            &request.root,
            root_type,
            &request.selections,
            &Path::empty(),
            &mut output,
            &mut errors,
        ) {
            Ok(()) => Value::Object(output),
            Err(ResolveError::Schema(error)) => return Err(error),
            Err(ResolveError::NullPropagation) => Value::Null,
            Err(ResolveError::Field(error)) => {
                errors.push(executor.to_graphql_error(&error, Path::empty()));
                Value::Null
            }
        };
        Ok(Response::builder().data(data).errors(errors).build())
    }
}

struct Executor<'a> {
    schema: &'a Schema,
    store: &'a Store,
    context: &'a Context,
    configuration: &'a Configuration,
}

impl Executor<'_> {
    fn apply_selection_set(
        &self,
        object: &Arc<dyn Resolvable>,
        object_type: &TypeDescriptor,
        selection_set: &[Selection],
        path: &Path,
        output: &mut Object,
        errors: &mut Vec<Error>,
    ) -> Result<(), ResolveError> {
        for selection in selection_set {
            match selection {
                Selection::Field {
                    name,
                    alias,
                    arguments,
                    selection_set,
                } => {
                    let response_key = alias.as_deref().unwrap_or(name);
                    if name == TYPENAME {
                        output.insert(response_key, Value::from(object_type.name()));
                        continue;
                    }
                    let field_path = path.join(response_key);
                    let value = self.resolve_field(
                        object,
                        object_type,
                        name,
                        arguments,
                        selection_set,
                        &field_path,
                        errors,
                    )?;
                    output.insert(response_key, value);
                }
                Selection::InlineFragment {
                    type_condition,
                    selection_set,
                } => {
                    let applies = type_condition.as_deref().is_none_or(|condition| {
                        condition == object_type.name()
                            || self.schema.is_possible_type(condition, object_type.name())
                    });
                    if applies {
                        self.apply_selection_set(
                            object,
                            object_type,
                            selection_set,
                            path,
                            output,
                            errors,
                        )?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Resolve one field and recover its field errors.
    #[allow(clippy::too_many_arguments)]
    fn resolve_field(
        &self,
        object: &Arc<dyn Resolvable>,
        object_type: &TypeDescriptor,
        field_name: &str,
        raw_arguments: &Object,
        selection_set: &[Selection],
        path: &Path,
        errors: &mut Vec<Error>,
    ) -> Result<Value, ResolveError> {
        let Some(field) = object_type.field(field_name) else {
            self.record(
                FieldError::UnknownField {
                    type_name: object_type.name().to_string(),
                    field: field_name.to_string(),
                },
                path,
                errors,
            );
            return Ok(Value::Null);
        };

        let outcome = self.resolve_field_value(
            object,
            object_type,
            field,
            raw_arguments,
            selection_set,
            path,
            errors,
        );
        match outcome {
            Ok(value) => Ok(value),
            Err(ResolveError::Field(error)) => {
                self.record(error, path, errors);
                self.null_for(&field.field_type)
            }
            Err(ResolveError::NullPropagation) => self.null_for(&field.field_type),
            Err(error) => Err(error),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn resolve_field_value(
        &self,
        object: &Arc<dyn Resolvable>,
        object_type: &TypeDescriptor,
        field: &FieldDescriptor,
        raw_arguments: &Object,
        selection_set: &[Selection],
        path: &Path,
        errors: &mut Vec<Error>,
    ) -> Result<Value, ResolveError> {
        let arguments = field
            .arguments
            .coerce(raw_arguments, self.schema, self.context)?;
        let info = ResolveInfo {
            object,
            parent_type: object_type,
            field,
            arguments: &arguments,
            context: self.context,
            store: self.store,
            schema: self.schema,
            configuration: self.configuration,
            path,
        };
        tracing::trace!(%path, field = %field.name, "resolving field");
        let resolved = call_resolver(&info)?;
        let completed =
            self.complete_value(&field.field_type, resolved, selection_set, path, errors)?;
        self.decorate(object_type, field, completed)
    }

    fn record(&self, error: FieldError, path: &Path, errors: &mut Vec<Error>) {
        tracing::warn!(%path, %error, "field error");
        errors.push(self.to_graphql_error(&error, path.clone()));
    }

    fn to_graphql_error(&self, error: &FieldError, path: Path) -> Error {
        let path = (!path.is_empty()).then_some(path);
        error.to_graphql_error(path, self.configuration.errors.extension_codes)
    }

    /// The value of a field whose resolution failed.
    fn null_for(&self, field_type: &FieldType) -> Result<Value, ResolveError> {
        if self.configuration.execution.null_bubbling && field_type.is_non_null() {
            Err(ResolveError::NullPropagation)
        } else {
            Ok(Value::Null)
        }
    }

    // Spec: https://spec.graphql.org/October2021/#sec-Value-Completion
    fn complete_value(
        &self,
        ty: &FieldType,
        resolved: Resolved,
        selection_set: &[Selection],
        path: &Path,
        errors: &mut Vec<Error>,
    ) -> Result<Value, ResolveError> {
        if let FieldType::NonNull(inner) = ty {
            return match self.complete_nullable(inner, resolved, selection_set, path, errors)? {
                Value::Null => Err(FieldError::InvalidResultValue {
                    expected: ty.to_string(),
                    found: "null".to_string(),
                }
                .into()),
                value => Ok(value),
            };
        }
        match self.complete_nullable(ty, resolved, selection_set, path, errors) {
            Err(ResolveError::NullPropagation) => Ok(Value::Null),
            other => other,
        }
    }

    fn complete_nullable(
        &self,
        ty: &FieldType,
        resolved: Resolved,
        selection_set: &[Selection],
        path: &Path,
        errors: &mut Vec<Error>,
    ) -> Result<Value, ResolveError> {
        if resolved.is_null() {
            return Ok(Value::Null);
        }
        let invalid = |found: &str| -> ResolveError {
            FieldError::InvalidResultValue {
                expected: ty.to_string(),
                found: found.to_string(),
            }
            .into()
        };

        match ty {
            FieldType::NonNull(_) => self.complete_value(ty, resolved, selection_set, path, errors),
            FieldType::List(inner) => {
                let items = match resolved {
                    Resolved::List(items) => items,
                    Resolved::Value(Value::Array(values)) => {
                        values.into_iter().map(Resolved::Value).collect()
                    }
                    other => return Err(invalid(other.type_name())),
                };
                let mut completed = Vec::with_capacity(items.len());
                for (index, item) in items.into_iter().enumerate() {
                    completed.push(self.complete_value(
                        inner,
                        item,
                        selection_set,
                        &path.join(index),
                        errors,
                    )?);
                }
                Ok(Value::Array(completed))
            }
            FieldType::String
            | FieldType::Int
            | FieldType::Float
            | FieldType::Id
            | FieldType::Boolean => complete_builtin_scalar(ty, resolved),
            FieldType::Named(name) => {
                let descriptor = self.schema.lookup(name)?;
                match descriptor.definition() {
                    TypeDefinition::Enum(enum_type) => {
                        let value = resolved
                            .as_internal_value()
                            .ok_or_else(|| invalid(resolved.type_name()))?;
                        Ok(Value::from(enum_type.encode(&value)?))
                    }
                    TypeDefinition::Scalar(scalar) => {
                        let value = match resolved {
                            Resolved::Value(value) => value,
                            Resolved::Enum(value) => value.into(),
                            other => return Err(invalid(other.type_name())),
                        };
                        scalar.coerce_result(&value).map_err(|reason| {
                            ResolveError::Field(FieldError::InvalidResultValue {
                                expected: name.clone(),
                                found: reason,
                            })
                        })
                    }
                    TypeDefinition::Object(_) => {
                        let object = into_object(resolved).map_err(invalid)?;
                        self.complete_object(&object, descriptor, selection_set, path, errors)
                    }
                    TypeDefinition::Interface(_) | TypeDefinition::Union(_) => {
                        let object = into_object(resolved).map_err(invalid)?;
                        let concrete = self.schema.resolve_concrete_type(name, object.as_ref())?;
                        self.complete_object(&object, concrete, selection_set, path, errors)
                    }
                    TypeDefinition::Input(_) => Err(SchemaError::InvalidSchema(format!(
                        "input type '{name}' used as a field type"
                    ))
                    .into()),
                }
            }
        }
    }

    fn complete_object(
        &self,
        object: &Arc<dyn Resolvable>,
        object_type: &TypeDescriptor,
        selection_set: &[Selection],
        path: &Path,
        errors: &mut Vec<Error>,
    ) -> Result<Value, ResolveError> {
        let mut output = Object::new();
        self.apply_selection_set(object, object_type, selection_set, path, &mut output, errors)?;
        Ok(Value::Object(output))
    }

    /// Run the field decorators in declaration order.
    fn decorate(
        &self,
        object_type: &TypeDescriptor,
        field: &FieldDescriptor,
        value: Value,
    ) -> Result<Value, ResolveError> {
        field
            .decorators
            .iter()
            .try_fold(value, |value, spec| -> Result<Value, ResolveError> {
                let decorator = self.schema.decorator(&spec.name).ok_or_else(|| {
                    SchemaError::UnknownDecorator {
                        field: format!("{}.{}", object_type.name(), field.name),
                        decorator: spec.name.clone(),
                    }
                })?;
                tracing::trace!(field = %field.name, decorator = %spec.name, "decorating");
                Ok(apply_decorator(decorator, spec, value)?)
            })
    }
}

fn call_resolver(info: &ResolveInfo<'_>) -> Result<Resolved, FieldError> {
    let object = info.object;
    match &info.field.resolver {
        Resolver::Function(resolve) => resolve(info),
        Resolver::Method(method) => object.call_method(method, info).unwrap_or_else(|| {
            Err(FieldError::UnknownMethod {
                type_name: info.parent_type.name().to_string(),
                method: method.clone(),
            })
        }),
        Resolver::HashKey(key) => Ok(object.property(key).unwrap_or(Resolved::Null)),
        Resolver::Default => {
            let method = info.field.name.to_snake_case();
            if let Some(result) = object.call_method(&method, info) {
                return result;
            }
            Ok(object
                .property(&method)
                .or_else(|| object.property(&info.field.name))
                .unwrap_or(Resolved::Null))
        }
    }
}

fn apply_decorator(
    decorator: &dyn Decorator,
    spec: &DecoratorSpec,
    value: Value,
) -> Result<Value, FieldError> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Array(items) => items
            .into_iter()
            .map(|item| apply_decorator(decorator, spec, item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        value => decorator.apply(value, &spec.parameters),
    }
}

fn into_object(resolved: Resolved) -> Result<Arc<dyn Resolvable>, &'static str> {
    match resolved {
        Resolved::Object(object) => Ok(object),
        Resolved::Value(Value::Object(object)) => Ok(Arc::new(object)),
        other => Err(other.type_name()),
    }
}

// Spec: https://spec.graphql.org/October2021/#sec-Scalars.Result-Coercion-and-Serialization
fn complete_builtin_scalar(ty: &FieldType, resolved: Resolved) -> Result<Value, ResolveError> {
    let value = match resolved {
        Resolved::Value(value) => value,
        Resolved::Enum(value) => value.into(),
        other => {
            return Err(FieldError::InvalidResultValue {
                expected: ty.to_string(),
                found: other.type_name().to_string(),
            }
            .into());
        }
    };
    match (ty, value) {
        (FieldType::String, value @ Value::String(_))
        | (FieldType::Boolean, value @ Value::Bool(_))
        | (FieldType::Id, value @ Value::String(_))
        | (FieldType::Float, value @ Value::Number(_)) => Ok(value),
        (FieldType::Int, value) if value.is_valid_int_input() => Ok(value),
        (FieldType::String, Value::Bool(b)) => Ok(Value::from(b.to_string())),
        (FieldType::String | FieldType::Id, Value::Number(n)) if n.is_i64() || n.is_u64() => {
            Ok(Value::from(n.to_string()))
        }
        (_, value) => Err(FieldError::InvalidResultValue {
            expected: ty.to_string(),
            found: value.json_type_name().to_string(),
        }
        .into()),
    }
}

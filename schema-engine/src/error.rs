//! Engine errors.
use displaydoc::Display;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::graphql::Error;
use crate::graphql::ErrorExtension;
use crate::json_ext::Object;
use crate::json_ext::Path;

/// Errors in the shape of a schema.
///
/// They indicate a broken schema rather than bad input, so they abort the whole resolution.
#[derive(Error, Display, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum SchemaError {
    /// type '{0}' is already registered
    DuplicateTypeName(String),

    /// unknown type '{0}'
    UnknownType(String),

    /// cannot resolve object of kind '{kind}' to a concrete type of '{abstract_type}'
    UnresolvedPolymorphicType {
        /// The interface or union the field was declared with.
        abstract_type: String,
        /// The runtime kind of the object.
        kind: String,
    },

    /// field '{field}' uses unknown decorator '{decorator}'
    UnknownDecorator { field: String, decorator: String },

    /// invalid schema: {0}
    InvalidSchema(String),
}

impl ErrorExtension for SchemaError {
    fn extension_code(&self) -> String {
        match self {
            SchemaError::DuplicateTypeName(_) => "DUPLICATE_TYPE_NAME",
            SchemaError::UnknownType(_) => "UNKNOWN_TYPE",
            SchemaError::UnresolvedPolymorphicType { .. } => "UNRESOLVED_POLYMORPHIC_TYPE",
            SchemaError::UnknownDecorator { .. } => "UNKNOWN_DECORATOR",
            SchemaError::InvalidSchema(_) => "INVALID_SCHEMA",
        }
        .to_string()
    }
}

impl SchemaError {
    /// Convert the schema error to a GraphQL error.
    pub fn to_graphql_error(&self) -> Error {
        Error::builder()
            .message(self.to_string())
            .extension_code(self.extension_code())
            .build()
    }
}

/// Errors raised while resolving one field or coercing one argument.
///
/// They are recovered at the smallest enclosing field and reported next to the data of its
/// siblings.
#[derive(Error, Display, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum FieldError {
    /// enum '{enum_name}' has no value labelled '{label}'
    UnknownEnumLabel { enum_name: String, label: String },

    /// enum '{enum_name}' cannot represent value '{value}'
    UnknownEnumValue { enum_name: String, value: String },

    /// missing required argument '{argument}' on '{type_name}'
    MissingRequiredArgument { type_name: String, argument: String },

    /// invalid value for argument '{argument}': expected {expected}, found {found}
    InvalidArgumentType {
        argument: String,
        expected: String,
        found: String,
    },

    /// decorator '{decorator}' expects a {expected} value, found {found}
    DecoratorTypeMismatch {
        decorator: String,
        expected: String,
        found: String,
    },

    /// could not find an object for id '{0}'
    NotFound(String),

    /// cannot represent value as {expected}: found {found}
    InvalidResultValue { expected: String, found: String },

    /// cannot query field '{field}' on type '{type_name}'
    UnknownField { type_name: String, field: String },

    /// objects of type '{type_name}' do not answer method '{method}'
    UnknownMethod { type_name: String, method: String },

    /// {0}
    Resolver(String),
}

impl FieldError {
    /// A free-form error raised by a base resolver.
    pub fn resolver(message: impl Into<String>) -> Self {
        FieldError::Resolver(message.into())
    }

    /// Convert the field error to a GraphQL error located at `path`.
    pub fn to_graphql_error(&self, path: Option<Path>, extension_codes: bool) -> Error {
        let (code, details) = if extension_codes {
            (
                Some(self.extension_code()),
                self.custom_extension_details().unwrap_or_default(),
            )
        } else {
            (None, Object::new())
        };
        Error::builder()
            .message(self.to_string())
            .and_path(path)
            .and_extension_code(code)
            .extensions(details)
            .build()
    }
}

impl ErrorExtension for FieldError {
    fn extension_code(&self) -> String {
        match self {
            FieldError::UnknownEnumLabel { .. } => "UNKNOWN_ENUM_LABEL",
            FieldError::UnknownEnumValue { .. } => "UNKNOWN_ENUM_VALUE",
            FieldError::MissingRequiredArgument { .. } => "MISSING_REQUIRED_ARGUMENT",
            FieldError::InvalidArgumentType { .. } => "INVALID_ARGUMENT_TYPE",
            FieldError::DecoratorTypeMismatch { .. } => "DECORATOR_TYPE_MISMATCH",
            FieldError::NotFound(_) => "NOT_FOUND",
            FieldError::InvalidResultValue { .. } => "INVALID_RESULT_VALUE",
            FieldError::UnknownField { .. } => "UNKNOWN_FIELD",
            FieldError::UnknownMethod { .. } => "UNKNOWN_METHOD",
            FieldError::Resolver(_) => "RESOLVER_ERROR",
        }
        .to_string()
    }

    fn custom_extension_details(&self) -> Option<Object> {
        let mut obj = Object::new();
        match self {
            FieldError::UnknownEnumLabel { enum_name, .. }
            | FieldError::UnknownEnumValue { enum_name, .. } => {
                obj.insert("enum", enum_name.clone().into());
            }
            FieldError::MissingRequiredArgument { argument, .. }
            | FieldError::InvalidArgumentType { argument, .. } => {
                obj.insert("argument", argument.clone().into());
            }
            FieldError::DecoratorTypeMismatch { decorator, .. } => {
                obj.insert("decorator", decorator.clone().into());
            }
            FieldError::NotFound(id) => {
                obj.insert("id", id.clone().into());
            }
            _ => (),
        }

        (!obj.is_empty()).then_some(obj)
    }
}

/// Why a resolution step did not produce a value.
#[derive(Error, Display, Debug, Clone, PartialEq, Eq)]
#[ignore_extra_doc_attributes]
pub enum ResolveError {
    /// {0}
    Schema(SchemaError),

    /// {0}
    Field(FieldError),

    /// a non-null position resolved to null
    ///
    /// The cause has already been reported; the null travels to the closest nullable parent.
    NullPropagation,
}

impl From<SchemaError> for ResolveError {
    fn from(error: SchemaError) -> Self {
        ResolveError::Schema(error)
    }
}

impl From<FieldError> for ResolveError {
    fn from(error: FieldError) -> Self {
        ResolveError::Field(error)
    }
}

#[cfg(test)]
mod tests {
    use serde_json_bytes::json;

    use super::*;

    #[test]
    fn field_error_to_graphql_error() {
        let error = FieldError::MissingRequiredArgument {
            type_name: "Query.find".to_string(),
            argument: "id".to_string(),
        };
        let graphql = error.to_graphql_error(Some(Path::from("/find")), true);
        assert_eq!(
            graphql.message,
            "missing required argument 'id' on 'Query.find'"
        );
        assert_eq!(
            serde_json_bytes::to_value(&graphql).unwrap(),
            json!({
                "message": "missing required argument 'id' on 'Query.find'",
                "path": ["find"],
                "extensions": {"argument": "id", "code": "MISSING_REQUIRED_ARGUMENT"}
            })
        );
    }

    #[test]
    fn field_error_without_codes() {
        let error = FieldError::NotFound("Ensemble/Nope".to_string());
        let graphql = error.to_graphql_error(None, false);
        assert!(graphql.extensions.is_empty());
        assert_eq!(graphql.path, None);
    }

    #[test]
    fn schema_error_messages() {
        let error = SchemaError::UnresolvedPolymorphicType {
            abstract_type: "PerformingAct".to_string(),
            kind: "jazz::models::Instrument".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "cannot resolve object of kind 'jazz::models::Instrument' to a concrete type of 'PerformingAct'"
        );
        assert_eq!(
            error.to_graphql_error().extension_code().as_deref(),
            Some("UNRESOLVED_POLYMORPHIC_TYPE")
        );
    }
}

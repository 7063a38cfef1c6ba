//! Type registry, descriptors and the two declaration styles.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]

mod definition;
mod enum_type;
mod field;
mod field_type;
mod input;
mod schema;
mod selection;

use std::fmt;

pub use definition::*;
pub use enum_type::*;
pub use field::Decorator;
pub use field::DecoratorSpec;
pub use field::FieldDescriptor;
pub use field::Resolver;
pub use field::ResolverFn;
pub use field_type::*;
pub use input::*;
pub use schema::*;
pub use selection::*;
use serde::Deserialize;
use serde::Serialize;

pub(crate) const TYPENAME: &str = "__typename";

/// The root operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    Query,
    Mutation,
}

impl OperationKind {
    /// The root type name used when the schema does not configure one.
    pub const fn default_type_name(&self) -> &'static str {
        match self {
            OperationKind::Query => "Query",
            OperationKind::Mutation => "Mutation",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Query => write!(f, "query"),
            OperationKind::Mutation => write!(f, "mutation"),
        }
    }
}

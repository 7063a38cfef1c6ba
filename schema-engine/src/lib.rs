//! An in-process typed schema registry and field resolution engine.
//!
//! Types are registered in a [`Schema`], either through the builder closures of
//! [`spec::TypeDescriptor`] or by implementing one of the `spec::*Definition` traits. An
//! [`Engine`] completes the schema and resolves [`Request`]s against a [`Store`].

#![warn(unreachable_pub)]

pub mod json_ext;

pub mod configuration;
mod context;
pub mod error;
pub mod execution;
pub mod global_id;
pub mod graphql;
pub mod jazz;
pub mod spec;
pub mod store;

pub use configuration::Configuration;
pub use context::Context;
pub use execution::Engine;
pub use execution::Request;
pub use execution::ResolveInfo;
pub use execution::Resolvable;
pub use execution::Resolved;
pub use spec::Schema;
pub use store::Record;
pub use store::Store;

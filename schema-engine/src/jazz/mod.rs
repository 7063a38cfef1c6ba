//! A sample schema about jazz musicians and their instruments.
//!
//! It registers types in both declaration styles side by side:
//!
//! ```text
//! interface GloballyIdentifiable { id: ID! }
//! interface NamedEntity { name: String! }
//! union PerformingAct = Musician | Ensemble
//! type Query {
//!   ensembles: [Ensemble!]!
//!   find(id: ID!): GloballyIdentifiable
//!   instruments(family: Family): [Instrument!]!
//!   inspectInput(input: InspectableInput!): [String!]!
//!   inspectKey(key: Key!): InspectableKey!
//!   nowPlaying: PerformingAct
//!   hashyEnsemble: Ensemble!
//! }
//! type Mutation {
//!   addEnsemble(input: EnsembleInput!): Ensemble!
//!   addInstrument(name: String!, family: Family!): Instrument!
//! }
//! ```

pub mod models;
pub mod resolvers;
pub mod types;

use std::sync::Arc;

use crate::error::SchemaError;
use crate::execution::Resolvable;
use crate::spec::Schema;

/// Register every type of the sample schema. The result still has to be completed, which
/// [`crate::Engine::new`] does.
pub fn schema() -> Result<Schema, SchemaError> {
    let mut schema = Schema::new();
    schema.register(types::globally_identifiable()?)?;
    schema.register_interface::<types::NamedEntity>()?;
    schema.register_enum::<types::Family>()?;
    schema.register_scalar::<models::Key>()?;
    schema.register(types::instrument()?)?;
    schema.register_object::<types::Ensemble>()?;
    schema.register_object::<types::Musician>()?;
    schema.register(types::performing_act()?)?;
    schema.register_object::<types::InspectableKey>()?;
    schema.register(types::legacy_input()?)?;
    schema.register_input::<types::InspectableInput>()?;
    schema.register_input::<types::EnsembleInput>()?;
    schema.register_object::<resolvers::Query>()?;
    schema.register_object::<resolvers::Mutation>()?;
    schema.set_mutation_type("Mutation");
    Ok(schema)
}

pub fn query() -> Arc<dyn Resolvable> {
    Arc::new(resolvers::Query)
}

pub fn mutation() -> Arc<dyn Resolvable> {
    Arc::new(resolvers::Mutation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::TypeKind;

    #[test]
    fn schema_completes() {
        let mut schema = schema().unwrap();
        schema.complete().unwrap();

        let instrument = schema.lookup("Instrument").unwrap().as_object().unwrap();
        let names = instrument.fields().map(|f| f.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["upcasedId", "name", "family", "id"]);

        let ensemble = schema.lookup("Ensemble").unwrap().as_object().unwrap();
        assert!(ensemble.supports_global_id());
        assert!(ensemble.field("formedAt").is_some());

        assert_eq!(schema.lookup("Key").unwrap().kind(), TypeKind::Scalar);
        assert!(schema.is_possible_type("GloballyIdentifiable", "Musician"));
        assert!(schema.is_possible_type("PerformingAct", "Ensemble"));
        assert!(!schema.is_possible_type("PerformingAct", "Instrument"));
    }

    #[test]
    fn registering_twice_fails() {
        let mut schema = schema().unwrap();
        assert_eq!(
            schema.register_object::<types::Musician>().unwrap_err(),
            SchemaError::DuplicateTypeName("Musician".to_string())
        );
    }
}

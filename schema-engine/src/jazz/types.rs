//! Exposed types of the sample schema.
//!
//! `Instrument`, `LegacyInput`, `GloballyIdentifiable` and `PerformingAct` use the builder
//! style. Everything else is declared on Rust types.

use crate::error::SchemaError;
use crate::global_id;
use crate::jazz::models::Key;
use crate::json_ext::Value;
use crate::json_ext::ValueExt;
use crate::spec::Arguments;
use crate::spec::EnumDefinition;
use crate::spec::EnumValues;
use crate::spec::Fields;
use crate::spec::InputDefinition;
use crate::spec::InterfaceDefinition;
use crate::spec::InternalValue;
use crate::spec::ObjectDefinition;
use crate::spec::ScalarDefinition;
use crate::spec::TypeDescriptor;

pub fn globally_identifiable() -> Result<TypeDescriptor, SchemaError> {
    TypeDescriptor::define_interface("GloballyIdentifiable", |t| {
        t.description("An object that can be fetched again from its id");
        t.global_id();
    })
}

pub fn instrument() -> Result<TypeDescriptor, SchemaError> {
    TypeDescriptor::define_object("Instrument", |t| {
        t.description("A device for making music");
        t.implements("NamedEntity").implements("GloballyIdentifiable");
        t.field("upcasedId", "ID!")
            .resolve(global_id::resolve_id)
            .upcase();
        t.field("name", "String!");
        t.field("family", "Family!");
    })
}

pub fn legacy_input() -> Result<TypeDescriptor, SchemaError> {
    TypeDescriptor::define_input("LegacyInput", |t| {
        t.argument("intValue", "Int!");
    })
}

pub fn performing_act() -> Result<TypeDescriptor, SchemaError> {
    TypeDescriptor::define_union("PerformingAct", |t| {
        t.possible_type("Musician").possible_type("Ensemble");
    })
}

pub struct NamedEntity;

impl InterfaceDefinition for NamedEntity {
    const NAME: &'static str = "NamedEntity";

    fn fields(fields: &mut Fields) {
        fields.field("name", "String!");
    }
}

pub struct Family;

impl EnumDefinition for Family {
    const NAME: &'static str = "Family";

    fn description() -> Option<&'static str> {
        Some("Groups of instruments")
    }

    fn values(values: &mut EnumValues) {
        values
            .value("STRING")
            .internal(InternalValue::symbol("str"))
            .description("Makes its sound with vibrating strings");
        values
            .value("WOODWIND")
            .description("Makes its sound by vibrating air in a pipe");
        values
            .value("BRASS")
            .description("Makes its sound by amplifying the sound of buzzing lips");
        values
            .value("PERCUSSION")
            .description("Makes its sound with something you hit");
        values
            .value("DIDGERIDOO")
            .description("Makes its sound with a short, wooden tube")
            .deprecated("Merged into BRASS");
        values.value("KEYS").description("Neither here nor there, really");
    }
}

pub struct Ensemble;

impl ObjectDefinition for Ensemble {
    const NAME: &'static str = "Ensemble";

    fn description() -> Option<&'static str> {
        Some("A group of musicians playing together")
    }

    fn interfaces() -> Vec<&'static str> {
        vec!["NamedEntity", "GloballyIdentifiable"]
    }

    fn fields(fields: &mut Fields) {
        fields.field("name", "String!");
        fields.field("upcase_name", "String!").hash_key("name").upcase();
        fields.field("musicians", "[Musician!]!");
        fields
            .field("formed_at", "String")
            .hash_key("formedAtDate");
    }
}

pub struct Musician;

impl ObjectDefinition for Musician {
    const NAME: &'static str = "Musician";

    fn interfaces() -> Vec<&'static str> {
        vec!["NamedEntity", "GloballyIdentifiable"]
    }

    fn fields(fields: &mut Fields) {
        fields.field("name", "String!");
        fields.field("instrument", "Instrument");
        fields.field("favorite_key", "Key");
    }
}

/// Exposes a [`Key`] through explicit method bindings.
pub struct InspectableKey;

impl ObjectDefinition for InspectableKey {
    const NAME: &'static str = "InspectableKey";

    fn fields(fields: &mut Fields) {
        fields.field("root", "String!");
        fields.field("is_sharp", "Boolean!").method("sharp");
        fields.field("is_flat", "Boolean!").method("flat");
    }
}

impl ScalarDefinition for Key {
    const NAME: &'static str = "Key";

    fn description() -> Option<&'static str> {
        Some("A musical key, such as `B♭`")
    }

    fn coerce_input(value: &Value) -> Result<Value, String> {
        coerce_key(value)
    }

    fn coerce_result(value: &Value) -> Result<Value, String> {
        coerce_key(value)
    }
}

fn coerce_key(value: &Value) -> Result<Value, String> {
    let notation = value
        .as_str()
        .ok_or_else(|| value.json_type_name().to_string())?;
    Key::from_notation(notation)
        .map(|key| Value::from(key.to_notation()))
        .ok_or_else(|| format!("'{notation}'"))
}

pub struct InspectableInput;

impl InputDefinition for InspectableInput {
    const NAME: &'static str = "InspectableInput";

    fn arguments(arguments: &mut Arguments) {
        arguments.argument("string_value", "String!");
        arguments.argument("nested_input", "InspectableInput");
        arguments.argument("legacy_input", "LegacyInput");
    }
}

pub struct EnsembleInput;

impl InputDefinition for EnsembleInput {
    const NAME: &'static str = "EnsembleInput";

    fn arguments(arguments: &mut Arguments) {
        arguments.argument("name", "String!");
    }
}

#[cfg(test)]
mod tests {
    use serde_json_bytes::json;

    use super::*;
    use crate::spec::TypeDefinition;

    #[test]
    fn family_keeps_deprecations_and_symbols() {
        let descriptor = TypeDescriptor::from_enum::<Family>().unwrap();
        let TypeDefinition::Enum(family) = descriptor.definition() else {
            panic!("Family is not an enum");
        };
        assert_eq!(
            family.value("DIDGERIDOO").unwrap().deprecation_reason.as_deref(),
            Some("Merged into BRASS")
        );
        assert!(family.decode("STRING").unwrap().is_symbol());
        assert_eq!(family.encode(&InternalValue::string("str")).unwrap(), "STRING");
    }

    #[test]
    fn key_scalar_coercion() {
        assert_eq!(Key::coerce_input(&json!("Bb")).unwrap(), json!("B♭"));
        assert_eq!(Key::coerce_result(&json!("E")).unwrap(), json!("E"));
        assert_eq!(Key::coerce_input(&json!("H")).unwrap_err(), "'H'");
        assert_eq!(Key::coerce_input(&json!(7)).unwrap_err(), "integer");
    }

    #[test]
    fn declarative_inputs_expose_camel_case() {
        let descriptor = TypeDescriptor::from_input::<InspectableInput>().unwrap();
        let TypeDefinition::Input(input) = descriptor.definition() else {
            panic!("InspectableInput is not an input");
        };
        let names = input
            .arguments()
            .map(|argument| argument.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["stringValue", "nestedInput", "legacyInput"]);
    }
}

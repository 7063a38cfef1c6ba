//! The `Query` and `Mutation` roots.

use crate::error::FieldError;
use crate::execution::ResolveInfo;
use crate::execution::Resolvable;
use crate::execution::Resolved;
use crate::jazz::models;
use crate::jazz::models::Key;
use crate::jazz::types::InspectableInput;
use crate::json_ext::Object;
use crate::json_ext::Value;
use crate::spec::ArgumentValue;
use crate::spec::Fields;
use crate::spec::InputObject;
use crate::spec::ObjectDefinition;
use crate::spec::Symbol;

pub struct Query;

impl ObjectDefinition for Query {
    const NAME: &'static str = "Query";

    fn fields(fields: &mut Fields) {
        fields.field("ensembles", "[Ensemble!]!");
        fields
            .field("find", "GloballyIdentifiable")
            .argument("id", "ID!");
        fields
            .field("instruments", "[Instrument!]!")
            .argument("family", "Family");
        fields
            .field("inspect_input", "[String!]!")
            .argument("input", "InspectableInput!");
        fields
            .field("inspect_key", "InspectableKey!")
            .argument("key", "Key!");
        fields
            .field("now_playing", "PerformingAct")
            .resolve(|info| {
                Ok(info
                    .store
                    .select(models::ENSEMBLE)
                    .and_then(|ensembles| ensembles.first().cloned())
                    .into())
            });
        fields
            .field("hashy_ensemble", "Ensemble!")
            .description("An ensemble that is a plain JSON object");
    }
}

impl Resolvable for Query {
    fn call_method(
        &self,
        method: &str,
        info: &ResolveInfo<'_>,
    ) -> Option<Result<Resolved, FieldError>> {
        let result = match method {
            "ensembles" => Ok(records(info, models::ENSEMBLE)),
            "find" => find(info),
            "instruments" => Ok(instruments(info)),
            "inspect_input" => inspect_input(info),
            "inspect_key" => inspect_key(info),
            "hashy_ensemble" => Ok(hashy_ensemble()),
            _ => return None,
        };
        Some(result)
    }
}

pub struct Mutation;

impl ObjectDefinition for Mutation {
    const NAME: &'static str = "Mutation";

    fn fields(fields: &mut Fields) {
        fields
            .field("add_ensemble", "Ensemble!")
            .argument("input", "EnsembleInput!");
        let add_instrument = fields.field("add_instrument", "Instrument!");
        add_instrument.argument("name", "String!");
        add_instrument.argument("family", "Family!");
    }
}

impl Resolvable for Mutation {
    fn call_method(
        &self,
        method: &str,
        info: &ResolveInfo<'_>,
    ) -> Option<Result<Resolved, FieldError>> {
        let result = match method {
            "add_ensemble" => add_ensemble(info),
            "add_instrument" => add_instrument(info),
            _ => return None,
        };
        Some(result)
    }
}

impl InspectableInput {
    /// `"<stringValue>, <context message>, <legacy intValue>, (<nested helper>)"`, with `-`
    /// standing for anything absent.
    pub fn helper(input: &InputObject) -> String {
        let string_value = input
            .method("string_value")
            .and_then(ArgumentValue::as_str)
            .unwrap_or("-");
        let message = input
            .context()
            .get_str("message")
            .unwrap_or_else(|| "-".to_string());
        let legacy = input
            .method("legacy_input")
            .and_then(ArgumentValue::as_input)
            .and_then(|legacy| legacy.get("intValue"))
            .and_then(ArgumentValue::as_i64)
            .map_or_else(|| "-".to_string(), |value| value.to_string());
        let nested = input
            .method("nested_input")
            .and_then(ArgumentValue::as_input)
            .map_or_else(|| "-".to_string(), InspectableInput::helper);
        format!("{string_value}, {message}, {legacy}, ({nested})")
    }
}

fn argument<'a>(info: &'a ResolveInfo<'_>, name: &str) -> Result<&'a ArgumentValue, FieldError> {
    info.arguments
        .get(name)
        .ok_or_else(|| FieldError::MissingRequiredArgument {
            type_name: info.arguments.type_name().to_string(),
            argument: name.to_string(),
        })
}

fn string_argument<'a>(info: &'a ResolveInfo<'_>, name: &str) -> Result<&'a str, FieldError> {
    argument(info, name)?
        .as_str()
        .ok_or_else(|| FieldError::resolver(format!("argument '{name}' is not a string")))
}

fn input_argument<'a>(info: &'a ResolveInfo<'_>, name: &str) -> Result<&'a InputObject, FieldError> {
    argument(info, name)?
        .as_input()
        .ok_or_else(|| FieldError::resolver(format!("argument '{name}' is not an input object")))
}

fn records(info: &ResolveInfo<'_>, partition: &str) -> Resolved {
    Resolved::list(info.store.select(partition).unwrap_or_default())
}

fn find(info: &ResolveInfo<'_>) -> Result<Resolved, FieldError> {
    let id = string_argument(info, "id")?;
    info.schema
        .object_from_id(info.store, id, info.configuration.global_id.separator)
        .map(Resolved::from)
}

/// Instruments whose family equals the `family` argument, all of them without one.
fn instruments(info: &ResolveInfo<'_>) -> Resolved {
    let family = info
        .arguments
        .get("family")
        .and_then(ArgumentValue::as_enum);
    let instruments = info
        .store
        .select(models::INSTRUMENT)
        .unwrap_or_default()
        .into_iter()
        .filter(|instrument| {
            family.is_none_or(|family| {
                instrument
                    .attribute("family")
                    .and_then(Resolved::as_internal_value)
                    .is_some_and(|value| &value == family)
            })
        });
    Resolved::list(instruments)
}

/// The `stringValue` of the input, read through each access path, then its helper.
fn inspect_input(info: &ResolveInfo<'_>) -> Result<Resolved, FieldError> {
    let input = input_argument(info, "input")?;
    let by_method = input.method("string_value").and_then(ArgumentValue::as_str);
    let by_name = input.get("stringValue").and_then(ArgumentValue::as_str);
    let by_symbol = input
        .get(Symbol("stringValue"))
        .and_then(ArgumentValue::as_str);
    Ok(Resolved::list([
        Resolved::from(by_method),
        Resolved::from(by_name),
        Resolved::from(by_symbol),
        Resolved::from(InspectableInput::helper(input)),
    ]))
}

fn inspect_key(info: &ResolveInfo<'_>) -> Result<Resolved, FieldError> {
    let notation = string_argument(info, "key")?;
    let key = Key::from_notation(notation)
        .ok_or_else(|| FieldError::resolver(format!("'{notation}' is not a key")))?;
    Ok(Resolved::object(key))
}

fn hashy_ensemble() -> Resolved {
    let mut ensemble = Object::new();
    ensemble.insert("name", "The Spinners".into());
    ensemble.insert("formedAtDate", "1954".into());
    ensemble.insert("musicians", Value::Array(Vec::new()));
    Resolved::from(Value::Object(ensemble))
}

fn add_ensemble(info: &ResolveInfo<'_>) -> Result<Resolved, FieldError> {
    let input = input_argument(info, "input")?;
    let name = input
        .get("name")
        .and_then(ArgumentValue::as_str)
        .ok_or_else(|| FieldError::MissingRequiredArgument {
            type_name: input.type_name().to_string(),
            argument: "name".to_string(),
        })?;
    let ensemble = info.store.push(models::ENSEMBLE, models::ensemble(name));
    Ok(Resolved::from(ensemble))
}

fn add_instrument(info: &ResolveInfo<'_>) -> Result<Resolved, FieldError> {
    let name = string_argument(info, "name")?;
    let family = argument(info, "family")?
        .as_enum()
        .cloned()
        .ok_or_else(|| FieldError::resolver("argument 'family' is not an enum value"))?;
    let instrument = info
        .store
        .push(models::INSTRUMENT, models::instrument(name, family));
    Ok(Resolved::from(instrument))
}

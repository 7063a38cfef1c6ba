//! Global object identification.
//!
//! A global id is `"<TypeName>/<NaturalKey>"`. The natural key is not escaped: callers must make
//! sure it never contains the separator.

use std::fmt;
use std::sync::Arc;

use crate::error::FieldError;
use crate::execution::ResolveInfo;
use crate::execution::Resolved;
use crate::spec::ResolverFn;
use crate::store::Record;
use crate::store::Store;

pub const DEFAULT_SEPARATOR: char = '/';

/// The capability of being globally identifiable: a concrete type name and a natural key.
pub trait Identifiable {
    fn type_name(&self) -> &str;

    fn natural_key(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GlobalId {
    pub type_name: String,
    pub key: String,
}

impl GlobalId {
    pub fn of(object: &dyn Identifiable) -> Self {
        Self {
            type_name: object.type_name().to_string(),
            key: object.natural_key().to_string(),
        }
    }

    pub fn encode(&self, separator: char) -> String {
        format!("{}{separator}{}", self.type_name, self.key)
    }

    /// Split on the first separator. Returns `None` when either side is empty.
    pub fn decode(id: &str, separator: char) -> Option<Self> {
        let (type_name, key) = id.split_once(separator)?;
        if type_name.is_empty() || key.is_empty() {
            return None;
        }
        Some(Self {
            type_name: type_name.to_string(),
            key: key.to_string(),
        })
    }
}

impl fmt::Display for GlobalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode(DEFAULT_SEPARATOR))
    }
}

pub fn to_id(object: &dyn Identifiable, separator: char) -> String {
    GlobalId::of(object).encode(separator)
}

/// Locate the record a global id was made from.
///
/// Malformed ids, unknown partitions and missing keys all end up as [`FieldError::NotFound`].
pub fn find(store: &Store, id: &str, separator: char) -> Result<Arc<Record>, FieldError> {
    let not_found = || FieldError::NotFound(id.to_string());
    let global_id = GlobalId::decode(id, separator).ok_or_else(not_found)?;
    store
        .select(&global_id.type_name)
        .ok_or_else(not_found)?
        .into_iter()
        .find(|record| record.name() == global_id.key)
        .ok_or_else(not_found)
}

/// Base resolver of `id` fields.
pub fn resolve_id(info: &ResolveInfo<'_>) -> Result<Resolved, FieldError> {
    let object = info.object.as_identifiable().ok_or_else(|| {
        FieldError::resolver(format!(
            "objects of kind '{}' are not globally identifiable",
            info.object.kind()
        ))
    })?;
    Ok(Resolved::from(to_id(
        object,
        info.configuration.global_id.separator,
    )))
}

pub fn id_resolver() -> ResolverFn {
    Arc::new(resolve_id)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn round_trip() {
        let store = Store::new();
        let pushed = store.push(
            "Ensemble",
            Record::new("jazz::models::Ensemble", "Robert Glasper Experiment"),
        );
        let id = to_id(pushed.as_ref(), DEFAULT_SEPARATOR);
        assert_eq!(id, "Ensemble/Robert Glasper Experiment");
        let found = find(&store, &id, DEFAULT_SEPARATOR).unwrap();
        assert!(Arc::ptr_eq(&found, &pushed));
    }

    #[test]
    fn custom_separator() {
        let store = Store::new();
        let pushed = store.push("Instrument", Record::new("Instrument", "Drum Kit"));
        let id = to_id(pushed.as_ref(), ':');
        assert_eq!(id, "Instrument:Drum Kit");
        assert!(Arc::ptr_eq(&find(&store, &id, ':').unwrap(), &pushed));
    }

    #[rstest]
    #[case("")]
    #[case("Ensemble")]
    #[case("/Robert Glasper Experiment")]
    #[case("Ensemble/")]
    #[case("Trombone/Robert Glasper Experiment")]
    #[case("Ensemble/Weather Report")]
    fn malformed_and_unknown_ids_are_not_found(#[case] id: &str) {
        let store = Store::new();
        store.push(
            "Ensemble",
            Record::new("Ensemble", "Robert Glasper Experiment"),
        );
        assert_eq!(
            find(&store, id, DEFAULT_SEPARATOR).unwrap_err(),
            FieldError::NotFound(id.to_string())
        );
    }

    #[test]
    fn keys_keep_later_separators() {
        let id = GlobalId::decode("Instrument/AC/DC", '/').unwrap();
        assert_eq!(id.type_name, "Instrument");
        assert_eq!(id.key, "AC/DC");
        assert_eq!(id.to_string(), "Instrument/AC/DC");
    }
}

//! Domain data of the sample schema.

use std::fmt;
use std::sync::Arc;

use crate::error::FieldError;
use crate::execution::ResolveInfo;
use crate::execution::Resolvable;
use crate::execution::Resolved;
use crate::spec::InternalValue;
use crate::store::Record;
use crate::store::Store;

pub const ENSEMBLE: &str = "Ensemble";
pub const INSTRUMENT: &str = "Instrument";
pub const MUSICIAN: &str = "Musician";

/// A record of the given model, e.g. `schema_engine::jazz::models::Ensemble`.
fn record(model: &str, name: &str) -> Record {
    Record::new(format!("{}::{model}", module_path!()), name)
}

pub fn instrument(name: &str, family: impl Into<Resolved>) -> Record {
    record(INSTRUMENT, name).with_attribute("family", family)
}

pub fn ensemble(name: &str) -> Record {
    record(ENSEMBLE, name).with_attribute("musicians", Resolved::List(Vec::new()))
}

pub fn musician(name: &str, instrument: Arc<Record>, favorite_key: &str) -> Record {
    record(MUSICIAN, name)
        .with_attribute("instrument", instrument)
        .with_attribute("favorite_key", favorite_key)
}

/// Replace the content of `store` with the sample data.
///
/// Nested references point at the stored records themselves.
pub fn seed(store: &Store) {
    store.reset(Vec::<(String, Vec<Record>)>::new());

    let banjo = store.push(INSTRUMENT, instrument("Banjo", InternalValue::symbol("str")));
    store.push(INSTRUMENT, instrument("Flute", "WOODWIND"));
    store.push(INSTRUMENT, instrument("Trumpet", "BRASS"));
    let piano = store.push(INSTRUMENT, instrument("Piano", "KEYS"));
    store.push(INSTRUMENT, instrument("Organ", "KEYS"));
    store.push(INSTRUMENT, instrument("Drum Kit", "PERCUSSION"));

    store.push(MUSICIAN, musician("Herbie Hancock", piano, "B♭"));
    let bela_fleck = store.push(MUSICIAN, musician("Bela Fleck", banjo, "E"));

    store.push(
        ENSEMBLE,
        record(ENSEMBLE, "Bela Fleck and the Flecktones")
            .with_attribute("musicians", Resolved::list([bela_fleck]))
            .with_attribute("formedAtDate", "1988"),
    );
    store.push(ENSEMBLE, ensemble("Robert Glasper Experiment"));
}

/// A musical key such as `B♭`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    root: char,
    sharp: bool,
    flat: bool,
}

impl Key {
    /// Parse a root note `A`..`G` followed by an optional `♯`/`#` or `♭`/`b`.
    pub fn from_notation(notation: &str) -> Option<Self> {
        let mut chars = notation.chars();
        let root = chars.next().filter(|c| ('A'..='G').contains(c))?;
        let (sharp, flat) = match chars.as_str() {
            "" => (false, false),
            "♯" | "#" => (true, false),
            "♭" | "b" => (false, true),
            _ => return None,
        };
        Some(Self { root, sharp, flat })
    }

    pub fn to_notation(&self) -> String {
        let accidental = if self.sharp {
            "♯"
        } else if self.flat {
            "♭"
        } else {
            ""
        };
        format!("{}{accidental}", self.root)
    }

    pub fn root(&self) -> char {
        self.root
    }

    pub fn is_sharp(&self) -> bool {
        self.sharp
    }

    pub fn is_flat(&self) -> bool {
        self.flat
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_notation())
    }
}

impl Resolvable for Key {
    fn call_method(
        &self,
        method: &str,
        _info: &ResolveInfo<'_>,
    ) -> Option<Result<Resolved, FieldError>> {
        let resolved = match method {
            "root" => Resolved::from(self.root.to_string()),
            "sharp" => Resolved::from(self.sharp),
            "flat" => Resolved::from(self.flat),
            _ => return None,
        };
        Some(Ok(resolved))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::global_id;
    use crate::global_id::Identifiable;

    #[rstest]
    #[case("B♭", "B", false, true)]
    #[case("Bb", "B", false, true)]
    #[case("F#", "F", true, false)]
    #[case("E", "E", false, false)]
    fn keys_parse_notation(
        #[case] notation: &str,
        #[case] root: &str,
        #[case] sharp: bool,
        #[case] flat: bool,
    ) {
        let key = Key::from_notation(notation).unwrap();
        assert_eq!(key.root().to_string(), root);
        assert_eq!(key.is_sharp(), sharp);
        assert_eq!(key.is_flat(), flat);
    }

    #[rstest]
    #[case("")]
    #[case("H")]
    #[case("b")]
    #[case("C##")]
    fn invalid_notation(#[case] notation: &str) {
        assert_eq!(Key::from_notation(notation), None);
    }

    #[test]
    fn notation_is_normalized() {
        assert_eq!(Key::from_notation("Bb").unwrap().to_notation(), "B♭");
        assert_eq!(Key::from_notation("F#").unwrap().to_string(), "F♯");
    }

    #[test]
    fn seed_fills_every_partition() {
        let store = Store::new();
        store.push(ENSEMBLE, ensemble("Weather Report"));
        seed(&store);
        assert_eq!(store.len(ENSEMBLE), 2);
        assert_eq!(store.len(INSTRUMENT), 6);
        assert_eq!(store.len(MUSICIAN), 2);

        let musicians = store.select(MUSICIAN).unwrap();
        let herbie = &musicians[0];
        assert_eq!(herbie.type_name(), "Musician");
        assert_eq!(Resolvable::kind(herbie.as_ref()), "schema_engine::jazz::models::Musician");
        assert!(matches!(herbie.attribute("instrument"), Some(Resolved::Object(_))));
    }

    #[test]
    fn nested_references_are_the_stored_records() {
        let store = Store::new();
        seed(&store);

        let banjo = store.select(INSTRUMENT).unwrap()[0].clone();
        let found = global_id::find(&store, &global_id::to_id(banjo.as_ref(), '/'), '/').unwrap();
        assert!(Arc::ptr_eq(&found, &banjo));

        let bela_fleck = store.select(MUSICIAN).unwrap()[1].clone();
        let Some(Resolved::Object(instrument)) = bela_fleck.attribute("instrument") else {
            panic!("musicians play an instrument");
        };
        assert!(std::ptr::addr_eq(Arc::as_ptr(instrument), Arc::as_ptr(&found)));

        let flecktones = store.select(ENSEMBLE).unwrap()[0].clone();
        let Some(Resolved::List(members)) = flecktones.attribute("musicians") else {
            panic!("ensembles list their musicians");
        };
        let [Resolved::Object(member)] = members.as_slice() else {
            panic!("the Flecktones have one seeded musician");
        };
        assert!(std::ptr::addr_eq(Arc::as_ptr(member), Arc::as_ptr(&bela_fleck)));
    }
}

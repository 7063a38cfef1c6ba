use serde::Deserialize;
use serde::Serialize;

use crate::json_ext::Object;
use crate::json_ext::Value;

/// A selection in the typed field-selection tree.
///
/// Arguments are raw: they go through input coercion when the field resolves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all_fields = "camelCase")]
pub enum Selection {
    Field {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alias: Option<String>,
        #[serde(default, skip_serializing_if = "Object::is_empty")]
        arguments: Object,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        selection_set: Vec<Selection>,
    },
    InlineFragment {
        /// No condition means the fragment applies to every concrete type.
        #[serde(default)]
        type_condition: Option<String>,
        selection_set: Vec<Selection>,
    },
}

impl Selection {
    pub fn field(name: impl Into<String>) -> Self {
        Selection::Field {
            name: name.into(),
            alias: None,
            arguments: Object::new(),
            selection_set: Vec::new(),
        }
    }

    pub fn inline_fragment(type_condition: impl Into<String>, selection_set: Vec<Selection>) -> Self {
        Selection::InlineFragment {
            type_condition: Some(type_condition.into()),
            selection_set,
        }
    }

    /// Name the response key. Ignored on inline fragments.
    pub fn alias(mut self, response_key: impl Into<String>) -> Self {
        if let Selection::Field { alias, .. } = &mut self {
            *alias = Some(response_key.into());
        }
        self
    }

    /// Add a raw argument. Ignored on inline fragments.
    pub fn argument(mut self, name: &str, value: impl Into<Value>) -> Self {
        if let Selection::Field { arguments, .. } = &mut self {
            arguments.insert(name, value.into());
        }
        self
    }

    pub fn select(mut self, selections: Vec<Selection>) -> Self {
        match &mut self {
            Selection::Field { selection_set, .. }
            | Selection::InlineFragment { selection_set, .. } => selection_set.extend(selections),
        }
        self
    }

    /// The key the selection writes in the response, `None` for inline fragments.
    pub fn response_key(&self) -> Option<&str> {
        match self {
            Selection::Field { name, alias, .. } => Some(alias.as_deref().unwrap_or(name)),
            Selection::InlineFragment { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json_bytes::json;

    use super::*;

    #[test]
    fn response_keys() {
        assert_eq!(Selection::field("name").response_key(), Some("name"));
        assert_eq!(
            Selection::field("name").alias("title").response_key(),
            Some("title")
        );
        assert_eq!(
            Selection::inline_fragment("Musician", vec![]).response_key(),
            None
        );
    }

    #[test]
    fn deserialize_selection_tree() {
        let selections: Vec<Selection> = serde_json_bytes::from_value(json!([
            {
                "kind": "Field",
                "name": "find",
                "arguments": {"id": "Ensemble/Robert Glasper Experiment"},
                "selectionSet": [
                    {"kind": "Field", "name": "__typename"},
                    {
                        "kind": "InlineFragment",
                        "typeCondition": "Ensemble",
                        "selectionSet": [{"kind": "Field", "name": "name", "alias": "title"}]
                    }
                ]
            }
        ]))
        .unwrap();

        let expected = vec![
            Selection::field("find")
                .argument("id", "Ensemble/Robert Glasper Experiment")
                .select(vec![
                    Selection::field("__typename"),
                    Selection::inline_fragment(
                        "Ensemble",
                        vec![Selection::field("name").alias("title")],
                    ),
                ]),
        ];
        assert_eq!(selections, expected);
    }
}

//! Logic for loading configuration in to an object model

use std::str::FromStr;

use displaydoc::Display;
use schemars::JsonSchema;
use schemars::schema::RootSchema;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::global_id::DEFAULT_SEPARATOR;

/// Configuration error.
#[derive(Debug, Error, Display, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// could not deserialize configuration: {0}
    DeserializeConfigError(String),

    /// {message}: {error}
    InvalidConfiguration {
        message: &'static str,
        error: String,
    },
}

/// The configuration for the engine.
///
/// Can be created through `serde::Deserialize` from various formats, usually YAML through
/// [`FromStr`].
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Configuration {
    /// Global object identification.
    #[serde(default)]
    pub global_id: GlobalId,

    /// Field resolution behaviour.
    #[serde(default)]
    pub execution: Execution,

    /// Error reporting.
    #[serde(default)]
    pub errors: Errors,
}

/// Global object identification.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct GlobalId {
    /// Separator between the type name and the natural key.
    /// default: "/"
    #[serde(default = "default_separator")]
    pub separator: char,
}

/// Field resolution behaviour.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Execution {
    /// When a non-null field resolves to null, null its parent as well, up to the closest
    /// nullable field.
    /// default: false
    #[serde(default)]
    pub null_bubbling: bool,
}

/// Error reporting.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Errors {
    /// Include `extensions.code` in reported errors.
    /// default: true
    #[serde(default = "default_extension_codes")]
    pub extension_codes: bool,
}

fn default_separator() -> char {
    DEFAULT_SEPARATOR
}

fn default_extension_codes() -> bool {
    true
}

impl Default for GlobalId {
    fn default() -> Self {
        Self {
            separator: default_separator(),
        }
    }
}

impl Default for Errors {
    fn default() -> Self {
        Self {
            extension_codes: default_extension_codes(),
        }
    }
}

impl Configuration {
    /// Generate a JSON schema for the configuration.
    pub fn json_schema() -> RootSchema {
        schemars::schema_for!(Configuration)
    }

    pub(crate) fn validate(self) -> Result<Self, ConfigurationError> {
        let separator = self.global_id.separator;
        if !separator.is_ascii_punctuation() {
            return Err(ConfigurationError::InvalidConfiguration {
                message: "global id separator must be an ASCII punctuation character",
                error: format!("found {separator:?}"),
            });
        }
        Ok(self)
    }
}

impl FromStr for Configuration {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(Configuration::default());
        }
        let configuration: Configuration = serde_yaml::from_str(s)
            .map_err(|e| ConfigurationError::DeserializeConfigError(e.to_string()))?;
        tracing::debug!(?configuration, "loaded configuration");
        configuration.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let configuration = Configuration::from_str("").unwrap();
        assert_eq!(configuration, Configuration::default());
        assert_eq!(configuration.global_id.separator, '/');
        assert!(!configuration.execution.null_bubbling);
        assert!(configuration.errors.extension_codes);
    }

    #[test]
    fn full_configuration() {
        let configuration = Configuration::from_str(
            r#"
global_id:
  separator: ":"
execution:
  null_bubbling: true
errors:
  extension_codes: false
"#,
        )
        .unwrap();
        assert_eq!(configuration.global_id.separator, ':');
        assert!(configuration.execution.null_bubbling);
        assert!(!configuration.errors.extension_codes);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let error = Configuration::from_str("execution:\n  depth_limit: 3\n").unwrap_err();
        assert!(matches!(
            error,
            ConfigurationError::DeserializeConfigError(_)
        ));
    }

    #[test]
    fn separator_must_be_punctuation() {
        let error = Configuration::from_str("global_id:\n  separator: a\n").unwrap_err();
        assert!(matches!(
            error,
            ConfigurationError::InvalidConfiguration { .. }
        ));
    }

    #[test]
    fn schema_lists_sections() {
        let schema = serde_json::to_value(Configuration::json_schema()).unwrap();
        let properties = schema["properties"].as_object().unwrap();
        assert!(properties.contains_key("global_id"));
        assert!(properties.contains_key("execution"));
        assert!(properties.contains_key("errors"));
    }
}

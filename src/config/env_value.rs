// ABOUTME: Template parameter values with environment interpolation support.
// ABOUTME: Handles literal values and references to environment variables.

use super::env_file::EnvSnapshot;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EnvValue {
    Literal(String),
    FromEnv {
        #[serde(rename = "env")]
        var: String,
        #[serde(default)]
        default: Option<String>,
    },
}

impl EnvValue {
    pub fn resolve(&self, env: &EnvSnapshot) -> Result<String> {
        match self {
            EnvValue::Literal(s) => Ok(s.clone()),
            EnvValue::FromEnv { var, default } => env
                .get(var)
                .map(str::to_string)
                .or_else(|| default.clone())
                .ok_or_else(|| Error::MissingEnvVar(var.clone())),
        }
    }
}

pub fn resolve_env_map(
    map: &BTreeMap<String, EnvValue>,
    env: &EnvSnapshot,
) -> Result<BTreeMap<String, String>> {
    map.iter()
        .map(|(k, v)| v.resolve(env).map(|resolved| (k.clone(), resolved)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_resolves_to_itself() {
        let env = EnvSnapshot::default();
        let value = EnvValue::Literal("512".to_string());
        assert_eq!(value.resolve(&env).unwrap(), "512");
    }

    #[test]
    fn env_reference_prefers_variable_over_default() {
        let env = EnvSnapshot::from_pairs([("MEMORY", "1024")]);
        let value = EnvValue::FromEnv {
            var: "MEMORY".to_string(),
            default: Some("512".to_string()),
        };
        assert_eq!(value.resolve(&env).unwrap(), "1024");
    }

    #[test]
    fn env_reference_without_value_or_default_fails() {
        let env = EnvSnapshot::default();
        let value = EnvValue::FromEnv {
            var: "MEMORY".to_string(),
            default: None,
        };
        assert!(matches!(value.resolve(&env), Err(Error::MissingEnvVar(v)) if v == "MEMORY"));
    }
}

// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

use std::{fs, path::Path};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io { path: String, source: std::io::Error },
    #[error("invalid config file {path}: {source}")]
    Yaml { path: String, source: serde_yaml::Error },
}

/// Engine-wide settings. Every field has a default so a partial YAML file is valid.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Jurisdiction whose templates are used when the requested one has none.
    pub default_jurisdiction: String,
    /// Organization named by the institutional placeholder.
    pub institution_name: String,
    /// Reserved person reference meaning "a professional, not a named individual".
    pub institutional_sentinel: String,
    /// Text rendered for a reference that matches no person pool.
    pub unknown_label: String,
    /// Backup references equivalent to "no backup" (compared case-insensitively).
    pub none_tokens: Vec<String>,
    /// Shown in place of a clause that failed and has no fallback text of its own.
    pub omitted_clause_label: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            default_jurisdiction: "Ontario".to_string(),
            institution_name: "the appointed trust company".to_string(),
            institutional_sentinel: "institution".to_string(),
            unknown_label: "[UNKNOWN PERSON]".to_string(),
            none_tokens: ["none", "n/a", "na", "null", "nil", "-"]
                .iter()
                .map(|token| token.to_string())
                .collect(),
            omitted_clause_label: "[This clause could not be completed.]".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_yaml_str(input: &str) -> Result<EngineConfig, serde_yaml::Error> {
        if input.trim().is_empty() {
            return Ok(EngineConfig::default());
        }
        serde_yaml::from_str(input)
    }

    pub fn from_yaml_file(path: &Path) -> Result<EngineConfig, ConfigError> {
        let input = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        EngineConfig::from_yaml_str(&input).map_err(|source| ConfigError::Yaml {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn is_sentinel(&self, reference: &str) -> bool {
        reference.trim().eq_ignore_ascii_case(self.institutional_sentinel.trim())
    }

    /// True for a missing backup: blank or any of the configured none-tokens.
    pub fn is_none_token(&self, reference: &str) -> bool {
        let reference = reference.trim();
        reference.is_empty() || self.none_tokens.iter().any(|token| token.eq_ignore_ascii_case(reference))
    }

    /// Filters an optional backup reference down to a real one.
    pub fn backup<'a>(&self, reference: Option<&'a str>) -> Option<&'a str> {
        reference.filter(|reference| !self.is_none_token(reference))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = EngineConfig::from_yaml_str("institution_name: Smith LLP\n").unwrap();
        assert_eq!(config.institution_name, "Smith LLP");
        assert_eq!(config.default_jurisdiction, "Ontario");
        assert_eq!(EngineConfig::from_yaml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn none_tokens_are_synonyms() {
        let config = EngineConfig::default();
        for token in ["N/A", "none", "NONE", " ", "", "null"] {
            assert!(config.is_none_token(token), "{token:?}");
        }
        assert!(!config.is_none_token("Nina"));
        assert_eq!(config.backup(Some("n/a")), None);
        assert_eq!(config.backup(Some("kid-1")), Some("kid-1"));
        assert_eq!(config.backup(None), None);
    }

    #[test]
    fn sentinel_is_case_insensitive() {
        let config = EngineConfig::default();
        assert!(config.is_sentinel("Institution"));
        assert!(!config.is_sentinel("institutional"));
    }
}

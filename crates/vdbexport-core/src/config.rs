// ABOUTME: Export options and their loading from environment variables.
// ABOUTME: Covers pretty printing, indentation, data-role ordering, and the default property filter.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tree::{DEFAULT_EXCLUDED_PREFIXES, PrefixFilter};

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("VDBEXPORT_INDENT is not a valid indentation width: {0}")]
    InvalidIndent(String),

    #[error("{name} is not a valid boolean: {value}")]
    InvalidBool { name: &'static str, value: String },
}

/// Options for one export call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub pretty_print: bool,
    pub indent: usize,
    pub sort_data_roles: bool,
    pub excluded_prefixes: Vec<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            pretty_print: false,
            indent: 4,
            sort_data_roles: false,
            excluded_prefixes: DEFAULT_EXCLUDED_PREFIXES.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl ExportOptions {
    /// Load options from environment variables with sensible defaults.
    ///
    /// Environment variables:
    /// - VDBEXPORT_PRETTY_PRINT: indent the exported XML (default: false)
    /// - VDBEXPORT_INDENT: spaces per nesting level (default: 4)
    /// - VDBEXPORT_SORT_DATA_ROLES: sort data roles by name (default: false)
    /// - VDBEXPORT_EXCLUDED_PREFIXES: comma-separated namespace prefixes whose
    ///   properties are not exported (default: jcr,mix,mode,nt,mmcore,vdb)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut options = Self::default();

        if let Some(value) = lookup("VDBEXPORT_PRETTY_PRINT") {
            options.pretty_print = parse_flag("VDBEXPORT_PRETTY_PRINT", &value)?;
        }

        if let Some(value) = lookup("VDBEXPORT_INDENT") {
            options.indent = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidIndent(value.clone()))?;
        }

        if let Some(value) = lookup("VDBEXPORT_SORT_DATA_ROLES") {
            options.sort_data_roles = parse_flag("VDBEXPORT_SORT_DATA_ROLES", &value)?;
        }

        if let Some(value) = lookup("VDBEXPORT_EXCLUDED_PREFIXES") {
            options.excluded_prefixes = value
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect();
        }

        Ok(options)
    }

    /// The property filter these options describe.
    pub fn property_filter(&self) -> PrefixFilter {
        PrefixFilter::new(self.excluded_prefixes.iter().cloned())
    }
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            name,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::tree::PropertyFilter;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn config_loads_defaults() {
        let options = ExportOptions::from_lookup(lookup_from(&[])).unwrap();

        assert!(!options.pretty_print);
        assert_eq!(options.indent, 4);
        assert!(!options.sort_data_roles);
        assert_eq!(
            options.excluded_prefixes,
            vec!["jcr", "mix", "mode", "nt", "mmcore", "vdb"]
        );
    }

    #[test]
    fn config_reads_overrides() {
        let options = ExportOptions::from_lookup(lookup_from(&[
            ("VDBEXPORT_PRETTY_PRINT", "yes"),
            ("VDBEXPORT_INDENT", "2"),
            ("VDBEXPORT_SORT_DATA_ROLES", "TRUE"),
            ("VDBEXPORT_EXCLUDED_PREFIXES", "jcr, ext ,"),
        ]))
        .unwrap();

        assert!(options.pretty_print);
        assert_eq!(options.indent, 2);
        assert!(options.sort_data_roles);
        assert_eq!(options.excluded_prefixes, vec!["jcr", "ext"]);

        let filter = options.property_filter();
        assert!(!filter.accept("ext:cacheTtl"));
        assert!(filter.accept("vdb:description"));
    }

    #[test]
    fn config_rejects_bad_indent() {
        let err = ExportOptions::from_lookup(lookup_from(&[("VDBEXPORT_INDENT", "wide")]))
            .unwrap_err();
        assert!(
            err.to_string().contains("VDBEXPORT_INDENT"),
            "error should name the variable: {}",
            err
        );
    }

    #[test]
    fn config_rejects_bad_flag() {
        let result =
            ExportOptions::from_lookup(lookup_from(&[("VDBEXPORT_PRETTY_PRINT", "maybe")]));
        assert!(matches!(result, Err(ConfigError::InvalidBool { .. })));
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: ExportOptions = serde_json::from_str(r#"{"pretty_print": true}"#).unwrap();
        assert!(options.pretty_print);
        assert_eq!(options.indent, 4);
    }
}

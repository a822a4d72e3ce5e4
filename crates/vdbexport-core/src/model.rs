// ABOUTME: Defines Model, its Sources, and the ValidationMarkers attached to a model.
// ABOUTME: Carries the defaults the serializer compares against to suppress attributes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::manifest::Properties;

/// Model type assumed when the tree does not say otherwise. Never written out.
pub const DEFAULT_MODEL_TYPE: &str = "PHYSICAL";

/// Models are visible unless marked otherwise. Never written out.
pub const DEFAULT_VISIBLE: bool = true;

/// A model within the VDB.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub name: String,
    pub model_type: String,
    pub path_in_vdb: String,
    pub visible: bool,
    pub description: String,
    pub properties: Properties,
    pub metadata_type: String,
    /// Raw definition text, written as CDATA.
    pub model_definition: String,
    /// Archive path the definition was originally loaded from. Kept for
    /// fidelity with the tree, not part of the manifest.
    pub ddl_file_entry_path: String,
    pub sources: Vec<Source>,
    pub markers: Vec<ValidationMarker>,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model_type: DEFAULT_MODEL_TYPE.to_string(),
            path_in_vdb: String::new(),
            visible: DEFAULT_VISIBLE,
            description: String::new(),
            properties: Properties::new(),
            metadata_type: String::new(),
            model_definition: String::new(),
            ddl_file_entry_path: String::new(),
            sources: Vec::new(),
            markers: Vec::new(),
        }
    }

    /// True when `model_type` is blank or the default, so the attribute is omitted.
    pub fn has_default_type(&self) -> bool {
        let model_type = self.model_type.trim();
        model_type.is_empty() || model_type == DEFAULT_MODEL_TYPE
    }
}

/// A physical source binding of a model. Owned by exactly one model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub translator: String,
    pub jndi_name: String,
}

impl Source {
    pub fn new(name: impl Into<String>, translator: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            translator: translator.into(),
            jndi_name: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    #[default]
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ERROR" => Ok(Severity::Error),
            "WARNING" => Ok(Severity::Warning),
            "INFO" => Ok(Severity::Info),
            other => Err(format!("unknown severity: {}", other)),
        }
    }
}

/// A validation problem recorded against a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationMarker {
    pub severity: Severity,
    pub path: String,
    pub message: String,
}

impl ValidationMarker {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            path: String::new(),
            message: message.into(),
        }
    }
}

// ABOUTME: Loads MemoryTree contents from YAML or JSON fixture documents.
// ABOUTME: A fixture lists namespaces plus nested nodes with scalar or list property values.

use std::fmt;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vdbexport_core::PropertyValue;

use crate::memory::{MemoryTree, StoreError};

/// Errors that can occur while loading a fixture.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid fixture: {0}")]
    Store(#[from] StoreError),
}

/// A whole fixture file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixtureDocument {
    /// Extra prefix to URI bindings, registered before any node is added.
    #[serde(default)]
    pub namespaces: IndexMap<String, String>,
    #[serde(default)]
    pub nodes: Vec<FixtureNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureNode {
    pub name: String,
    #[serde(rename = "type", default = "default_node_type")]
    pub node_type: String,
    #[serde(default)]
    pub properties: IndexMap<String, FixtureValue>,
    #[serde(default)]
    pub children: Vec<FixtureNode>,
}

fn default_node_type() -> String {
    "nt:unstructured".to_string()
}

/// A property value as written in a fixture. Scalars keep their YAML/JSON
/// type only until they are stored as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FixtureValue {
    List(Vec<Scalar>),
    Scalar(Scalar),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(value) => write!(f, "{}", value),
            Scalar::Int(value) => write!(f, "{}", value),
            Scalar::Float(value) => write!(f, "{}", value),
            Scalar::Text(value) => f.write_str(value),
        }
    }
}

impl From<&FixtureValue> for PropertyValue {
    fn from(value: &FixtureValue) -> Self {
        match value {
            FixtureValue::Scalar(scalar) => PropertyValue::Single(scalar.to_string()),
            FixtureValue::List(items) => {
                PropertyValue::Multiple(items.iter().map(Scalar::to_string).collect())
            }
        }
    }
}

impl FixtureDocument {
    pub fn from_yaml_str(text: &str) -> Result<Self, FixtureError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self, FixtureError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Build a fresh tree holding this document's namespaces and nodes.
    pub fn into_tree(self) -> Result<MemoryTree, FixtureError> {
        let mut tree = MemoryTree::new();
        for (prefix, uri) in &self.namespaces {
            tree.register_namespace(prefix, uri)?;
        }
        for node in &self.nodes {
            add_fixture_node(&mut tree, "/", node)?;
        }
        Ok(tree)
    }
}

fn add_fixture_node(
    tree: &mut MemoryTree,
    parent: &str,
    node: &FixtureNode,
) -> Result<(), StoreError> {
    let added = tree.add_node(parent, &node.name, &node.node_type)?;
    for (name, value) in &node.properties {
        tree.set_property(&added.path, name, PropertyValue::from(value))?;
    }
    for child in &node.children {
        add_fixture_node(tree, &added.path, child)?;
    }
    Ok(())
}

/// Load a fixture file into a new tree. Files ending in `.json` are read
/// as JSON; anything else as YAML.
pub fn load_fixture(path: &Path) -> Result<MemoryTree, FixtureError> {
    let text = fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let document = if is_json {
        FixtureDocument::from_json_str(&text)?
    } else {
        FixtureDocument::from_yaml_str(&text)?
    };

    let tree = document.into_tree()?;
    tracing::debug!("loaded fixture {} ({} nodes)", path.display(), tree.len());
    Ok(tree)
}

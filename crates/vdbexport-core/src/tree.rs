// ABOUTME: The read-only contract the builder needs from the external tree store.
// ABOUTME: Also holds the property-name filter collaborator and namespace-qualified name rewriting.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by a tree store while answering a read or a query.
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("query failed under {path}: {message}")]
    Query { path: String, message: String },

    #[error("cannot read property {property} of {path}: {message}")]
    Property {
        path: String,
        property: String,
        message: String,
    },

    #[error("no node at {0}")]
    NoSuchNode(String),

    #[error("namespace prefix {0} is not registered")]
    UnknownNamespace(String),
}

/// A handle to one node: its absolute path and its own name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeRef {
    pub path: String,
    pub name: String,
}

impl NodeRef {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
        }
    }
}

/// A property value as stored in the tree. Typed reads happen in the builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Single(String),
    Multiple(Vec<String>),
}

impl PropertyValue {
    /// The single value, or the first of a multi-valued property.
    pub fn first(&self) -> Option<&str> {
        match self {
            PropertyValue::Single(value) => Some(value),
            PropertyValue::Multiple(values) => values.first().map(String::as_str),
        }
    }

    /// Every value, in stored order.
    pub fn values(&self) -> Vec<&str> {
        match self {
            PropertyValue::Single(value) => vec![value.as_str()],
            PropertyValue::Multiple(values) => values.iter().map(String::as_str).collect(),
        }
    }

    /// Flatten to one string; multiple values are joined with commas.
    pub fn to_text(&self) -> String {
        match self {
            PropertyValue::Single(value) => value.clone(),
            PropertyValue::Multiple(values) => values.join(","),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Single(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Single(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Single(value.to_string())
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Single(value.to_string())
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(values: Vec<String>) -> Self {
        PropertyValue::Multiple(values)
    }
}

/// Read access to a hierarchical property store. Implementations own their
/// own locking; the exporter never mutates the tree.
pub trait TreeSession {
    /// The named property of `node`, or `None` when absent.
    fn property(&self, node: &NodeRef, name: &str) -> Result<Option<PropertyValue>, TreeError>;

    fn has_property(&self, node: &NodeRef, name: &str) -> Result<bool, TreeError> {
        Ok(self.property(node, name)?.is_some())
    }

    /// Names of every property on `node`, in the store's order.
    fn property_names(&self, node: &NodeRef) -> Result<Vec<String>, TreeError>;

    /// Children of `parent_path` whose type is `type_name`, in the store's
    /// order. Empty when there are none.
    fn find_children_of_type(
        &self,
        parent_path: &str,
        type_name: &str,
    ) -> Result<Vec<NodeRef>, TreeError>;

    /// The child of `parent_path` called `name` with type `type_name`, if any.
    fn find_named_child_of_type(
        &self,
        parent_path: &str,
        name: &str,
        type_name: &str,
    ) -> Result<Option<NodeRef>, TreeError>;

    fn resolve_namespace_uri(&self, prefix: &str) -> Result<String, TreeError>;
}

/// Decides which node properties are copied into a manifest property map.
pub trait PropertyFilter: Send + Sync {
    fn accept(&self, name: &str) -> bool;
}

impl<F> PropertyFilter for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn accept(&self, name: &str) -> bool {
        self(name)
    }
}

/// Prefixes that belong to the store or to the VDB lexicon itself.
pub const DEFAULT_EXCLUDED_PREFIXES: [&str; 6] = ["jcr", "mix", "mode", "nt", "mmcore", "vdb"];

/// Rejects properties whose namespace prefix is in an exclusion list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixFilter {
    excluded: Vec<String>,
}

impl PrefixFilter {
    pub fn new<I, S>(excluded: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            excluded: excluded.into_iter().map(Into::into).collect(),
        }
    }

    pub fn excluded(&self) -> &[String] {
        &self.excluded
    }
}

impl Default for PrefixFilter {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDED_PREFIXES)
    }
}

impl PropertyFilter for PrefixFilter {
    fn accept(&self, name: &str) -> bool {
        match name.split_once(':') {
            Some((prefix, _)) => !self.excluded.iter().any(|p| p == prefix),
            None => true,
        }
    }
}

/// Rewrite `prefix:local` as `{uri}local`. Unprefixed names pass through.
pub fn qualified_name<S>(session: &S, name: &str) -> Result<String, TreeError>
where
    S: TreeSession + ?Sized,
{
    match name.split_once(':') {
        Some((prefix, local)) => {
            let uri = session.resolve_namespace_uri(prefix)?;
            Ok(format!("{{{}}}{}", uri, local))
        }
        None => Ok(name.to_string()),
    }
}

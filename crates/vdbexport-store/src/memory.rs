// ABOUTME: MemoryTree, an in-memory hierarchical property store implementing TreeSession.
// ABOUTME: Nodes are addressed by absolute path; children and properties keep insertion order.

use indexmap::IndexMap;
use thiserror::Error;
use vdbexport_core::lexicon::namespace;
use vdbexport_core::{NodeRef, PropertyValue, TreeError, TreeSession};

/// Type of the root node every tree starts with.
pub const ROOT_TYPE: &str = "mode:root";

/// Errors raised while mutating a tree.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no node at {0}")]
    NoSuchNode(String),

    #[error("invalid node name {0:?}")]
    InvalidName(String),

    #[error("namespace prefix {prefix} is already bound to {uri}")]
    NamespaceConflict { prefix: String, uri: String },
}

#[derive(Debug, Clone)]
struct MemoryNode {
    name: String,
    node_type: String,
    properties: IndexMap<String, PropertyValue>,
    children: Vec<String>,
}

/// A tree held entirely in memory.
#[derive(Debug, Clone)]
pub struct MemoryTree {
    nodes: IndexMap<String, MemoryNode>,
    namespaces: IndexMap<String, String>,
}

impl Default for MemoryTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTree {
    /// An empty tree with a root node and the standard namespaces registered.
    pub fn new() -> Self {
        let mut nodes = IndexMap::new();
        nodes.insert(
            "/".to_string(),
            MemoryNode {
                name: String::new(),
                node_type: ROOT_TYPE.to_string(),
                properties: IndexMap::new(),
                children: Vec::new(),
            },
        );

        let namespaces = [
            ("jcr", "http://www.jcp.org/jcr/1.0"),
            ("nt", "http://www.jcp.org/jcr/nt/1.0"),
            ("mix", "http://www.jcp.org/jcr/mix/1.0"),
            ("mode", "http://www.modeshape.org/1.0"),
            (namespace::VDB_PREFIX, namespace::VDB_URI),
            (namespace::CORE_PREFIX, namespace::CORE_URI),
        ]
        .into_iter()
        .map(|(p, u)| (p.to_string(), u.to_string()))
        .collect();

        Self { nodes, namespaces }
    }

    /// The root node handle.
    pub fn root(&self) -> NodeRef {
        NodeRef::new("/", "")
    }

    /// Bind `prefix` to `uri`. Rebinding to the same URI is a no-op.
    pub fn register_namespace(&mut self, prefix: &str, uri: &str) -> Result<(), StoreError> {
        match self.namespaces.get(prefix) {
            Some(existing) if existing != uri => Err(StoreError::NamespaceConflict {
                prefix: prefix.to_string(),
                uri: existing.clone(),
            }),
            Some(_) => Ok(()),
            None => {
                self.namespaces.insert(prefix.to_string(), uri.to_string());
                Ok(())
            }
        }
    }

    pub fn namespace_uri(&self, prefix: &str) -> Option<&str> {
        self.namespaces.get(prefix).map(String::as_str)
    }

    /// The prefix bound to `uri`, if any.
    pub fn prefix_for(&self, uri: &str) -> Option<&str> {
        self.namespaces
            .iter()
            .find(|(_, u)| u.as_str() == uri)
            .map(|(p, _)| p.as_str())
    }

    /// Add a child node under `parent`. Same-name siblings get an `[n]`
    /// suffix on their path. The name is kept as given; only its path
    /// segment is escaped (see `path_segment`).
    pub fn add_node(
        &mut self,
        parent: &str,
        name: &str,
        node_type: &str,
    ) -> Result<NodeRef, StoreError> {
        if name.is_empty() {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        if !self.nodes.contains_key(parent) {
            return Err(StoreError::NoSuchNode(parent.to_string()));
        }

        let segment = path_segment(name);
        let base = if parent == "/" {
            format!("/{}", segment)
        } else {
            format!("{}/{}", parent, segment)
        };
        let mut path = base.clone();
        let mut index = 2;
        while self.nodes.contains_key(&path) {
            path = format!("{}[{}]", base, index);
            index += 1;
        }

        self.nodes.insert(
            path.clone(),
            MemoryNode {
                name: name.to_string(),
                node_type: node_type.to_string(),
                properties: IndexMap::new(),
                children: Vec::new(),
            },
        );
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.push(path.clone());
        }

        Ok(NodeRef::new(path, name))
    }

    /// Set (or replace) a property. A replaced property keeps its position.
    pub fn set_property(
        &mut self,
        path: &str,
        name: &str,
        value: impl Into<PropertyValue>,
    ) -> Result<(), StoreError> {
        let node = self
            .nodes
            .get_mut(path)
            .ok_or_else(|| StoreError::NoSuchNode(path.to_string()))?;
        node.properties.insert(name.to_string(), value.into());
        Ok(())
    }

    /// The handle of the node at `path`, if it exists.
    pub fn node(&self, path: &str) -> Option<NodeRef> {
        self.nodes
            .get(path)
            .map(|node| NodeRef::new(path, node.name.clone()))
    }

    pub fn node_type(&self, path: &str) -> Option<&str> {
        self.nodes.get(path).map(|node| node.node_type.as_str())
    }

    /// Every node of the given type anywhere in the tree, in insertion order.
    pub fn nodes_of_type(&self, node_type: &str) -> Vec<NodeRef> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.node_type == node_type)
            .map(|(path, node)| NodeRef::new(path.clone(), node.name.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    fn get(&self, path: &str) -> Result<&MemoryNode, TreeError> {
        self.nodes
            .get(path)
            .ok_or_else(|| TreeError::NoSuchNode(path.to_string()))
    }
}

/// Percent-encode the characters that carry meaning in a path: `/`
/// separates segments, `[n]` marks same-name siblings, `%` escapes.
pub fn path_segment(name: &str) -> String {
    let mut segment = String::with_capacity(name.len());
    for ch in name.chars() {
        match ch {
            '%' => segment.push_str("%25"),
            '/' => segment.push_str("%2F"),
            '[' => segment.push_str("%5B"),
            ']' => segment.push_str("%5D"),
            other => segment.push(other),
        }
    }
    segment
}

impl TreeSession for MemoryTree {
    fn property(&self, node: &NodeRef, name: &str) -> Result<Option<PropertyValue>, TreeError> {
        Ok(self.get(&node.path)?.properties.get(name).cloned())
    }

    fn has_property(&self, node: &NodeRef, name: &str) -> Result<bool, TreeError> {
        Ok(self.get(&node.path)?.properties.contains_key(name))
    }

    fn property_names(&self, node: &NodeRef) -> Result<Vec<String>, TreeError> {
        Ok(self.get(&node.path)?.properties.keys().cloned().collect())
    }

    fn find_children_of_type(
        &self,
        parent_path: &str,
        type_name: &str,
    ) -> Result<Vec<NodeRef>, TreeError> {
        let parent = self.get(parent_path)?;
        let mut found = Vec::new();
        for child_path in &parent.children {
            let child = self.get(child_path)?;
            if child.node_type == type_name {
                found.push(NodeRef::new(child_path.clone(), child.name.clone()));
            }
        }
        Ok(found)
    }

    fn find_named_child_of_type(
        &self,
        parent_path: &str,
        name: &str,
        type_name: &str,
    ) -> Result<Option<NodeRef>, TreeError> {
        Ok(self
            .find_children_of_type(parent_path, type_name)?
            .into_iter()
            .find(|child| child.name == name))
    }

    fn resolve_namespace_uri(&self, prefix: &str) -> Result<String, TreeError> {
        self.namespaces
            .get(prefix)
            .cloned()
            .ok_or_else(|| TreeError::UnknownNamespace(prefix.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_node_builds_paths() {
        let mut tree = MemoryTree::new();
        let vdb = tree.add_node("/", "MyVDB", "vdb:virtualDatabase").unwrap();
        let model = tree.add_node(&vdb.path, "orders", "vdb:declarativeModel").unwrap();

        assert_eq!(vdb.path, "/MyVDB");
        assert_eq!(model.path, "/MyVDB/orders");
        assert_eq!(model.name, "orders");
        assert_eq!(tree.node_type("/MyVDB/orders"), Some("vdb:declarativeModel"));
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn same_name_siblings_get_indexed_paths() {
        let mut tree = MemoryTree::new();
        let first = tree.add_node("/", "rule", "vdb:condition").unwrap();
        let second = tree.add_node("/", "rule", "vdb:condition").unwrap();

        assert_eq!(first.path, "/rule");
        assert_eq!(second.path, "/rule[2]");
        assert_eq!(second.name, "rule");
    }

    #[test]
    fn add_node_rejects_missing_parent_and_empty_names() {
        let mut tree = MemoryTree::new();
        assert!(matches!(
            tree.add_node("/nope", "x", "nt:unstructured"),
            Err(StoreError::NoSuchNode(_))
        ));
        assert!(matches!(
            tree.add_node("/", "", "nt:unstructured"),
            Err(StoreError::InvalidName(_))
        ));
    }

    #[test]
    fn path_characters_in_names_are_escaped_in_paths_only() {
        let mut tree = MemoryTree::new();
        let parent = tree.add_node("/", "perm", "vdb:permission").unwrap();
        let division = tree
            .add_node(&parent.path, "amount / 2 > 10", "vdb:condition")
            .unwrap();
        let indexed = tree.add_node(&parent.path, "cols[1]", "vdb:mask").unwrap();
        let again = tree
            .add_node(&parent.path, "amount / 2 > 10", "vdb:condition")
            .unwrap();

        assert_eq!(division.path, "/perm/amount %2F 2 > 10");
        assert_eq!(division.name, "amount / 2 > 10");
        assert_eq!(indexed.path, "/perm/cols%5B1%5D");
        assert_eq!(again.path, "/perm/amount %2F 2 > 10[2]");

        let conditions = tree.find_children_of_type(&parent.path, "vdb:condition").unwrap();
        let names: Vec<&str> = conditions.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["amount / 2 > 10", "amount / 2 > 10"]);
        assert_eq!(tree.node(&division.path).unwrap().name, "amount / 2 > 10");
    }

    #[test]
    fn percent_is_escaped_so_segments_stay_distinct() {
        assert_eq!(path_segment("a%2Fb"), "a%252Fb");
        assert_ne!(path_segment("a%2Fb"), path_segment("a/b"));
    }

    #[test]
    fn children_are_filtered_by_type_in_order() {
        let mut tree = MemoryTree::new();
        tree.add_node("/", "b", "vdb:dataRole").unwrap();
        tree.add_node("/", "skip", "vdb:entry").unwrap();
        tree.add_node("/", "a", "vdb:dataRole").unwrap();

        let roles = tree.find_children_of_type("/", "vdb:dataRole").unwrap();
        let names: Vec<&str> = roles.iter().map(|r| r.name.as_str()).collect();

        assert_eq!(names, vec!["b", "a"]);
        assert!(tree.find_children_of_type("/", "vdb:mask").unwrap().is_empty());
    }

    #[test]
    fn named_child_lookup_requires_name_and_type() {
        let mut tree = MemoryTree::new();
        tree.add_node("/", "vdb:sources", "vdb:sources").unwrap();

        assert!(tree
            .find_named_child_of_type("/", "vdb:sources", "vdb:sources")
            .unwrap()
            .is_some());
        assert!(tree
            .find_named_child_of_type("/", "vdb:sources", "vdb:entries")
            .unwrap()
            .is_none());
    }

    #[test]
    fn properties_keep_order_and_replace_in_place() {
        let mut tree = MemoryTree::new();
        let node = tree.add_node("/", "n", "nt:unstructured").unwrap();
        tree.set_property(&node.path, "b", "1").unwrap();
        tree.set_property(&node.path, "a", "2").unwrap();
        tree.set_property(&node.path, "b", "3").unwrap();

        assert_eq!(tree.property_names(&node).unwrap(), vec!["b", "a"]);
        assert_eq!(
            tree.property(&node, "b").unwrap(),
            Some(PropertyValue::from("3"))
        );
        assert!(tree.has_property(&node, "a").unwrap());
        assert!(!tree.has_property(&node, "c").unwrap());
    }

    #[test]
    fn reads_on_missing_nodes_fail() {
        let tree = MemoryTree::new();
        let ghost = NodeRef::new("/ghost", "ghost");
        assert!(matches!(
            tree.property(&ghost, "x"),
            Err(TreeError::NoSuchNode(_))
        ));
    }

    #[test]
    fn namespaces_resolve_and_conflict() {
        let mut tree = MemoryTree::new();
        assert_eq!(
            tree.resolve_namespace_uri("vdb").unwrap(),
            namespace::VDB_URI
        );

        tree.register_namespace("ext", "http://example.com/ext").unwrap();
        tree.register_namespace("ext", "http://example.com/ext").unwrap();
        assert!(tree.register_namespace("ext", "http://other").is_err());
        assert_eq!(tree.prefix_for("http://example.com/ext"), Some("ext"));
        assert!(tree.resolve_namespace_uri("missing").is_err());
    }

    #[test]
    fn nodes_of_type_searches_whole_tree() {
        let mut tree = MemoryTree::new();
        let parent = tree.add_node("/", "workspace", "nt:folder").unwrap();
        tree.add_node(&parent.path, "A", "vdb:virtualDatabase").unwrap();
        tree.add_node("/", "B", "vdb:virtualDatabase").unwrap();

        let vdbs = tree.nodes_of_type("vdb:virtualDatabase");
        let paths: Vec<&str> = vdbs.iter().map(|v| v.path.as_str()).collect();
        assert_eq!(paths, vec!["/workspace/A", "/B"]);
    }
}

// ABOUTME: Defines the canonical Manifest for one VDB plus its translators, entries, and imported VDBs.
// ABOUTME: Every text field defaults to an empty string; collections keep tree encounter order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::data_role::DataRole;
use crate::model::Model;

/// Name/value properties in insertion order, so exports are deterministic.
pub type Properties = IndexMap<String, String>;

/// Version written when the tree does not carry one.
pub const DEFAULT_VDB_VERSION: i32 = 1;

/// The in-memory model of one exported VDB. Maps 1:1 onto the `vdb` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,
    pub version: i32,
    pub description: String,
    pub connection_type: String,
    pub properties: Properties,
    pub models: Vec<Model>,
    pub translators: Vec<Translator>,
    pub data_roles: Vec<DataRole>,
    pub entries: Vec<Entry>,
    pub import_vdbs: Vec<ImportVdb>,
}

impl Manifest {
    /// Create an empty manifest with the given name and the default version.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: DEFAULT_VDB_VERSION,
            description: String::new(),
            connection_type: String::new(),
            properties: Properties::new(),
            models: Vec::new(),
            translators: Vec::new(),
            data_roles: Vec::new(),
            entries: Vec::new(),
            import_vdbs: Vec::new(),
        }
    }

    /// Sort data roles by name. The sort is stable, so same-named roles
    /// keep their tree order. The builder itself never sorts.
    pub fn sort_data_roles(&mut self) {
        self.data_roles.sort_by(|a, b| a.name.cmp(&b.name));
    }
}

/// A translator override declared at the VDB level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Translator {
    pub name: String,
    pub translator_type: String,
    pub description: String,
    pub properties: Properties,
}

impl Translator {
    pub fn new(name: impl Into<String>, translator_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            translator_type: translator_type.into(),
            description: String::new(),
            properties: Properties::new(),
        }
    }
}

/// A file entry packaged with the VDB.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub path: String,
    pub description: String,
    pub properties: Properties,
}

impl Entry {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            description: String::new(),
            properties: Properties::new(),
        }
    }
}

/// A reference to another VDB whose models are imported into this one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportVdb {
    pub name: String,
    pub version: i32,
    pub import_data_policies: bool,
}

impl ImportVdb {
    /// Imports pull in data policies unless told otherwise.
    pub fn new(name: impl Into<String>, version: i32) -> Self {
        Self {
            name: name.into(),
            version,
            import_data_policies: true,
        }
    }
}

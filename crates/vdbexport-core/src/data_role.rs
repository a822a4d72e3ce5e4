// ABOUTME: Defines DataRole access policies with their Permissions, row Conditions, and column Masks.
// ABOUTME: Permission allow flags are TriState so an unspecified flag is never written out.

use serde::{Deserialize, Serialize};

use crate::tristate::TriState;

/// A named access-control policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataRole {
    pub name: String,
    pub description: String,
    pub any_authenticated: bool,
    pub allow_create_temp_tables: bool,
    pub grant_all: bool,
    pub mapped_role_names: Vec<String>,
    pub permissions: Vec<Permission>,
}

impl DataRole {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            any_authenticated: false,
            allow_create_temp_tables: false,
            grant_all: false,
            mapped_role_names: Vec::new(),
            permissions: Vec::new(),
        }
    }
}

/// Allow flags scoped to one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub resource_name: String,
    pub allow_create: TriState,
    pub allow_read: TriState,
    pub allow_update: TriState,
    pub allow_delete: TriState,
    pub allow_execute: TriState,
    pub allow_alter: TriState,
    pub allow_language: TriState,
    pub conditions: Vec<Condition>,
    pub masks: Vec<Mask>,
}

impl Permission {
    /// A permission on `resource_name` with every flag unset.
    pub fn new(resource_name: impl Into<String>) -> Self {
        Self {
            resource_name: resource_name.into(),
            allow_create: TriState::Unset,
            allow_read: TriState::Unset,
            allow_update: TriState::Unset,
            allow_delete: TriState::Unset,
            allow_execute: TriState::Unset,
            allow_alter: TriState::Unset,
            allow_language: TriState::Unset,
            conditions: Vec::new(),
            masks: Vec::new(),
        }
    }

    /// The allow flags paired with their manifest element names, in document order.
    pub fn flags(&self) -> [(&'static str, TriState); 7] {
        use crate::lexicon::manifest as ids;

        [
            (ids::ALLOW_CREATE, self.allow_create),
            (ids::ALLOW_READ, self.allow_read),
            (ids::ALLOW_UPDATE, self.allow_update),
            (ids::ALLOW_DELETE, self.allow_delete),
            (ids::ALLOW_EXECUTE, self.allow_execute),
            (ids::ALLOW_ALTER, self.allow_alter),
            (ids::ALLOW_LANGUAGE, self.allow_language),
        ]
    }
}

/// A row-level condition. `constraint` defaults to true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub rule: String,
    pub constraint: bool,
}

impl Condition {
    pub fn new(rule: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            constraint: true,
        }
    }
}

/// A column mask applied in ascending `order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mask {
    pub rule: String,
    pub order: i32,
}

impl Mask {
    pub fn new(rule: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            order: 0,
        }
    }
}

// ABOUTME: ManifestBuilder walks one VDB node of the tree and assembles the canonical Manifest.
// ABOUTME: Flattens grouping nodes into plain lists and applies defaults for absent optional properties.

use thiserror::Error;

use crate::data_role::{Condition, DataRole, Mask, Permission};
use crate::lexicon::tree as lex;
use crate::manifest::{Entry, ImportVdb, Manifest, Properties, Translator};
use crate::model::{Model, Severity, Source, ValidationMarker, DEFAULT_MODEL_TYPE};
use crate::tree::{qualified_name, NodeRef, PropertyFilter, TreeError, TreeSession};
use crate::tristate::TriState;

/// Errors that abort a manifest build. No partial manifest is ever returned.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("{node} is missing required field {field}")]
    MissingRequiredField { node: String, field: String },

    #[error("property {property} of {node} has value {value:?}, expected {expected}")]
    MalformedProperty {
        node: String,
        property: String,
        value: String,
        expected: &'static str,
    },

    #[error("tree error: {0}")]
    Tree(#[from] TreeError),
}

impl BuildError {
    fn missing(node: &NodeRef, field: &str) -> Self {
        BuildError::MissingRequiredField {
            node: node.path.clone(),
            field: field.to_string(),
        }
    }

    fn malformed(node: &NodeRef, property: &str, value: &str, expected: &'static str) -> Self {
        BuildError::MalformedProperty {
            node: node.path.clone(),
            property: property.to_string(),
            value: value.to_string(),
            expected,
        }
    }
}

/// Reads a VDB subtree through a `TreeSession` and produces a `Manifest`.
/// Holds only borrowed collaborators, so one builder per export call is cheap.
pub struct ManifestBuilder<'a, S: TreeSession + ?Sized> {
    session: &'a S,
    filter: &'a dyn PropertyFilter,
}

impl<'a, S: TreeSession + ?Sized> ManifestBuilder<'a, S> {
    pub fn new(session: &'a S, filter: &'a dyn PropertyFilter) -> Self {
        Self { session, filter }
    }

    /// Build the manifest rooted at `vdb`. The VDB name comes from its
    /// `vdb:name` property, falling back to the node name.
    pub fn build(&self, vdb: &NodeRef) -> Result<Manifest, BuildError> {
        let name = match self.string(vdb, lex::NAME)? {
            Some(name) if !name.trim().is_empty() => name,
            Some(_) => {
                tracing::warn!("{} has a blank {}, using the node name", vdb.path, lex::NAME);
                vdb.name.clone()
            }
            None => vdb.name.clone(),
        };
        if name.trim().is_empty() {
            return Err(BuildError::missing(vdb, lex::NAME));
        }

        let mut manifest = Manifest::new(name);
        if let Some(description) = self.string(vdb, lex::DESCRIPTION)? {
            manifest.description = description;
        }
        if let Some(version) = self.int(vdb, lex::VERSION)? {
            manifest.version = version;
        }
        if let Some(connection_type) = self.string(vdb, lex::CONNECTION_TYPE)? {
            manifest.connection_type = connection_type;
        }
        self.copy_properties(vdb, &mut manifest.properties)?;

        for model_node in self.session.find_children_of_type(&vdb.path, lex::DECLARATIVE_MODEL)? {
            let model = self.build_model(&model_node)?;
            tracing::debug!("added model {} to manifest {}", model.name, manifest.name);
            manifest.models.push(model);
        }

        for node in self.grouped_children(vdb, lex::TRANSLATORS, lex::TRANSLATOR)? {
            let translator = self.build_translator(&node)?;
            tracing::debug!("added translator {} to manifest {}", translator.name, manifest.name);
            manifest.translators.push(translator);
        }

        for node in self.grouped_children(vdb, lex::DATA_ROLES, lex::DATA_ROLE)? {
            let data_role = self.build_data_role(&node)?;
            tracing::debug!("added data role {} to manifest {}", data_role.name, manifest.name);
            manifest.data_roles.push(data_role);
        }

        for node in self.grouped_children(vdb, lex::ENTRIES, lex::ENTRY)? {
            let entry = self.build_entry(&node)?;
            tracing::debug!("added entry {} to manifest {}", entry.path, manifest.name);
            manifest.entries.push(entry);
        }

        for node in self.grouped_children(vdb, lex::IMPORT_VDBS, lex::IMPORT_VDB)? {
            let import = self.build_import_vdb(&node)?;
            tracing::debug!("added import vdb {} to manifest {}", import.name, manifest.name);
            manifest.import_vdbs.push(import);
        }

        Ok(manifest)
    }

    fn build_model(&self, node: &NodeRef) -> Result<Model, BuildError> {
        let mut model = Model::new(self.node_name(node)?);
        model.model_type = self
            .string(node, lex::MODEL_TYPE)?
            .unwrap_or_else(|| DEFAULT_MODEL_TYPE.to_string());
        if let Some(path) = self.string(node, lex::PATH_IN_VDB)? {
            model.path_in_vdb = path;
        }
        if let Some(visible) = self.boolean(node, lex::VISIBLE)? {
            model.visible = visible;
        }
        if let Some(description) = self.string(node, lex::DESCRIPTION)? {
            model.description = description;
        }
        self.copy_properties(node, &mut model.properties)?;
        if let Some(metadata_type) = self.string(node, lex::METADATA_TYPE)? {
            model.metadata_type = metadata_type;
        }
        if let Some(definition) = self.string(node, lex::MODEL_DEFINITION)? {
            model.model_definition = definition;
        }
        if let Some(path) = self.string(node, lex::DDL_FILE_ENTRY_PATH)? {
            model.ddl_file_entry_path = path;
        }

        for source_node in self.grouped_children(node, lex::SOURCES, lex::SOURCE)? {
            let translator = self
                .string(&source_node, lex::SOURCE_TRANSLATOR)?
                .filter(|t| !t.trim().is_empty())
                .ok_or_else(|| BuildError::missing(&source_node, lex::SOURCE_TRANSLATOR))?;
            let mut source = Source::new(self.node_name(&source_node)?, translator);
            if let Some(jndi_name) = self.string(&source_node, lex::SOURCE_JNDI_NAME)? {
                source.jndi_name = jndi_name;
            }
            tracing::debug!("added source {} to model {}", source.name, model.name);
            model.sources.push(source);
        }

        for marker_node in self.grouped_children(node, lex::MARKERS, lex::MARKER)? {
            let severity = match self.string(&marker_node, lex::SEVERITY)? {
                Some(text) => text.parse::<Severity>().map_err(|_| {
                    BuildError::malformed(&marker_node, lex::SEVERITY, &text, "ERROR, WARNING or INFO")
                })?,
                None => Severity::default(),
            };
            let message = self.string(&marker_node, lex::MESSAGE)?.unwrap_or_default();
            let mut marker = ValidationMarker::new(severity, message);
            if let Some(path) = self.string(&marker_node, lex::PATH)? {
                marker.path = path;
            }
            model.markers.push(marker);
        }

        Ok(model)
    }

    fn build_translator(&self, node: &NodeRef) -> Result<Translator, BuildError> {
        let translator_type = self
            .string(node, lex::TYPE)?
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| BuildError::missing(node, lex::TYPE))?;
        let mut translator = Translator::new(self.node_name(node)?, translator_type);
        if let Some(description) = self.string(node, lex::DESCRIPTION)? {
            translator.description = description;
        }
        self.copy_properties(node, &mut translator.properties)?;
        Ok(translator)
    }

    fn build_data_role(&self, node: &NodeRef) -> Result<DataRole, BuildError> {
        let mut data_role = DataRole::new(self.node_name(node)?);
        if let Some(description) = self.string(node, lex::DESCRIPTION)? {
            data_role.description = description;
        }
        data_role.any_authenticated = self.boolean(node, lex::ANY_AUTHENTICATED)?.unwrap_or(false);
        data_role.allow_create_temp_tables = self
            .boolean(node, lex::ALLOW_CREATE_TEMP_TABLES)?
            .unwrap_or(false);
        data_role.grant_all = self.boolean(node, lex::GRANT_ALL)?.unwrap_or(false);

        if let Some(value) = self.session.property(node, lex::MAPPED_ROLE_NAMES)? {
            for role in value.values() {
                tracing::debug!("added mapped role {} to data role {}", role, data_role.name);
                data_role.mapped_role_names.push(role.to_string());
            }
        }

        for permission_node in self.grouped_children(node, lex::PERMISSIONS, lex::PERMISSION)? {
            let permission = self.build_permission(&permission_node)?;
            tracing::debug!(
                "added permission {} to data role {}",
                permission.resource_name,
                data_role.name
            );
            data_role.permissions.push(permission);
        }

        Ok(data_role)
    }

    fn build_permission(&self, node: &NodeRef) -> Result<Permission, BuildError> {
        let mut permission = Permission::new(self.node_name(node)?);
        permission.allow_create = self.tri_state(node, lex::ALLOW_CREATE)?;
        permission.allow_read = self.tri_state(node, lex::ALLOW_READ)?;
        permission.allow_update = self.tri_state(node, lex::ALLOW_UPDATE)?;
        permission.allow_delete = self.tri_state(node, lex::ALLOW_DELETE)?;
        permission.allow_execute = self.tri_state(node, lex::ALLOW_EXECUTE)?;
        permission.allow_alter = self.tri_state(node, lex::ALLOW_ALTER)?;
        permission.allow_language = self.tri_state(node, lex::ALLOW_LANGUAGE)?;

        for condition_node in self.session.find_children_of_type(&node.path, lex::CONDITION)? {
            let mut condition = Condition::new(self.node_name(&condition_node)?);
            if let Some(constraint) = self.boolean(&condition_node, lex::CONSTRAINT)? {
                condition.constraint = constraint;
            }
            tracing::debug!(
                "added condition {} to permission {}",
                condition.rule,
                permission.resource_name
            );
            permission.conditions.push(condition);
        }

        for mask_node in self.session.find_children_of_type(&node.path, lex::MASK)? {
            let mut mask = Mask::new(self.node_name(&mask_node)?);
            if let Some(order) = self.int(&mask_node, lex::ORDER)? {
                mask.order = order;
            }
            tracing::debug!("added mask {} to permission {}", mask.rule, permission.resource_name);
            permission.masks.push(mask);
        }

        Ok(permission)
    }

    fn build_entry(&self, node: &NodeRef) -> Result<Entry, BuildError> {
        let path = self
            .string(node, lex::PATH)?
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| BuildError::missing(node, lex::PATH))?;
        let mut entry = Entry::new(path);
        if let Some(description) = self.string(node, lex::DESCRIPTION)? {
            entry.description = description;
        }
        self.copy_properties(node, &mut entry.properties)?;
        Ok(entry)
    }

    fn build_import_vdb(&self, node: &NodeRef) -> Result<ImportVdb, BuildError> {
        let version = self
            .int(node, lex::VERSION)?
            .ok_or_else(|| BuildError::missing(node, lex::VERSION))?;
        let mut import = ImportVdb::new(self.node_name(node)?, version);
        if let Some(import_data_policies) = self.boolean(node, lex::IMPORT_DATA_POLICIES)? {
            import.import_data_policies = import_data_policies;
        }
        Ok(import)
    }

    /// Children of type `child_type` under the grouping node `group` of
    /// `parent`. A missing grouping node means no children.
    fn grouped_children(
        &self,
        parent: &NodeRef,
        group: &str,
        child_type: &str,
    ) -> Result<Vec<NodeRef>, BuildError> {
        match self.session.find_named_child_of_type(&parent.path, group, group)? {
            Some(grouping) => Ok(self.session.find_children_of_type(&grouping.path, child_type)?),
            None => Ok(Vec::new()),
        }
    }

    /// Copy every accepted property of `node` into `target`, qualifying
    /// namespaced names.
    fn copy_properties(&self, node: &NodeRef, target: &mut Properties) -> Result<(), BuildError> {
        for name in self.session.property_names(node)? {
            if !self.filter.accept(&name) {
                continue;
            }
            if let Some(value) = self.session.property(node, &name)? {
                let key = qualified_name(self.session, &name)?;
                target.insert(key, value.to_text());
            }
        }
        Ok(())
    }

    fn node_name(&self, node: &NodeRef) -> Result<String, BuildError> {
        if node.name.trim().is_empty() {
            return Err(BuildError::missing(node, "name"));
        }
        Ok(node.name.clone())
    }

    fn string(&self, node: &NodeRef, name: &str) -> Result<Option<String>, BuildError> {
        Ok(self
            .session
            .property(node, name)?
            .and_then(|value| value.first().map(str::to_string)))
    }

    fn boolean(&self, node: &NodeRef, name: &str) -> Result<Option<bool>, BuildError> {
        match self.string(node, name)? {
            Some(text) => parse_bool(&text)
                .map(Some)
                .ok_or_else(|| BuildError::malformed(node, name, &text, "a boolean")),
            None => Ok(None),
        }
    }

    fn int(&self, node: &NodeRef, name: &str) -> Result<Option<i32>, BuildError> {
        match self.string(node, name)? {
            Some(text) => text
                .trim()
                .parse::<i32>()
                .map(Some)
                .map_err(|_| BuildError::malformed(node, name, &text, "an integer")),
            None => Ok(None),
        }
    }

    /// Check `has_property` first, so an absent flag stays unset.
    fn tri_state(&self, node: &NodeRef, name: &str) -> Result<TriState, BuildError> {
        let value = if self.session.has_property(node, name)? {
            self.boolean(node, name)?
        } else {
            None
        };
        Ok(TriState::from_nullable_boolean(value))
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

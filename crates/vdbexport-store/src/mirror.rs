// ABOUTME: Writes a Manifest back into a MemoryTree using the VDB tree lexicon.
// ABOUTME: Building the mirrored node again yields an equal Manifest, which the export tests rely on.

use vdbexport_core::lexicon::tree as lex;
use vdbexport_core::{DataRole, Manifest, Model, NodeRef, Permission, Properties};

use crate::memory::{MemoryTree, StoreError};

/// Add `manifest` under `parent` as a `vdb:virtualDatabase` node and
/// return that node.
///
/// Property keys of the form `{uri}local` are written as `prefix:local`,
/// registering a generated prefix when the URI is not bound yet. Keys in
/// namespaces the exporter filters out will not survive a rebuild.
pub fn mirror_manifest(
    tree: &mut MemoryTree,
    parent: &str,
    manifest: &Manifest,
) -> Result<NodeRef, StoreError> {
    let vdb = tree.add_node(parent, &manifest.name, lex::VIRTUAL_DATABASE)?;
    tree.set_property(&vdb.path, lex::NAME, manifest.name.as_str())?;
    tree.set_property(&vdb.path, lex::VERSION, manifest.version)?;
    set_text(tree, &vdb, lex::DESCRIPTION, &manifest.description)?;
    set_text(tree, &vdb, lex::CONNECTION_TYPE, &manifest.connection_type)?;
    set_properties(tree, &vdb, &manifest.properties)?;

    for model in &manifest.models {
        mirror_model(tree, &vdb, model)?;
    }

    if !manifest.translators.is_empty() {
        let group = tree.add_node(&vdb.path, lex::TRANSLATORS, lex::TRANSLATORS)?;
        for translator in &manifest.translators {
            let node = tree.add_node(&group.path, &translator.name, lex::TRANSLATOR)?;
            tree.set_property(&node.path, lex::TYPE, translator.translator_type.as_str())?;
            set_text(tree, &node, lex::DESCRIPTION, &translator.description)?;
            set_properties(tree, &node, &translator.properties)?;
        }
    }

    if !manifest.data_roles.is_empty() {
        let group = tree.add_node(&vdb.path, lex::DATA_ROLES, lex::DATA_ROLES)?;
        for data_role in &manifest.data_roles {
            mirror_data_role(tree, &group, data_role)?;
        }
    }

    if !manifest.entries.is_empty() {
        let group = tree.add_node(&vdb.path, lex::ENTRIES, lex::ENTRIES)?;
        for entry in &manifest.entries {
            // The builder reads the path from vdb:path, never the node name.
            let node = tree.add_node(&group.path, "entry", lex::ENTRY)?;
            tree.set_property(&node.path, lex::PATH, entry.path.as_str())?;
            set_text(tree, &node, lex::DESCRIPTION, &entry.description)?;
            set_properties(tree, &node, &entry.properties)?;
        }
    }

    if !manifest.import_vdbs.is_empty() {
        let group = tree.add_node(&vdb.path, lex::IMPORT_VDBS, lex::IMPORT_VDBS)?;
        for import in &manifest.import_vdbs {
            let node = tree.add_node(&group.path, &import.name, lex::IMPORT_VDB)?;
            tree.set_property(&node.path, lex::VERSION, import.version)?;
            tree.set_property(
                &node.path,
                lex::IMPORT_DATA_POLICIES,
                import.import_data_policies,
            )?;
        }
    }

    tracing::debug!("mirrored manifest {} at {}", manifest.name, vdb.path);
    Ok(vdb)
}

fn mirror_model(tree: &mut MemoryTree, vdb: &NodeRef, model: &Model) -> Result<(), StoreError> {
    let node = tree.add_node(&vdb.path, &model.name, lex::DECLARATIVE_MODEL)?;
    set_text(tree, &node, lex::MODEL_TYPE, &model.model_type)?;
    set_text(tree, &node, lex::PATH_IN_VDB, &model.path_in_vdb)?;
    tree.set_property(&node.path, lex::VISIBLE, model.visible)?;
    set_text(tree, &node, lex::DESCRIPTION, &model.description)?;
    set_text(tree, &node, lex::METADATA_TYPE, &model.metadata_type)?;
    set_text(tree, &node, lex::MODEL_DEFINITION, &model.model_definition)?;
    set_text(tree, &node, lex::DDL_FILE_ENTRY_PATH, &model.ddl_file_entry_path)?;
    set_properties(tree, &node, &model.properties)?;

    if !model.sources.is_empty() {
        let group = tree.add_node(&node.path, lex::SOURCES, lex::SOURCES)?;
        for source in &model.sources {
            let source_node = tree.add_node(&group.path, &source.name, lex::SOURCE)?;
            tree.set_property(&source_node.path, lex::SOURCE_TRANSLATOR, source.translator.as_str())?;
            set_text(tree, &source_node, lex::SOURCE_JNDI_NAME, &source.jndi_name)?;
        }
    }

    if !model.markers.is_empty() {
        let group = tree.add_node(&node.path, lex::MARKERS, lex::MARKERS)?;
        for marker in &model.markers {
            let marker_node = tree.add_node(&group.path, "marker", lex::MARKER)?;
            tree.set_property(&marker_node.path, lex::SEVERITY, marker.severity.as_str())?;
            tree.set_property(&marker_node.path, lex::MESSAGE, marker.message.as_str())?;
            set_text(tree, &marker_node, lex::PATH, &marker.path)?;
        }
    }

    Ok(())
}

fn mirror_data_role(
    tree: &mut MemoryTree,
    group: &NodeRef,
    data_role: &DataRole,
) -> Result<(), StoreError> {
    let node = tree.add_node(&group.path, &data_role.name, lex::DATA_ROLE)?;
    set_text(tree, &node, lex::DESCRIPTION, &data_role.description)?;
    tree.set_property(&node.path, lex::ANY_AUTHENTICATED, data_role.any_authenticated)?;
    tree.set_property(
        &node.path,
        lex::ALLOW_CREATE_TEMP_TABLES,
        data_role.allow_create_temp_tables,
    )?;
    tree.set_property(&node.path, lex::GRANT_ALL, data_role.grant_all)?;
    if !data_role.mapped_role_names.is_empty() {
        tree.set_property(
            &node.path,
            lex::MAPPED_ROLE_NAMES,
            data_role.mapped_role_names.clone(),
        )?;
    }

    if !data_role.permissions.is_empty() {
        let permissions = tree.add_node(&node.path, lex::PERMISSIONS, lex::PERMISSIONS)?;
        for permission in &data_role.permissions {
            mirror_permission(tree, &permissions, permission)?;
        }
    }
    Ok(())
}

fn mirror_permission(
    tree: &mut MemoryTree,
    group: &NodeRef,
    permission: &Permission,
) -> Result<(), StoreError> {
    let node = tree.add_node(&group.path, &permission.resource_name, lex::PERMISSION)?;
    let flags = [
        (lex::ALLOW_CREATE, permission.allow_create),
        (lex::ALLOW_READ, permission.allow_read),
        (lex::ALLOW_UPDATE, permission.allow_update),
        (lex::ALLOW_DELETE, permission.allow_delete),
        (lex::ALLOW_EXECUTE, permission.allow_execute),
        (lex::ALLOW_ALTER, permission.allow_alter),
        (lex::ALLOW_LANGUAGE, permission.allow_language),
    ];
    for (name, flag) in flags {
        // Unset flags are left off the node entirely.
        if let Some(text) = flag.as_str() {
            tree.set_property(&node.path, name, text)?;
        }
    }

    for condition in &permission.conditions {
        let condition_node = tree.add_node(&node.path, &condition.rule, lex::CONDITION)?;
        tree.set_property(&condition_node.path, lex::CONSTRAINT, condition.constraint)?;
    }
    for mask in &permission.masks {
        let mask_node = tree.add_node(&node.path, &mask.rule, lex::MASK)?;
        tree.set_property(&mask_node.path, lex::ORDER, mask.order)?;
    }
    Ok(())
}

fn set_text(
    tree: &mut MemoryTree,
    node: &NodeRef,
    name: &str,
    value: &str,
) -> Result<(), StoreError> {
    if value.is_empty() {
        return Ok(());
    }
    tree.set_property(&node.path, name, value)
}

fn set_properties(
    tree: &mut MemoryTree,
    node: &NodeRef,
    properties: &Properties,
) -> Result<(), StoreError> {
    for (key, value) in properties {
        let name = prefixed_name(tree, key)?;
        tree.set_property(&node.path, &name, value.as_str())?;
    }
    Ok(())
}

/// Turn `{uri}local` into `prefix:local`, binding a fresh `nsN` prefix
/// when needed. Plain keys pass through.
fn prefixed_name(tree: &mut MemoryTree, key: &str) -> Result<String, StoreError> {
    let Some((uri, local)) = key
        .strip_prefix('{')
        .and_then(|rest| rest.split_once('}'))
    else {
        return Ok(key.to_string());
    };

    if let Some(prefix) = tree.prefix_for(uri) {
        return Ok(format!("{}:{}", prefix, local));
    }

    let mut index = 1;
    let prefix = loop {
        let candidate = format!("ns{}", index);
        if tree.namespace_uri(&candidate).is_none() {
            break candidate;
        }
        index += 1;
    };
    tree.register_namespace(&prefix, uri)?;
    Ok(format!("{}:{}", prefix, local))
}

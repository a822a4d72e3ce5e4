// ABOUTME: Names used on both sides of the export: tree node types/properties and manifest XML ids.
// ABOUTME: The manifest ids are part of the wire contract with the importer and must not change.

/// Namespace URIs known to every tree session.
pub mod namespace {
    pub const VDB_PREFIX: &str = "vdb";
    pub const VDB_URI: &str = "http://www.metamatrix.com/metamodels/VirtualDatabase";
    pub const CORE_PREFIX: &str = "mmcore";
    pub const CORE_URI: &str = "http://www.metamatrix.com/metamodels/Core";
}

/// Node types and property names of VDB content in the tree.
pub mod tree {
    pub const VIRTUAL_DATABASE: &str = "vdb:virtualDatabase";
    pub const NAME: &str = "vdb:name";
    pub const DESCRIPTION: &str = "vdb:description";
    pub const VERSION: &str = "vdb:version";
    pub const CONNECTION_TYPE: &str = "vdb:connectionType";

    pub const DECLARATIVE_MODEL: &str = "vdb:declarativeModel";
    pub const MODEL_TYPE: &str = "mmcore:modelType";
    pub const PATH_IN_VDB: &str = "vdb:pathInVdb";
    pub const VISIBLE: &str = "vdb:visible";
    pub const METADATA_TYPE: &str = "vdb:metadataType";
    pub const MODEL_DEFINITION: &str = "vdb:modelDefinition";
    pub const DDL_FILE_ENTRY_PATH: &str = "vdb:ddlFileEntryPath";

    pub const SOURCES: &str = "vdb:sources";
    pub const SOURCE: &str = "vdb:source";
    pub const SOURCE_TRANSLATOR: &str = "vdb:sourceTranslator";
    pub const SOURCE_JNDI_NAME: &str = "vdb:sourceJndiName";

    pub const MARKERS: &str = "vdb:markers";
    pub const MARKER: &str = "vdb:marker";
    pub const SEVERITY: &str = "vdb:severity";
    pub const PATH: &str = "vdb:path";
    pub const MESSAGE: &str = "vdb:message";

    pub const TRANSLATORS: &str = "vdb:translators";
    pub const TRANSLATOR: &str = "vdb:translator";
    pub const TYPE: &str = "vdb:type";

    pub const DATA_ROLES: &str = "vdb:dataRoles";
    pub const DATA_ROLE: &str = "vdb:dataRole";
    pub const ANY_AUTHENTICATED: &str = "vdb:anyAuthenticated";
    pub const ALLOW_CREATE_TEMP_TABLES: &str = "vdb:allowCreateTemporaryTables";
    pub const GRANT_ALL: &str = "vdb:grantAll";
    pub const MAPPED_ROLE_NAMES: &str = "vdb:mappedRoleNames";

    pub const PERMISSIONS: &str = "vdb:permissions";
    pub const PERMISSION: &str = "vdb:permission";
    pub const ALLOW_CREATE: &str = "vdb:allowCreate";
    pub const ALLOW_READ: &str = "vdb:allowRead";
    pub const ALLOW_UPDATE: &str = "vdb:allowUpdate";
    pub const ALLOW_DELETE: &str = "vdb:allowDelete";
    pub const ALLOW_EXECUTE: &str = "vdb:allowExecute";
    pub const ALLOW_ALTER: &str = "vdb:allowAlter";
    pub const ALLOW_LANGUAGE: &str = "vdb:allowLanguage";

    pub const CONDITION: &str = "vdb:condition";
    pub const CONSTRAINT: &str = "vdb:constraint";
    pub const MASK: &str = "vdb:mask";
    pub const ORDER: &str = "vdb:order";

    pub const ENTRIES: &str = "vdb:entries";
    pub const ENTRY: &str = "vdb:entry";

    pub const IMPORT_VDBS: &str = "vdb:importVdbs";
    pub const IMPORT_VDB: &str = "vdb:importVdb";
    pub const IMPORT_DATA_POLICIES: &str = "vdb:importDataPolicies";
}

/// Element and attribute names of the vdb.xml manifest.
pub mod manifest {
    pub const VDB: &str = "vdb";
    pub const NAME: &str = "name";
    pub const VERSION: &str = "version";
    pub const VALUE: &str = "value";
    pub const DESCRIPTION: &str = "description";
    pub const CONNECTION_TYPE: &str = "connection-type";
    pub const PROPERTY: &str = "property";

    pub const IMPORT_VDB: &str = "import-vdb";
    pub const IMPORT_DATA_POLICIES: &str = "import-data-policies";

    pub const MODEL: &str = "model";
    pub const TYPE: &str = "type";
    pub const VISIBLE: &str = "visible";
    pub const PATH: &str = "path";
    pub const METADATA: &str = "metadata";
    pub const SOURCE: &str = "source";
    pub const TRANSLATOR_NAME: &str = "translator-name";
    pub const JNDI_NAME: &str = "jndi-name";
    pub const VALIDATION_ERROR: &str = "validation-error";
    pub const SEVERITY: &str = "severity";

    pub const TRANSLATOR: &str = "translator";

    pub const DATA_ROLE: &str = "data-role";
    pub const ANY_AUTHENTICATED: &str = "any-authenticated";
    pub const ALLOW_CREATE_TEMP_TABLES: &str = "allow-create-temp-tables";
    pub const GRANT_ALL: &str = "grant-all";
    pub const PERMISSION: &str = "permission";
    pub const RESOURCE_NAME: &str = "resource-name";
    pub const ALLOW_CREATE: &str = "allow-create";
    pub const ALLOW_READ: &str = "allow-read";
    pub const ALLOW_UPDATE: &str = "allow-update";
    pub const ALLOW_DELETE: &str = "allow-delete";
    pub const ALLOW_EXECUTE: &str = "allow-execute";
    pub const ALLOW_ALTER: &str = "allow-alter";
    pub const ALLOW_LANGUAGE: &str = "allow-language";
    pub const CONDITION: &str = "condition";
    pub const CONSTRAINT: &str = "constraint";
    pub const MASK: &str = "mask";
    pub const ORDER: &str = "order";
    pub const MAPPED_ROLE_NAME: &str = "mapped-role-name";

    pub const ENTRY: &str = "entry";
}

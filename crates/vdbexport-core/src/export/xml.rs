// ABOUTME: Serializes a Manifest as a vdb.xml document in the fixed element order the importer expects.
// ABOUTME: Suppresses blank and defaulted fields and never writes an unset TriState flag.

use std::string::FromUtf8Error;

use quick_xml::Writer;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use thiserror::Error;

use crate::data_role::{DataRole, Permission};
use crate::lexicon::manifest as ids;
use crate::manifest::{Entry, ImportVdb, Manifest, Properties, Translator};
use crate::model::{Model, Source, ValidationMarker};
use crate::tristate::InvalidTriStateAccess;

/// Errors that abort serialization. A failed serialization yields no document.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("xml write failed: {0}")]
    Write(#[from] std::io::Error),

    #[error("xml writer error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error(transparent)]
    TriState(#[from] InvalidTriStateAccess),

    #[error("serialized manifest is not valid UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),
}

/// Serialize the manifest to a UTF-8 XML document with an XML declaration.
///
/// Element order is fixed: description, connection-type, properties,
/// import-vdbs, models, translators, data-roles, entries. Collections are
/// written in model order, never sorted here. The result is trimmed.
pub fn export_xml(manifest: &Manifest) -> Result<String, SerializeError> {
    let mut out = XmlOut::new();

    out.decl()?;
    let vdb = BytesStart::new(ids::VDB).with_attributes([
        (ids::NAME, manifest.name.as_str()),
        (ids::VERSION, manifest.version.to_string().as_str()),
    ]);

    if !vdb_has_content(manifest) {
        out.empty(vdb)?;
        return out.finish();
    }

    out.start(vdb)?;
    out.optional_text(ids::DESCRIPTION, &manifest.description)?;
    out.optional_text(ids::CONNECTION_TYPE, &manifest.connection_type)?;
    out.properties(&manifest.properties)?;

    for import in &manifest.import_vdbs {
        write_import_vdb(&mut out, import)?;
    }
    for model in &manifest.models {
        write_model(&mut out, model)?;
    }
    for translator in &manifest.translators {
        write_translator(&mut out, translator)?;
    }
    for data_role in &manifest.data_roles {
        write_data_role(&mut out, data_role)?;
    }
    for entry in &manifest.entries {
        write_entry(&mut out, entry)?;
    }

    out.end(ids::VDB)?;
    out.finish()
}

fn write_import_vdb(out: &mut XmlOut, import: &ImportVdb) -> Result<(), SerializeError> {
    let version = import.version.to_string();
    let element = BytesStart::new(ids::IMPORT_VDB).with_attributes([
        (ids::NAME, import.name.as_str()),
        (ids::VERSION, version.as_str()),
        (ids::IMPORT_DATA_POLICIES, bool_text(import.import_data_policies)),
    ]);
    out.empty(element)
}

fn write_model(out: &mut XmlOut, model: &Model) -> Result<(), SerializeError> {
    let mut element = BytesStart::new(ids::MODEL);
    element.push_attribute((ids::NAME, model.name.as_str()));
    if !model.has_default_type() {
        element.push_attribute((ids::TYPE, model.model_type.as_str()));
    }
    if model.visible != crate::model::DEFAULT_VISIBLE {
        element.push_attribute((ids::VISIBLE, bool_text(model.visible)));
    }
    if !is_blank(&model.path_in_vdb) {
        element.push_attribute((ids::PATH, model.path_in_vdb.as_str()));
    }

    let has_content = !is_blank(&model.description)
        || !model.properties.is_empty()
        || !is_blank(&model.model_definition)
        || !model.sources.is_empty()
        || !model.markers.is_empty();
    if !has_content {
        return out.empty(element);
    }

    out.start(element)?;
    out.optional_text(ids::DESCRIPTION, &model.description)?;
    out.properties(&model.properties)?;

    // Only one metadata block per model; the schema allows more.
    if !is_blank(&model.model_definition) {
        let mut metadata = BytesStart::new(ids::METADATA);
        if !is_blank(&model.metadata_type) {
            metadata.push_attribute((ids::TYPE, model.metadata_type.as_str()));
        }
        out.start(metadata)?;
        out.cdata(&model.model_definition)?;
        out.end(ids::METADATA)?;
    }

    for source in &model.sources {
        write_source(out, source)?;
    }
    for marker in &model.markers {
        write_marker(out, marker)?;
    }

    out.end(ids::MODEL)
}

fn write_source(out: &mut XmlOut, source: &Source) -> Result<(), SerializeError> {
    let mut element = BytesStart::new(ids::SOURCE).with_attributes([
        (ids::NAME, source.name.as_str()),
        (ids::TRANSLATOR_NAME, source.translator.as_str()),
    ]);
    if !is_blank(&source.jndi_name) {
        element.push_attribute((ids::JNDI_NAME, source.jndi_name.as_str()));
    }
    out.empty(element)
}

fn write_marker(out: &mut XmlOut, marker: &ValidationMarker) -> Result<(), SerializeError> {
    let mut element = BytesStart::new(ids::VALIDATION_ERROR);
    element.push_attribute((ids::SEVERITY, marker.severity.as_str()));
    if !is_blank(&marker.path) {
        element.push_attribute((ids::PATH, marker.path.as_str()));
    }
    out.text_element(element, ids::VALIDATION_ERROR, &marker.message)
}

fn write_translator(out: &mut XmlOut, translator: &Translator) -> Result<(), SerializeError> {
    let mut element = BytesStart::new(ids::TRANSLATOR).with_attributes([
        (ids::NAME, translator.name.as_str()),
        (ids::TYPE, translator.translator_type.as_str()),
    ]);
    if !is_blank(&translator.description) {
        element.push_attribute((ids::DESCRIPTION, translator.description.as_str()));
    }

    if translator.properties.is_empty() {
        return out.empty(element);
    }
    out.start(element)?;
    out.properties(&translator.properties)?;
    out.end(ids::TRANSLATOR)
}

fn write_data_role(out: &mut XmlOut, data_role: &DataRole) -> Result<(), SerializeError> {
    let element = BytesStart::new(ids::DATA_ROLE).with_attributes([
        (ids::NAME, data_role.name.as_str()),
        (ids::ANY_AUTHENTICATED, bool_text(data_role.any_authenticated)),
        (
            ids::ALLOW_CREATE_TEMP_TABLES,
            bool_text(data_role.allow_create_temp_tables),
        ),
        (ids::GRANT_ALL, bool_text(data_role.grant_all)),
    ]);

    let has_content = !is_blank(&data_role.description)
        || !data_role.permissions.is_empty()
        || data_role.mapped_role_names.iter().any(|role| !is_blank(role));
    if !has_content {
        return out.empty(element);
    }

    out.start(element)?;
    out.optional_text(ids::DESCRIPTION, &data_role.description)?;
    for permission in &data_role.permissions {
        write_permission(out, permission)?;
    }
    for role in &data_role.mapped_role_names {
        out.optional_text(ids::MAPPED_ROLE_NAME, role)?;
    }
    out.end(ids::DATA_ROLE)
}

fn write_permission(out: &mut XmlOut, permission: &Permission) -> Result<(), SerializeError> {
    out.start(BytesStart::new(ids::PERMISSION))?;
    out.text_element(
        BytesStart::new(ids::RESOURCE_NAME),
        ids::RESOURCE_NAME,
        &permission.resource_name,
    )?;

    for (name, flag) in permission.flags() {
        if flag.is_unset() {
            continue;
        }
        let text = bool_text(flag.boolean_value()?);
        out.text_element(BytesStart::new(name), name, text)?;
    }

    for condition in &permission.conditions {
        let element = BytesStart::new(ids::CONDITION)
            .with_attributes([(ids::CONSTRAINT, bool_text(condition.constraint))]);
        out.text_element(element, ids::CONDITION, &condition.rule)?;
    }
    for mask in &permission.masks {
        let order = mask.order.to_string();
        let element =
            BytesStart::new(ids::MASK).with_attributes([(ids::ORDER, order.as_str())]);
        out.text_element(element, ids::MASK, &mask.rule)?;
    }

    out.end(ids::PERMISSION)
}

fn write_entry(out: &mut XmlOut, entry: &Entry) -> Result<(), SerializeError> {
    let element = BytesStart::new(ids::ENTRY).with_attributes([(ids::PATH, entry.path.as_str())]);
    if is_blank(&entry.description) && entry.properties.is_empty() {
        return out.empty(element);
    }
    out.start(element)?;
    out.optional_text(ids::DESCRIPTION, &entry.description)?;
    out.properties(&entry.properties)?;
    out.end(ids::ENTRY)
}

fn vdb_has_content(manifest: &Manifest) -> bool {
    !is_blank(&manifest.description)
        || !is_blank(&manifest.connection_type)
        || !manifest.properties.is_empty()
        || !manifest.import_vdbs.is_empty()
        || !manifest.models.is_empty()
        || !manifest.translators.is_empty()
        || !manifest.data_roles.is_empty()
        || !manifest.entries.is_empty()
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

fn bool_text(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

/// Split text into pieces that can each sit inside one CDATA section.
/// A `]]>` is broken between `]]` and `>`.
fn cdata_sections(text: &str) -> Vec<&str> {
    let mut sections = Vec::new();
    let mut rest = text;
    while let Some(idx) = rest.find("]]>") {
        sections.push(&rest[..idx + 2]);
        rest = &rest[idx + 2..];
    }
    sections.push(rest);
    sections
}

/// Thin wrapper over the quick-xml writer with the few shapes the manifest uses.
struct XmlOut {
    writer: Writer<Vec<u8>>,
}

impl XmlOut {
    fn new() -> Self {
        Self {
            writer: Writer::new(Vec::new()),
        }
    }

    fn decl(&mut self) -> Result<(), SerializeError> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        Ok(())
    }

    fn start(&mut self, element: BytesStart<'_>) -> Result<(), SerializeError> {
        self.writer.write_event(Event::Start(element))?;
        Ok(())
    }

    fn end(&mut self, name: &str) -> Result<(), SerializeError> {
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    fn empty(&mut self, element: BytesStart<'_>) -> Result<(), SerializeError> {
        self.writer.write_event(Event::Empty(element))?;
        Ok(())
    }

    /// `<name attrs>text</name>`, with text escaped.
    fn text_element(
        &mut self,
        element: BytesStart<'_>,
        name: &str,
        text: &str,
    ) -> Result<(), SerializeError> {
        self.start(element)?;
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        self.end(name)
    }

    /// A child element holding `text`, skipped when the text is blank.
    fn optional_text(&mut self, name: &str, text: &str) -> Result<(), SerializeError> {
        if is_blank(text) {
            return Ok(());
        }
        self.text_element(BytesStart::new(name), name, text)
    }

    fn cdata(&mut self, text: &str) -> Result<(), SerializeError> {
        for section in cdata_sections(text) {
            self.writer.write_event(Event::CData(BytesCData::new(section)))?;
        }
        Ok(())
    }

    fn properties(&mut self, properties: &Properties) -> Result<(), SerializeError> {
        for (name, value) in properties {
            let element = BytesStart::new(ids::PROPERTY)
                .with_attributes([(ids::NAME, name.as_str()), (ids::VALUE, value.as_str())]);
            self.empty(element)?;
        }
        Ok(())
    }

    fn finish(self) -> Result<String, SerializeError> {
        let xml = String::from_utf8(self.writer.into_inner())?;
        Ok(xml.trim().to_string())
    }
}

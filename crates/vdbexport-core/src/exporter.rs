// ABOUTME: VdbExporter runs one export: build the manifest, serialize it, and optionally pretty-print.
// ABOUTME: Every failure surfaces as a single ExportError naming the VDB and carrying the cause.

use thiserror::Error;

use crate::builder::{BuildError, ManifestBuilder};
use crate::config::ExportOptions;
use crate::export::{FormatError, IndentFormatter, SerializeError, XmlFormatter, export_xml};
use crate::manifest::Manifest;
use crate::tree::{NodeRef, PropertyFilter, TreeSession};

/// The outcome error of one export call.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to build manifest for {vdb}: {source}")]
    Build {
        vdb: String,
        #[source]
        source: BuildError,
    },

    #[error("failed to serialize manifest for {vdb}: {source}")]
    Serialize {
        vdb: String,
        #[source]
        source: SerializeError,
    },

    #[error("failed to pretty-print manifest for {vdb}: {source}")]
    Format {
        vdb: String,
        #[source]
        source: FormatError,
    },
}

/// Exports VDB nodes as vdb.xml documents. Holds no per-export state, so a
/// single exporter can serve concurrent exports over separate sessions.
pub struct VdbExporter {
    options: ExportOptions,
    filter: Box<dyn PropertyFilter>,
    formatter: Box<dyn XmlFormatter>,
}

impl VdbExporter {
    /// An exporter using the options' prefix filter and the indenting formatter.
    pub fn new(options: ExportOptions) -> Self {
        let filter = Box::new(options.property_filter());
        Self {
            options,
            filter,
            formatter: Box::new(IndentFormatter),
        }
    }

    pub fn with_filter(mut self, filter: impl PropertyFilter + 'static) -> Self {
        self.filter = Box::new(filter);
        self
    }

    pub fn with_formatter(mut self, formatter: impl XmlFormatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Read the VDB at `vdb` into a manifest, sorting data roles if configured.
    pub fn build_manifest<S>(&self, session: &S, vdb: &NodeRef) -> Result<Manifest, ExportError>
    where
        S: TreeSession + ?Sized,
    {
        let builder = ManifestBuilder::new(session, self.filter.as_ref());
        let mut manifest = builder.build(vdb).map_err(|source| ExportError::Build {
            vdb: vdb.path.clone(),
            source,
        })?;
        if self.options.sort_data_roles {
            manifest.sort_data_roles();
        }
        Ok(manifest)
    }

    /// Export the VDB at `vdb` as XML text.
    pub fn export<S>(&self, session: &S, vdb: &NodeRef) -> Result<String, ExportError>
    where
        S: TreeSession + ?Sized,
    {
        let manifest = self.build_manifest(session, vdb)?;
        let xml = self.render(&manifest, &vdb.path)?;
        tracing::info!(
            "exported vdb {} from {} ({} models, {} data roles)",
            manifest.name,
            vdb.path,
            manifest.models.len(),
            manifest.data_roles.len()
        );
        Ok(xml)
    }

    /// Export a manifest the caller already holds.
    pub fn export_manifest(&self, manifest: &Manifest) -> Result<String, ExportError> {
        self.render(manifest, &manifest.name)
    }

    fn render(&self, manifest: &Manifest, vdb: &str) -> Result<String, ExportError> {
        let xml = export_xml(manifest).map_err(|source| ExportError::Serialize {
            vdb: vdb.to_string(),
            source,
        })?;
        tracing::debug!("vdb {} manifest:\n{}", vdb, xml);

        if !self.options.pretty_print {
            return Ok(xml);
        }
        self.formatter
            .format(&xml, &self.options)
            .map_err(|source| ExportError::Format {
                vdb: vdb.to_string(),
                source,
            })
    }
}

impl Default for VdbExporter {
    fn default() -> Self {
        Self::new(ExportOptions::default())
    }
}

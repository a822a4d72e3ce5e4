// ABOUTME: Core library for vdbexport: the canonical VDB manifest model and the export pipeline.
// ABOUTME: Tree session -> ManifestBuilder -> Manifest -> XML serializer -> optional pretty-printer.

pub mod builder;
pub mod config;
pub mod data_role;
pub mod export;
pub mod exporter;
pub mod lexicon;
pub mod manifest;
pub mod model;
pub mod tree;
pub mod tristate;

pub use builder::{BuildError, ManifestBuilder};
pub use config::{ConfigError, ExportOptions};
pub use data_role::{Condition, DataRole, Mask, Permission};
pub use export::{FormatError, IndentFormatter, SerializeError, XmlFormatter, export_xml};
pub use exporter::{ExportError, VdbExporter};
pub use manifest::{Entry, ImportVdb, Manifest, Properties, Translator};
pub use model::{Model, Severity, Source, ValidationMarker};
pub use tree::{NodeRef, PrefixFilter, PropertyFilter, PropertyValue, TreeError, TreeSession};
pub use tristate::{InvalidTriStateAccess, TriState};

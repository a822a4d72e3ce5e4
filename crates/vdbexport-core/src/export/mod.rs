// ABOUTME: Module root for manifest rendering: the vdb.xml serializer and the pretty-printer.
// ABOUTME: Re-exports the serializer entry point and formatter types for convenient access.

pub mod pretty;
pub mod xml;

pub use pretty::{FormatError, IndentFormatter, XmlFormatter};
pub use xml::{SerializeError, export_xml};

// ABOUTME: The pretty-printer collaborator: reformats a raw manifest document for human readers.
// ABOUTME: IndentFormatter re-reads the XML with quick-xml and re-emits it with indentation.

use std::string::FromUtf8Error;

use quick_xml::events::{BytesText, Event};
use quick_xml::{Reader, Writer};
use thiserror::Error;

use crate::config::ExportOptions;

/// Errors that can occur while pretty-printing.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("cannot parse document: {0}")]
    Parse(#[from] quick_xml::Error),

    #[error("cannot write document: {0}")]
    Write(#[from] std::io::Error),

    #[error("formatted document is not valid UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),
}

/// Turns raw XML text into its presentation form.
pub trait XmlFormatter: Send + Sync {
    fn format(&self, xml: &str, options: &ExportOptions) -> Result<String, FormatError>;
}

/// Indents each element on its own line by `options.indent` spaces.
/// Text and CDATA content is kept inline and byte for byte.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndentFormatter;

impl XmlFormatter for IndentFormatter {
    fn format(&self, xml: &str, options: &ExportOptions) -> Result<String, FormatError> {
        let mut reader = Reader::from_str(xml);
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', options.indent);

        // Whitespace-only text is held back until the next event shows
        // whether it is an element's whole content or padding between tags.
        let mut pending: Option<BytesText<'_>> = None;
        let mut after_start = false;

        loop {
            let event = reader.read_event()?;
            if let Some(text) = pending.take()
                && after_start
                && matches!(event, Event::End(_))
            {
                writer.write_event(Event::Text(text))?;
            }

            match event {
                Event::Eof => break,
                Event::Text(text) if is_whitespace(&text) => pending = Some(text),
                event => {
                    after_start = matches!(event, Event::Start(_));
                    writer.write_event(event)?;
                }
            }
        }

        let formatted = String::from_utf8(writer.into_inner())?;
        Ok(formatted.trim().to_string())
    }
}

fn is_whitespace(text: &BytesText<'_>) -> bool {
    text.iter().all(u8::is_ascii_whitespace)
}

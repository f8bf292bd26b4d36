//! Request document construction.
//!
//! Every request shares the same envelope: an XML declaration carrying
//! the `ISO-8859-1` encoding the webservice mandates, and a root element
//! named after the operation with an `id` attribute derived from the
//! current time plus the fixed protocol `versao`. Inside the envelope,
//! elements are emitted in the exact order given by the operation's
//! [`layout`](crate::layout) table. Values are written as-is; an absent
//! parameter becomes an empty element, never an omitted one.

use std::fmt::Display;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use time::OffsetDateTime;

use crate::config::Config;
use crate::error::{CieloError, Result};
use crate::layout::{Operation, Segment};
use crate::params::Parameters;

/// Protocol version carried in the root element's `versao` attribute.
pub(crate) const PROTOCOL_VERSION: &str = "1.1.0";

/// Charset declared on the outbound document. The webservice rejects
/// other declarations, so this must stay byte-for-byte stable.
pub(crate) const WIRE_ENCODING: &str = "ISO-8859-1";

fn xml_err(error: impl Display) -> CieloError {
    CieloError::Xml(error.to_string())
}

/// Incremental writer for one request document.
///
/// Wraps the event writer with the two shapes the protocol uses: named
/// groups of leaves, and bare leaves. No validation happens here —
/// parameter checking is done before building.
pub(crate) struct DocumentBuilder {
    writer: Writer<Vec<u8>>,
}

impl DocumentBuilder {
    fn open(root_tag: &str, id: &str) -> Result<Self> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some(WIRE_ENCODING), None)))
            .map_err(xml_err)?;

        let mut root = BytesStart::new(root_tag);
        root.push_attribute(("id", id));
        root.push_attribute(("versao", PROTOCOL_VERSION));
        writer.write_event(Event::Start(root)).map_err(xml_err)?;

        Ok(Self { writer })
    }

    /// Writes `<tag>` ... `</tag>` around the elements emitted by `emit`.
    pub(crate) fn group(
        &mut self,
        tag: &str,
        emit: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Result<()> {
        self.writer
            .write_event(Event::Start(BytesStart::new(tag)))
            .map_err(xml_err)?;
        emit(self)?;
        self.writer
            .write_event(Event::End(BytesEnd::new(tag)))
            .map_err(xml_err)
    }

    /// Writes a leaf element. An empty value still produces the element.
    pub(crate) fn element(&mut self, tag: &str, value: &str) -> Result<()> {
        self.writer
            .write_event(Event::Start(BytesStart::new(tag)))
            .map_err(xml_err)?;
        if !value.is_empty() {
            self.writer
                .write_event(Event::Text(BytesText::new(value)))
                .map_err(xml_err)?;
        }
        self.writer
            .write_event(Event::End(BytesEnd::new(tag)))
            .map_err(xml_err)
    }

    fn close(mut self, root_tag: &str) -> Result<String> {
        self.writer
            .write_event(Event::End(BytesEnd::new(root_tag)))
            .map_err(xml_err)?;
        String::from_utf8(self.writer.into_inner()).map_err(xml_err)
    }
}

/// Builds an enveloped document, deriving the envelope id from the
/// current time. Ids are not guaranteed unique; the webservice treats
/// them as opaque.
pub(crate) fn build_document(
    root_tag: &str,
    emit: impl FnOnce(&mut DocumentBuilder) -> Result<()>,
) -> Result<String> {
    let id = OffsetDateTime::now_utc().unix_timestamp().to_string();
    build_document_with_id(root_tag, &id, emit)
}

/// Builds an enveloped document with an explicit envelope id.
pub(crate) fn build_document_with_id(
    root_tag: &str,
    id: &str,
    emit: impl FnOnce(&mut DocumentBuilder) -> Result<()>,
) -> Result<String> {
    let mut builder = DocumentBuilder::open(root_tag, id)?;
    emit(&mut builder)?;
    builder.close(root_tag)
}

/// Renders the request document for `operation`, walking its layout.
pub(crate) fn render(
    operation: Operation,
    config: &Config,
    params: &Parameters,
) -> Result<String> {
    build_document(operation.root_tag(), |xml| {
        for segment in operation.layout() {
            match segment {
                Segment::Credentials => xml.group("dados-ec", |ec| {
                    ec.element("numero", &config.affiliation_number)?;
                    ec.element("chave", &config.access_key)
                })?,
                Segment::Group(tag, fields) => xml.group(tag, |group| {
                    for (element, source) in *fields {
                        group.element(element, params.get(source).unwrap_or_default())?;
                    }
                    Ok(())
                })?,
                Segment::Leaf(tag, source) => {
                    xml.element(tag, params.get(source).unwrap_or_default())?;
                }
            }
        }
        Ok(())
    })
}

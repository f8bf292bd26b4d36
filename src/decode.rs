//! Schema-less reply decoding.
//!
//! The webservice answers every request with an XML document whose shape
//! depends on the outcome (`transacao`, `retorno-tid`, `erro`, ...), and
//! replies have grown fields over protocol revisions. Instead of typed
//! response models, the decoder walks the reply generically and mirrors
//! it into a [`DecodedMap`]: element order is preserved, element names
//! become `snake_case` keys, and every node lands in exactly one of
//! three shapes.
//!
//! - text-only leaf → [`Value::Scalar`]
//! - attribute-bearing, childless element → [`Value::Attributed`]
//! - element with children → [`Value::Nested`] (its own text, if any,
//!   is discarded)
//!
//! Sibling elements sharing a name overwrite each other, last one wins.
//! That is intentional lossy behavior carried over from the protocol's
//! reference clients; callers relying on repeated elements would need a
//! schema, which the webservice does not publish.
//!
//! Transport failures are part of the decoding contract: a non-success
//! status, or a body that is not a well-formed document, decodes to the
//! fixed error map `{erro: {codigo: "000", mensagem: "Impossível
//! conectar ao servidor"}}` instead of raising. Callers branch on the
//! map's shape, never on a propagated error.

use encoding_rs::Encoding;
use indexmap::IndexMap;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::debug;

/// Order-preserving map of decoded reply elements.
pub type DecodedMap = IndexMap<String, Value>;

/// Error code used in the fixed connection-failure map.
const CANNOT_CONNECT_CODE: &str = "000";

/// Localized message used in the fixed connection-failure map. Kept
/// byte-for-byte identical to the protocol's reference clients.
const CANNOT_CONNECT_MESSAGE: &str = "Impossível conectar ao servidor";

/// One decoded reply node.
///
/// Serializes (via [`serde`]) the way dynamic clients of this protocol
/// represent replies: scalars as strings, attributed leaves as
/// `{"value": text}`, nested elements as objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A leaf element with neither children nor attributes; the text
    /// content, or an empty string.
    Scalar(String),
    /// A childless element carrying attributes; the text content, or an
    /// empty string.
    Attributed(String),
    /// An element with child elements.
    Nested(DecodedMap),
}

impl Value {
    /// Returns the text of a [`Scalar`](Self::Scalar) or
    /// [`Attributed`](Self::Attributed) leaf.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(text) | Self::Attributed(text) => Some(text),
            Self::Nested(_) => None,
        }
    }

    /// Looks up `key` in a [`Nested`](Self::Nested) value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Nested(children) => children.get(key),
            _ => None,
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Scalar(text) => serializer.serialize_str(text),
            Self::Attributed(text) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("value", text)?;
                map.end()
            }
            Self::Nested(children) => {
                let mut map = serializer.serialize_map(Some(children.len()))?;
                for (key, value) in children {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

/// Decodes a webservice reply.
///
/// `status` is the transport's HTTP status; anything outside `2xx`, and
/// any body that fails to parse, yields the fixed connection-failure
/// map. Otherwise the result mirrors the children of the reply's root
/// element.
///
/// ```
/// use cielo::decode::{Value, decode};
///
/// let body = br#"<?xml version="1.0" encoding="ISO-8859-1"?>
/// <transacao id="1" versao="1.1.0"><tid>42</tid><status>6</status></transacao>"#;
///
/// let reply = decode(200, body);
/// assert_eq!(reply.get("tid"), Some(&Value::Scalar("42".to_owned())));
/// assert_eq!(reply.get("status"), Some(&Value::Scalar("6".to_owned())));
/// ```
#[must_use]
pub fn decode(status: u16, body: &[u8]) -> DecodedMap {
    if !(200..300).contains(&status) {
        debug!(status, "non-success reply status");
        return connection_error();
    }

    match parse(body) {
        Some(map) => map,
        None => {
            debug!("reply body is not a well-formed document");
            connection_error()
        }
    }
}

/// The fixed map returned for any transport-level failure.
pub(crate) fn connection_error() -> DecodedMap {
    let mut erro = DecodedMap::new();
    erro.insert(
        "codigo".to_owned(),
        Value::Scalar(CANNOT_CONNECT_CODE.to_owned()),
    );
    erro.insert(
        "mensagem".to_owned(),
        Value::Scalar(CANNOT_CONNECT_MESSAGE.to_owned()),
    );

    let mut map = DecodedMap::new();
    map.insert("erro".to_owned(), Value::Nested(erro));
    map
}

/// Parses `body` and decodes the root's children. `None` means the body
/// is not a well-formed document.
fn parse(body: &[u8]) -> Option<DecodedMap> {
    let (text, _, _) = sniff_charset(body).decode(body);
    let mut reader = Reader::from_str(&text);

    loop {
        match reader.read_event().ok()? {
            Event::Start(_) => {
                let (map, _) = decode_level(&mut reader)?;
                return Some(map);
            }
            Event::Empty(_) => return Some(DecodedMap::new()),
            Event::Eof => return None,
            _ => {}
        }
    }
}

/// Decodes the siblings at one nesting level, consuming events up to
/// and including the parent's closing tag. Returns the decoded children
/// together with the level's accumulated text. `None` means the
/// document ended before the level was closed.
fn decode_level(reader: &mut Reader<&[u8]>) -> Option<(DecodedMap, String)> {
    let mut map = DecodedMap::new();
    let mut text = String::new();

    loop {
        match reader.read_event().ok()? {
            Event::Start(start) => {
                let key = element_key(&start);
                let attributed = start.attributes().next().is_some();
                let (children, inner_text) = decode_level(reader)?;
                map.insert(key, classify(children, inner_text, attributed));
            }
            Event::Empty(start) => {
                let key = element_key(&start);
                let attributed = start.attributes().next().is_some();
                map.insert(key, classify(DecodedMap::new(), String::new(), attributed));
            }
            Event::Text(event) => text.push_str(&event.unescape().ok()?),
            Event::CData(event) => text.push_str(&String::from_utf8_lossy(&event.into_inner())),
            Event::End(_) => return Some((map, text)),
            Event::Eof => return None,
            _ => {}
        }
    }
}

/// Applies the three-way node classification.
fn classify(children: DecodedMap, text: String, attributed: bool) -> Value {
    if !children.is_empty() {
        Value::Nested(children)
    } else if attributed {
        Value::Attributed(text)
    } else {
        Value::Scalar(text)
    }
}

/// Caller-facing key for an element: the tag name with hyphens folded
/// to underscores (`codigo-erro` → `codigo_erro`).
fn element_key(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.name().as_ref()).replace('-', "_")
}

/// Picks the charset for a reply body from its XML declaration.
///
/// The webservice declares `ISO-8859-1`; per the WHATWG registry that
/// label resolves to windows-1252. Undeclared bodies fall back to UTF-8.
fn sniff_charset(body: &[u8]) -> &'static Encoding {
    let prolog = String::from_utf8_lossy(&body[..body.len().min(256)]);
    let Some(declaration) = prolog.strip_prefix("<?xml") else {
        return encoding_rs::UTF_8;
    };
    let Some(end) = declaration.find("?>") else {
        return encoding_rs::UTF_8;
    };

    declaration[..end]
        .split_once("encoding")
        .and_then(|(_, rest)| rest.trim_start().strip_prefix('='))
        .and_then(|rest| {
            let rest = rest.trim_start();
            let quote = rest.chars().next().filter(|&c| c == '"' || c == '\'')?;
            let label = &rest[1..];
            let end = label.find(quote)?;
            Encoding::for_label(label[..end].as_bytes())
        })
        .unwrap_or(encoding_rs::UTF_8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(text: &str) -> Value {
        Value::Scalar(text.to_owned())
    }

    #[test]
    fn test_decode_three_node_shapes() {
        let body = br#"<root><a>1</a><b x="1">2</b><c><d>3</d></c></root>"#;
        let map = decode(200, body);

        assert_eq!(map.len(), 3);
        assert_eq!(map.get("a"), Some(&scalar("1")));
        assert_eq!(map.get("b"), Some(&Value::Attributed("2".to_owned())));

        let Some(Value::Nested(c)) = map.get("c") else {
            panic!("expected nested value for `c`");
        };
        assert_eq!(c.get("d"), Some(&scalar("3")));
    }

    #[test]
    fn test_decode_preserves_document_order() {
        let body = br#"<root><tid>1</tid><status>6</status><pan>abc</pan></root>"#;
        let map = decode(200, body);

        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, ["tid", "status", "pan"]);
    }

    #[test]
    fn test_duplicate_sibling_names_last_wins() {
        // Repeated names are overwritten in place rather than
        // accumulated; this behavior is relied upon downstream.
        let body = br#"<root><a>1</a><a>2</a></root>"#;
        let map = decode(200, body);

        assert_eq!(map.len(), 1);
        assert_eq!(map.get("a"), Some(&scalar("2")));
    }

    #[test]
    fn test_hyphenated_names_normalize_to_snake_case() {
        let body = br#"<root><codigo-erro>17</codigo-erro><url-retorno/></root>"#;
        let map = decode(200, body);

        assert_eq!(map.get("codigo_erro"), Some(&scalar("17")));
        assert_eq!(map.get("url_retorno"), Some(&scalar("")));
        assert!(!map.contains_key("codigo-erro"));
    }

    #[test]
    fn test_empty_and_self_closing_leaves_decode_to_empty_string() {
        let body = br#"<root><a></a><b/><c x="1"/></root>"#;
        let map = decode(200, body);

        assert_eq!(map.get("a"), Some(&scalar("")));
        assert_eq!(map.get("b"), Some(&scalar("")));
        assert_eq!(map.get("c"), Some(&Value::Attributed(String::new())));
    }

    #[test]
    fn test_text_around_children_is_discarded() {
        let body = br#"<root><a>ignored <b>kept</b> also ignored</a></root>"#;
        let map = decode(200, body);

        let Some(Value::Nested(a)) = map.get("a") else {
            panic!("expected nested value for `a`");
        };
        assert_eq!(a.get("b"), Some(&scalar("kept")));
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn test_attributes_on_parent_elements_are_ignored() {
        let body = br#"<root><a x="1"><b>2</b></a></root>"#;
        let map = decode(200, body);

        let Some(Value::Nested(a)) = map.get("a") else {
            panic!("expected nested value for `a`");
        };
        assert_eq!(a.get("b"), Some(&scalar("2")));
    }

    #[test]
    fn test_deep_nesting() {
        let body = br#"<root><a><b><c><d>deep</d></c></b></a></root>"#;
        let map = decode(200, body);

        let d = map
            .get("a")
            .and_then(|v| v.get("b"))
            .and_then(|v| v.get("c"))
            .and_then(|v| v.get("d"));
        assert_eq!(d, Some(&scalar("deep")));
    }

    #[test]
    fn test_cdata_counts_as_text() {
        let body = b"<root><a><![CDATA[x < y]]></a></root>";
        let map = decode(200, body);

        assert_eq!(map.get("a"), Some(&scalar("x < y")));
    }

    #[test]
    fn test_whitespace_between_elements_creates_no_entries() {
        let body = b"<root>\n  <a>1</a>\n  <b>2</b>\n</root>";
        let map = decode(200, body);

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("a"), Some(&scalar("1")));
    }

    #[test]
    fn test_latin1_body_decodes_declared_charset() {
        let mut body = Vec::new();
        body.extend_from_slice(b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>");
        body.extend_from_slice(b"<erro><codigo>001</codigo><mensagem>Mensagem inv\xE1lida</mensagem></erro>");

        let map = decode(200, &body);
        assert_eq!(map.get("mensagem"), Some(&scalar("Mensagem inválida")));
    }

    #[test]
    fn test_utf8_body_without_declaration() {
        let body = "<erro><mensagem>não autorizada</mensagem></erro>".as_bytes();
        let map = decode(200, body);

        assert_eq!(map.get("mensagem"), Some(&scalar("não autorizada")));
    }

    #[test]
    fn test_non_success_status_yields_connection_error() {
        for status in [301, 400, 404, 500, 503] {
            let map = decode(status, b"<transacao><tid>1</tid></transacao>");
            assert_eq!(map, connection_error(), "status {status}");
        }
    }

    #[test]
    fn test_unparseable_body_yields_connection_error() {
        for body in [
            &b""[..],
            b"not xml at all",
            b"{\"erro\": true}",
            b"<root><unclosed></root>",
            b"<root><truncated>",
        ] {
            assert_eq!(decode(200, body), connection_error());
        }
    }

    #[test]
    fn test_connection_error_shape() {
        let map = connection_error();
        let erro = map.get("erro").expect("erro entry");

        assert_eq!(erro.get("codigo").and_then(Value::as_str), Some("000"));
        assert_eq!(
            erro.get("mensagem").and_then(Value::as_str),
            Some("Impossível conectar ao servidor")
        );
    }

    #[test]
    fn test_childless_root_decodes_to_empty_map() {
        assert!(decode(200, b"<root/>").is_empty());
        assert!(decode(200, b"<root></root>").is_empty());
    }

    #[test]
    fn test_value_accessors() {
        let body = br#"<root><a>1</a><b x="1">2</b><c><d>3</d></c></root>"#;
        let map = decode(200, body);

        assert_eq!(map.get("a").and_then(Value::as_str), Some("1"));
        assert_eq!(map.get("b").and_then(Value::as_str), Some("2"));
        assert_eq!(map.get("c").and_then(Value::as_str), None);
        assert_eq!(
            map.get("c").and_then(|c| c.get("d")).and_then(Value::as_str),
            Some("3")
        );
        assert_eq!(map.get("a").and_then(|a| a.get("d")), None);
    }

    #[test]
    fn test_values_serialize_like_dynamic_clients() {
        let body = br#"<root><a>1</a><b x="1">2</b><c><d>3</d></c></root>"#;
        let map = decode(200, body);

        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "a": "1",
                "b": {"value": "2"},
                "c": {"d": "3"},
            })
        );
    }

    #[test]
    fn test_sniff_charset_variants() {
        assert_eq!(
            sniff_charset(b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><a/>"),
            encoding_rs::WINDOWS_1252
        );
        assert_eq!(
            sniff_charset(b"<?xml version='1.0' encoding='utf-8'?><a/>"),
            encoding_rs::UTF_8
        );
        assert_eq!(sniff_charset(b"<a/>"), encoding_rs::UTF_8);
        assert_eq!(
            sniff_charset(b"<?xml version=\"1.0\"?><a encoding=\"ISO-8859-1\"/>"),
            encoding_rs::UTF_8
        );
    }
}

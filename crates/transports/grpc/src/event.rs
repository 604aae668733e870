//! CloudEvent construction and rendering
//!
//! Events are built once through [`EventBuilder`] and never mutated
//! afterwards. [`ShortDebug`] renders an event as single-line protobuf text,
//! which is what ends up in the client's log lines.

use crate::generated::v1::cloud_event::{
    cloud_event_attribute_value::Attr, CloudEventAttributeValue, Data,
};
use crate::generated::v1::CloudEvent;
use crate::{Error, Result};
use std::collections::HashMap;
use std::fmt::{self, Write as _};

/// `type` of the event sent by the client
pub const GREETING_TYPE: &str = "io.cloudevents.example.client.RequestSent";

/// `source` of the event sent by the client
pub const GREETING_SOURCE: &str = "io.cloudevents.example.client";

/// Spec version stamped on the greeting
pub const GREETING_SPEC_VERSION: &str = "1.0.0";

/// Attribute names carried in dedicated fields; they never go in `attributes`
const RESERVED_ATTRIBUTES: &[&str] = &["id", "source", "specversion", "type", "data"];

/// The request the client sends on `Hello`
pub fn greeting_event() -> CloudEvent {
    CloudEvent {
        id: "1".to_string(),
        source: GREETING_SOURCE.to_string(),
        spec_version: GREETING_SPEC_VERSION.to_string(),
        r#type: GREETING_TYPE.to_string(),
        attributes: HashMap::new(),
        data: Some(Data::TextData("ping".to_string())),
    }
}

/// Value of an optional or extension attribute
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Boolean(bool),
    Integer(i32),
    String(String),
    Bytes(Vec<u8>),
    Uri(String),
    UriRef(String),
    Timestamp(prost_types::Timestamp),
}

impl AttributeValue {
    fn into_proto(self) -> CloudEventAttributeValue {
        let attr = match self {
            AttributeValue::Boolean(v) => Attr::CeBoolean(v),
            AttributeValue::Integer(v) => Attr::CeInteger(v),
            AttributeValue::String(v) => Attr::CeString(v),
            AttributeValue::Bytes(v) => Attr::CeBytes(v),
            AttributeValue::Uri(v) => Attr::CeUri(v),
            AttributeValue::UriRef(v) => Attr::CeUriRef(v),
            AttributeValue::Timestamp(v) => Attr::CeTimestamp(v),
        };
        CloudEventAttributeValue { attr: Some(attr) }
    }

    fn from_proto(value: &CloudEventAttributeValue) -> Option<Self> {
        Some(match value.attr.as_ref()? {
            Attr::CeBoolean(v) => AttributeValue::Boolean(*v),
            Attr::CeInteger(v) => AttributeValue::Integer(*v),
            Attr::CeString(v) => AttributeValue::String(v.clone()),
            Attr::CeBytes(v) => AttributeValue::Bytes(v.clone()),
            Attr::CeUri(v) => AttributeValue::Uri(v.clone()),
            Attr::CeUriRef(v) => AttributeValue::UriRef(v.clone()),
            Attr::CeTimestamp(v) => AttributeValue::Timestamp(v.clone()),
        })
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        AttributeValue::Boolean(v)
    }
}

impl From<i32> for AttributeValue {
    fn from(v: i32) -> Self {
        AttributeValue::Integer(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::String(v.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        AttributeValue::String(v)
    }
}

impl From<Vec<u8>> for AttributeValue {
    fn from(v: Vec<u8>) -> Self {
        AttributeValue::Bytes(v)
    }
}

impl From<prost_types::Timestamp> for AttributeValue {
    fn from(v: prost_types::Timestamp) -> Self {
        AttributeValue::Timestamp(v)
    }
}

/// Builder for an immutable [`CloudEvent`]
///
/// ```
/// use cloudevents_grpc::EventBuilder;
///
/// let event = EventBuilder::new()
///     .id("42")
///     .source("urn:example:sensor")
///     .spec_version("1.0")
///     .event_type("com.example.reading")
///     .extension("partition", 3)
///     .text_data("21.5")
///     .build()
///     .unwrap();
///
/// assert_eq!(event.text_data(), Some("21.5"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct EventBuilder {
    id: String,
    source: String,
    spec_version: String,
    event_type: String,
    extensions: Vec<(String, AttributeValue)>,
    data: Option<Data>,
}

impl EventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn spec_version(mut self, spec_version: impl Into<String>) -> Self {
        self.spec_version = spec_version.into();
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    /// Set an optional or extension attribute; a repeated name replaces the earlier value
    pub fn extension(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.extensions.push((name.into(), value.into()));
        self
    }

    /// Payload as text; replaces any payload set earlier
    pub fn text_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(Data::TextData(data.into()));
        self
    }

    /// Payload as raw bytes; replaces any payload set earlier
    pub fn binary_data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.data = Some(Data::BinaryData(data.into()));
        self
    }

    /// Payload as a packed protobuf message; replaces any payload set earlier
    pub fn proto_data(mut self, data: prost_types::Any) -> Self {
        self.data = Some(Data::ProtoData(data));
        self
    }

    /// Validate and produce the event
    ///
    /// Fails if a required attribute is empty or an extension name is not
    /// a legal CloudEvents attribute name.
    pub fn build(self) -> Result<CloudEvent> {
        for (name, value) in [
            ("id", &self.id),
            ("source", &self.source),
            ("specversion", &self.spec_version),
            ("type", &self.event_type),
        ] {
            if value.is_empty() {
                return Err(Error::InvalidEvent(format!(
                    "required attribute '{}' is empty",
                    name
                )));
            }
        }

        let mut attributes = HashMap::with_capacity(self.extensions.len());
        for (name, value) in self.extensions {
            validate_attribute_name(&name)?;
            attributes.insert(name, value.into_proto());
        }

        Ok(CloudEvent {
            id: self.id,
            source: self.source,
            spec_version: self.spec_version,
            r#type: self.event_type,
            attributes,
            data: self.data,
        })
    }
}

fn validate_attribute_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidEvent(
            "attribute name cannot be empty".to_string(),
        ));
    }
    if !name
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
    {
        return Err(Error::InvalidEvent(format!(
            "attribute name '{}' must be lowercase letters and digits only",
            name
        )));
    }
    if RESERVED_ATTRIBUTES.contains(&name) {
        return Err(Error::InvalidEvent(format!(
            "attribute name '{}' is reserved",
            name
        )));
    }
    Ok(())
}

impl CloudEvent {
    /// Start building a new event
    pub fn builder() -> EventBuilder {
        EventBuilder::new()
    }

    /// Text payload, if the event carries one
    pub fn text_data(&self) -> Option<&str> {
        match &self.data {
            Some(Data::TextData(text)) => Some(text),
            _ => None,
        }
    }

    /// Look up an optional or extension attribute
    pub fn attribute(&self, name: &str) -> Option<AttributeValue> {
        self.attributes.get(name).and_then(AttributeValue::from_proto)
    }

    /// Single-line protobuf text rendering, for logs
    pub fn short_debug(&self) -> ShortDebug<'_> {
        ShortDebug(self)
    }
}

/// Single-line protobuf text format rendering of a [`CloudEvent`]
///
/// Fields appear in field-number order and unset scalars are omitted.
/// Attribute map entries are sorted by key so the output is stable.
pub struct ShortDebug<'a>(pub &'a CloudEvent);

impl fmt::Display for ShortDebug<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let event = self.0;
        let mut out = TextWriter { f, started: false };

        out.string("id", &event.id)?;
        out.string("source", &event.source)?;
        out.string("spec_version", &event.spec_version)?;
        out.string("type", &event.r#type)?;

        let mut keys: Vec<&String> = event.attributes.keys().collect();
        keys.sort();
        for key in keys {
            out.open("attributes")?;
            out.quoted("key", key.as_bytes())?;
            out.open("value")?;
            if let Some(attr) = &event.attributes[key].attr {
                write_attr(&mut out, attr)?;
            }
            out.close()?;
            out.close()?;
        }

        match &event.data {
            Some(Data::BinaryData(bytes)) => out.quoted("binary_data", bytes)?,
            Some(Data::TextData(text)) => out.quoted("text_data", text.as_bytes())?,
            Some(Data::ProtoData(any)) => {
                out.open("proto_data")?;
                out.string("type_url", &any.type_url)?;
                if !any.value.is_empty() {
                    out.quoted("value", &any.value)?;
                }
                out.close()?;
            }
            None => {}
        }

        Ok(())
    }
}

impl fmt::Debug for ShortDebug<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

fn write_attr(out: &mut TextWriter<'_, '_>, attr: &Attr) -> fmt::Result {
    // Oneof members are printed even when they hold the default value
    match attr {
        Attr::CeBoolean(v) => out.scalar("ce_boolean", v),
        Attr::CeInteger(v) => out.scalar("ce_integer", v),
        Attr::CeString(v) => out.quoted("ce_string", v.as_bytes()),
        Attr::CeBytes(v) => out.quoted("ce_bytes", v),
        Attr::CeUri(v) => out.quoted("ce_uri", v.as_bytes()),
        Attr::CeUriRef(v) => out.quoted("ce_uri_ref", v.as_bytes()),
        Attr::CeTimestamp(ts) => {
            out.open("ce_timestamp")?;
            if ts.seconds != 0 {
                out.scalar("seconds", ts.seconds)?;
            }
            if ts.nanos != 0 {
                out.scalar("nanos", ts.nanos)?;
            }
            out.close()
        }
    }
}

struct TextWriter<'a, 'b> {
    f: &'a mut fmt::Formatter<'b>,
    started: bool,
}

impl TextWriter<'_, '_> {
    fn sep(&mut self) -> fmt::Result {
        if self.started {
            self.f.write_char(' ')?;
        }
        self.started = true;
        Ok(())
    }

    fn scalar(&mut self, name: &str, value: impl fmt::Display) -> fmt::Result {
        self.sep()?;
        write!(self.f, "{}: {}", name, value)
    }

    /// Singular proto3 string: omitted when empty
    fn string(&mut self, name: &str, value: &str) -> fmt::Result {
        if value.is_empty() {
            return Ok(());
        }
        self.quoted(name, value.as_bytes())
    }

    fn quoted(&mut self, name: &str, bytes: &[u8]) -> fmt::Result {
        self.sep()?;
        write!(self.f, "{}: \"", name)?;
        escape_bytes(self.f, bytes)?;
        self.f.write_char('"')
    }

    fn open(&mut self, name: &str) -> fmt::Result {
        self.sep()?;
        write!(self.f, "{} {{", name)
    }

    fn close(&mut self) -> fmt::Result {
        self.sep()?;
        self.f.write_char('}')
    }
}

/// C-style escaping as used by protobuf text format
fn escape_bytes(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    for &b in bytes {
        match b {
            0x07 => f.write_str("\\a")?,
            0x08 => f.write_str("\\b")?,
            0x0c => f.write_str("\\f")?,
            b'\n' => f.write_str("\\n")?,
            b'\r' => f.write_str("\\r")?,
            b'\t' => f.write_str("\\t")?,
            0x0b => f.write_str("\\v")?,
            b'\\' => f.write_str("\\\\")?,
            b'\'' => f.write_str("\\'")?,
            b'"' => f.write_str("\\\"")?,
            0x20..=0x7e => f.write_char(b as char)?,
            _ => write!(f, "\\{:03o}", b)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> EventBuilder {
        EventBuilder::new()
            .id("7")
            .source("urn:test")
            .spec_version("1.0")
            .event_type("com.example.test")
    }

    #[test]
    fn test_greeting_event() {
        let event = greeting_event();
        assert_eq!(event.id, "1");
        assert_eq!(event.source, GREETING_SOURCE);
        assert_eq!(event.spec_version, "1.0.0");
        assert_eq!(event.r#type, GREETING_TYPE);
        assert_eq!(event.text_data(), Some("ping"));
        assert!(event.attributes.is_empty());
    }

    #[test]
    fn test_builder_matches_greeting() {
        let built = EventBuilder::new()
            .id("1")
            .source(GREETING_SOURCE)
            .spec_version(GREETING_SPEC_VERSION)
            .event_type(GREETING_TYPE)
            .text_data("ping")
            .build()
            .unwrap();

        assert_eq!(built, greeting_event());
    }

    #[test]
    fn test_builder_requires_attributes() {
        let err = EventBuilder::new()
            .id("1")
            .source("urn:test")
            .event_type("t")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("specversion"));

        let err = EventBuilder::new().build().unwrap_err();
        assert!(matches!(err, Error::InvalidEvent(_)));
    }

    #[test]
    fn test_extension_names() {
        assert!(minimal().extension("traceparent2", "x").build().is_ok());

        for bad in ["", "TraceParent", "trace-parent", "type", "data"] {
            let result = minimal().extension(bad, true).build();
            assert!(result.is_err(), "'{}' should be rejected", bad);
        }
    }

    #[test]
    fn test_extension_values() {
        let ts = prost_types::Timestamp {
            seconds: 1_700_000_000,
            nanos: 5,
        };
        let event = minimal()
            .extension("flag", true)
            .extension("count", 3)
            .extension("count", 4)
            .extension("raw", vec![1u8, 2])
            .extension("time", ts.clone())
            .build()
            .unwrap();

        assert_eq!(event.attribute("flag"), Some(AttributeValue::Boolean(true)));
        assert_eq!(event.attribute("count"), Some(AttributeValue::Integer(4)));
        assert_eq!(event.attribute("raw"), Some(AttributeValue::Bytes(vec![1, 2])));
        assert_eq!(event.attribute("time"), Some(AttributeValue::Timestamp(ts)));
        assert_eq!(event.attribute("missing"), None);
    }

    #[test]
    fn test_payload_replaced() {
        let event = minimal()
            .text_data("first")
            .binary_data(vec![0xffu8])
            .build()
            .unwrap();
        assert_eq!(event.text_data(), None);
        assert_eq!(event.data, Some(Data::BinaryData(vec![0xff])));
    }

    #[test]
    fn test_short_debug_greeting() {
        assert_eq!(
            greeting_event().short_debug().to_string(),
            "id: \"1\" source: \"io.cloudevents.example.client\" spec_version: \"1.0.0\" \
             type: \"io.cloudevents.example.client.RequestSent\" text_data: \"ping\""
        );
    }

    #[test]
    fn test_short_debug_attributes_sorted() {
        let event = minimal()
            .extension("zeta", "last")
            .extension("alpha", false)
            .build()
            .unwrap();

        assert_eq!(
            event.short_debug().to_string(),
            "id: \"7\" source: \"urn:test\" spec_version: \"1.0\" type: \"com.example.test\" \
             attributes { key: \"alpha\" value { ce_boolean: false } } \
             attributes { key: \"zeta\" value { ce_string: \"last\" } }"
        );
    }

    #[test]
    fn test_short_debug_escaping() {
        let event = minimal()
            .binary_data(vec![b'"', b'\n', 0x00, 0xe9])
            .build()
            .unwrap();

        let rendered = event.short_debug().to_string();
        assert!(rendered.ends_with("binary_data: \"\\\"\\n\\000\\351\""));
    }

    #[test]
    fn test_short_debug_proto_data_and_timestamp() {
        let event = minimal()
            .extension("time", prost_types::Timestamp { seconds: 0, nanos: 9 })
            .proto_data(prost_types::Any {
                type_url: "type.googleapis.com/example.Ping".to_string(),
                value: vec![0x08, 0x01],
            })
            .build()
            .unwrap();

        let rendered = event.short_debug().to_string();
        assert!(rendered.contains("attributes { key: \"time\" value { ce_timestamp { nanos: 9 } } }"));
        assert!(rendered.ends_with(
            "proto_data { type_url: \"type.googleapis.com/example.Ping\" value: \"\\010\\001\" }"
        ));
    }

    #[test]
    fn test_short_debug_empty_event() {
        assert_eq!(CloudEvent::default().short_debug().to_string(), "");
    }
}

use super::Fields;
use crate::config::types::CodecKind;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

const JSON_PARSE_FAILURE: &str = "_jsonparsefailure";

/// Decodes raw message bytes into zero or more field sets.
pub trait Codec: Send + Sync {
    fn decode<'a>(&'a self, data: &'a [u8]) -> Box<dyn Iterator<Item = Fields> + 'a>;
}

pub fn codec_for(kind: CodecKind) -> Arc<dyn Codec> {
    match kind {
        CodecKind::Plain => Arc::new(PlainCodec),
        CodecKind::Json => Arc::new(JsonCodec),
        CodecKind::JsonLines => Arc::new(JsonLinesCodec),
    }
}

/// The whole message becomes the `message` field.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainCodec;

impl Codec for PlainCodec {
    fn decode<'a>(&'a self, data: &'a [u8]) -> Box<dyn Iterator<Item = Fields> + 'a> {
        Box::new(std::iter::once(message_fields(data)))
    }
}

/// The message is a single JSON object.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn decode<'a>(&'a self, data: &'a [u8]) -> Box<dyn Iterator<Item = Fields> + 'a> {
        Box::new(std::iter::once(parse_object(data)))
    }
}

/// One JSON object per non-empty line.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonLinesCodec;

impl Codec for JsonLinesCodec {
    fn decode<'a>(&'a self, data: &'a [u8]) -> Box<dyn Iterator<Item = Fields> + 'a> {
        Box::new(
            data.split(|b| *b == b'\n')
                .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
                .filter(|line| !line.iter().all(u8::is_ascii_whitespace))
                .map(parse_object),
        )
    }
}

fn message_fields(data: &[u8]) -> Fields {
    let mut fields = Fields::new();
    fields.insert(
        "message".to_string(),
        Value::String(String::from_utf8_lossy(data).into_owned()),
    );
    fields
}

fn parse_object(data: &[u8]) -> Fields {
    match serde_json::from_slice::<Value>(data) {
        Ok(Value::Object(map)) => map,
        Ok(_) | Err(_) => {
            debug!("Message is not a JSON object, keeping it as plain text");
            let mut fields = message_fields(data);
            fields.insert(
                "tags".to_string(),
                Value::Array(vec![Value::from(JSON_PARSE_FAILURE)]),
            );
            fields
        }
    }
}

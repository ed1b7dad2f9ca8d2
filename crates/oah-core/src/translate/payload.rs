//! Shaping sampled values into HAR `postData`.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::Value;

use super::style::leaf_string;
use crate::har::{NameValue, PostData};

pub const JSON: &str = "application/json";
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
pub const MULTIPART: &str = "multipart/form-data";

/// Request content types a payload is synthesized for, in record order.
pub const SUPPORTED_CONTENT_TYPES: [&str; 3] = [JSON, FORM_URLENCODED, MULTIPART];

/// Bytes left alone by `application/x-www-form-urlencoded`.
const FORM: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'*')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_');

/// Shape a sample for `mime_type`, one of [`SUPPORTED_CONTENT_TYPES`] or a
/// parameterized variant such as `application/json; charset=utf-8`.
/// Form encodings need an object sample; anything else yields `None`.
pub fn shape(mime_type: &str, sample: &Value) -> Option<PostData> {
    match essence(mime_type).as_str() {
        JSON => Some(json(mime_type, sample)),
        FORM_URLENCODED => object_fields(sample).map(|f| urlencoded(mime_type, f)),
        MULTIPART => object_fields(sample).map(|f| multipart(mime_type, f)),
        _ => None,
    }
}

/// The media type without parameters, lower-cased.
pub fn essence(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

pub fn json(mime_type: &str, sample: &Value) -> PostData {
    PostData {
        mime_type: mime_type.to_string(),
        text: Some(sample.to_string()),
        params: Vec::new(),
    }
}

pub fn urlencoded(mime_type: &str, fields: Vec<(String, String)>) -> PostData {
    let params: Vec<NameValue> = fields
        .into_iter()
        .map(|(name, value)| NameValue::new(form_encode(&name), form_encode(&value)))
        .collect();
    let text = params
        .iter()
        .map(|p| format!("{}={}", p.name, p.value))
        .collect::<Vec<_>>()
        .join("&");
    PostData {
        mime_type: mime_type.to_string(),
        text: Some(text),
        params,
    }
}

pub fn multipart(mime_type: &str, fields: Vec<(String, String)>) -> PostData {
    PostData {
        mime_type: mime_type.to_string(),
        text: None,
        params: fields
            .into_iter()
            .map(|(name, value)| NameValue::new(name, value))
            .collect(),
    }
}

fn object_fields(sample: &Value) -> Option<Vec<(String, String)>> {
    sample.as_object().map(|map| {
        map.iter()
            .map(|(k, v)| (k.clone(), leaf_string(v)))
            .collect()
    })
}

fn form_encode(input: &str) -> String {
    utf8_percent_encode(input, FORM)
        .to_string()
        .replace("%20", "+")
}

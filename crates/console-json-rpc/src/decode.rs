//! Request decoding: raw payload bytes to [`JsonRpcRequest`].
//!
//! Decoding is stateless; the same payload always yields the same request.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::bytes::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::DecodeError;
use crate::request::JsonRpcRequest;
use crate::types::RequestId;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16_LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16_BE_BOM: &[u8] = &[0xFE, 0xFF];

/// Text encodings recognised in a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadEncoding {
    Utf8,
    Utf8Bom,
    Utf16Le,
    Utf16Be,
    Latin1,
}

/// Guess the encoding of `raw` from its byte order mark, then from UTF-8 validity
pub fn detect_encoding(raw: &[u8]) -> PayloadEncoding {
    if raw.starts_with(UTF8_BOM) {
        PayloadEncoding::Utf8Bom
    } else if raw.starts_with(UTF16_LE_BOM) {
        PayloadEncoding::Utf16Le
    } else if raw.starts_with(UTF16_BE_BOM) {
        PayloadEncoding::Utf16Be
    } else if std::str::from_utf8(raw).is_ok() {
        PayloadEncoding::Utf8
    } else {
        PayloadEncoding::Latin1
    }
}

/// Bring `raw` into UTF-8.
///
/// When transcoding fails the original bytes are handed back untouched so the
/// JSON parser gets to report on them.
pub fn transcode(raw: &[u8]) -> Cow<'_, [u8]> {
    let encoding = detect_encoding(raw);
    let transcoded = match encoding {
        PayloadEncoding::Utf8 => return Cow::Borrowed(raw),
        PayloadEncoding::Utf8Bom => return Cow::Borrowed(&raw[UTF8_BOM.len()..]),
        PayloadEncoding::Utf16Le => decode_utf16(&raw[UTF16_LE_BOM.len()..], u16::from_le_bytes),
        PayloadEncoding::Utf16Be => decode_utf16(&raw[UTF16_BE_BOM.len()..], u16::from_be_bytes),
        PayloadEncoding::Latin1 => Some(raw.iter().map(|&b| char::from(b)).collect()),
    };

    match transcoded {
        Some(text) => {
            debug!("Transcoded {:?} payload to UTF-8", encoding);
            Cow::Owned(text.into_bytes())
        }
        None => {
            warn!("Failed to transcode {:?} payload, parsing raw bytes", encoding);
            Cow::Borrowed(raw)
        }
    }
}

fn utf16_units(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> impl Iterator<Item = u16> + '_ {
    bytes.chunks_exact(2).map(move |pair| unit([pair[0], pair[1]]))
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    char::decode_utf16(utf16_units(bytes, unit))
        .collect::<Result<String, _>>()
        .ok()
}

/// Like [`transcode`], but never gives up on UTF-16.
///
/// A trailing odd byte is dropped and unpaired surrogates become U+FFFD, so
/// the text around the damage can still be scanned.
fn transcode_lossy(raw: &[u8]) -> Cow<'_, [u8]> {
    let (body, unit): (&[u8], fn([u8; 2]) -> u16) = match detect_encoding(raw) {
        PayloadEncoding::Utf16Le => (&raw[UTF16_LE_BOM.len()..], u16::from_le_bytes),
        PayloadEncoding::Utf16Be => (&raw[UTF16_BE_BOM.len()..], u16::from_be_bytes),
        _ => return transcode(raw),
    };

    let text: String = char::decode_utf16(utf16_units(body, unit))
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect();
    Cow::Owned(text.into_bytes())
}

/// Decode a raw payload into a request.
///
/// Only an empty payload or a JSON syntax error fails; missing or odd fields
/// are left for the dispatcher to judge.
pub fn decode(raw: &[u8]) -> Result<JsonRpcRequest, DecodeError> {
    if raw.is_empty() {
        return Err(DecodeError::EmptyPayload);
    }

    let payload = transcode(raw);
    let value: Value = serde_json::from_slice(&payload)
        .map_err(|err| DecodeError::ParseError(err.to_string()))?;

    Ok(JsonRpcRequest::from_value(value))
}

fn id_pattern() -> Option<&'static Regex> {
    static ID_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    ID_PATTERN
        .get_or_init(|| Regex::new(r#"['"]id['"]\s*:\s*(-?[0-9]+)"#).ok())
        .as_ref()
}

/// Recover a request id from text that may not be valid JSON.
///
/// Returns the first integer following an `"id":` key, or `None` when there is
/// no such key or the number does not fit an `i64`. Truncated or corrupt
/// UTF-16 is decoded lossily before scanning.
pub fn extract_id(raw: &[u8]) -> Option<RequestId> {
    let payload = transcode_lossy(raw);
    let captures = id_pattern()?.captures(&payload)?;
    let digits = std::str::from_utf8(captures.get(1)?.as_bytes()).ok()?;
    digits.parse().ok()
}

//! Request body charset negotiation.
//!
//! Charsets are tried in a fixed order: the one declared in `Content-Type`,
//! the configured default, then UTF-8 and Latin-1. The first that decodes the
//! whole body without error wins.

use std::borrow::Cow;

use encoding_rs::Encoding;
use salvo::http::HeaderMap;
use salvo::http::header::CONTENT_TYPE;
use thiserror::Error;

use almanac_core::constants::FALLBACK_CHARSETS;

/// Text of a request body and the charset that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBody {
    pub text: String,
    pub charset: String,
}

/// Labels the encoding registry folds into windows-1252 but which name
/// ISO-8859-1 proper, where bytes 0x80-0x9F are the C1 controls.
const LATIN1_LABELS: [&str; 11] = [
    "cp819",
    "csisolatin1",
    "ibm819",
    "iso-8859-1",
    "iso-ir-100",
    "iso8859-1",
    "iso88591",
    "iso_8859-1",
    "iso_8859-1:1987",
    "l1",
    "latin1",
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Request body could not be decoded; tried {}", attempted.join(", "))]
    Undecodable { attempted: Vec<String> },
}

pub struct BodyDecoder {
    default_charset: String,
}

impl BodyDecoder {
    #[must_use]
    pub fn new(default_charset: impl Into<String>) -> Self {
        Self {
            default_charset: default_charset.into(),
        }
    }

    /// ## Summary
    /// Lists the charsets to try for a request, in order.
    #[must_use]
    pub fn candidates(&self, headers: &HeaderMap) -> Vec<String> {
        declared_charset(headers)
            .into_iter()
            .chain(std::iter::once(self.default_charset.clone()))
            .chain(FALLBACK_CHARSETS.iter().map(ToString::to_string))
            .collect()
    }

    /// ## Summary
    /// Decodes `bytes` using the charsets from [`BodyDecoder::candidates`].
    ///
    /// ## Errors
    /// Returns `Undecodable` listing every charset attempted if none succeeds.
    pub fn decode(&self, headers: &HeaderMap, bytes: &[u8]) -> Result<DecodedBody, DecodeError> {
        decode_with(&self.candidates(headers), bytes)
    }
}

/// ## Summary
/// Tries each charset label in order. Labels unknown to the encoding registry
/// count as failed attempts.
///
/// ## Errors
/// Returns `Undecodable` listing every label attempted if none succeeds.
pub fn decode_with(candidates: &[String], bytes: &[u8]) -> Result<DecodedBody, DecodeError> {
    let mut attempted = Vec::with_capacity(candidates.len());

    for label in candidates {
        attempted.push(label.clone());

        if let Some(text) = decode_one(label, bytes) {
            tracing::debug!(charset = %label, "Request body decoded");
            return Ok(DecodedBody {
                text: text.into_owned(),
                charset: label.clone(),
            });
        }
    }

    Err(DecodeError::Undecodable { attempted })
}

/// Strict decode of `bytes` in the charset named by `label`. ISO-8859-1
/// labels map every byte to the code point of the same value.
fn decode_one<'a>(label: &str, bytes: &'a [u8]) -> Option<Cow<'a, str>> {
    let label = label.trim();
    if LATIN1_LABELS.iter().any(|l| l.eq_ignore_ascii_case(label)) {
        return Some(encoding_rs::mem::decode_latin1(bytes));
    }

    let Some(encoding) = Encoding::for_label(label.as_bytes()) else {
        tracing::debug!(charset = %label, "Unknown charset label");
        return None;
    };

    let text = encoding.decode_without_bom_handling_and_without_replacement(bytes);
    if text.is_none() {
        tracing::debug!(charset = %label, encoding = encoding.name(), "Request body is not valid in charset");
    }
    text
}

/// `charset` parameter of the `Content-Type` header, unquoted.
fn declared_charset(headers: &HeaderMap) -> Option<String> {
    let content_type = headers.get(CONTENT_TYPE)?.to_str().ok()?;

    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"').to_string())
            .filter(|value| !value.is_empty())
    })
}

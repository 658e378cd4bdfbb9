//! Address normalization and per-service encoding
//!
//! All functions here are pure. The only side effect is a log line when an
//! encoding falls back to percent-encoding or a service id is unknown.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::EncodeResult;
use crate::registry::{EncodingScheme, ServiceRegistry};

/// Routing hint Rammerhead-style backends expect between the base URL and
/// the hex payload. Only emitted for the hex scheme.
pub const HEX_ROUTE_MARKER: &str = "hvtrs8%2F-";

const HTTP_PREFIX: &str = "http://";
const HTTPS_PREFIX: &str = "https://";

/// Characters left untouched by component encoding: alphanumerics plus
/// `- _ . ! ~ * ' ( )`
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Trim surrounding whitespace and make sure the address carries an
/// `http://` or `https://` prefix, adding `https://` when it does not.
///
/// No further validation happens; `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with(HTTP_PREFIX) || trimmed.starts_with(HTTPS_PREFIX) {
        trimmed.to_string()
    } else {
        format!("{}{}", HTTPS_PREFIX, trimmed)
    }
}

/// Encode a normalized address with the given scheme.
///
/// Base64 and hex work on single-byte characters only; anything above
/// U+00FF makes them fall back to percent-encoding of the whole address.
pub fn encode(normalized: &str, scheme: EncodingScheme) -> String {
    let encoded = match scheme {
        EncodingScheme::Base64 => encode_base64(normalized),
        EncodingScheme::Hex => encode_hex(normalized),
        EncodingScheme::Direct => Ok(percent_encode(normalized)),
    };

    encoded.unwrap_or_else(|err| {
        log::warn!("{}; falling back to percent-encoding", err);
        percent_encode(normalized)
    })
}

/// Build the final proxied address for `raw` routed through `service_id`.
///
/// An unknown service is logged and the normalized input is returned as-is.
pub fn format_for_service(registry: &ServiceRegistry, raw: &str, service_id: &str) -> String {
    try_format_for_service(registry, raw, service_id).unwrap_or_else(|err| {
        log::error!("{}", err);
        normalize(raw)
    })
}

/// Same as [`format_for_service`] but reports an unknown service to the caller.
pub fn try_format_for_service(
    registry: &ServiceRegistry,
    raw: &str,
    service_id: &str,
) -> EncodeResult<String> {
    let service = registry.require(service_id)?;
    let normalized = normalize(raw);
    let payload = encode(&normalized, service.encoding);

    let address = match service.encoding {
        EncodingScheme::Hex => format!("{}{}{}", service.base_url, HEX_ROUTE_MARKER, payload),
        EncodingScheme::Base64 | EncodingScheme::Direct => {
            format!("{}{}", service.base_url, payload)
        }
    };

    log::debug!("Formatted {} for {}: {}", normalized, service.id, address);
    Ok(address)
}

/// A character a byte-oriented scheme has no representation for. Never
/// leaves this module: [`encode`] recovers by percent-encoding instead.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{scheme} encoding cannot represent {character:?}")]
struct Unrepresentable {
    scheme: EncodingScheme,
    character: char,
}

fn encode_base64(normalized: &str) -> Result<String, Unrepresentable> {
    let bytes = latin1_bytes(normalized, EncodingScheme::Base64)?;
    Ok(STANDARD.encode(bytes))
}

fn encode_hex(normalized: &str) -> Result<String, Unrepresentable> {
    let stripped = normalized
        .strip_prefix(HTTPS_PREFIX)
        .or_else(|| normalized.strip_prefix(HTTP_PREFIX))
        .unwrap_or(normalized);

    let bytes = latin1_bytes(stripped, EncodingScheme::Hex)?;
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push_str(&format!("{:02x}", byte));
    }
    Ok(out)
}

fn percent_encode(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// One byte per character, failing on the first character outside Latin-1
fn latin1_bytes(value: &str, scheme: EncodingScheme) -> Result<Vec<u8>, Unrepresentable> {
    value
        .chars()
        .map(|character| {
            u8::try_from(u32::from(character))
                .map_err(|_| Unrepresentable { scheme, character })
        })
        .collect()
}

//! Subscription blob parsing.
//!
//! A subscription is a base64 document whose decoded body holds one proxy
//! descriptor URI per line. Only `vless://` descriptors on port 443 with a
//! remark starting with two letters (any script) become reverse-proxy entries:
//!
//! ```text
//! vless://<userinfo>@<host>:<port>[?<query>][#<percent-encoded-remark>]
//! ```

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use percent_encoding::percent_decode_str;
use tracing::debug;

use crate::error::ParseError;
use crate::model::{Category, Entry};
use crate::parser::collect_valid;
use crate::validation::is_valid_address;

const VLESS_SCHEME: &str = "vless://";

/// The only port whose nodes are surfaced, compared as written.
pub const ACCEPTED_PORT: &str = "443";

const LENIENT_CONFIG: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_decode_allow_trailing_bits(true)
    .with_decode_padding_mode(DecodePaddingMode::Indifferent);

const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT_CONFIG);
const LENIENT_URL_SAFE: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT_CONFIG);

/// Right-pad a base64 body with `=` until its length is a multiple of 4.
///
/// # Examples
/// ```
/// use ipharvest::subscription::repair_padding;
/// assert_eq!(repair_padding("YWJj"), "YWJj");
/// assert_eq!(repair_padding("YWI"), "YWI=");
/// assert_eq!(repair_padding("YQ"), "YQ==");
/// ```
pub fn repair_padding(body: &str) -> String {
    let mut repaired = body.to_string();
    let rem = repaired.len() % 4;
    if rem != 0 {
        repaired.push_str(&"=".repeat(4 - rem));
    }
    repaired
}

/// Decode a subscription blob to text.
///
/// Whitespace (line wrapping) is stripped and padding repaired before
/// decoding. Invalid UTF-8 sequences in the payload are dropped rather
/// than failing the whole blob.
pub fn decode_blob(blob: &str) -> Result<String, ParseError> {
    let cleaned: String = blob.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return Err(ParseError::Decode("empty blob".to_string()));
    }

    let repaired = repair_padding(&cleaned);
    let bytes = LENIENT_STANDARD
        .decode(&repaired)
        .or_else(|_| LENIENT_URL_SAFE.decode(&repaired))
        .map_err(|e| ParseError::Decode(e.to_string()))?;

    Ok(bytes.utf8_chunks().map(|chunk| chunk.valid()).collect())
}

/// Parse one decoded descriptor line into a reverse-proxy entry.
pub fn parse_node_line(line: &str) -> Result<Entry, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(ParseError::Blank);
    }
    let rest = line
        .strip_prefix(VLESS_SCHEME)
        .ok_or(ParseError::UnsupportedScheme)?;

    let (config, raw_remark) = rest.split_once('#').unwrap_or((rest, ""));
    let remark = percent_decode_str(raw_remark).decode_utf8_lossy();
    let remark = remark.trim();

    let (_user_info, host_info) = config
        .split_once('@')
        .ok_or(ParseError::MissingDelimiter('@'))?;
    let address_part = host_info
        .split(['?', '/'])
        .next()
        .unwrap_or_default();

    let (address, port) = split_host_port(address_part)
        .ok_or_else(|| ParseError::MissingPort(address_part.to_string()))?;

    if port != ACCEPTED_PORT {
        return Err(ParseError::PortRejected(port.to_string()));
    }

    let country_code = country_code(remark)
        .ok_or_else(|| ParseError::InvalidRemark(remark.to_string()))?;

    if !is_valid_address(address) {
        return Err(ParseError::InvalidAddress(address.to_string()));
    }

    Ok(Entry::new(address, Category::ProxyReverse).with_remark(country_code))
}

/// Parse a whole subscription blob.
///
/// Decode failure yields no entries; individual bad lines are skipped.
pub fn parse_subscription(blob: &str) -> Vec<Entry> {
    let text = match decode_blob(blob) {
        Ok(text) => text,
        Err(e) => {
            debug!("Subscription blob rejected: {}", e);
            return Vec::new();
        }
    };

    let nodes = text
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with(VLESS_SCHEME));
    collect_valid(nodes, parse_node_line)
}

/// Split `host:port`, honouring `[v6]:port` brackets.
fn split_host_port(address_part: &str) -> Option<(&str, &str)> {
    if let Some(bracketed) = address_part.strip_prefix('[') {
        let (host, after) = bracketed.split_once(']')?;
        let port = after.strip_prefix(':')?;
        return Some((host, port));
    }
    address_part.split_once(':')
}

/// Upper-cased first two characters of the remark, if both are letters.
///
/// Any script counts: `美国-01` yields `美国`.
fn country_code(remark: &str) -> Option<String> {
    let code: Vec<char> = remark.chars().take(2).collect();
    if code.len() == 2 && code.iter().all(|c| c.is_alphabetic()) {
        Some(code.iter().flat_map(|c| c.to_uppercase()).collect())
    } else {
        None
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use proptest::prelude::*;

    proptest! {
        /// Dropping any amount of padding never breaks decoding
        #[test]
        fn prop_padding_repair(payload in prop::collection::vec(any::<u8>(), 1..256)) {
            let padded = STANDARD.encode(&payload);
            let expected = String::from_utf8_lossy(&payload).replace('\u{FFFD}', "");
            let stripped = padded.trim_end_matches('=');
            let decoded = decode_blob(stripped);
            prop_assert!(decoded.is_ok());
            let decoded = decoded.unwrap();
            // lossy-then-strip and chunk-dropping agree whenever the payload has no U+FFFD itself
            if !payload.windows(3).any(|w| w == [0xEF, 0xBF, 0xBD]) {
                prop_assert_eq!(decoded, expected);
            }
        }

        /// Arbitrary blobs never panic
        #[test]
        fn prop_parse_subscription_total(blob in ".*") {
            let _ = parse_subscription(&blob);
        }

        /// Arbitrary node lines never panic
        #[test]
        fn prop_parse_node_line_total(line in "vless://.*") {
            let _ = parse_node_line(&line);
        }
    }
}

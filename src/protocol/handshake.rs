//! WebSocket handshake responses for both protocol families.
//!
//! The modern (Hybi) handshake proves key possession with
//! base64(SHA-1(key + GUID)); the legacy Hixie-76 handshake proves it with
//! an MD5 digest over numbers recovered from two obfuscated key headers
//! plus 8 raw bytes read from the transport. Raw HTTP parsing is out of
//! scope: the caller builds an [`UpgradeRequest`] from whatever HTTP layer
//! accepted the connection.

use std::collections::HashMap;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use md5::Md5;
use sha1::{Digest, Sha1};

use crate::protocol::Variant;

/// The WebSocket GUID used in the Sec-WebSocket-Accept calculation (RFC 6455).
pub const WS_GUID: &str = "258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

/// An already-parsed upgrade request, as handed over by the HTTP layer.
///
/// Header lookup is case-insensitive. Beyond headers, the request carries
/// the pieces of connection metadata the handshake needs: the request path,
/// the local port, and whether the transport is encrypted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeRequest {
    path: String,
    local_port: u16,
    secure: bool,
    headers: HashMap<String, String>,
}

impl UpgradeRequest {
    /// Create a request for the given path and connection metadata.
    #[must_use]
    pub fn new(path: impl Into<String>, local_port: u16, secure: bool) -> Self {
        Self {
            path: path.into(),
            local_port,
            secure,
            headers: HashMap::new(),
        }
    }

    /// Add a header (builder style). Names are stored lowercased.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_lowercase(), value.into());
        self
    }

    /// Look up a header value by name, case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    /// The request path (e.g. `/chat`).
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The local port the connection was accepted on.
    #[must_use]
    pub fn local_port(&self) -> u16 {
        self.local_port
    }

    /// Whether the transport is encrypted (selects `wss` vs `ws` in the
    /// legacy Location header).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// Check whether this request asks for a WebSocket upgrade.
    ///
    /// True iff an `Upgrade` header case-insensitively equals `WebSocket`
    /// and a `Connection` header case-insensitively equals `Upgrade`.
    /// Requests failing this check belong to other handlers.
    #[must_use]
    pub fn is_websocket_upgrade(&self) -> bool {
        let upgrade = self
            .header("upgrade")
            .is_some_and(|v| v.eq_ignore_ascii_case("websocket"));
        let connection = self
            .header("connection")
            .is_some_and(|v| v.eq_ignore_ascii_case("upgrade"));
        upgrade && connection
    }
}

/// Computes the Sec-WebSocket-Accept value from the client's Sec-WebSocket-Key.
///
/// The accept key is calculated as: Base64(SHA-1(key + GUID))
///
/// # Example
///
/// ```
/// use websock::protocol::handshake::compute_accept_key;
///
/// let key = "dGhlIHNhbXBsZSBub25jZQ==";
/// let accept = compute_accept_key(key);
/// assert_eq!(accept, "s3pPLMBiTxaQ9kYGzzhZRbK+xOo=");
/// ```
#[must_use]
pub fn compute_accept_key(key: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(key.as_bytes());
    hasher.update(WS_GUID.as_bytes());
    BASE64.encode(hasher.finalize())
}

/// Recover the 32-bit number hidden in a Hixie-76 key header.
///
/// All ASCII digits concatenate into a decimal number, which is divided by
/// the number of space characters. A key with no spaces yields 0 rather
/// than an error.
fn legacy_key_number(key: &str) -> u32 {
    let mut number: u64 = 0;
    let mut spaces: u64 = 0;
    for c in key.chars() {
        if let Some(digit) = c.to_digit(10) {
            number = number.wrapping_mul(10).wrapping_add(u64::from(digit));
        } else if c == ' ' {
            spaces += 1;
        }
    }
    if spaces == 0 {
        0
    } else {
        (number / spaces) as u32
    }
}

/// Compute the 16-byte Hixie-76 challenge response.
///
/// The digest is MD5 over the two recovered key numbers (4 bytes each,
/// big-endian) followed by the 8 raw bytes the client sent after its
/// headers.
#[must_use]
pub fn derive_legacy_digest(key1: &str, key2: &str, token: &[u8; 8]) -> [u8; 16] {
    let mut challenge = [0u8; 16];
    challenge[..4].copy_from_slice(&legacy_key_number(key1).to_be_bytes());
    challenge[4..8].copy_from_slice(&legacy_key_number(key2).to_be_bytes());
    challenge[8..].copy_from_slice(token);

    let mut hasher = Md5::new();
    hasher.update(challenge);
    hasher.finalize().into()
}

/// Serialize the 101 upgrade response for the resolved variant.
///
/// All variants get `Upgrade`/`Connection` headers. Hybi adds the accept
/// key; the legacy variants add an Origin/Location pair, under `Sec-`
/// prefixed names for Hixie-76. The Hixie-76 challenge body is not part of
/// the headers: it is computed and written separately once the 8-byte
/// token has been read.
#[must_use]
pub fn build_response(request: &UpgradeRequest, variant: Variant) -> Vec<u8> {
    let mut buf = Vec::with_capacity(256);
    buf.extend_from_slice(b"HTTP/1.1 101 Web Socket Protocol Handshake\r\n");
    buf.extend_from_slice(b"Upgrade: WebSocket\r\n");
    buf.extend_from_slice(b"Connection: Upgrade\r\n");

    match variant {
        Variant::Hybi { .. } => {
            let key = request.header("sec-websocket-key").unwrap_or_default();
            let accept = compute_accept_key(key);
            buf.extend_from_slice(format!("Sec-WebSocket-Accept: {accept}\r\n").as_bytes());
        }
        Variant::Hixie75 | Variant::Hixie76 => {
            let origin = match request.header("origin") {
                Some(origin) => origin.to_string(),
                None => format!("http://localhost:{}", request.local_port()),
            };
            let scheme = if request.is_secure() { "wss" } else { "ws" };
            let host = match request.header("host") {
                Some(host) => host.to_string(),
                None => format!("localhost:{}", request.local_port()),
            };
            let location = format!("{scheme}://{host}{}", request.path());

            let (origin_name, location_name) = if variant == Variant::Hixie76 {
                ("Sec-WebSocket-Origin", "Sec-WebSocket-Location")
            } else {
                ("WebSocket-Origin", "WebSocket-Location")
            };
            buf.extend_from_slice(format!("{origin_name}: {origin}\r\n").as_bytes());
            buf.extend_from_slice(format!("{location_name}: {location}\r\n").as_bytes());
        }
    }

    buf.extend_from_slice(b"\r\n");
    buf
}

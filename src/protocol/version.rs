//! Protocol variant resolution from handshake headers.

use crate::protocol::UpgradeRequest;

/// The protocol variant a session speaks.
///
/// Resolved once from the handshake headers and immutable for the
/// session's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Variant {
    /// Hixie draft 75: byte-prefixed text framing, no key proof.
    Hixie75,
    /// Hixie draft 76: byte-prefixed text framing with the MD5 challenge.
    Hixie76,
    /// Hybi drafts 08+ / RFC 6455: structured binary frames.
    ///
    /// The declared `Sec-WebSocket-Version` number is retained, but the
    /// frame format is unchanged from version 8 onward, so every Hybi
    /// version frames identically here.
    Hybi {
        /// The declared Sec-WebSocket-Version value (0 if absent or
        /// unparsable; resolution is best-effort and never fails).
        version: u8,
    },
}

impl Variant {
    /// Resolve the variant from the inbound handshake headers.
    ///
    /// A `Sec-WebSocket-Key` header selects the Hybi family. Without it,
    /// the presence of both `Sec-WebSocket-Key1` and `Sec-WebSocket-Key2`
    /// selects Hixie-76, and anything else falls back to Hixie-75. Callers
    /// needing strict validation must check headers before construction.
    #[must_use]
    pub fn resolve(request: &UpgradeRequest) -> Self {
        if request.header("sec-websocket-key").is_some() {
            let version = request
                .header("sec-websocket-version")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(0);
            Variant::Hybi { version }
        } else if request.header("sec-websocket-key1").is_some()
            && request.header("sec-websocket-key2").is_some()
        {
            Variant::Hixie76
        } else {
            Variant::Hixie75
        }
    }

    /// Check if this is one of the legacy Hixie variants.
    #[inline]
    #[must_use]
    pub const fn is_legacy(&self) -> bool {
        matches!(self, Variant::Hixie75 | Variant::Hixie76)
    }

    /// Check if this variant can carry binary messages.
    ///
    /// The Hixie data path is text-only.
    #[inline]
    #[must_use]
    pub const fn supports_binary(&self) -> bool {
        matches!(self, Variant::Hybi { .. })
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Variant::Hixie75 => write!(f, "Hixie-75"),
            Variant::Hixie76 => write!(f, "Hixie-76"),
            Variant::Hybi { version } => write!(f, "Hybi-{version}"),
        }
    }
}

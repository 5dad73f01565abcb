//! # websock - Dual-stack WebSocket session layer
//!
//! `websock` runs the WebSocket wire protocol over an already-accepted,
//! already-upgraded connection. It speaks both handshake families that were
//! deployed in the wild:
//!
//! - **Hixie drafts 75/76**: 0x00/0xFF byte-delimited text framing, with
//!   the draft-76 MD5 challenge proof
//! - **Hybi drafts 08+ (RFC 6455)**: structured binary frames with
//!   masking, fragmentation, and the SHA-1/base64 accept key
//!
//! The variant is resolved once from the handshake headers; the session
//! then drives the matching handshake and frame loop, reassembles
//! fragmented messages, answers pings, and reports lifecycle and message
//! events through a notification-sink trait.
//!
//! Out of scope by design: raw TCP/TLS transport (anything
//! `AsyncRead + AsyncWrite` works), raw HTTP parsing (the caller builds an
//! [`UpgradeRequest`]), extension and sub-protocol negotiation, UTF-8
//! validation, payloads beyond 32 bits, outgoing fragmentation and
//! masking, and the close-frame handshake (receipt of a close terminates
//! the connection immediately).
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use websock::{Session, UpgradeRequest};
//!
//! let request = UpgradeRequest::new(path, local_port, false)
//!     .with_header("Upgrade", "WebSocket")
//!     .with_header("Connection", "Upgrade")
//!     .with_header("Sec-WebSocket-Key", key)
//!     .with_header("Sec-WebSocket-Version", "13");
//!
//! if request.is_websocket_upgrade() {
//!     let session = Session::new(request, stream, Box::new(MyEvents));
//!     tokio::spawn(session.run());
//! }
//! ```

pub mod error;
pub mod protocol;
pub mod session;

pub use error::{Error, Result};
pub use protocol::{Decoded, Frame, OpCode, UpgradeRequest, Variant, WS_GUID, compute_accept_key};
pub use session::{NullEvents, SessionEvents, SessionId, SessionState};

#[cfg(feature = "async-tokio")]
pub use session::{Session, SessionHandle, WireCodec};

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn test_public_types_are_send() {
        assert_send::<Error>();
        assert_send::<Frame>();
        assert_send::<OpCode>();
        assert_send::<UpgradeRequest>();
        assert_send::<Variant>();
        assert_send::<SessionState>();
        assert_send::<SessionId>();
    }

    #[test]
    fn test_public_types_are_sync() {
        assert_sync::<Error>();
        assert_sync::<Frame>();
        assert_sync::<OpCode>();
        assert_sync::<UpgradeRequest>();
        assert_sync::<Variant>();
        assert_sync::<SessionState>();
        assert_sync::<SessionId>();
    }
}

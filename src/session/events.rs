//! Notification sink for session lifecycle and message events.

/// Receiver for a session's lifecycle and message notifications.
///
/// Every hook defaults to a no-op, so implementors override only what they
/// care about. Hooks run on the session's own task, serialized with all
/// other session activity, so implementations should not block.
pub trait SessionEvents: Send {
    /// The handshake completed and the session is open.
    fn on_open(&mut self) {}

    /// A complete text message arrived.
    fn on_text(&mut self, _text: String) {}

    /// A complete binary message arrived.
    fn on_binary(&mut self, _data: Vec<u8>) {}

    /// The transport disconnected. Fired exactly once per session.
    fn on_close(&mut self) {}
}

/// Sink for owners that only consume the close broadcast.
pub struct NullEvents;

impl SessionEvents for NullEvents {}

/// Identifier the owning server assigns to a session, echoed back on the
/// close broadcast channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub u64);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

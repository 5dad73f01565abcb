//! Per-connection session: handshake, frame loop, and dispatch.
//!
//! A [`Session`] is the serialization point for one connection. It owns the
//! borrowed transport for the session's duration and runs as a single task;
//! everything that touches session state (transport reads, sends, delegate
//! swaps) happens on that task. Public operations from other tasks go
//! through a [`SessionHandle`], which marshals them over a channel and
//! returns immediately (sends are fire-and-forget).
//!
//! There are no timeouts anywhere on the data path: a stalled peer simply
//! never completes a frame. The only cancellation is transport disconnect,
//! which funnels every state into `Closed`.

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::protocol::frame::Decoded;
use crate::protocol::{MessageAssembler, OpCode, UpgradeRequest, Variant, handshake};
use crate::session::codec::WireCodec;
use crate::session::events::{SessionEvents, SessionId};
use crate::session::state::SessionState;

enum Command {
    SendText(String),
    SendBinary(Vec<u8>),
    SendFrame { opcode: OpCode, payload: Vec<u8> },
    SetEvents(Box<dyn SessionEvents>),
    Stop,
}

enum Turn {
    Command(Option<Command>),
    Frame(Result<Decoded>),
    Legacy(Result<Vec<u8>>),
}

/// Cloneable handle for operating a session from other tasks.
///
/// All operations are marshaled onto the session's task and complete
/// asynchronously; a handle whose session has already closed swallows them.
/// The one synchronous failure is the programming-contract check on the
/// legacy variants, which cannot express binary data or raw frames.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Command>,
    variant: Variant,
}

impl SessionHandle {
    /// The protocol variant the session speaks.
    #[must_use]
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Send a text message. Fire-and-forget.
    pub fn send_text(&self, text: impl Into<String>) {
        let _ = self.commands.send(Command::SendText(text.into()));
    }

    /// Send a binary message.
    ///
    /// ## Errors
    ///
    /// `Error::LegacyUnsupported` on Hixie sessions, whose data path is
    /// text-only. This is a contract violation signaled to the caller
    /// directly rather than surfaced through the session.
    pub fn send_binary(&self, data: Vec<u8>) -> Result<()> {
        if !self.variant.supports_binary() {
            return Err(Error::LegacyUnsupported("binary message"));
        }
        let _ = self.commands.send(Command::SendBinary(data));
        Ok(())
    }

    /// Send a single frame with an explicit opcode (control or data).
    ///
    /// ## Errors
    ///
    /// `Error::LegacyUnsupported` on Hixie sessions, which have no opcode
    /// concept.
    pub fn send_frame(&self, opcode: OpCode, payload: Vec<u8>) -> Result<()> {
        if self.variant.is_legacy() {
            return Err(Error::LegacyUnsupported("raw frame"));
        }
        let _ = self.commands.send(Command::SendFrame { opcode, payload });
        Ok(())
    }

    /// Replace the notification sink. Applied on the session's task, so it
    /// never races frame dispatch.
    pub fn set_events(&self, sink: Box<dyn SessionEvents>) {
        let _ = self.commands.send(Command::SetEvents(sink));
    }

    /// Request transport disconnect. The session transitions to `Closed`
    /// and fires `on_close` exactly once.
    pub fn stop(&self) {
        let _ = self.commands.send(Command::Stop);
    }
}

/// One WebSocket session over an accepted, upgraded connection.
pub struct Session<T> {
    codec: WireCodec<T>,
    request: UpgradeRequest,
    variant: Variant,
    state: SessionState,
    assembler: MessageAssembler,
    events: Box<dyn SessionEvents>,
    commands: mpsc::UnboundedReceiver<Command>,
    command_tx: mpsc::UnboundedSender<Command>,
    close_notice: Option<(SessionId, mpsc::UnboundedSender<SessionId>)>,
}

impl<T: AsyncRead + AsyncWrite + Unpin> Session<T> {
    /// Create a session from an upgrade request and its transport.
    ///
    /// The protocol variant is resolved here, once, and never changes.
    pub fn new(request: UpgradeRequest, transport: T, events: Box<dyn SessionEvents>) -> Self {
        let variant = Variant::resolve(&request);
        let (command_tx, commands) = mpsc::unbounded_channel();
        Self {
            codec: WireCodec::new(transport),
            request,
            variant,
            state: SessionState::Created,
            assembler: MessageAssembler::new(),
            events,
            commands,
            command_tx,
            close_notice: None,
        }
    }

    /// Register the owner's close broadcast: `id` is sent on `notify`
    /// exactly once when the session closes.
    #[must_use]
    pub fn with_close_notice(
        mut self,
        id: SessionId,
        notify: mpsc::UnboundedSender<SessionId>,
    ) -> Self {
        self.close_notice = Some((id, notify));
        self
    }

    /// The resolved protocol variant.
    #[must_use]
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// The current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Obtain a handle for cross-task operations.
    #[must_use]
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            commands: self.command_tx.clone(),
            variant: self.variant,
        }
    }

    /// Perform the handshake and fire `on_open`.
    ///
    /// Idempotent: calling again after the session has started is a no-op.
    /// Hixie-76 reads the client's 8-byte token before responding and
    /// appends the 16-byte MD5 proof after the headers.
    ///
    /// ## Errors
    ///
    /// Transport failures during the handshake.
    pub async fn start(&mut self) -> Result<()> {
        if self.state.has_started() {
            return Ok(());
        }
        self.state = SessionState::Started;

        if self.variant == Variant::Hixie76 {
            let token = self.codec.read_token().await?;
            let headers = handshake::build_response(&self.request, self.variant);
            self.codec.write_raw(&headers).await?;
            let key1 = self.request.header("sec-websocket-key1").unwrap_or_default();
            let key2 = self.request.header("sec-websocket-key2").unwrap_or_default();
            let digest = handshake::derive_legacy_digest(key1, key2, &token);
            self.codec.write_raw(&digest).await?;
        } else {
            let headers = handshake::build_response(&self.request, self.variant);
            self.codec.write_raw(&headers).await?;
        }

        self.state = SessionState::Open;
        debug!(variant = %self.variant, "session open");
        self.events.on_open();
        Ok(())
    }

    /// Drive the session to completion.
    ///
    /// Performs the handshake, then loops between the transport and the
    /// command channel until a close frame, a stop request, or transport
    /// failure. Failures are not returned: per the error model, the only
    /// externally observable failure signal is the `on_close` notification
    /// (and the close broadcast), which this method guarantees fires
    /// exactly once.
    pub async fn run(mut self) {
        if let Err(e) = self.start().await {
            debug!(error = %e, "handshake failed");
            self.close().await;
            return;
        }

        loop {
            let turn = if self.variant.is_legacy() {
                tokio::select! {
                    cmd = self.commands.recv() => Turn::Command(cmd),
                    res = self.codec.read_legacy() => Turn::Legacy(res),
                }
            } else {
                tokio::select! {
                    cmd = self.commands.recv() => Turn::Command(cmd),
                    res = self.codec.read_frame() => Turn::Frame(res),
                }
            };

            let proceed = match turn {
                Turn::Command(None) => false,
                Turn::Command(Some(command)) => self.apply(command).await,
                Turn::Frame(Ok(decoded)) => self.dispatch(decoded).await,
                Turn::Legacy(Ok(payload)) => {
                    self.events
                        .on_text(String::from_utf8_lossy(&payload).into_owned());
                    true
                }
                Turn::Frame(Err(e)) | Turn::Legacy(Err(e)) => {
                    if e != Error::ConnectionClosed {
                        debug!(error = %e, "read failed");
                    }
                    false
                }
            };

            if !proceed {
                break;
            }
        }

        self.close().await;
    }

    async fn apply(&mut self, command: Command) -> bool {
        let result = match command {
            Command::SendText(text) => {
                if self.variant.is_legacy() {
                    self.codec.write_legacy(&text).await
                } else {
                    self.codec.write_frame(OpCode::Text, text.as_bytes()).await
                }
            }
            Command::SendBinary(data) => self.codec.write_frame(OpCode::Binary, &data).await,
            Command::SendFrame { opcode, payload } => {
                self.codec.write_frame(opcode, &payload).await
            }
            Command::SetEvents(sink) => {
                self.events = sink;
                Ok(())
            }
            Command::Stop => return false,
        };

        match result {
            Ok(()) => true,
            Err(e) => {
                debug!(error = %e, "send failed");
                false
            }
        }
    }

    async fn dispatch(&mut self, decoded: Decoded) -> bool {
        let frame = match decoded {
            Decoded::Skipped { opcode } => {
                trace!(opcode, "skipped frame with unassigned opcode");
                return true;
            }
            Decoded::Frame(frame) => frame,
        };

        match frame.opcode {
            // No close handshake: the connection terminates immediately,
            // without a reply frame.
            OpCode::Close => {
                debug!("close frame received");
                false
            }
            OpCode::Pong => {
                trace!("ignoring pong");
                true
            }
            OpCode::Ping | OpCode::Text | OpCode::Binary | OpCode::Continuation => {
                let Some(message) = self.assembler.push(frame) else {
                    return true;
                };
                match message.opcode {
                    // Pongs echo the ping payload and bypass the sink.
                    OpCode::Ping => {
                        match self.codec.write_frame(OpCode::Pong, &message.payload).await {
                            Ok(()) => true,
                            Err(e) => {
                                debug!(error = %e, "pong write failed");
                                false
                            }
                        }
                    }
                    OpCode::Text => {
                        self.events.on_text(message.into_text());
                        true
                    }
                    OpCode::Binary => {
                        self.events.on_binary(message.into_binary());
                        true
                    }
                    _ => true,
                }
            }
        }
    }

    async fn close(&mut self) {
        if self.state.is_closed() {
            return;
        }
        self.state = SessionState::Closed;
        let _ = self.codec.shutdown().await;
        debug!("session closed");
        self.events.on_close();
        if let Some((id, notify)) = self.close_notice.take() {
            let _ = notify.send(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::events::NullEvents;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, duplex};

    struct CountingEvents {
        opened: Arc<AtomicUsize>,
    }

    impl SessionEvents for CountingEvents {
        fn on_open(&mut self) {
            self.opened.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn hybi_request() -> UpgradeRequest {
        UpgradeRequest::new("/chat", 8080, false)
            .with_header("Upgrade", "WebSocket")
            .with_header("Connection", "Upgrade")
            .with_header("Host", "server.example.com")
            .with_header("Sec-WebSocket-Key", "dGhlIHNhbXBsZSBub25jZQ==")
            .with_header("Sec-WebSocket-Version", "13")
    }

    #[test]
    fn test_variant_resolved_at_construction() {
        let (_, server) = duplex(64);
        let session = Session::new(hybi_request(), server, Box::new(NullEvents));
        assert_eq!(session.variant(), Variant::Hybi { version: 13 });
        assert_eq!(session.state(), SessionState::Created);
        assert_eq!(session.handle().variant(), Variant::Hybi { version: 13 });
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let (mut client, server) = duplex(4096);
        let opened = Arc::new(AtomicUsize::new(0));
        let events = CountingEvents {
            opened: opened.clone(),
        };
        let mut session = Session::new(hybi_request(), server, Box::new(events));

        session.start().await.unwrap();
        session.start().await.unwrap();
        assert_eq!(session.state(), SessionState::Open);
        assert_eq!(opened.load(Ordering::SeqCst), 1);

        drop(session);
        let mut response = Vec::new();
        client.read_to_end(&mut response).await.unwrap();
        let text = String::from_utf8(response).unwrap();
        assert_eq!(text.matches("HTTP/1.1 101").count(), 1);
    }

    #[test]
    fn test_handle_rejects_binary_on_legacy() {
        let (_, server) = duplex(64);
        let request = UpgradeRequest::new("/", 80, false)
            .with_header("Upgrade", "WebSocket")
            .with_header("Connection", "Upgrade");
        let session = Session::new(request, server, Box::new(NullEvents));
        let handle = session.handle();

        assert_eq!(handle.variant(), Variant::Hixie75);
        assert!(matches!(
            handle.send_binary(vec![1, 2, 3]),
            Err(Error::LegacyUnsupported("binary message"))
        ));
        assert!(matches!(
            handle.send_frame(OpCode::Ping, vec![]),
            Err(Error::LegacyUnsupported("raw frame"))
        ));
    }

    #[test]
    fn test_handle_accepts_binary_on_hybi() {
        let (_, server) = duplex(64);
        let session = Session::new(hybi_request(), server, Box::new(NullEvents));
        let handle = session.handle();
        assert!(handle.send_binary(vec![1, 2, 3]).is_ok());
        assert!(handle.send_frame(OpCode::Ping, b"hb".to_vec()).is_ok());
    }
}

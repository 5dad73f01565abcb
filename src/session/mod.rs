//! Session layer: lifecycle state machine, notification sink, and the
//! per-connection task driving both framings.
//!
//! ## Session lifecycle
//!
//! 1. **Created** - constructed from an upgrade request plus a transport;
//!    the protocol variant is resolved here and never changes
//! 2. **Started** - handshake in progress (`start`)
//! 3. **Open** - handshake written, frames flowing, `on_open` fired
//! 4. **Closed** - transport disconnected, `on_close` and the close
//!    broadcast fired exactly once. Terminal.
//!
//! ## Example
//!
//! ```rust,ignore
//! use websock::{Session, SessionEvents, UpgradeRequest};
//!
//! let request = UpgradeRequest::new("/chat", 8080, false)
//!     .with_header("Upgrade", "WebSocket")
//!     .with_header("Connection", "Upgrade")
//!     .with_header("Sec-WebSocket-Key", key)
//!     .with_header("Sec-WebSocket-Version", "13");
//!
//! let session = Session::new(request, stream, Box::new(MyEvents));
//! let handle = session.handle();
//! tokio::spawn(session.run());
//!
//! handle.send_text("Hello");
//! handle.stop();
//! ```

mod events;
mod state;

pub use events::{NullEvents, SessionEvents, SessionId};
pub use state::SessionState;

#[cfg(feature = "async-tokio")]
mod codec;
#[cfg(feature = "async-tokio")]
#[allow(clippy::module_inception)]
mod session;

#[cfg(feature = "async-tokio")]
pub use codec::WireCodec;
#[cfg(feature = "async-tokio")]
pub use session::{Session, SessionHandle};

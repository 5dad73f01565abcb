//! Reassembly of fragmented frames into complete messages.
//!
//! Semantics are deliberately permissive: a Text, Binary, or Ping frame
//! arriving while a fragment run is in flight silently discards the
//! accumulated fragments and starts over, and the recorded opcode survives
//! message completion so a later bare continuation run inherits it.

use bytes::BytesMut;
use tracing::debug;

use crate::protocol::{Frame, OpCode};

/// Accumulates data-frame payloads into complete messages.
pub struct MessageAssembler {
    buffer: BytesMut,
    opcode: Option<OpCode>,
}

impl MessageAssembler {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::new(),
            opcode: None,
        }
    }

    /// Feed one frame; returns the completed message when this frame
    /// carries FIN.
    ///
    /// Continuation frames append under the recorded opcode. Text, Binary,
    /// and Ping frames start a new message. Control frames other than Ping
    /// are not the assembler's business and return `None`. A completed run
    /// that never recorded an opcode (leading bare continuations) is
    /// dropped.
    pub fn push(&mut self, frame: Frame) -> Option<AssembledMessage> {
        match frame.opcode {
            OpCode::Continuation => {}
            OpCode::Text | OpCode::Binary | OpCode::Ping => {
                if !self.buffer.is_empty() {
                    debug!(
                        opcode = %frame.opcode,
                        discarded = self.buffer.len(),
                        "new data frame discards fragment run in flight"
                    );
                    self.buffer.clear();
                }
                self.opcode = Some(frame.opcode);
            }
            _ => return None,
        }

        let fin = frame.fin;
        self.buffer.extend_from_slice(frame.payload());

        if fin {
            let payload = self.buffer.split().freeze().to_vec();
            let opcode = self.opcode?;
            Some(AssembledMessage { opcode, payload })
        } else {
            None
        }
    }

    /// Check whether a fragment run is in flight.
    #[must_use]
    pub fn is_assembling(&self) -> bool {
        !self.buffer.is_empty()
    }
}

impl Default for MessageAssembler {
    fn default() -> Self {
        Self::new()
    }
}

/// A fully reassembled message.
pub struct AssembledMessage {
    /// The opcode recorded when the message started.
    pub opcode: OpCode,
    /// The concatenated payload bytes of all fragments.
    pub payload: Vec<u8>,
}

impl AssembledMessage {
    /// Consume the message as text.
    ///
    /// Conversion is lossy: text payloads are never validated, so
    /// malformed sequences become U+FFFD.
    #[must_use]
    pub fn into_text(self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }

    /// Consume the message as raw bytes.
    #[must_use]
    pub fn into_binary(self) -> Vec<u8> {
        self.payload
    }
}

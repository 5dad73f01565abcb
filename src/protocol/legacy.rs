//! Hixie draft 75/76 text framing.
//!
//! Data frames in the legacy drafts are a prefix byte, UTF-8 text, and a
//! single 0xFF terminator. Any prefix at or below 0x7F starts a text frame;
//! prefixes above 0x7F belong to the binary-length-prefixed form that never
//! shipped and are treated as fatal.

use crate::error::{Error, Result};

/// Prefix byte written before outbound text frames.
pub const FRAME_PREFIX: u8 = 0x00;

/// Terminator byte delimiting text frames.
pub const FRAME_TERMINATOR: u8 = 0xFF;

/// Scan the buffer for one complete legacy text frame.
///
/// Returns `Ok(Some((payload, consumed)))` when a full frame is buffered,
/// with the prefix and terminator stripped; `Ok(None)` when more data is
/// needed.
///
/// ## Errors
///
/// `Error::UnsupportedLegacyFrame` if the prefix byte is above 0x7F.
pub fn parse(buf: &[u8]) -> Result<Option<(Vec<u8>, usize)>> {
    let Some(&prefix) = buf.first() else {
        return Ok(None);
    };
    if prefix > 0x7F {
        return Err(Error::UnsupportedLegacyFrame(prefix));
    }

    match buf[1..].iter().position(|&b| b == FRAME_TERMINATOR) {
        Some(end) => {
            let payload = buf[1..1 + end].to_vec();
            Ok(Some((payload, end + 2)))
        }
        None => Ok(None),
    }
}

/// Serialize one outbound text frame into `buf`.
pub fn encode(text: &str, buf: &mut Vec<u8>) {
    buf.push(FRAME_PREFIX);
    buf.extend_from_slice(text.as_bytes());
    buf.push(FRAME_TERMINATOR);
}

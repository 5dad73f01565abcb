//! Protocol core: variant resolution, handshakes, and both framings.
//!
//! Everything in this module is pure and runtime-agnostic; the async half
//! lives in [`crate::session`].

pub mod assembler;
pub mod frame;
pub mod handshake;
pub mod legacy;
pub mod mask;
pub mod opcode;
pub mod version;

pub use assembler::{AssembledMessage, MessageAssembler};
pub use frame::{Decoded, Frame};
pub use handshake::{UpgradeRequest, WS_GUID, compute_accept_key, derive_legacy_digest};
pub use mask::apply_mask;
pub use opcode::OpCode;
pub use version::Variant;

//! Bitcoin P2P wire protocol: message framing and typed payloads.
//!
//! [`envelope`] handles the 24-byte frame header (magic, command, length,
//! checksum) and its validation; [`message`] turns validated payloads into
//! strongly typed variants. Driving a live connection is [`crate::session`]'s
//! job.
//!
//! Protocol reference:
//! https://developer.bitcoin.org/reference/p2p_networking.html

pub mod envelope;
pub mod message;

pub use envelope::NetworkEnvelope;
pub use message::{Command, GetHeadersMessage, Message, VersionMessage};

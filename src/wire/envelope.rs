//! The framed, checksummed container for every peer-to-peer message.
//!
//! ```text
//! +------------+--------------+---------------+-------------+
//! | magic (4)  | command (12) | length (4 LE) | checksum(4) |
//! +------------+--------------+---------------+-------------+
//! | payload (variable)                                 ...  |
//! +---------------------------------------------------------+
//! ```
//!
//! The checksum is the first 4 bytes of `SHA256(SHA256(payload))`. Magic
//! and checksum are both verified on parse; either mismatch is fatal for
//! the connection, since a TCP stream cannot be resynchronized after a bad
//! frame.
//!
//! Reference:
//! https://developer.bitcoin.org/reference/p2p_networking.html#message-headers

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::codec::{hash256, read_array};
use crate::error::{ProtocolError, Result};
use crate::network::Network;
use crate::wire::message::Command;

/// Maximum payload length the protocol allows (32 MiB). Checked before
/// the payload buffer is allocated, so a hostile length field cannot
/// exhaust memory.
pub const MAX_PAYLOAD: usize = 0x0200_0000;

/// One wire frame: a command tag plus its raw payload, bound to a network
/// by the magic bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkEnvelope {
    pub command: Command,
    pub payload: Vec<u8>,
    pub network: Network,
}

impl NetworkEnvelope {
    pub fn new(command: Command, payload: Vec<u8>, network: Network) -> Self {
        NetworkEnvelope {
            command,
            payload,
            network,
        }
    }

    /// Reads one frame from the stream.
    ///
    /// Fatal conditions: magic that does not match `network`, a checksum
    /// that does not match the payload, or the peer closing the connection
    /// mid-frame (surfaced as [`ProtocolError::ConnectionReset`]).
    pub fn parse<R: Read>(reader: &mut R, network: Network) -> Result<Self> {
        let magic = read_array::<4, _>(reader)?;
        let expected = network.magic();
        if magic != expected {
            return Err(ProtocolError::MagicMismatch {
                got: hex::encode(magic),
                expected: hex::encode(expected),
            }
            .into());
        }

        let command_bytes = read_array::<12, _>(reader)?;
        let command = Command::from(&command_bytes);

        let length = reader.read_u32::<LittleEndian>()? as usize;
        if length > MAX_PAYLOAD {
            return Err(ProtocolError::OversizedPayload(length).into());
        }
        let checksum = read_array::<4, _>(reader)?;

        let mut payload = vec![0u8; length];
        reader.read_exact(&mut payload)?;

        if hash256(&payload)[..4] != checksum {
            return Err(ProtocolError::ChecksumMismatch(command.name()).into());
        }

        Ok(NetworkEnvelope {
            command,
            payload,
            network,
        })
    }

    /// Exact inverse of [`NetworkEnvelope::parse`], with the command
    /// right-padded to 12 bytes with zeros.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(24 + self.payload.len());
        out.extend(self.network.magic());
        out.extend(self.command.as_bytes());
        out.extend((self.payload.len() as u32).to_le_bytes());
        out.extend(&hash256(&self.payload)[..4]);
        out.extend(&self.payload);
        out
    }

    /// Writes the full frame to the stream.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.serialize())?;
        Ok(())
    }
}

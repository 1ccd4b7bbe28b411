//! Typed commands and payloads over the envelope layer.
//!
//! [`Command`] is the closed set of commands this peer speaks, with
//! [`Command::Unknown`] carrying the raw 12-byte tag for everything else,
//! so dispatch on incoming traffic stays exhaustive and adding a command
//! is a compile-checked change.
//!
//! Reference:
//! https://developer.bitcoin.org/reference/p2p_networking.html

use std::io::Read;
use std::time::{SystemTime, UNIX_EPOCH};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use rand::Rng;

use crate::codec::{encode_varint, read_array, read_varint};
use crate::error::{ProtocolError, Result};
use crate::header::BlockHeader;
use crate::network::Network;
use crate::tx::Tx;
use crate::wire::envelope::NetworkEnvelope;

/// Protocol version advertised in our `version` message.
pub const PROTOCOL_VERSION: i32 = 70015;

/// User agent advertised in our `version` message.
pub const USER_AGENT: &str = "/btc-peer:0.1/";

/// The 12-byte command field, as the closed set of commands this peer
/// understands plus a passthrough for everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Version,
    Verack,
    Ping,
    Pong,
    GetHeaders,
    Headers,
    Tx,
    Unknown([u8; 12]),
}

impl From<&[u8; 12]> for Command {
    fn from(bytes: &[u8; 12]) -> Self {
        let cmd = std::str::from_utf8(bytes)
            .unwrap_or("")
            .trim_matches(char::from(0));

        match cmd {
            "version" => Command::Version,
            "verack" => Command::Verack,
            "ping" => Command::Ping,
            "pong" => Command::Pong,
            "getheaders" => Command::GetHeaders,
            "headers" => Command::Headers,
            "tx" => Command::Tx,
            _ => Command::Unknown(*bytes),
        }
    }
}

impl Command {
    /// The 12-byte command field: ASCII, right-padded with zero bytes.
    pub fn as_bytes(&self) -> [u8; 12] {
        let name: &[u8] = match self {
            Command::Version => b"version",
            Command::Verack => b"verack",
            Command::Ping => b"ping",
            Command::Pong => b"pong",
            Command::GetHeaders => b"getheaders",
            Command::Headers => b"headers",
            Command::Tx => b"tx",
            Command::Unknown(raw) => return *raw,
        };

        let mut padded = [0u8; 12];
        padded[..name.len()].copy_from_slice(name);
        padded
    }

    /// Printable command name for logs and errors.
    pub fn name(&self) -> String {
        let bytes = self.as_bytes();
        let trimmed: Vec<u8> = bytes.iter().copied().take_while(|&b| b != 0).collect();
        String::from_utf8_lossy(&trimmed).into_owned()
    }
}

/// The `version` handshake payload.
///
/// Both network addresses use the 26-byte layout: 8-byte services, a
/// 16-byte IPv6-mapped IPv4 address, and a big-endian port.
///
/// Reference:
/// https://developer.bitcoin.org/reference/p2p_networking.html#version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionMessage {
    pub version: i32,
    pub services: u64,
    pub timestamp: u64,
    pub receiver_services: u64,
    pub receiver_ip: [u8; 4],
    pub receiver_port: u16,
    pub sender_services: u64,
    pub sender_ip: [u8; 4],
    pub sender_port: u16,
    pub nonce: [u8; 8],
    pub user_agent: String,
    pub latest_block: u32,
    pub relay: bool,
}

impl VersionMessage {
    /// A fresh outbound `version` with a random nonce and the current
    /// time, advertising no services.
    pub fn new(network: Network) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        VersionMessage {
            version: PROTOCOL_VERSION,
            services: 0,
            timestamp,
            receiver_services: 0,
            receiver_ip: [0, 0, 0, 0],
            receiver_port: network.default_port(),
            sender_services: 0,
            sender_ip: [0, 0, 0, 0],
            sender_port: network.default_port(),
            nonce: rand::thread_rng().gen(),
            user_agent: USER_AGENT.to_string(),
            latest_block: 0,
            relay: false,
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(86 + self.user_agent.len());
        out.extend(self.version.to_le_bytes());
        out.extend(self.services.to_le_bytes());
        out.extend(self.timestamp.to_le_bytes());

        out.extend(self.receiver_services.to_le_bytes());
        out.extend(mapped_ipv4(self.receiver_ip));
        out.extend(self.receiver_port.to_be_bytes());

        out.extend(self.sender_services.to_le_bytes());
        out.extend(mapped_ipv4(self.sender_ip));
        out.extend(self.sender_port.to_be_bytes());

        out.extend(self.nonce);
        out.extend(encode_varint(self.user_agent.len() as u64));
        out.extend(self.user_agent.as_bytes());
        out.extend(self.latest_block.to_le_bytes());
        out.push(self.relay as u8);
        out
    }

    pub fn parse<R: Read>(reader: &mut R) -> Result<Self> {
        let version = reader.read_i32::<LittleEndian>()?;
        let services = reader.read_u64::<LittleEndian>()?;
        let timestamp = reader.read_u64::<LittleEndian>()?;

        let receiver_services = reader.read_u64::<LittleEndian>()?;
        let receiver_ip = unmapped_ipv4(read_array::<16, _>(reader)?);
        let receiver_port = reader.read_u16::<BigEndian>()?;

        let sender_services = reader.read_u64::<LittleEndian>()?;
        let sender_ip = unmapped_ipv4(read_array::<16, _>(reader)?);
        let sender_port = reader.read_u16::<BigEndian>()?;

        let nonce = read_array::<8, _>(reader)?;

        let ua_len = read_varint(reader)? as usize;
        let mut ua = vec![0u8; ua_len];
        reader.read_exact(&mut ua)?;
        let user_agent = String::from_utf8_lossy(&ua).into_owned();

        let latest_block = reader.read_u32::<LittleEndian>()?;
        let relay = match reader.read_u8() {
            Ok(b) => b != 0,
            // Pre-BIP37 peers omit the relay byte.
            Err(_) => false,
        };

        Ok(VersionMessage {
            version,
            services,
            timestamp,
            receiver_services,
            receiver_ip,
            receiver_port,
            sender_services,
            sender_ip,
            sender_port,
            nonce,
            user_agent,
            latest_block,
            relay,
        })
    }
}

/// IPv4 address in the 16-byte IPv6-mapped form used on the wire.
fn mapped_ipv4(ip: [u8; 4]) -> [u8; 16] {
    let mut out = [0u8; 16];
    out[10] = 0xff;
    out[11] = 0xff;
    out[12..].copy_from_slice(&ip);
    out
}

fn unmapped_ipv4(bytes: [u8; 16]) -> [u8; 4] {
    let mut out = [0u8; 4];
    out.copy_from_slice(&bytes[12..]);
    out
}

/// The `getheaders` request payload.
///
/// `start_block` and `end_block` are block hashes in display order; both
/// are byte-reversed on the wire. An all-zero `end_block` asks for as many
/// headers as the peer will send (at most 2000).
///
/// Reference:
/// https://developer.bitcoin.org/reference/p2p_networking.html#getheaders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetHeadersMessage {
    pub version: i32,
    pub start_block: [u8; 32],
    pub end_block: [u8; 32],
}

impl GetHeadersMessage {
    pub fn new(start_block: [u8; 32]) -> Self {
        GetHeadersMessage {
            version: PROTOCOL_VERSION,
            start_block,
            end_block: [0u8; 32],
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(69);
        out.extend(self.version.to_le_bytes());
        // Single locator hash.
        out.extend(encode_varint(1));

        let mut start = self.start_block;
        start.reverse();
        out.extend(start);

        let mut end = self.end_block;
        end.reverse();
        out.extend(end);
        out
    }

    pub fn parse<R: Read>(reader: &mut R) -> Result<Self> {
        let version = reader.read_i32::<LittleEndian>()?;
        let num_hashes = read_varint(reader)?;

        // Only the last locator hash matters for our single-hash requests.
        let mut start_block = [0u8; 32];
        for _ in 0..num_hashes {
            start_block = read_array::<32, _>(reader)?;
        }
        start_block.reverse();

        let mut end_block = read_array::<32, _>(reader)?;
        end_block.reverse();

        Ok(GetHeadersMessage {
            version,
            start_block,
            end_block,
        })
    }
}

/// A decoded message, one variant per command this peer understands.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Version(VersionMessage),
    Verack,
    Ping([u8; 8]),
    Pong([u8; 8]),
    GetHeaders(GetHeadersMessage),
    Headers(Vec<BlockHeader>),
    Tx(Tx),
    Unknown { command: [u8; 12], payload: Vec<u8> },
}

impl Message {
    pub fn command(&self) -> Command {
        match self {
            Message::Version(_) => Command::Version,
            Message::Verack => Command::Verack,
            Message::Ping(_) => Command::Ping,
            Message::Pong(_) => Command::Pong,
            Message::GetHeaders(_) => Command::GetHeaders,
            Message::Headers(_) => Command::Headers,
            Message::Tx(_) => Command::Tx,
            Message::Unknown { command, .. } => Command::Unknown(*command),
        }
    }

    pub fn serialize_payload(&self) -> Vec<u8> {
        match self {
            Message::Version(v) => v.serialize(),
            Message::Verack => vec![],
            Message::Ping(nonce) | Message::Pong(nonce) => nonce.to_vec(),
            Message::GetHeaders(g) => g.serialize(),
            Message::Headers(headers) => {
                let mut out = encode_varint(headers.len() as u64);
                for header in headers {
                    out.extend(header.serialize());
                    // Headers never carry transactions.
                    out.extend(encode_varint(0));
                }
                out
            }
            Message::Tx(tx) => tx.serialize(),
            Message::Unknown { payload, .. } => payload.clone(),
        }
    }

    /// Wraps the message in an envelope for the given network.
    pub fn envelope(&self, network: Network) -> NetworkEnvelope {
        NetworkEnvelope::new(self.command(), self.serialize_payload(), network)
    }

    /// Decodes an envelope's payload according to its command.
    ///
    /// Every known command gets a typed variant; anything else lands in
    /// [`Message::Unknown`] untouched.
    pub fn decode(envelope: &NetworkEnvelope) -> Result<Self> {
        let mut reader = std::io::Cursor::new(&envelope.payload);
        match envelope.command {
            Command::Version => Ok(Message::Version(VersionMessage::parse(&mut reader)?)),
            Command::Verack => Ok(Message::Verack),
            Command::Ping => Ok(Message::Ping(read_array::<8, _>(&mut reader)?)),
            Command::Pong => Ok(Message::Pong(read_array::<8, _>(&mut reader)?)),
            Command::GetHeaders => {
                Ok(Message::GetHeaders(GetHeadersMessage::parse(&mut reader)?))
            }
            Command::Headers => {
                let count = read_varint(&mut reader)?;
                let mut headers = Vec::with_capacity(count.min(2000) as usize);
                for _ in 0..count {
                    headers.push(BlockHeader::parse(&mut reader)?);
                    if read_varint(&mut reader)? != 0 {
                        return Err(ProtocolError::NonEmptyHeader.into());
                    }
                }
                Ok(Message::Headers(headers))
            }
            Command::Tx => Ok(Message::Tx(Tx::parse(&mut reader, envelope.network)?)),
            Command::Unknown(command) => Ok(Message::Unknown {
                command,
                payload: envelope.payload.clone(),
            }),
        }
    }
}

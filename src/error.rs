//! Error taxonomy for the peer core.
//!
//! Every parse/verify operation returns a [`Result`] carrying one of four
//! kinds: encoding, protocol, validation, or connection. Nothing is retried
//! internally; callers at the orchestration layer decide what to do with a
//! failure.

use thiserror::Error;

/// A value cannot be represented in the requested wire encoding.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EncodingError {
    #[error("integer {0} does not fit in {1} bytes")]
    IntegerTooLarge(u64, usize),

    #[error("fixed-width field expects at most 8 bytes, got {0}")]
    FieldTooWide(usize),

    #[error("target does not fit the compact bits encoding")]
    TargetTooLarge,
}

/// The byte stream violates the peer-to-peer framing protocol.
///
/// Any of these is fatal for the connection that produced it: there is no
/// way to resynchronize a TCP stream after a bad frame.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("network magic mismatch: got {got}, expected {expected}")]
    MagicMismatch { got: String, expected: String },

    #[error("envelope checksum mismatch for command {0:?}")]
    ChecksumMismatch(String),

    #[error("payload length {0} exceeds the 32 MiB message limit")]
    OversizedPayload(usize),

    #[error("peer closed the connection")]
    ConnectionReset,

    #[error("headers message carries a non-zero transaction count")]
    NonEmptyHeader,

    #[error("truncated payload while reading {0}")]
    Truncated(&'static str),
}

/// Well-formed data that fails a semantic check.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("bad base58 checksum: got {got}, computed {computed}")]
    Base58Checksum { got: String, computed: String },

    #[error("base58 value does not fit the 25-byte address layout")]
    Base58Overflow,

    #[error("invalid base58 character {0:?}")]
    Base58Character(char),

    #[error("transaction fee is negative")]
    NegativeFee,

    #[error("fetched transaction id {got} does not match requested {requested}")]
    TxIdMismatch { got: String, requested: String },

    #[error("input {0} is out of range")]
    InputIndex(usize),

    #[error("referenced output {0} is out of range")]
    OutputIndex(u32),

    #[error("insufficient funds: have {available}, need {required}")]
    InsufficientFunds { available: u64, required: u64 },

    #[error("amounts overflow the 64-bit satoshi range")]
    AmountOverflow,

    #[error("invalid hex from chain source: {0}")]
    BadHex(String),

    #[error("header {0} fails its proof-of-work check")]
    HeaderPow(String),
}

/// Transport-level failure on the underlying socket.
#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("socket read/write timed out")]
    Timeout,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ConnectionError {
    /// Wraps an I/O error, surfacing timeout kinds as [`ConnectionError::Timeout`].
    pub fn from_io(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => {
                ConnectionError::Timeout
            }
            _ => ConnectionError::Io(e),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Connection(#[from] ConnectionError),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        // A clean EOF mid-frame means the peer hung up; everything else is
        // a transport failure.
        match e.kind() {
            std::io::ErrorKind::UnexpectedEof => Error::Protocol(ProtocolError::ConnectionReset),
            _ => Error::Connection(ConnectionError::from_io(e)),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

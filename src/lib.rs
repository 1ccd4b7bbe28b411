//! Wire-level Bitcoin peer primitives: message framing, block headers and
//! their proof-of-work rules, legacy transaction construction and signing,
//! and a blocking session that speaks the version/verack handshake over
//! TCP.
//!
//! Everything here is synchronous and allocation-light. Parsing is generic
//! over `std::io::Read` so payloads decode the same way from a socket, a
//! file, or a byte buffer in tests. Fallible operations return [`Result`];
//! nothing retries or reconnects on its own.
//!
//! Protocol reference:
//! https://developer.bitcoin.org/reference/

pub mod codec;
pub mod error;
pub mod header;
pub mod network;
pub mod script;
pub mod session;
pub mod signer;
pub mod tx;
pub mod utxo;
pub mod wire;

pub use error::{ConnectionError, EncodingError, Error, ProtocolError, Result, ValidationError};
pub use header::BlockHeader;
pub use network::Network;
pub use script::{Script, ScriptEvaluator};
pub use session::{HandshakeState, Session};
pub use signer::{KeyPair, Signature, Signer};
pub use tx::{build_p2pkh_tx, Spendable, Tx, TxIn, TxOut};
pub use utxo::{CachingResolver, ChainSource, UtxoResolver};
pub use wire::{Command, GetHeadersMessage, Message, NetworkEnvelope, VersionMessage};

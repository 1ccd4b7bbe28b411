//! Resolution of previous outputs by transaction id.
//!
//! The transaction core never talks to chain data directly: it goes through
//! the [`UtxoResolver`] capability. The concrete [`CachingResolver`] wraps
//! any [`ChainSource`] (an HTTP explorer client, a fixture map in tests)
//! with a process-wide cache behind an explicit lock, so sessions can share
//! it without ambient global state.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{Result, ValidationError};
use crate::network::Network;
use crate::tx::Tx;

/// Resolves a transaction by hex id.
pub trait UtxoResolver {
    fn fetch(&self, txid: &str, network: Network) -> Result<Tx>;
}

/// Raw chain-data provider: returns the hex serialization of a transaction.
///
/// Implementations live at the orchestration layer; this crate only defines
/// the contract and the decoding rules for what comes back.
pub trait ChainSource {
    fn raw_tx_hex(&self, txid: &str, network: Network) -> Result<String>;
}

/// A [`UtxoResolver`] that decodes, revalidates, and caches everything a
/// [`ChainSource`] returns.
///
/// The cache maps hex txid to the parsed transaction. Entries are only ever
/// added, except that a repeated lookup under a different network rewrites
/// the cached network flag (the serialized bytes are network-independent).
pub struct CachingResolver<S> {
    source: S,
    cache: Mutex<HashMap<String, Tx>>,
}

impl<S: ChainSource> CachingResolver<S> {
    pub fn new(source: S) -> Self {
        CachingResolver {
            source,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Number of cached transactions.
    pub fn cached(&self) -> usize {
        self.lock().len()
    }

    // Cache entries are only ever whole parsed transactions, so a panic in
    // another holder cannot leave one half-written; recover from poisoning.
    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Tx>> {
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn fetch_fresh(&self, txid: &str, network: Network) -> Result<Tx> {
        let hex_str = self.source.raw_tx_hex(txid, network)?;
        let raw = hex::decode(hex_str.trim())
            .map_err(|e| ValidationError::BadHex(e.to_string()))?;
        let tx = decode_upstream_tx(&raw, network)?;

        // Revalidate: the id must re-derive from the bytes we parsed, or
        // the source handed us the wrong transaction. No retry here; that
        // decision belongs to the caller.
        if tx.id() != txid {
            return Err(ValidationError::TxIdMismatch {
                got: tx.id(),
                requested: txid.to_string(),
            }
            .into());
        }
        Ok(tx)
    }
}

impl<S: ChainSource> UtxoResolver for CachingResolver<S> {
    fn fetch(&self, txid: &str, network: Network) -> Result<Tx> {
        if let Some(hit) = self.lock().get_mut(txid) {
            hit.network = network;
            return Ok(hit.clone());
        }

        let tx = self.fetch_fresh(txid, network)?;
        self.lock().insert(txid.to_string(), tx.clone());
        Ok(tx)
    }
}

/// Decodes raw transaction bytes from an upstream source.
///
/// Explorer APIs return the segwit serialization when witnesses are
/// present: a zero marker byte at offset 4, a flag byte, and witness data
/// between the outputs and the locktime. This core only models the legacy
/// layout, so the marker/flag pair is stripped and the trailing 4 bytes are
/// reinterpreted as the locktime. A quirk of the upstream data format, not
/// of the protocol itself.
fn decode_upstream_tx(raw: &[u8], network: Network) -> Result<Tx> {
    use std::io::Cursor;

    if raw.len() > 4 && raw[4] == 0 {
        let mut legacy = raw[..4].to_vec();
        legacy.extend(&raw[6..]);
        let mut tx = Tx::parse(&mut Cursor::new(&legacy), network)?;
        let mut locktime = [0u8; 4];
        locktime.copy_from_slice(&raw[raw.len() - 4..]);
        tx.locktime = u32::from_le_bytes(locktime);
        Ok(tx)
    } else {
        Tx::parse(&mut Cursor::new(raw), network)
    }
}

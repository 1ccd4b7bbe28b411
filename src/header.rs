//! The 80-byte block header and its proof-of-work checks.
//!
//! Layout on the wire (little-endian fields unless otherwise noted):
//!
//! ```text
//! 4  bytes  version
//! 32 bytes  previous block hash (byte-reversed relative to display order)
//! 32 bytes  merkle root         (same convention)
//! 4  bytes  timestamp (Unix epoch)
//! 4  bytes  bits (compact target encoding)
//! 4  bytes  nonce
//! ```
//!
//! `prev_block` and `merkle_root` are stored in display (big-endian) order
//! internally; parse and serialize reverse them at the wire boundary.
//!
//! Reference:
//! https://developer.bitcoin.org/reference/block_chain.html#block-headers

use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};
use num_bigint::BigUint;

use crate::codec::{self, bits_to_target, hash256, max_target, read_array};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub version: i32,
    pub prev_block: [u8; 32],
    pub merkle_root: [u8; 32],
    pub timestamp: u32,
    pub bits: [u8; 4],
    pub nonce: [u8; 4],
}

impl BlockHeader {
    /// Parses exactly 80 bytes from the stream.
    pub fn parse<R: Read>(reader: &mut R) -> Result<Self> {
        let version = reader.read_i32::<LittleEndian>()?;

        let mut prev_block = read_array::<32, _>(reader)?;
        prev_block.reverse();

        let mut merkle_root = read_array::<32, _>(reader)?;
        merkle_root.reverse();

        let timestamp = reader.read_u32::<LittleEndian>()?;
        let bits = read_array::<4, _>(reader)?;
        let nonce = read_array::<4, _>(reader)?;

        Ok(BlockHeader {
            version,
            prev_block,
            merkle_root,
            timestamp,
            bits,
            nonce,
        })
    }

    /// Exact inverse of [`BlockHeader::parse`].
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(80);
        out.extend(self.version.to_le_bytes());

        let mut prev_block = self.prev_block;
        prev_block.reverse();
        out.extend(prev_block);

        let mut merkle_root = self.merkle_root;
        merkle_root.reverse();
        out.extend(merkle_root);

        out.extend(self.timestamp.to_le_bytes());
        out.extend(self.bits);
        out.extend(self.nonce);
        out
    }

    /// Block hash in display order: the double SHA256 of the 80-byte
    /// serialization, byte-reversed.
    pub fn hash(&self) -> [u8; 32] {
        let mut digest = hash256(&self.serialize());
        digest.reverse();
        digest
    }

    /// Hex block id as shown by explorers.
    pub fn id(&self) -> String {
        hex::encode(self.hash())
    }

    /// BIP9 readiness: top three version bits equal `001`.
    pub fn bip9(&self) -> bool {
        self.version >> 29 == 0b001
    }

    /// BIP91 signal: version bit 4 set.
    pub fn bip91(&self) -> bool {
        self.version >> 4 & 1 == 1
    }

    /// BIP141 (segwit) signal: version bit 1 set.
    pub fn bip141(&self) -> bool {
        self.version >> 1 & 1 == 1
    }

    /// The 256-bit proof-of-work target encoded by `bits`.
    pub fn target(&self) -> BigUint {
        bits_to_target(self.bits)
    }

    /// Ratio of the lowest-difficulty target to this header's target.
    /// Display-only; consensus comparisons stay on [`BigUint`].
    pub fn difficulty(&self) -> f64 {
        let scale = 1u64 << 32;
        // lowest / target with 32 fractional bits so low difficulties
        // survive the conversion.
        let scaled = max_target() * scale / self.target();
        let digits = scaled.to_u64_digits();
        let approx = match digits.len() {
            0 => 0.0,
            1 => digits[0] as f64,
            _ => (digits[1] as f64) * (u64::MAX as f64 + 1.0) + digits[0] as f64,
        };
        approx / scale as f64
    }

    /// Whether the header hash, read as a big-endian integer, is strictly
    /// below the target.
    pub fn check_pow(&self) -> bool {
        let digest = hash256(&self.serialize());
        // Wire order is the little-endian form of the displayed integer.
        let proof = BigUint::from_bytes_le(&digest);
        proof < self.target()
    }
}

/// Recomputes the compact bits for the period following `last` given the
/// timestamp of the first block of the closing period.
pub fn new_bits_for_period(last: &BlockHeader, period_first: &BlockHeader) -> Result<[u8; 4]> {
    let differential = u64::from(last.timestamp.saturating_sub(period_first.timestamp));
    codec::calculate_new_bits(last.bits, differential)
}

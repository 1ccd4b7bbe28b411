//! Opaque script programs.
//!
//! The core never interprets script opcodes — evaluation is delegated to a
//! [`ScriptEvaluator`] capability. What the core does own is the wire
//! framing (a CompactSize length prefix followed by the raw program bytes),
//! concatenation of unlocking and locking halves, and the pushdata
//! construction needed to install a signature on an input.

use std::io::Read;
use std::ops::Add;

use crate::codec::{encode_varint, read_varint};
use crate::error::Result;

/// Raw script program bytes, without the length prefix.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Script {
    raw: Vec<u8>,
}

impl Script {
    /// The empty script. Placeholder for inputs awaiting a signature and
    /// for the blanked inputs of a signature-hash preimage.
    pub fn new() -> Self {
        Script::default()
    }

    pub fn from_raw(raw: Vec<u8>) -> Self {
        Script { raw }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Reads a CompactSize length prefix and that many program bytes.
    pub fn parse<R: Read>(reader: &mut R) -> Result<Self> {
        let length = read_varint(reader)? as usize;
        let mut raw = vec![0u8; length];
        reader.read_exact(&mut raw)?;
        Ok(Script { raw })
    }

    /// CompactSize length prefix followed by the raw program.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = encode_varint(self.raw.len() as u64);
        out.extend(&self.raw);
        out
    }

    /// Standard pay-to-pubkey-hash locking script:
    /// `OP_DUP OP_HASH160 <h160> OP_EQUALVERIFY OP_CHECKSIG`.
    pub fn p2pkh(h160: &[u8; 20]) -> Self {
        let mut raw = vec![0x76, 0xa9];
        push_data(&mut raw, h160);
        raw.extend([0x88, 0xac]);
        Script { raw }
    }

    /// Unlocking script for a P2PKH input: the DER signature (with its
    /// appended sighash-type byte) and the SEC public key, each as a push.
    pub fn p2pkh_unlock(signature: &[u8], pubkey: &[u8]) -> Self {
        let mut raw = Vec::with_capacity(signature.len() + pubkey.len() + 2);
        push_data(&mut raw, signature);
        push_data(&mut raw, pubkey);
        Script { raw }
    }
}

impl Add for Script {
    type Output = Script;

    /// Concatenates two script halves, unlocking then locking.
    fn add(self, rhs: Script) -> Script {
        let mut raw = self.raw;
        raw.extend(rhs.raw);
        Script { raw }
    }
}

/// Appends `data` as a minimal script push.
fn push_data(out: &mut Vec<u8>, data: &[u8]) {
    match data.len() {
        0..=0x4b => out.push(data.len() as u8),
        0x4c..=0xff => {
            out.push(0x4c); // OP_PUSHDATA1
            out.push(data.len() as u8);
        }
        _ => {
            out.push(0x4d); // OP_PUSHDATA2
            out.extend((data.len() as u16).to_le_bytes());
        }
    }
    out.extend(data);
}

/// Script-program evaluation capability.
///
/// Given the concatenated unlocking+locking script and the 32-byte
/// signature hash of the spending input, returns whether the program
/// accepts. The evaluation algorithm itself lives outside this core.
pub trait ScriptEvaluator {
    fn evaluate(&self, combined: &Script, z: &[u8; 32]) -> bool;
}

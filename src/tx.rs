//! Legacy (pre-segwit) transaction codec, fee computation, and the
//! SIGHASH_ALL signing/verification orchestration.
//!
//! Raw transaction format:
//!
//! ```text
//! 4 bytes   version (LE)
//! varint    input count
//! inputs    prev_tx(32, wire-reversed) | prev_index(4 LE) | script_sig | sequence(4 LE)
//! varint    output count
//! outputs   amount(8 LE) | script_pubkey
//! 4 bytes   locktime (LE)
//! ```
//!
//! `prev_tx` is held in display order internally and reversed at the wire
//! boundary, like block hashes. Amounts are integer satoshis; there is no
//! floating point anywhere in this module.
//!
//! Reference:
//! https://developer.bitcoin.org/reference/transactions.html#raw-transaction-format

use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::codec::{encode_varint, hash256, read_array, read_varint};
use crate::error::{Result, ValidationError};
use crate::network::Network;
use crate::script::{Script, ScriptEvaluator};
use crate::signer::Signer;
use crate::utxo::UtxoResolver;

/// Sighash type covered by every signature this core produces.
pub const SIGHASH_ALL: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxIn {
    /// Referenced transaction id, display order.
    pub prev_tx: [u8; 32],
    pub prev_index: u32,
    pub script_sig: Script,
    pub sequence: u32,
}

impl TxIn {
    /// An input with an empty unlocking script and final sequence,
    /// awaiting a signature.
    pub fn new(prev_tx: [u8; 32], prev_index: u32) -> Self {
        TxIn {
            prev_tx,
            prev_index,
            script_sig: Script::new(),
            sequence: 0xffff_ffff,
        }
    }

    pub fn parse<R: Read>(reader: &mut R) -> Result<Self> {
        let mut prev_tx = read_array::<32, _>(reader)?;
        prev_tx.reverse();
        let prev_index = reader.read_u32::<LittleEndian>()?;
        let script_sig = Script::parse(reader)?;
        let sequence = reader.read_u32::<LittleEndian>()?;
        Ok(TxIn {
            prev_tx,
            prev_index,
            script_sig,
            sequence,
        })
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut prev_tx = self.prev_tx;
        prev_tx.reverse();
        out.extend(prev_tx);
        out.extend(self.prev_index.to_le_bytes());
        out.extend(self.script_sig.serialize());
        out.extend(self.sequence.to_le_bytes());
        out
    }

    /// Hex id of the referenced transaction, as used for resolver lookups.
    pub fn prev_tx_id(&self) -> String {
        hex::encode(self.prev_tx)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOut {
    /// Amount in satoshis.
    pub amount: u64,
    pub script_pubkey: Script,
}

impl TxOut {
    pub fn new(amount: u64, script_pubkey: Script) -> Self {
        TxOut {
            amount,
            script_pubkey,
        }
    }

    pub fn parse<R: Read>(reader: &mut R) -> Result<Self> {
        let amount = reader.read_u64::<LittleEndian>()?;
        let script_pubkey = Script::parse(reader)?;
        Ok(TxOut {
            amount,
            script_pubkey,
        })
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend(self.amount.to_le_bytes());
        out.extend(self.script_pubkey.serialize());
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tx {
    pub version: i32,
    pub inputs: Vec<TxIn>,
    pub outputs: Vec<TxOut>,
    pub locktime: u32,
    /// Which network's chain data resolves this transaction's inputs.
    /// Never serialized.
    pub network: Network,
}

impl Tx {
    pub fn new(version: i32, inputs: Vec<TxIn>, outputs: Vec<TxOut>, locktime: u32) -> Self {
        Tx {
            version,
            inputs,
            outputs,
            locktime,
            network: Network::default(),
        }
    }

    pub fn parse<R: Read>(reader: &mut R, network: Network) -> Result<Self> {
        let version = reader.read_i32::<LittleEndian>()?;

        let input_count = read_varint(reader)?;
        let mut inputs = Vec::with_capacity(input_count as usize);
        for _ in 0..input_count {
            inputs.push(TxIn::parse(reader)?);
        }

        let output_count = read_varint(reader)?;
        let mut outputs = Vec::with_capacity(output_count as usize);
        for _ in 0..output_count {
            outputs.push(TxOut::parse(reader)?);
        }

        let locktime = reader.read_u32::<LittleEndian>()?;

        Ok(Tx {
            version,
            inputs,
            outputs,
            locktime,
            network,
        })
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend(self.version.to_le_bytes());
        out.extend(encode_varint(self.inputs.len() as u64));
        for input in &self.inputs {
            out.extend(input.serialize());
        }
        out.extend(encode_varint(self.outputs.len() as u64));
        for output in &self.outputs {
            out.extend(output.serialize());
        }
        out.extend(self.locktime.to_le_bytes());
        out
    }

    /// Double SHA256 of the serialization, byte-reversed for display.
    pub fn hash(&self) -> [u8; 32] {
        let mut digest = hash256(&self.serialize());
        digest.reverse();
        digest
    }

    /// Hex transaction id.
    pub fn id(&self) -> String {
        hex::encode(self.hash())
    }

    /// Sum of resolved input values minus sum of output amounts.
    ///
    /// A negative fee means the transaction creates money out of thin air;
    /// the caller must treat it as invalid.
    pub fn fee(&self, resolver: &dyn UtxoResolver) -> Result<i64> {
        let mut input_sum: i64 = 0;
        for input in &self.inputs {
            let prev_out = self.resolve_output(input, resolver)?;
            input_sum += prev_out.amount as i64;
        }
        let output_sum: i64 = self.outputs.iter().map(|o| o.amount as i64).sum();
        Ok(input_sum - output_sum)
    }

    /// The signature hash for one input under SIGHASH_ALL.
    ///
    /// The whole transaction is re-serialized with the unlocking script of
    /// the input at `input_index` replaced by the referenced output's
    /// locking script and every other unlocking script blanked, then the
    /// 4-byte sighash type is appended and the result double-hashed. The
    /// returned bytes are the big-endian integer a signature must cover —
    /// any other byte layout produces an unverifiable signature.
    pub fn sig_hash(&self, input_index: usize, resolver: &dyn UtxoResolver) -> Result<[u8; 32]> {
        let signing_input = self
            .inputs
            .get(input_index)
            .ok_or(ValidationError::InputIndex(input_index))?;
        let locking_script = self.resolve_output(signing_input, resolver)?.script_pubkey;

        let mut preimage = Vec::new();
        preimage.extend(self.version.to_le_bytes());
        preimage.extend(encode_varint(self.inputs.len() as u64));
        for (i, input) in self.inputs.iter().enumerate() {
            let script_sig = if i == input_index {
                locking_script.clone()
            } else {
                Script::new()
            };
            let substitute = TxIn {
                prev_tx: input.prev_tx,
                prev_index: input.prev_index,
                script_sig,
                sequence: input.sequence,
            };
            preimage.extend(substitute.serialize());
        }
        preimage.extend(encode_varint(self.outputs.len() as u64));
        for output in &self.outputs {
            preimage.extend(output.serialize());
        }
        preimage.extend(self.locktime.to_le_bytes());
        preimage.extend(SIGHASH_ALL.to_le_bytes());

        Ok(hash256(&preimage))
    }

    /// Checks one input's unlocking script against the referenced output.
    pub fn verify_input(
        &self,
        input_index: usize,
        resolver: &dyn UtxoResolver,
        evaluator: &dyn ScriptEvaluator,
    ) -> Result<bool> {
        let input = self
            .inputs
            .get(input_index)
            .ok_or(ValidationError::InputIndex(input_index))?;
        let locking_script = self.resolve_output(input, resolver)?.script_pubkey;
        let z = self.sig_hash(input_index, resolver)?;
        let combined = input.script_sig.clone() + locking_script;
        Ok(evaluator.evaluate(&combined, &z))
    }

    /// A transaction is valid iff it does not create money and every input
    /// passes script verification. Short-circuits on the first failure.
    pub fn verify(
        &self,
        resolver: &dyn UtxoResolver,
        evaluator: &dyn ScriptEvaluator,
    ) -> Result<bool> {
        if self.fee(resolver)? < 0 {
            return Ok(false);
        }
        for i in 0..self.inputs.len() {
            if !self.verify_input(i, resolver, evaluator)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Signs one input and installs the unlocking script, then immediately
    /// re-verifies it as a fail-fast sanity check.
    pub fn sign_input(
        &mut self,
        input_index: usize,
        signer: &dyn Signer,
        resolver: &dyn UtxoResolver,
        evaluator: &dyn ScriptEvaluator,
    ) -> Result<bool> {
        let z = self.sig_hash(input_index, resolver)?;
        let mut signature = signer.sign(&z).der().to_vec();
        signature.push(SIGHASH_ALL as u8);
        let script_sig = Script::p2pkh_unlock(&signature, &signer.public_key_bytes());

        self.inputs
            .get_mut(input_index)
            .ok_or(ValidationError::InputIndex(input_index))?
            .script_sig = script_sig;

        self.verify_input(input_index, resolver, evaluator)
    }

    /// Exactly one input spending the synthetic all-zero outpoint.
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1
            && self.inputs[0].prev_tx == [0u8; 32]
            && self.inputs[0].prev_index == 0xffff_ffff
    }

    fn resolve_output(&self, input: &TxIn, resolver: &dyn UtxoResolver) -> Result<TxOut> {
        let prev_tx = resolver.fetch(&input.prev_tx_id(), self.network)?;
        prev_tx
            .outputs
            .get(input.prev_index as usize)
            .cloned()
            .ok_or_else(|| ValidationError::OutputIndex(input.prev_index).into())
    }
}

/// A spendable output as reported by a chain-data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spendable {
    /// Hex transaction id, display order.
    pub txid: String,
    pub vout: u32,
    /// Value in satoshis.
    pub value: u64,
}

/// Builds an unsigned P2PKH transaction spending `spendables` in order
/// until `amount + fee` is covered, paying `to_address` and returning any
/// surplus to `change_address`.
pub fn build_p2pkh_tx(
    spendables: &[Spendable],
    to_address: &str,
    change_address: &str,
    amount: u64,
    fee: u64,
    network: Network,
) -> Result<Tx> {
    let required = amount
        .checked_add(fee)
        .ok_or(ValidationError::AmountOverflow)?;
    let mut inputs = Vec::new();
    let mut total_input = 0u64;

    for spendable in spendables {
        let mut prev_tx = [0u8; 32];
        let raw = hex::decode(&spendable.txid)
            .map_err(|e| ValidationError::BadHex(e.to_string()))?;
        if raw.len() != 32 {
            return Err(ValidationError::BadHex(spendable.txid.clone()).into());
        }
        prev_tx.copy_from_slice(&raw);

        inputs.push(TxIn::new(prev_tx, spendable.vout));
        total_input = total_input
            .checked_add(spendable.value)
            .ok_or(ValidationError::AmountOverflow)?;
        if total_input >= required {
            break;
        }
    }

    if total_input < required {
        return Err(ValidationError::InsufficientFunds {
            available: total_input,
            required,
        }
        .into());
    }

    let to_h160 = crate::codec::decode_base58(to_address)?;
    let mut outputs = vec![TxOut::new(amount, Script::p2pkh(&to_h160))];

    let change = total_input - required;
    if change > 0 {
        let change_h160 = crate::codec::decode_base58(change_address)?;
        outputs.push(TxOut::new(change, Script::p2pkh(&change_h160)));
    }

    let mut tx = Tx::new(1, inputs, outputs, 0);
    tx.network = network;
    Ok(tx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Cursor;

    use secp256k1::{Message, Secp256k1};

    use crate::codec::{encode_base58_checksum, hash160};
    use crate::signer::KeyPair;

    /// 1-input 2-output P2PKH transaction from mainnet block 465879.
    const RAW_TX: &str = "0100000001813f79011acb80925dfe69b3def355fe914bd1d96a3f5f71bf83\
                          03c6a989c7d1000000006b483045022100ed81ff192e75a3fd2304004dcadb\
                          746fa5e24c5031ccfcf21320b0277457c98f02207a986d955c6e0cb35d446a\
                          89d3f56100f4d7f67801c31967743a9c8e10615bed01210349fc4e631e3624\
                          a545de3f89f5d8684c7b8138bd94bdd531d2e213bf016b278afeffffff02a1\
                          35ef01000000001976a914bc3b654dca7e56b04dca18f2566cdaf02e8d9ada\
                          88ac99c39800000000001976a9141c4bc762dd5423e332166702cb75f40df7\
                          9fea1288ac19430600";

    fn raw_tx_bytes() -> Vec<u8> {
        let hex_str: String = RAW_TX.split_whitespace().collect();
        hex::decode(hex_str).unwrap()
    }

    fn parse_raw_tx() -> Tx {
        Tx::parse(&mut Cursor::new(raw_tx_bytes()), Network::Mainnet).unwrap()
    }

    /// Resolver backed by an in-memory map, keyed by hex txid.
    struct MapResolver {
        txs: HashMap<String, Tx>,
    }

    impl MapResolver {
        fn with(txs: Vec<Tx>) -> Self {
            let txs = txs.into_iter().map(|tx| (tx.id(), tx)).collect();
            MapResolver { txs }
        }
    }

    impl UtxoResolver for MapResolver {
        fn fetch(&self, txid: &str, network: Network) -> crate::error::Result<Tx> {
            self.txs
                .get(txid)
                .map(|tx| {
                    let mut tx = tx.clone();
                    tx.network = network;
                    tx
                })
                .ok_or_else(|| {
                    ValidationError::TxIdMismatch {
                        got: "missing".into(),
                        requested: txid.into(),
                    }
                    .into()
                })
        }
    }

    /// Test-only P2PKH evaluator: checks the pubkey hash and the ECDSA
    /// signature without a general script machine.
    struct P2pkhEvaluator;

    impl ScriptEvaluator for P2pkhEvaluator {
        fn evaluate(&self, combined: &Script, z: &[u8; 32]) -> bool {
            let raw = combined.as_bytes();
            // <push sig> <push sec> OP_DUP OP_HASH160 <push h160> OP_EQUALVERIFY OP_CHECKSIG
            let Some((&sig_len, rest)) = raw.split_first() else {
                return false;
            };
            let sig_len = sig_len as usize;
            if rest.len() < sig_len + 1 {
                return false;
            }
            let (sig_with_type, rest) = rest.split_at(sig_len);
            let (&sec_len, rest) = rest.split_first().unwrap();
            let sec_len = sec_len as usize;
            if rest.len() < sec_len {
                return false;
            }
            let (sec, lock) = rest.split_at(sec_len);

            if lock.len() != 25 || lock[..3] != [0x76, 0xa9, 0x14] || lock[23..] != [0x88, 0xac] {
                return false;
            }
            if hash160(sec) != lock[3..23] {
                return false;
            }

            let Some((_, der)) = sig_with_type.split_last() else {
                return false;
            };
            let secp = Secp256k1::new();
            let Ok(pubkey) = secp256k1::PublicKey::from_slice(sec) else {
                return false;
            };
            let Ok(sig) = secp256k1::ecdsa::Signature::from_der(der) else {
                return false;
            };
            secp.verify_ecdsa(&Message::from_digest(*z), &sig, &pubkey).is_ok()
        }
    }

    /// A funding transaction paying `value` to the key's pubkey hash, plus
    /// a spend of its first output.
    fn funded_pair(key: &KeyPair, value: u64, spend_outputs: Vec<TxOut>) -> (Tx, Tx) {
        let h160 = hash160(&key.public_key_bytes());
        let funding = Tx::new(
            1,
            vec![TxIn::new([0x11; 32], 0)],
            vec![TxOut::new(value, Script::p2pkh(&h160))],
            0,
        );

        let mut prev_tx = [0u8; 32];
        prev_tx.copy_from_slice(&hex::decode(funding.id()).unwrap());
        let spend = Tx::new(1, vec![TxIn::new(prev_tx, 0)], spend_outputs, 0);
        (funding, spend)
    }

    fn test_address(seed: &[u8]) -> String {
        let mut payload = vec![Network::Testnet.p2pkh_prefix()];
        payload.extend(hash160(seed));
        encode_base58_checksum(&payload)
    }

    #[test]
    fn parse_known_transaction_fields() {
        let tx = parse_raw_tx();

        assert_eq!(tx.version, 1);
        assert_eq!(tx.inputs.len(), 1);
        assert_eq!(
            tx.inputs[0].prev_tx_id(),
            "d1c789a9c60383bf715f3f6ad9d14b91fe55f3deb369fe5d9280cb1a01793f81"
        );
        assert_eq!(tx.inputs[0].prev_index, 0);
        assert_eq!(tx.inputs[0].sequence, 0xfffffffe);
        assert_eq!(tx.inputs[0].script_sig.as_bytes().len(), 107);

        assert_eq!(tx.outputs.len(), 2);
        assert_eq!(tx.outputs[0].amount, 32454049);
        assert_eq!(tx.outputs[1].amount, 10011545);
        assert_eq!(tx.outputs[0].script_pubkey.as_bytes().len(), 25);

        assert_eq!(tx.locktime, 410393);
    }

    #[test]
    fn serialize_reproduces_parsed_bytes() {
        assert_eq!(parse_raw_tx().serialize(), raw_tx_bytes());
    }

    #[test]
    fn truncated_transaction_is_an_error() {
        let raw = raw_tx_bytes();
        assert!(Tx::parse(&mut Cursor::new(&raw[..raw.len() - 1]), Network::Mainnet).is_err());
    }

    #[test]
    fn fee_is_inputs_minus_outputs() {
        let key = KeyPair::generate();
        let (funding, spend) = funded_pair(
            &key,
            100_000,
            vec![TxOut::new(60_000, Script::new()), TxOut::new(39_000, Script::new())],
        );
        let resolver = MapResolver::with(vec![funding]);
        assert_eq!(spend.fee(&resolver).unwrap(), 1_000);
    }

    #[test]
    fn negative_fee_fails_verification() {
        let key = KeyPair::generate();
        let (funding, spend) =
            funded_pair(&key, 100_000, vec![TxOut::new(200_000, Script::new())]);
        let resolver = MapResolver::with(vec![funding]);

        assert_eq!(spend.fee(&resolver).unwrap(), -100_000);
        assert!(!spend.verify(&resolver, &P2pkhEvaluator).unwrap());
    }

    #[test]
    fn sig_hash_is_deterministic() {
        let key = KeyPair::generate();
        let (funding, spend) =
            funded_pair(&key, 100_000, vec![TxOut::new(90_000, Script::new())]);
        let resolver = MapResolver::with(vec![funding]);

        let first = spend.sig_hash(0, &resolver).unwrap();
        let second = spend.sig_hash(0, &resolver).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn sig_hash_changes_with_outputs() {
        let key = KeyPair::generate();
        let (funding, spend) =
            funded_pair(&key, 100_000, vec![TxOut::new(90_000, Script::new())]);
        let (_, other_spend) =
            funded_pair(&key, 100_000, vec![TxOut::new(80_000, Script::new())]);
        let resolver = MapResolver::with(vec![funding]);

        assert_ne!(
            spend.sig_hash(0, &resolver).unwrap(),
            other_spend.sig_hash(0, &resolver).unwrap()
        );
    }

    #[test]
    fn sig_hash_out_of_range_input_is_an_error() {
        let key = KeyPair::generate();
        let (funding, spend) =
            funded_pair(&key, 100_000, vec![TxOut::new(90_000, Script::new())]);
        let resolver = MapResolver::with(vec![funding]);
        assert!(spend.sig_hash(1, &resolver).is_err());
    }

    #[test]
    fn sign_input_installs_verifiable_script() {
        let key = KeyPair::generate();
        let dest = hash160(b"destination");
        let (funding, mut spend) =
            funded_pair(&key, 100_000, vec![TxOut::new(90_000, Script::p2pkh(&dest))]);
        let resolver = MapResolver::with(vec![funding]);

        assert!(spend.inputs[0].script_sig.is_empty());
        let ok = spend
            .sign_input(0, &key, &resolver, &P2pkhEvaluator)
            .unwrap();
        assert!(ok);
        assert!(!spend.inputs[0].script_sig.is_empty());
        assert!(spend.verify(&resolver, &P2pkhEvaluator).unwrap());
    }

    #[test]
    fn signature_from_wrong_key_fails_verification() {
        let key = KeyPair::generate();
        let intruder = KeyPair::generate();
        let (funding, mut spend) =
            funded_pair(&key, 100_000, vec![TxOut::new(90_000, Script::new())]);
        let resolver = MapResolver::with(vec![funding]);

        let ok = spend
            .sign_input(0, &intruder, &resolver, &P2pkhEvaluator)
            .unwrap();
        assert!(!ok);
    }

    #[test]
    fn coinbase_detection() {
        let coinbase = Tx::new(1, vec![TxIn::new([0u8; 32], 0xffff_ffff)], vec![], 0);
        assert!(coinbase.is_coinbase());

        let wrong_index = Tx::new(1, vec![TxIn::new([0u8; 32], 0)], vec![], 0);
        assert!(!wrong_index.is_coinbase());

        let wrong_prev = Tx::new(1, vec![TxIn::new([1u8; 32], 0xffff_ffff)], vec![], 0);
        assert!(!wrong_prev.is_coinbase());

        let two_inputs = Tx::new(
            1,
            vec![
                TxIn::new([0u8; 32], 0xffff_ffff),
                TxIn::new([0u8; 32], 0xffff_ffff),
            ],
            vec![],
            0,
        );
        assert!(!two_inputs.is_coinbase());

        assert!(!parse_raw_tx().is_coinbase());
    }

    #[test]
    fn build_selects_inputs_until_covered() {
        let spendables = vec![
            Spendable {
                txid: "11".repeat(32),
                vout: 0,
                value: 30_000,
            },
            Spendable {
                txid: "22".repeat(32),
                vout: 1,
                value: 40_000,
            },
            Spendable {
                txid: "33".repeat(32),
                vout: 0,
                value: 50_000,
            },
        ];
        let to = test_address(b"to");
        let change = test_address(b"change");

        let tx = build_p2pkh_tx(&spendables, &to, &change, 60_000, 1_000, Network::Testnet)
            .unwrap();

        // First two spendables cover 61_000; the third stays unspent.
        assert_eq!(tx.inputs.len(), 2);
        assert_eq!(tx.inputs[1].prev_index, 1);
        assert_eq!(tx.outputs.len(), 2);
        assert_eq!(tx.outputs[0].amount, 60_000);
        assert_eq!(tx.outputs[1].amount, 9_000);
        assert_eq!(
            tx.outputs[0].script_pubkey,
            Script::p2pkh(&hash160(b"to"))
        );
    }

    #[test]
    fn build_omits_zero_change_output() {
        let spendables = vec![Spendable {
            txid: "aa".repeat(32),
            vout: 0,
            value: 10_000,
        }];
        let to = test_address(b"to");
        let change = test_address(b"change");

        let tx =
            build_p2pkh_tx(&spendables, &to, &change, 9_500, 500, Network::Testnet).unwrap();
        assert_eq!(tx.outputs.len(), 1);
    }

    #[test]
    fn build_rejects_amounts_overflowing_satoshi_range() {
        let to = test_address(b"to");
        let change = test_address(b"change");

        let spendables = vec![Spendable {
            txid: "aa".repeat(32),
            vout: 0,
            value: 1_000,
        }];
        let err = build_p2pkh_tx(&spendables, &to, &change, u64::MAX, 1, Network::Testnet)
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Validation(ValidationError::AmountOverflow)
        ));

        // Input values that wrap u64 while still short of the target.
        let spendables = vec![
            Spendable {
                txid: "bb".repeat(32),
                vout: 0,
                value: u64::MAX - 1,
            },
            Spendable {
                txid: "cc".repeat(32),
                vout: 0,
                value: 2,
            },
        ];
        let err = build_p2pkh_tx(&spendables, &to, &change, u64::MAX, 0, Network::Testnet)
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Validation(ValidationError::AmountOverflow)
        ));
    }

    #[test]
    fn build_rejects_insufficient_funds() {
        let spendables = vec![Spendable {
            txid: "aa".repeat(32),
            vout: 0,
            value: 1_000,
        }];
        let to = test_address(b"to");
        let change = test_address(b"change");

        let err = build_p2pkh_tx(&spendables, &to, &change, 5_000, 500, Network::Testnet)
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Validation(ValidationError::InsufficientFunds {
                available: 1_000,
                required: 5_500,
            })
        ));
    }
}

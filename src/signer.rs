//! Signing capability and its secp256k1 adapter.
//!
//! The transaction core only needs three things from a signer: a DER
//! signature over a 32-byte signature hash, the SEC-encoded public key,
//! and an address for that key. The curve math itself stays in the
//! `secp256k1` crate; this module is the thin seam between the two.

use rand::rngs::OsRng;
use secp256k1::{All, Message, PublicKey, Secp256k1, SecretKey};

use crate::codec::{encode_base58_checksum, hash160};
use crate::network::Network;

/// A DER-encoded ECDSA signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    der: Vec<u8>,
}

impl Signature {
    pub fn from_der(der: Vec<u8>) -> Self {
        Signature { der }
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }
}

/// Signing capability consumed by [`crate::tx::Tx::sign_input`].
pub trait Signer {
    /// Signs the 32-byte signature hash (big-endian integer bytes).
    fn sign(&self, z: &[u8; 32]) -> Signature;

    /// SEC-encoded public key installed next to the signature in the
    /// unlocking script.
    fn public_key_bytes(&self) -> Vec<u8>;
}

/// A secp256k1-backed key pair.
#[derive(Clone)]
pub struct KeyPair {
    secp: Secp256k1<All>,
    secret_key: SecretKey,
    public_key: PublicKey,
    compressed: bool,
}

impl KeyPair {
    /// Generates a fresh random key pair (compressed public key).
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let (secret_key, public_key) = secp.generate_keypair(&mut OsRng);
        KeyPair {
            secp,
            secret_key,
            public_key,
            compressed: true,
        }
    }

    pub fn from_secret_key(secret_key: SecretKey, compressed: bool) -> Self {
        let secp = Secp256k1::new();
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        KeyPair {
            secp,
            secret_key,
            public_key,
            compressed,
        }
    }

    /// Base58Check P2PKH address for this key on the given network.
    pub fn address(&self, network: Network) -> String {
        let h160 = hash160(&self.public_key_bytes());
        let mut payload = vec![network.p2pkh_prefix()];
        payload.extend(h160);
        encode_base58_checksum(&payload)
    }

    /// Wallet import format encoding of the secret key.
    pub fn wif(&self, network: Network) -> String {
        let mut payload = vec![network.wif_prefix()];
        payload.extend(self.secret_key.secret_bytes());
        if self.compressed {
            payload.push(0x01);
        }
        encode_base58_checksum(&payload)
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }
}

impl Signer for KeyPair {
    fn sign(&self, z: &[u8; 32]) -> Signature {
        let message = Message::from_digest(*z);
        let sig = self.secp.sign_ecdsa(&message, &self.secret_key);
        Signature::from_der(sig.serialize_der().to_vec())
    }

    fn public_key_bytes(&self) -> Vec<u8> {
        if self.compressed {
            self.public_key.serialize().to_vec()
        } else {
            self.public_key.serialize_uncompressed().to_vec()
        }
    }
}

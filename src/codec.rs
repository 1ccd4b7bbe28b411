//! Canonical binary primitives shared by every other component.
//!
//! Everything here is pure: fixed-width little-endian integer conversion,
//! CompactSize varints, the double-SHA256 and SHA256+RIPEMD160 hashes,
//! Base58 with checksum, and the compact-target ("bits") encoding used by
//! proof of work, including the difficulty-retarget formula.
//!
//! An off-by-one or endianness mistake in this module silently produces
//! invalid signatures and unparseable messages downstream, so the tests
//! lean on fixed wire vectors rather than synthetic data.

use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};
use num_bigint::BigUint;
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use crate::error::{EncodingError, Error, Result, ValidationError};

/// Seconds in the 2016-block difficulty adjustment period.
pub const TWO_WEEKS: u64 = 60 * 60 * 24 * 14;

/// Base58 alphabet: 58 characters, excluding the visually ambiguous
/// `0`, `O`, `I` and `l`.
const BASE58_ALPHABET: &[u8; 58] =
    b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Double SHA256, used throughout the protocol for identifiers and
/// checksums.
pub fn hash256(data: &[u8]) -> [u8; 32] {
    let digest = Sha256::digest(Sha256::digest(data));
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// SHA256 followed by RIPEMD160, used for address payloads.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let digest = Ripemd160::digest(Sha256::digest(data));
    let mut out = [0u8; 20];
    out.copy_from_slice(&digest);
    out
}

/// Converts `n` to exactly `length` little-endian bytes.
///
/// Values that do not fit are an error, never a silent truncation.
pub fn int_to_little_endian(n: u64, length: usize) -> Result<Vec<u8>> {
    if length > 8 {
        return Err(EncodingError::FieldTooWide(length).into());
    }
    if length < 8 && n >= 1u64 << (length * 8) {
        return Err(EncodingError::IntegerTooLarge(n, length).into());
    }
    Ok(n.to_le_bytes()[..length].to_vec())
}

/// Reads a little-endian unsigned integer from up to 8 bytes.
pub fn little_endian_to_int(bytes: &[u8]) -> Result<u64> {
    if bytes.len() > 8 {
        return Err(EncodingError::FieldTooWide(bytes.len()).into());
    }
    let mut buf = [0u8; 8];
    buf[..bytes.len()].copy_from_slice(bytes);
    Ok(u64::from_le_bytes(buf))
}

/// Reads exactly `N` bytes from the stream.
pub fn read_array<const N: usize, R: Read>(reader: &mut R) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

/// Reads a CompactSize varint.
///
/// The prefix byte selects the width; the implied width is trusted as-is,
/// so non-canonical (longer than necessary) encodings are accepted on the
/// way in. Encoding is canonical, see [`encode_varint`].
pub fn read_varint<R: Read>(reader: &mut R) -> Result<u64> {
    let prefix = reader.read_u8()?;
    match prefix {
        0xfd => Ok(reader.read_u16::<LittleEndian>()? as u64),
        0xfe => Ok(reader.read_u32::<LittleEndian>()? as u64),
        0xff => Ok(reader.read_u64::<LittleEndian>()?),
        n => Ok(n as u64),
    }
}

/// Encodes a CompactSize varint, always choosing the shortest valid form.
pub fn encode_varint(n: u64) -> Vec<u8> {
    match n {
        0..=0xfc => vec![n as u8],
        0xfd..=0xffff => {
            let mut out = vec![0xfd];
            out.extend(&(n as u16).to_le_bytes());
            out
        }
        0x1_0000..=0xffff_ffff => {
            let mut out = vec![0xfe];
            out.extend(&(n as u32).to_le_bytes());
            out
        }
        _ => {
            let mut out = vec![0xff];
            out.extend(&n.to_le_bytes());
            out
        }
    }
}

/// Encodes bytes as Base58. Leading zero bytes map to leading `'1'`s.
pub fn encode_base58(data: &[u8]) -> String {
    let zeros = data.iter().take_while(|&&b| b == 0).count();
    let mut num = BigUint::from_bytes_be(data);
    let fifty_eight = BigUint::from(58u32);
    let zero = BigUint::from(0u32);

    let mut encoded = Vec::new();
    while num > zero {
        let rem = (&num % &fifty_eight).to_u32_digits();
        let digit = rem.first().copied().unwrap_or(0) as usize;
        encoded.push(BASE58_ALPHABET[digit]);
        num /= &fifty_eight;
    }
    let mut out = vec![b'1'; zeros];
    encoded.reverse();
    out.extend(encoded);
    // The alphabet is pure ASCII.
    out.into_iter().map(char::from).collect()
}

/// Base58 with a 4-byte double-SHA256 checksum suffix.
pub fn encode_base58_checksum(data: &[u8]) -> String {
    let mut payload = data.to_vec();
    payload.extend(&hash256(data)[..4]);
    encode_base58(&payload)
}

/// Decodes a Base58Check address into its 20-byte payload.
///
/// The combined value is fixed at 25 bytes: 1 version byte, 20 payload
/// bytes, 4 checksum bytes. Shorter values are zero-padded on the left
/// (numeric semantics); values that need more than 25 bytes are rejected
/// rather than misaligning the checksum split.
pub fn decode_base58(s: &str) -> Result<[u8; 20]> {
    let mut num = BigUint::from(0u32);
    for c in s.chars() {
        let digit = BASE58_ALPHABET
            .iter()
            .position(|&a| a as char == c)
            .ok_or(ValidationError::Base58Character(c))?;
        num = num * 58u32 + digit;
    }

    let raw = num.to_bytes_be();
    if raw.len() > 25 {
        return Err(ValidationError::Base58Overflow.into());
    }
    let mut combined = [0u8; 25];
    combined[25 - raw.len()..].copy_from_slice(&raw);

    let checksum = &combined[21..];
    let computed = &hash256(&combined[..21])[..4];
    if checksum != computed {
        return Err(Error::Validation(ValidationError::Base58Checksum {
            got: hex::encode(checksum),
            computed: hex::encode(computed),
        }));
    }

    let mut payload = [0u8; 20];
    payload.copy_from_slice(&combined[1..21]);
    Ok(payload)
}

/// Expands 4 compact bits into the 256-bit target integer.
///
/// Layout is `[coefficient_low, coefficient_mid, coefficient_high,
/// exponent]`: the target is `coefficient * 256^(exponent - 3)`.
pub fn bits_to_target(bits: [u8; 4]) -> BigUint {
    let exponent = bits[3] as u32;
    let coefficient = BigUint::from_bytes_le(&bits[..3]);
    coefficient * BigUint::from(256u32).pow(exponent.saturating_sub(3))
}

/// Compacts a 256-bit target back into 4 bits.
///
/// Leading zero bytes are stripped; if the most significant remaining byte
/// has its top bit set, one zero byte is shifted back in and the exponent
/// bumped, so the coefficient is never misread as a sign bit.
pub fn target_to_bits(target: &BigUint) -> Result<[u8; 4]> {
    let raw = target.to_bytes_be();
    if raw.len() > 32 || target == &BigUint::from(0u32) {
        return Err(EncodingError::TargetTooLarge.into());
    }

    let (exponent, coefficient) = if raw[0] > 0x7f {
        (raw.len() + 1, [0x00, raw[0], *raw.get(1).unwrap_or(&0)])
    } else {
        (
            raw.len(),
            [raw[0], *raw.get(1).unwrap_or(&0), *raw.get(2).unwrap_or(&0)],
        )
    };

    // Coefficient goes on the wire little-endian, exponent last.
    Ok([coefficient[2], coefficient[1], coefficient[0], exponent as u8])
}

/// The maximum (lowest-difficulty) target, `0xffff * 256^(0x1d - 3)`.
pub fn max_target() -> BigUint {
    BigUint::from(0xffffu32) * BigUint::from(256u32).pow(0x1d - 3)
}

/// Recomputes the compact target after a 2016-block period.
///
/// The elapsed time is clamped into `[TWO_WEEKS/4, TWO_WEEKS*4]` so a
/// single period can never swing difficulty by more than 4x in either
/// direction, then the target is scaled proportionally (floor division)
/// and capped at [`max_target`].
pub fn calculate_new_bits(previous_bits: [u8; 4], time_differential: u64) -> Result<[u8; 4]> {
    let clamped = time_differential.clamp(TWO_WEEKS / 4, TWO_WEEKS * 4);

    let mut new_target = bits_to_target(previous_bits) * clamped / TWO_WEEKS;
    let cap = max_target();
    if new_target > cap {
        new_target = cap;
    }
    target_to_bits(&new_target)
}

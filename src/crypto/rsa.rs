//! RSA encryption/decryption module
//!
//! From-scratch RSA over `num-bigint`: plain modular exponentiation plus
//! PKCS#1 v1.5 block formatting. The handshake uses it as a transport wrap
//! for Diffie-Hellman values, encrypting outbound material with the private
//! exponent so that any holder of the public half can recover it.
//!
//! The padding here is the legacy full-byte variant (block type 1, 0xFF
//! fill). It is deterministic and therefore weaker than random padding; the
//! protocol this crate speaks fixes it, so it is kept as-is. Unpadding is
//! checked for correctness, not for timing uniformity.

use std::fmt;

use num_bigint::BigUint;
use num_traits::Zero;
use rand::Rng;

use crate::error::{KexError, Result, RsaError};

/// Minimum padding overhead: leading zero, block type, eight padding bytes
/// and the zero separator.
const MIN_PAD_OVERHEAD: usize = 11;

/// PKCS#1 v1.5 block type selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PadType {
    /// Deterministic 0xFF fill (the variant this protocol uses)
    FullByte = 1,
    /// Random non-zero fill
    RandomByte = 2,
}

impl PadType {
    /// Get the block type byte
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Which half of the key an operation applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyHalf {
    /// The public exponent E
    Public,
    /// The private exponent D
    Private,
}

/// Chinese-remainder components of a private key.
///
/// Retained as key material; the exponentiation path uses plain `modpow`
/// with D and never consults these.
#[derive(Clone)]
pub struct CrtComponents {
    pub p: BigUint,
    pub q: BigUint,
    pub dmp1: BigUint,
    pub dmq1: BigUint,
    pub coeff: BigUint,
}

/// An RSA key: public material, optionally the private exponent.
///
/// Immutable after construction. A key built with only N and E can encrypt
/// and verify; decrypting and signing additionally require D.
#[derive(Clone)]
pub struct RsaKey {
    /// RSA modulus (N)
    modulus: BigUint,
    /// RSA public exponent (E), typically 65537
    public_exponent: BigUint,
    /// RSA private exponent (D), absent on public-only keys
    private_exponent: Option<BigUint>,
    /// Optional CRT key material
    crt: Option<CrtComponents>,
}

/// Parse one base-10 key component, naming it on failure.
fn parse_decimal(name: &str, value: &str) -> Result<BigUint> {
    BigUint::parse_bytes(value.as_bytes(), 10).ok_or_else(|| {
        KexError::Rsa(RsaError::InvalidKeyComponent(format!(
            "{name} is not a base-10 integer"
        )))
    })
}

impl RsaKey {
    /// Create a key from raw BigUint values
    pub fn new(
        modulus: BigUint,
        public_exponent: BigUint,
        private_exponent: Option<BigUint>,
    ) -> Result<Self> {
        if modulus.is_zero() {
            return Err(KexError::Rsa(RsaError::InvalidKeyComponent(
                "modulus is zero".to_string(),
            )));
        }
        if public_exponent.is_zero() {
            return Err(KexError::Rsa(RsaError::InvalidKeyComponent(
                "public exponent is zero".to_string(),
            )));
        }
        Ok(Self {
            modulus,
            public_exponent,
            private_exponent,
            crt: None,
        })
    }

    /// Create a public-only key from base-10 strings
    pub fn public_from_decimal(modulus: &str, public_exponent: &str) -> Result<Self> {
        Self::new(
            parse_decimal("modulus", modulus)?,
            parse_decimal("public exponent", public_exponent)?,
            None,
        )
    }

    /// Create a full key from base-10 strings
    pub fn private_from_decimal(
        modulus: &str,
        public_exponent: &str,
        private_exponent: &str,
    ) -> Result<Self> {
        Self::new(
            parse_decimal("modulus", modulus)?,
            parse_decimal("public exponent", public_exponent)?,
            Some(parse_decimal("private exponent", private_exponent)?),
        )
    }

    /// Create a full key with CRT material from base-10 strings
    pub fn private_from_decimal_crt(
        modulus: &str,
        public_exponent: &str,
        private_exponent: &str,
        p: &str,
        q: &str,
        dmp1: &str,
        dmq1: &str,
        coeff: &str,
    ) -> Result<Self> {
        let key = Self::private_from_decimal(modulus, public_exponent, private_exponent)?;
        Ok(key.with_crt(CrtComponents {
            p: parse_decimal("p", p)?,
            q: parse_decimal("q", q)?,
            dmp1: parse_decimal("dmp1", dmp1)?,
            dmq1: parse_decimal("dmq1", dmq1)?,
            coeff: parse_decimal("coeff", coeff)?,
        }))
    }

    /// Attach CRT key material to a full key
    pub fn with_crt(mut self, crt: CrtComponents) -> Self {
        self.crt = Some(crt);
        self
    }

    /// Whether this key can perform public-half operations
    pub fn can_encrypt(&self) -> bool {
        // N and E are mandatory at construction
        true
    }

    /// Whether this key can perform private-half operations
    pub fn can_decrypt(&self) -> bool {
        self.private_exponent.is_some()
    }

    /// Get the modulus
    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    /// Get the CRT key material, if any
    pub fn crt(&self) -> Option<&CrtComponents> {
        self.crt.as_ref()
    }

    /// Get the key size in bits
    pub fn key_size_bits(&self) -> usize {
        self.modulus.bits() as usize
    }

    /// Get the block size in bytes
    pub fn block_size(&self) -> usize {
        (self.key_size_bits() + 7) / 8
    }

    /// Largest payload that fits one padded block
    pub fn max_payload(&self) -> usize {
        self.block_size().saturating_sub(MIN_PAD_OVERHEAD)
    }

    /// Select the exponent for the requested key half
    fn exponent(&self, half: KeyHalf) -> Result<&BigUint> {
        match half {
            KeyHalf::Public => Ok(&self.public_exponent),
            KeyHalf::Private => self
                .private_exponent
                .as_ref()
                .ok_or(KexError::Rsa(RsaError::MissingPrivateExponent)),
        }
    }

    /// Encrypt a payload into one RSA block using the given key half.
    ///
    /// The payload is padded to the modulus block size (block type 1), read
    /// as a big-endian integer and exponentiated. The returned ciphertext is
    /// the big-endian encoding of the result; it may be shorter than the
    /// block size when the leading byte is zero, and is not re-padded.
    pub fn encrypt(&self, payload: &[u8], half: KeyHalf) -> Result<Vec<u8>> {
        self.encrypt_with_padding(payload, half, PadType::FullByte)
    }

    /// Encrypt with an explicit padding variant
    pub fn encrypt_with_padding(
        &self,
        payload: &[u8],
        half: KeyHalf,
        pad_type: PadType,
    ) -> Result<Vec<u8>> {
        let exponent = self.exponent(half)?;
        let block = pkcs1_pad(payload, self.block_size(), pad_type)?;

        let m = BigUint::from_bytes_be(&block);
        if m.is_zero() {
            return Err(KexError::Rsa(RsaError::ZeroMessage));
        }

        let c = m.modpow(exponent, &self.modulus);
        if c.is_zero() {
            return Err(KexError::Rsa(RsaError::ZeroResult));
        }

        Ok(c.to_bytes_be())
    }

    /// Decrypt one RSA block using the given key half.
    ///
    /// Callers pass the half that was NOT used to produce the ciphertext.
    pub fn decrypt(&self, ciphertext: &[u8], half: KeyHalf) -> Result<Vec<u8>> {
        let exponent = self.exponent(half)?;

        let c = BigUint::from_bytes_be(ciphertext);
        let m = c.modpow(exponent, &self.modulus);
        if m.is_zero() {
            return Err(KexError::Rsa(RsaError::ZeroMessage));
        }

        pkcs1_unpad(&m.to_bytes_be(), self.block_size())
    }

    /// Sign: encrypt with the private exponent
    pub fn sign(&self, payload: &[u8]) -> Result<Vec<u8>> {
        self.encrypt(payload, KeyHalf::Private)
    }

    /// Verify: decrypt with the public exponent, recovering the signed payload
    pub fn verify(&self, signature: &[u8]) -> Result<Vec<u8>> {
        self.decrypt(signature, KeyHalf::Public)
    }
}

impl fmt::Debug for RsaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaKey")
            .field("key_size_bits", &self.key_size_bits())
            .field("public_exponent", &self.public_exponent)
            .field("has_private_exponent", &self.private_exponent.is_some())
            // Don't log the private key material!
            .finish()
    }
}

/// Build a PKCS#1 v1.5 padded block.
///
/// Layout, most significant byte first: `0x00`, block type, padding bytes
/// (0xFF for type 1, random non-zero for type 2), `0x00` separator, payload.
/// The block is exactly `block_size` bytes and carries at least eight
/// padding bytes.
fn pkcs1_pad(payload: &[u8], block_size: usize, pad_type: PadType) -> Result<Vec<u8>> {
    if block_size <= MIN_PAD_OVERHEAD {
        return Err(KexError::Rsa(RsaError::BlockTooSmall(block_size)));
    }
    let max = block_size - MIN_PAD_OVERHEAD;
    if payload.len() > max {
        return Err(KexError::Rsa(RsaError::PayloadTooLarge {
            len: payload.len(),
            max,
        }));
    }

    let mut block = vec![0u8; block_size];
    block[1] = pad_type.as_u8();

    let pad_len = block_size - 3 - payload.len();
    match pad_type {
        PadType::FullByte => block[2..2 + pad_len].fill(0xFF),
        PadType::RandomByte => {
            let mut rng = rand::thread_rng();
            for byte in &mut block[2..2 + pad_len] {
                *byte = rng.gen_range(1..=255);
            }
        }
    }

    // block[2 + pad_len] stays zero as the separator
    block[3 + pad_len..].copy_from_slice(payload);
    Ok(block)
}

/// Strip PKCS#1 v1.5 padding from a decrypted block.
///
/// The big-endian encoding of the decrypted integer drops leading zero
/// bytes, so they are skipped here; after the skip the remainder must be
/// exactly `block_size - 1` bytes and open with a known block type.
fn pkcs1_unpad(block: &[u8], block_size: usize) -> Result<Vec<u8>> {
    let start = block
        .iter()
        .position(|&b| b != 0)
        .unwrap_or(block.len());

    let remaining = block.len() - start;
    if remaining != block_size - 1 {
        return Err(KexError::Rsa(RsaError::BlockLengthMismatch {
            expected: block_size - 1,
            actual: remaining,
        }));
    }

    let block_type = block[start];
    if block_type != PadType::FullByte.as_u8() && block_type != PadType::RandomByte.as_u8() {
        return Err(KexError::Rsa(RsaError::InvalidBlockType(block_type)));
    }

    let mut i = start + 1;
    while i < block.len() && block[i] != 0 {
        i += 1;
    }
    if i >= block.len() {
        return Err(KexError::Rsa(RsaError::MissingSeparator));
    }

    Ok(block[i + 1..].to_vec())
}

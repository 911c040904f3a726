//! Key-exchange handshake orchestration
//!
//! Sequences the legacy bootstrap: the initiator wraps its Diffie-Hellman
//! domain parameters and public value through RSA and sends them as hex
//! text; the responder unwraps them, builds its own key pair over the same
//! domain and replies with its wrapped public value. Both sides then derive
//! the shared secret and seed the stream cipher with its big-endian bytes.
//!
//! Outbound values are encrypted with the *private* RSA half. That makes
//! the wrap authenticity-oriented rather than confidential: anyone holding
//! the public half can read it, but only the key owner could have produced
//! it. The transported hex string carries the ciphertext bytes; the inbound
//! path hex-decodes and RSA-decrypts with the public half.

use num_bigint::BigUint;
use once_cell::sync::OnceCell;
use tracing::debug;

use crate::crypto::arc4::Arc4;
use crate::crypto::dh::DhKeyPair;
use crate::crypto::rsa::{KeyHalf, RsaKey};
use crate::error::{HandshakeError, KexError, Result};

/// One party's handshake state: an RSA key and a Diffie-Hellman key pair,
/// created together and immutable for the lifetime of the session.
///
/// Sessions are plain values owned by the caller; any number of them can
/// run concurrently.
pub struct HandshakeSession {
    rsa: RsaKey,
    dh: DhKeyPair,
}

impl HandshakeSession {
    /// Create an initiator session, generating a fresh DH domain of the
    /// given prime bit length
    pub fn new(rsa: RsaKey, dh_prime_bits: u64) -> Result<Self> {
        let dh = DhKeyPair::generate(dh_prime_bits)?;
        Ok(Self { rsa, dh })
    }

    /// Create a session over an existing DH key pair
    pub fn with_dh(rsa: RsaKey, dh: DhKeyPair) -> Self {
        Self { rsa, dh }
    }

    /// Create a responder session from the initiator's wrapped domain
    /// parameters
    pub fn from_wrapped_parameters(
        rsa: RsaKey,
        wrapped_prime: &str,
        wrapped_generator: &str,
    ) -> Result<Self> {
        let prime = unwrap_with(&rsa, wrapped_prime)?;
        let generator = unwrap_with(&rsa, wrapped_generator)?;
        let dh = DhKeyPair::from_parameters(prime, generator)?;
        Ok(Self { rsa, dh })
    }

    /// The DH prime modulus, wrapped for transport
    pub fn wrapped_prime(&self) -> Result<String> {
        self.wrap_value(self.dh.prime())
    }

    /// The DH generator, wrapped for transport
    pub fn wrapped_generator(&self) -> Result<String> {
        self.wrap_value(self.dh.generator())
    }

    /// The local DH public value, wrapped for transport
    pub fn wrapped_public_key(&self) -> Result<String> {
        self.wrap_value(self.dh.public_key())
    }

    /// Wrap one outbound integer: decimal text, UTF-8 bytes, RSA with the
    /// private half, hex
    fn wrap_value(&self, value: &BigUint) -> Result<String> {
        let plain = value.to_str_radix(10);
        let ciphertext = self.rsa.encrypt(plain.as_bytes(), KeyHalf::Private)?;
        debug!(
            plain_len = plain.len(),
            cipher_len = ciphertext.len(),
            "Wrapped handshake value"
        );
        Ok(hex::encode(ciphertext))
    }

    /// Unwrap one inbound hex string back to its integer
    pub fn unwrap_value(&self, wrapped: &str) -> Result<BigUint> {
        unwrap_with(&self.rsa, wrapped)
    }

    /// Unwrap the peer's DH public value and derive the shared secret
    pub fn compute_shared_secret(&self, wrapped_peer_public: &str) -> Result<BigUint> {
        let peer_public = self.unwrap_value(wrapped_peer_public)?;
        Ok(self.dh.shared_secret(&peer_public))
    }

    /// Get the RSA key
    pub fn rsa(&self) -> &RsaKey {
        &self.rsa
    }

    /// Get the DH key pair
    pub fn dh(&self) -> &DhKeyPair {
        &self.dh
    }
}

fn unwrap_with(rsa: &RsaKey, wrapped: &str) -> Result<BigUint> {
    let ciphertext = hex::decode(wrapped).map_err(HandshakeError::from)?;
    let plain = rsa.decrypt(&ciphertext, KeyHalf::Public)?;
    let text = String::from_utf8(plain).map_err(HandshakeError::from)?;
    BigUint::parse_bytes(text.as_bytes(), 10)
        .ok_or_else(|| KexError::Handshake(HandshakeError::InvalidDecimal(text)))
}

/// Seed the stream cipher from a negotiated shared secret.
///
/// The key material is the secret's unsigned big-endian byte encoding,
/// identical on both sides of the exchange.
pub fn init_stream_cipher(shared_secret: &BigUint) -> Arc4 {
    Arc4::new(&shared_secret.to_bytes_be())
}

static GLOBAL_SESSION: OnceCell<HandshakeSession> = OnceCell::new();

/// One-time construction of the process-wide session.
///
/// The first call builds the session; every later call returns that same
/// instance and ignores its arguments. This is a single-initialization
/// contract, not a reconfiguration path; construction is synchronized, so
/// concurrent first calls cannot produce divergent states. Callers that
/// need more than one session should own [`HandshakeSession`] values
/// directly instead.
pub fn initialize(rsa: RsaKey, dh_prime_bits: u64) -> Result<&'static HandshakeSession> {
    GLOBAL_SESSION.get_or_try_init(|| HandshakeSession::new(rsa, dh_prime_bits))
}

/// Get the process-wide session.
///
/// Requesting it before [`initialize`] is a fatal error; the calling flow
/// must abort.
pub fn global() -> Result<&'static HandshakeSession> {
    GLOBAL_SESSION
        .get()
        .ok_or(KexError::Handshake(HandshakeError::NotInitialized))
}

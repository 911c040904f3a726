//! Error handling module
//!
//! Defines the error types for the handshake crate. Every cryptographic or
//! formatting anomaly surfaces as an explicit variant; callers must treat any
//! error from an encrypt/decrypt/unwrap operation as "handshake cannot
//! proceed" rather than a retry condition.

use std::io;

use thiserror::Error;

/// Main error type for the retro-kex crate
#[derive(Error, Debug)]
pub enum KexError {
    /// RSA primitive errors
    #[error("RSA error: {0}")]
    Rsa(#[from] RsaError),

    /// Diffie-Hellman errors
    #[error("Diffie-Hellman error: {0}")]
    Dh(#[from] DhError),

    /// Handshake orchestration errors
    #[error("Handshake error: {0}")]
    Handshake(#[from] HandshakeError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// RSA primitive errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RsaError {
    /// Payload does not fit the modulus block with minimum padding.
    /// A caller-side configuration error: the key is too small for the data.
    #[error("Payload of {len} bytes exceeds maximum of {max} for this modulus")]
    PayloadTooLarge { len: usize, max: usize },

    /// Modulus too small to hold any padded block
    #[error("Block size of {0} bytes leaves no room for padding")]
    BlockTooSmall(usize),

    /// Padded block interpreted as an integer was zero
    #[error("Message value is zero")]
    ZeroMessage,

    /// Modular exponentiation produced zero
    #[error("Exponentiation result is zero")]
    ZeroResult,

    /// First non-zero byte of a decrypted block was not a known block type
    #[error("Invalid padding block type: {0}")]
    InvalidBlockType(u8),

    /// Decrypted block length did not match the modulus block size
    #[error("Invalid padded block length: expected {expected}, got {actual}")]
    BlockLengthMismatch { expected: usize, actual: usize },

    /// No zero separator between padding and payload
    #[error("Padding separator not found")]
    MissingSeparator,

    /// Private-half operation requested on a public-only key
    #[error("Key has no private exponent")]
    MissingPrivateExponent,

    /// Key component string failed to parse
    #[error("Invalid key component: {0}")]
    InvalidKeyComponent(String),
}

/// Diffie-Hellman errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DhError {
    /// Requested prime bit length is too small for a usable domain
    #[error("Prime bit length {0} is below the minimum of {min}", min = crate::crypto::dh::MIN_PRIME_BITS)]
    InvalidBitLength(u64),

    /// Supplied modulus is not a usable prime modulus
    #[error("Invalid prime modulus")]
    InvalidPrime,

    /// Supplied generator is outside [2, P)
    #[error("Invalid generator")]
    InvalidGenerator,
}

/// Handshake orchestration errors
#[derive(Error, Debug)]
pub enum HandshakeError {
    /// The process-wide handshake state was requested before initialization.
    /// Fatal: the calling flow must abort, there is nothing to retry.
    #[error("Handshake state not initialized")]
    NotInitialized,

    /// Received value was not valid hex
    #[error("Invalid hex in wrapped value: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// Unwrapped payload was not valid UTF-8
    #[error("Invalid UTF-8 in unwrapped value: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// Unwrapped text was not a base-10 integer
    #[error("Invalid decimal integer in unwrapped value: {0:?}")]
    InvalidDecimal(String),
}

/// Result type alias for retro-kex operations
pub type Result<T> = std::result::Result<T, KexError>;

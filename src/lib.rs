//! Retro-Kex
//!
//! Core of a legacy client/server key-exchange handshake: a from-scratch
//! RSA primitive (arbitrary-precision modular exponentiation with PKCS#1
//! v1.5 block formatting) and the orchestration that uses it as a transport
//! wrap for Diffie-Hellman parameters, deriving a shared secret that seeds
//! an ARC4 stream cipher over an otherwise plaintext link.
//!
//! ## Modules
//!
//! - `config` - Handshake configuration management
//! - `crypto` - Cryptographic primitives (RSA, Diffie-Hellman, ARC4)
//! - `error` - Error types and result definitions
//! - `handshake` - Session orchestration and the process-wide facade

pub mod config;
pub mod crypto;
pub mod error;
pub mod handshake;

// Re-export commonly used types
pub use config::KexConfig;
pub use error::{KexError, Result};
pub use handshake::HandshakeSession;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

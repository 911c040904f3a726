//! Cryptography module
//!
//! Primitives used by the handshake:
//! - RSA for wrapping exchanged values
//! - Diffie-Hellman for deriving the shared secret
//! - ARC4 as the stream cipher the secret seeds

pub mod arc4;
pub mod dh;
pub mod rsa;

// Re-export commonly used types
pub use arc4::Arc4;
pub use dh::DhKeyPair;
pub use rsa::{KeyHalf, PadType, RsaKey};

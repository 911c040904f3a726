//! Diffie-Hellman key exchange module
//!
//! Generates the domain parameters (prime modulus P and generator G) and a
//! key pair over them, and computes the negotiated shared secret. Primes are
//! Miller-Rabin probable primes; the bit lengths this protocol uses are far
//! too small for modern security and are an inherited property of the wire
//! format, so the generation here favors simplicity over hardened parameter
//! checks.

use std::fmt;

use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand::rngs::ThreadRng;
use rand::Rng;
use tracing::debug;

use crate::error::{DhError, KexError, Result};

/// Smallest accepted prime bit length; anything below cannot hold a usable
/// exchange value.
pub const MIN_PRIME_BITS: u64 = 16;

/// Miller-Rabin witness rounds
const MILLER_RABIN_ROUNDS: u32 = 40;

/// Trial-division table applied before the witness loop
const SMALL_PRIMES: [u32; 24] = [
    3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
];

/// A Diffie-Hellman key pair over explicit domain parameters
#[derive(Clone)]
pub struct DhKeyPair {
    /// Prime modulus (P)
    prime: BigUint,
    /// Generator (G)
    generator: BigUint,
    /// Private exponent
    private: BigUint,
    /// Public value, G^private mod P
    public: BigUint,
}

impl DhKeyPair {
    /// Generate a fresh domain and key pair with a prime of `bits` bits
    pub fn generate(bits: u64) -> Result<Self> {
        if bits < MIN_PRIME_BITS {
            return Err(KexError::Dh(DhError::InvalidBitLength(bits)));
        }

        let mut rng = rand::thread_rng();
        let prime = random_prime(bits, &mut rng);
        let generator = rng.gen_biguint_range(&BigUint::from(2u32), &prime);
        debug!(bits, "Generated Diffie-Hellman domain parameters");

        Ok(Self::with_random_private(prime, generator, &mut rng))
    }

    /// Build a key pair over received domain parameters (the responder side)
    pub fn from_parameters(prime: BigUint, generator: BigUint) -> Result<Self> {
        validate_domain(&prime, &generator)?;

        let mut rng = rand::thread_rng();
        Ok(Self::with_random_private(prime, generator, &mut rng))
    }

    /// Build a key pair with a pinned private exponent
    pub fn from_parts(prime: BigUint, generator: BigUint, private: BigUint) -> Result<Self> {
        validate_domain(&prime, &generator)?;

        let public = generator.modpow(&private, &prime);
        Ok(Self {
            prime,
            generator,
            private,
            public,
        })
    }

    fn with_random_private(prime: BigUint, generator: BigUint, rng: &mut ThreadRng) -> Self {
        let private = rng.gen_biguint_range(&BigUint::from(2u32), &(&prime - 1u32));
        let public = generator.modpow(&private, &prime);
        Self {
            prime,
            generator,
            private,
            public,
        }
    }

    /// Get the prime modulus
    pub fn prime(&self) -> &BigUint {
        &self.prime
    }

    /// Get the generator
    pub fn generator(&self) -> &BigUint {
        &self.generator
    }

    /// Get the public value
    pub fn public_key(&self) -> &BigUint {
        &self.public
    }

    /// Compute the shared secret from the peer's public value
    pub fn shared_secret(&self, peer_public: &BigUint) -> BigUint {
        peer_public.modpow(&self.private, &self.prime)
    }
}

impl fmt::Debug for DhKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DhKeyPair")
            .field("prime_bits", &self.prime.bits())
            .field("public", &self.public)
            // Don't log the private exponent!
            .finish()
    }
}

fn validate_domain(prime: &BigUint, generator: &BigUint) -> Result<()> {
    if prime < &BigUint::from(3u32) {
        return Err(KexError::Dh(DhError::InvalidPrime));
    }
    if generator < &BigUint::from(2u32) || generator >= prime {
        return Err(KexError::Dh(DhError::InvalidGenerator));
    }
    Ok(())
}

/// Draw random odd candidates of exactly `bits` bits until one passes the
/// primality test.
fn random_prime(bits: u64, rng: &mut ThreadRng) -> BigUint {
    loop {
        let mut candidate = rng.gen_biguint(bits);
        candidate.set_bit(bits - 1, true);
        candidate.set_bit(0, true);

        if is_probable_prime(&candidate, MILLER_RABIN_ROUNDS, rng) {
            return candidate;
        }
    }
}

/// Miller-Rabin primality test with a small-prime trial division pass
fn is_probable_prime(candidate: &BigUint, rounds: u32, rng: &mut impl Rng) -> bool {
    let two = BigUint::from(2u32);
    if candidate < &two {
        return false;
    }
    if candidate == &two {
        return true;
    }
    if !candidate.bit(0) {
        return false;
    }
    for p in SMALL_PRIMES {
        let p = BigUint::from(p);
        if candidate == &p {
            return true;
        }
        if (candidate % &p).is_zero() {
            return false;
        }
    }

    // candidate - 1 == 2^r * d with d odd
    let minus_one = candidate - BigUint::one();
    let r = minus_one.trailing_zeros().unwrap_or(0);
    let d = &minus_one >> r;

    'witness: for _ in 0..rounds {
        let a = rng.gen_biguint_range(&two, &minus_one);
        let mut x = a.modpow(&d, candidate);
        if x.is_one() || x == minus_one {
            continue;
        }
        for _ in 1..r {
            x = x.modpow(&two, candidate);
            if x == minus_one {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

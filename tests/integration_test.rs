//! Integration tests for the two-party handshake
//!
//! These tests verify the end-to-end behavior of:
//! - The full wrapped exchange (domain parameters and public values)
//! - Shared-secret agreement regardless of which side initiates
//! - Stream-cipher seeding producing identical keystreams on both sides
//! - The process-wide one-time initialization contract

use num_bigint::BigUint;
use pretty_assertions::assert_eq;

use retro_kex::crypto::dh::DhKeyPair;
use retro_kex::crypto::rsa::RsaKey;
use retro_kex::handshake::{self, init_stream_cipher, HandshakeSession};

// 512-bit test key (testing only - never use in production!)
const TEST_N: &str = "6857212041239277927363451488868671148501677965191389249979461973009787332836363720332454282231040613995886481146299317201880781284357118560702840050441253";
const TEST_E: &str = "65537";
const TEST_D: &str = "3940409317989398458039086059337384308902958514565935565470292169363086362735724981502867868062380705713871394717914253185625367419585193067152951494294273";

fn test_rsa() -> RsaKey {
    RsaKey::private_from_decimal(TEST_N, TEST_E, TEST_D).unwrap()
}

fn big(s: &str) -> BigUint {
    BigUint::parse_bytes(s.as_bytes(), 10).unwrap()
}

/// Full exchange: A generates the domain and wraps everything, B rebuilds
/// the domain from the wrapped values and replies, both derive the same
/// secret and the same keystream.
#[test]
fn test_full_handshake() {
    // Side A: initiator with a fresh 128-bit DH domain
    let alice = HandshakeSession::new(test_rsa(), 128).unwrap();

    let wrapped_p = alice.wrapped_prime().unwrap();
    let wrapped_g = alice.wrapped_generator().unwrap();
    let wrapped_alice_public = alice.wrapped_public_key().unwrap();

    // Side B: responder over the unwrapped domain
    let bob =
        HandshakeSession::from_wrapped_parameters(test_rsa(), &wrapped_p, &wrapped_g).unwrap();
    assert_eq!(bob.dh().prime(), alice.dh().prime());
    assert_eq!(bob.dh().generator(), alice.dh().generator());

    let wrapped_bob_public = bob.wrapped_public_key().unwrap();

    // Both sides derive the secret from the other's wrapped public value
    let alice_secret = alice.compute_shared_secret(&wrapped_bob_public).unwrap();
    let bob_secret = bob.compute_shared_secret(&wrapped_alice_public).unwrap();
    assert_eq!(alice_secret, bob_secret);

    // Seeding the stream cipher with the secret gives identical keystreams
    let mut alice_cipher = init_stream_cipher(&alice_secret);
    let mut bob_cipher = init_stream_cipher(&bob_secret);
    for _ in 0..256 {
        assert_eq!(alice_cipher.next_byte(), bob_cipher.next_byte());
    }
}

/// Traffic encrypted by one side decrypts on the other
#[test]
fn test_handshake_then_traffic() {
    let alice = HandshakeSession::new(test_rsa(), 128).unwrap();
    let bob = HandshakeSession::from_wrapped_parameters(
        test_rsa(),
        &alice.wrapped_prime().unwrap(),
        &alice.wrapped_generator().unwrap(),
    )
    .unwrap();

    let alice_secret = alice
        .compute_shared_secret(&bob.wrapped_public_key().unwrap())
        .unwrap();
    let bob_secret = bob
        .compute_shared_secret(&alice.wrapped_public_key().unwrap())
        .unwrap();

    let mut alice_cipher = init_stream_cipher(&alice_secret);
    let mut bob_cipher = init_stream_cipher(&bob_secret);

    let mut message = b"welcome to the lobby".to_vec();
    alice_cipher.apply(&mut message);
    assert_ne!(message, b"welcome to the lobby");

    bob_cipher.apply(&mut message);
    assert_eq!(message, b"welcome to the lobby");
}

/// With pinned exponents on both sides, the derived secret is the same
/// whichever side initiates
#[test]
fn test_handshake_determinism() {
    let prime = big("319074286515013284284614829477523883627");
    let generator = big("5");
    let x_a = big("915583227346686931530078252610");
    let x_b = big("1231134703595634280707265294169");

    let run = |initiator_private: &BigUint, responder_private: &BigUint| -> BigUint {
        let initiator = HandshakeSession::with_dh(
            test_rsa(),
            DhKeyPair::from_parts(prime.clone(), generator.clone(), initiator_private.clone())
                .unwrap(),
        );
        let responder = HandshakeSession::from_wrapped_parameters(
            test_rsa(),
            &initiator.wrapped_prime().unwrap(),
            &initiator.wrapped_generator().unwrap(),
        )
        .unwrap();
        // Pin the responder's exponent by rebuilding over the same domain
        let responder = HandshakeSession::with_dh(
            test_rsa(),
            DhKeyPair::from_parts(
                responder.dh().prime().clone(),
                responder.dh().generator().clone(),
                responder_private.clone(),
            )
            .unwrap(),
        );

        let secret_initiator = initiator
            .compute_shared_secret(&responder.wrapped_public_key().unwrap())
            .unwrap();
        let secret_responder = responder
            .compute_shared_secret(&initiator.wrapped_public_key().unwrap())
            .unwrap();
        assert_eq!(secret_initiator, secret_responder);
        secret_initiator
    };

    let a_initiates = run(&x_a, &x_b);
    let b_initiates = run(&x_b, &x_a);
    assert_eq!(a_initiates, b_initiates);
    assert_eq!(a_initiates, big("112963008587962185237456466996290884235"));
}

/// The one-time facade keeps the instance from the first call; later calls
/// with different arguments are ignored
#[test]
fn test_one_time_initialization_contract() {
    let first = handshake::initialize(test_rsa(), 64).unwrap();
    let first_prime = first.dh().prime().clone();

    // Different bit length, same returned instance
    let second = handshake::initialize(test_rsa(), 128).unwrap();
    assert!(std::ptr::eq(first, second));
    assert_eq!(second.dh().prime(), &first_prime);

    let global = handshake::global().unwrap();
    assert!(std::ptr::eq(first, global));
}

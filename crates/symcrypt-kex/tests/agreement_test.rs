//! End-to-end key agreement: parameters, key pairs, interchange records and
//! the resulting session ciphers.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use symcrypt_core::{Algorithm, CipherSpec, EngineConfig, KexConfig, ModeKind, PaddingKind};
use symcrypt_kex::{
    derive_shared_key, generate_public_key, session_cipher, CipherInfoMessage, DhParams, KeyExchange,
    KeyMessage, PrivateKey,
};

fn small_params(seed: u64) -> DhParams {
    DhParams::generate_with_rng(128, 16, &mut StdRng::seed_from_u64(seed)).unwrap()
}

#[test]
fn full_exchange_over_json() {
    let config = KexConfig {
        prime_bits: 160,
        private_key_bits: 128,
        miller_rabin_rounds: 16,
    };
    let params = DhParams::generate(&config).unwrap();
    let alice = KeyExchange::new(params.clone(), &config).unwrap();
    let bob = KeyExchange::new(params.clone(), &config).unwrap();

    // alice announces the cipher and her public value
    let spec = CipherSpec::new(Algorithm::Rc6, ModeKind::RandomDelta, PaddingKind::Pkcs7, vec![0x3Cu8; 16]);
    let offer_json = CipherInfoMessage::new(2, &spec, &params)
        .with_public_key(alice.public_key_bytes())
        .to_json()
        .unwrap();

    // bob builds his side straight from the record and answers with his key
    let offer = CipherInfoMessage::from_json(&offer_json).unwrap();
    let bob_engine = session_cipher(&offer, bob.private_key(), &EngineConfig::default()).unwrap();
    let answer_json = KeyMessage::new(bob.public_key_bytes()).to_json().unwrap();

    // alice derives the same key from the answer
    let answer = KeyMessage::from_json(&answer_json).unwrap();
    let peer = num_bigint::BigUint::from_bytes_be(&answer.public_key);
    let key = alice.shared_key(&peer, spec.key_bits).unwrap();
    let alice_engine =
        symcrypt_cipher::SymmetricEncryption::new(spec, key.as_bytes(), &EngineConfig::default()).unwrap();

    let ciphertext = alice_engine.encrypt(b"the eagle has landed").unwrap();
    assert_eq!(bob_engine.decrypt(&ciphertext).unwrap(), b"the eagle has landed");
}

#[test]
fn public_values_commute() {
    let params = small_params(11);
    let mut rng = StdRng::seed_from_u64(12);
    let a = PrivateKey::generate_with_rng(100, &mut rng).unwrap();
    let b = PrivateKey::generate_with_rng(100, &mut rng).unwrap();

    let ga = generate_public_key(&a, &params);
    let gb = generate_public_key(&b, &params);
    let gab = generate_public_key(&b, &DhParams::new(params.p().clone(), ga.clone()).unwrap());
    let gba = generate_public_key(&a, &DhParams::new(params.p().clone(), gb.clone()).unwrap());
    assert_eq!(gab, gba);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn independent_exponents_agree(seed_a in any::<u64>(), seed_b in any::<u64>(), key_bytes in 1u32..=16) {
        let params = small_params(5);
        let a = PrivateKey::generate_with_rng(96, &mut StdRng::seed_from_u64(seed_a)).unwrap();
        let b = PrivateKey::generate_with_rng(96, &mut StdRng::seed_from_u64(seed_b)).unwrap();
        let pub_a = generate_public_key(&a, &params);
        let pub_b = generate_public_key(&b, &params);

        let key_bits = key_bytes * 8;
        let k_a = derive_shared_key(&pub_b, &a, params.p(), key_bits).unwrap();
        let k_b = derive_shared_key(&pub_a, &b, params.p(), key_bits).unwrap();
        prop_assert_eq!(k_a.len(), key_bytes as usize);
        prop_assert_eq!(k_a.as_bytes(), k_b.as_bytes());
    }
}

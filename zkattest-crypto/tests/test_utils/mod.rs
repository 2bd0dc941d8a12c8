use rand::SeedableRng;
use zkattest_crypto::{KeyPair, PrivateKey};

/// Seeded rng for replicable tests.
pub fn seeded_rng() -> (impl rand::CryptoRng + rand::RngCore) {
    const TEST_RNG_SEED: [u8; 32] = *b"NEVER USE THIS FOR ANYTHING REAL";
    rand::rngs::StdRng::from_seed(TEST_RNG_SEED)
}

/// The issuer whose private key is the bytes `00 01 .. 1f`, used for pinned vectors.
#[allow(unused)]
pub fn pinned_issuer() -> KeyPair {
    let bytes: Vec<u8> = (0u8..32).collect();
    KeyPair::from_private_key(PrivateKey::from_bytes(&bytes).unwrap())
}

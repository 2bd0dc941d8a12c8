use rand::SeedableRng;
use zkattest_claims::{
    registry::ProofVerifier,
    subject::{CircuitInput, Prover, ProverOutput},
    Error, Verification,
};
use zkattest_crypto::{RawProof, RawValue, TranscodedProof};

// Seeded rng for replicable tests.
pub fn seeded_rng() -> (impl rand::CryptoRng + rand::RngCore) {
    const TEST_RNG_SEED: [u8; 32] = *b"NEVER USE THIS FOR ANYTHING REAL";
    rand::rngs::StdRng::from_seed(TEST_RNG_SEED)
}

/// Stands in for snarkjs: returns a fixed proof carrying the public signals of its input.
pub struct FakeProver;

pub fn fake_proof() -> RawProof {
    serde_json::from_str(
        r#"{
            "pi_a": ["11", "12", "1"],
            "pi_b": [["21", "22"], ["23", "24"], ["1", "0"]],
            "pi_c": ["31", "32", "1"],
            "protocol": "groth16",
            "curve": "bn128"
        }"#,
    )
    .unwrap()
}

impl Prover for FakeProver {
    fn prove(&self, input: &CircuitInput) -> Result<ProverOutput, Error> {
        Ok(ProverOutput {
            proof: fake_proof(),
            public_signals: vec![
                input.commitment.as_field_element().into(),
                input.issuer_ax.into(),
                input.issuer_ay.into(),
                input.message_hash.as_field_element().into(),
            ],
        })
    }
}

/// Accepts exactly the proofs produced by [`FakeProver`], checking that `b` arrives reversed.
pub struct FakeVerifier;

impl ProofVerifier for FakeVerifier {
    fn verify(&self, proof: &TranscodedProof) -> Verification {
        let raw = proof.to_raw_proof();
        let expected = fake_proof();
        (raw.pi_a == expected.pi_a && raw.pi_b == expected.pi_b && raw.pi_c == expected.pi_c)
            .into()
    }
}

#[allow(unused)]
pub fn raw(values: &[&str]) -> Vec<RawValue> {
    values.iter().map(|&v| v.into()).collect()
}

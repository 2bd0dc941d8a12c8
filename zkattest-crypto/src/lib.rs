//! This crate includes the cryptographic core of an anonymous attribute credential, instantiated
//! over the scalar field of BN254 so that every value can be consumed by a circom/Groth16 circuit:
//! - Range-checked field elements with canonical decimal and hex encodings.
//! - Certificate digests: Keccak-256, split into two 128-bit chunks, folded with Poseidon.
//! - EdDSA-Poseidon signatures over Baby Jubjub.
//! - Poseidon commitments to a secret attribute value under a uniformly random salt.
//! - Transcoding of snarkjs Groth16 proofs into the layout expected by a Solidity pairing
//!   verifier.
//!
//! Nothing in this crate performs I/O or logging; every failure is reported as an [`Error`].

#![warn(missing_docs)]
#![warn(missing_copy_implementations, missing_debug_implementations)]
#![warn(unused_qualifications, unused_results)]
#![warn(future_incompatible)]
#![warn(unused)]
#![forbid(rustdoc::broken_intra_doc_links)]

pub mod commitment;
pub mod digest;
pub mod eddsa;
pub mod field;
pub mod poseidon;
pub mod transcode;

mod babyjubjub;
mod serde;

pub use crate::{
    commitment::{commit, AttributeValue, Commitment, Salt},
    digest::{Certificate, DigestChunks, MessageHash},
    eddsa::{KeyPair, PrivateKey, PublicKey, Signature},
    field::{Coordinate, Element, FieldElement},
    transcode::{encode, PublicSignals, RawProof, RawValue, TranscodedProof},
};

pub use crate::common::Rng;

use thiserror::Error;

/// Error types that may arise from cryptographic operations.
///
/// Every variant is a distinct kind so callers can choose a recovery strategy per kind: a
/// [`Error::SignatureVerification`] typically means "reject this credential", whereas the other
/// variants indicate malformed input or a configuration mistake.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Caused by a value outside `[0, p)` or by a string that is not a well-formed number.
    #[error("field element out of range: {0}")]
    FieldRange(String),
    /// Caused by a wide hash whose output cannot be split into two equal field-sized chunks.
    #[error("hash output of {got} bytes cannot be split into two chunks (need an even width of at least {minimum} bytes)")]
    MalformedCertificate {
        /// The minimum acceptable output width, in bytes.
        minimum: usize,
        /// The actual output width, in bytes.
        got: usize,
    },
    /// Caused by private or public key material of the wrong shape.
    #[error("invalid key material: {0}")]
    KeyFormat(String),
    /// Caused by a signature that does not verify against the claimed key and message.
    #[error("signature does not verify against the issuer public key")]
    SignatureVerification,
    /// Caused by a proof or public-signal list that cannot be transcoded.
    #[error("malformed proof: {0}")]
    ProofFormat(String),
    /// Caused by calling the circuit-native hash with an unsupported number of inputs.
    #[error("poseidon hash failed: {0}")]
    CircuitHash(String),
}

mod common {
    //! Common types used internally.

    pub use crate::{
        field::{Coordinate, FieldElement},
        Error,
    };
    pub use ark_bn254::{Fq, Fr};

    /// A trait synonym for a cryptographically secure random number generator. This trait is
    /// blanket-implemented for all valid types and will never need to be implemented by-hand.
    pub trait Rng: rand::CryptoRng + rand::RngCore {}
    impl<T: rand::CryptoRng + rand::RngCore> Rng for T {}
}

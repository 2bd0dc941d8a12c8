/*!
This crate describes the roles of an anonymous attribute credential and the boundaries between
them. It builds on the primitives in `zkattest-crypto`.

An [issuer](issuer) certifies a fact about a subject by signing the digest of a
[certificate](certificate). The [subject](subject) accepts the signed credential, commits to the
attribute under a fresh salt, obtains a Groth16 proof from an external [`Prover`](subject::Prover)
and transcodes it into the arguments of an on-chain [claim registry](registry).

All file-based interchange with external tooling (circom input files, snarkjs output, issuer key
files) lives in [`artifacts`]; the protocol types themselves never touch the filesystem.
*/
#![warn(missing_docs)]
#![warn(missing_copy_implementations, missing_debug_implementations)]
#![warn(unused_qualifications, unused_results)]
#![warn(future_incompatible)]
#![warn(unused)]
#![forbid(rustdoc::broken_intra_doc_links)]
pub mod artifacts;
pub mod certificate;
pub mod issuer;
pub mod registry;
pub mod subject;

pub use certificate::CertificateData;
pub use issuer::{IssuedCredential, ParamsForUser};
pub use registry::{Address, Claim, ClaimRegistry, ClaimSubmission, TransactionReceipt};
pub use zkattest_crypto::Rng;

use std::path::PathBuf;
use thiserror::Error;

/// Error types that may arise while issuing, proving, or registering a claim.
#[derive(Debug, Error)]
pub enum Error {
    /// A cryptographic check or conversion failed.
    #[error(transparent)]
    Crypto(#[from] zkattest_crypto::Error),
    /// The registry rejected the call. Reverts reflect an application-level rejection (duplicate
    /// claim, unknown issuer, invalid proof) and are never retried.
    #[error("registry call reverted: {reason}")]
    Revert {
        /// The revert reason reported by the registry, if any.
        reason: String,
    },
    /// The registry could not be reached.
    #[error("registry transport failure: {0}")]
    Transport(String),
    /// An artifact could not be read or written.
    #[error("could not access {}: {source}", path.display())]
    Io {
        /// The artifact path.
        path: PathBuf,
        /// The underlying I/O failure.
        source: std::io::Error,
    },
    /// An artifact did not contain the expected JSON.
    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        /// The artifact path.
        path: PathBuf,
        /// The underlying parse failure.
        source: serde_json::Error,
    },
    /// An in-memory value could not be encoded as JSON.
    #[error("could not encode JSON: {0}")]
    Encoding(#[source] serde_json::Error),
    /// An account address was malformed.
    #[error("invalid address: {0}")]
    Address(String),
    /// A certificate attribute was missing or not an integer.
    #[error("invalid attribute: {0}")]
    Attribute(String),
}

impl Error {
    /// Whether the failed call may succeed if the caller retries it unchanged.
    ///
    /// Only transport failures qualify. Nothing in this crate retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

/// The result of a verification of some property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "the result of a verification should always be checked"]
pub enum Verification {
    /// A verification succeeded.
    Verified,
    /// A verification failed.
    Failed,
}

impl From<bool> for Verification {
    fn from(b: bool) -> Self {
        if b {
            Verification::Verified
        } else {
            Verification::Failed
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transport_errors_are_retryable() {
        assert!(Error::Transport("connection reset".into()).is_retryable());
        assert!(!Error::Revert {
            reason: "claim exists".into()
        }
        .is_retryable());
        assert!(!Error::Crypto(zkattest_crypto::Error::SignatureVerification).is_retryable());
    }

    #[test]
    fn crypto_errors_keep_their_kind() {
        let err: Error = zkattest_crypto::Error::ProofFormat("public[0]".into()).into();
        assert!(matches!(
            err,
            Error::Crypto(zkattest_crypto::Error::ProofFormat(_))
        ));
        assert_eq!(err.to_string(), "malformed proof: public[0]");
    }
}

//! Folding an arbitrary certificate payload into a single signable field element.
//!
//! The payload is first hashed with a wide collision-resistant hash (Keccak-256 by default). The
//! big-endian output is split into two equal-width halves, each of which must independently be a
//! valid [`FieldElement`]. The halves are then folded with the circuit-native
//! [`poseidon::hash`](crate::poseidon::hash) into the [`MessageHash`] that the issuer signs and
//! the subject later proves over.
//!
//! Out-of-range halves are rejected rather than reduced, so a hash whose output is too wide for
//! the field surfaces as an [`Error::FieldRange`] instead of a silently different message hash.

use crate::{common::*, poseidon};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::{fmt, str::FromStr};

/// Smallest accepted wide-hash output, in bytes.
pub const MIN_HASH_BYTES: usize = 32;

/// An immutable certificate payload: the exact bytes the issuer attests to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Certificate(Vec<u8>);

impl Certificate {
    /// Wrap the canonical byte encoding of a certificate.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// The payload bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Compute the [`MessageHash`] of the certificate using Keccak-256 as the wide hash.
    pub fn digest(&self) -> Result<MessageHash, Error> {
        self.digest_with::<Keccak256>()
    }

    /// Compute the [`MessageHash`] of the certificate using `D` as the wide hash.
    ///
    /// Fails with [`Error::MalformedCertificate`] if `D` produces fewer than [`MIN_HASH_BYTES`]
    /// bytes or an odd number of bytes, and with [`Error::FieldRange`] if either half of the
    /// output is not a valid field element.
    pub fn digest_with<D: Digest>(&self) -> Result<MessageHash, Error> {
        self.chunks_with::<D>()?.fold()
    }

    /// Hash the certificate with Keccak-256 and split the result, without folding.
    pub fn chunks(&self) -> Result<DigestChunks, Error> {
        self.chunks_with::<Keccak256>()
    }

    /// Hash the certificate with `D` and split the result, without folding.
    pub fn chunks_with<D: Digest>(&self) -> Result<DigestChunks, Error> {
        DigestChunks::from_wide_hash(&D::digest(&self.0))
    }
}

impl From<Vec<u8>> for Certificate {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&str> for Certificate {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

/// The two validated halves of a wide hash output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigestChunks {
    /// The integer encoded by the first (most significant) half of the output.
    pub high: FieldElement,
    /// The integer encoded by the second half of the output.
    pub low: FieldElement,
}

impl DigestChunks {
    /// Split a big-endian wide hash output into two equal halves and validate each.
    pub fn from_wide_hash(hash: &[u8]) -> Result<Self, Error> {
        if hash.len() < MIN_HASH_BYTES || hash.len() % 2 != 0 {
            return Err(Error::MalformedCertificate {
                minimum: MIN_HASH_BYTES,
                got: hash.len(),
            });
        }
        let (high, low) = hash.split_at(hash.len() / 2);
        Ok(Self {
            high: FieldElement::from_be_bytes(high)?,
            low: FieldElement::from_be_bytes(low)?,
        })
    }

    /// Fold the halves into a single element with the circuit-native hash, high half first.
    pub fn fold(&self) -> Result<MessageHash, Error> {
        poseidon::hash(&[self.high, self.low]).map(MessageHash)
    }
}

/// The value an issuer signs: the circuit-native fold of a certificate's wide hash.
///
/// Holding a `MessageHash` guarantees the underlying value is a valid field element, so signing
/// cannot proceed over an unvalidated message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageHash(FieldElement);

impl MessageHash {
    /// Treat an already-validated field element as a message hash.
    ///
    /// This is for message hashes received from elsewhere (for example, an issuer's published
    /// parameters). Hashes of certificates should come from [`Certificate::digest`].
    pub fn new(value: FieldElement) -> Self {
        Self(value)
    }

    /// The underlying field element.
    pub fn as_field_element(&self) -> FieldElement {
        self.0
    }
}

impl fmt::Display for MessageHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for MessageHash {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

//! Poseidon commitments to a secret attribute value.
//!
//! A [`Commitment`] is `Poseidon(value, salt)`, in that order, with the salt drawn uniformly from
//! the scalar field. It hides the attribute until it is opened and binds the subject to the
//! committed value.

use crate::{common::*, poseidon};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The secret attribute value a subject commits to and later proves a predicate over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeValue(FieldElement);

impl AttributeValue {
    /// Validate an integer attribute encoding.
    ///
    /// Fails with [`Error::FieldRange`] if the value is negative or not below the field modulus.
    pub fn new(value: impl Into<BigInt>) -> Result<Self, Error> {
        FieldElement::validate(&value.into()).map(Self)
    }

    /// The attribute as a field element.
    pub fn as_field_element(&self) -> FieldElement {
        self.0
    }
}

impl From<u64> for AttributeValue {
    fn from(value: u64) -> Self {
        Self(FieldElement::from(value))
    }
}

impl From<FieldElement> for AttributeValue {
    fn from(value: FieldElement) -> Self {
        Self(value)
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A uniformly random blinding factor for a [`Commitment`].
///
/// Salts must never be reused across commitments: two commitments to the same value under the
/// same salt are equal, which reveals that the values are equal.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Salt(FieldElement);

impl Salt {
    /// Draw a fresh salt uniformly from the scalar field.
    pub fn new(rng: &mut impl Rng) -> Self {
        Self(FieldElement::random(rng))
    }

    /// Reconstruct a salt from a previously generated value, for re-opening a commitment.
    ///
    /// **Warning**: this should only be used on a value that was originally produced by
    /// [`Salt::new`]. A fixed or chosen salt destroys the hiding property of the commitment.
    pub fn from_field_element(value: FieldElement) -> Self {
        Self(value)
    }

    /// The salt as a field element.
    pub fn as_field_element(&self) -> FieldElement {
        self.0
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Salt(<redacted>)")
    }
}

/// A hiding, binding commitment to an [`AttributeValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Commitment(FieldElement);

impl Commitment {
    /// Commit to `value` under `salt`.
    pub fn new(value: &AttributeValue, salt: &Salt) -> Result<Self, Error> {
        poseidon::hash(&[value.0, salt.0]).map(Self)
    }

    /// Treat a field element received from elsewhere (for example, a public signal) as a
    /// commitment.
    pub fn from_field_element(value: FieldElement) -> Self {
        Self(value)
    }

    /// Check that the commitment opens to `value` under `salt`.
    pub fn verify_opening(&self, value: &AttributeValue, salt: &Salt) -> bool {
        Self::new(value, salt).map_or(false, |c| c == *self)
    }

    /// The commitment as a field element.
    pub fn as_field_element(&self) -> FieldElement {
        self.0
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Commit to an integer attribute value.
///
/// Fails with [`Error::FieldRange`] if `value` is negative or not below the field modulus; the
/// value is never reduced.
pub fn commit(value: impl Into<BigInt>, salt: &Salt) -> Result<Commitment, Error> {
    Commitment::new(&AttributeValue::new(value)?, salt)
}

//! Range-checked prime field elements and their canonical encodings.
//!
//! An [`Element`] is a non-negative integer strictly less than the modulus of the arkworks prime
//! field `F`. Two instantiations are used throughout the crate:
//!
//! - [`FieldElement`], over the BN254 scalar field `r`. Every value that enters a circuit
//!   (digest chunks, commitment inputs, keys, signatures, public signals) is one of these.
//! - [`Coordinate`], over the BN254 base field `q`. Groth16 proof points are expressed in it.
//!
//! Values are only ever created through checked entry points. Out-of-range input is rejected with
//! [`Error::FieldRange`]; nothing is reduced modulo the prime.
//!
//! ```
//! # use zkattest_crypto::FieldElement;
//! let x: FieldElement = "12345".parse().unwrap();
//! assert_eq!(x.to_canonical_string(), "12345");
//! assert!(FieldElement::from_canonical_string(
//!     "21888242871839275222246405745257275088548364400416034343698204186575808495617"
//! )
//! .is_err());
//! ```

use crate::common::*;
use ark_ff::{BigInteger, PrimeField, Zero};
use num_bigint::{BigInt, BigUint, Sign};
use std::{fmt, str::FromStr};

/// An integer in `[0, p)` for the modulus `p` of the prime field `F`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Element<F: PrimeField>(F);

/// An element of the BN254 scalar field, the native field of the proving circuit.
pub type FieldElement = Element<Fr>;

/// An element of the BN254 base field, in which proof curve points are expressed.
pub type Coordinate = Element<Fq>;

impl<F: PrimeField> Element<F> {
    /// The modulus of the field.
    pub fn modulus() -> BigUint {
        F::MODULUS.into()
    }

    /// Number of bytes needed to hold any element of the field.
    pub fn byte_width() -> usize {
        ((F::MODULUS_BIT_SIZE + 7) / 8) as usize
    }

    /// Validate an arbitrary integer, failing if it is negative or not below the modulus.
    pub fn validate(value: &BigInt) -> Result<Self, Error> {
        match value.sign() {
            Sign::Minus => Err(Error::FieldRange(format!("{} is negative", value))),
            _ => Self::from_biguint(value.magnitude()),
        }
    }

    /// Validate a non-negative integer, failing if it is not below the modulus.
    pub fn from_biguint(value: &BigUint) -> Result<Self, Error> {
        if *value >= Self::modulus() {
            return Err(Error::FieldRange(format!(
                "{} is not below the field modulus",
                value
            )));
        }
        Ok(Self(F::from(value.clone())))
    }

    /// Interpret big-endian bytes as an integer and validate it.
    pub fn from_be_bytes(bytes: &[u8]) -> Result<Self, Error> {
        Self::from_biguint(&BigUint::from_bytes_be(bytes))
    }

    /// Sample an element uniformly at random from `[0, p)`.
    ///
    /// Draws [`Element::byte_width`] bytes at a time and retries while the big-endian integer
    /// they encode is not below the modulus.
    pub fn random(rng: &mut impl Rng) -> Self {
        let modulus = Self::modulus();
        let mut buf = vec![0u8; Self::byte_width()];
        loop {
            rng.fill_bytes(&mut buf);
            let candidate = BigUint::from_bytes_be(&buf);
            if candidate < modulus {
                return Self(F::from(candidate));
            }
        }
    }

    /// Parse the decimal representation used at every serialization boundary.
    ///
    /// Only ASCII digits are accepted: no sign, whitespace, or radix prefix. Leading zeros are
    /// allowed.
    pub fn from_canonical_string(s: &str) -> Result<Self, Error> {
        if s.is_empty() {
            return Err(Error::FieldRange("empty numeric string".to_string()));
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::FieldRange(format!("{:?} is not a decimal integer", s)));
        }
        let value = BigUint::parse_bytes(s.as_bytes(), 10)
            .ok_or_else(|| Error::FieldRange(format!("{:?} is not a decimal integer", s)))?;
        Self::from_biguint(&value)
    }

    /// Render the element as a decimal string without leading zeros.
    pub fn to_canonical_string(&self) -> String {
        self.to_biguint().to_str_radix(10)
    }

    /// Parse a big-endian hex string, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, Error> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::FieldRange(format!("{:?} is not a hex integer", s)));
        }
        let value = BigUint::parse_bytes(digits.as_bytes(), 16)
            .ok_or_else(|| Error::FieldRange(format!("{:?} is not a hex integer", s)))?;
        Self::from_biguint(&value)
    }

    /// Render the element as `0x` followed by exactly `2 * byte_width` lowercase hex digits.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_be_bytes()))
    }

    /// Convert to an arbitrary-precision integer.
    pub fn to_biguint(&self) -> BigUint {
        self.0.into()
    }

    /// Encode as exactly [`Element::byte_width`] big-endian bytes.
    pub fn to_be_bytes(&self) -> Vec<u8> {
        let mut bytes = self.to_le_bytes();
        bytes.reverse();
        bytes
    }

    /// Encode as exactly [`Element::byte_width`] little-endian bytes.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let mut bytes = self.0.into_bigint().to_bytes_le();
        bytes.resize(Self::byte_width(), 0);
        bytes
    }

    /// Whether this is the zero element.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub(crate) fn from_field(f: F) -> Self {
        Self(f)
    }

    pub(crate) fn to_field(self) -> F {
        self.0
    }
}

impl<F: PrimeField> From<u64> for Element<F> {
    fn from(value: u64) -> Self {
        // Both BN254 moduli exceed 2^64, so this never reduces.
        Self(F::from(value))
    }
}

impl<F: PrimeField> FromStr for Element<F> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_canonical_string(s)
    }
}

impl<F: PrimeField> fmt::Display for Element<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_canonical_string())
    }
}

impl<F: PrimeField> fmt::Debug for Element<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Element({})", self.to_canonical_string())
    }
}

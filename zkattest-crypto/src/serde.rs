//! Serde support for field elements and fixed-length element sequences.
//!
//! Every [`Element`] serializes as its canonical decimal string, which is what circom, snarkjs,
//! and Solidity tooling all expect in JSON. Deserialization additionally accepts bare JSON
//! integers, since hand-written inputs frequently use them for small values. Negative integers,
//! non-digit strings and values not below the modulus are rejected.
//!
//! [`ElementArray`] deserializes a sequence of exactly `N` elements without an intermediate
//! `Vec`.

use crate::field::Element;
use ark_ff::PrimeField;
use arrayvec::ArrayVec;
use num_bigint::BigUint;
use serde::{
    de::{self, SeqAccess, Visitor},
    ser::SerializeSeq,
    Deserialize, Deserializer, Serialize, Serializer,
};
use std::{fmt, marker::PhantomData};

impl<F: PrimeField> Serialize for Element<F> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_canonical_string())
    }
}

impl<'de, F: PrimeField> Deserialize<'de> for Element<F> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ElementVisitor(PhantomData))
    }
}

struct ElementVisitor<F>(PhantomData<F>);

impl<'de, F: PrimeField> Visitor<'de> for ElementVisitor<F> {
    type Value = Element<F>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a non-negative decimal integer below the field modulus")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Element::from_canonical_string(v).map_err(E::custom)
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Element::from(v))
    }

    fn visit_u128<E>(self, v: u128) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Element::from_biguint(&BigUint::from(v)).map_err(E::custom)
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        u64::try_from(v)
            .map(Element::from)
            .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
    }
}

/// A sequence of exactly `N` field elements.
///
/// Serializes as a plain sequence; deserialization fails if the input holds more or fewer than
/// `N` entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementArray<F: PrimeField, const N: usize>(pub [Element<F>; N]);

impl<F: PrimeField, const N: usize> Serialize for ElementArray<F, N> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(N))?;
        for element in &self.0 {
            seq.serialize_element(element)?;
        }
        seq.end()
    }
}

impl<'de, F: PrimeField, const N: usize> Deserialize<'de> for ElementArray<F, N> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ArrayVisitor<F, const N: usize>(PhantomData<F>);

        impl<'de, F: PrimeField, const N: usize> Visitor<'de> for ArrayVisitor<F, N> {
            type Value = ElementArray<F, N>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                write!(formatter, "a sequence of exactly {} field elements", N)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut elements = ArrayVec::<Element<F>, N>::new();
                while let Some(element) = seq.next_element()? {
                    if elements.try_push(element).is_err() {
                        return Err(de::Error::invalid_length(N + 1, &self));
                    }
                }
                let len = elements.len();
                elements
                    .into_inner()
                    .map(ElementArray)
                    .map_err(|_| de::Error::invalid_length(len, &self))
            }
        }

        deserializer.deserialize_seq(ArrayVisitor(PhantomData))
    }
}

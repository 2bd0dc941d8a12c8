//! Baby Jubjub in circom form, `168700·x² + y² = 1 + 168696·x²·y²` over the BN254 scalar field.
//!
//! Curve arithmetic comes from `ark-babyjubjub`, whose generator is circom's `Base8` and whose
//! scalar field is the prime sub-order `l`. This module only moves coordinates between
//! [`FieldElement`]s and curve points.

use crate::common::*;
use ark_babyjubjub::{EdwardsAffine, Fq as CurveBase, Fr as SubgroupScalar};
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::PrimeField;
use num_bigint::BigUint;

/// An affine curve point.
pub(crate) type Point = EdwardsAffine;

/// Order of the prime subgroup generated by [`base8`].
pub(crate) fn suborder() -> BigUint {
    SubgroupScalar::MODULUS.into()
}

/// The generator of the prime-order subgroup (eight times the curve generator).
pub(crate) fn base8() -> Point {
    EdwardsAffine::generator()
}

/// The point with the given coordinates. It is not checked to lie on the curve.
pub(crate) fn point(x: FieldElement, y: FieldElement) -> Point {
    EdwardsAffine::new_unchecked(CurveBase::from(x.to_biguint()), CurveBase::from(y.to_biguint()))
}

/// The coordinates of an affine point.
pub(crate) fn coordinates(point: &Point) -> (FieldElement, FieldElement) {
    let x: BigUint = point.x.into();
    let y: BigUint = point.y.into();
    (
        FieldElement::from_field(Fr::from(x)),
        FieldElement::from_field(Fr::from(y)),
    )
}

/// `point · scalar` for an arbitrary non-negative integer, without reducing the scalar.
pub(crate) fn mul(point: &Point, scalar: &BigUint) -> Point {
    point.mul_bigint(scalar.to_u64_digits()).into_affine()
}

//! EdDSA signatures over Baby Jubjub, keyed off the circuit-native Poseidon hash.
//!
//! Signatures produced here satisfy exactly the relation checked by the circom
//! `EdDSAPoseidonVerifier` template, so a subject can prove possession of a signed
//! [`MessageHash`] without revealing the signature:
//!
//! ```text
//! Base8 · S == R8 + A · (8 · Poseidon(R8x, R8y, Ax, Ay, M))
//! ```
//!
//! Signing is deterministic: the nonce is derived from the private key and the message.
//!
//! ```
//! # use zkattest_crypto::{KeyPair, MessageHash, FieldElement};
//! # use rand::SeedableRng;
//! # let mut rng = rand::rngs::StdRng::from_seed([7; 32]);
//! let issuer = KeyPair::new(&mut rng);
//! let msg = MessageHash::new(FieldElement::from(42));
//! let sig = issuer.sign(&msg).unwrap();
//! assert!(issuer.public_key().verify(&msg, &sig));
//! ```

use crate::{
    babyjubjub::{self, base8, suborder, Point},
    common::*,
    digest::MessageHash,
    poseidon,
};
use ark_ec::AffineRepr;
use blake_hash::{Blake512, Digest};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Byte width of a private key.
pub const PRIVATE_KEY_BYTES: usize = 32;

/// An issuer's private key: 32 uniformly random bytes.
///
/// The signing scalar and nonce seed are both derived from these bytes with BLAKE-512, exactly as
/// circomlibjs derives them, so key files are interchangeable with that tooling. The bytes are
/// wiped from memory when the key is dropped and never appear in `Debug` output.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey([u8; PRIVATE_KEY_BYTES]);

impl PrivateKey {
    /// Draw a fresh private key.
    pub fn new(rng: &mut impl Rng) -> Self {
        let mut bytes = [0u8; PRIVATE_KEY_BYTES];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Load a private key from its raw bytes.
    ///
    /// Fails with [`Error::KeyFormat`] unless exactly [`PRIVATE_KEY_BYTES`] bytes are supplied.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let bytes = <[u8; PRIVATE_KEY_BYTES]>::try_from(bytes).map_err(|_| {
            Error::KeyFormat(format!(
                "private key must be {} bytes, got {}",
                PRIVATE_KEY_BYTES,
                bytes.len()
            ))
        })?;
        Ok(Self(bytes))
    }

    /// Load a private key from 64 hex digits, ignoring surrounding whitespace and an optional
    /// `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, Error> {
        let s = s.trim();
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = Zeroizing::new(
            hex::decode(digits).map_err(|e| Error::KeyFormat(format!("invalid hex: {}", e)))?,
        );
        Self::from_bytes(&bytes)
    }

    /// Export the key as 64 lowercase hex digits.
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.0))
    }

    /// Derive the public key.
    pub fn public_key(&self) -> PublicKey {
        let point = babyjubjub::mul(&base8(), &(self.expand().scalar() >> 3));
        PublicKey::from_point(&point)
    }

    fn expand(&self) -> ExpandedKey {
        let mut wide = Zeroizing::new([0u8; 64]);
        wide.copy_from_slice(&Blake512::digest(&self.0));
        wide[0] &= 0xf8;
        wide[31] &= 0x7f;
        wide[31] |= 0x40;
        ExpandedKey(wide)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

/// The BLAKE-512 expansion of a private key, with the scalar half already pruned.
struct ExpandedKey(Zeroizing<[u8; 64]>);

impl ExpandedKey {
    fn scalar(&self) -> BigUint {
        BigUint::from_bytes_le(&self.0[..32])
    }

    fn nonce(&self, msg: &MessageHash) -> BigUint {
        let mut hasher = Blake512::new();
        hasher.update(&self.0[32..]);
        hasher.update(msg.as_field_element().to_le_bytes());
        BigUint::from_bytes_le(&hasher.finalize()) % suborder()
    }
}

/// An issuer's public key: a point `(Ax, Ay)` on Baby Jubjub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PublicKeyRepr")]
pub struct PublicKey {
    #[serde(rename = "Ax")]
    ax: FieldElement,
    #[serde(rename = "Ay")]
    ay: FieldElement,
}

#[derive(Deserialize)]
struct PublicKeyRepr {
    #[serde(rename = "Ax")]
    ax: FieldElement,
    #[serde(rename = "Ay")]
    ay: FieldElement,
}

impl TryFrom<PublicKeyRepr> for PublicKey {
    type Error = Error;

    fn try_from(repr: PublicKeyRepr) -> Result<Self, Self::Error> {
        Self::new(repr.ax, repr.ay)
    }
}

impl PublicKey {
    /// Construct a public key from its coordinates.
    ///
    /// Fails with [`Error::KeyFormat`] if `(ax, ay)` is not a point on the curve.
    pub fn new(ax: FieldElement, ay: FieldElement) -> Result<Self, Error> {
        if !babyjubjub::point(ax, ay).is_on_curve() {
            return Err(Error::KeyFormat(format!(
                "({}, {}) is not on the curve",
                ax, ay
            )));
        }
        Ok(Self { ax, ay })
    }

    fn from_point(point: &Point) -> Self {
        let (ax, ay) = babyjubjub::coordinates(point);
        Self { ax, ay }
    }

    fn point(&self) -> Point {
        babyjubjub::point(self.ax, self.ay)
    }

    /// The x-coordinate.
    pub fn ax(&self) -> FieldElement {
        self.ax
    }

    /// The y-coordinate.
    pub fn ay(&self) -> FieldElement {
        self.ay
    }

    /// Verify a signature on a message.
    pub fn verify(&self, msg: &MessageHash, sig: &Signature) -> bool {
        let s = sig.s.to_biguint();
        if s >= suborder() {
            return false;
        }
        let r8 = sig.r8();
        let a = self.point();
        if !r8.is_on_curve() || !a.is_on_curve() {
            return false;
        }
        let hm = match challenge(sig.r8x, sig.r8y, self, msg) {
            Ok(hm) => hm,
            Err(_) => return false,
        };
        let lhs = base8().mul_bigint(s.to_u64_digits());
        let rhs = a.mul_bigint((hm * 8u32).to_u64_digits()) + r8;
        lhs == rhs
    }

    /// Verify a signature on a message, failing with [`Error::SignatureVerification`] if it is
    /// invalid.
    pub fn check(&self, msg: &MessageHash, sig: &Signature) -> Result<(), Error> {
        if self.verify(msg, sig) {
            Ok(())
        } else {
            Err(Error::SignatureVerification)
        }
    }
}

/// A signature `(R8x, R8y, S)`: a nonce point and a scalar below the subgroup order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    #[serde(rename = "R8x")]
    r8x: FieldElement,
    #[serde(rename = "R8y")]
    r8y: FieldElement,
    #[serde(rename = "S")]
    s: FieldElement,
}

impl Signature {
    /// Assemble a signature from its components. No validation happens until verification.
    pub fn from_parts(r8x: FieldElement, r8y: FieldElement, s: FieldElement) -> Self {
        Self { r8x, r8y, s }
    }

    /// The x-coordinate of the nonce point.
    pub fn r8x(&self) -> FieldElement {
        self.r8x
    }

    /// The y-coordinate of the nonce point.
    pub fn r8y(&self) -> FieldElement {
        self.r8y
    }

    /// The scalar component.
    pub fn s(&self) -> FieldElement {
        self.s
    }

    fn r8(&self) -> Point {
        babyjubjub::point(self.r8x, self.r8y)
    }
}

/// `Poseidon(R8x, R8y, Ax, Ay, M)` as an integer.
fn challenge(
    r8x: FieldElement,
    r8y: FieldElement,
    public_key: &PublicKey,
    msg: &MessageHash,
) -> Result<BigUint, Error> {
    poseidon::hash(&[
        r8x,
        r8y,
        public_key.ax,
        public_key.ay,
        msg.as_field_element(),
    ])
    .map(|hm| hm.to_biguint())
}

/// A private key together with its public key.
#[derive(Debug, Clone)]
pub struct KeyPair {
    private_key: PrivateKey,
    public_key: PublicKey,
}

impl KeyPair {
    /// Generate a new key pair.
    pub fn new(rng: &mut impl Rng) -> Self {
        Self::from_private_key(PrivateKey::new(rng))
    }

    /// Derive the key pair for an existing private key.
    pub fn from_private_key(private_key: PrivateKey) -> Self {
        let public_key = private_key.public_key();
        Self {
            private_key,
            public_key,
        }
    }

    /// The public half of the key pair.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// The private half of the key pair.
    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    /// Sign a message.
    pub fn sign(&self, msg: &MessageHash) -> Result<Signature, Error> {
        let expanded = self.private_key.expand();
        let r = expanded.nonce(msg);
        let (r8x, r8y) = babyjubjub::coordinates(&babyjubjub::mul(&base8(), &r));
        let hm = challenge(r8x, r8y, &self.public_key, msg)?;
        let s = (r + hm * expanded.scalar()) % suborder();
        Ok(Signature {
            r8x,
            r8y,
            s: FieldElement::from_biguint(&s)?,
        })
    }
}

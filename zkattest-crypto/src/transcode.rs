//! Transcoding snarkjs Groth16 proofs into the argument layout of a Solidity pairing verifier.
//!
//! snarkjs emits `proof.json` with projective coordinates: `pi_a` and `pi_c` carry a trailing
//! `"1"`, and `pi_b` carries a trailing `["1", "0"]` row. The verifier wants affine points, and
//! it wants each of the two inner `pi_b` pairs reversed, since the G2 coordinates are ordered
//! `(c1, c0)` on the EVM side:
//!
//! ```text
//! pi_b = [[x0, y0], [x1, y1], [1, 0]]   =>   b = [[y0, x0], [y1, x1]]
//! ```
//!
//! The reversal is unconditional. `pi_a` and `pi_c` pass through in order. Proof coordinates are
//! validated against the BN254 base field, while the four public signals are validated against
//! the scalar field and kept in the fixed order `[commitment, issuerAx, issuerAy, messageHash]`.

use crate::{
    commitment::Commitment, common::*, digest::MessageHash, eddsa::PublicKey, field::Element,
    serde::ElementArray,
};
use ark_ff::PrimeField;
use serde::{Deserialize, Serialize};

/// Number of public signals the claim circuit exposes.
pub const PUBLIC_SIGNAL_COUNT: usize = 4;

/// A number as it appears in prover output: either a decimal string or a bare JSON integer.
///
/// Any other JSON value is kept as [`RawValue::Other`] so that [`encode`] can report it by
/// position instead of failing the whole file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// A decimal string, the form snarkjs always emits.
    Decimal(String),
    /// A non-negative JSON integer.
    Unsigned(u64),
    /// A negative JSON integer. Never valid, but kept so it can be reported by position.
    Signed(i64),
    /// Anything else: floats, integers too large for `u64`, and non-numbers. Never valid.
    Other(serde_json::Value),
}

impl RawValue {
    fn parse<F: PrimeField>(&self, position: &str) -> Result<Element<F>, Error> {
        let parsed = match self {
            RawValue::Decimal(s) => Element::from_canonical_string(s),
            RawValue::Unsigned(n) => Ok(Element::from(*n)),
            RawValue::Signed(n) => u64::try_from(*n)
                .map(Element::from)
                .map_err(|_| Error::FieldRange(format!("{} is negative", n))),
            RawValue::Other(v) => Err(Error::FieldRange(format!(
                "{} is not an exact non-negative integer",
                v
            ))),
        };
        parsed.map_err(|e| Error::ProofFormat(format!("{}: {}", position, e)))
    }
}

impl<F: PrimeField> From<Element<F>> for RawValue {
    fn from(element: Element<F>) -> Self {
        RawValue::Decimal(element.to_canonical_string())
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Decimal(s.to_string())
    }
}

/// A Groth16 proof exactly as written to `proof.json` by snarkjs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawProof {
    /// The first proof point, with an optional trailing projective coordinate.
    pub pi_a: Vec<RawValue>,
    /// The second proof point as two coordinate pairs, with an optional trailing padding row.
    pub pi_b: Vec<Vec<RawValue>>,
    /// The third proof point, with an optional trailing projective coordinate.
    pub pi_c: Vec<RawValue>,
    /// The proof system name, `groth16`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    /// The curve name, `bn128`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curve: Option<String>,
}

/// The public signals of a claim proof, in the order the verifier indexes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ElementArray<Fr, PUBLIC_SIGNAL_COUNT>")]
#[serde(into = "ElementArray<Fr, PUBLIC_SIGNAL_COUNT>")]
pub struct PublicSignals {
    commitment: Commitment,
    issuer_ax: FieldElement,
    issuer_ay: FieldElement,
    message_hash: MessageHash,
}

impl PublicSignals {
    /// Assemble the signals a proof about `commitment` under `issuer`'s signature on
    /// `message_hash` must expose.
    pub fn new(commitment: Commitment, issuer: &PublicKey, message_hash: MessageHash) -> Self {
        Self::from_parts(commitment, issuer.ax(), issuer.ay(), message_hash)
    }

    /// Assemble signals from their components, without checking that the issuer coordinates
    /// form a curve point.
    pub fn from_parts(
        commitment: Commitment,
        issuer_ax: FieldElement,
        issuer_ay: FieldElement,
        message_hash: MessageHash,
    ) -> Self {
        Self {
            commitment,
            issuer_ax,
            issuer_ay,
            message_hash,
        }
    }

    /// Parse the contents of `public.json`.
    ///
    /// Fails with [`Error::ProofFormat`] unless there are exactly [`PUBLIC_SIGNAL_COUNT`] entries,
    /// each a valid field element.
    pub fn from_raw(raw: &[RawValue]) -> Result<Self, Error> {
        if raw.len() != PUBLIC_SIGNAL_COUNT {
            return Err(Error::ProofFormat(format!(
                "expected {} public signals, got {}",
                PUBLIC_SIGNAL_COUNT,
                raw.len()
            )));
        }
        let mut values = [FieldElement::default(); PUBLIC_SIGNAL_COUNT];
        for (i, (value, raw)) in values.iter_mut().zip(raw).enumerate() {
            *value = raw.parse(&format!("public[{}]", i))?;
        }
        Ok(Self::from_array(values))
    }

    fn from_array([commitment, issuer_ax, issuer_ay, message_hash]: [FieldElement; 4]) -> Self {
        Self::from_parts(
            Commitment::from_field_element(commitment),
            issuer_ax,
            issuer_ay,
            MessageHash::new(message_hash),
        )
    }

    /// The signals in verifier order: `[commitment, issuerAx, issuerAy, messageHash]`.
    pub fn to_array(&self) -> [FieldElement; PUBLIC_SIGNAL_COUNT] {
        [
            self.commitment.as_field_element(),
            self.issuer_ax,
            self.issuer_ay,
            self.message_hash.as_field_element(),
        ]
    }

    /// The attribute commitment.
    pub fn commitment(&self) -> Commitment {
        self.commitment
    }

    /// The x-coordinate of the issuer's public key.
    pub fn issuer_ax(&self) -> FieldElement {
        self.issuer_ax
    }

    /// The y-coordinate of the issuer's public key.
    pub fn issuer_ay(&self) -> FieldElement {
        self.issuer_ay
    }

    /// The signed certificate hash.
    pub fn message_hash(&self) -> MessageHash {
        self.message_hash
    }
}

impl From<ElementArray<Fr, PUBLIC_SIGNAL_COUNT>> for PublicSignals {
    fn from(array: ElementArray<Fr, PUBLIC_SIGNAL_COUNT>) -> Self {
        Self::from_array(array.0)
    }
}

impl From<PublicSignals> for ElementArray<Fr, PUBLIC_SIGNAL_COUNT> {
    fn from(signals: PublicSignals) -> Self {
        ElementArray(signals.to_array())
    }
}

/// A proof and its public signals, laid out as arguments to the verifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscodedProof {
    /// The first proof point, affine.
    pub a: [Coordinate; 2],
    /// The second proof point, affine, with each inner pair reversed.
    pub b: [[Coordinate; 2]; 2],
    /// The third proof point, affine.
    pub c: [Coordinate; 2],
    /// The public signals, in verifier order.
    pub public_signals: PublicSignals,
}

impl TranscodedProof {
    /// Reconstruct the snarkjs form of the proof, including projective padding.
    ///
    /// This is the inverse of [`encode`]: the inner pairs of `b` are reversed back.
    pub fn to_raw_proof(&self) -> RawProof {
        let [b0, b1] = self.b;
        RawProof {
            pi_a: vec![self.a[0].into(), self.a[1].into(), "1".into()],
            pi_b: vec![
                swap(b0).iter().copied().map(RawValue::from).collect(),
                swap(b1).iter().copied().map(RawValue::from).collect(),
                vec!["1".into(), "0".into()],
            ],
            pi_c: vec![self.c[0].into(), self.c[1].into(), "1".into()],
            protocol: Some("groth16".to_string()),
            curve: Some("bn128".to_string()),
        }
    }

    /// The public signals as raw values, the contents of `public.json`.
    pub fn raw_public_signals(&self) -> Vec<RawValue> {
        self.public_signals
            .to_array()
            .iter()
            .copied()
            .map(RawValue::from)
            .collect()
    }
}

fn swap<T>([x, y]: [T; 2]) -> [T; 2] {
    [y, x]
}

fn point(values: &[RawValue], name: &str) -> Result<[Coordinate; 2], Error> {
    match values {
        [x, y] | [x, y, _] => Ok([
            x.parse(&format!("{}[0]", name))?,
            y.parse(&format!("{}[1]", name))?,
        ]),
        _ => Err(Error::ProofFormat(format!(
            "{} has {} entries, expected 2 or 3",
            name,
            values.len()
        ))),
    }
}

fn g2_point(rows: &[Vec<RawValue>]) -> Result<[[Coordinate; 2]; 2], Error> {
    match rows {
        [r0, r1] | [r0, r1, _] => Ok([
            swap(pair(r0, "pi_b[0]")?),
            swap(pair(r1, "pi_b[1]")?),
        ]),
        _ => Err(Error::ProofFormat(format!(
            "pi_b has {} rows, expected 2 or 3",
            rows.len()
        ))),
    }
}

fn pair(values: &[RawValue], name: &str) -> Result<[Coordinate; 2], Error> {
    match values {
        [x, y] => Ok([
            x.parse(&format!("{}[0]", name))?,
            y.parse(&format!("{}[1]", name))?,
        ]),
        _ => Err(Error::ProofFormat(format!(
            "{} has {} entries, expected 2",
            name,
            values.len()
        ))),
    }
}

/// Transcode a raw prover proof and its public signals into verifier arguments.
///
/// Fails with [`Error::ProofFormat`] if any proof element has the wrong shape, if there are not
/// exactly four public signals, or if any value is not a valid element of its field. The error
/// message names the offending element, such as `pi_b[1][0]` or `public[2]`.
pub fn encode(raw: &RawProof, public_signals: &[RawValue]) -> Result<TranscodedProof, Error> {
    Ok(TranscodedProof {
        a: point(&raw.pi_a, "pi_a")?,
        b: g2_point(&raw.pi_b)?,
        c: point(&raw.pi_c, "pi_c")?,
        public_signals: PublicSignals::from_raw(public_signals)?,
    })
}

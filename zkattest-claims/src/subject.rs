/*!
The subject's side of a claim: from a signed credential to registry-ready proof arguments.

## Accept

On receiving an issuer's [`ParamsForUser`], the subject [`accept()`](Credential::accept)s them,
checking the signature against the issuer key. An invalid signature is reported as a
[`SignatureVerification`](zkattest_crypto::Error::SignatureVerification) error so the caller can
reject the credential without crashing.

## Commit

For every claim the subject [`commit()`](Credential::commit)s to the attribute value under a fresh
salt and enters the [`Committed`] state. This exposes the [`CircuitInput`] to feed the external
prover and the [`PublicSignals`] the resulting proof must carry.

## Prove

Given a [`Prover`], the subject [`prove()`](Committed::prove)s the claim. This consumes the
committed state, so a salt is never used for two proofs. The prover's public signals must match
the committed ones exactly; the raw proof is then transcoded and the subject enters the
[`Proven`] state, from which a [`ClaimSubmission`] for any attribute name can be produced.
*/

use crate::{issuer::ParamsForUser, registry::ClaimSubmission, Error, Rng};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use zkattest_crypto::{
    encode, AttributeValue, Commitment, FieldElement, MessageHash, PublicKey, PublicSignals,
    RawProof, RawValue, Salt, Signature, TranscodedProof,
};

/// A credential whose issuer signature has been checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credential {
    issuer: PublicKey,
    message_hash: MessageHash,
    signature: Signature,
    attribute_value: AttributeValue,
}

impl Credential {
    /// Accept the parameters sent by an issuer.
    ///
    /// Fails with [`KeyFormat`](zkattest_crypto::Error::KeyFormat) if the issuer key is not a
    /// curve point and with [`SignatureVerification`](zkattest_crypto::Error::SignatureVerification)
    /// if the signature does not verify.
    pub fn accept(params: &ParamsForUser) -> Result<Self, Error> {
        let issuer = params.public_key()?;
        let signature = params.signature();
        issuer.check(&params.message_hash, &signature)?;
        Ok(Self {
            issuer,
            message_hash: params.message_hash,
            signature,
            attribute_value: params.attribute_value,
        })
    }

    /// The issuer's public key.
    pub fn issuer(&self) -> &PublicKey {
        &self.issuer
    }

    /// The signed certificate digest.
    pub fn message_hash(&self) -> MessageHash {
        self.message_hash
    }

    /// The certified attribute value.
    pub fn attribute_value(&self) -> AttributeValue {
        self.attribute_value
    }

    /// Commit to the attribute value under a fresh salt.
    pub fn commit(&self, rng: &mut impl Rng) -> Result<Committed, Error> {
        let salt = Salt::new(rng);
        let commitment = Commitment::new(&self.attribute_value, &salt)?;
        Ok(Committed {
            credential: *self,
            salt,
            commitment,
        })
    }
}

/// A credential with a commitment to its attribute, ready to be proven.
#[derive(Debug)]
#[allow(missing_copy_implementations)]
pub struct Committed {
    credential: Credential,
    salt: Salt,
    commitment: Commitment,
}

impl Committed {
    /// The commitment to the attribute value.
    pub fn commitment(&self) -> Commitment {
        self.commitment
    }

    /// The public signals a valid proof of this claim exposes.
    pub fn public_signals(&self) -> PublicSignals {
        PublicSignals::new(
            self.commitment,
            &self.credential.issuer,
            self.credential.message_hash,
        )
    }

    /// The witness and public inputs for the external prover.
    pub fn circuit_input(&self) -> CircuitInput {
        let signature = &self.credential.signature;
        CircuitInput {
            attribute_value: self.credential.attribute_value,
            salt: self.salt.as_field_element(),
            signature_r8x: signature.r8x(),
            signature_r8y: signature.r8y(),
            signature_s: signature.s(),
            commitment: self.commitment,
            issuer_ax: self.credential.issuer.ax(),
            issuer_ay: self.credential.issuer.ay(),
            message_hash: self.credential.message_hash,
        }
    }

    /// Obtain a proof from `prover` and transcode it.
    ///
    /// Fails with [`ProofFormat`](zkattest_crypto::Error::ProofFormat) if the prover output is
    /// malformed or its public signals differ from [`Committed::public_signals`].
    pub fn prove(self, prover: &impl Prover) -> Result<Proven, Error> {
        let output = prover.prove(&self.circuit_input())?;
        let proof = encode(&output.proof, &output.public_signals)?;
        if proof.public_signals != self.public_signals() {
            warn!(
                commitment = %self.commitment,
                "prover returned public signals for a different claim"
            );
            return Err(zkattest_crypto::Error::ProofFormat(
                "public signals do not match the committed claim".to_string(),
            )
            .into());
        }
        debug!(commitment = %self.commitment, "transcoded proof");
        Ok(Proven { proof })
    }
}

/// A claim with a transcoded proof, ready for submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Proven {
    proof: TranscodedProof,
}

impl Proven {
    /// The transcoded proof.
    pub fn proof(&self) -> &TranscodedProof {
        &self.proof
    }

    /// The registry call arguments for a claim about `attribute_name`.
    pub fn submission(&self, attribute_name: impl Into<String>) -> ClaimSubmission {
        ClaimSubmission::new(attribute_name, self.proof)
    }
}

/// The inputs to the claim circuit, serialized with the field names of `input.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitInput {
    /// The secret attribute value.
    #[serde(rename = "attributeValue")]
    pub attribute_value: AttributeValue,
    /// The secret commitment salt.
    pub salt: FieldElement,
    /// Issuer signature nonce point, x-coordinate.
    #[serde(rename = "signature_R8x")]
    pub signature_r8x: FieldElement,
    /// Issuer signature nonce point, y-coordinate.
    #[serde(rename = "signature_R8y")]
    pub signature_r8y: FieldElement,
    /// Issuer signature scalar.
    #[serde(rename = "signature_S")]
    pub signature_s: FieldElement,
    /// The public commitment.
    #[serde(rename = "commitmentHash")]
    pub commitment: Commitment,
    /// Issuer public key, x-coordinate.
    #[serde(rename = "issuerAx")]
    pub issuer_ax: FieldElement,
    /// Issuer public key, y-coordinate.
    #[serde(rename = "issuerAy")]
    pub issuer_ay: FieldElement,
    /// The signed certificate digest.
    #[serde(rename = "messageHash")]
    pub message_hash: MessageHash,
}

/// What an external prover returns: the contents of `proof.json` and `public.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProverOutput {
    /// The raw Groth16 proof.
    pub proof: RawProof,
    /// The raw public signals, in circuit order.
    pub public_signals: Vec<RawValue>,
}

/// An external Groth16 prover for the claim circuit.
///
/// Calls are synchronous; timeouts and cancellation are the implementation's concern.
pub trait Prover {
    /// Produce a proof for the given circuit input.
    fn prove(&self, input: &CircuitInput) -> Result<ProverOutput, Error>;
}

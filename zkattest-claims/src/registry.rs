//! The on-chain claim registry, seen from the client side.
//!
//! [`ClaimRegistry`] is the call surface of the registry contract: `addClaim`, `registerIssuer`
//! and `getClaim`. Calls are synchronous and are never retried here; a
//! [`Revert`](Error::Revert) is an application-level rejection and a
//! [`Transport`](Error::Transport) failure is the only kind worth retrying.
//!
//! [`InMemoryRegistry`] enforces the contract's observable rules without a chain, with the pairing
//! check delegated to a pluggable [`ProofVerifier`].

use crate::{Error, Verification};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::{collections::HashMap, fmt, str::FromStr};
use tracing::{info, warn};
use zkattest_crypto::{
    Commitment, Coordinate, FieldElement, MessageHash, PublicSignals, TranscodedProof,
};

/// A 20-byte account address, written as `0x` followed by 40 hex digits.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address([u8; 20]);

impl Address {
    /// Wrap raw address bytes.
    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// The raw address bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .ok_or_else(|| Error::Address(format!("{:?} lacks a 0x prefix", s)))?;
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|e| Error::Address(format!("{:?}: {}", s, e)))?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for Address {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

/// Confirmation of an accepted registry transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    /// The transaction hash.
    pub transaction_hash: [u8; 32],
    /// The block the transaction was included in.
    pub block_number: u64,
    /// Gas consumed by the transaction.
    pub gas_used: u64,
}

/// A registry record for a (subject, attribute name) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// X-coordinate of the issuer key the claim was proven against.
    pub issuer_ax: FieldElement,
    /// Y-coordinate of the issuer key the claim was proven against.
    pub issuer_ay: FieldElement,
    /// The commitment to the attribute value.
    pub commitment: Commitment,
    /// Whether the claim exists. All other fields are zero when it does not.
    pub exists: bool,
}

impl Claim {
    fn absent() -> Self {
        Self {
            issuer_ax: FieldElement::from(0),
            issuer_ay: FieldElement::from(0),
            commitment: Commitment::from_field_element(FieldElement::from(0)),
            exists: false,
        }
    }
}

/// The arguments of an `addClaim` call, in contract order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSubmission {
    /// The attribute name, such as `age`.
    pub name: String,
    /// X-coordinate of the issuer key.
    pub issuer_ax: FieldElement,
    /// Y-coordinate of the issuer key.
    pub issuer_ay: FieldElement,
    /// The signed certificate digest.
    pub message_hash: MessageHash,
    /// The attribute commitment.
    pub commitment: Commitment,
    /// First proof point.
    pub a: [Coordinate; 2],
    /// Second proof point, inner pairs already reversed.
    pub b: [[Coordinate; 2]; 2],
    /// Third proof point.
    pub c: [Coordinate; 2],
}

impl ClaimSubmission {
    /// Lay out a transcoded proof as `addClaim` arguments.
    pub fn new(name: impl Into<String>, proof: TranscodedProof) -> Self {
        let signals = proof.public_signals;
        Self {
            name: name.into(),
            issuer_ax: signals.issuer_ax(),
            issuer_ay: signals.issuer_ay(),
            message_hash: signals.message_hash(),
            commitment: signals.commitment(),
            a: proof.a,
            b: proof.b,
            c: proof.c,
        }
    }

    /// Reassemble the proof the verifier checks.
    pub fn proof(&self) -> TranscodedProof {
        TranscodedProof {
            a: self.a,
            b: self.b,
            c: self.c,
            public_signals: PublicSignals::from_parts(
                self.commitment,
                self.issuer_ax,
                self.issuer_ay,
                self.message_hash,
            ),
        }
    }
}

/// The call surface of the claim registry contract.
pub trait ClaimRegistry {
    /// Submit a proven claim on behalf of `sender` (`addClaim`).
    fn submit_claim(
        &mut self,
        sender: &Address,
        submission: &ClaimSubmission,
    ) -> Result<TransactionReceipt, Error>;

    /// Register the public key of the issuer at `issuer` (`registerIssuer`).
    fn register_issuer(
        &mut self,
        sender: &Address,
        issuer: &Address,
        ax: FieldElement,
        ay: FieldElement,
    ) -> Result<TransactionReceipt, Error>;

    /// Look up the claim `subject` holds for the attribute `name` (`getClaim`).
    fn get_claim(&self, subject: &Address, name: &str) -> Result<Claim, Error>;
}

/// The pairing check of the registry's verifier contract.
pub trait ProofVerifier {
    /// Check a proof against its public signals.
    fn verify(&self, proof: &TranscodedProof) -> Verification;
}

/// A registry held in memory, enforcing the same rules as the contract:
///
/// - only the owner registers issuers;
/// - a claim must be proven against a registered issuer key;
/// - each subject holds at most one claim per attribute name;
/// - the proof must pass the [`ProofVerifier`].
#[derive(Debug)]
pub struct InMemoryRegistry<V> {
    owner: Address,
    verifier: V,
    issuers: HashMap<Address, (FieldElement, FieldElement)>,
    claims: HashMap<(Address, String), Claim>,
    block_number: u64,
}

impl<V: ProofVerifier> InMemoryRegistry<V> {
    /// Deploy a registry owned by `owner`.
    pub fn new(owner: Address, verifier: V) -> Self {
        Self {
            owner,
            verifier,
            issuers: HashMap::new(),
            claims: HashMap::new(),
            block_number: 0,
        }
    }

    fn revert(reason: &str) -> Error {
        warn!(reason, "registry call reverted");
        Error::Revert {
            reason: reason.to_string(),
        }
    }

    fn receipt(&mut self, call: &str, sender: &Address, payload: &[u8]) -> TransactionReceipt {
        self.block_number += 1;
        let mut hasher = Keccak256::new();
        hasher.update(call.as_bytes());
        hasher.update(sender.as_bytes());
        hasher.update(self.block_number.to_be_bytes());
        hasher.update(payload);
        let mut transaction_hash = [0u8; 32];
        transaction_hash.copy_from_slice(&hasher.finalize());
        TransactionReceipt {
            transaction_hash,
            block_number: self.block_number,
            gas_used: 21_000 + 16 * payload.len() as u64,
        }
    }

    fn is_registered_key(&self, ax: FieldElement, ay: FieldElement) -> bool {
        self.issuers.values().any(|&key| key == (ax, ay))
    }
}

impl<V: ProofVerifier> ClaimRegistry for InMemoryRegistry<V> {
    fn submit_claim(
        &mut self,
        sender: &Address,
        submission: &ClaimSubmission,
    ) -> Result<TransactionReceipt, Error> {
        if !self.is_registered_key(submission.issuer_ax, submission.issuer_ay) {
            return Err(Self::revert("issuer not registered"));
        }
        let key = (*sender, submission.name.clone());
        if self.claims.contains_key(&key) {
            return Err(Self::revert("claim already exists"));
        }
        if self.verifier.verify(&submission.proof()) == Verification::Failed {
            return Err(Self::revert("invalid proof"));
        }

        let _ = self.claims.insert(
            key,
            Claim {
                issuer_ax: submission.issuer_ax,
                issuer_ay: submission.issuer_ay,
                commitment: submission.commitment,
                exists: true,
            },
        );
        info!(subject = %sender, attribute = %submission.name, "claim added");
        let payload = submission.commitment.as_field_element().to_be_bytes();
        Ok(self.receipt("addClaim", sender, &payload))
    }

    fn register_issuer(
        &mut self,
        sender: &Address,
        issuer: &Address,
        ax: FieldElement,
        ay: FieldElement,
    ) -> Result<TransactionReceipt, Error> {
        if *sender != self.owner {
            return Err(Self::revert("caller is not the owner"));
        }
        let _ = self.issuers.insert(*issuer, (ax, ay));
        info!(issuer = %issuer, "issuer registered");
        Ok(self.receipt("registerIssuer", sender, issuer.as_bytes()))
    }

    fn get_claim(&self, subject: &Address, name: &str) -> Result<Claim, Error> {
        Ok(self
            .claims
            .get(&(*subject, name.to_string()))
            .copied()
            .unwrap_or_else(Claim::absent))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn addresses_parse_and_print() {
        let s = "0x00112233445566778899aabbccddeeff00112233";
        let address: Address = s.parse().unwrap();
        assert_eq!(address.to_string(), s);
        assert_eq!(
            "0x00112233445566778899AABBCCDDEEFF00112233"
                .parse::<Address>()
                .unwrap(),
            address
        );
        assert_eq!(serde_json::to_string(&address).unwrap(), format!("\"{}\"", s));
    }

    #[test]
    fn malformed_addresses_are_rejected() {
        for bad in [
            "00112233445566778899aabbccddeeff00112233",
            "0x0011",
            "0x00112233445566778899aabbccddeeff0011223344",
            "0xzz112233445566778899aabbccddeeff00112233",
        ] {
            assert!(
                matches!(bad.parse::<Address>(), Err(Error::Address(_))),
                "{} should not parse",
                bad
            );
        }
    }
}

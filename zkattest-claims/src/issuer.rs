//! Issuing signed credentials.
//!
//! An issuer holds a long-lived [`Config`] with its key pair. For each credential it digests the
//! [`CertificateData`], signs the resulting [`MessageHash`], checks its own signature, and hands the
//! subject an [`IssuedCredential`]. The part the subject needs to build a proof is the
//! [`ParamsForUser`] package.

use crate::{certificate::CertificateData, Error, Rng};
use serde::{Deserialize, Serialize};
use tracing::info;
use zkattest_crypto::{
    AttributeValue, FieldElement, KeyPair, MessageHash, PrivateKey, PublicKey, Signature,
};

/// Key material held by an issuer for its whole lifetime.
#[derive(Debug, Clone)]
pub struct Config {
    key_pair: KeyPair,
}

impl Config {
    /// Create an issuer with a freshly generated key pair.
    pub fn new(rng: &mut impl Rng) -> Self {
        Self {
            key_pair: KeyPair::new(rng),
        }
    }

    /// Restore an issuer from a stored private key.
    pub fn from_private_key(private_key: PrivateKey) -> Self {
        Self {
            key_pair: KeyPair::from_private_key(private_key),
        }
    }

    /// The issuer's public key, to be registered with the claim registry.
    pub fn public_key(&self) -> &PublicKey {
        self.key_pair.public_key()
    }

    /// The issuer's private key, for export to key storage.
    pub fn private_key(&self) -> &PrivateKey {
        self.key_pair.private_key()
    }

    /**
    Issue a credential over `certificate`, exposing the attribute named `attribute` to the subject.

    Fails if the attribute is missing or not a valid field element, or if the certificate cannot
    be digested. The fresh signature is verified before it is returned.
    */
    pub fn issue(
        &self,
        certificate: &CertificateData,
        attribute: &str,
    ) -> Result<IssuedCredential, Error> {
        let attribute_value = certificate.attribute(attribute)?;
        let message_hash = certificate.to_certificate()?.digest()?;
        let signature = self.key_pair.sign(&message_hash)?;
        self.public_key().check(&message_hash, &signature)?;

        info!(
            subject = %certificate.subject,
            attribute,
            message_hash = %message_hash,
            "issued credential"
        );

        Ok(IssuedCredential {
            certificate: certificate.clone(),
            public_key: *self.public_key(),
            message_hash,
            signature,
            attribute_name: attribute.to_string(),
            attribute_value,
        })
    }
}

/// Everything produced by one issuance.
#[derive(Debug, Clone, PartialEq)]
pub struct IssuedCredential {
    /// The certificate that was signed.
    pub certificate: CertificateData,
    /// The issuer's public key.
    pub public_key: PublicKey,
    /// The digest of the certificate.
    pub message_hash: MessageHash,
    /// The issuer's signature on the digest.
    pub signature: Signature,
    /// The name of the attribute released to the subject.
    pub attribute_name: String,
    /// The value of that attribute in the certificate.
    pub attribute_value: AttributeValue,
}

impl IssuedCredential {
    /// The package handed to the subject.
    pub fn params_for_user(&self) -> ParamsForUser {
        ParamsForUser {
            issuer_ax: self.public_key.ax(),
            issuer_ay: self.public_key.ay(),
            message_hash: self.message_hash,
            signature_r8x: self.signature.r8x(),
            signature_r8y: self.signature.r8y(),
            signature_s: self.signature.s(),
            attribute_value: self.attribute_value,
        }
    }
}

/// The parameters a subject needs to commit to and prove a claim about a credential.
///
/// Serialized with the field names of `params_for_user.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamsForUser {
    /// X-coordinate of the issuer public key.
    #[serde(rename = "issuerAx")]
    pub issuer_ax: FieldElement,
    /// Y-coordinate of the issuer public key.
    #[serde(rename = "issuerAy")]
    pub issuer_ay: FieldElement,
    /// The signed certificate digest.
    #[serde(rename = "messageHash")]
    pub message_hash: MessageHash,
    /// Signature nonce point, x-coordinate.
    #[serde(rename = "signature_R8x")]
    pub signature_r8x: FieldElement,
    /// Signature nonce point, y-coordinate.
    #[serde(rename = "signature_R8y")]
    pub signature_r8y: FieldElement,
    /// Signature scalar.
    #[serde(rename = "signature_S")]
    pub signature_s: FieldElement,
    /// The attribute value taken from the certificate. Written as a JSON number when it fits in
    /// a `u64`, otherwise as a decimal string.
    #[serde(rename = "attributeValueFromCert", with = "json_number")]
    pub attribute_value: AttributeValue,
}

impl ParamsForUser {
    /// The issuer public key. Fails if the coordinates are not a curve point.
    pub fn public_key(&self) -> Result<PublicKey, Error> {
        Ok(PublicKey::new(self.issuer_ax, self.issuer_ay)?)
    }

    /// The signature.
    pub fn signature(&self) -> Signature {
        Signature::from_parts(self.signature_r8x, self.signature_r8y, self.signature_s)
    }
}

mod json_number {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use zkattest_crypto::AttributeValue;

    pub fn serialize<S: Serializer>(
        value: &AttributeValue,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match u64::try_from(&value.as_field_element().to_biguint()) {
            Ok(n) => serializer.serialize_u64(n),
            Err(_) => value.serialize(serializer),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<AttributeValue, D::Error> {
        AttributeValue::deserialize(deserializer)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn certificate() -> CertificateData {
        CertificateData::new("did:example:alice", "did:example:dmv", "ProofOfAge", "test")
            .with_detail("age", 30)
    }

    #[test]
    fn issued_signature_verifies() {
        let mut rng = crate::test::rng();
        let issuer = Config::new(&mut rng);
        let cert = certificate();
        let issued = issuer.issue(&cert, "age").unwrap();

        assert_eq!(
            issued.message_hash,
            cert.to_certificate().unwrap().digest().unwrap()
        );
        assert!(issuer
            .public_key()
            .verify(&issued.message_hash, &issued.signature));
        assert_eq!(issued.attribute_value, AttributeValue::from(30));
    }

    #[test]
    fn missing_attribute_is_rejected() {
        let mut rng = crate::test::rng();
        let issuer = Config::new(&mut rng);
        assert!(matches!(
            issuer.issue(&certificate(), "height"),
            Err(Error::Attribute(_))
        ));
    }

    #[test]
    fn params_for_user_field_names() {
        let mut rng = crate::test::rng();
        let issuer = Config::new(&mut rng);
        let params = issuer
            .issue(&certificate(), "age")
            .unwrap()
            .params_for_user();
        let json = serde_json::to_value(params).unwrap();
        for key in [
            "issuerAx",
            "issuerAy",
            "messageHash",
            "signature_R8x",
            "signature_R8y",
            "signature_S",
        ] {
            assert!(json[key].is_string(), "missing or non-string {}", key);
        }
        assert_eq!(json["attributeValueFromCert"], 30);
        let back: ParamsForUser = serde_json::from_value(json).unwrap();
        assert_eq!(back, params);
        assert_eq!(back.public_key().unwrap(), *issuer.public_key());
    }

    #[test]
    fn large_attribute_values_are_written_as_strings() {
        let mut rng = crate::test::rng();
        let issuer = Config::new(&mut rng);
        let big = "18446744073709551616";
        let cert = certificate().with_detail("score", big);
        let params = issuer.issue(&cert, "score").unwrap().params_for_user();
        let json = serde_json::to_value(params).unwrap();
        assert_eq!(json["attributeValueFromCert"], big);
        let back: ParamsForUser = serde_json::from_value(json).unwrap();
        assert_eq!(back, params);
    }

    #[test]
    fn restored_issuer_has_same_key() {
        let mut rng = crate::test::rng();
        let issuer = Config::new(&mut rng);
        let restored = Config::from_private_key(issuer.private_key().clone());
        assert_eq!(restored.public_key(), issuer.public_key());
    }
}

//! The attestation payload an issuer signs.
//!
//! A [`CertificateData`] is rendered to bytes as pretty-printed JSON with two-space indentation,
//! fields in declaration order, which is the exact byte string whose digest is signed. Anyone
//! holding the same JSON can recompute the [`MessageHash`](zkattest_crypto::MessageHash).

use crate::Error;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use zkattest_crypto::{AttributeValue, Certificate, FieldElement};

/// The contents of a credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateData {
    /// Identifier of the subject the credential is about.
    pub subject: String,
    /// Identifier of the issuing party.
    pub issuer: String,
    /// Issuance time, rendered as RFC 3339 UTC with millisecond precision.
    #[serde(with = "iso_millis")]
    pub issuance_date: DateTime<Utc>,
    /// The credential type, such as `ProofOfAgeCredential`.
    #[serde(rename = "type")]
    pub credential_type: String,
    /// Named attribute values. Keys are rendered in sorted order.
    pub details: Map<String, Value>,
    /// Free-form description of the credential.
    pub context: String,
}

impl CertificateData {
    /// Start a certificate issued now, with no attributes.
    pub fn new(
        subject: impl Into<String>,
        issuer: impl Into<String>,
        credential_type: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            issuer: issuer.into(),
            issuance_date: truncate_to_millis(Utc::now()),
            credential_type: credential_type.into(),
            details: Map::new(),
            context: context.into(),
        }
    }

    /// Set the issuance time. Sub-millisecond precision is discarded.
    pub fn issued_at(mut self, date: DateTime<Utc>) -> Self {
        self.issuance_date = truncate_to_millis(date);
        self
    }

    /// Add or replace an attribute.
    pub fn with_detail(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let _ = self.details.insert(name.into(), value.into());
        self
    }

    /// The exact bytes the issuer signs.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, Error> {
        serde_json::to_vec_pretty(self).map_err(Error::Encoding)
    }

    /// The certificate as a digestible payload.
    pub fn to_certificate(&self) -> Result<Certificate, Error> {
        self.canonical_bytes().map(Certificate::new)
    }

    /// Extract an integer attribute.
    ///
    /// The attribute must be a JSON integer or a decimal string. Negative or out-of-range values
    /// fail with a [`FieldRange`](zkattest_crypto::Error::FieldRange) error.
    pub fn attribute(&self, name: &str) -> Result<AttributeValue, Error> {
        let value = self
            .details
            .get(name)
            .ok_or_else(|| Error::Attribute(format!("certificate has no `{}` attribute", name)))?;
        match value {
            Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    Ok(AttributeValue::from(u))
                } else if let Some(i) = n.as_i64() {
                    Ok(AttributeValue::new(i)?)
                } else {
                    Err(Error::Attribute(format!("`{}` is not an integer: {}", name, n)))
                }
            }
            Value::String(s) => Ok(s.parse::<FieldElement>()?.into()),
            other => Err(Error::Attribute(format!(
                "`{}` is not an integer: {}",
                name, other
            ))),
        }
    }
}

fn truncate_to_millis(date: DateTime<Utc>) -> DateTime<Utc> {
    let millis = date.timestamp_millis();
    DateTime::from_timestamp_millis(millis).unwrap_or(date)
}

mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|date| date.with_timezone(&Utc))
            .map_err(de::Error::custom)
    }
}

impl std::fmt::Display for CertificateData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} for {} issued by {} at {}",
            self.credential_type,
            self.subject,
            self.issuer,
            self.issuance_date.to_rfc3339_opts(SecondsFormat::Millis, true)
        )
    }
}

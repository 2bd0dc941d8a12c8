//! File adapters for the artifacts exchanged with external tooling.
//!
//! The protocol types in this crate are plain values; this module is the only place they meet the
//! filesystem. [`ArtifactConfig`] names every file. The default layout matches what the circom
//! and snarkjs tooling expects: prover files under `build/`, issuer files under `issuer_output/`.
//!
//! Every failure carries the path it occurred on.

use crate::{
    certificate::CertificateData,
    issuer::{IssuedCredential, ParamsForUser},
    subject::{CircuitInput, ProverOutput},
    Error,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};
use zkattest_crypto::{PrivateKey, PublicKey, RawProof, RawValue};

/// Locations of all artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
    /// Directory of prover inputs and outputs.
    pub build_dir: PathBuf,
    /// Directory of issuer outputs.
    pub issuer_dir: PathBuf,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            build_dir: PathBuf::from("build"),
            issuer_dir: PathBuf::from("issuer_output"),
        }
    }
}

impl ArtifactConfig {
    /// Place both directories under `root`.
    pub fn rooted_at(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let default = Self::default();
        Self {
            build_dir: root.join(default.build_dir),
            issuer_dir: root.join(default.issuer_dir),
        }
    }

    /// Load a configuration from a JSON file. Missing fields take their default values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        read_json(path)
    }

    /// The snarkjs proof, `proof.json`.
    pub fn proof(&self) -> PathBuf {
        self.build_dir.join("proof.json")
    }

    /// The snarkjs public signals, `public.json`.
    pub fn public_signals(&self) -> PathBuf {
        self.build_dir.join("public.json")
    }

    /// The circuit input, `input.json`.
    pub fn circuit_input(&self) -> PathBuf {
        self.build_dir.join("input.json")
    }

    /// The issuer's private key, `issuer_private_key.hex`.
    pub fn private_key(&self) -> PathBuf {
        self.issuer_dir.join("issuer_private_key.hex")
    }

    /// The issuer's public key, `issuer_public_key.json`.
    pub fn public_key(&self) -> PathBuf {
        self.issuer_dir.join("issuer_public_key.json")
    }

    /// The signed certificate, `certificate_data.json`.
    pub fn certificate(&self) -> PathBuf {
        self.issuer_dir.join("certificate_data.json")
    }

    /// The certificate digest as a decimal string, `certificate_poseidon_hash.txt`.
    pub fn message_hash(&self) -> PathBuf {
        self.issuer_dir.join("certificate_poseidon_hash.txt")
    }

    /// The issuer signature, `certificate_signature.json`.
    pub fn signature(&self) -> PathBuf {
        self.issuer_dir.join("certificate_signature.json")
    }

    /// The package for the subject, `params_for_user.json`.
    pub fn params_for_user(&self) -> PathBuf {
        self.issuer_dir.join("params_for_user.json")
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> Error + '_ {
    move |source| Error::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Create `dir` and its parents if they do not exist.
pub fn ensure_dir(dir: impl AsRef<Path>) -> Result<(), Error> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(io_error(dir))
}

fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents).map_err(io_error(path))?;
    debug!(path = %path.display(), "wrote artifact");
    Ok(())
}

/// Read and parse a JSON file.
pub fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, Error> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(io_error(path))?;
    debug!(path = %path.display(), "read artifact");
    serde_json::from_slice(&bytes).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a value as pretty-printed JSON, creating parent directories as needed.
pub fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<(), Error> {
    let bytes = serde_json::to_vec_pretty(value).map_err(Error::Encoding)?;
    write_file(path.as_ref(), bytes)
}

/// Read a snarkjs proof.
pub fn read_proof(path: impl AsRef<Path>) -> Result<RawProof, Error> {
    read_json(path)
}

/// Read snarkjs public signals.
pub fn read_public_signals(path: impl AsRef<Path>) -> Result<Vec<RawValue>, Error> {
    read_json(path)
}

/// Read the proof and public signals a prover left in the build directory.
pub fn read_prover_output(config: &ArtifactConfig) -> Result<ProverOutput, Error> {
    Ok(ProverOutput {
        proof: read_proof(config.proof())?,
        public_signals: read_public_signals(config.public_signals())?,
    })
}

/// Write the circuit input for the prover.
pub fn write_circuit_input(config: &ArtifactConfig, input: &CircuitInput) -> Result<(), Error> {
    let path = config.circuit_input();
    write_json(&path, input)?;
    info!(path = %path.display(), "wrote circuit input");
    Ok(())
}

/// Read an issuer private key stored as hex.
pub fn read_private_key(path: impl AsRef<Path>) -> Result<PrivateKey, Error> {
    let path = path.as_ref();
    let hex = fs::read_to_string(path).map_err(io_error(path))?;
    Ok(PrivateKey::from_hex(&hex)?)
}

/// Store an issuer private key as hex.
pub fn write_private_key(path: impl AsRef<Path>, key: &PrivateKey) -> Result<(), Error> {
    write_file(path.as_ref(), key.to_hex().as_bytes())
}

/// Read an issuer public key. Fails if the coordinates are not a curve point.
pub fn read_issuer_public_key(path: impl AsRef<Path>) -> Result<PublicKey, Error> {
    read_json(path)
}

/// Read the parameters an issuer sent to the subject.
pub fn read_params_for_user(path: impl AsRef<Path>) -> Result<ParamsForUser, Error> {
    read_json(path)
}

/// Read a signed certificate.
pub fn read_certificate(path: impl AsRef<Path>) -> Result<CertificateData, Error> {
    read_json(path)
}

/// Write every issuer artifact for a credential, including the issuer's private key.
pub fn write_issuer_outputs(
    config: &ArtifactConfig,
    private_key: &PrivateKey,
    issued: &IssuedCredential,
) -> Result<(), Error> {
    ensure_dir(&config.issuer_dir)?;
    write_private_key(config.private_key(), private_key)?;
    write_json(config.public_key(), &issued.public_key)?;
    write_file(&config.certificate(), issued.certificate.canonical_bytes()?)?;
    write_file(&config.message_hash(), issued.message_hash.to_string())?;
    write_json(config.signature(), &issued.signature)?;
    write_json(config.params_for_user(), &issued.params_for_user())?;
    info!(
        dir = %config.issuer_dir.display(),
        subject = %issued.certificate.subject,
        "wrote issuer outputs"
    );
    Ok(())
}

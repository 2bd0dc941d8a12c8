mod test_utils;

use test_utils::{FakeProver, FakeVerifier};
use zkattest_claims::{
    artifacts::{self, ArtifactConfig},
    issuer,
    registry::InMemoryRegistry,
    subject::Credential,
    Address, CertificateData, ClaimRegistry, Error,
};
use zkattest_crypto::{FieldElement, PublicKey, Signature};

fn address(byte: u8) -> Address {
    Address::new([byte; 20])
}

fn certificate() -> CertificateData {
    CertificateData::new(
        "did:example:user123",
        "did:example:trustedIssuerCorp",
        "ProofOfAgeCredential",
        "Example Credential for ZK Proof Demo",
    )
    .with_detail("age", 25)
    .with_detail("nationality", "ExampleLand")
}

#[test]
fn claim_is_issued_proven_and_registered() {
    let mut rng = test_utils::seeded_rng();
    let owner = address(1);
    let issuer_account = address(2);
    let subject_account = address(3);

    // Issuer side.
    let issuer = issuer::Config::new(&mut rng);
    let issued = issuer.issue(&certificate(), "age").unwrap();
    let params = issued.params_for_user();

    // Registry setup.
    let mut registry = InMemoryRegistry::new(owner, FakeVerifier);
    let receipt = registry
        .register_issuer(
            &owner,
            &issuer_account,
            issuer.public_key().ax(),
            issuer.public_key().ay(),
        )
        .unwrap();
    assert_eq!(receipt.block_number, 1);

    // Subject side.
    let committed = Credential::accept(&params)
        .unwrap()
        .commit(&mut rng)
        .unwrap();
    let commitment = committed.commitment();
    let proven = committed.prove(&FakeProver).unwrap();
    let submission = proven.submission("age");
    assert_eq!(submission.commitment, commitment);
    assert_eq!(submission.message_hash, issued.message_hash);

    let receipt = registry.submit_claim(&subject_account, &submission).unwrap();
    assert_eq!(receipt.block_number, 2);

    let claim = registry.get_claim(&subject_account, "age").unwrap();
    assert!(claim.exists);
    assert_eq!(claim.commitment, commitment);
    assert_eq!(claim.issuer_ax, issuer.public_key().ax());
    assert_eq!(claim.issuer_ay, issuer.public_key().ay());

    // Other subjects and attributes have no claim.
    assert!(!registry.get_claim(&owner, "age").unwrap().exists);
    assert!(!registry.get_claim(&subject_account, "height").unwrap().exists);
}

#[test]
fn registry_reverts_are_surfaced_unchanged() {
    let mut rng = test_utils::seeded_rng();
    let owner = address(1);
    let subject_account = address(3);
    let issuer = issuer::Config::new(&mut rng);
    let params = issuer
        .issue(&certificate(), "age")
        .unwrap()
        .params_for_user();
    let credential = Credential::accept(&params).unwrap();
    let mut registry = InMemoryRegistry::new(owner, FakeVerifier);

    let submission = credential
        .commit(&mut rng)
        .unwrap()
        .prove(&FakeProver)
        .unwrap()
        .submission("age");

    // Unknown issuer.
    match registry.submit_claim(&subject_account, &submission) {
        Err(err @ Error::Revert { .. }) => assert!(!err.is_retryable()),
        other => panic!("unexpected result: {:?}", other),
    }

    // Only the owner may register issuers.
    assert!(matches!(
        registry.register_issuer(
            &subject_account,
            &address(2),
            issuer.public_key().ax(),
            issuer.public_key().ay()
        ),
        Err(Error::Revert { .. })
    ));
    let _ = registry
        .register_issuer(
            &owner,
            &address(2),
            issuer.public_key().ax(),
            issuer.public_key().ay(),
        )
        .unwrap();

    let _ = registry.submit_claim(&subject_account, &submission).unwrap();

    // A second claim for the same attribute is rejected, even with a fresh commitment.
    let again = credential
        .commit(&mut rng)
        .unwrap()
        .prove(&FakeProver)
        .unwrap()
        .submission("age");
    match registry.submit_claim(&subject_account, &again) {
        Err(Error::Revert { reason }) => assert_eq!(reason, "claim already exists"),
        other => panic!("unexpected result: {:?}", other),
    }

    // A proof with an untouched b pair fails verification.
    let mut tampered = credential
        .commit(&mut rng)
        .unwrap()
        .prove(&FakeProver)
        .unwrap()
        .submission("nationality");
    tampered.b[0].reverse();
    match registry.submit_claim(&subject_account, &tampered) {
        Err(Error::Revert { reason }) => assert_eq!(reason, "invalid proof"),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn forged_params_are_rejected_by_the_subject() {
    let mut rng = test_utils::seeded_rng();
    let issuer = issuer::Config::new(&mut rng);
    let impostor = issuer::Config::new(&mut rng);
    let mut params = issuer
        .issue(&certificate(), "age")
        .unwrap()
        .params_for_user();

    // Claim the signature came from a different issuer.
    params.issuer_ax = impostor.public_key().ax();
    params.issuer_ay = impostor.public_key().ay();
    assert!(matches!(
        Credential::accept(&params),
        Err(Error::Crypto(
            zkattest_crypto::Error::SignatureVerification
        ))
    ));

    // Coordinates that are not a curve point.
    params.issuer_ax = FieldElement::from(1);
    assert!(matches!(
        Credential::accept(&params),
        Err(Error::Crypto(zkattest_crypto::Error::KeyFormat(_)))
    ));
}

#[test]
fn issuer_outputs_round_trip_through_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = ArtifactConfig::rooted_at(dir.path());
    let mut rng = test_utils::seeded_rng();

    let issuer = issuer::Config::new(&mut rng);
    let issued = issuer.issue(&certificate(), "age").unwrap();
    artifacts::write_issuer_outputs(&config, issuer.private_key(), &issued).unwrap();

    let restored =
        issuer::Config::from_private_key(artifacts::read_private_key(config.private_key()).unwrap());
    assert_eq!(restored.public_key(), issuer.public_key());

    let public_key: PublicKey = artifacts::read_issuer_public_key(config.public_key()).unwrap();
    assert_eq!(&public_key, issuer.public_key());

    let signature: Signature = artifacts::read_json(config.signature()).unwrap();
    assert_eq!(signature, issued.signature);

    let hash = std::fs::read_to_string(config.message_hash()).unwrap();
    assert_eq!(hash, issued.message_hash.to_string());

    // The stored certificate digests to the signed hash.
    let stored = artifacts::read_certificate(config.certificate()).unwrap();
    assert_eq!(
        stored.to_certificate().unwrap().digest().unwrap(),
        issued.message_hash
    );

    let params = artifacts::read_params_for_user(config.params_for_user()).unwrap();
    assert_eq!(params, issued.params_for_user());
    assert!(Credential::accept(&params).is_ok());
}

#[test]
fn subject_round_trips_through_prover_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = ArtifactConfig::rooted_at(dir.path());
    let mut rng = test_utils::seeded_rng();

    let issuer = issuer::Config::new(&mut rng);
    let params = issuer
        .issue(&certificate(), "age")
        .unwrap()
        .params_for_user();
    let committed = Credential::accept(&params)
        .unwrap()
        .commit(&mut rng)
        .unwrap();

    artifacts::write_circuit_input(&config, &committed.circuit_input()).unwrap();
    let input: serde_json::Value = artifacts::read_json(config.circuit_input()).unwrap();
    assert_eq!(input["attributeValue"], "25");
    assert_eq!(
        input["commitmentHash"],
        committed.commitment().to_string().as_str()
    );

    // Simulate snarkjs writing its outputs, with b in native order.
    let signals = committed.public_signals().to_array();
    artifacts::write_json(config.proof(), &test_utils::fake_proof()).unwrap();
    artifacts::write_json(
        config.public_signals(),
        &signals.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
    )
    .unwrap();

    let output = artifacts::read_prover_output(&config).unwrap();
    let proof = zkattest_crypto::encode(&output.proof, &output.public_signals).unwrap();
    assert_eq!(proof.public_signals, committed.public_signals());
    assert_eq!(proof.b[0][0].to_string(), "22");
    assert_eq!(proof.b[1][1].to_string(), "23");
}

#[test]
fn short_public_json_is_a_proof_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = ArtifactConfig::rooted_at(dir.path());
    artifacts::write_json(config.proof(), &test_utils::fake_proof()).unwrap();
    artifacts::write_json(config.public_signals(), &test_utils::raw(&["1", "2", "3"])).unwrap();

    let output = artifacts::read_prover_output(&config).unwrap();
    assert!(matches!(
        zkattest_crypto::encode(&output.proof, &output.public_signals),
        Err(zkattest_crypto::Error::ProofFormat(_))
    ));
}

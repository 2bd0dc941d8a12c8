use zkattest_crypto::{encode, Coordinate, Error, FieldElement, PublicSignals, RawProof, RawValue};

const PROOF_JSON: &str = r#"{
  "pi_a": [
    "13232135287924839101542934812347124890418273481023947102394710234791234791",
    "20142934719283471923847129384712938471293847129384712938471293847129384712",
    "1"
  ],
  "pi_b": [
    ["5", "6"],
    ["7", "8"],
    ["1", "0"]
  ],
  "pi_c": [
    "11111111111111111111111111111111111111111111111111111111111111111111111111",
    "2222222222222222222222222222222222222222222222222222222222222222222222222",
    "1"
  ],
  "protocol": "groth16",
  "curve": "bn128"
}"#;

const PUBLIC_JSON: &str = r#"["111", "222", "333", "444"]"#;

fn coordinate(s: &str) -> Coordinate {
    s.parse().unwrap()
}

#[test]
fn snarkjs_output_transcodes() {
    let proof: RawProof = serde_json::from_str(PROOF_JSON).unwrap();
    let public: Vec<RawValue> = serde_json::from_str(PUBLIC_JSON).unwrap();
    let transcoded = encode(&proof, &public).unwrap();

    assert_eq!(
        transcoded.b,
        [
            [coordinate("6"), coordinate("5")],
            [coordinate("8"), coordinate("7")]
        ]
    );
    assert_eq!(
        transcoded.a,
        [
            coordinate(
                "13232135287924839101542934812347124890418273481023947102394710234791234791"
            ),
            coordinate(
                "20142934719283471923847129384712938471293847129384712938471293847129384712"
            ),
        ]
    );
    assert_eq!(transcoded.c[1].to_string().len(), 73);

    let signals = transcoded.public_signals;
    assert_eq!(signals.commitment().as_field_element(), FieldElement::from(111));
    assert_eq!(signals.issuer_ax(), FieldElement::from(222));
    assert_eq!(signals.issuer_ay(), FieldElement::from(333));
    assert_eq!(signals.message_hash().as_field_element(), FieldElement::from(444));
}

#[test]
fn transcoded_proof_serializes_as_verifier_arguments() {
    let proof: RawProof = serde_json::from_str(PROOF_JSON).unwrap();
    let public: Vec<RawValue> = serde_json::from_str(PUBLIC_JSON).unwrap();
    let transcoded = encode(&proof, &public).unwrap();

    let json = serde_json::to_value(transcoded).unwrap();
    assert_eq!(json["b"], serde_json::json!([["6", "5"], ["8", "7"]]));
    assert_eq!(
        json["public_signals"],
        serde_json::json!(["111", "222", "333", "444"])
    );
}

#[test]
fn round_trip_restores_raw_b() {
    let proof: RawProof = serde_json::from_str(PROOF_JSON).unwrap();
    let public: Vec<RawValue> = serde_json::from_str(PUBLIC_JSON).unwrap();
    let transcoded = encode(&proof, &public).unwrap();
    let raw = transcoded.to_raw_proof();
    assert_eq!(raw, proof);
}

#[test]
fn public_json_must_have_four_entries() {
    let proof: RawProof = serde_json::from_str(PROOF_JSON).unwrap();
    let public: Vec<RawValue> = serde_json::from_str(r#"["111", "222", "333"]"#).unwrap();
    assert!(matches!(encode(&proof, &public), Err(Error::ProofFormat(_))));
    assert!(serde_json::from_str::<PublicSignals>(r#"["111", "222", "333"]"#).is_err());
}

#[test]
fn non_numeric_elements_are_rejected() {
    let bad = PROOF_JSON.replace(r#"["7", "8"]"#, r#"["7", "eight"]"#);
    let proof: RawProof = serde_json::from_str(&bad).unwrap();
    let public: Vec<RawValue> = serde_json::from_str(PUBLIC_JSON).unwrap();
    match encode(&proof, &public) {
        Err(Error::ProofFormat(msg)) => assert!(msg.contains("pi_b[1][1]"), "{}", msg),
        other => panic!("unexpected result: {:?}", other),
    }
}

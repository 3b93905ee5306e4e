use didcore_types::{
    canonical_json, AuthType, DidDocument, DidKeyType, Proof, ProofPurpose, ProofType,
    UtcTimestamp, VerificationMethod,
};

fn fixed(ts: &str) -> UtcTimestamp {
    ts.parse().unwrap()
}

fn document() -> DidDocument {
    let mut doc = DidDocument::new("did:example:holder", "did:example:holder");
    doc.created = fixed("2024-03-01T09:00:00Z");
    doc.updated = fixed("2024-03-01T09:00:00Z");
    doc.verification_method.push(VerificationMethod {
        id: "auth".into(),
        key_type: DidKeyType::Secp256r1VerificationKey2018,
        controller: "did:example:holder".into(),
        public_key_multibase: "zKey".into(),
        auth_type: AuthType::Pin,
    });
    doc.authentication.push("auth".into());
    doc
}

#[test]
fn document_serializes_in_declaration_order() {
    let json = canonical_json(&document()).unwrap();
    assert_eq!(
        json,
        concat!(
            r#"{"@context":["https://www.w3.org/ns/did/v1"],"id":"did:example:holder","#,
            r#""controller":"did:example:holder","created":"2024-03-01T09:00:00Z","#,
            r#""updated":"2024-03-01T09:00:00Z","versionId":"1","deactivated":false,"#,
            r#""verificationMethod":[{"id":"auth","type":"Secp256r1VerificationKey2018","#,
            r#""controller":"did:example:holder","publicKeyMultibase":"zKey","authType":2}],"#,
            r#""authentication":["auth"]}"#
        )
    );
}

#[test]
fn reparsed_document_reproduces_identical_bytes() {
    let mut doc = document();
    doc.proof = Some(Proof {
        proof_type: ProofType::Secp256r1Signature2018,
        created: fixed("2024-03-01T09:05:00Z"),
        proof_purpose: ProofPurpose::Authentication,
        verification_method: "did:example:holder?versionId=1#auth".into(),
        proof_value: Some("zSig".into()),
    });
    let first = canonical_json(&doc).unwrap();
    let reparsed: DidDocument = serde_json::from_str(&first).unwrap();
    assert_eq!(canonical_json(&reparsed).unwrap(), first);
}

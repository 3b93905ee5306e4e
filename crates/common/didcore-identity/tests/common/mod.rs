#![allow(dead_code)]

use didcore_crypto::{EccCurve, KeyPair};
use didcore_identity::{sign_payload, DidManager, VcManager, VpManager};
use didcore_types::{
    AuthType, ClaimDef, ClaimFormat, ClaimInfo, ClaimNamespace, ClaimType, DidDocument,
    DidKeyInfo, DidKeyType, IssueVcParam, Location, ProofPurpose, ProviderDetail, SchemaClaims,
    SchemaCredentialSubject, SchemaMetadata, UtcTimestamp, VcSchema, VerifiableCredential,
    VerifiablePresentation,
};

pub const ISSUER_DID: &str = "did:example:issuer";
pub const HOLDER_DID: &str = "did:example:holder";
pub const SCHEMA_ID: &str = "https://schema.example.org/pid/v1";
pub const NAMESPACE: &str = "org.example.pid";

/// A DID owner and the secret keys behind its verification methods.
pub struct Party {
    pub document: DidDocument,
    pub keys: Vec<(String, KeyPair)>,
}

impl Party {
    pub fn key(&self, key_id: &str) -> &KeyPair {
        self.keys
            .iter()
            .find(|(id, _)| id == key_id)
            .map(|(_, keypair)| keypair)
            .expect("fixture key")
    }
}

fn key_info(did: &str, key_id: &str, keypair: &KeyPair, purposes: &[ProofPurpose]) -> DidKeyInfo {
    let algo_type = match keypair.curve() {
        EccCurve::Secp256k1 => DidKeyType::Secp256k1VerificationKey2018,
        EccCurve::Secp256r1 => DidKeyType::Secp256r1VerificationKey2018,
    };
    DidKeyInfo {
        controller: did.to_string(),
        key_id: key_id.to_string(),
        public_key: keypair.public_key_multibase(),
        algo_type,
        auth_type: AuthType::Free,
        key_purpose: purposes.to_vec(),
    }
}

fn party(did: &str, keys: Vec<(&str, EccCurve, Vec<ProofPurpose>)>) -> Party {
    let keys: Vec<(String, KeyPair, Vec<ProofPurpose>)> = keys
        .into_iter()
        .map(|(id, curve, purposes)| (id.to_string(), KeyPair::generate(curve), purposes))
        .collect();
    let infos: Vec<DidKeyInfo> = keys
        .iter()
        .map(|(id, keypair, purposes)| key_info(did, id, keypair, purposes))
        .collect();

    let mut manager = DidManager::new();
    manager.create_document(did, did, &infos).unwrap();
    Party {
        document: manager.into_document().unwrap(),
        keys: keys.into_iter().map(|(id, keypair, _)| (id, keypair)).collect(),
    }
}

/// Issuer with one P-256 assertion key.
pub fn issuer() -> Party {
    party(
        ISSUER_DID,
        vec![(
            "assert",
            EccCurve::Secp256r1,
            vec![ProofPurpose::AssertionMethod, ProofPurpose::Authentication],
        )],
    )
}

/// Holder with two authentication keys on different curves and one
/// key-agreement key.
pub fn holder() -> Party {
    party(
        HOLDER_DID,
        vec![
            ("auth", EccCurve::Secp256k1, vec![ProofPurpose::Authentication]),
            ("pin", EccCurve::Secp256r1, vec![ProofPurpose::Authentication]),
            ("agree", EccCurve::Secp256r1, vec![ProofPurpose::KeyAgreement]),
        ],
    )
}

fn claim_def(id: &str, caption: &str, claim_type: ClaimType, format: ClaimFormat) -> ClaimDef {
    ClaimDef {
        id: id.to_string(),
        caption: caption.to_string(),
        claim_type,
        format,
        hide_value: false,
        location: Some(Location::Inline),
        required: None,
        description: None,
        i18n: None,
    }
}

pub fn schema() -> VcSchema {
    let mut portrait = claim_def("portrait", "Portrait", ClaimType::Image, ClaimFormat::Png);
    portrait.location = Some(Location::Remote);
    portrait.required = Some(false);

    VcSchema {
        id: SCHEMA_ID.to_string(),
        title: Some("Personal identity".to_string()),
        description: None,
        metadata: SchemaMetadata {
            format_version: "1.0".to_string(),
            language: "en".to_string(),
        },
        credential_subject: SchemaCredentialSubject {
            claims: vec![SchemaClaims {
                namespace: ClaimNamespace {
                    id: NAMESPACE.to_string(),
                    name: None,
                    reference: None,
                },
                items: vec![
                    claim_def("family_name", "Family name", ClaimType::Text, ClaimFormat::Plain),
                    claim_def("birth_date", "Birth date", ClaimType::Text, ClaimFormat::Plain),
                    portrait,
                ],
            }],
        },
    }
}

pub fn code(id: &str) -> String {
    format!("{}.{}", NAMESPACE, id)
}

/// Issuance request carrying all three claims.
pub fn issue_param() -> IssueVcParam {
    let mut param = IssueVcParam::new(
        schema(),
        ProviderDetail {
            did: ISSUER_DID.to_string(),
            cert_vc_ref: None,
            name: Some("Example issuer".to_string()),
        },
    )
    .with_claim(ClaimInfo::new(code("family_name"), "Doe"))
    .with_claim(ClaimInfo::new(code("birth_date"), "1990-01-01"))
    .with_claim(ClaimInfo::new(code("portrait"), vec![0x89, 0x50, 0x4e, 0x47]));
    param.vc_type = vec![
        "VerifiableCredential".to_string(),
        "IdentityCredential".to_string(),
    ];
    param
}

/// Issue `param` to the holder and sign it with the issuer's assertion key.
pub fn sign_credential(issuer: &Party, param: &IssueVcParam) -> VerifiableCredential {
    let manager = VcManager::new();
    let vc = manager.issue_credential(param, HOLDER_DID).unwrap();
    let mut payloads = manager
        .get_origin_data_for_sign("assert", &issuer.document, &vc)
        .unwrap();
    for payload in payloads.iter_mut() {
        sign_payload(&mut payload.params, issuer.key("assert")).unwrap();
    }
    manager.add_proof(vc, &payloads).unwrap()
}

pub fn signed_credential(issuer: &Party) -> VerifiableCredential {
    sign_credential(issuer, &issue_param())
}

pub fn unsigned_presentation(credentials: Vec<VerifiableCredential>) -> VerifiablePresentation {
    VerifiablePresentation {
        context: vec!["https://www.w3.org/2018/credentials/v1".to_string()],
        id: "urn:uuid:3f1e2c9a-5b7d-4e2f-9a61-0c8d4b2e7f10".to_string(),
        types: vec!["VerifiablePresentation".to_string()],
        holder: HOLDER_DID.to_string(),
        valid_from: UtcTimestamp::now(),
        valid_until: UtcTimestamp::far_future(),
        verifier_nonce: Some("n-0S6_WzA2Mj".to_string()),
        verifiable_credential: credentials,
        proof: None,
        proofs: None,
    }
}

/// Sign `vp` with each of the holder keys in `key_ids`.
pub fn sign_presentation(
    holder: &Party,
    vp: VerifiablePresentation,
    key_ids: &[&str],
) -> VerifiablePresentation {
    let manager = VpManager::new();
    let mut payloads = manager
        .get_origin_data_for_sign(&vp, &holder.document, key_ids)
        .unwrap();
    for payload in payloads.iter_mut() {
        let keypair = holder.key(&payload.key_id);
        sign_payload(payload, keypair).unwrap();
    }
    manager.add_proof(vp, &payloads).unwrap()
}

pub fn signed_presentation(
    holder: &Party,
    credentials: Vec<VerifiableCredential>,
) -> VerifiablePresentation {
    sign_presentation(holder, unsigned_presentation(credentials), &["auth"])
}

mod common;

use common::*;
use didcore_identity::{PresentationState, VpManager};
use didcore_types::{
    CoreConfig, ErrorCode, Filter, FilterSchema, VerifiablePresentation, VpErrorCode,
    VpVerifyParam, OSD_SCHEMA_CREDENTIAL,
};

fn filter(allowed_issuer: &str, required: &[&str], present_all: Option<bool>) -> Filter {
    Filter {
        credential_schemas: vec![FilterSchema {
            id: SCHEMA_ID.to_string(),
            schema_type: OSD_SCHEMA_CREDENTIAL.to_string(),
            present_all,
            display_claims: Vec::new(),
            required_claims: required.iter().map(|c| code(c)).collect(),
            allowed_issuers: vec![allowed_issuer.to_string()],
        }],
    }
}

fn verify(
    vp: &VerifiablePresentation,
    params: &VpVerifyParam,
) -> (VpManager, Result<(), ErrorCode>) {
    let mut manager = VpManager::new();
    let result = manager.verify_presentation(vp, params).map_err(|e| e.code());
    (manager, result)
}

#[test]
fn signed_presentation_is_accepted() {
    let issuer = issuer();
    let holder = holder();
    let vp = signed_presentation(&holder, vec![signed_credential(&issuer)]);
    assert!(vp.proof.is_some());
    assert!(vp.proofs.is_none());

    let params = VpVerifyParam::new(holder.document.clone(), issuer.document.clone())
        .with_filter(filter(ISSUER_DID, &["family_name"], None));
    let (manager, result) = verify(&vp, &params);
    assert_eq!(result, Ok(()));
    assert_eq!(manager.state(), PresentationState::Accepted);

    let claims = manager.get_claim_list();
    assert_eq!(claims.len(), 3);
    assert_eq!(claims[0].code, code("family_name"));
}

#[test]
fn several_holder_keys_produce_a_proof_list() {
    let issuer = issuer();
    let holder = holder();
    let vp = sign_presentation(
        &holder,
        unsigned_presentation(vec![signed_credential(&issuer)]),
        &["auth", "pin"],
    );
    assert!(vp.proof.is_none());
    assert_eq!(vp.proofs.as_ref().map(Vec::len), Some(2));

    let params = VpVerifyParam::new(holder.document.clone(), issuer.document.clone());
    assert_eq!(verify(&vp, &params).1, Ok(()));
}

#[test]
fn holder_must_sign_with_authentication_keys() {
    let issuer = issuer();
    let holder = holder();
    let vp = unsigned_presentation(vec![signed_credential(&issuer)]);
    let manager = VpManager::new();

    let err = manager
        .get_origin_data_for_sign(&vp, &holder.document, &["agree"])
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::Vp(VpErrorCode::NotAuthenticationKey));
    let err = manager
        .get_origin_data_for_sign(&vp, &holder.document, &["absent"])
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::Vp(VpErrorCode::SigningKeyNotFound));
}

#[test]
fn unsigned_or_tampered_presentation_is_rejected() {
    let issuer = issuer();
    let holder = holder();
    let params = VpVerifyParam::new(holder.document.clone(), issuer.document.clone());

    let unsigned = unsigned_presentation(vec![signed_credential(&issuer)]);
    let (manager, result) = verify(&unsigned, &params);
    assert_eq!(result, Err(ErrorCode::Vp(VpErrorCode::SignatureVerificationFailed)));
    assert_eq!(
        manager.state(),
        PresentationState::Rejected(ErrorCode::Vp(VpErrorCode::SignatureVerificationFailed))
    );

    let mut tampered = signed_presentation(&holder, vec![signed_credential(&issuer)]);
    tampered.verifier_nonce = Some("replayed".to_string());
    assert_eq!(
        verify(&tampered, &params).1,
        Err(ErrorCode::Vp(VpErrorCode::SignatureVerificationFailed))
    );
}

#[test]
fn every_attached_holder_proof_must_verify() {
    let issuer = issuer();
    let holder = holder();
    let params = VpVerifyParam::new(holder.document.clone(), issuer.document.clone());
    let base = unsigned_presentation(vec![signed_credential(&issuer)]);

    let single = sign_presentation(&holder, base.clone(), &["auth"]);
    let pin_proof = sign_presentation(&holder, base, &["auth", "pin"])
        .proofs
        .and_then(|mut proofs| proofs.pop())
        .unwrap();
    assert_eq!(pin_proof.key_id(), Some("pin"));

    let mut both = single.clone();
    both.proofs = Some(vec![pin_proof.clone()]);
    assert_eq!(verify(&both, &params).1, Ok(()));

    let mut forged = pin_proof;
    forged.proof_value = single.proof.as_ref().and_then(|p| p.proof_value.clone());
    let mut smuggled = single;
    smuggled.proofs = Some(vec![forged]);
    let (manager, result) = verify(&smuggled, &params);
    assert_eq!(result, Err(ErrorCode::Vp(VpErrorCode::SignatureVerificationFailed)));
    assert_eq!(
        manager.state(),
        PresentationState::Rejected(ErrorCode::Vp(VpErrorCode::SignatureVerificationFailed))
    );
}

#[test]
fn expired_presentation_is_rejected_first() {
    let issuer = issuer();
    let holder = holder();
    let mut vp = unsigned_presentation(vec![signed_credential(&issuer)]);
    vp.valid_until = "2001-01-01T00:00:00Z".parse().unwrap();
    let vp = sign_presentation(&holder, vp, &["auth"]);

    let params = VpVerifyParam::new(holder.document.clone(), issuer.document.clone());
    assert_eq!(
        verify(&vp, &params).1,
        Err(ErrorCode::Vp(VpErrorCode::ExpiredPresentation))
    );
}

#[test]
fn credential_expiry_follows_the_flag() {
    let issuer = issuer();
    let holder = holder();
    let mut param = issue_param();
    param.valid_until = Some("2000-01-01T00:00:00Z".parse().unwrap());
    let vp = signed_presentation(&holder, vec![sign_credential(&issuer, &param)]);

    let strict = VpVerifyParam::new(holder.document.clone(), issuer.document.clone());
    assert_eq!(
        verify(&vp, &strict).1,
        Err(ErrorCode::Vp(VpErrorCode::ExpiredCredential))
    );

    let lenient = strict.clone().check_vc_expiration(false);
    assert_eq!(verify(&vp, &lenient).1, Ok(()));

    let mut config = CoreConfig::default();
    config.check_vc_expiration = false;
    let configured = VpManager::with_config(config)
        .verify_params(holder.document.clone(), issuer.document.clone());
    assert!(!configured.check_vc_expiration);
    assert_eq!(verify(&vp, &configured).1, Ok(()));
}

#[test]
fn filter_denies_unknown_schemas() {
    let issuer = issuer();
    let holder = holder();
    let vp = signed_presentation(&holder, vec![signed_credential(&issuer)]);

    let mut unknown = filter(ISSUER_DID, &[], None);
    unknown.credential_schemas[0].id = "https://schema.example.org/other/v1".to_string();
    let params = VpVerifyParam::new(holder.document.clone(), issuer.document.clone())
        .with_filter(unknown);
    let (manager, result) = verify(&vp, &params);
    assert_eq!(result, Err(ErrorCode::Vp(VpErrorCode::SchemaMismatch)));
    assert_eq!(
        manager.state(),
        PresentationState::Rejected(ErrorCode::Vp(VpErrorCode::SchemaMismatch))
    );
}

#[test]
fn filter_requires_exactly_one_matching_credential() {
    let issuer = issuer();
    let holder = holder();
    let vp = signed_presentation(
        &holder,
        vec![signed_credential(&issuer), signed_credential(&issuer)],
    );
    let params = VpVerifyParam::new(holder.document.clone(), issuer.document.clone())
        .with_filter(filter(ISSUER_DID, &[], None));
    assert_eq!(
        verify(&vp, &params).1,
        Err(ErrorCode::Vp(VpErrorCode::SchemaMismatch))
    );
}

#[test]
fn filter_checks_issuer_and_required_claims() {
    let issuer = issuer();
    let holder = holder();
    let vp = signed_presentation(&holder, vec![signed_credential(&issuer)]);
    let base = VpVerifyParam::new(holder.document.clone(), issuer.document.clone());

    let params = base
        .clone()
        .with_filter(filter("did:example:someone-else", &[], None));
    assert_eq!(
        verify(&vp, &params).1,
        Err(ErrorCode::Vp(VpErrorCode::IssuerNotAllowed))
    );

    let params = base.with_filter(filter(ISSUER_DID, &["nationality"], None));
    assert_eq!(
        verify(&vp, &params).1,
        Err(ErrorCode::Vp(VpErrorCode::RequiredClaimMissing))
    );
}

#[test]
fn selective_disclosure_verifies_remaining_claims() {
    let issuer = issuer();
    let holder = holder();
    let mut vc = signed_credential(&issuer);

    // Drop the portrait and its signature, along with the whole-credential value.
    vc.credential_subject.claims.remove(2);
    if let Some(proof) = vc.proof.as_mut() {
        proof.proof_value = None;
        if let Some(list) = proof.proof_value_list.as_mut() {
            list.remove(2);
        }
    }
    let vp = signed_presentation(&holder, vec![vc]);

    let params = VpVerifyParam::new(holder.document.clone(), issuer.document.clone())
        .with_filter(filter(ISSUER_DID, &["family_name", "birth_date"], None));
    let (manager, result) = verify(&vp, &params);
    assert_eq!(result, Ok(()));
    assert_eq!(manager.get_claim_list().len(), 2);

    let params = VpVerifyParam::new(holder.document.clone(), issuer.document.clone())
        .with_filter(filter(ISSUER_DID, &[], Some(true)));
    assert_eq!(
        verify(&vp, &params).1,
        Err(ErrorCode::Vp(VpErrorCode::ProofValueMissing))
    );
}

#[test]
fn disclosed_claim_must_match_its_signature() {
    let issuer = issuer();
    let holder = holder();
    let mut vc = signed_credential(&issuer);
    vc.credential_subject.claims[0].value = Some("Roe".to_string());
    if let Some(proof) = vc.proof.as_mut() {
        proof.proof_value = None;
    }
    let vp = signed_presentation(&holder, vec![vc]);

    let params = VpVerifyParam::new(holder.document.clone(), issuer.document.clone());
    let (manager, result) = verify(&vp, &params);
    assert_eq!(result, Err(ErrorCode::Vp(VpErrorCode::SignatureVerificationFailed)));
    assert!(manager.get_claim_list().iter().any(|c| c.value.as_deref() == Some("Roe")));
}

#[test]
fn credential_without_claims_is_rejected() {
    let issuer = issuer();
    let holder = holder();
    let mut vc = signed_credential(&issuer);
    vc.credential_subject.claims.clear();
    let vp = signed_presentation(&holder, vec![vc]);

    let params = VpVerifyParam::new(holder.document.clone(), issuer.document.clone());
    assert_eq!(
        verify(&vp, &params).1,
        Err(ErrorCode::Vp(VpErrorCode::ClaimsMissing))
    );
}

#[test]
fn state_is_reset_between_verifications() {
    let issuer = issuer();
    let holder = holder();
    let params = VpVerifyParam::new(holder.document.clone(), issuer.document.clone());
    let good = signed_presentation(&holder, vec![signed_credential(&issuer)]);
    let bad = unsigned_presentation(vec![signed_credential(&issuer)]);

    let mut manager = VpManager::new();
    assert_eq!(manager.state(), PresentationState::Start);
    assert!(manager.verify_presentation(&bad, &params).is_err());
    assert_ne!(manager.state(), PresentationState::Accepted);
    manager.verify_presentation(&good, &params).unwrap();
    assert_eq!(manager.state(), PresentationState::Accepted);
}

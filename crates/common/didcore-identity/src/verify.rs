//! Signature checks shared by the document, credential and presentation managers.

use didcore_crypto::{multibase_decode, multibase_encode, sha256, verify_compact, KeyPair, MultibaseType};
use didcore_types::{
    canonical_json, CoreError, DidDocument, Result, SignatureParams, SignatureVcParams,
    VcErrorCode, VerifiableCredential, VpErrorCode,
};

/// Verify `params.signature_value` over `sha256(params.origin_data)`.
///
/// The curve is chosen from `params.algorithm`. Signature and public key are
/// multibase strings; the key is a compressed SEC1 point.
pub fn verify_signature(params: &SignatureParams) -> Result<()> {
    let digest = sha256(params.origin_data.as_bytes());
    let signature = params.signature_value.as_deref().ok_or_else(|| {
        CoreError::new(VpErrorCode::SignatureVerificationFailed)
            .with_detail(format!("no signature value for key {}", params.key_id))
    })?;
    let public_key = params.public_key.as_deref().ok_or_else(|| {
        CoreError::new(VpErrorCode::SigningKeyNotFound).with_detail(params.key_id.clone())
    })?;

    let signature = multibase_decode(signature)?;
    let public_key = multibase_decode(public_key)?;
    verify_compact(&public_key, &digest, &signature, params.algorithm.curve())?;
    tracing::debug!(key_id = %params.key_id, purpose = %params.key_purpose, "signature verified");
    Ok(())
}

/// Sign `params.origin_data` with `keypair`, filling in the signature value
/// (base58btc multibase) and the signer's public key.
pub fn sign_payload(params: &mut SignatureParams, keypair: &KeyPair) -> Result<()> {
    let signature = keypair.sign(params.origin_data.as_bytes())?;
    params.signature_value = Some(multibase_encode(&signature, MultibaseType::Base58Btc));
    params.public_key = Some(keypair.public_key_multibase());
    Ok(())
}

/// Rebuild the signing payload of an issuer signature.
///
/// The credential's proof is reduced to its metadata; with `claim_index` set,
/// the subject keeps only that claim.
pub(crate) fn credential_signature_params(
    vc: &VerifiableCredential,
    issuer_document: &DidDocument,
    claim_index: Option<usize>,
    signature: &str,
) -> Result<SignatureVcParams> {
    let proof = vc.proof.as_ref().ok_or_else(|| {
        CoreError::new(VpErrorCode::SignatureVerificationFailed).with_detail(vc.id.clone())
    })?;
    let key_id = proof
        .key_id()
        .ok_or_else(|| CoreError::new(VcErrorCode::SigningKeyNotFound).with_detail(vc.id.clone()))?;
    let method = issuer_document
        .verification_method(key_id)
        .ok_or_else(|| CoreError::new(VcErrorCode::SigningKeyNotFound).with_detail(key_id))?;

    let mut unsigned = vc.clone();
    unsigned.proof = Some(proof.unsigned());
    let claim_code = match claim_index {
        Some(index) => {
            let claim = vc.credential_subject.claims.get(index).ok_or_else(|| {
                CoreError::new(VpErrorCode::SignatureVerificationFailed)
                    .with_detail(format!("{} has no claim at index {}", vc.id, index))
            })?;
            unsigned.credential_subject.claims = vec![claim.clone()];
            Some(claim.code.clone())
        }
        None => None,
    };

    let mut params = SignatureParams::new(
        key_id,
        proof.proof_purpose,
        proof.proof_type,
        canonical_json(&unsigned)?,
    );
    params.public_key = Some(method.public_key_multibase.clone());
    params.signature_value = Some(signature.to_string());
    Ok(SignatureVcParams {
        params,
        is_single_claim: claim_index.is_some(),
        claim_code,
    })
}

/// Check the whole-credential signature, or each per-claim signature when
/// only the list form is present.
pub(crate) fn verify_issuer_signatures(
    vc: &VerifiableCredential,
    issuer_document: &DidDocument,
) -> Result<()> {
    let proof = vc.proof.as_ref().ok_or_else(|| {
        CoreError::new(VpErrorCode::SignatureVerificationFailed).with_detail(vc.id.clone())
    })?;

    if let Some(value) = proof.whole_value() {
        let params = credential_signature_params(vc, issuer_document, None, value)?;
        return verify_signature(&params.params);
    }

    if let Some(values) = proof.claim_values() {
        verify_claim_signatures(vc, issuer_document, values)?;
        return Ok(());
    }

    Err(CoreError::new(VpErrorCode::SignatureVerificationFailed).with_detail(vc.id.clone()))
}

/// Verify `values[i]` against claim `i` for every claim of the credential.
pub(crate) fn verify_claim_signatures(
    vc: &VerifiableCredential,
    issuer_document: &DidDocument,
    values: &[String],
) -> Result<()> {
    let claims = vc.claims();
    if values.len() < claims.len() {
        return Err(CoreError::new(VpErrorCode::SignatureVerificationFailed).with_detail(format!(
            "{} carries {} claim signatures for {} claims",
            vc.id,
            values.len(),
            claims.len()
        )));
    }
    for (index, value) in values.iter().take(claims.len()).enumerate() {
        let params = credential_signature_params(vc, issuer_document, Some(index), value)?;
        verify_signature(&params.params)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use didcore_crypto::EccCurve;
    use didcore_types::{ErrorCode, ProofPurpose, ProofType};

    fn payload(origin: &str) -> SignatureParams {
        SignatureParams::new(
            "key-1",
            ProofPurpose::Authentication,
            ProofType::Secp256k1Signature2018,
            origin.to_string(),
        )
    }

    #[test]
    fn signed_payload_verifies() {
        let keypair = KeyPair::generate(EccCurve::Secp256k1);
        let mut params = payload(r#"{"id":"did:example:1"}"#);
        sign_payload(&mut params, &keypair).unwrap();
        verify_signature(&params).unwrap();
    }

    #[test]
    fn algorithm_selects_the_curve() {
        let keypair = KeyPair::generate(EccCurve::Secp256k1);
        let mut params = payload("{}");
        sign_payload(&mut params, &keypair).unwrap();
        params.algorithm = ProofType::Secp256r1Signature2018;
        let err = verify_signature(&params).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Vp(VpErrorCode::SignatureVerificationFailed));
    }

    #[test]
    fn undecodable_signature_is_a_decoding_failure() {
        let keypair = KeyPair::generate(EccCurve::Secp256r1);
        let mut params = payload("{}");
        sign_payload(&mut params, &keypair).unwrap();
        params.algorithm = ProofType::Secp256r1Signature2018;
        params.signature_value = Some("z0OIl".into());
        assert_matches!(
            verify_signature(&params).map_err(|e| e.code()),
            Err(ErrorCode::Vp(VpErrorCode::MultibaseDecodingFail))
        );
    }

    #[test]
    fn altered_origin_data_fails() {
        let keypair = KeyPair::generate(EccCurve::Secp256r1);
        let mut params = payload(r#"{"n":1}"#);
        params.algorithm = ProofType::Secp256r1Signature2018;
        sign_payload(&mut params, &keypair).unwrap();
        params.origin_data = r#"{"n":2}"#.into();
        assert!(verify_signature(&params).is_err());
    }
}

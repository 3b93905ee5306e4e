use crate::did_manager::proofs_from_payloads;
use crate::verify::{verify_issuer_signatures, verify_signature};
use didcore_types::{
    canonical_json, key_url, Claim, CoreConfig, CoreError, DidDocument, ErrorCode, Filter, Proof,
    ProofPurpose, Result, SignatureParams, UtcTimestamp, VerifiablePresentation, VpErrorCode,
    VpVerifyParam,
};
use std::fmt;
use tracing::{debug, info, warn};

/// Progress of the last presentation verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationState {
    Start,
    ExpiryChecked,
    FilterChecked,
    HolderSignatureVerified,
    IssuerSignaturesVerified,
    Accepted,
    Rejected(ErrorCode),
}

impl fmt::Display for PresentationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresentationState::Start => write!(f, "start"),
            PresentationState::ExpiryChecked => write!(f, "expiry checked"),
            PresentationState::FilterChecked => write!(f, "filter checked"),
            PresentationState::HolderSignatureVerified => write!(f, "holder signature verified"),
            PresentationState::IssuerSignaturesVerified => write!(f, "issuer signatures verified"),
            PresentationState::Accepted => write!(f, "accepted"),
            PresentationState::Rejected(code) => write!(f, "rejected {}", code.code()),
        }
    }
}

/// Builds holder proofs for presentations and verifies finished ones.
#[derive(Debug, Clone)]
pub struct VpManager {
    config: CoreConfig,
    presentation: Option<VerifiablePresentation>,
    state: PresentationState,
}

impl Default for VpManager {
    fn default() -> Self {
        Self::with_config(CoreConfig::default())
    }
}

impl VpManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CoreConfig) -> Self {
        Self {
            config,
            presentation: None,
            state: PresentationState::Start,
        }
    }

    /// Verification parameters with the configured credential expiry policy.
    pub fn verify_params(&self, holder: DidDocument, issuer: DidDocument) -> VpVerifyParam {
        VpVerifyParam::new(holder, issuer).check_vc_expiration(self.config.check_vc_expiration)
    }

    pub fn state(&self) -> PresentationState {
        self.state
    }

    /// One holder signing payload per key in `key_ids`. Every key must be an
    /// `authentication` key of the holder document.
    pub fn get_origin_data_for_sign(
        &self,
        vp: &VerifiablePresentation,
        holder_document: &DidDocument,
        key_ids: &[&str],
    ) -> Result<Vec<SignatureParams>> {
        let mut unsigned = vp.clone();
        unsigned.proofs = None;

        let mut payloads = Vec::with_capacity(key_ids.len());
        for key_id in key_ids {
            let method = holder_document
                .verification_method(key_id)
                .ok_or_else(|| CoreError::new(VpErrorCode::SigningKeyNotFound).with_detail(*key_id))?;
            if !holder_document.authentication.iter().any(|id| id == key_id) {
                return Err(CoreError::new(VpErrorCode::NotAuthenticationKey).with_detail(*key_id));
            }
            let proof_type = method.key_type.proof_type();
            unsigned.proof = Some(Proof {
                proof_type,
                created: UtcTimestamp::now(),
                proof_purpose: ProofPurpose::Authentication,
                verification_method: key_url(
                    &holder_document.id,
                    &holder_document.version_id,
                    key_id,
                ),
                proof_value: None,
            });
            let mut params = SignatureParams::new(
                *key_id,
                ProofPurpose::Authentication,
                proof_type,
                canonical_json(&unsigned)?,
            );
            params.public_key = Some(method.public_key_multibase.clone());
            payloads.push(params);
        }
        Ok(payloads)
    }

    /// Attach holder signatures: one payload sets `proof`, several set `proofs`.
    pub fn add_proof(
        &self,
        mut vp: VerifiablePresentation,
        signature_params: &[SignatureParams],
    ) -> Result<VerifiablePresentation> {
        let mut proofs = proofs_from_payloads(signature_params)?;
        if proofs.len() == 1 {
            vp.proof = proofs.pop();
            vp.proofs = None;
        } else {
            vp.proof = None;
            vp.proofs = Some(proofs);
        }
        Ok(vp)
    }

    /// Verify expiry, submission filter, holder signatures and issuer
    /// signatures, in that order. The first failure rejects the presentation.
    pub fn verify_presentation(
        &mut self,
        vp: &VerifiablePresentation,
        params: &VpVerifyParam,
    ) -> Result<()> {
        self.presentation = Some(vp.clone());
        self.state = PresentationState::Start;
        match self.run_checks(vp, params) {
            Ok(()) => {
                self.state = PresentationState::Accepted;
                info!(vp_id = %vp.id, holder = %vp.holder, "Presentation accepted");
                Ok(())
            }
            Err(e) => {
                warn!(vp_id = %vp.id, stage = %self.state, "Presentation rejected: {}", e);
                self.state = PresentationState::Rejected(e.code());
                Err(e)
            }
        }
    }

    /// Claims of the last verified presentation, credential order then claim order.
    pub fn get_claim_list(&self) -> Vec<Claim> {
        self.presentation
            .as_ref()
            .map(VerifiablePresentation::claims)
            .unwrap_or_default()
    }

    fn advance(&mut self, next: PresentationState) {
        debug!(from = %self.state, to = %next, "Presentation verification advanced");
        self.state = next;
    }

    fn run_checks(&mut self, vp: &VerifiablePresentation, params: &VpVerifyParam) -> Result<()> {
        if vp.valid_until.is_past() {
            return Err(CoreError::new(VpErrorCode::ExpiredPresentation).with_detail(vp.id.clone()));
        }
        self.advance(PresentationState::ExpiryChecked);

        if let Some(filter) = &params.filter {
            check_filter(filter, vp)?;
        }
        self.advance(PresentationState::FilterChecked);

        verify_holder_signatures(vp, &params.holder_document)?;
        self.advance(PresentationState::HolderSignatureVerified);

        for vc in &vp.verifiable_credential {
            if params.check_vc_expiration && vc.valid_until.is_past() {
                return Err(CoreError::new(VpErrorCode::ExpiredCredential).with_detail(vc.id.clone()));
            }
            if vc.credential_subject.claims.is_empty() {
                return Err(CoreError::new(VpErrorCode::ClaimsMissing).with_detail(vc.id.clone()));
            }
            verify_issuer_signatures(vc, &params.issuer_document)?;
        }
        self.advance(PresentationState::IssuerSignaturesVerified);
        Ok(())
    }
}

/// Every filter schema must be answered by exactly one credential.
fn check_filter(filter: &Filter, vp: &VerifiablePresentation) -> Result<()> {
    for schema in &filter.credential_schemas {
        let mut candidates = vp
            .verifiable_credential
            .iter()
            .filter(|vc| schema.matches(&vc.credential_schema));
        let vc = match (candidates.next(), candidates.next()) {
            (Some(vc), None) => vc,
            _ => {
                return Err(CoreError::new(VpErrorCode::SchemaMismatch)
                    .with_detail(format!("{} {}", schema.id, schema.schema_type)))
            }
        };

        if !schema.allowed_issuers.iter().any(|issuer| *issuer == vc.issuer.id) {
            return Err(CoreError::new(VpErrorCode::IssuerNotAllowed).with_detail(vc.issuer.id.clone()));
        }
        if let Some(missing) = schema
            .required_claims
            .iter()
            .find(|code| !vc.claim_codes().any(|c| c == code.as_str()))
        {
            return Err(CoreError::new(VpErrorCode::RequiredClaimMissing).with_detail(missing.clone()));
        }
        let whole_signed = vc.proof.as_ref().and_then(|p| p.whole_value()).is_some();
        if schema.present_all == Some(true) && !whole_signed {
            return Err(CoreError::new(VpErrorCode::ProofValueMissing).with_detail(vc.id.clone()));
        }
    }
    Ok(())
}

fn verify_holder_signatures(vp: &VerifiablePresentation, holder_document: &DidDocument) -> Result<()> {
    // Both proof fields are honoured; every proof present must verify.
    let proofs: Vec<&Proof> = vp.proof.iter().chain(vp.proofs.iter().flatten()).collect();
    if proofs.is_empty() {
        return Err(CoreError::new(VpErrorCode::SignatureVerificationFailed)
            .with_detail(format!("{} carries no holder proof", vp.id)));
    }

    let mut unsigned = vp.clone();
    unsigned.proofs = None;
    for proof in proofs {
        let key_id = proof.key_id().ok_or_else(|| {
            CoreError::new(VpErrorCode::SigningKeyNotFound)
                .with_detail(proof.verification_method.clone())
        })?;
        let method = holder_document
            .verification_method(key_id)
            .ok_or_else(|| CoreError::new(VpErrorCode::SigningKeyNotFound).with_detail(key_id))?;

        unsigned.proof = Some(proof.unsigned());
        let mut params = SignatureParams::new(
            key_id,
            proof.proof_purpose,
            proof.proof_type,
            canonical_json(&unsigned)?,
        );
        params.public_key = Some(method.public_key_multibase.clone());
        params.signature_value = proof.proof_value.clone();
        verify_signature(&params)?;
    }
    Ok(())
}

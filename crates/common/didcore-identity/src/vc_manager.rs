use crate::verify::{credential_signature_params, verify_claim_signatures, verify_signature};
use didcore_crypto::{multibase_encode, MultibaseType};
use didcore_types::{
    canonical_json, key_url, Claim, ClaimDef, ClaimFormat, ClaimI18n, ClaimInfo, ClaimType,
    CoreConfig, CoreError, CredentialSchema, CredentialSubject, DidDocument, IssueVcParam, Issuer,
    Location, ProofPurpose, Provider, Result, SignatureParams, SignatureVcParams,
    UtcTimestamp, VcErrorCode, VcMeta, VcProof, VcStatus, VerifiableCredential, VpErrorCode,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Issues credentials whose claims are signed both together and one by one,
/// so a holder can later disclose any subset of them.
#[derive(Debug, Clone, Default)]
pub struct VcManager {
    config: CoreConfig,
}

impl VcManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CoreConfig) -> Self {
        Self { config }
    }

    /// Build an unsigned credential for `subject_did` from an issuance request.
    pub fn issue_credential(
        &self,
        param: &IssueVcParam,
        subject_did: &str,
    ) -> Result<VerifiableCredential> {
        if param.vc_type.is_empty() {
            return Err(VcErrorCode::MissingVcType.into());
        }
        let metadata = &param.vc_schema.metadata;
        if metadata.format_version.is_empty() || metadata.language.is_empty() {
            return Err(CoreError::new(VcErrorCode::SchemaMissingDetail)
                .with_detail(param.vc_schema.id.clone()));
        }
        check_required_claims(param)?;

        let id = Uuid::new_v4().to_string();
        let context = if param.context.is_empty() {
            self.config.vc_context.clone()
        } else {
            param.context.clone()
        };
        let schema_type = param
            .schema_type
            .clone()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| self.config.schema_type.clone());
        let claims = build_claims(param, &id)?;

        info!(vc_id = %id, claims = claims.len(), "Issued credential");
        Ok(VerifiableCredential {
            context,
            id,
            types: param.vc_type.clone(),
            issuer: Issuer {
                id: param.provider_detail.did.clone(),
                name: param.provider_detail.name.clone(),
            },
            issuance_date: param.issuance_date,
            valid_from: param.valid_from.unwrap_or(param.issuance_date),
            valid_until: param.valid_until.unwrap_or_else(UtcTimestamp::far_future),
            format_version: metadata.format_version.clone(),
            language: metadata.language.clone(),
            evidence: param.evidences.clone(),
            credential_schema: CredentialSchema {
                id: param.vc_schema.id.clone(),
                schema_type,
            },
            credential_subject: CredentialSubject {
                id: subject_did.to_string(),
                claims,
            },
            proof: None,
        })
    }

    /// Registry metadata for an issued credential.
    pub fn generate_vc_meta(&self, vc: &VerifiableCredential, cert_vc_ref: &str) -> VcMeta {
        VcMeta {
            id: vc.id.clone(),
            issuer: Provider {
                did: vc.issuer.id.clone(),
                cert_vc_ref: cert_vc_ref.to_string(),
            },
            subject: vc.credential_subject.id.clone(),
            credential_schema: vc.credential_schema.clone(),
            status: VcStatus::Active,
            issuance_date: vc.issuance_date,
            valid_from: vc.valid_from,
            valid_until: vc.valid_until,
            format_version: vc.format_version.clone(),
            language: vc.language.clone(),
        }
    }

    /// Signing payloads for `vc`: the whole credential first, then one payload
    /// per claim in claim order.
    pub fn get_origin_data_for_sign(
        &self,
        sign_key_id: &str,
        issuer_document: &DidDocument,
        vc: &VerifiableCredential,
    ) -> Result<Vec<SignatureVcParams>> {
        if !issuer_document
            .assertion_method
            .iter()
            .any(|id| id == sign_key_id)
        {
            return Err(CoreError::new(VcErrorCode::NotAssertionMethod).with_detail(sign_key_id));
        }
        let method = issuer_document
            .verification_method(sign_key_id)
            .ok_or_else(|| CoreError::new(VcErrorCode::NotAssertionMethod).with_detail(sign_key_id))?;
        let proof_type = method.key_type.proof_type();

        let mut unsigned = vc.clone();
        unsigned.proof = Some(VcProof {
            proof_type,
            created: vc.issuance_date,
            proof_purpose: ProofPurpose::AssertionMethod,
            verification_method: key_url(
                &issuer_document.id,
                &issuer_document.version_id,
                sign_key_id,
            ),
            proof_value: None,
            proof_value_list: None,
        });

        let payload = |origin_data: String, claim_code: Option<String>| {
            let mut params = SignatureParams::new(
                sign_key_id,
                ProofPurpose::AssertionMethod,
                proof_type,
                origin_data,
            );
            params.public_key = Some(method.public_key_multibase.clone());
            SignatureVcParams {
                params,
                is_single_claim: claim_code.is_some(),
                claim_code,
            }
        };

        let mut payloads = vec![payload(canonical_json(&unsigned)?, None)];
        for claim in &vc.credential_subject.claims {
            unsigned.credential_subject.claims = vec![claim.clone()];
            payloads.push(payload(canonical_json(&unsigned)?, Some(claim.code.clone())));
        }
        debug!(vc_id = %vc.id, payloads = payloads.len(), "Built credential signing payloads");
        Ok(payloads)
    }

    /// Fold signed payloads into the credential's proof.
    pub fn add_proof(
        &self,
        mut vc: VerifiableCredential,
        signature_params: &[SignatureVcParams],
    ) -> Result<VerifiableCredential> {
        let first = signature_params.first().ok_or_else(|| {
            CoreError::new(VcErrorCode::KeyPurposeMismatch).with_detail("no signing payloads")
        })?;
        let envelope: VcProofEnvelope = serde_json::from_str(&first.params.origin_data)
            .map_err(|e| CoreError::new(VcErrorCode::KeyPurposeMismatch).with_source(e))?;
        let mut proof = envelope
            .proof
            .ok_or_else(|| CoreError::new(VcErrorCode::KeyPurposeMismatch).with_detail(vc.id.clone()))?;

        for payload in signature_params {
            if proof.key_id() != Some(payload.params.key_id.as_str()) {
                return Err(CoreError::new(VcErrorCode::KeyPurposeMismatch)
                    .with_detail(payload.params.key_id.clone()));
            }
            // proofValueList stays index-aligned with the claims, so an unsigned payload is fatal.
            let value = payload.params.signature_value.clone().ok_or_else(|| {
                CoreError::new(VpErrorCode::SignatureVerificationFailed).with_detail(
                    payload
                        .claim_code
                        .clone()
                        .unwrap_or_else(|| format!("{} has an unsigned payload", vc.id)),
                )
            })?;
            if payload.is_single_claim {
                proof
                    .proof_value_list
                    .get_or_insert_with(Vec::new)
                    .push(value);
            } else {
                proof.proof_value = Some(value);
            }
        }
        vc.proof = Some(proof);
        Ok(vc)
    }

    /// Verify the whole-credential signature and every per-claim signature.
    pub fn verify_credential(
        &self,
        vc: &VerifiableCredential,
        issuer_document: &DidDocument,
        check_expiration: bool,
    ) -> Result<()> {
        if check_expiration && vc.valid_until.is_past() {
            warn!(vc_id = %vc.id, "Credential expired");
            return Err(CoreError::new(VcErrorCode::ExpiredCredential).with_detail(vc.id.clone()));
        }
        if vc.credential_subject.claims.is_empty() {
            return Err(CoreError::new(VcErrorCode::ClaimsMissing).with_detail(vc.id.clone()));
        }
        let proof = vc.proof.as_ref().ok_or_else(|| {
            CoreError::new(VpErrorCode::SignatureVerificationFailed).with_detail(vc.id.clone())
        })?;

        let whole = proof.whole_value().ok_or_else(|| {
            CoreError::new(VpErrorCode::ProofValueMissing).with_detail(vc.id.clone())
        })?;
        let params = credential_signature_params(vc, issuer_document, None, whole)?;
        verify_signature(&params.params)?;

        let values = proof.claim_values().unwrap_or_default();
        verify_claim_signatures(vc, issuer_document, values)?;
        debug!(vc_id = %vc.id, "Credential signatures verified");
        Ok(())
    }

    /// Verify only the signature of claim `index`.
    pub fn verify_claim(
        &self,
        vc: &VerifiableCredential,
        issuer_document: &DidDocument,
        index: usize,
    ) -> Result<()> {
        let value = vc
            .proof
            .as_ref()
            .and_then(|proof| proof.claim_values())
            .and_then(|values| values.get(index))
            .ok_or_else(|| {
                CoreError::new(VpErrorCode::SignatureVerificationFailed)
                    .with_detail(format!("{} has no signature for claim {}", vc.id, index))
            })?;
        let params = credential_signature_params(vc, issuer_document, Some(index), value)?;
        verify_signature(&params.params)
    }
}

#[derive(Deserialize)]
struct VcProofEnvelope {
    #[serde(default)]
    proof: Option<VcProof>,
}

fn check_required_claims(param: &IssueVcParam) -> Result<()> {
    for group in &param.vc_schema.credential_subject.claims {
        for def in group.items.iter().filter(|def| def.is_required()) {
            let code = group.claim_code(def);
            if !param.privacy.contains_key(&code) {
                return Err(CoreError::new(VcErrorCode::MissingRequiredClaim).with_detail(code));
            }
        }
    }
    Ok(())
}

/// Claims in schema order; definitions with no supplied value are skipped.
fn build_claims(param: &IssueVcParam, vc_id: &str) -> Result<Vec<Claim>> {
    let mut claims = Vec::new();
    for group in &param.vc_schema.credential_subject.claims {
        for def in &group.items {
            if let Some(info) = param.privacy.get(&group.claim_code(def)) {
                claims.push(build_claim(def, info, vc_id)?);
            }
        }
    }
    Ok(claims)
}

fn build_claim(def: &ClaimDef, info: &ClaimInfo, vc_id: &str) -> Result<Claim> {
    let digest_sri = match def.location {
        Some(Location::Inline) => None,
        _ => info.digest_sri.clone(),
    };
    Ok(Claim {
        code: info.code.clone(),
        caption: def.caption.clone(),
        value: Some(claim_value(def, info, vc_id)?),
        claim_type: def.claim_type,
        format: def.format,
        hide_value: def.hide_value,
        location: def.location,
        digest_sri,
        i18n: def.i18n.as_ref().map(|captions| claim_i18n(captions, info)),
    })
}

/// Render a claim value according to its location policy.
fn claim_value(def: &ClaimDef, info: &ClaimInfo, vc_id: &str) -> Result<String> {
    let raw = info.value.as_deref().unwrap_or_default();
    let location = match def.location {
        None => return Ok(plain(raw)),
        Some(location) => location,
    };
    match (def.claim_type, location) {
        (ClaimType::Text, Location::Inline) if def.format == ClaimFormat::Plain => Ok(plain(raw)),
        (ClaimType::Text, _) => encoded(raw, info.encode_type),
        (_, Location::Attach) => Ok(match &info.value {
            Some(value) => plain(value),
            None => format!("{}#{}", vc_id, info.code),
        }),
        (_, Location::Remote) | (_, Location::Inline) => encoded(raw, info.encode_type),
    }
}

fn plain(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn encoded(bytes: &[u8], encode_type: char) -> Result<String> {
    let encoding = MultibaseType::from_char(encode_type)?;
    Ok(multibase_encode(bytes, encoding))
}

fn claim_i18n(captions: &BTreeMap<String, String>, info: &ClaimInfo) -> BTreeMap<String, ClaimI18n> {
    captions
        .iter()
        .map(|(language, caption)| {
            let supplied = info.i18n.as_ref().and_then(|map| map.get(language));
            let entry = ClaimI18n {
                caption: caption.clone(),
                value: supplied.and_then(|s| s.value.clone()),
                digest_sri: supplied.and_then(|s| s.digest_sri.clone()),
            };
            (language.clone(), entry)
        })
        .collect()
}

//! Inputs and outputs of the signing and verification operations.

use crate::did::{DidDocument, ProofPurpose, ProofType};
use crate::timestamp::UtcTimestamp;
use crate::vc::{ClaimI18n, Evidence, Filter, ProviderDetail, VcSchema};
use didcore_crypto::MultibaseType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A signing payload: the exact `origin_data` to hash and sign, plus the
/// key material needed to check the resulting signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureParams {
    #[serde(rename = "keyId")]
    pub key_id: String,
    #[serde(rename = "keyPurpose")]
    pub key_purpose: ProofPurpose,
    pub algorithm: ProofType,
    #[serde(rename = "publicKey", default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(rename = "originData")]
    pub origin_data: String,
    #[serde(rename = "signatureValue", default, skip_serializing_if = "Option::is_none")]
    pub signature_value: Option<String>,
}

impl SignatureParams {
    pub fn new(
        key_id: impl Into<String>,
        key_purpose: ProofPurpose,
        algorithm: ProofType,
        origin_data: String,
    ) -> Self {
        Self {
            key_id: key_id.into(),
            key_purpose,
            algorithm,
            public_key: None,
            origin_data,
            signature_value: None,
        }
    }
}

/// Credential signing payload; single-claim entries carry the claim code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureVcParams {
    #[serde(flatten)]
    pub params: SignatureParams,
    #[serde(rename = "isSingleClaim")]
    pub is_single_claim: bool,
    #[serde(rename = "claimCode", default, skip_serializing_if = "Option::is_none")]
    pub claim_code: Option<String>,
}

/// Value supplied for one schema claim at issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimInfo {
    /// `<namespace>.<claim id>`
    pub code: String,
    #[serde(default)]
    pub value: Option<Vec<u8>>,
    /// Multibase prefix character used when the value is encoded.
    #[serde(rename = "encodeType", default = "default_encode_type")]
    pub encode_type: char,
    /// Subresource integrity string, required unless the claim is inline.
    #[serde(rename = "digestSRI", default, skip_serializing_if = "Option::is_none")]
    pub digest_sri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub i18n: Option<BTreeMap<String, ClaimI18n>>,
}

fn default_encode_type() -> char {
    MultibaseType::Base58Btc.character()
}

impl ClaimInfo {
    pub fn new(code: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            code: code.into(),
            value: Some(value.into()),
            encode_type: default_encode_type(),
            digest_sri: None,
            i18n: None,
        }
    }
}

/// Issuance request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueVcParam {
    #[serde(rename = "vcSchema")]
    pub vc_schema: VcSchema,
    #[serde(rename = "providerDetail")]
    pub provider_detail: ProviderDetail,
    #[serde(rename = "issuanceDate", default = "UtcTimestamp::now")]
    pub issuance_date: UtcTimestamp,
    /// Claim values keyed by claim code.
    #[serde(default)]
    pub privacy: BTreeMap<String, ClaimInfo>,
    #[serde(default)]
    pub context: Vec<String>,
    #[serde(rename = "validFrom", default)]
    pub valid_from: Option<UtcTimestamp>,
    #[serde(rename = "validUntil", default)]
    pub valid_until: Option<UtcTimestamp>,
    #[serde(rename = "vcType", default)]
    pub vc_type: Vec<String>,
    #[serde(default)]
    pub evidences: Option<Vec<Evidence>>,
    /// Falls back to the configured schema type when unset or empty.
    #[serde(rename = "schemaType", default)]
    pub schema_type: Option<String>,
}

impl IssueVcParam {
    pub fn new(vc_schema: VcSchema, provider_detail: ProviderDetail) -> Self {
        Self {
            vc_schema,
            provider_detail,
            issuance_date: UtcTimestamp::now(),
            privacy: BTreeMap::new(),
            context: Vec::new(),
            valid_from: None,
            valid_until: None,
            vc_type: Vec::new(),
            evidences: None,
            schema_type: None,
        }
    }

    pub fn with_claim(mut self, claim: ClaimInfo) -> Self {
        self.privacy.insert(claim.code.clone(), claim);
        self
    }
}

/// Everything a verifier needs besides the presentation itself.
#[derive(Debug, Clone)]
pub struct VpVerifyParam {
    pub holder_document: DidDocument,
    pub issuer_document: DidDocument,
    pub filter: Option<Filter>,
    pub check_vc_expiration: bool,
}

impl VpVerifyParam {
    pub fn new(holder_document: DidDocument, issuer_document: DidDocument) -> Self {
        Self {
            holder_document,
            issuer_document,
            filter: None,
            check_vc_expiration: true,
        }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn check_vc_expiration(mut self, check: bool) -> Self {
        self.check_vc_expiration = check;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vc_params_flatten_common_fields() {
        let params = SignatureVcParams {
            params: SignatureParams::new(
                "assert",
                ProofPurpose::AssertionMethod,
                ProofType::Secp256k1Signature2018,
                "{}".into(),
            ),
            is_single_claim: true,
            claim_code: Some("org.name".into()),
        };
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["keyId"], "assert");
        assert_eq!(value["isSingleClaim"], true);
        assert!(value.get("publicKey").is_none());
    }

    #[test]
    fn claim_info_defaults_to_base58btc() {
        let info: ClaimInfo = serde_json::from_str(r#"{"code":"org.name"}"#).unwrap();
        assert_eq!(info.encode_type, 'z');
        assert_eq!(info.value, None);
    }
}

use crate::did::{key_id_from_url, ProofPurpose, ProofType};
use crate::timestamp::UtcTimestamp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default JSON-LD context of an issued credential.
pub const VC_CONTEXT_V1: &str = "https://www.w3.org/2018/credentials/v1";

/// Default credential schema type.
pub const OSD_SCHEMA_CREDENTIAL: &str = "OsdSchemaCredential";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimType {
    Text,
    Image,
    Document,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimFormat {
    Plain,
    Html,
    Xml,
    Csv,
    Png,
    Jpg,
    Gif,
    Txt,
    Pdf,
    Word,
}

/// Where a claim's value lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Inline,
    Remote,
    Attach,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VcStatus {
    Active,
    Inactive,
    Revoked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issuer {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSchema {
    pub id: String,
    #[serde(rename = "type")]
    pub schema_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimI18n {
    pub caption: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(rename = "digestSRI", default, skip_serializing_if = "Option::is_none")]
    pub digest_sri: Option<String>,
}

/// A single disclosed attribute of the credential subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// `<namespace>.<claim id>`
    pub code: String,
    pub caption: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(rename = "type")]
    pub claim_type: ClaimType,
    pub format: ClaimFormat,
    #[serde(rename = "hideValue", default)]
    pub hide_value: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(rename = "digestSRI", default, skip_serializing_if = "Option::is_none")]
    pub digest_sri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub i18n: Option<BTreeMap<String, ClaimI18n>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSubject {
    pub id: String,
    #[serde(default)]
    pub claims: Vec<Claim>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub evidence_type: String,
    pub verifier: String,
    #[serde(rename = "evidenceDocument")]
    pub evidence_document: String,
    #[serde(rename = "subjectPresence")]
    pub subject_presence: String,
    #[serde(rename = "documentPresence")]
    pub document_presence: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<BTreeMap<String, String>>,
}

/// Issuer proof of a credential.
///
/// `proof_value` signs the whole credential; `proof_value_list[i]` signs a copy
/// of the credential holding only claim `i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VcProof {
    #[serde(rename = "type")]
    pub proof_type: ProofType,
    pub created: UtcTimestamp,
    #[serde(rename = "proofPurpose")]
    pub proof_purpose: ProofPurpose,
    #[serde(rename = "verificationMethod")]
    pub verification_method: String,
    #[serde(rename = "proofValue", default, skip_serializing_if = "Option::is_none")]
    pub proof_value: Option<String>,
    #[serde(rename = "proofValueList", default, skip_serializing_if = "Option::is_none")]
    pub proof_value_list: Option<Vec<String>>,
}

impl VcProof {
    /// Proof metadata without any signature value.
    pub fn unsigned(&self) -> VcProof {
        VcProof {
            proof_value: None,
            proof_value_list: None,
            ..self.clone()
        }
    }

    pub fn key_id(&self) -> Option<&str> {
        key_id_from_url(&self.verification_method)
    }

    /// Whole-credential signature, if present and not blank.
    pub fn whole_value(&self) -> Option<&str> {
        self.proof_value
            .as_deref()
            .filter(|value| !value.trim().is_empty())
    }

    /// Per-claim signatures, if present and non-empty.
    pub fn claim_values(&self) -> Option<&[String]> {
        self.proof_value_list
            .as_deref()
            .filter(|values| !values.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiableCredential {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    pub id: String,
    #[serde(rename = "type")]
    pub types: Vec<String>,
    pub issuer: Issuer,
    #[serde(rename = "issuanceDate")]
    pub issuance_date: UtcTimestamp,
    #[serde(rename = "validFrom")]
    pub valid_from: UtcTimestamp,
    #[serde(rename = "validUntil")]
    pub valid_until: UtcTimestamp,
    #[serde(rename = "formatVersion")]
    pub format_version: String,
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<Vec<Evidence>>,
    #[serde(rename = "credentialSchema")]
    pub credential_schema: CredentialSchema,
    #[serde(rename = "credentialSubject")]
    pub credential_subject: CredentialSubject,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<VcProof>,
}

impl VerifiableCredential {
    pub fn claims(&self) -> &[Claim] {
        &self.credential_subject.claims
    }

    pub fn claim_codes(&self) -> impl Iterator<Item = &str> {
        self.credential_subject.claims.iter().map(|c| c.code.as_str())
    }
}

// Schema and provider records consumed by the issuer.

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaMetadata {
    #[serde(rename = "formatVersion", default)]
    pub format_version: String,
    #[serde(default)]
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimNamespace {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// Definition of one claim in a credential schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimDef {
    pub id: String,
    pub caption: String,
    #[serde(rename = "type")]
    pub claim_type: ClaimType,
    pub format: ClaimFormat,
    #[serde(rename = "hideValue", default)]
    pub hide_value: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Absent means required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Caption per language.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub i18n: Option<BTreeMap<String, String>>,
}

impl ClaimDef {
    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaClaims {
    pub namespace: ClaimNamespace,
    pub items: Vec<ClaimDef>,
}

impl SchemaClaims {
    pub fn claim_code(&self, def: &ClaimDef) -> String {
        format!("{}.{}", self.namespace.id, def.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaCredentialSubject {
    pub claims: Vec<SchemaClaims>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VcSchema {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub metadata: SchemaMetadata,
    #[serde(rename = "credentialSubject")]
    pub credential_subject: SchemaCredentialSubject,
}

/// Issuer registration record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDetail {
    pub did: String,
    #[serde(rename = "certVcRef", default, skip_serializing_if = "Option::is_none")]
    pub cert_vc_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub did: String,
    #[serde(rename = "certVcRef")]
    pub cert_vc_ref: String,
}

/// Registry metadata of an issued credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VcMeta {
    pub id: String,
    pub issuer: Provider,
    pub subject: String,
    #[serde(rename = "credentialSchema")]
    pub credential_schema: CredentialSchema,
    pub status: VcStatus,
    #[serde(rename = "issuanceDate")]
    pub issuance_date: UtcTimestamp,
    #[serde(rename = "validFrom")]
    pub valid_from: UtcTimestamp,
    #[serde(rename = "validUntil")]
    pub valid_until: UtcTimestamp,
    #[serde(rename = "formatVersion")]
    pub format_version: String,
    pub language: String,
}

// Verifier submission profile.

/// One credential a verifier asks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSchema {
    pub id: String,
    #[serde(rename = "type")]
    pub schema_type: String,
    #[serde(rename = "presentAll", default, skip_serializing_if = "Option::is_none")]
    pub present_all: Option<bool>,
    #[serde(rename = "displayClaims", default, skip_serializing_if = "Vec::is_empty")]
    pub display_claims: Vec<String>,
    #[serde(rename = "requiredClaims", default)]
    pub required_claims: Vec<String>,
    #[serde(rename = "allowedIssuers", default)]
    pub allowed_issuers: Vec<String>,
}

impl FilterSchema {
    pub fn matches(&self, schema: &CredentialSchema) -> bool {
        self.id == schema.id && self.schema_type == schema.schema_type
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(rename = "credentialSchemas")]
    pub credential_schemas: Vec<FilterSchema>,
}

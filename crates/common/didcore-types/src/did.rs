use crate::timestamp::UtcTimestamp;
use didcore_crypto::EccCurve;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Default JSON-LD context of a DID document.
pub const DID_CONTEXT_V1: &str = "https://www.w3.org/ns/did/v1";

/// Role a verification method is authorized for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProofPurpose {
    AssertionMethod,
    Authentication,
    KeyAgreement,
    CapabilityInvocation,
    CapabilityDelegation,
}

impl ProofPurpose {
    /// Declaration order; purposes of a key are always enumerated in this order.
    pub const ALL: [ProofPurpose; 5] = [
        ProofPurpose::AssertionMethod,
        ProofPurpose::Authentication,
        ProofPurpose::KeyAgreement,
        ProofPurpose::CapabilityInvocation,
        ProofPurpose::CapabilityDelegation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProofPurpose::AssertionMethod => "assertionMethod",
            ProofPurpose::Authentication => "authentication",
            ProofPurpose::KeyAgreement => "keyAgreement",
            ProofPurpose::CapabilityInvocation => "capabilityInvocation",
            ProofPurpose::CapabilityDelegation => "capabilityDelegation",
        }
    }

    /// `keyAgreement` keys never sign.
    pub fn is_signing(self) -> bool {
        !matches!(self, ProofPurpose::KeyAgreement)
    }
}

impl fmt::Display for ProofPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key type tag of a verification method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DidKeyType {
    RsaVerificationKey2018,
    Secp256k1VerificationKey2018,
    Secp256r1VerificationKey2018,
}

impl DidKeyType {
    /// Signature algorithm used by proofs made with this key type.
    pub fn proof_type(self) -> ProofType {
        match self {
            DidKeyType::RsaVerificationKey2018 => ProofType::RsaSignature2018,
            DidKeyType::Secp256k1VerificationKey2018 => ProofType::Secp256k1Signature2018,
            DidKeyType::Secp256r1VerificationKey2018 => ProofType::Secp256r1Signature2018,
        }
    }
}

/// Signature algorithm tag carried by a proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProofType {
    RsaSignature2018,
    Secp256k1Signature2018,
    Secp256r1Signature2018,
}

impl ProofType {
    /// Curve used to verify proofs of this type. Only the secp256k1 tag selects
    /// secp256k1; every other tag is checked on secp256r1.
    pub fn curve(self) -> EccCurve {
        match self {
            ProofType::Secp256k1Signature2018 => EccCurve::Secp256k1,
            ProofType::RsaSignature2018 | ProofType::Secp256r1Signature2018 => EccCurve::Secp256r1,
        }
    }
}

/// How a key holder unlocks the key. Serialized as its integer raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthType {
    Free,
    Pin,
    Bio,
    PinOrBio,
    PinAndBio,
}

impl AuthType {
    pub fn raw_value(self) -> u8 {
        match self {
            AuthType::Free => 1,
            AuthType::Pin => 2,
            AuthType::Bio => 4,
            AuthType::PinOrBio => 6,
            AuthType::PinAndBio => 7,
        }
    }

    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(AuthType::Free),
            2 => Some(AuthType::Pin),
            4 => Some(AuthType::Bio),
            6 => Some(AuthType::PinOrBio),
            7 => Some(AuthType::PinAndBio),
            _ => None,
        }
    }
}

impl Serialize for AuthType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.raw_value())
    }
}

impl<'de> Deserialize<'de> for AuthType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = u8::deserialize(deserializer)?;
        AuthType::from_raw(raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown authType {}", raw)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DidServiceType {
    LinkedDomains,
    CredentialRegistry,
}

/// A public key entry of a DID document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationMethod {
    pub id: String,
    #[serde(rename = "type")]
    pub key_type: DidKeyType,
    pub controller: String,
    #[serde(rename = "publicKeyMultibase")]
    pub public_key_multibase: String,
    #[serde(rename = "authType")]
    pub auth_type: AuthType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    #[serde(rename = "type")]
    pub service_type: DidServiceType,
    #[serde(rename = "serviceEndpoint")]
    pub service_endpoint: Vec<String>,
}

/// Signature over a DID document or presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    #[serde(rename = "type")]
    pub proof_type: ProofType,
    pub created: UtcTimestamp,
    #[serde(rename = "proofPurpose")]
    pub proof_purpose: ProofPurpose,
    /// `did?versionId=<v>#<keyId>`
    #[serde(rename = "verificationMethod")]
    pub verification_method: String,
    #[serde(rename = "proofValue", default, skip_serializing_if = "Option::is_none")]
    pub proof_value: Option<String>,
}

impl Proof {
    /// Copy of this proof without its signature value.
    pub fn unsigned(&self) -> Proof {
        Proof {
            proof_value: None,
            ..self.clone()
        }
    }

    pub fn key_id(&self) -> Option<&str> {
        key_id_from_url(&self.verification_method)
    }
}

/// Key id fragment of a `did?versionId=<v>#<keyId>` reference.
pub fn key_id_from_url(url: &str) -> Option<&str> {
    url.split_once('#').map(|(_, key_id)| key_id)
}

/// Build the verification method reference used in proofs.
pub fn key_url(did: &str, version_id: &str, key_id: &str) -> String {
    format!("{}?versionId={}#{}", did, version_id, key_id)
}

/// A DID document. Field order is the canonical key order of signing payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DidDocument {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    pub id: String,
    pub controller: String,
    pub created: UtcTimestamp,
    pub updated: UtcTimestamp,
    #[serde(rename = "versionId")]
    pub version_id: String,
    #[serde(default)]
    pub deactivated: bool,
    #[serde(rename = "verificationMethod", default)]
    pub verification_method: Vec<VerificationMethod>,
    #[serde(rename = "assertionMethod", default, skip_serializing_if = "Vec::is_empty")]
    pub assertion_method: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authentication: Vec<String>,
    #[serde(rename = "keyAgreement", default, skip_serializing_if = "Vec::is_empty")]
    pub key_agreement: Vec<String>,
    #[serde(rename = "capabilityInvocation", default, skip_serializing_if = "Vec::is_empty")]
    pub capability_invocation: Vec<String>,
    #[serde(rename = "capabilityDelegation", default, skip_serializing_if = "Vec::is_empty")]
    pub capability_delegation: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub service: Vec<Service>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<Proof>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proofs: Option<Vec<Proof>>,
}

impl DidDocument {
    /// Empty document at version `1`, stamped with the current time.
    pub fn new(did: impl Into<String>, controller: impl Into<String>) -> Self {
        let now = UtcTimestamp::now();
        Self {
            context: vec![DID_CONTEXT_V1.to_string()],
            id: did.into(),
            controller: controller.into(),
            created: now,
            updated: now,
            version_id: "1".to_string(),
            deactivated: false,
            verification_method: Vec::new(),
            assertion_method: Vec::new(),
            authentication: Vec::new(),
            key_agreement: Vec::new(),
            capability_invocation: Vec::new(),
            capability_delegation: Vec::new(),
            service: Vec::new(),
            proof: None,
            proofs: None,
        }
    }

    pub fn purpose_list(&self, purpose: ProofPurpose) -> &Vec<String> {
        match purpose {
            ProofPurpose::AssertionMethod => &self.assertion_method,
            ProofPurpose::Authentication => &self.authentication,
            ProofPurpose::KeyAgreement => &self.key_agreement,
            ProofPurpose::CapabilityInvocation => &self.capability_invocation,
            ProofPurpose::CapabilityDelegation => &self.capability_delegation,
        }
    }

    pub fn purpose_list_mut(&mut self, purpose: ProofPurpose) -> &mut Vec<String> {
        match purpose {
            ProofPurpose::AssertionMethod => &mut self.assertion_method,
            ProofPurpose::Authentication => &mut self.authentication,
            ProofPurpose::KeyAgreement => &mut self.key_agreement,
            ProofPurpose::CapabilityInvocation => &mut self.capability_invocation,
            ProofPurpose::CapabilityDelegation => &mut self.capability_delegation,
        }
    }

    /// Purposes that reference `key_id`, in `ProofPurpose::ALL` order.
    pub fn purposes_of(&self, key_id: &str) -> Vec<ProofPurpose> {
        ProofPurpose::ALL
            .into_iter()
            .filter(|purpose| self.purpose_list(*purpose).iter().any(|id| id == key_id))
            .collect()
    }

    pub fn verification_method(&self, key_id: &str) -> Option<&VerificationMethod> {
        self.verification_method.iter().find(|vm| vm.id == key_id)
    }

    /// Every proof attached to the document, the single `proof` first.
    pub fn all_proofs(&self) -> Vec<&Proof> {
        self.proof.iter().chain(self.proofs.iter().flatten()).collect()
    }
}

/// Key registration input for document creation and `add_verification_method`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DidKeyInfo {
    pub controller: String,
    #[serde(rename = "keyId")]
    pub key_id: String,
    #[serde(rename = "publicKey")]
    pub public_key: String,
    #[serde(rename = "algoType")]
    pub algo_type: DidKeyType,
    #[serde(rename = "authType")]
    pub auth_type: AuthType,
    #[serde(rename = "keyPurpose", default)]
    pub key_purpose: Vec<ProofPurpose>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_type_is_an_integer_on_the_wire() {
        assert_eq!(serde_json::to_string(&AuthType::PinOrBio).unwrap(), "6");
        assert_eq!(serde_json::from_str::<AuthType>("7").unwrap(), AuthType::PinAndBio);
        assert!(serde_json::from_str::<AuthType>("3").is_err());
    }

    #[test]
    fn proof_type_curve_selection() {
        assert_eq!(ProofType::Secp256k1Signature2018.curve(), EccCurve::Secp256k1);
        assert_eq!(ProofType::Secp256r1Signature2018.curve(), EccCurve::Secp256r1);
        assert_eq!(ProofType::RsaSignature2018.curve(), EccCurve::Secp256r1);
    }

    #[test]
    fn key_url_round_trip() {
        let url = key_url("did:example:abc", "3", "assert");
        assert_eq!(url, "did:example:abc?versionId=3#assert");
        assert_eq!(key_id_from_url(&url), Some("assert"));
        assert_eq!(key_id_from_url("did:example:abc"), None);
    }

    #[test]
    fn empty_purpose_lists_are_omitted() {
        let mut doc = DidDocument::new("did:example:abc", "did:example:ctl");
        doc.authentication.push("auth".into());
        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("\"authentication\":[\"auth\"]"));
        assert!(!json.contains("assertionMethod"));
        assert!(!json.contains("proof"));

        let back: DidDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn purposes_follow_declaration_order() {
        let mut doc = DidDocument::new("did:example:abc", "did:example:ctl");
        doc.capability_invocation.push("k".into());
        doc.assertion_method.push("k".into());
        assert_eq!(
            doc.purposes_of("k"),
            vec![ProofPurpose::AssertionMethod, ProofPurpose::CapabilityInvocation]
        );
    }

    #[test]
    fn all_proofs_collects_single_and_list_forms() {
        let proof = |key_id: &str| Proof {
            proof_type: ProofType::Secp256r1Signature2018,
            created: UtcTimestamp::now(),
            proof_purpose: ProofPurpose::CapabilityInvocation,
            verification_method: key_url("did:example:abc", "1", key_id),
            proof_value: Some("z3x".to_string()),
        };
        let mut doc = DidDocument::new("did:example:abc", "did:example:ctl");
        assert!(doc.all_proofs().is_empty());

        doc.proof = Some(proof("invoke"));
        doc.proofs = Some(vec![proof("a"), proof("b")]);
        let ids: Vec<Option<&str>> = doc.all_proofs().iter().map(|p| p.key_id()).collect();
        assert_eq!(ids, vec![Some("invoke"), Some("a"), Some("b")]);
    }

    #[test]
    fn unknown_key_type_fails_to_parse() {
        let raw = r#"{"id":"k","type":"Ed25519VerificationKey2020","controller":"c","publicKeyMultibase":"z1","authType":1}"#;
        assert!(serde_json::from_str::<VerificationMethod>(raw).is_err());
    }
}

use crate::did::Proof;
use crate::timestamp::UtcTimestamp;
use crate::vc::{Claim, VerifiableCredential};
use serde::{Deserialize, Serialize};

/// A holder's presentation of one or more signed credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiablePresentation {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    pub id: String,
    #[serde(rename = "type")]
    pub types: Vec<String>,
    pub holder: String,
    #[serde(rename = "validFrom")]
    pub valid_from: UtcTimestamp,
    #[serde(rename = "validUntil")]
    pub valid_until: UtcTimestamp,
    #[serde(rename = "verifierNonce", default, skip_serializing_if = "Option::is_none")]
    pub verifier_nonce: Option<String>,
    #[serde(rename = "verifiableCredential")]
    pub verifiable_credential: Vec<VerifiableCredential>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<Proof>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proofs: Option<Vec<Proof>>,
}

impl VerifiablePresentation {
    /// Every claim of every credential, credential order then claim order.
    pub fn claims(&self) -> Vec<Claim> {
        self.verifiable_credential
            .iter()
            .flat_map(|vc| vc.credential_subject.claims.iter().cloned())
            .collect()
    }
}

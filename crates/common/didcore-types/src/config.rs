use crate::did::DID_CONTEXT_V1;
use crate::vc::{OSD_SCHEMA_CREDENTIAL, VC_CONTEXT_V1};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Settings shared by the document, credential and presentation managers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Context of newly created DID documents.
    pub did_context: Vec<String>,
    /// Context of issued credentials when the request supplies none.
    pub vc_context: Vec<String>,
    /// Schema type of issued credentials when the request supplies none.
    pub schema_type: String,
    /// Whether presentation verification checks each credential's `validUntil`.
    pub check_vc_expiration: bool,
    /// `tracing` filter directive for binaries, e.g. `info` or `didcore_identity=debug`.
    pub log_level: Option<String>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            did_context: vec![DID_CONTEXT_V1.to_string()],
            vc_context: vec![VC_CONTEXT_V1.to_string()],
            schema_type: OSD_SCHEMA_CREDENTIAL.to_string(),
            check_vc_expiration: true,
            log_level: None,
        }
    }
}

impl CoreConfig {
    /// Load configuration from a TOML file. Missing keys take their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        tracing::info!("Loading core config from: {:?}", path_ref);
        let text = fs::read_to_string(path_ref)
            .map_err(|e| anyhow::anyhow!("Failed to read config file at {:?}: {}", path_ref, e))?;
        let config: Self = toml::from_str(&text).map_err(|e| {
            anyhow::anyhow!("Failed to parse config from TOML at {:?}: {}", path_ref, e)
        })?;
        Ok(config)
    }
}

use crate::verify::verify_signature;
use didcore_types::{
    canonical_json, key_id_from_url, key_url, CoreConfig, CoreError, DidDocument, DidErrorCode,
    DidKeyInfo, DidServiceType, Proof, ProofPurpose, Result, Service, SignatureParams,
    UtcTimestamp, VerificationMethod,
};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Owns one committed DID document.
///
/// Mutations run against a [`StagedDocument`] copied from the committed one;
/// the committed document only changes when a staged copy is passed to
/// [`DidManager::commit`]. A failed mutation leaves it untouched.
#[derive(Debug, Clone, Default)]
pub struct DidManager {
    config: CoreConfig,
    document: Option<DidDocument>,
}

impl DidManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CoreConfig) -> Self {
        Self {
            config,
            document: None,
        }
    }

    /// Adopt an existing document.
    pub fn from_document(document: DidDocument) -> Self {
        Self {
            config: CoreConfig::default(),
            document: Some(document),
        }
    }

    pub fn document(&self) -> Option<&DidDocument> {
        self.document.as_ref()
    }

    pub fn into_document(self) -> Option<DidDocument> {
        self.document
    }

    fn committed(&self) -> Result<&DidDocument> {
        self.document.as_ref().ok_or_else(|| {
            CoreError::new(DidErrorCode::IdMissing).with_detail("no DID document loaded")
        })
    }

    /// Create a fresh document holding `key_infos`.
    pub fn create_document(
        &mut self,
        did: &str,
        controller: &str,
        key_infos: &[DidKeyInfo],
    ) -> Result<&DidDocument> {
        if key_infos.is_empty() {
            return Err(CoreError::new(DidErrorCode::InvalidArgument).with_detail("empty key list"));
        }
        if did.is_empty() {
            return Err(CoreError::new(DidErrorCode::InvalidArgument).with_detail("empty did"));
        }

        let mut document = DidDocument::new(did, controller);
        document.context = self.config.did_context.clone();
        let mut staged = StagedDocument { document };
        for key_info in key_infos {
            staged = staged.add_verification_method(key_info)?;
        }
        info!(did, keys = key_infos.len(), "Created DID document");
        Ok(self.commit(staged))
    }

    /// Read a JSON document from `path`.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<&DidDocument> {
        let path_ref = path.as_ref();
        if !path_ref.is_file() {
            return Err(CoreError::new(DidErrorCode::DocumentFileNotFound)
                .with_detail(path_ref.display().to_string()));
        }
        let text = fs::read_to_string(path_ref).map_err(|e| {
            CoreError::new(DidErrorCode::DocumentReadFailed)
                .with_detail(path_ref.display().to_string())
                .with_source(e)
        })?;
        debug!("Loaded DID document from {:?}", path_ref);
        self.parse(&text)
    }

    /// Replace the committed document with one parsed from JSON.
    pub fn parse(&mut self, json: &str) -> Result<&DidDocument> {
        let document: DidDocument = serde_json::from_str(json)
            .map_err(|e| CoreError::new(DidErrorCode::DocumentReadFailed).with_source(e))?;
        Ok(self.document.insert(document))
    }

    /// Start a transaction on a copy of the committed document.
    pub fn stage(&self) -> Result<StagedDocument> {
        Ok(StagedDocument {
            document: self.committed()?.clone(),
        })
    }

    /// Install a staged document as the committed one.
    pub fn commit(&mut self, staged: StagedDocument) -> &DidDocument {
        self.document.insert(staged.document)
    }

    pub fn add_verification_method(&mut self, key_info: &DidKeyInfo) -> Result<()> {
        let staged = self.stage()?.add_verification_method(key_info)?;
        self.commit(staged);
        info!(key_id = %key_info.key_id, "Added verification method");
        Ok(())
    }

    pub fn add_key_purpose(&mut self, key_id: &str, purposes: &[ProofPurpose]) -> Result<()> {
        let staged = self.stage()?.add_key_purpose(key_id, purposes)?;
        self.commit(staged);
        Ok(())
    }

    pub fn remove_verification_method(&mut self, key_id: &str) -> Result<()> {
        let staged = self.stage()?.remove_verification_method(key_id)?;
        self.commit(staged);
        info!(key_id, "Removed verification method");
        Ok(())
    }

    pub fn remove_key_purpose(&mut self, key_id: &str) -> Result<()> {
        let staged = self.stage()?.remove_key_purpose(key_id)?;
        self.commit(staged);
        Ok(())
    }

    pub fn add_service_endpoint(
        &mut self,
        service_id: &str,
        service_type: Option<DidServiceType>,
        url: &str,
    ) -> Result<()> {
        let staged = self
            .stage()?
            .add_service_endpoint(service_id, service_type, url)?;
        self.commit(staged);
        info!(service_id, "Added service endpoint");
        Ok(())
    }

    pub fn delete_service_endpoint(
        &mut self,
        service_id: Option<&str>,
        service_type: Option<DidServiceType>,
        url: Option<&str>,
    ) -> Result<()> {
        let staged = self
            .stage()?
            .delete_service_endpoint(service_id, service_type, url)?;
        self.commit(staged);
        info!(?service_id, "Deleted service endpoint");
        Ok(())
    }

    pub fn add_context(&mut self, context: &str) -> Result<()> {
        let staged = self.stage()?.add_context(context);
        self.commit(staged);
        Ok(())
    }

    pub fn add_proof(&mut self, signature_params: &[SignatureParams]) -> Result<()> {
        let staged = self.stage()?.add_proof(signature_params)?;
        self.commit(staged);
        info!(proofs = signature_params.len(), "Attached document proofs");
        Ok(())
    }

    pub fn get_verification_method(&self, key_id: &str) -> Option<&VerificationMethod> {
        self.document.as_ref()?.verification_method(key_id)
    }

    /// Keys referenced by any purpose other than `keyAgreement`, in
    /// verification method order. Empty when there are none.
    pub fn get_all_sign_key_ids(&self) -> Result<Vec<String>> {
        Ok(sign_key_ids(self.committed()?))
    }

    /// One signing payload per signing purpose of each key in `key_ids`.
    ///
    /// Each payload's `origin_data` is the document with a single unsigned
    /// proof for that key and purpose embedded in place of any existing proofs.
    pub fn get_origin_data_for_sign(&self, key_ids: &[&str]) -> Result<Vec<SignatureParams>> {
        let document = self.committed()?;
        let signable = sign_key_ids(document);
        let mut template = document.clone();
        template.proofs = None;

        let mut payloads = Vec::new();
        for key_id in key_ids {
            let method = document
                .verification_method(key_id)
                .ok_or_else(|| CoreError::new(DidErrorCode::KeyNotFound).with_detail(*key_id))?;
            if !signable.iter().any(|id| id == key_id) {
                return Err(CoreError::new(DidErrorCode::NotASigningKey).with_detail(*key_id));
            }

            let proof_type = method.key_type.proof_type();
            for purpose in document.purposes_of(key_id) {
                if !purpose.is_signing() {
                    continue;
                }
                template.proof = Some(Proof {
                    proof_type,
                    created: UtcTimestamp::now(),
                    proof_purpose: purpose,
                    verification_method: key_url(&document.id, &document.version_id, key_id),
                    proof_value: None,
                });
                let mut params =
                    SignatureParams::new(*key_id, purpose, proof_type, canonical_json(&template)?);
                params.public_key = Some(method.public_key_multibase.clone());
                payloads.push(params);
            }
        }
        debug!(payloads = payloads.len(), "Built document signing payloads");
        Ok(payloads)
    }

    /// Check every proof of the committed document against its verification method.
    pub fn verify_document_signature(&self) -> Result<()> {
        let document = self.committed()?;
        verify_document(document).map_err(|e| {
            warn!(did = %document.id, "DID document signature rejected: {}", e);
            CoreError::new(DidErrorCode::SignatureVerificationFailed)
                .with_detail(document.id.clone())
                .with_source(e)
        })
    }
}

fn verify_document(document: &DidDocument) -> Result<()> {
    let proofs = document.all_proofs();
    if proofs.is_empty() {
        return Err(CoreError::new(DidErrorCode::SigningKeyNotFound).with_detail("document has no proof"));
    }

    let mut unsigned = document.clone();
    unsigned.proofs = None;
    for proof in proofs {
        let key_id = proof.key_id().ok_or_else(|| {
            CoreError::new(DidErrorCode::SigningKeyNotFound)
                .with_detail(proof.verification_method.clone())
        })?;
        let method = document
            .verification_method(key_id)
            .ok_or_else(|| CoreError::new(DidErrorCode::SigningKeyNotFound).with_detail(key_id))?;

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

pub(crate) fn sign_key_ids(document: &DidDocument) -> Vec<String> {
    document
        .verification_method
        .iter()
        .filter(|method| {
            document
                .purposes_of(&method.id)
                .into_iter()
                .any(ProofPurpose::is_signing)
        })
        .map(|method| method.id.clone())
        .collect()
}

#[derive(Deserialize)]
struct ProofEnvelope {
    #[serde(default)]
    proof: Option<Proof>,
}

/// Turn signed payloads into proofs, checking each payload's key id against
/// the proof embedded in its own origin data.
pub(crate) fn proofs_from_payloads(signature_params: &[SignatureParams]) -> Result<Vec<Proof>> {
    if signature_params.is_empty() {
        return Err(CoreError::new(DidErrorCode::InvalidArgument).with_detail("no signing payloads"));
    }
    signature_params
        .iter()
        .map(|params| {
            let envelope: ProofEnvelope = serde_json::from_str(&params.origin_data).map_err(|e| {
                CoreError::new(DidErrorCode::KeyMismatch)
                    .with_detail(params.key_id.clone())
                    .with_source(e)
            })?;
            let mut proof = envelope.proof.ok_or_else(|| {
                CoreError::new(DidErrorCode::KeyMismatch).with_detail(params.key_id.clone())
            })?;
            if key_id_from_url(&proof.verification_method) != Some(params.key_id.as_str()) {
                return Err(CoreError::new(DidErrorCode::KeyMismatch).with_detail(params.key_id.clone()));
            }
            proof.proof_value = params.signature_value.clone();
            Ok(proof)
        })
        .collect()
}

/// A copy of a DID document under mutation.
///
/// Each mutator consumes the staged value and hands it back on success, so a
/// failed step drops the copy and nothing half-applied survives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedDocument {
    document: DidDocument,
}

impl StagedDocument {
    pub fn document(&self) -> &DidDocument {
        &self.document
    }

    pub fn add_verification_method(mut self, key_info: &DidKeyInfo) -> Result<Self> {
        if self.document.verification_method(&key_info.key_id).is_some() {
            return Err(CoreError::new(DidErrorCode::DuplicateKey).with_detail(key_info.key_id.clone()));
        }
        self.document.verification_method.push(VerificationMethod {
            id: key_info.key_id.clone(),
            key_type: key_info.algo_type,
            controller: key_info.controller.clone(),
            public_key_multibase: key_info.public_key.clone(),
            auth_type: key_info.auth_type,
        });
        self.add_key_purpose(&key_info.key_id, &key_info.key_purpose)
    }

    pub fn add_key_purpose(mut self, key_id: &str, purposes: &[ProofPurpose]) -> Result<Self> {
        if self.document.verification_method(key_id).is_none() {
            return Err(CoreError::new(DidErrorCode::UnregisteredKey).with_detail(key_id));
        }
        for purpose in purposes {
            let list = self.document.purpose_list_mut(*purpose);
            if list.iter().any(|id| id == key_id) {
                return Err(CoreError::new(DidErrorCode::DuplicateKey)
                    .with_detail(format!("{} already in {}", key_id, purpose)));
            }
            list.push(key_id.to_string());
        }
        Ok(self)
    }

    pub fn remove_verification_method(mut self, key_id: &str) -> Result<Self> {
        if self.document.verification_method(key_id).is_none() {
            return Err(CoreError::new(DidErrorCode::KeyNotFound).with_detail(key_id));
        }
        self.document.verification_method.retain(|method| method.id != key_id);
        self.remove_key_purpose(key_id)
    }

    /// Purge `key_id` from every purpose list that references it.
    pub fn remove_key_purpose(mut self, key_id: &str) -> Result<Self> {
        for purpose in self.document.purposes_of(key_id) {
            remove_from_purpose_list(self.document.purpose_list_mut(purpose), key_id)?;
        }
        Ok(self)
    }

    pub fn add_service_endpoint(
        mut self,
        service_id: &str,
        service_type: Option<DidServiceType>,
        url: &str,
    ) -> Result<Self> {
        match self.document.service.iter_mut().find(|s| s.id == service_id) {
            Some(existing) => {
                if let Some(service_type) = service_type {
                    if service_type != existing.service_type {
                        return Err(CoreError::new(DidErrorCode::ServiceTypeMismatch)
                            .with_detail(service_id));
                    }
                }
                if existing.service_endpoint.iter().any(|endpoint| endpoint == url) {
                    return Err(CoreError::new(DidErrorCode::DuplicateServiceUrl).with_detail(url));
                }
                existing.service_endpoint.push(url.to_string());
            }
            None => {
                let service_type = service_type.ok_or_else(|| {
                    CoreError::new(DidErrorCode::ServiceTypeMissing).with_detail(service_id)
                })?;
                self.document.service.push(Service {
                    id: service_id.to_string(),
                    service_type,
                    service_endpoint: vec![url.to_string()],
                });
            }
        }
        self.document.updated = UtcTimestamp::now();
        Ok(self)
    }

    /// Remove endpoints from every service matching both `service_id` and
    /// `service_type`; an absent filter matches everything. Without `url` the
    /// matching services are removed whole, and a service whose last
    /// endpoint is removed goes with it.
    pub fn delete_service_endpoint(
        mut self,
        service_id: Option<&str>,
        service_type: Option<DidServiceType>,
        url: Option<&str>,
    ) -> Result<Self> {
        if self.document.service.is_empty() {
            return Err(DidErrorCode::ServiceNotFound.into());
        }

        let mut matched = false;
        let mut index = 0;
        while index < self.document.service.len() {
            let service = &mut self.document.service[index];
            let id_matches = service_id.map_or(true, |id| id == service.id);
            let type_matches = service_type.map_or(true, |t| t == service.service_type);
            if !(id_matches && type_matches) {
                index += 1;
                continue;
            }

            matched = true;
            if let Some(url) = url {
                let before = service.service_endpoint.len();
                service.service_endpoint.retain(|endpoint| endpoint != url);
                if service.service_endpoint.len() == before {
                    return Err(CoreError::new(DidErrorCode::ServiceUrlNotFound).with_detail(url));
                }
                if !service.service_endpoint.is_empty() {
                    index += 1;
                    continue;
                }
            }
            self.document.service.remove(index);
        }

        if !matched {
            return Err(DidErrorCode::ServiceNotMatched.into());
        }
        self.document.updated = UtcTimestamp::now();
        Ok(self)
    }

    pub fn add_context(mut self, context: &str) -> Self {
        if !self.document.context.iter().any(|c| c == context) {
            self.document.context.push(context.to_string());
        }
        self
    }

    /// Attach signatures. One payload sets the singular `proof`; several
    /// populate `proofs` instead.
    pub fn add_proof(mut self, signature_params: &[SignatureParams]) -> Result<Self> {
        let mut proofs = proofs_from_payloads(signature_params)?;
        if proofs.len() == 1 {
            self.document.proof = proofs.pop();
            self.document.proofs = None;
        } else {
            self.document.proof = None;
            self.document.proofs = Some(proofs);
        }
        Ok(self)
    }
}

fn remove_from_purpose_list(list: &mut Vec<String>, key_id: &str) -> Result<()> {
    let before = list.len();
    list.retain(|id| id != key_id);
    if list.len() == before {
        return Err(CoreError::new(DidErrorCode::EmptyPurposeList).with_detail(key_id));
    }
    Ok(())
}

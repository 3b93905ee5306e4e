//! Data model of the DID core: documents, credentials, presentations, signing
//! payloads, the error taxonomy and shared configuration.
//!
//! Every entity serializes in declaration order with `None` fields omitted;
//! signing payloads are the compact JSON of these types (see [`canonical_json`]).

pub mod canonical;
pub mod config;
pub mod did;
pub mod error;
pub mod params;
pub mod timestamp;
pub mod vc;
pub mod vp;

pub use canonical::canonical_json;
pub use config::CoreConfig;
pub use did::{
    key_id_from_url, key_url, AuthType, DidDocument, DidKeyInfo, DidKeyType, DidServiceType,
    Proof, ProofPurpose, ProofType, Service, VerificationMethod, DID_CONTEXT_V1,
};
pub use error::{CoreError, DidErrorCode, ErrorCode, Result, VcErrorCode, VpErrorCode};
pub use params::{ClaimInfo, IssueVcParam, SignatureParams, SignatureVcParams, VpVerifyParam};
pub use timestamp::UtcTimestamp;
pub use vc::{
    Claim, ClaimDef, ClaimFormat, ClaimI18n, ClaimNamespace, ClaimType, CredentialSchema,
    CredentialSubject, Evidence, Filter, FilterSchema, Issuer, Location, Provider,
    ProviderDetail, SchemaClaims, SchemaCredentialSubject, SchemaMetadata, VcMeta, VcProof,
    VcSchema, VcStatus, VerifiableCredential, OSD_SCHEMA_CREDENTIAL, VC_CONTEXT_V1,
};
pub use vp::VerifiablePresentation;

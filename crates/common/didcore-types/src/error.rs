use didcore_crypto::CryptoError;
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Prefix shared by every error code of the core SDK.
pub const ERROR_CODE_BASE: &str = "SSDKCOR";

/// Failures raised by the DID document manager (subsystem `01`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DidErrorCode {
    /// Missing `did`, or an empty key list on document creation.
    InvalidArgument,
    DuplicateKey,
    KeyNotFound,
    EmptyPurposeList,
    NotASigningKey,
    /// Kept for code stability; `InvalidArgument` covers an empty `did`.
    IdMissing,
    SigningKeyNotFound,
    ServiceNotFound,
    ServiceTypeMismatch,
    ServiceTypeMissing,
    DuplicateServiceUrl,
    ServiceUrlNotFound,
    ServiceNotMatched,
    UnregisteredKey,
    DocumentFileNotFound,
    DocumentReadFailed,
    KeyMismatch,
    SignatureVerificationFailed,
}

impl DidErrorCode {
    pub const ALL: [DidErrorCode; 18] = [
        DidErrorCode::InvalidArgument,
        DidErrorCode::DuplicateKey,
        DidErrorCode::KeyNotFound,
        DidErrorCode::EmptyPurposeList,
        DidErrorCode::NotASigningKey,
        DidErrorCode::IdMissing,
        DidErrorCode::SigningKeyNotFound,
        DidErrorCode::ServiceNotFound,
        DidErrorCode::ServiceTypeMismatch,
        DidErrorCode::ServiceTypeMissing,
        DidErrorCode::DuplicateServiceUrl,
        DidErrorCode::ServiceUrlNotFound,
        DidErrorCode::ServiceNotMatched,
        DidErrorCode::UnregisteredKey,
        DidErrorCode::DocumentFileNotFound,
        DidErrorCode::DocumentReadFailed,
        DidErrorCode::KeyMismatch,
        DidErrorCode::SignatureVerificationFailed,
    ];

    pub fn sub_code(self) -> u16 {
        match self {
            DidErrorCode::InvalidArgument => 0,
            DidErrorCode::DuplicateKey => 1,
            DidErrorCode::KeyNotFound => 2,
            DidErrorCode::EmptyPurposeList => 3,
            DidErrorCode::NotASigningKey => 4,
            DidErrorCode::IdMissing => 5,
            DidErrorCode::SigningKeyNotFound => 6,
            DidErrorCode::ServiceNotFound => 7,
            DidErrorCode::ServiceTypeMismatch => 8,
            DidErrorCode::ServiceTypeMissing => 9,
            DidErrorCode::DuplicateServiceUrl => 10,
            DidErrorCode::ServiceUrlNotFound => 11,
            DidErrorCode::ServiceNotMatched => 12,
            DidErrorCode::UnregisteredKey => 13,
            DidErrorCode::DocumentFileNotFound => 14,
            DidErrorCode::DocumentReadFailed => 15,
            DidErrorCode::KeyMismatch => 16,
            DidErrorCode::SignatureVerificationFailed => 17,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            DidErrorCode::InvalidArgument => "Failed to add key",
            DidErrorCode::DuplicateKey => "duplicatedKey",
            DidErrorCode::KeyNotFound => "Key is not saved in the verification method",
            DidErrorCode::EmptyPurposeList => "Keypurpose list is empty",
            DidErrorCode::NotASigningKey => "It's not a signing key",
            DidErrorCode::IdMissing => "ID is null",
            DidErrorCode::SigningKeyNotFound => "Signkey does not exist in DIDs",
            DidErrorCode::ServiceNotFound => "Service not found",
            DidErrorCode::ServiceTypeMismatch => "Service ID already exists with a different type",
            DidErrorCode::ServiceTypeMissing => "Service type must be provided for a new service ID",
            DidErrorCode::DuplicateServiceUrl => "the Service URL already exists",
            DidErrorCode::ServiceUrlNotFound => "Service URL does not exist",
            DidErrorCode::ServiceNotMatched => "There is not matched service",
            DidErrorCode::UnregisteredKey => "The Key is not registered on VerificationMethod",
            DidErrorCode::DocumentFileNotFound => "DidDocument file not found.",
            DidErrorCode::DocumentReadFailed => "Failed to read DidDocument File",
            DidErrorCode::KeyMismatch => "Key id of the signing payload does not match its proof",
            DidErrorCode::SignatureVerificationFailed => "DidDocument signature verification failed",
        }
    }
}

/// Failures raised by the credential issuer (subsystem `02`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VcErrorCode {
    MissingRequiredClaim,
    NotAssertionMethod,
    KeyPurposeMismatch,
    SchemaMissingDetail,
    MultibaseEncodingFail,
    ExpiredCredential,
    ClaimsMissing,
    SigningKeyNotFound,
    MissingVcType,
}

impl VcErrorCode {
    pub const ALL: [VcErrorCode; 9] = [
        VcErrorCode::MissingRequiredClaim,
        VcErrorCode::NotAssertionMethod,
        VcErrorCode::KeyPurposeMismatch,
        VcErrorCode::SchemaMissingDetail,
        VcErrorCode::MultibaseEncodingFail,
        VcErrorCode::ExpiredCredential,
        VcErrorCode::ClaimsMissing,
        VcErrorCode::SigningKeyNotFound,
        VcErrorCode::MissingVcType,
    ];

    pub fn sub_code(self) -> u16 {
        match self {
            VcErrorCode::MissingRequiredClaim => 0,
            VcErrorCode::NotAssertionMethod => 1,
            VcErrorCode::KeyPurposeMismatch => 2,
            VcErrorCode::SchemaMissingDetail => 3,
            VcErrorCode::MultibaseEncodingFail => 4,
            VcErrorCode::ExpiredCredential => 5,
            VcErrorCode::ClaimsMissing => 6,
            VcErrorCode::SigningKeyNotFound => 7,
            VcErrorCode::MissingVcType => 8,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            VcErrorCode::MissingRequiredClaim => "Public claim is not submited",
            VcErrorCode::NotAssertionMethod => "SignKey is not of type Assertion Method",
            VcErrorCode::KeyPurposeMismatch => "SignKey and key of proof are different",
            VcErrorCode::SchemaMissingDetail => "Required information is missing in the schema",
            VcErrorCode::MultibaseEncodingFail => "Multibase encoding failed",
            VcErrorCode::ExpiredCredential => "Expired Verifiable Credential",
            VcErrorCode::ClaimsMissing => "Privacy Data does not Exist",
            VcErrorCode::SigningKeyNotFound => "Signkey does not exist in DIDs",
            VcErrorCode::MissingVcType => "VcType is missing",
        }
    }
}

/// Failures raised by presentation handling and signature checks (subsystem `03`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VpErrorCode {
    ExpiredPresentation,
    ClaimsMissing,
    IssuerNotAllowed,
    RequiredClaimMissing,
    ExpiredCredential,
    SchemaMismatch,
    SignatureVerificationFailed,
    HashFailed,
    MultibaseDecodingFail,
    SigningKeyNotFound,
    ProofValueMissing,
    NotAuthenticationKey,
}

impl VpErrorCode {
    pub const ALL: [VpErrorCode; 12] = [
        VpErrorCode::ExpiredPresentation,
        VpErrorCode::ClaimsMissing,
        VpErrorCode::IssuerNotAllowed,
        VpErrorCode::RequiredClaimMissing,
        VpErrorCode::ExpiredCredential,
        VpErrorCode::SchemaMismatch,
        VpErrorCode::SignatureVerificationFailed,
        VpErrorCode::HashFailed,
        VpErrorCode::MultibaseDecodingFail,
        VpErrorCode::SigningKeyNotFound,
        VpErrorCode::ProofValueMissing,
        VpErrorCode::NotAuthenticationKey,
    ];

    pub fn sub_code(self) -> u16 {
        match self {
            VpErrorCode::ExpiredPresentation => 0,
            VpErrorCode::ClaimsMissing => 1,
            VpErrorCode::IssuerNotAllowed => 2,
            VpErrorCode::RequiredClaimMissing => 3,
            VpErrorCode::ExpiredCredential => 4,
            VpErrorCode::SchemaMismatch => 5,
            VpErrorCode::SignatureVerificationFailed => 6,
            VpErrorCode::HashFailed => 7,
            VpErrorCode::MultibaseDecodingFail => 8,
            VpErrorCode::SigningKeyNotFound => 9,
            VpErrorCode::ProofValueMissing => 10,
            VpErrorCode::NotAuthenticationKey => 11,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            VpErrorCode::ExpiredPresentation => "Expired Verifiable Presentation",
            VpErrorCode::ClaimsMissing => "Privacy Data does not Exist",
            VpErrorCode::IssuerNotAllowed => "This Issuer is not allowed",
            VpErrorCode::RequiredClaimMissing => "Requried Claim is not Submited",
            VpErrorCode::ExpiredCredential => "Expired Verifiable Credential",
            VpErrorCode::SchemaMismatch => "Schema Id, Type does not match Type",
            VpErrorCode::SignatureVerificationFailed => "Verify Signature is failed",
            VpErrorCode::HashFailed => "Failed to generate VP,VC HashData.",
            VpErrorCode::MultibaseDecodingFail => "Multibase decoding failed",
            VpErrorCode::SigningKeyNotFound => "Signkey does not exist in DIDs",
            VpErrorCode::ProofValueMissing => {
                "ProofValue(Total claim signature value) does not exist in VC Proof"
            }
            VpErrorCode::NotAuthenticationKey => "SignKey is not of type Authentication",
        }
    }
}

/// One entry of the closed error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Did(DidErrorCode),
    Vc(VcErrorCode),
    Vp(VpErrorCode),
}

impl ErrorCode {
    /// Two-digit subsystem code.
    pub fn subsystem(self) -> &'static str {
        match self {
            ErrorCode::Did(_) => "01",
            ErrorCode::Vc(_) => "02",
            ErrorCode::Vp(_) => "03",
        }
    }

    pub fn sub_code(self) -> u16 {
        match self {
            ErrorCode::Did(c) => c.sub_code(),
            ErrorCode::Vc(c) => c.sub_code(),
            ErrorCode::Vp(c) => c.sub_code(),
        }
    }

    /// Full code string, e.g. `SSDKCOR01001`.
    pub fn code(self) -> String {
        format!("{}{}{:03}", ERROR_CODE_BASE, self.subsystem(), self.sub_code())
    }

    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::Did(c) => c.message(),
            ErrorCode::Vc(c) => c.message(),
            ErrorCode::Vp(c) => c.message(),
        }
    }

    /// Every code of the taxonomy, subsystem by subsystem.
    pub fn all() -> impl Iterator<Item = ErrorCode> {
        DidErrorCode::ALL
            .into_iter()
            .map(ErrorCode::Did)
            .chain(VcErrorCode::ALL.into_iter().map(ErrorCode::Vc))
            .chain(VpErrorCode::ALL.into_iter().map(ErrorCode::Vp))
    }

    /// Look up a code by its full string form.
    pub fn from_code(code: &str) -> Option<ErrorCode> {
        Self::all().find(|candidate| candidate.code() == code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message())
    }
}

impl From<DidErrorCode> for ErrorCode {
    fn from(code: DidErrorCode) -> Self {
        ErrorCode::Did(code)
    }
}

impl From<VcErrorCode> for ErrorCode {
    fn from(code: VcErrorCode) -> Self {
        ErrorCode::Vc(code)
    }
}

impl From<VpErrorCode> for ErrorCode {
    fn from(code: VpErrorCode) -> Self {
        ErrorCode::Vp(code)
    }
}

/// Error returned by every fallible core operation.
#[derive(Debug, Error)]
#[error("{code}{}", detail_suffix(.detail))]
pub struct CoreError {
    code: ErrorCode,
    detail: Option<String>,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_ref()
        .map(|detail| format!(": {}", detail))
        .unwrap_or_default()
}

impl CoreError {
    pub fn new(code: impl Into<ErrorCode>) -> Self {
        Self {
            code: code.into(),
            detail: None,
            source: None,
        }
    }

    /// Attach context such as the offending credential id.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}

impl From<DidErrorCode> for CoreError {
    fn from(code: DidErrorCode) -> Self {
        CoreError::new(code)
    }
}

impl From<VcErrorCode> for CoreError {
    fn from(code: VcErrorCode) -> Self {
        CoreError::new(code)
    }
}

impl From<VpErrorCode> for CoreError {
    fn from(code: VpErrorCode) -> Self {
        CoreError::new(code)
    }
}

impl From<CryptoError> for CoreError {
    fn from(err: CryptoError) -> Self {
        let code: ErrorCode = match &err {
            CryptoError::MultibaseDecoding(_) => VpErrorCode::MultibaseDecodingFail.into(),
            CryptoError::UnsupportedEncoding(_) => VcErrorCode::MultibaseEncodingFail.into(),
            CryptoError::InvalidPublicKey { .. }
            | CryptoError::InvalidSecretKey { .. }
            | CryptoError::InvalidSignatureLength { .. }
            | CryptoError::MalformedSignature { .. }
            | CryptoError::Signing { .. }
            | CryptoError::Verification { .. } => VpErrorCode::SignatureVerificationFailed.into(),
        };
        CoreError::new(code).with_source(err)
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

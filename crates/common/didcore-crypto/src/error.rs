use crate::EccCurve;
use thiserror::Error;

/// Error types for the crypto boundary.
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("multibase decoding failed: {0}")]
    MultibaseDecoding(#[from] multibase::Error),

    #[error("unsupported multibase encoding character '{0}'")]
    UnsupportedEncoding(char),

    #[error("invalid compressed public key for {curve}")]
    InvalidPublicKey { curve: EccCurve },

    #[error("invalid secret key for {curve}")]
    InvalidSecretKey { curve: EccCurve },

    #[error("invalid compact signature: expected 64 or 65 bytes, found {found_len} bytes")]
    InvalidSignatureLength { found_len: usize },

    #[error("malformed {curve} signature")]
    MalformedSignature { curve: EccCurve },

    #[error("failed to sign digest with {curve}")]
    Signing { curve: EccCurve },

    #[error("{curve} signature verification failed")]
    Verification { curve: EccCurve },
}

/// Result type for crypto operations
pub type Result<T> = std::result::Result<T, CryptoError>;

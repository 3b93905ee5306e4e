use crate::{CryptoError, Result};
use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa::{
    Signature as K256Signature, SigningKey as K256SigningKey, VerifyingKey as K256VerifyingKey,
};
use p256::ecdsa::{
    Signature as P256Signature, SigningKey as P256SigningKey, VerifyingKey as P256VerifyingKey,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of an `r || s` compact signature.
pub const COMPACT_SIGNATURE_LENGTH: usize = 64;

/// Elliptic curves supported for signing and verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EccCurve {
    Secp256k1,
    Secp256r1,
}

impl fmt::Display for EccCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EccCurve::Secp256k1 => write!(f, "secp256k1"),
            EccCurve::Secp256r1 => write!(f, "secp256r1"),
        }
    }
}

/// Strip the recovery header of a 65-byte signature, leaving `r || s`.
fn compact_rs(signature: &[u8]) -> Result<&[u8]> {
    match signature.len() {
        COMPACT_SIGNATURE_LENGTH => Ok(signature),
        65 => Ok(&signature[1..]),
        found_len => Err(CryptoError::InvalidSignatureLength { found_len }),
    }
}

/// Verify a compact signature over a precomputed digest.
///
/// `public_key` is a compressed SEC1 point. `signature` is `r || s`, optionally
/// prefixed by a one-byte recovery header. High-S signatures are normalized
/// before checking.
pub fn verify_compact(
    public_key: &[u8],
    digest: &[u8],
    signature: &[u8],
    curve: EccCurve,
) -> Result<()> {
    let rs = compact_rs(signature)?;
    match curve {
        EccCurve::Secp256k1 => {
            let key = K256VerifyingKey::from_sec1_bytes(public_key)
                .map_err(|_| CryptoError::InvalidPublicKey { curve })?;
            let sig = K256Signature::from_slice(rs)
                .map_err(|_| CryptoError::MalformedSignature { curve })?;
            let sig = sig.normalize_s().unwrap_or(sig);
            key.verify_prehash(digest, &sig)
                .map_err(|_| CryptoError::Verification { curve })
        }
        EccCurve::Secp256r1 => {
            let key = P256VerifyingKey::from_sec1_bytes(public_key)
                .map_err(|_| CryptoError::InvalidPublicKey { curve })?;
            let sig = P256Signature::from_slice(rs)
                .map_err(|_| CryptoError::MalformedSignature { curve })?;
            let sig = sig.normalize_s().unwrap_or(sig);
            key.verify_prehash(digest, &sig)
                .map_err(|_| CryptoError::Verification { curve })
        }
    }
}

/// Sign a precomputed digest, returning a 64-byte `r || s` signature.
pub fn sign_compact(secret_key: &[u8], digest: &[u8], curve: EccCurve) -> Result<Vec<u8>> {
    match curve {
        EccCurve::Secp256k1 => {
            let key = K256SigningKey::from_slice(secret_key)
                .map_err(|_| CryptoError::InvalidSecretKey { curve })?;
            sign_k256(&key, digest)
        }
        EccCurve::Secp256r1 => {
            let key = P256SigningKey::from_slice(secret_key)
                .map_err(|_| CryptoError::InvalidSecretKey { curve })?;
            sign_p256(&key, digest)
        }
    }
}

pub(crate) fn sign_k256(key: &K256SigningKey, digest: &[u8]) -> Result<Vec<u8>> {
    let sig: K256Signature = key.sign_prehash(digest).map_err(|_| CryptoError::Signing {
        curve: EccCurve::Secp256k1,
    })?;
    Ok(sig.to_bytes().to_vec())
}

pub(crate) fn sign_p256(key: &P256SigningKey, digest: &[u8]) -> Result<Vec<u8>> {
    let sig: P256Signature = key.sign_prehash(digest).map_err(|_| CryptoError::Signing {
        curve: EccCurve::Secp256r1,
    })?;
    Ok(sig.to_bytes().to_vec())
}

use crate::signature::{sign_k256, sign_p256};
use crate::{encoding, sha256, EccCurve, MultibaseType, Result};
use crate::CryptoError;
use k256::ecdsa::SigningKey as K256SigningKey;
use p256::ecdsa::SigningKey as P256SigningKey;
use rand::rngs::OsRng;
use std::fmt;

enum SecretKey {
    K1(K256SigningKey),
    R1(P256SigningKey),
}

/// An ECDSA key pair on one of the supported curves.
pub struct KeyPair {
    secret: SecretKey,
}

impl KeyPair {
    /// Generate a fresh key pair from the OS random source.
    pub fn generate(curve: EccCurve) -> Self {
        let secret = match curve {
            EccCurve::Secp256k1 => SecretKey::K1(K256SigningKey::random(&mut OsRng)),
            EccCurve::Secp256r1 => SecretKey::R1(P256SigningKey::random(&mut OsRng)),
        };
        Self { secret }
    }

    /// Restore a key pair from a 32-byte big-endian scalar.
    pub fn from_secret_bytes(curve: EccCurve, bytes: &[u8]) -> Result<Self> {
        let secret = match curve {
            EccCurve::Secp256k1 => SecretKey::K1(
                K256SigningKey::from_slice(bytes)
                    .map_err(|_| CryptoError::InvalidSecretKey { curve })?,
            ),
            EccCurve::Secp256r1 => SecretKey::R1(
                P256SigningKey::from_slice(bytes)
                    .map_err(|_| CryptoError::InvalidSecretKey { curve })?,
            ),
        };
        Ok(Self { secret })
    }

    pub fn curve(&self) -> EccCurve {
        match self.secret {
            SecretKey::K1(_) => EccCurve::Secp256k1,
            SecretKey::R1(_) => EccCurve::Secp256r1,
        }
    }

    pub fn secret_bytes(&self) -> Vec<u8> {
        match &self.secret {
            SecretKey::K1(key) => key.to_bytes().to_vec(),
            SecretKey::R1(key) => key.to_bytes().to_vec(),
        }
    }

    /// Compressed SEC1 public key (33 bytes).
    pub fn public_key_bytes(&self) -> Vec<u8> {
        match &self.secret {
            SecretKey::K1(key) => key.verifying_key().to_encoded_point(true).as_bytes().to_vec(),
            SecretKey::R1(key) => key.verifying_key().to_encoded_point(true).as_bytes().to_vec(),
        }
    }

    /// Public key as it appears in a verification method's `publicKeyMultibase`.
    pub fn public_key_multibase(&self) -> String {
        encoding::encode(&self.public_key_bytes(), MultibaseType::Base58Btc)
    }

    /// Sign a precomputed SHA-256 digest.
    pub fn sign_digest(&self, digest: &[u8]) -> Result<Vec<u8>> {
        match &self.secret {
            SecretKey::K1(key) => sign_k256(key, digest),
            SecretKey::R1(key) => sign_p256(key, digest),
        }
    }

    /// Hash `origin_data` and sign the digest.
    pub fn sign(&self, origin_data: &[u8]) -> Result<Vec<u8>> {
        self.sign_digest(&sha256(origin_data))
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("curve", &self.curve())
            .field("public_key", &self.public_key_multibase())
            .finish()
    }
}

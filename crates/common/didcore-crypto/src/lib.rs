//! Crypto boundary for the DID core.
//!
//! - SHA-256 digest of signing payloads.
//! - Multibase encode/decode (`base16`, `base58btc`, `base64`, `base64url`).
//! - Compact ECDSA signatures over secp256k1 and secp256r1 with compressed SEC1 keys.
//! - `KeyPair` generation and signing for issuers and holders.

#![forbid(unsafe_code)]

mod digest;
mod encoding;
mod error;
mod keypair;
mod signature;

pub use digest::{sha256, SHA256_LENGTH};
pub use encoding::{decode as multibase_decode, encode as multibase_encode, MultibaseType};
pub use error::{CryptoError, Result};
pub use keypair::KeyPair;
pub use signature::{sign_compact, verify_compact, EccCurve, COMPACT_SIGNATURE_LENGTH};

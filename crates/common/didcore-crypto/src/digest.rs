use sha2::{Digest, Sha256};

/// Length in bytes of a SHA-256 digest.
pub const SHA256_LENGTH: usize = 32;

/// Hash `data` with SHA-256.
pub fn sha256(data: &[u8]) -> [u8; SHA256_LENGTH] {
    Sha256::digest(data).into()
}

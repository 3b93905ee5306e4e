use crate::{CryptoError, Result};
use multibase::Base;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Multibase encodings accepted for claim values, keys and signatures.
///
/// Each variant is addressed by its multibase prefix character, which is how
/// issuance requests name the encoding of a claim value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MultibaseType {
    Base16,
    Base16Upper,
    #[default]
    Base58Btc,
    Base64,
    Base64Url,
}

impl MultibaseType {
    /// The multibase prefix character.
    pub fn character(self) -> char {
        match self {
            MultibaseType::Base16 => 'f',
            MultibaseType::Base16Upper => 'F',
            MultibaseType::Base58Btc => 'z',
            MultibaseType::Base64 => 'm',
            MultibaseType::Base64Url => 'u',
        }
    }

    /// Look up an encoding by its multibase prefix character.
    pub fn from_char(c: char) -> Result<Self> {
        match c {
            'f' => Ok(MultibaseType::Base16),
            'F' => Ok(MultibaseType::Base16Upper),
            'z' => Ok(MultibaseType::Base58Btc),
            'm' => Ok(MultibaseType::Base64),
            'u' => Ok(MultibaseType::Base64Url),
            other => Err(CryptoError::UnsupportedEncoding(other)),
        }
    }

    fn base(self) -> Base {
        match self {
            MultibaseType::Base16 => Base::Base16Lower,
            MultibaseType::Base16Upper => Base::Base16Upper,
            MultibaseType::Base58Btc => Base::Base58Btc,
            MultibaseType::Base64 => Base::Base64,
            MultibaseType::Base64Url => Base::Base64Url,
        }
    }
}

impl fmt::Display for MultibaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.character())
    }
}

/// Multibase-encode `data`; the result carries the prefix character.
pub fn encode(data: &[u8], encoding: MultibaseType) -> String {
    multibase::encode(encoding.base(), data)
}

/// Decode any supported multibase string.
pub fn decode(input: &str) -> Result<Vec<u8>> {
    let (_, bytes) = multibase::decode(input)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn prefix_characters_round_trip() {
        for encoding in [
            MultibaseType::Base16,
            MultibaseType::Base16Upper,
            MultibaseType::Base58Btc,
            MultibaseType::Base64,
            MultibaseType::Base64Url,
        ] {
            assert_eq!(MultibaseType::from_char(encoding.character()).unwrap(), encoding);
            assert!(encode(b"claim", encoding).starts_with(encoding.character()));
        }
    }

    #[test]
    fn unknown_prefix_is_rejected() {
        assert_matches!(MultibaseType::from_char('q'), Err(CryptoError::UnsupportedEncoding('q')));
    }

    #[test]
    fn decode_rejects_garbage() {
        assert_matches!(decode("z0OIl"), Err(CryptoError::MultibaseDecoding(_)));
        assert_matches!(decode(""), Err(CryptoError::MultibaseDecoding(_)));
    }
}

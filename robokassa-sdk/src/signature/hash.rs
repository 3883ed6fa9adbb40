//! Digest algorithms Robokassa accepts for `SignatureValue`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Hash used for every signature of one merchant.
///
/// Must match the algorithm selected in the merchant's technical settings;
/// a mismatch is not detectable here and simply yields signatures the
/// gateway rejects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Md5,
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown hash algorithm: {0:?}")]
pub struct UnknownHashAlgorithm(pub String);

impl HashAlgorithm {
    pub const ALL: [HashAlgorithm; 5] = [
        HashAlgorithm::Md5,
        HashAlgorithm::Sha1,
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha384,
        HashAlgorithm::Sha512,
    ];

    /// Lowercase hex digest of `input`.
    pub fn digest(self, input: &str) -> String {
        match self {
            HashAlgorithm::Md5 => format!("{:x}", md5::compute(input.as_bytes())),
            HashAlgorithm::Sha1 => ring_digest(&ring::digest::SHA1_FOR_LEGACY_USE_ONLY, input),
            HashAlgorithm::Sha256 => ring_digest(&ring::digest::SHA256, input),
            HashAlgorithm::Sha384 => ring_digest(&ring::digest::SHA384, input),
            HashAlgorithm::Sha512 => ring_digest(&ring::digest::SHA512, input),
        }
    }

    /// Length of [`digest`](Self::digest) output in hex characters.
    pub fn hex_len(self) -> usize {
        match self {
            HashAlgorithm::Md5 => 32,
            HashAlgorithm::Sha1 => 40,
            HashAlgorithm::Sha256 => 64,
            HashAlgorithm::Sha384 => 96,
            HashAlgorithm::Sha512 => 128,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
        }
    }
}

fn ring_digest(algorithm: &'static ring::digest::Algorithm, input: &str) -> String {
    hex::encode(ring::digest::digest(algorithm, input.as_bytes()))
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = UnknownHashAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HashAlgorithm::ALL
            .into_iter()
            .find(|algorithm| algorithm.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownHashAlgorithm(s.to_owned()))
    }
}

#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Digests for nxfw
//!
//! MD5 names the finished archive in its checksum sidecar; SHA-256 checks
//! content blobs against the hash the CDN advertises.

use md5::Md5;
use nxfw_errors::{Error, StorageError};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Size of chunks for streaming hash computation
const CHUNK_SIZE: usize = 64 * 1024; // 64KB

/// Supported digest algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Md5,
    Sha256,
}

/// A digest value tagged with the algorithm that produced it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Hash {
    algorithm: HashAlgorithm,
    bytes: Vec<u8>,
}

impl Hash {
    /// Lowercase hex form
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// Compute the digest of a byte slice
    #[must_use]
    pub fn from_data(algorithm: HashAlgorithm, data: &[u8]) -> Self {
        let bytes = match algorithm {
            HashAlgorithm::Md5 => Md5::digest(data).to_vec(),
            HashAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
        };
        Self { algorithm, bytes }
    }

    /// Compute the digest of a file without loading it whole
    ///
    /// Reads with blocking I/O; call it from a blocking task.
    ///
    /// # Errors
    /// Returns a `StorageError` naming the path if the file cannot be opened
    /// or read.
    pub fn hash_file(algorithm: HashAlgorithm, path: &Path) -> Result<Self, Error> {
        let file = File::open(path).map_err(|e| StorageError::from_io_with_path(&e, path))?;

        let bytes = match algorithm {
            HashAlgorithm::Md5 => stream_digest::<Md5>(file, path)?,
            HashAlgorithm::Sha256 => stream_digest::<Sha256>(file, path)?,
        };
        Ok(Self { algorithm, bytes })
    }

    /// Compare against a hex digest, ignoring case
    #[must_use]
    pub fn matches_hex(&self, expected: &str) -> bool {
        self.to_hex().eq_ignore_ascii_case(expected.trim())
    }
}

fn stream_digest<D: Digest>(mut file: File, path: &Path) -> Result<Vec<u8>, Error> {
    let mut hasher = D::new();
    let mut buffer = vec![0; CHUNK_SIZE];

    loop {
        let n = file
            .read(&mut buffer)
            .map_err(|e| StorageError::from_io_with_path(&e, path))?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hasher.finalize().to_vec())
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vectors() {
        assert_eq!(
            Hash::from_data(HashAlgorithm::Md5, b"").to_hex(),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
        assert_eq!(
            Hash::from_data(HashAlgorithm::Sha256, b"abc").to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_matches_hex_ignores_case() {
        let hash = Hash::from_data(HashAlgorithm::Md5, b"");
        assert!(hash.matches_hex("D41D8CD98F00B204E9800998ECF8427E"));
        assert!(!hash.matches_hex("00"));
    }
}

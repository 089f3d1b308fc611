//! Content hashing for matched files

use md5::Md5;
use sha2::digest::Output;
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Digest used to fingerprint file content
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HashAlgorithm {
    /// MD5, 32 hex characters
    #[default]
    Md5,
    /// SHA-256, 64 hex characters
    Sha256,
}

impl HashAlgorithm {
    /// Length of the hex rendering of this digest
    pub fn hex_len(self) -> usize {
        match self {
            HashAlgorithm::Md5 => 32,
            HashAlgorithm::Sha256 => 64,
        }
    }

    /// Hash everything `reader` yields and render it as lowercase hex
    pub fn hash_reader<R: Read>(self, reader: &mut R) -> io::Result<String> {
        match self {
            HashAlgorithm::Md5 => Ok(format!("{:x}", digest_reader::<Md5, _>(reader)?)),
            HashAlgorithm::Sha256 => Ok(format!("{:x}", digest_reader::<Sha256, _>(reader)?)),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashAlgorithm::Md5 => f.write_str("md5"),
            HashAlgorithm::Sha256 => f.write_str("sha256"),
        }
    }
}

fn digest_reader<D: Digest, R: Read>(reader: &mut R) -> io::Result<Output<D>> {
    let mut hasher = D::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize())
}

/// Compute the content hash of a file
///
/// # Arguments
/// * `path` - Path to the file
/// * `algorithm` - Digest to use
///
/// # Returns
/// Lowercase hex digest of the full file content
pub fn compute_file_hash(path: &Path, algorithm: HashAlgorithm) -> io::Result<String> {
    let mut file = File::open(path)?;
    algorithm.hash_reader(&mut file)
}

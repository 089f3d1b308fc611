//! Signature-based file classification
//!
//! Files are identified by the bytes they start with, never by extension.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Read};

/// File types the scanner can recognise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FileType {
    #[serde(rename = "PDF")]
    Pdf,
    #[serde(rename = "JPEG")]
    Jpeg,
}

impl FileType {
    /// Label written to the output artifact
    pub fn label(self) -> &'static str {
        match self {
            FileType::Pdf => "PDF",
            FileType::Jpeg => "JPEG",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A magic byte prefix and the type it identifies
#[derive(Debug, Clone, Copy)]
pub struct Signature {
    pub magic: &'static [u8],
    pub file_type: FileType,
}

impl Signature {
    /// Check whether `header` starts with this signature's magic bytes
    pub fn matches(&self, header: &[u8]) -> bool {
        header.starts_with(self.magic)
    }
}

/// Known signatures in priority order. The first match wins, so a more
/// specific prefix must be listed before any shorter prefix it extends.
pub const SIGNATURES: &[Signature] = &[
    Signature {
        magic: &[0x25, 0x50, 0x44, 0x46], // %PDF
        file_type: FileType::Pdf,
    },
    Signature {
        magic: &[0xFF, 0xD8],
        file_type: FileType::Jpeg,
    },
];

/// Number of leading bytes needed to evaluate every rule in [`SIGNATURES`]
pub const HEADER_LEN: usize = max_magic_len(SIGNATURES);

const fn max_magic_len(signatures: &[Signature]) -> usize {
    let mut max = 0;
    let mut i = 0;
    while i < signatures.len() {
        if signatures[i].magic.len() > max {
            max = signatures[i].magic.len();
        }
        i += 1;
    }
    max
}

/// Classify a file from its leading bytes
///
/// # Arguments
/// * `header` - The first bytes of the file; may be shorter than [`HEADER_LEN`]
///
/// # Returns
/// The matching file type, or `None` if no signature matches
pub fn classify(header: &[u8]) -> Option<FileType> {
    SIGNATURES
        .iter()
        .find(|sig| sig.matches(header))
        .map(|sig| sig.file_type)
}

/// Read up to [`HEADER_LEN`] bytes from the start of `reader`.
///
/// Short files yield a short header rather than an error.
pub fn read_header<R: Read>(reader: &mut R) -> io::Result<Vec<u8>> {
    let mut header = Vec::with_capacity(HEADER_LEN);
    reader.take(HEADER_LEN as u64).read_to_end(&mut header)?;
    Ok(header)
}

//! Classification, hashing and error types

pub mod error;
pub mod hasher;
pub mod signature;

pub use error::ScanError;
pub use hasher::{compute_file_hash, HashAlgorithm};
pub use signature::{classify, read_header, FileType, Signature, HEADER_LEN, SIGNATURES};

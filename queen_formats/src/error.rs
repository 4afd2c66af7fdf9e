use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while locating or decoding game data.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("resource '{0}' not found in the bundle table")]
    ResourceNotFound(String),
    #[error("resource table version {found} is unsupported, expected version {required}")]
    FormatVersionMismatch { required: u32, found: u32 },
    #[error("release check failed: expected '{expected}', found '{found}'")]
    ReleaseVersionMismatch { expected: String, found: String },
    #[error("unknown or unsupported release (data file is {size} bytes)")]
    UnknownRelease { size: u64 },
    #[error("bundle file {} could not be opened", .0.display())]
    MissingBundle(PathBuf),
    #[error("malformed data: {0}")]
    Malformed(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T, E = FormatError> = std::result::Result<T, E>;

use std::io;
use thiserror::Error;

use crate::resource::ResourceKind;

/// Result alias used across the crate. Basically equal to: `Result<T, ResourceError>`
pub type ResourceResult<T = ()> = Result<T, ResourceError>;

/// Every failure the archive reader and the decoders can report
#[derive(Debug, Error)]
pub enum ResourceError {
    /// neither the per-kind (v2) nor the combined (v3) directory files could be found
    #[error("[AgiError::ConfigurationError] {0}")]
    Configuration(String),
    /// a game descriptor failed to parse
    #[error("[AgiError::ConfigurationError] Invalid game descriptor: {0}")]
    Descriptor(#[from] toml::de::Error),
    /// no directory entry exists for the requested resource
    #[error("[AgiError::MissingResource] No {kind} resource with id {id}")]
    MissingResource { kind: ResourceKind, id: u8 },
    /// the volume holding a resource is not mapped or its size is unknown
    #[error("[AgiError::MissingVolume] Volume {0} is missing or unreadable")]
    MissingVolume(u8),
    /// thin wrapper over [io::Error](std::io::Error) raised by the file-access collaborator
    #[error("[AgiError::IOFailure] {0}")]
    Io(#[from] io::Error),
    /// the resource does not start with the 0x12, 0x34 magic
    #[error("[AgiError::CorruptResource] {kind} {id} has an invalid signature {found:02x?}")]
    BadSignature {
        kind: ResourceKind,
        id: u8,
        found: [u8; 2],
    },
    /// a directory table is not made of whole 3-byte records, or its header is cut short
    #[error("[AgiError::CorruptResource] Directory {name} has an invalid length of {length} bytes")]
    TruncatedDirectory { name: String, length: usize },
    /// a bounded read ran past the end of its buffer
    #[error("[AgiError::CorruptResource] Read of {wanted} byte(s) at {offset:#06x} runs past the end of a {length} byte buffer")]
    OutOfBounds {
        offset: usize,
        wanted: usize,
        length: usize,
    },
    /// a decompressor produced fewer bytes than the header declared
    #[error("[AgiError::CorruptResource] Expected {expected} decompressed bytes, produced {produced}")]
    Truncated { expected: usize, produced: usize },
    /// any other structural damage: LZW cycles, broken message blocks, unknown opcodes
    #[error("[AgiError::CorruptResource] {0}")]
    CorruptResource(String),
}

impl ResourceError {
    /// True for every variant that describes damaged archive data rather than a setup or I/O problem
    pub fn is_corrupt(&self) -> bool {
        matches!(
            self,
            ResourceError::BadSignature { .. }
                | ResourceError::TruncatedDirectory { .. }
                | ResourceError::OutOfBounds { .. }
                | ResourceError::Truncated { .. }
                | ResourceError::CorruptResource(_)
        )
    }

    pub(crate) fn corrupt(message: impl Into<String>) -> Self {
        ResourceError::CorruptResource(message.into())
    }
}

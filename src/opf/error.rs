use std::io;

use thiserror::Error;

/// Errors raised while reading or writing an OPF container.
#[derive(Error, Debug)]
pub enum OpfError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Unexpected end of data at offset {offset} while reading {context}")]
    UnexpectedEof { offset: u64, context: String },

    #[error("Implausible file size: {size} bytes (expected 100 bytes to 500 MB)")]
    FileSize { size: u64 },

    #[error("Invalid file header: {found:?}")]
    BadMagic { found: String },

    #[error("Unsupported version: {found} (expected 29)")]
    UnsupportedVersion { found: u32 },

    #[error("Too many {what}: {count} (max {max})")]
    CountOutOfBounds {
        what: &'static str,
        count: u32,
        max: u32,
    },

    #[error("Corrupt record at offset {offset}: {reason}")]
    RecordCorrupt { offset: u64, reason: String },

    #[error("Invalid object name at offset {offset}: {name:?}")]
    InvalidObjectName { offset: u64, name: String },

    #[error("Cannot encode {what}: {reason}")]
    Unencodable { what: String, reason: String },
}

impl OpfError {
    /// Whether this failure is confined to one record, so a top-level list
    /// loop may drop the element and continue.
    pub fn is_record_level(&self) -> bool {
        matches!(
            self,
            OpfError::RecordCorrupt { .. } | OpfError::InvalidObjectName { .. }
        )
    }

    pub(crate) fn decode(err: binrw::Error, offset: u64, context: &str) -> Self {
        if err.is_eof() {
            return OpfError::UnexpectedEof {
                offset,
                context: context.to_string(),
            };
        }
        match err {
            binrw::Error::Io(io) => OpfError::Io(io),
            other => OpfError::RecordCorrupt {
                offset,
                reason: format!("{context}: {other}"),
            },
        }
    }

    pub(crate) fn encode(err: binrw::Error, what: &str) -> Self {
        match err {
            binrw::Error::Io(io) => OpfError::Io(io),
            other => OpfError::Unencodable {
                what: what.to_string(),
                reason: other.to_string(),
            },
        }
    }
}

/// Result type for OPF operations
pub type Result<T> = std::result::Result<T, OpfError>;

/// A non-fatal event noticed while parsing.
#[derive(Debug)]
pub enum ParseWarning {
    SkippedTexture { index: usize, error: OpfError },
    SkippedMaterial { index: usize, error: OpfError },
    SkippedObject { index: usize, error: OpfError },
    /// The byte after an object's optional light was not zero.
    ReservedByteNonZero { object: String, value: u8 },
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseWarning::SkippedTexture { index, error } => {
                write!(f, "skipped texture {}: {}", index, error)
            }
            ParseWarning::SkippedMaterial { index, error } => {
                write!(f, "skipped material {}: {}", index, error)
            }
            ParseWarning::SkippedObject { index, error } => {
                write!(f, "skipped object {}: {}", index, error)
            }
            ParseWarning::ReservedByteNonZero { object, value } => {
                write!(f, "object {:?} has reserved byte 0x{:02x}", object, value)
            }
        }
    }
}

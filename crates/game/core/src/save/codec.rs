//! Binary save file layout.
//!
//! ```text
//! SaveEnvelope { magic, format, saved_at, checksum, payload }
//! payload  = bincode(SaveRecord)
//! checksum = sha256(payload)
//! ```
//!
//! The envelope itself is bincode-encoded. Decoding verifies magic, format
//! and checksum, then migrates the record to [`SaveVersion::LATEST`].

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::record::{SaveRecord, SaveVersion};
use crate::error::{ErrorSeverity, GameError};

pub const SAVE_MAGIC: [u8; 4] = *b"ARSV";
pub const SAVE_FORMAT: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
struct SaveEnvelope {
    magic: [u8; 4],
    format: u32,
    saved_at: i64,
    checksum: [u8; 32],
    payload: Vec<u8>,
}

/// A decoded save file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedSave {
    pub record: SaveRecord,
    /// Unix timestamp (seconds) supplied by the writer.
    pub saved_at: i64,
    pub checksum: [u8; 32],
    /// Version stored on disk before migration.
    pub stored_version: SaveVersion,
}

#[derive(Debug, thiserror::Error)]
pub enum SaveCodecError {
    #[error("failed to encode save: {0}")]
    Encode(#[source] bincode::Error),

    #[error("failed to decode save: {0}")]
    Decode(#[source] bincode::Error),

    #[error("not a save file (magic {found:?})")]
    BadMagic { found: [u8; 4] },

    #[error("unsupported save format {0}")]
    UnsupportedFormat(u32),

    #[error("save payload checksum mismatch")]
    ChecksumMismatch,
}

impl GameError for SaveCodecError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Encode(_) => ErrorSeverity::Internal,
            Self::Decode(_) | Self::BadMagic { .. } | Self::ChecksumMismatch => {
                ErrorSeverity::Validation
            }
            Self::UnsupportedFormat(_) => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Encode(_) => "SAVE_ENCODE",
            Self::Decode(_) => "SAVE_DECODE",
            Self::BadMagic { .. } => "SAVE_BAD_MAGIC",
            Self::UnsupportedFormat(_) => "SAVE_UNSUPPORTED_FORMAT",
            Self::ChecksumMismatch => "SAVE_CHECKSUM_MISMATCH",
        }
    }
}

pub fn payload_checksum(payload: &[u8]) -> [u8; 32] {
    Sha256::digest(payload).into()
}

/// Encodes `record` at the latest version.
pub fn encode_save(record: &SaveRecord, saved_at: i64) -> Result<Vec<u8>, SaveCodecError> {
    let mut record = record.clone();
    record.version = SaveVersion::LATEST;

    let payload = bincode::serialize(&record).map_err(SaveCodecError::Encode)?;
    let envelope = SaveEnvelope {
        magic: SAVE_MAGIC,
        format: SAVE_FORMAT,
        saved_at,
        checksum: payload_checksum(&payload),
        payload,
    };
    bincode::serialize(&envelope).map_err(SaveCodecError::Encode)
}

pub fn decode_save(bytes: &[u8]) -> Result<DecodedSave, SaveCodecError> {
    let envelope: SaveEnvelope = bincode::deserialize(bytes).map_err(SaveCodecError::Decode)?;
    if envelope.magic != SAVE_MAGIC {
        return Err(SaveCodecError::BadMagic {
            found: envelope.magic,
        });
    }
    if envelope.format != SAVE_FORMAT {
        return Err(SaveCodecError::UnsupportedFormat(envelope.format));
    }
    if payload_checksum(&envelope.payload) != envelope.checksum {
        return Err(SaveCodecError::ChecksumMismatch);
    }

    let mut record: SaveRecord =
        bincode::deserialize(&envelope.payload).map_err(SaveCodecError::Decode)?;
    let stored_version = record.version;
    record.migrate();

    Ok(DecodedSave {
        record,
        saved_at: envelope.saved_at,
        checksum: envelope.checksum,
        stored_version,
    })
}

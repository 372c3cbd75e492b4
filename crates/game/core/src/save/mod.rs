//! Persistent save record and its binary encoding.

#[cfg(feature = "serde")]
mod codec;
mod record;

#[cfg(feature = "serde")]
pub use codec::{
    DecodedSave, SAVE_FORMAT, SAVE_MAGIC, SaveCodecError, decode_save, encode_save,
    payload_checksum,
};
pub use record::{SaveRecord, SaveVersion};

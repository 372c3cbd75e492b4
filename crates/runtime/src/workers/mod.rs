//! Background tasks that back the save service.
//!
//! Gameplay stays on the caller's thread; only encoded bytes cross into the
//! workers, which own the blocking repository calls.

mod persistence;

pub use persistence::{SaveWriter, WriteRequest, WriterStatus};

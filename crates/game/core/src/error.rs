//! Common error infrastructure for arpg-core.
//!
//! Domain-specific errors (e.g. [`ActivationError`](crate::ability::ActivationError),
//! [`SaveCodecError`](crate::save::SaveCodecError)) live next to the code that
//! raises them. This module provides the shared severity classification and
//! the [`GameError`] trait every one of them implements.
//!
//! Host-facing entry points (inventory edits, ability activation by slot/tag)
//! do not surface these errors directly: they log and return `false` so the
//! caller can decide what to do. The typed errors exist for the lower-level
//! APIs and for tests.

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: temporary conditions (ability on cooldown, cost not affordable)
/// - **Validation**: invalid input that should be rejected without retry
/// - **Internal**: unexpected state inconsistencies that require investigation
/// - **Fatal**: unrecoverable errors (save format this build cannot read)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Can succeed later without changing the request.
    Recoverable,

    /// Invalid request, do not retry without changes.
    Validation,

    /// Bookkeeping desync. These indicate bugs.
    Internal,

    /// State can no longer be trusted.
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Classification shared by every arpg-core error, so hosts can log or
/// branch on severity without matching each error type.
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

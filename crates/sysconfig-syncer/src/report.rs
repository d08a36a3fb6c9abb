//! Outcome reporting for persistence passes.
//!
//! Write failures never reach mutation callers. Each pass publishes a
//! [`PassReport`] on a watch channel instead, which is also how callers
//! that need durability wait for the writer to catch up.

use std::fmt;

use chrono::{DateTime, Utc};

/// Step of a persistence pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassStage {
    /// Writing `registries.conf`.
    Registries,

    /// Writing `policy.json`.
    Policy,

    /// Removing the previous trust directory.
    CertCleanup,

    /// Writing per-registry certificates.
    CertWrite,
}

impl PassStage {
    /// Returns a string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Registries => "registries",
            Self::Policy => "policy",
            Self::CertCleanup => "cert_cleanup",
            Self::CertWrite => "cert_write",
        }
    }
}

impl fmt::Display for PassStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a successful pass wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Registry entries written to `registries.conf`.
    pub registries: usize,

    /// Registries rejected in `policy.json`.
    pub rejected: usize,

    /// Certificates written to the trust directory.
    pub certificates: usize,
}

/// Result of a single pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// Every artifact was written.
    Completed(PassSummary),

    /// The pass stopped at `stage`; earlier stages were written, later ones
    /// were left as they were.
    Failed {
        /// Stage that failed.
        stage: PassStage,
        /// Error message.
        error: String,
    },
}

/// Report published after every pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    /// 1-based count of accepted persistence requests.
    pub sequence: u64,

    /// When the pass finished.
    pub completed_at: DateTime<Utc>,

    /// What happened.
    pub outcome: PassOutcome,
}

impl PassReport {
    /// Returns true if the pass wrote every artifact.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.outcome, PassOutcome::Completed(_))
    }
}

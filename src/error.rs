use std::time::Duration;
use thiserror::Error;

/// Fault taxonomy for a run.
///
/// `LocatorMiss`, `SubmissionFault` and `VerificationFault` are recoverable
/// at per-candidate granularity; `SessionFault` is fatal to the whole run.
#[derive(Debug, Error)]
pub enum AutomationError {
    #[error("element not found within {timeout:?}: {locator}")]
    LocatorMiss { locator: String, timeout: Duration },

    #[error("could not establish a signed-in session: {0}")]
    SessionFault(String),

    #[error("application could not be submitted: {0}")]
    SubmissionFault(String),

    #[error("verification scan failed: {0}")]
    VerificationFault(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("browser fault: {0}")]
    Browser(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

// headless_chrome surfaces anyhow::Error, which cannot act as a #[source].
impl From<anyhow::Error> for AutomationError {
    fn from(err: anyhow::Error) -> Self {
        Self::Browser(format!("{err:#}"))
    }
}

impl AutomationError {
    /// Recoverable faults degrade the current candidate to Failed;
    /// everything else is recorded as Error (or aborts the run for
    /// `SessionFault`).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::LocatorMiss { .. } | Self::SubmissionFault(_) | Self::VerificationFault(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AutomationError>;

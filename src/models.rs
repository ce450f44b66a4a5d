use chrono::Local;
use serde::Serialize;
use tracing::warn;

/// Outcome of one application attempt.
///
/// Transitions only move forward: Pending → Success → Verified,
/// Pending → Failed, or any non-Error state → Error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Success,
    Verified,
    Failed,
    Error,
}

impl ApplicationStatus {
    pub fn can_advance_to(self, next: ApplicationStatus) -> bool {
        use ApplicationStatus::*;
        matches!(
            (self, next),
            (Pending, Success) | (Pending, Failed) | (Success, Verified)
        ) || (next == Error && self != Error)
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending | Self::Success)
    }
}

/// One row of the run ledger.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationRecord {
    pub job_title: String,
    pub company: String,
    pub reference: String,
    status: ApplicationStatus,
    pub error_message: String,
    pub application_date: String,
}

impl ApplicationRecord {
    /// A fresh Pending record, stamped at attempt start.
    pub fn pending(job_title: impl Into<String>) -> Self {
        Self {
            job_title: job_title.into(),
            company: String::new(),
            reference: String::new(),
            status: ApplicationStatus::Pending,
            error_message: String::new(),
            application_date: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    pub fn status(&self) -> ApplicationStatus {
        self.status
    }

    fn advance(&mut self, next: ApplicationStatus) -> bool {
        if self.status.can_advance_to(next) {
            self.status = next;
            true
        } else {
            warn!(
                job_title = %self.job_title,
                from = ?self.status,
                to = ?next,
                "refusing backward status transition"
            );
            false
        }
    }

    /// Submission went through; company and reference are best-effort.
    pub fn mark_success(&mut self, company: Option<String>, reference: Option<String>) {
        if self.advance(ApplicationStatus::Success) {
            self.company = company.unwrap_or_default();
            self.reference = reference.unwrap_or_default();
        }
    }

    /// The single allowed escalation after Success.
    pub fn mark_verified(&mut self) {
        self.advance(ApplicationStatus::Verified);
    }

    pub fn mark_failed(&mut self, reason: impl Into<String>) {
        if self.advance(ApplicationStatus::Failed) {
            self.error_message = reason.into();
        }
    }

    pub fn mark_error(&mut self, reason: impl Into<String>) {
        if self.advance(ApplicationStatus::Error) {
            self.error_message = reason.into();
        }
    }

    pub fn is_submitted(&self) -> bool {
        matches!(
            self.status,
            ApplicationStatus::Success | ApplicationStatus::Verified
        )
    }
}

/// A job listing discovered on the search results page, eligible for an
/// application attempt.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub title: String,
    pub url: String,
    /// Ordinal position of this candidate's Apply anchor on the results
    /// page, used to re-locate it at attempt time.
    pub apply_index: usize,
}

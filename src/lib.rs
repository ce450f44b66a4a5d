pub mod browser;
pub mod config;
pub mod error;
pub mod ledger;
pub mod listing;
pub mod models;
pub mod runner;
pub mod session;
pub mod submitter;
pub mod user_agent;
pub mod utils;
pub mod verifier;
pub mod writer;

pub use config::{Credentials, JobType, SearchCriteria, Settings};
pub use error::{AutomationError, Result};
pub use ledger::RunLedger;
pub use listing::ListingScanner;
pub use models::{ApplicationRecord, ApplicationStatus, Candidate};
pub use runner::{ApplySubmitter, Automation, Submission, SubmissionVerifier};
pub use submitter::FormSubmitter;
pub use verifier::{confirm_submission, title_variants, PageSource};

//! The run loop: Session Gate → Listing Scanner → per-candidate
//! (submit → verify) → ledger flush. Strictly sequential, one browser
//! session, one candidate at a time; no candidate's failure halts the run.

use crate::browser;
use crate::config::{Credentials, SearchCriteria, Settings};
use crate::ledger::RunLedger;
use crate::listing::ListingScanner;
use crate::models::{ApplicationRecord, Candidate};
use crate::session::SessionGate;
use crate::submitter::FormSubmitter;
use crate::verifier::{self, TabPages};
use crate::writer;
use crate::Result;
use chrono::Local;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};

/// Best-effort detail captured from the confirmation page.
#[derive(Debug, Default, Clone)]
pub struct Submission {
    pub company: Option<String>,
    pub reference: Option<String>,
}

pub trait ApplySubmitter {
    fn submit(&mut self, candidate: &Candidate) -> Result<Submission>;
}

/// Advisory confirmation of an already-recorded Success; must not fail.
pub trait SubmissionVerifier {
    fn confirm(&mut self, record: &ApplicationRecord) -> bool;
}

/// Apply to each candidate up to `max_applications`, escalating statuses
/// through the ledger. The only place ledger records are created or
/// mutated.
pub fn process_candidates<S, V>(
    candidates: &[Candidate],
    submitter: &mut S,
    verifier: &mut V,
    criteria: &SearchCriteria,
    delay: Duration,
) -> RunLedger
where
    S: ApplySubmitter,
    V: SubmissionVerifier,
{
    let mut ledger = RunLedger::new();

    for candidate in candidates.iter().take(criteria.max_applications) {
        info!(
            attempt = ledger.len() + 1,
            job_title = %candidate.title,
            "applying"
        );
        let mut record = ApplicationRecord::pending(&candidate.title);

        match submitter.submit(candidate) {
            Ok(submission) => {
                record.mark_success(submission.company, submission.reference);
                if verifier.confirm(&record) {
                    record.mark_verified();
                    info!(job_title = %candidate.title, "application verified in history");
                } else {
                    info!(job_title = %candidate.title, "application not found in history");
                }
            }
            Err(err) if err.is_recoverable() => {
                error!(job_title = %candidate.title, %err, "application failed");
                record.mark_failed(err.to_string());
            }
            Err(err) => {
                error!(job_title = %candidate.title, %err, "unexpected fault during attempt");
                record.mark_error(err.to_string());
            }
        }

        ledger.push(record);

        if !delay.is_zero() {
            crate::utils::pause_between_applications(delay);
        }
    }

    ledger
}

/// Wires the real components over one browser session.
pub struct Automation {
    credentials: Credentials,
    criteria: SearchCriteria,
    settings: Settings,
}

impl Automation {
    pub fn new(credentials: Credentials, criteria: SearchCriteria, settings: Settings) -> Self {
        Self {
            credentials,
            criteria,
            settings,
        }
    }

    /// Run end to end and return the paths of the persisted ledger files.
    ///
    /// Only a `SessionFault` (or a browser that will not launch) is fatal;
    /// everything after the gate degrades to per-candidate outcomes.
    pub fn run(&self) -> Result<(PathBuf, PathBuf)> {
        let run_stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();

        let chrome = browser::launch(&self.settings)?;
        let tab = chrome.new_tab()?;

        let gate = SessionGate::new(&self.credentials, &self.settings);
        gate.ensure_signed_in(&tab)?;

        let scanner = ListingScanner::new(&self.criteria);
        scanner.run_search(&tab)?;
        let candidates = scanner.collect_candidates(&tab)?;

        let mut submitter = FormSubmitter::new(&tab, &self.credentials, &self.settings);
        let mut verifier = HistoryVerifier { tab: &tab };
        let ledger = process_candidates(
            &candidates,
            &mut submitter,
            &mut verifier,
            &self.criteria,
            self.settings.delay_between_applications,
        );

        info!(
            attempted = ledger.len(),
            submitted = ledger.submitted_count(),
            "run complete"
        );
        writer::save_results(&ledger, &self.settings.output_dir, &run_stamp)
    }
}

struct HistoryVerifier<'a> {
    tab: &'a std::sync::Arc<headless_chrome::Tab>,
}

impl SubmissionVerifier for HistoryVerifier<'_> {
    fn confirm(&mut self, record: &ApplicationRecord) -> bool {
        let mut pages = TabPages::new(self.tab);
        let reference = (!record.reference.is_empty()).then_some(record.reference.as_str());
        verifier::confirm_submission(&mut pages, &record.job_title, reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ApplicationStatus;
    use crate::AutomationError;

    fn candidates(n: usize) -> Vec<Candidate> {
        (0..n)
            .map(|i| Candidate {
                title: format!("Data Scientist {i}"),
                url: format!("https://www.jobserve.com/job?jobid={i}"),
                apply_index: i,
            })
            .collect()
    }

    fn criteria_with_max(max_applications: usize) -> SearchCriteria {
        SearchCriteria {
            max_applications,
            ..SearchCriteria::default()
        }
    }

    struct ScriptedSubmitter {
        outcomes: Vec<Result<Submission>>,
        calls: usize,
    }

    impl ApplySubmitter for ScriptedSubmitter {
        fn submit(&mut self, _candidate: &Candidate) -> Result<Submission> {
            let outcome = self.outcomes.remove(0);
            self.calls += 1;
            outcome
        }
    }

    struct FixedVerifier(bool);

    impl SubmissionVerifier for FixedVerifier {
        fn confirm(&mut self, _record: &ApplicationRecord) -> bool {
            self.0
        }
    }

    // the cap bounds the ledger, not the listing
    #[test]
    fn ledger_is_capped_at_max_applications() {
        let mut submitter = ScriptedSubmitter {
            outcomes: vec![Ok(Submission::default()), Ok(Submission::default())],
            calls: 0,
        };
        let ledger = process_candidates(
            &candidates(5),
            &mut submitter,
            &mut FixedVerifier(false),
            &criteria_with_max(2),
            Duration::ZERO,
        );
        assert_eq!(ledger.len(), 2);
        assert_eq!(submitter.calls, 2);
    }

    #[test]
    fn timeout_records_failed_and_run_continues() {
        let mut submitter = ScriptedSubmitter {
            outcomes: vec![
                Err(AutomationError::LocatorMiss {
                    locator: "apply anchor #0".into(),
                    timeout: Duration::from_secs(10),
                }),
                Ok(Submission::default()),
            ],
            calls: 0,
        };
        let ledger = process_candidates(
            &candidates(2),
            &mut submitter,
            &mut FixedVerifier(false),
            &criteria_with_max(10),
            Duration::ZERO,
        );

        assert_eq!(ledger.len(), 2);
        let first = &ledger.records()[0];
        assert_eq!(first.status(), ApplicationStatus::Failed);
        assert!(!first.error_message.is_empty());
        assert_eq!(ledger.records()[1].status(), ApplicationStatus::Success);
    }

    #[test]
    fn unexpected_faults_record_error_not_failed() {
        let mut submitter = ScriptedSubmitter {
            outcomes: vec![Err(AutomationError::Browser("tab crashed".into()))],
            calls: 0,
        };
        let ledger = process_candidates(
            &candidates(1),
            &mut submitter,
            &mut FixedVerifier(false),
            &criteria_with_max(5),
            Duration::ZERO,
        );
        assert_eq!(ledger.records()[0].status(), ApplicationStatus::Error);
    }

    #[test]
    fn verifier_escalates_success_to_verified() {
        let mut submitter = ScriptedSubmitter {
            outcomes: vec![
                Ok(Submission {
                    company: Some("Acme".into()),
                    reference: Some("JS/1".into()),
                }),
                Ok(Submission::default()),
            ],
            calls: 0,
        };

        struct AlternatingVerifier(bool);
        impl SubmissionVerifier for AlternatingVerifier {
            fn confirm(&mut self, _record: &ApplicationRecord) -> bool {
                let result = self.0;
                self.0 = !self.0;
                result
            }
        }

        let ledger = process_candidates(
            &candidates(2),
            &mut submitter,
            &mut AlternatingVerifier(true),
            &criteria_with_max(5),
            Duration::ZERO,
        );
        assert_eq!(ledger.records()[0].status(), ApplicationStatus::Verified);
        assert_eq!(ledger.records()[0].company, "Acme");
        assert_eq!(ledger.records()[1].status(), ApplicationStatus::Success);
        assert_eq!(ledger.submitted_count(), 2);
    }

    #[test]
    fn verifier_is_not_consulted_for_failures() {
        struct PanickyVerifier;
        impl SubmissionVerifier for PanickyVerifier {
            fn confirm(&mut self, _record: &ApplicationRecord) -> bool {
                panic!("verifier must not run for failed submissions");
            }
        }

        let mut submitter = ScriptedSubmitter {
            outcomes: vec![Err(AutomationError::SubmissionFault("no form".into()))],
            calls: 0,
        };
        let ledger = process_candidates(
            &candidates(1),
            &mut submitter,
            &mut PanickyVerifier,
            &criteria_with_max(5),
            Duration::ZERO,
        );
        assert_eq!(ledger.records()[0].status(), ApplicationStatus::Failed);
    }
}

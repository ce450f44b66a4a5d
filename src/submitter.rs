//! Application Submitter: open a candidate's application form, fill the
//! gaps the site left, and submit with the stored CV.

use crate::browser::{
    clear_overlays, find_all, find_links_containing, js_click, select_option_containing,
};
use crate::config::{Credentials, Settings};
use crate::models::Candidate;
use crate::runner::{ApplySubmitter, Submission};
use crate::{browser, AutomationError, Result};
use headless_chrome::Tab;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::Arc;
use tracing::{info, warn};

const FORM_INDICATORS: &[&str] = &[
    "input[type='email']",
    "select[name*='status']",
    "input[name*='name']",
    ".application-form",
    "form[action*='apply']",
];

const SUCCESS_INDICATORS: &[&str] = &[
    "application submitted",
    "thank you",
    "successfully applied",
    "application received",
    "confirmation",
];

pub struct FormSubmitter<'a> {
    tab: &'a Arc<Tab>,
    credentials: &'a Credentials,
    settings: &'a Settings,
}

impl<'a> FormSubmitter<'a> {
    pub fn new(tab: &'a Arc<Tab>, credentials: &'a Credentials, settings: &'a Settings) -> Self {
        Self {
            tab,
            credentials,
            settings,
        }
    }

    fn open_application_form(&self, candidate: &Candidate) -> Result<()> {
        clear_overlays(self.tab)?;

        // Apply anchors are re-located by ordinal each attempt; handles from
        // the scan are stale by now.
        let apply_links = find_links_containing(self.tab, "Apply");
        let Some(link) = apply_links.get(candidate.apply_index) else {
            return Err(AutomationError::LocatorMiss {
                locator: format!("apply anchor #{}", candidate.apply_index),
                timeout: self.settings.step_timeout,
            });
        };
        js_click(link)?;
        crate::utils::pause_briefly();

        if !self.form_is_present() {
            return Err(AutomationError::SubmissionFault(
                "application form did not open".into(),
            ));
        }
        Ok(())
    }

    fn form_is_present(&self) -> bool {
        FORM_INDICATORS
            .iter()
            .any(|css| !find_all(self.tab, css).is_empty())
    }

    fn fill_form(&self) -> Result<()> {
        // Most fields arrive pre-filled for a signed-in account; only fill
        // the blanks.
        if let Some(email) = find_all(self.tab, "input[type='email']").into_iter().next() {
            browser::fill_if_empty(&email, &self.credentials.email)?;
        }

        match select_option_containing(
            self.tab,
            "select[name*='status'], select[name*='work']",
            &["uk citizen", "citizen", "british"],
        ) {
            Ok(true) => info!("working status selected"),
            Ok(false) => {}
            Err(err) => warn!(%err, "working-status selection failed, leaving as-is"),
        }

        self.select_stored_cv()?;

        if let Some(first) = find_all(self.tab, "input[name*='first'], input[id*='first']")
            .into_iter()
            .next()
        {
            browser::fill_if_empty(&first, &self.credentials.first_name)?;
        }
        if let Some(last) = find_all(self.tab, "input[name*='last'], input[id*='last']")
            .into_iter()
            .next()
        {
            browser::fill_if_empty(&last, &self.credentials.last_name)?;
        }
        Ok(())
    }

    /// Pick the first stored CV from the dropdown when one exists. Absence
    /// is not an error: the account-default CV applies then.
    fn select_stored_cv(&self) -> Result<()> {
        match select_option_containing(
            self.tab,
            "select[name*='cv'], select[name*='resume']",
            &[".pdf", ".doc", "cv", "resume"],
        ) {
            Ok(true) => info!("stored CV selected"),
            Ok(false) => info!("no CV dropdown, assuming account-default CV"),
            Err(err) => warn!(%err, "CV selection failed, continuing"),
        }
        Ok(())
    }

    fn submit_form(&self) -> Result<()> {
        let submit = find_all(
            self.tab,
            "input[value*='Apply'], button[type='submit'], .apply-button",
        )
        .into_iter()
        .next()
        .ok_or_else(|| AutomationError::SubmissionFault("no submit button found".into()))?;

        js_click(&submit)?;
        crate::utils::pause_briefly();
        Ok(())
    }

    fn submission_succeeded(&self) -> Result<bool> {
        let source = self.tab.get_content()?.to_lowercase();
        Ok(SUCCESS_INDICATORS.iter().any(|s| source.contains(s)))
    }

    fn extract_details(&self) -> Submission {
        let html = self.tab.get_content().unwrap_or_default();
        let document = Html::parse_document(&html);
        Submission {
            company: extract_company(&document),
            reference: extract_reference(&document, &html),
        }
    }
}

impl ApplySubmitter for FormSubmitter<'_> {
    fn submit(&mut self, candidate: &Candidate) -> Result<Submission> {
        self.open_application_form(candidate)?;
        self.fill_form()?;
        self.submit_form()?;

        if !self.submission_succeeded()? {
            return Err(AutomationError::SubmissionFault(
                "application submission may have failed".into(),
            ));
        }
        info!(job_title = %candidate.title, "application submitted");
        Ok(self.extract_details())
    }
}

fn first_text(document: &Html, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    let text = document
        .select(&selector)
        .next()?
        .text()
        .collect::<String>()
        .trim()
        .to_string();
    if text.is_empty() { None } else { Some(text) }
}

pub fn extract_company(document: &Html) -> Option<String> {
    first_text(
        document,
        ".company-name, .recruiter-name, .employer-name, span[class*='company'], div[class*='company']",
    )
}

pub fn extract_reference(document: &Html, html: &str) -> Option<String> {
    if let Some(reference) = first_text(
        document,
        ".reference, .job-ref, .ref-number, span[class*='reference'], div[class*='ref']",
    ) {
        return Some(reference);
    }

    // Confirmation pages often inline the reference as "Ref: JS/12345".
    let re = Regex::new(r"(?i)\bref(?:erence)?[.:\s]+([A-Za-z0-9][A-Za-z0-9/_-]{3,})").ok()?;
    re.captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

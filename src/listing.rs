//! Listing Scanner: run the job search and extract application candidates
//! from the results page.

use crate::browser::{self, clear_overlays, find_all, js_click};
use crate::config::{SearchCriteria, SEARCH_URL};
use crate::models::Candidate;
use crate::Result;
use headless_chrome::Tab;
use scraper::{Html, Selector};
use std::sync::Arc;
use tracing::{info, warn};

const KEYWORDS_CSS: &str = "input[placeholder*='Marketing'], input[name*='keyword']";
const LOCATION_CSS: &str = "input[placeholder*='London'], input[name*='location']";
const JOB_TYPE_CSS: &str = "select[name*='jobtype'], select[name*='type']";
const SEARCH_BUTTON_CSS: &str = "button[type='submit'], input[value='Search']";

pub struct ListingScanner<'a> {
    criteria: &'a SearchCriteria,
}

impl<'a> ListingScanner<'a> {
    pub fn new(criteria: &'a SearchCriteria) -> Self {
        Self { criteria }
    }

    /// Navigate to the search page and best-effort apply the criteria.
    ///
    /// Every locator miss here is tolerated: the page frequently serves a
    /// pre-filtered results view where the form controls are absent.
    pub fn run_search(&self, tab: &Arc<Tab>) -> Result<()> {
        tab.navigate_to(SEARCH_URL)?;
        tab.wait_until_navigated()?;
        crate::utils::pause_briefly();
        clear_overlays(tab)?;

        if let Some(keywords) = find_all(tab, KEYWORDS_CSS).into_iter().next() {
            browser::fill_if_empty(&keywords, &self.criteria.keywords)?;
        }
        if let Some(location) = find_all(tab, LOCATION_CSS).into_iter().next() {
            browser::fill_if_empty(&location, &self.criteria.location)?;
        }
        let job_type = self.criteria.job_type.as_label().to_lowercase();
        match browser::select_option_containing(tab, JOB_TYPE_CSS, &[&job_type]) {
            Ok(true) => {}
            Ok(false) => warn!("job-type control not found or option missing, leaving default"),
            Err(err) => warn!(%err, "job-type selection failed, leaving default"),
        }

        if let Some(search) = find_all(tab, SEARCH_BUTTON_CSS).into_iter().next() {
            js_click(&search)?;
            tab.wait_until_navigated()?;
            crate::utils::pause_briefly();
        }

        info!(
            keywords = %self.criteria.keywords,
            location = %self.criteria.location,
            "job search issued"
        );
        Ok(())
    }

    /// Extract candidates from the current results page.
    pub fn collect_candidates(&self, tab: &Arc<Tab>) -> Result<Vec<Candidate>> {
        let html = tab.get_content()?;
        let candidates = self.parse_candidates(&html);
        info!(count = candidates.len(), "suitable job listings found");
        Ok(candidates)
    }

    /// Pair each Apply anchor with the nearest preceding job-title link and
    /// keep the titles that pass the keyword filters.
    pub fn parse_candidates(&self, html: &str) -> Vec<Candidate> {
        let document = Html::parse_document(html);
        let anchor_selector = Selector::parse("a").unwrap();

        let mut candidates = Vec::new();
        let mut last_title: Option<(String, String)> = None;
        let mut apply_index = 0usize;

        for anchor in document.select(&anchor_selector) {
            let text = anchor.text().collect::<String>().trim().to_string();
            let href = anchor.value().attr("href").unwrap_or_default();

            // Apply anchors carry jobid hrefs too, so this branch must run
            // first or it would clobber the tracked title.
            if text.contains("Apply") {
                let index = apply_index;
                apply_index += 1;

                let Some((title, href)) = last_title.take() else {
                    continue;
                };
                if !self.title_is_relevant(&title) {
                    continue;
                }
                candidates.push(Candidate {
                    title,
                    url: absolute_url(&href),
                    apply_index: index,
                });
                continue;
            }

            if href.to_lowercase().contains("jobid") && !text.is_empty() {
                last_title = Some((text, href.to_string()));
            }
        }

        candidates
    }

    fn title_is_relevant(&self, title: &str) -> bool {
        let lower = title.to_lowercase();
        if self
            .criteria
            .exclude_keywords
            .iter()
            .any(|kw| lower.contains(kw.as_str()))
        {
            return false;
        }
        self.criteria
            .priority_keywords
            .iter()
            .any(|kw| lower.contains(kw.as_str()))
    }
}

fn absolute_url(href: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else {
        format!("{}{}", crate::config::BASE_URL, href)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS_HTML: &str = r#"
        <html><body>
        <div class="job-row">
            <a href="/gb/en/job?jobid=111">Data Scientist/Google Gemini/PowerBI/AI/NLP</a>
            <a href="/apply?jobid=111">Apply</a>
        </div>
        <div class="job-row">
            <a href="/gb/en/job?jobid=222">Head of Marketing</a>
            <a href="/apply?jobid=222">Apply</a>
        </div>
        <div class="job-row">
            <a href="/gb/en/job?jobid=333">Senior Data Engineer (Python &amp; SQL)</a>
            <a href="/apply?jobid=333">Apply Now</a>
        </div>
        <div class="job-row">
            <a href="/gb/en/job?jobid=444">Graduate Data Analyst</a>
            <a href="/apply?jobid=444">Apply</a>
        </div>
        </body></html>
    "#;

    #[test]
    fn pairs_titles_with_apply_anchors_and_filters() {
        let criteria = SearchCriteria::default();
        let scanner = ListingScanner::new(&criteria);
        let candidates = scanner.parse_candidates(RESULTS_HTML);

        let titles: Vec<&str> = candidates.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Data Scientist/Google Gemini/PowerBI/AI/NLP",
                "Senior Data Engineer (Python & SQL)",
            ]
        );
        // indices count every Apply anchor on the page, filtered or not
        assert_eq!(candidates[0].apply_index, 0);
        assert_eq!(candidates[1].apply_index, 2);
        assert!(candidates[0].url.starts_with("https://www.jobserve.com/"));
    }

    #[test]
    fn exclude_keywords_beat_priority_keywords() {
        let criteria = SearchCriteria::default();
        let scanner = ListingScanner::new(&criteria);
        // "Graduate Data Analyst" matches "data" but also "graduate"
        assert!(!scanner.title_is_relevant("Graduate Data Analyst"));
        assert!(scanner.title_is_relevant("Data Analyst"));
        assert!(!scanner.title_is_relevant("Recruitment Consultant"));
    }

    #[test]
    fn apply_anchor_with_jobid_href_does_not_clobber_the_title() {
        let criteria = SearchCriteria::default();
        let scanner = ListingScanner::new(&criteria);
        let candidates = scanner.parse_candidates(
            r#"<a href="/gb/en/job?jobid=7">Data Scientist</a>
               <a href="/apply?jobid=7">Apply</a>"#,
        );
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].title, "Data Scientist");
        assert!(candidates[0].url.contains("jobid=7"));
    }

    #[test]
    fn nested_apply_labels_count_toward_ordinals() {
        let criteria = SearchCriteria::default();
        let scanner = ListingScanner::new(&criteria);
        // the Apply label may sit in a child element of the anchor
        let candidates = scanner.parse_candidates(
            r#"<a href="/gb/en/job?jobid=1">Data Scientist</a>
               <a href="/apply?jobid=1"><span>Apply</span></a>
               <a href="/gb/en/job?jobid=2">Data Engineer</a>
               <a href="/apply?jobid=2">Apply</a>"#,
        );
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].apply_index, 0);
        assert_eq!(candidates[1].apply_index, 1);
    }

    #[test]
    fn empty_page_yields_no_candidates() {
        let criteria = SearchCriteria::default();
        let scanner = ListingScanner::new(&criteria);
        assert!(scanner.parse_candidates("<html><body></body></html>").is_empty());
    }
}

//! Post-submission confirmation heuristic.
//!
//! JobServe gives no machine-readable acknowledgement, so a submission is
//! confirmed by scanning the account's application-history page for a
//! rendering of the job title, falling back to the "APPLIED" markers on the
//! freshly reloaded search results. The scan is advisory: false negatives
//! are expected (the history page is access-restricted on some account
//! tiers) and any fault degrades to "not verified", never to an error.

use crate::config::{APPLICATIONS_URL, SEARCH_URL};
use crate::Result;
use chrono::Local;
use headless_chrome::Tab;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Marker JobServe serves on the history page for restricted account tiers.
const RESTRICTED_MARKER: &str = "limited number of features";

/// Read access to the pages the verifier scans. The sole seam between the
/// heuristic and the browser, so the heuristic is testable without one.
pub trait PageSource {
    /// Navigate to `url` and return the page source.
    fn page_source(&mut self, url: &str) -> Result<String>;

    /// Best-effort return to the page that was current before verification.
    fn restore(&mut self);
}

/// Lowercase renderings of a job title used for substring matching.
///
/// Always non-empty and always contains the plain lowercase title. Titles
/// carrying a `" - "` or `" ("` suffix additionally contribute the prefix
/// before the first occurrence, since the history page often truncates
/// there.
pub fn title_variants(title: &str) -> Vec<String> {
    let lower = title.to_lowercase();
    let mut variants = vec![lower.clone(), lower.replace(' ', "")];

    if let Some((head, _)) = lower.split_once(" - ") {
        variants.push(head.to_string());
    }
    if let Some((head, _)) = lower.split_once(" (") {
        variants.push(head.to_string());
    }

    variants.dedup();
    variants
}

/// Date renderings JobServe uses in history rows and applied markers.
pub fn today_tokens() -> Vec<String> {
    let now = Local::now();
    vec![
        now.format("%d/%m/%Y").to_string(),
        now.format("%Y-%m-%d").to_string(),
    ]
}

/// True when the history page is readable and mentions the title (or shows
/// activity stamped today). A restricted page never matches.
pub fn history_confirms(page_source: &str, variants: &[String], today: &[String]) -> bool {
    let text = page_source.to_lowercase();
    if text.contains(RESTRICTED_MARKER) {
        return false;
    }
    if let Some(variant) = variants.iter().find(|v| text.contains(v.as_str())) {
        debug!(%variant, "title variant found in application history");
        return true;
    }
    today.iter().any(|token| text.contains(token.as_str()))
}

pub fn history_is_restricted(page_source: &str) -> bool {
    page_source.to_lowercase().contains(RESTRICTED_MARKER)
}

/// Fallback scan over the search results: an "applied" marker that carries
/// the job reference or today's date, with a title variant in the
/// surrounding lines.
pub fn listing_confirms(
    page_source: &str,
    variants: &[String],
    reference: Option<&str>,
    today: &[String],
) -> bool {
    let text = page_source.to_lowercase();
    let reference = reference
        .map(str::to_lowercase)
        .filter(|r| !r.is_empty());
    let lines: Vec<&str> = text.lines().collect();

    for (idx, line) in lines.iter().enumerate() {
        if !line.contains("applied") {
            continue;
        }
        let marker_matches = reference.as_deref().map_or(false, |r| line.contains(r))
            || today.iter().any(|token| line.contains(token.as_str()));
        if !marker_matches {
            continue;
        }

        let window = &lines[idx.saturating_sub(2)..lines.len().min(idx + 3)];
        if window
            .iter()
            .any(|nearby| variants.iter().any(|v| nearby.contains(v.as_str())))
        {
            return true;
        }
    }

    false
}

/// The ordered confirmation strategies; the first positive wins.
#[derive(Debug, Clone, Copy)]
enum Strategy {
    History,
    ListingFallback,
}

impl Strategy {
    fn run<P: PageSource>(
        self,
        pages: &mut P,
        variants: &[String],
        reference: Option<&str>,
        today: &[String],
    ) -> Result<bool> {
        match self {
            Self::History => {
                let source = pages.page_source(APPLICATIONS_URL)?;
                if history_is_restricted(&source) {
                    info!("application history is access-restricted, trying listing fallback");
                    return Ok(false);
                }
                Ok(history_confirms(&source, variants, today))
            }
            Self::ListingFallback => {
                let source = pages.page_source(SEARCH_URL)?;
                Ok(listing_confirms(&source, variants, reference, today))
            }
        }
    }
}

/// Attempt to confirm that applying to `title` took effect.
///
/// Advisory only: returns `false` on no match *and* on any internal fault,
/// never propagating an error to the caller.
pub fn confirm_submission<P: PageSource>(
    pages: &mut P,
    title: &str,
    reference: Option<&str>,
) -> bool {
    let variants = title_variants(title);
    let today = today_tokens();
    debug!(?variants, "verification variants");

    let mut confirmed = false;
    for strategy in [Strategy::History, Strategy::ListingFallback] {
        match strategy.run(pages, &variants, reference, &today) {
            Ok(true) => {
                info!(job_title = %title, ?strategy, "application confirmed");
                confirmed = true;
                break;
            }
            Ok(false) => continue,
            Err(err) => {
                warn!(job_title = %title, ?strategy, %err, "verification scan failed");
                continue;
            }
        }
    }

    pages.restore();
    confirmed
}

/// `PageSource` over a live browser tab.
pub struct TabPages<'a> {
    tab: &'a Arc<Tab>,
    origin: String,
}

impl<'a> TabPages<'a> {
    pub fn new(tab: &'a Arc<Tab>) -> Self {
        let origin = tab.get_url();
        Self { tab, origin }
    }
}

impl PageSource for TabPages<'_> {
    fn page_source(&mut self, url: &str) -> Result<String> {
        self.tab.navigate_to(url)?;
        self.tab.wait_until_navigated()?;
        crate::utils::pause_briefly();
        Ok(self.tab.get_content()?)
    }

    fn restore(&mut self) {
        if let Err(err) = self.tab.navigate_to(&self.origin) {
            warn!(url = %self.origin, %err, "could not return to the page under automation");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AutomationError;
    use std::collections::HashMap;

    struct FakePages {
        sources: HashMap<&'static str, String>,
        restored: bool,
    }

    impl FakePages {
        fn new() -> Self {
            Self {
                sources: HashMap::new(),
                restored: false,
            }
        }

        fn with_history(mut self, body: &str) -> Self {
            self.sources.insert(APPLICATIONS_URL, body.to_string());
            self
        }

        fn with_listing(mut self, body: &str) -> Self {
            self.sources.insert(SEARCH_URL, body.to_string());
            self
        }
    }

    impl PageSource for FakePages {
        fn page_source(&mut self, url: &str) -> Result<String> {
            self.sources
                .get(url)
                .cloned()
                .ok_or_else(|| AutomationError::VerificationFault(format!("unreachable: {url}")))
        }

        fn restore(&mut self) {
            self.restored = true;
        }
    }

    #[test]
    fn variants_always_include_the_lowercase_title() {
        for title in ["Data Scientist", "AI ENGINEER", "x", "Tech Lead - Platform"] {
            let variants = title_variants(title);
            assert!(!variants.is_empty());
            assert!(variants.contains(&title.to_lowercase()));
        }
    }

    #[test]
    fn variants_split_on_dash_separator() {
        let variants = title_variants("Tech Lead - Platform Team");
        assert!(variants.contains(&"tech lead".to_string()));
    }

    #[test]
    fn variants_split_on_paren_separator() {
        let variants = title_variants("Senior Data Engineer (Python & SQL)");
        assert!(variants.contains(&"senior data engineer".to_string()));
    }

    #[test]
    fn variants_include_whitespace_stripped_form() {
        let variants = title_variants("Data Scientist");
        assert!(variants.contains(&"datascientist".to_string()));
    }

    #[test]
    fn slash_heavy_title_matches_history_verbatim() {
        let title = "Data Scientist/Google Gemini/PowerBI/AI/NLP";
        let variants = title_variants(title);
        assert!(variants.contains(&"data scientist/google gemini/powerbi/ai/nlp".to_string()));

        let mut pages = FakePages::new().with_history(
            "<tr><td>Data Scientist/Google Gemini/PowerBI/AI/NLP</td><td>01/01/1999</td></tr>",
        );
        assert!(confirm_submission(&mut pages, title, None));
        assert!(pages.restored);
    }

    // the history page truncates long titles at the parenthesis
    #[test]
    fn truncated_history_entry_matches_prefix_variant() {
        let mut pages =
            FakePages::new().with_history("Your applications: Senior Data Engineer, 02/02/1999");
        assert!(confirm_submission(
            &mut pages,
            "Senior Data Engineer (Python & SQL)",
            None
        ));
    }

    #[test]
    fn no_match_anywhere_returns_false() {
        let mut pages = FakePages::new()
            .with_history("Your applications: none from 03/03/1999")
            .with_listing("Fresh listings, nothing applied to");
        assert!(!confirm_submission(&mut pages, "Data Scientist", None));
        assert!(pages.restored);
    }

    #[test]
    fn faulting_pages_degrade_to_unverified() {
        // Neither URL resolves; both strategies fault.
        let mut pages = FakePages::new();
        assert!(!confirm_submission(&mut pages, "Data Scientist", None));
        assert!(pages.restored);
    }

    #[test]
    fn restricted_history_falls_back_to_listing_markers() {
        let today = Local::now().format("%d/%m/%Y").to_string();
        let listing = format!(
            "Data Scientist - Hedge Fund\nAPPLIED: {today}\nSome other role\nNothing here"
        );
        let mut pages = FakePages::new()
            .with_history("Upgrade your account: a limited number of features are available")
            .with_listing(&listing);
        assert!(confirm_submission(
            &mut pages,
            "Data Scientist - Hedge Fund",
            None
        ));
    }

    #[test]
    fn listing_marker_without_nearby_title_does_not_confirm() {
        let today = Local::now().format("%d/%m/%Y").to_string();
        let variants = title_variants("Data Scientist");
        let listing = format!(
            "Unrelated Role\nAPPLIED: {today}\nAnother Unrelated Role\n\n\n\nData Scientist"
        );
        assert!(!listing_confirms(&listing, &variants, None, &today_tokens()));
    }

    #[test]
    fn listing_marker_matches_on_reference() {
        let variants = title_variants("AI Engineer - Machine Learning");
        let listing = "AI Engineer - Machine Learning\nAPPLIED ref JS/4711 on 01/01/1999";
        assert!(listing_confirms(
            listing,
            &variants,
            Some("JS/4711"),
            &today_tokens()
        ));
        assert!(!listing_confirms(
            listing,
            &variants,
            Some("JS/9999"),
            &today_tokens()
        ));
    }

    #[test]
    fn history_confirms_on_todays_date_alone() {
        let today = today_tokens();
        let page = format!("Applications submitted {}", today[0]);
        assert!(history_confirms(&page, &title_variants("Quant Developer"), &today));
    }

    #[test]
    fn restricted_page_never_confirms() {
        let page = "data scientist — but only a limited number of features are available";
        assert!(!history_confirms(
            page,
            &title_variants("Data Scientist"),
            &today_tokens()
        ));
        assert!(history_is_restricted(page));
    }
}

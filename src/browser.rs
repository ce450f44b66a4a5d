//! Thin layer over `headless_chrome`: launching a session with the flags
//! the site tolerates, bounded element waits, and JS-driven clicks that
//! are not intercepted by overlays.

use crate::config::Settings;
use crate::user_agent::random_user_agent;
use crate::{AutomationError, Result};
use headless_chrome::{Browser, Element, LaunchOptions, Tab};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub fn launch(settings: &Settings) -> Result<Browser> {
    let user_agent = random_user_agent();
    let browser = Browser::new(LaunchOptions {
        headless: settings.headless,
        sandbox: false,
        window_size: Some(settings.window_size),
        args: vec![
            &std::ffi::OsString::from(format!("--user-agent={}", user_agent)),
            &std::ffi::OsString::from("--disable-blink-features=AutomationControlled"),
            &std::ffi::OsString::from("--disable-gpu"),
            &std::ffi::OsString::from("--disable-extensions"),
            &std::ffi::OsString::from("--disable-dev-shm-usage"),
        ],
        ..Default::default()
    })?;
    info!(headless = settings.headless, "Chrome session launched");
    Ok(browser)
}

/// Wait for a CSS match within the configured step timeout; a miss is a
/// `LocatorMiss`, recoverable at per-candidate granularity.
pub fn wait_for<'a>(
    tab: &'a Arc<Tab>,
    selector: &str,
    timeout: Duration,
) -> Result<Element<'a>> {
    tab.wait_for_element_with_custom_timeout(selector, timeout)
        .map_err(|_| AutomationError::LocatorMiss {
            locator: selector.to_string(),
            timeout,
        })
}

/// All current CSS matches; an empty vec, not an error, when nothing is
/// there (the site's markup shifts constantly).
pub fn find_all<'a>(tab: &'a Arc<Tab>, selector: &str) -> Vec<Element<'a>> {
    tab.find_elements(selector).unwrap_or_default()
}

/// All anchors whose visible text contains `needle`. Matches on the
/// string-value of the whole anchor (`.`), not just its direct text node,
/// so labels nested in child elements count — the same scheme the scanner
/// uses when it assigns apply ordinals from scraped text.
pub fn find_links_containing<'a>(tab: &'a Arc<Tab>, needle: &str) -> Vec<Element<'a>> {
    let expr = format!("//a[contains(., '{needle}')]");
    tab.find_elements_by_xpath(&expr).unwrap_or_default()
}

/// Click through the DOM rather than the mouse, so a stray overlay cannot
/// intercept the event.
pub fn js_click(element: &Element<'_>) -> Result<()> {
    element.call_js_fn("function() { this.click(); }", vec![], false)?;
    Ok(())
}

/// Type into an input only when it is empty; the application form arrives
/// mostly pre-filled server-side.
pub fn fill_if_empty(element: &Element<'_>, value: &str) -> Result<()> {
    let current = element.get_attribute_value("value")?.unwrap_or_default();
    if current.trim().is_empty() && !value.is_empty() {
        element.click()?;
        element.type_into(value)?;
    }
    Ok(())
}

/// Remove cookie banners and modal backdrops before interacting with the
/// page. Precondition to every click on the listing and form surfaces.
pub fn clear_overlays(tab: &Arc<Tab>) -> Result<()> {
    let removed = tab.evaluate(
        r#"(() => {
            const selectors = [
                '#onetrust-consent-sdk',
                '.cookie-banner',
                '.modal-backdrop',
                '[class*="overlay"]',
                '[id*="cookie"]',
            ];
            let removed = 0;
            for (const sel of selectors) {
                for (const el of document.querySelectorAll(sel)) {
                    el.remove();
                    removed += 1;
                }
            }
            return removed;
        })()"#,
        false,
    )?;
    debug!(removed = ?removed.value, "overlay elements removed");
    Ok(())
}

/// Pick the first `<select>` option whose visible text contains any of the
/// given needles. Returns whether an option was selected.
pub fn select_option_containing(
    tab: &Arc<Tab>,
    select_css: &str,
    needles: &[&str],
) -> Result<bool> {
    let needles_json = serde_json::to_string(needles)?;
    let script = format!(
        r#"(() => {{
            const sel = document.querySelector({select_css:?});
            if (!sel) return false;
            const needles = {needles_json};
            for (const opt of sel.options) {{
                const text = opt.text.toLowerCase();
                if (needles.some(n => text.includes(n))) {{
                    sel.value = opt.value;
                    sel.dispatchEvent(new Event('change', {{ bubbles: true }}));
                    return true;
                }}
            }}
            return false;
        }})()"#
    );
    let outcome = tab.evaluate(&script, false)?;
    Ok(outcome.value.and_then(|v| v.as_bool()).unwrap_or(false))
}

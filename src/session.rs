//! Session Gate: establish (or confirm) a signed-in JobServe session
//! before anything else touches the site.

use crate::browser::{self, clear_overlays, find_all, find_links_containing, js_click};
use crate::config::{Credentials, Settings, BASE_URL};
use crate::{AutomationError, Result};
use headless_chrome::Tab;
use std::sync::Arc;
use tracing::{info, warn};

const EMAIL_CSS: &str = "input[type='email'], input[name*='email'], input[id*='email']";
const PASSWORD_CSS: &str = "input[type='password'], input[name*='password'], input[id*='password']";
const SUBMIT_CSS: &str = "input[type='submit'], button[type='submit']";

pub struct SessionGate<'a> {
    credentials: &'a Credentials,
    settings: &'a Settings,
}

impl<'a> SessionGate<'a> {
    pub fn new(credentials: &'a Credentials, settings: &'a Settings) -> Self {
        Self {
            credentials,
            settings,
        }
    }

    /// Probe for an existing session; log in when there is none.
    ///
    /// Fatal (`SessionFault`) only when no login surface exists at all.
    /// An inconclusive post-submit state is logged and tolerated, since
    /// the site hides the sign-out marker on some layouts.
    pub fn ensure_signed_in(&self, tab: &Arc<Tab>) -> Result<()> {
        tab.navigate_to(BASE_URL)?;
        tab.wait_until_navigated()?;
        crate::utils::pause_briefly();
        clear_overlays(tab)?;

        if self.signed_in(tab) {
            info!("already signed in to JobServe");
            return Ok(());
        }

        info!("not signed in, running login sequence");
        self.login(tab)?;

        if self.signed_in(tab) {
            info!("login successful");
        } else {
            warn!("login status unclear, continuing anyway");
        }
        Ok(())
    }

    fn signed_in(&self, tab: &Arc<Tab>) -> bool {
        !find_links_containing(tab, "Sign Out").is_empty()
    }

    fn login(&self, tab: &Arc<Tab>) -> Result<()> {
        let sign_in_links = find_links_containing(tab, "Sign In");
        let sign_in_links = if sign_in_links.is_empty() {
            find_links_containing(tab, "Login")
        } else {
            sign_in_links
        };
        let Some(link) = sign_in_links.first() else {
            return Err(AutomationError::SessionFault(
                "no sign-in affordance on the landing page".into(),
            ));
        };
        js_click(link)?;

        let email_field = browser::wait_for(tab, EMAIL_CSS, self.settings.step_timeout)
            .map_err(|_| {
                AutomationError::SessionFault("login form has no email field".into())
            })?;
        email_field.click()?;
        email_field.type_into(&self.credentials.email)?;

        let Some(password_field) = find_all(tab, PASSWORD_CSS).into_iter().next() else {
            return Err(AutomationError::SessionFault(
                "login form has no password field".into(),
            ));
        };
        password_field.click()?;
        password_field.type_into(&self.credentials.password)?;

        if let Some(submit) = find_all(tab, SUBMIT_CSS).into_iter().next() {
            js_click(&submit)?;
        } else {
            return Err(AutomationError::SessionFault(
                "login form has no submit control".into(),
            ));
        }

        tab.wait_until_navigated()?;
        crate::utils::pause_briefly();
        Ok(())
    }
}

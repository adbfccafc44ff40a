use headless_chrome::{Browser, Element, LaunchOptionsBuilder, Tab};
use log::{debug, trace, warn};
use std::{
    sync::{mpsc, Arc},
    time::Duration,
};

use super::{poll_until, Driver, DriverError, Locator};
use helpers::{decode_body, path_matches, CLEAR_AND_FOCUS_JS, IS_ENABLED_JS, IS_VISIBLE_JS};

mod helpers;

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const RESPONSE_HANDLER_NAME: &str = "expect_response";

/// A driver for a real Chrome window.
pub struct WebDriver {
    /// A browser handle. Needs to be kept around because if it's dropped the connection
    /// to the browser is closed.
    browser: Browser,
    /// The tab the game is played in.
    pub tab: Arc<Tab>,
}

impl WebDriver {
    /// Launch a visible browser window and grab a tab to play in.
    pub fn new() -> Result<Self, DriverError> {
        let browser = Browser::new(
            LaunchOptionsBuilder::default()
                .headless(false)
                .idle_browser_timeout(Duration::from_secs(10 * 60))
                .build()
                .map_err(|_| DriverError::LaunchOptionsBuilderError)?,
        )?;

        let existing_tab = browser
            .get_tabs()
            .lock()
            .ok()
            .and_then(|tabs| tabs.last().cloned());
        let tab = match existing_tab {
            Some(tab) => tab,
            None => browser.new_tab()?,
        };
        tab.activate()?;

        Ok(WebDriver { browser, tab })
    }

    /// All elements matching the locator's selector and text.
    fn locate(&self, locator: &Locator) -> Result<Vec<Element<'_>>, DriverError> {
        let elements = match self.tab.find_elements(locator.selector) {
            Ok(elements) => elements,
            Err(e) => {
                trace!("Nothing matches {:?}: {}", locator.selector, e);
                return Ok(Vec::new());
            }
        };

        let mut matched = Vec::new();
        for element in elements {
            if locator.text.is_none() || locator.matches_text(&element.get_inner_text()?) {
                matched.push(element);
            }
        }
        Ok(matched)
    }

    /// The first element matching the locator.
    fn first(&self, locator: &Locator) -> Result<Element<'_>, DriverError> {
        self.locate(locator)?
            .into_iter()
            .next()
            .ok_or_else(|| DriverError::ElementNotFound(locator.selector.to_owned()))
    }
}

impl Driver for WebDriver {
    fn goto(&self, url: &str, timeout: Duration) -> Result<(), DriverError> {
        debug!("Navigating to {}", url);
        self.tab.set_default_timeout(timeout);
        self.tab.navigate_to(url)?.wait_until_navigated()?;
        Ok(())
    }

    fn wait_for_visible(&self, locator: &Locator, timeout: Duration) -> Result<(), DriverError> {
        poll_until(
            &format!("{:?} to be visible", locator.selector),
            timeout,
            POLL_INTERVAL,
            || Ok(self.is_visible(locator)?.then_some(())),
        )
    }

    fn fill(&self, locator: &Locator, text: &str) -> Result<(), DriverError> {
        trace!("Filling {:?} with {:?}", locator.selector, text);
        self.first(locator)?
            .call_js_fn(CLEAR_AND_FOCUS_JS, vec![], false)?;
        self.tab.send_character(text)?;
        Ok(())
    }

    fn press(&self, locator: &Locator, key: &str) -> Result<(), DriverError> {
        trace!("Pressing {} in {:?}", key, locator.selector);
        self.first(locator)?.focus()?;
        self.tab.press_key(key)?;
        Ok(())
    }

    fn expect_response<F>(
        &self,
        path: &str,
        timeout: Duration,
        trigger: F,
    ) -> Result<String, DriverError>
    where
        F: FnOnce(&Self) -> Result<(), DriverError>,
    {
        let (sender, receiver) = mpsc::sync_channel(1);
        let expected_path = path.to_owned();
        self.tab.register_response_handling(
            RESPONSE_HANDLER_NAME,
            Box::new(move |params, fetch_body| {
                let url = &params.response.url;
                if !path_matches(url, &expected_path) {
                    return;
                }
                debug!("Got response from {}", url);
                match fetch_body() {
                    Ok(body) => {
                        // Only the first matching response is wanted
                        let _ = sender.try_send(decode_body(body.body, body.base_64_encoded));
                    }
                    Err(e) => warn!("Failed to fetch response body from {}: {:?}", url, e),
                }
            }),
        )?;

        let body = trigger(self).and_then(|()| {
            receiver
                .recv_timeout(timeout)
                .map_err(|_| DriverError::Timeout {
                    what: format!("a response from {}", path),
                    timeout,
                })
        });
        self.tab.deregister_response_handling(RESPONSE_HANDLER_NAME)?;
        body
    }

    fn is_visible(&self, locator: &Locator) -> Result<bool, DriverError> {
        for element in self.locate(locator)? {
            let result = element.call_js_fn(IS_VISIBLE_JS, vec![], false)?;
            if result.value == Some(serde_json::Value::Bool(true)) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn inner_text(&self, locator: &Locator) -> Result<String, DriverError> {
        Ok(self.first(locator)?.get_inner_text()?)
    }

    fn wait_until_enabled(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<(), DriverError> {
        poll_until(
            &format!("{:?} to be enabled", locator.selector),
            timeout,
            POLL_INTERVAL,
            || {
                let Some(element) = self.locate(locator)?.into_iter().next() else {
                    return Ok(None);
                };
                let result = element.call_js_fn(IS_ENABLED_JS, vec![], false)?;
                Ok((result.value == Some(serde_json::Value::Bool(true))).then_some(()))
            },
        )
    }

    fn wait_until_hidden(&self, locator: &Locator, timeout: Duration) -> Result<(), DriverError> {
        poll_until(
            &format!("{:?} to be hidden", locator.selector),
            timeout,
            POLL_INTERVAL,
            || Ok((!self.is_visible(locator)?).then_some(())),
        )
    }

    fn click(&self, locator: &Locator, force: bool) -> Result<(), DriverError> {
        trace!("Clicking {:?} (force: {})", locator.selector, force);
        if !force && !self.is_visible(locator)? {
            return Err(DriverError::ElementNotFound(locator.selector.to_owned()));
        }
        self.first(locator)?.click()?;
        Ok(())
    }

    fn close(self) -> Result<(), DriverError> {
        debug!("Closing browser");
        self.tab.close(false)?;
        drop(self.browser);
        Ok(())
    }
}

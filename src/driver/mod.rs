use lazy_regex::{Lazy, Regex};
use log::trace;
use std::time::{Duration, Instant};
use thiserror::Error;

#[cfg(test)]
pub mod scripted;
pub mod web;

/// Identifies elements on the page: a CSS selector, optionally narrowed down to the
/// matches whose rendered text matches a pattern.
#[derive(Debug, Clone, Copy)]
pub struct Locator {
    pub selector: &'static str,
    pub text: Option<&'static Lazy<Regex>>,
}

impl Locator {
    /// Locate elements by selector alone.
    pub const fn css(selector: &'static str) -> Self {
        Locator {
            selector,
            text: None,
        }
    }

    /// Locate elements by selector, keeping only those whose text matches `text`.
    pub const fn with_text(selector: &'static str, text: &'static Lazy<Regex>) -> Self {
        Locator {
            selector,
            text: Some(text),
        }
    }

    /// Whether an element with the given rendered text is matched by this locator.
    pub fn matches_text(&self, text: &str) -> bool {
        self.text.map_or(true, |re| re.is_match(text))
    }
}

/// Defines the page automation a bot needs to play the game.
///
/// All waits block the calling thread until their condition holds or the timeout
/// elapses, in which case they fail with `DriverError::Timeout`.
pub trait Driver {
    /// Navigate to the given URL and wait for the page to load.
    fn goto(&self, url: &str, timeout: Duration) -> Result<(), DriverError>;

    /// Wait for an element matching the locator to be visible.
    fn wait_for_visible(&self, locator: &Locator, timeout: Duration) -> Result<(), DriverError>;

    /// Replace the contents of a text field.
    fn fill(&self, locator: &Locator, text: &str) -> Result<(), DriverError>;

    /// Focus an element and press the named key (e.g., "Enter").
    fn press(&self, locator: &Locator, key: &str) -> Result<(), DriverError>;

    /// Run `trigger`, and wait for the network response to a request whose URL path
    /// ends with `path`. Returns the response body.
    fn expect_response<F>(
        &self,
        path: &str,
        timeout: Duration,
        trigger: F,
    ) -> Result<String, DriverError>
    where
        F: FnOnce(&Self) -> Result<(), DriverError>,
        Self: Sized;

    /// Whether any element matching the locator is currently visible.
    fn is_visible(&self, locator: &Locator) -> Result<bool, DriverError>;

    /// The rendered text of the first element matching the locator.
    fn inner_text(&self, locator: &Locator) -> Result<String, DriverError>;

    /// Wait for the first element matching the locator to be enabled.
    fn wait_until_enabled(&self, locator: &Locator, timeout: Duration)
        -> Result<(), DriverError>;

    /// Wait for no element matching the locator to be visible.
    fn wait_until_hidden(&self, locator: &Locator, timeout: Duration) -> Result<(), DriverError>;

    /// Click the first element matching the locator. With `force`, the click is
    /// dispatched even if the element isn't visible.
    fn click(&self, locator: &Locator, force: bool) -> Result<(), DriverError>;

    /// End the browser session.
    fn close(self) -> Result<(), DriverError>
    where
        Self: Sized;
}

/// Failure modes for drivers.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("timed out after {timeout:?} waiting for {what}")]
    Timeout { what: String, timeout: Duration },
    #[error("no element matches {0:?}")]
    ElementNotFound(String),
    #[error("launch options builder failed")]
    LaunchOptionsBuilderError,
    #[error("headless chrome error")]
    HeadlessChrome(#[from] anyhow::Error),
}

impl DriverError {
    /// Whether this error is a bounded wait running out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, DriverError::Timeout { .. })
    }
}

/// Repeatedly run `check` until it produces a value, sleeping `interval` between attempts.
/// Fails with `DriverError::Timeout` once `timeout` has elapsed without a value.
pub fn poll_until<T, F>(
    what: &str,
    timeout: Duration,
    interval: Duration,
    mut check: F,
) -> Result<T, DriverError>
where
    F: FnMut() -> Result<Option<T>, DriverError>,
{
    trace!("Waiting up to {:?} for {}", timeout, what);
    let start = Instant::now();
    loop {
        if let Some(value) = check()? {
            return Ok(value);
        }
        if start.elapsed() >= timeout {
            return Err(DriverError::Timeout {
                what: what.to_owned(),
                timeout,
            });
        }
        std::thread::sleep(interval);
    }
}

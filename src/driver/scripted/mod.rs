use log::trace;
use std::{
    cell::RefCell,
    collections::VecDeque,
    rc::Rc,
    time::Duration,
};

use super::{Driver, DriverError, Locator};
use crate::game::Element;

/// Something the bot did to the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Goto(String),
    Fill { element: Element, text: String },
    Press { element: Element, key: String },
    AwaitResponse(String),
    Click { element: Element, force: bool },
    Close,
}

/// How the page reacts to the password submitted on a level.
#[derive(Debug, Clone)]
pub enum Reaction {
    /// Show the success dialog with the given text.
    Accept(String),
    /// Show a notification with the given text.
    Reject(String),
    /// Show nothing.
    Ignore,
    /// Make the next look at the page panic with the given message.
    Crash(String),
}

/// One level's worth of scripted page behaviour.
#[derive(Debug, Clone)]
pub struct ScriptedLevel {
    /// Merlin's answer to the question, or `None` for no answer at all.
    pub response: Option<String>,
    pub reaction: Reaction,
}

impl ScriptedLevel {
    pub fn accept(response: &str, dialog: &str) -> Self {
        ScriptedLevel {
            response: Some(response.to_owned()),
            reaction: Reaction::Accept(dialog.to_owned()),
        }
    }

    pub fn reject(response: &str, notification: &str) -> Self {
        ScriptedLevel {
            response: Some(response.to_owned()),
            reaction: Reaction::Reject(notification.to_owned()),
        }
    }
}

#[derive(Debug, Default)]
struct Page {
    levels: VecDeque<ScriptedLevel>,
    dialog: Option<String>,
    notification: Option<String>,
    crash: Option<String>,
    inputs_visible: bool,
}

/// A driver for an in-process imitation of the game page, following a script.
/// Every interaction is recorded, and waits resolve (or time out) immediately.
pub struct ScriptedDriver {
    page: RefCell<Page>,
    actions: Rc<RefCell<Vec<Action>>>,
}

impl ScriptedDriver {
    pub fn new(levels: Vec<ScriptedLevel>) -> Self {
        ScriptedDriver {
            page: RefCell::new(Page {
                levels: levels.into(),
                inputs_visible: true,
                ..Default::default()
            }),
            actions: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Make the question and password inputs never appear.
    pub fn hide_inputs(self) -> Self {
        self.page.borrow_mut().inputs_visible = false;
        self
    }

    /// A handle to the log of actions, which outlives the driver.
    pub fn actions(&self) -> Rc<RefCell<Vec<Action>>> {
        Rc::clone(&self.actions)
    }

    fn record(&self, action: Action) {
        trace!("{:?}", action);
        self.actions.borrow_mut().push(action);
    }

    fn element(locator: &Locator) -> Result<Element, DriverError> {
        use strum::IntoEnumIterator;

        Element::iter()
            .find(|element| element.selector() == locator.selector)
            .ok_or_else(|| DriverError::ElementNotFound(locator.selector.to_owned()))
    }

    /// Text of the element, if it's currently on the page.
    fn text(&self, element: Element) -> Option<String> {
        let page = self.page.borrow();
        match element {
            Element::QuestionInput | Element::PasswordInput => {
                page.inputs_visible.then(String::new)
            }
            Element::SuccessDialog => page.dialog.clone(),
            Element::ContinueButton => page.dialog.as_ref().map(|_| "Continue".to_owned()),
            Element::FailureNotification => page.notification.clone(),
        }
    }

    fn timeout(what: &str, locator: &Locator, timeout: Duration) -> DriverError {
        DriverError::Timeout {
            what: format!("{:?} to be {}", locator.selector, what),
            timeout,
        }
    }

    fn submit(&self) {
        let mut page = self.page.borrow_mut();
        page.notification = None;
        match page.levels.pop_front().map(|level| level.reaction) {
            Some(Reaction::Accept(dialog)) => page.dialog = Some(dialog),
            Some(Reaction::Reject(notification)) => page.notification = Some(notification),
            Some(Reaction::Crash(message)) => page.crash = Some(message),
            Some(Reaction::Ignore) | None => {}
        }
    }
}

impl Driver for ScriptedDriver {
    fn goto(&self, url: &str, _timeout: Duration) -> Result<(), DriverError> {
        self.record(Action::Goto(url.to_owned()));
        Ok(())
    }

    fn wait_for_visible(&self, locator: &Locator, timeout: Duration) -> Result<(), DriverError> {
        if self.is_visible(locator)? {
            Ok(())
        } else {
            Err(Self::timeout("visible", locator, timeout))
        }
    }

    fn fill(&self, locator: &Locator, text: &str) -> Result<(), DriverError> {
        let element = Self::element(locator)?;
        self.record(Action::Fill {
            element,
            text: text.to_owned(),
        });
        Ok(())
    }

    fn press(&self, locator: &Locator, key: &str) -> Result<(), DriverError> {
        let element = Self::element(locator)?;
        self.record(Action::Press {
            element,
            key: key.to_owned(),
        });
        if element == Element::PasswordInput && key == "Enter" {
            self.submit();
        }
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
        trigger(self)?;
        self.record(Action::AwaitResponse(path.to_owned()));
        self.page
            .borrow()
            .levels
            .front()
            .and_then(|level| level.response.clone())
            .ok_or_else(|| DriverError::Timeout {
                what: format!("a response from {}", path),
                timeout,
            })
    }

    fn is_visible(&self, locator: &Locator) -> Result<bool, DriverError> {
        let crash = self.page.borrow().crash.clone();
        if let Some(message) = crash {
            panic!("{}", message);
        }
        let element = Self::element(locator)?;
        Ok(self
            .text(element)
            .map_or(false, |text| locator.matches_text(&text)))
    }

    fn inner_text(&self, locator: &Locator) -> Result<String, DriverError> {
        let element = Self::element(locator)?;
        self.text(element)
            .filter(|text| locator.matches_text(text))
            .ok_or_else(|| DriverError::ElementNotFound(locator.selector.to_owned()))
    }

    fn wait_until_enabled(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<(), DriverError> {
        if self.is_visible(locator)? {
            Ok(())
        } else {
            Err(Self::timeout("enabled", locator, timeout))
        }
    }

    fn wait_until_hidden(&self, locator: &Locator, timeout: Duration) -> Result<(), DriverError> {
        if self.is_visible(locator)? {
            Err(Self::timeout("hidden", locator, timeout))
        } else {
            Ok(())
        }
    }

    fn click(&self, locator: &Locator, force: bool) -> Result<(), DriverError> {
        let element = Self::element(locator)?;
        self.record(Action::Click { element, force });
        if element == Element::ContinueButton {
            self.page.borrow_mut().dialog = None;
        }
        Ok(())
    }

    fn close(self) -> Result<(), DriverError> {
        self.record(Action::Close);
        Ok(())
    }
}

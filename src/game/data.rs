use lazy_regex::{lazy_regex, Lazy, Regex};
use lazy_static::lazy_static;
use std::collections::HashMap;
use strum::EnumIter;

use crate::driver::Locator;

/// Elements of the game page the bot interacts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Element {
    /// Text area for talking to Merlin.
    QuestionInput,
    /// Field the guessed password is entered into.
    PasswordInput,
    /// Body of the dialog shown after a correct password.
    SuccessDialog,
    /// "Continue" button inside the success dialog.
    ContinueButton,
    /// Notification area where rejections are shown.
    FailureNotification,
}

lazy_static! {
    pub static ref SELECTORS: HashMap<Element, &'static str> = {
        let mut m = HashMap::new();
        m.insert(
            Element::QuestionInput,
            r#"textarea[placeholder="You can talk to merlin here..."]"#,
        );
        m.insert(Element::PasswordInput, r#"input[placeholder="SECRET PASSWORD"]"#);
        m.insert(Element::SuccessDialog, "div.mantine-Modal-body");
        m.insert(Element::ContinueButton, "div.mantine-Modal-body button");
        m.insert(Element::FailureNotification, ".mantine-Notifications-root");
        m
    };
}

/// Text of the button that dismisses the success dialog.
pub static CONTINUE_TEXT: Lazy<Regex> = lazy_regex!("(?i)continue");

/// Rejection messages shown after a wrong password.
pub static FAILURE_TEXT: Lazy<Regex> = lazy_regex!("(?i)bad secret|not the secret phrase");

impl Element {
    pub fn selector(self) -> &'static str {
        SELECTORS[&self]
    }

    pub fn locator(self) -> Locator {
        match self {
            Element::ContinueButton => Locator::with_text(self.selector(), &CONTINUE_TEXT),
            Element::FailureNotification => Locator::with_text(self.selector(), &FAILURE_TEXT),
            _ => Locator::css(self.selector()),
        }
    }
}

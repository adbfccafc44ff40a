use log::{debug, error, info};
use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    time::Duration,
};
use thiserror::Error;

use crate::{
    driver::{poll_until, Driver, DriverError},
    game::{
        is_completion_message, Element, GameState, Timeouts, GAME_URL, QUESTION,
        QUESTION_API_PATH,
    },
    password::extract_password,
};


/// How a run of the game ended, short of an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The final level was beaten.
    Completed { level: usize, message: String },
    /// A submitted password was wrong.
    Rejected { level: usize, message: String },
    /// Every level was passed without the game declaring itself won.
    LevelsExhausted,
}

/// Failure modes for a run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("a timeout occurred: {0}")]
    Timeout(#[source] DriverError),
    #[error("could not extract a valid password on level {level} from {response:?}")]
    ExtractionFailure { level: usize, response: String },
    #[error("an unexpected error occurred: {0}")]
    Unexpected(#[source] DriverError),
}

impl From<DriverError> for RunError {
    fn from(e: DriverError) -> Self {
        if e.is_timeout() {
            RunError::Timeout(e)
        } else {
            RunError::Unexpected(e)
        }
    }
}

/// What the page showed after a password was submitted.
enum Verdict {
    Accepted,
    Rejected,
}

/// Plays the game level by level through a driver.
pub struct Runner<D: Driver> {
    driver: D,
    /// State of the game, synced to the actual game's state.
    pub state: GameState,
    timeouts: Timeouts,
}

impl<D: Driver> Runner<D> {
    pub fn with_timeouts(driver: D, timeouts: Timeouts) -> Self {
        Runner {
            driver,
            state: GameState::default(),
            timeouts,
        }
    }

    /// Give back the driver, e.g. to close it.
    pub fn into_driver(self) -> D {
        self.driver
    }

    /// Open the game and play until it's won, a password is rejected, or something fails.
    pub fn play(&mut self) -> Result<Outcome, RunError> {
        self.driver.goto(GAME_URL, self.timeouts.navigation)?;
        info!("Page loaded successfully");

        loop {
            info!("Attempting level {}", self.state.level);
            if let Some(outcome) = self.play_level()? {
                return Ok(outcome);
            }
            if !self.state.advance() {
                info!("No levels left to play");
                return Ok(Outcome::LevelsExhausted);
            }
        }
    }

    /// Play the current level. Returns `None` if it was passed and play should continue.
    fn play_level(&mut self) -> Result<Option<Outcome>, RunError> {
        let level = self.state.level;

        let response = self.ask_question()?;
        info!("Merlin says: {:?}", response);

        let password = extract_password(&response)
            .ok_or_else(|| RunError::ExtractionFailure { level, response })?;
        info!("Extracted password: {:?}", password);

        self.submit_password(&password)?;

        match self.await_verdict()? {
            Verdict::Accepted => {
                let message = self.driver.inner_text(&Element::SuccessDialog.locator())?;
                info!(
                    "Success! Dialog says: {:?}",
                    message.lines().next().unwrap_or_default()
                );
                info!("Level {} completed", level);

                if is_completion_message(&message) {
                    info!("Game completed! Final message: {}", message);
                    return Ok(Some(Outcome::Completed { level, message }));
                }

                self.dismiss_success()?;
                Ok(None)
            }
            Verdict::Rejected => {
                let message = self
                    .driver
                    .inner_text(&Element::FailureNotification.locator())?
                    .trim()
                    .to_owned();
                info!("Incorrect password: {}", message);
                Ok(Some(Outcome::Rejected { level, message }))
            }
        }
    }

    /// Put the question to Merlin and return the answer.
    fn ask_question(&self) -> Result<String, RunError> {
        debug!("Asking the question");
        let input = Element::QuestionInput.locator();
        self.driver.wait_for_visible(&input, self.timeouts.input)?;
        let response = self.driver.expect_response(
            QUESTION_API_PATH,
            self.timeouts.response,
            |driver| {
                driver.fill(&input, QUESTION)?;
                driver.press(&input, "Enter")
            },
        )?;
        Ok(response)
    }

    fn submit_password(&self, password: &str) -> Result<(), RunError> {
        debug!("Submitting the password");
        let input = Element::PasswordInput.locator();
        self.driver.wait_for_visible(&input, self.timeouts.input)?;
        self.driver.fill(&input, password)?;
        self.driver.press(&input, "Enter")?;
        Ok(())
    }

    /// Wait for whichever of the success dialog or the failure notification shows up first.
    fn await_verdict(&self) -> Result<Verdict, RunError> {
        debug!("Waiting for the submission result");
        let success = Element::ContinueButton.locator();
        let failure = Element::FailureNotification.locator();
        let verdict = poll_until(
            "the password to be accepted or rejected",
            self.timeouts.outcome,
            self.timeouts.outcome_poll_interval,
            || {
                if self.driver.is_visible(&success)? {
                    Ok(Some(Verdict::Accepted))
                } else if self.driver.is_visible(&failure)? {
                    Ok(Some(Verdict::Rejected))
                } else {
                    Ok(None)
                }
            },
        )?;
        Ok(verdict)
    }

    /// Close the success dialog so the next level can start.
    fn dismiss_success(&self) -> Result<(), RunError> {
        debug!("Clicking continue");
        let button = Element::ContinueButton.locator();
        self.driver.wait_until_enabled(&button, self.timeouts.dismiss)?;
        self.driver.click(&button, true)?;
        self.driver.wait_until_hidden(&button, self.timeouts.dismiss)?;
        debug!("Dialog closed");
        std::thread::sleep(self.timeouts.level_pause);
        Ok(())
    }
}

/// Play the game through `driver`, then always close it after `observation_delay`,
/// whether the run ended normally, failed or panicked.
/// Returns the outcome, or `None` if the run failed or panicked.
pub fn run_and_close<D: Driver>(
    driver: D,
    timeouts: Timeouts,
    observation_delay: Duration,
) -> Option<Outcome> {
    let mut runner = Runner::with_timeouts(driver, timeouts);

    let outcome = match panic::catch_unwind(AssertUnwindSafe(|| runner.play())) {
        Ok(Ok(outcome)) => {
            match &outcome {
                Outcome::Completed { level, message } => info!(
                    "Beat Merlin after {} levels: {:?}",
                    level,
                    message.lines().next().unwrap_or_default()
                ),
                Outcome::Rejected { level, message } => info!(
                    "Password for level {} was rejected ({}), halting",
                    level, message
                ),
                Outcome::LevelsExhausted => {
                    info!("Played every level without seeing the final message")
                }
            }
            Some(outcome)
        }
        Ok(Err(e)) => {
            error!("{}", e);
            None
        }
        Err(payload) => {
            error!("An unexpected error occurred: {}", panic_message(&*payload));
            None
        }
    };

    info!(
        "Run finished, closing browser in {} seconds...",
        observation_delay.as_secs()
    );
    std::thread::sleep(observation_delay);
    if let Err(e) = runner.into_driver().close() {
        error!("Failed to close the browser: {}", e);
    }

    outcome
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "panic"
    }
}

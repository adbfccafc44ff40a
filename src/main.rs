use driver::web::WebDriver;
use game::Timeouts;
use log::info;
use std::time::Duration;

mod driver;
mod game;
mod password;
mod runner;

/// How long the browser stays open after a run, so the final state can be inspected.
const OBSERVATION_DELAY: Duration = Duration::from_secs(15);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::try_init().unwrap_or(());

    info!("Starting the HackMerlin solver");
    let driver = WebDriver::new()?;
    runner::run_and_close(driver, Timeouts::default(), OBSERVATION_DELAY);

    Ok(())
}

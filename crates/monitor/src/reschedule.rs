//! Navigation step: from the post-login landing page to the reschedule form.

use tracing::{info, warn};

use slotwatch_browser::BrowserDriver;
use slotwatch_core::{Result, Settings};

use crate::selectors;

/// Traverse continue → accordion → reschedule entry. `true` when the
/// scheduling form has been reached; any missing element is a non-fatal
/// navigation failure.
pub async fn open_reschedule_form(driver: &dyn BrowserDriver, settings: &Settings) -> bool {
    match try_navigate(driver, settings).await {
        Ok(()) => true,
        Err(e) => {
            warn!("Navigation to reschedule failed: {}", e);
            false
        }
    }
}

async fn try_navigate(driver: &dyn BrowserDriver, settings: &Settings) -> Result<()> {
    info!("Looking for Continue button...");
    driver
        .wait_for(&selectors::CONTINUE_LINK, settings.element_timeout)
        .await?;
    driver.click(&selectors::CONTINUE_LINK).await?;

    info!("Expanding 'Reschedule Appointment' accordion...");
    driver
        .wait_for(&selectors::RESCHEDULE_ACCORDION_TOGGLE, settings.element_timeout)
        .await?;
    driver.click(&selectors::RESCHEDULE_ACCORDION_TOGGLE).await?;

    info!("Opening the reschedule form...");
    driver
        .wait_for(&selectors::RESCHEDULE_BUTTON, settings.element_timeout)
        .await?;
    driver.click(&selectors::RESCHEDULE_BUTTON).await?;

    Ok(())
}

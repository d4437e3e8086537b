//! Availability probe: interpret the scheduling form into a verdict.

use tracing::{error, info};

use slotwatch_browser::BrowserDriver;
use slotwatch_core::{Result, Settings, Verdict};

use crate::selectors;

/// Select the configured facility and read the resulting page state.
///
/// Any error during interpretation collapses to `Indeterminate`: the
/// notification decision then behaves as if nothing were available, which
/// risks a silent false negative but can never fire a false alert.
pub async fn probe_availability(driver: &dyn BrowserDriver, settings: &Settings) -> Verdict {
    match try_probe(driver, settings).await {
        Ok(verdict) => verdict,
        Err(e) => {
            error!("Availability check failed: {}", e);
            Verdict::Indeterminate
        }
    }
}

async fn try_probe(driver: &dyn BrowserDriver, settings: &Settings) -> Result<Verdict> {
    info!(facility = %settings.facility, "Selecting facility...");
    driver
        .wait_for(&selectors::FACILITY_SELECT, settings.element_timeout)
        .await?;
    driver
        .select_by_label(&selectors::FACILITY_SELECT, &settings.facility)
        .await?;

    // Availability-dependent UI refreshes asynchronously after selection.
    tokio::time::sleep(settings.probe_settle).await;

    // "System is busy" and "no slots" are indistinguishable on this page;
    // both mean nothing is bookable right now.
    if driver.is_visible(&selectors::BUSY_MESSAGE).await? {
        info!("System is busy - no appointments available");
        return Ok(Verdict::Unavailable);
    }

    match driver
        .get_attribute(&selectors::APPOINTMENTS_SUBMIT, "disabled")
        .await?
    {
        Some(_) => {
            info!("Reschedule button is disabled - no appointments available");
            Ok(Verdict::Unavailable)
        }
        None => {
            info!("Reschedule button is ENABLED - appointments are available!");
            Ok(Verdict::Available)
        }
    }
}

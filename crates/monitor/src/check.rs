//! One full availability check: acquire a session, drive the steps, decide
//! the notification, release the session.

use tracing::{debug, error, info};

use slotwatch_browser::{BrowserDriver, SessionController};
use slotwatch_core::{Credentials, Result, Settings, Verdict};
use slotwatch_notify::{NotificationMessage, Notifier};

use crate::{login, probe, reschedule};

/// Navigation progress of one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    LoggedIn,
    RescheduleReached,
    LocationSelected,
}

/// Terminal state of one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    LoginFailed,
    NavigationFailed,
    Probed(Verdict),
}

/// Run one complete check.
///
/// The session acquired here is released on every exit path before the
/// outcome is returned. Only environment errors (no browser to acquire)
/// surface as `Err`; step failures are ordinary outcomes. A notification
/// is sent if and only if the verdict is `Available`.
pub async fn run_check(
    controller: &dyn SessionController,
    credentials: &Credentials,
    settings: &Settings,
    notifier: &dyn Notifier,
) -> Result<CheckOutcome> {
    info!("Starting appointment check...");
    let session = controller.acquire().await?;

    let outcome = drive(session.as_ref(), credentials, settings).await;

    controller.release(session).await;

    if outcome == CheckOutcome::Probed(Verdict::Available) {
        let message =
            NotificationMessage::appointment_available(&settings.facility, &settings.login_url);
        // A lost notification is preferable to a dead monitor.
        if let Err(e) = notifier.send(&message).await {
            error!("Failed to send notification: {}", e);
        }
    }

    info!(outcome = ?outcome, "Check finished");
    Ok(outcome)
}

/// The check state machine:
/// `Start → LoggedIn → RescheduleReached → LocationSelected → verdict`.
async fn drive(
    driver: &dyn BrowserDriver,
    credentials: &Credentials,
    settings: &Settings,
) -> CheckOutcome {
    debug!(stage = ?Stage::Start, "check started");

    if !login::login(driver, credentials, settings).await {
        return CheckOutcome::LoginFailed;
    }
    debug!(stage = ?Stage::LoggedIn, "stage advanced");

    if !reschedule::open_reschedule_form(driver, settings).await {
        return CheckOutcome::NavigationFailed;
    }
    debug!(stage = ?Stage::RescheduleReached, "stage advanced");

    let verdict = probe::probe_availability(driver, settings).await;
    debug!(stage = ?Stage::LocationSelected, %verdict, "probe finished");

    CheckOutcome::Probed(verdict)
}

//! Authentication step: drive the sign-in form.

use tracing::{info, warn};

use slotwatch_browser::BrowserDriver;
use slotwatch_core::{Credentials, Result, Settings};

use crate::selectors;

/// Drive the login form. `true` once the session has left the sign-in page.
///
/// Failure is terminal for this check only: log and return `false`. No
/// internal retry; retry policy belongs to the scheduler.
pub async fn login(
    driver: &dyn BrowserDriver,
    credentials: &Credentials,
    settings: &Settings,
) -> bool {
    match try_login(driver, credentials, settings).await {
        Ok(success) => success,
        Err(e) => {
            warn!("Login failed: {}", e);
            false
        }
    }
}

async fn try_login(
    driver: &dyn BrowserDriver,
    credentials: &Credentials,
    settings: &Settings,
) -> Result<bool> {
    info!("Navigating to login page...");
    driver.navigate(&settings.login_url).await?;

    driver
        .wait_for(&selectors::USER_EMAIL, settings.element_timeout)
        .await?;
    driver
        .fill(&selectors::USER_EMAIL, &credentials.account_email)
        .await?;
    driver
        .fill(&selectors::USER_PASSWORD, &credentials.account_password)
        .await?;

    confirm_policy(driver, settings).await;

    info!("Submitting sign-in form");
    driver.click(&selectors::SIGN_IN_SUBMIT).await?;

    // Post-submit settle before the location is inspected.
    tokio::time::sleep(settings.login_settle).await;

    let url = driver.current_url().await?;
    if url.contains(selectors::SIGN_IN_PATH) {
        warn!(%url, "Still on sign-in page - login may have failed");
        return Ok(false);
    }

    info!(%url, "Login successful");
    Ok(true)
}

/// The policy checkbox is optional: tolerate absence, activate it when
/// present and unchecked.
async fn confirm_policy(driver: &dyn BrowserDriver, settings: &Settings) {
    if driver
        .wait_for(&selectors::POLICY_CHECKBOX, settings.checkbox_timeout)
        .await
        .is_err()
    {
        info!("Policy checkbox not found - it may not be required");
        return;
    }

    match driver
        .get_attribute(&selectors::POLICY_CHECKBOX, "checked")
        .await
    {
        Ok(Some(_)) => info!("Policy checkbox already checked"),
        Ok(None) => {
            if let Err(e) = driver.click(&selectors::POLICY_CHECKBOX_LABEL).await {
                warn!("Could not check policy checkbox: {}", e);
            }
        }
        Err(e) => warn!("Could not inspect policy checkbox: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{fast_settings, test_credentials, FakeDriver, FakePage};

    #[tokio::test]
    async fn test_login_success_leaves_sign_in_page() {
        let driver = FakeDriver::new(FakePage::signed_out());
        let ok = login(&driver, &test_credentials(), &fast_settings()).await;
        assert!(ok);

        let page = driver.page();
        assert!(page
            .filled
            .contains(&(selectors::USER_EMAIL.to_string(), "me@example.com".into())));
        assert!(page
            .filled
            .contains(&(selectors::USER_PASSWORD.to_string(), "hunter2".into())));
        assert!(page.clicked.contains(&selectors::SIGN_IN_SUBMIT.to_string()));
    }

    #[tokio::test]
    async fn test_login_failure_when_still_on_sign_in() {
        let mut page = FakePage::signed_out();
        page.url_after_submit = None; // submit does not navigate away
        let driver = FakeDriver::new(page);
        assert!(!login(&driver, &test_credentials(), &fast_settings()).await);
    }

    #[tokio::test]
    async fn test_login_failure_when_email_field_missing() {
        let mut page = FakePage::signed_out();
        page.elements.remove(&selectors::USER_EMAIL.to_string());
        let driver = FakeDriver::new(page);
        assert!(!login(&driver, &test_credentials(), &fast_settings()).await);
    }

    #[tokio::test]
    async fn test_unchecked_policy_checkbox_activated_via_label() {
        let driver = FakeDriver::new(FakePage::signed_out());
        assert!(login(&driver, &test_credentials(), &fast_settings()).await);
        assert!(driver
            .page()
            .clicked
            .contains(&selectors::POLICY_CHECKBOX_LABEL.to_string()));
    }

    #[tokio::test]
    async fn test_checked_policy_checkbox_left_alone() {
        let mut page = FakePage::signed_out();
        page.elements
            .get_mut(&selectors::POLICY_CHECKBOX.to_string())
            .unwrap()
            .attrs
            .insert("checked".into(), "checked".into());
        let driver = FakeDriver::new(page);
        assert!(login(&driver, &test_credentials(), &fast_settings()).await);
        assert!(!driver
            .page()
            .clicked
            .contains(&selectors::POLICY_CHECKBOX_LABEL.to_string()));
    }

    #[tokio::test]
    async fn test_missing_policy_checkbox_is_tolerated() {
        let mut page = FakePage::signed_out();
        page.elements.remove(&selectors::POLICY_CHECKBOX.to_string());
        page.elements
            .remove(&selectors::POLICY_CHECKBOX_LABEL.to_string());
        let driver = FakeDriver::new(page);
        assert!(login(&driver, &test_credentials(), &fast_settings()).await);
    }
}

use std::env;
use std::fmt;
use std::time::Duration;

use crate::error::{Error, Result};

/// Sign-in page of the appointment system. Also the link included in the
/// availability notification body.
pub const DEFAULT_LOGIN_URL: &str = "https://ais.usvisa-info.com/en-ca/niv/users/sign_in";

const DEFAULT_FACILITY: &str = "Calgary";
const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_CHECK_INTERVAL_SECS: u64 = 1800;

/// Desktop Chrome user agent presented to the target site instead of the
/// headless default.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Immutable credential set supplied at startup. All five fields are
/// required; startup fails before any browser session exists if one is
/// missing or blank.
#[derive(Clone)]
pub struct Credentials {
    /// Appointment-system account email.
    pub account_email: String,
    /// Appointment-system account password.
    pub account_password: String,
    /// Recipient of availability notifications.
    pub notification_email: String,
    /// Sender address for outbound mail.
    pub smtp_email: String,
    /// App password for the sender account.
    pub smtp_app_password: String,
}

impl Credentials {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. The env reader is a thin wrapper
    /// around this so tests never have to mutate process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |key: &str| -> Result<String> {
            match lookup(key) {
                Some(value) if !value.trim().is_empty() => Ok(value),
                _ => Err(Error::Config(format!(
                    "missing required environment variable {key}"
                ))),
            }
        };

        Ok(Self {
            account_email: require("VISA_EMAIL")?,
            account_password: require("VISA_PASSWORD")?,
            notification_email: require("NOTIFICATION_EMAIL")?,
            smtp_email: require("SMTP_EMAIL")?,
            smtp_app_password: require("SMTP_APP_PASSWORD")?,
        })
    }
}

// Manual Debug so passwords never end up in logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("account_email", &self.account_email)
            .field("account_password", &"<redacted>")
            .field("notification_email", &self.notification_email)
            .field("smtp_email", &self.smtp_email)
            .field("smtp_app_password", &"<redacted>")
            .finish()
    }
}

/// Tunable parameters of one check. Settle intervals and element timeouts
/// are fields rather than hard-coded constants: they are timing assumptions
/// about a third-party UI and the first thing to adjust when it changes.
#[derive(Debug, Clone)]
pub struct Settings {
    pub login_url: String,
    /// Facility label as it appears in the location dropdown.
    pub facility: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    /// Delay between checks in continuous mode.
    pub check_interval: Duration,
    /// Bound for ordinary element waits.
    pub element_timeout: Duration,
    /// Bound for the optional policy checkbox; shorter, since absence is
    /// expected and tolerated.
    pub checkbox_timeout: Duration,
    /// Post-submit wait before the login URL is inspected.
    pub login_settle: Duration,
    /// Wait after facility selection for availability-dependent UI.
    pub probe_settle: Duration,
    pub headless: bool,
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            login_url: DEFAULT_LOGIN_URL.to_string(),
            facility: DEFAULT_FACILITY.to_string(),
            smtp_host: DEFAULT_SMTP_HOST.to_string(),
            smtp_port: DEFAULT_SMTP_PORT,
            check_interval: Duration::from_secs(DEFAULT_CHECK_INTERVAL_SECS),
            element_timeout: Duration::from_secs(20),
            checkbox_timeout: Duration::from_secs(5),
            login_settle: Duration::from_secs(3),
            probe_settle: Duration::from_secs(4),
            headless: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Settings {
    /// Defaults with optional environment overrides applied.
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        if let Ok(facility) = env::var("VISA_FACILITY") {
            if !facility.trim().is_empty() {
                settings.facility = facility;
            }
        }
        if let Ok(interval) = env::var("CHECK_INTERVAL_SECS") {
            if let Ok(secs) = interval.trim().parse::<u64>() {
                settings.check_interval = Duration::from_secs(secs);
            }
        }
        settings
    }
}

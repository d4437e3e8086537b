//! Scripted fakes behind the browser and notifier seams.
//!
//! `FakeDriver` serves a static page model: elements keyed by locator
//! display form, with visibility, attributes, and dropdown options. The
//! only dynamic behavior is the sign-in submit, which swaps the current
//! URL the way a successful login redirect would.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use slotwatch_browser::{BrowserDriver, Locator, SessionController};
use slotwatch_core::{Credentials, Error, Result, Settings};
use slotwatch_notify::{NotificationMessage, Notifier};

use crate::selectors;

const LANDING_URL: &str = "https://ais.usvisa-info.com/en-ca/niv/groups/12345";

#[derive(Debug, Clone)]
pub struct FakeElement {
    pub visible: bool,
    pub attrs: HashMap<String, String>,
    pub options: Vec<String>,
}

impl FakeElement {
    pub fn new() -> Self {
        Self {
            visible: true,
            attrs: HashMap::new(),
            options: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_options(mut self, options: &[&str]) -> Self {
        self.options = options.iter().map(|o| o.to_string()).collect();
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakePage {
    pub url: String,
    /// URL adopted when the sign-in submit control is clicked, simulating
    /// the post-login redirect. `None` leaves the URL unchanged.
    pub url_after_submit: Option<String>,
    pub elements: HashMap<String, FakeElement>,
    pub filled: Vec<(String, String)>,
    pub selected: Vec<(String, String)>,
    pub clicked: Vec<String>,
}

impl FakePage {
    fn insert(&mut self, locator: &Locator, element: FakeElement) {
        self.elements.insert(locator.to_string(), element);
    }

    /// The sign-in page, set up for a successful login.
    pub fn signed_out() -> Self {
        let mut page = Self {
            url_after_submit: Some(LANDING_URL.to_string()),
            ..Self::default()
        };
        page.insert(&selectors::USER_EMAIL, FakeElement::new());
        page.insert(&selectors::USER_PASSWORD, FakeElement::new());
        page.insert(&selectors::POLICY_CHECKBOX, FakeElement::new());
        page.insert(&selectors::POLICY_CHECKBOX_LABEL, FakeElement::new());
        page.insert(&selectors::SIGN_IN_SUBMIT, FakeElement::new());
        page
    }

    /// The post-login landing page with the reschedule accordion.
    pub fn landing() -> Self {
        let mut page = Self {
            url: LANDING_URL.to_string(),
            ..Self::default()
        };
        page.insert(&selectors::CONTINUE_LINK, FakeElement::new());
        page.insert(&selectors::RESCHEDULE_ACCORDION_TOGGLE, FakeElement::new());
        page.insert(&selectors::RESCHEDULE_BUTTON, FakeElement::new());
        page
    }

    /// The scheduling form in a given availability state.
    pub fn scheduling(submit_disabled: bool, busy_visible: bool) -> Self {
        let mut page = Self::default();
        page.insert(
            &selectors::FACILITY_SELECT,
            FakeElement::new().with_options(&["Calgary", "Halifax", "Ottawa", "Vancouver"]),
        );
        let submit = if submit_disabled {
            FakeElement::new().with_attr("disabled", "disabled")
        } else {
            FakeElement::new()
        };
        page.insert(&selectors::APPOINTMENTS_SUBMIT, submit);
        if busy_visible {
            page.insert(&selectors::BUSY_MESSAGE, FakeElement::new());
        }
        page
    }

    /// Everything a full successful check traverses, in one page model.
    pub fn full_flow(submit_disabled: bool, busy_visible: bool) -> Self {
        let mut page = Self::signed_out();
        let landing = Self::landing();
        let scheduling = Self::scheduling(submit_disabled, busy_visible);
        page.elements.extend(landing.elements);
        page.elements.extend(scheduling.elements);
        page
    }
}

pub struct FakeDriver {
    page: Mutex<FakePage>,
}

impl FakeDriver {
    pub fn new(page: FakePage) -> Self {
        Self {
            page: Mutex::new(page),
        }
    }

    pub fn page(&self) -> FakePage {
        self.page.lock().unwrap().clone()
    }
}

#[async_trait]
impl BrowserDriver for FakeDriver {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.page.lock().unwrap().url = url.to_string();
        Ok(())
    }

    async fn wait_for(&self, locator: &Locator, _timeout: Duration) -> Result<()> {
        if self.page.lock().unwrap().elements.contains_key(&locator.to_string()) {
            Ok(())
        } else {
            Err(Error::Timeout(format!("waiting for {locator}")))
        }
    }

    async fn click(&self, locator: &Locator) -> Result<()> {
        let mut page = self.page.lock().unwrap();
        let key = locator.to_string();
        if !page.elements.contains_key(&key) {
            return Err(Error::Cdp(format!("element not found: {locator}")));
        }
        page.clicked.push(key.clone());
        if key == selectors::SIGN_IN_SUBMIT.to_string() {
            if let Some(next) = page.url_after_submit.clone() {
                page.url = next;
            }
        }
        Ok(())
    }

    async fn fill(&self, locator: &Locator, text: &str) -> Result<()> {
        let mut page = self.page.lock().unwrap();
        let key = locator.to_string();
        if !page.elements.contains_key(&key) {
            return Err(Error::Cdp(format!("element not found: {locator}")));
        }
        page.filled.push((key, text.to_string()));
        Ok(())
    }

    async fn select_by_label(&self, locator: &Locator, label: &str) -> Result<()> {
        let mut page = self.page.lock().unwrap();
        let key = locator.to_string();
        match page.elements.get(&key) {
            None => Err(Error::Cdp(format!("element not found: {locator}"))),
            Some(element) if !element.options.iter().any(|o| o == label) => Err(Error::Cdp(
                format!("no option labeled '{label}' in {locator}"),
            )),
            Some(_) => {
                page.selected.push((key, label.to_string()));
                Ok(())
            }
        }
    }

    async fn get_attribute(&self, locator: &Locator, name: &str) -> Result<Option<String>> {
        let page = self.page.lock().unwrap();
        match page.elements.get(&locator.to_string()) {
            None => Err(Error::Cdp(format!("element not found: {locator}"))),
            Some(element) => Ok(element.attrs.get(name).cloned()),
        }
    }

    async fn is_visible(&self, locator: &Locator) -> Result<bool> {
        let page = self.page.lock().unwrap();
        Ok(page
            .elements
            .get(&locator.to_string())
            .map(|e| e.visible)
            .unwrap_or(false))
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.page.lock().unwrap().url.clone())
    }

    async fn close(&mut self) {}
}

/// Counts acquire/release pairs so tests can assert the release-on-all-paths
/// invariant.
#[derive(Default)]
pub struct FakeController {
    page: Mutex<Option<FakePage>>,
    fail_acquire: bool,
    pub acquires: AtomicUsize,
    pub releases: AtomicUsize,
}

impl FakeController {
    pub fn with_page(page: FakePage) -> Self {
        Self {
            page: Mutex::new(Some(page)),
            ..Self::default()
        }
    }

    /// A controller whose environment is broken (no browser to launch).
    pub fn failing() -> Self {
        Self {
            fail_acquire: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl SessionController for FakeController {
    async fn acquire(&self) -> Result<Box<dyn BrowserDriver>> {
        if self.fail_acquire {
            return Err(Error::Environment("browser binary not found".to_string()));
        }
        self.acquires.fetch_add(1, Ordering::SeqCst);
        let page = self.page.lock().unwrap().take().unwrap_or_default();
        Ok(Box::new(FakeDriver::new(page)))
    }

    async fn release(&self, _session: Box<dyn BrowserDriver>) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct FakeNotifier {
    pub sent: Mutex<Vec<NotificationMessage>>,
    pub fail: bool,
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn send(&self, message: &NotificationMessage) -> Result<()> {
        if self.fail {
            return Err(Error::Notify("smtp relay unreachable".to_string()));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Settings with millisecond settle intervals so step tests run instantly.
pub fn fast_settings() -> Settings {
    Settings {
        element_timeout: Duration::from_millis(10),
        checkbox_timeout: Duration::from_millis(10),
        login_settle: Duration::from_millis(1),
        probe_settle: Duration::from_millis(1),
        ..Settings::default()
    }
}

pub fn test_credentials() -> Credentials {
    Credentials::from_lookup(|key| {
        Some(
            match key {
                "VISA_EMAIL" => "me@example.com",
                "VISA_PASSWORD" => "hunter2",
                "NOTIFICATION_EMAIL" => "alerts@example.com",
                "SMTP_EMAIL" => "sender@example.com",
                "SMTP_APP_PASSWORD" => "app-pass",
                _ => return None,
            }
            .to_string(),
        )
    })
    .unwrap()
}

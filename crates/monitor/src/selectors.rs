//! Every selector the monitor depends on, in one place.
//!
//! These are a compatibility contract with an uncontrolled third-party UI
//! and can break without notice; when they do, this module is the only
//! place that needs to change.

use slotwatch_browser::Locator;

// Sign-in form
pub const USER_EMAIL: Locator = Locator::Css("#user_email");
pub const USER_PASSWORD: Locator = Locator::Css("#user_password");
pub const POLICY_CHECKBOX: Locator = Locator::Css("#policy_confirmed");
/// The checkbox sits under a styled overlay that intercepts clicks;
/// clicking its label toggles it reliably.
pub const POLICY_CHECKBOX_LABEL: Locator = Locator::Css("label[for='policy_confirmed']");
pub const SIGN_IN_SUBMIT: Locator = Locator::Css("input[name='commit']");
/// Substring of the sign-in URL; login succeeded once the session leaves it.
pub const SIGN_IN_PATH: &str = "sign_in";

// Post-login landing page
pub const CONTINUE_LINK: Locator = Locator::LinkText("Continue");

/// Toggle of the accordion item whose heading contains
/// "Reschedule Appointment".
pub const RESCHEDULE_ACCORDION_TOGGLE: Locator = Locator::XPath(
    "//li[a[h5[contains(., 'Reschedule Appointment')]]]//a[@class='accordion-title']",
);
/// The action link inside the same expanded item. Matched by both class and
/// text to disambiguate from decorative siblings.
pub const RESCHEDULE_BUTTON: Locator = Locator::XPath(
    "//li[a[h5[contains(., 'Reschedule Appointment')]]]\
     //a[contains(@class,'button') and contains(text(),'Reschedule Appointment')]",
);

// Scheduling form
pub const FACILITY_SELECT: Locator =
    Locator::Css("#appointments_consulate_appointment_facility_id");
pub const APPOINTMENTS_SUBMIT: Locator = Locator::Css("#appointments_submit");
pub const BUSY_MESSAGE: Locator =
    Locator::XPath("//*[contains(text(), 'System is busy. Please try again later.')]");

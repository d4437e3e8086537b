//! Notification message templates.

/// Subject and plain-text body of one outbound notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    pub subject: String,
    pub body: String,
}

impl NotificationMessage {
    /// Sent once when continuous monitoring starts, as a deliverability
    /// check and a record of when the monitor came up.
    pub fn monitor_started() -> Self {
        Self {
            subject: "Visa Monitor Started".to_string(),
            body: "The appointment monitoring bot has started. \
                   You'll receive a notification when appointments become available."
                .to_string(),
        }
    }

    /// Sent when a probe returns an `Available` verdict.
    pub fn appointment_available(facility: &str, login_url: &str) -> Self {
        Self {
            subject: format!("US Visa Appointment Available in {facility}!"),
            body: format!(
                "APPOINTMENT AVAILABLE!\n\n\
                 The reschedule button is now enabled in {facility}!\n\
                 This means appointment slots have opened up.\n\n\
                 Log in immediately to book your appointment:\n\
                 {login_url}"
            ),
        }
    }
}

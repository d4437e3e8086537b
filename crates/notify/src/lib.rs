pub mod mailer;
pub mod message;

pub use mailer::{Notifier, SmtpNotifier};
pub use message::NotificationMessage;

pub mod check;
pub mod login;
pub mod probe;
pub mod reschedule;
pub mod selectors;
pub mod watch;

#[cfg(test)]
pub(crate) mod testkit;

pub use check::{run_check, CheckOutcome, Stage};

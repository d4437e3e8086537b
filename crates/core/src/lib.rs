pub mod config;
pub mod error;
pub mod types;

pub use config::{Credentials, Settings, DEFAULT_LOGIN_URL};
pub use error::{Error, Result};
pub use types::Verdict;

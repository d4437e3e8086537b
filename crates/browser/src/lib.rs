pub mod cdp;
pub mod chrome;
pub mod driver;

pub use chrome::{ChromeController, ChromeSession};
pub use driver::{BrowserDriver, Locator, SessionController};

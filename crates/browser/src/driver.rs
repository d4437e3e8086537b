//! Capability seam between step logic and the automation backend.
//!
//! Steps address elements only through [`Locator`] values and drive the
//! page only through [`BrowserDriver`], so swapping the backend (or faking
//! it in tests) never touches step code.

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

use slotwatch_core::Result;

/// How to find one element on the page.
///
/// The target site is an uncontrolled third party; its DOM changes without
/// notice. Keeping every selector behind a `Locator` kept in one module
/// makes such a breakage a localized edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// CSS selector.
    Css(&'static str),
    /// XPath expression, for structural containment CSS cannot express.
    XPath(&'static str),
    /// Exact trimmed text of an anchor element.
    LinkText(&'static str),
}

impl Locator {
    /// JavaScript expression evaluating to the matched element or `null`.
    pub fn js_expression(&self) -> String {
        match self {
            Locator::Css(selector) => {
                format!("document.querySelector('{}')", js_escape(selector))
            }
            Locator::XPath(expr) => format!(
                "document.evaluate('{}', document, null, \
                 XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue",
                js_escape(expr)
            ),
            Locator::LinkText(text) => format!(
                "document.evaluate(\"//a[normalize-space(text())='{}']\", document, null, \
                 XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue",
                text.replace('"', "\\\"")
            ),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(s) => write!(f, "css={s}"),
            Locator::XPath(s) => write!(f, "xpath={s}"),
            Locator::LinkText(s) => write!(f, "link={s}"),
        }
    }
}

/// Escape a string for embedding in a single-quoted JS literal.
pub(crate) fn js_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Scoped browser interaction primitives for one live session.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Open a URL and wait for the document to finish loading.
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Poll until the locator matches an element, up to `timeout`.
    async fn wait_for(&self, locator: &Locator, timeout: Duration) -> Result<()>;

    /// Scroll the element into view and click it at the DOM level, so an
    /// occluding overlay cannot intercept the click.
    async fn click(&self, locator: &Locator) -> Result<()>;

    /// Replace the element's value with `text`.
    async fn fill(&self, locator: &Locator, text: &str) -> Result<()>;

    /// Choose a dropdown option by its visible label.
    async fn select_by_label(&self, locator: &Locator, label: &str) -> Result<()>;

    /// Read an attribute; `None` when the attribute is absent.
    async fn get_attribute(&self, locator: &Locator, name: &str) -> Result<Option<String>>;

    /// Whether the element exists and takes up layout space.
    async fn is_visible(&self, locator: &Locator) -> Result<bool>;

    async fn current_url(&self) -> Result<String>;

    /// Tear down browser resources. Called exactly once, by the
    /// controller's `release`.
    async fn close(&mut self);
}

/// Acquire/release of one isolated browser session per check.
///
/// `release` is unconditional: the session must be handed back on every
/// exit path of a check, and teardown failures are logged, not surfaced.
#[async_trait]
pub trait SessionController: Send + Sync {
    async fn acquire(&self) -> Result<Box<dyn BrowserDriver>>;
    async fn release(&self, session: Box<dyn BrowserDriver>);
}

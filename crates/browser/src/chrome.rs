//! Chrome-backed session controller.
//!
//! Launches one isolated Chrome process per check with a throwaway profile
//! and anti-automation-detection configuration, connects to its page target
//! over CDP, and implements the [`BrowserDriver`] primitives on top of
//! `Runtime.evaluate`.

use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use slotwatch_core::{Error, Result, Settings};

use crate::cdp::CdpClient;
use crate::driver::{js_escape, BrowserDriver, Locator, SessionController};

const POLL_INTERVAL: Duration = Duration::from_millis(200);
const PAGE_LOAD_TIMEOUT: Duration = Duration::from_secs(30);
const CDP_READY_TIMEOUT: Duration = Duration::from_secs(15);

/// Script injected into every new document so the site cannot read the
/// headless automation marker.
const STEALTH_INIT_SCRIPT: &str =
    "Object.defineProperty(navigator, 'webdriver', {get: () => undefined});";

/// One live Chrome instance plus its CDP connection.
pub struct ChromeSession {
    child: Child,
    cdp: CdpClient,
    profile_dir: PathBuf,
}

impl ChromeSession {
    /// Launch a fresh, isolated Chrome and connect to its page target.
    ///
    /// Launch problems (no binary, endpoint never ready) are
    /// `Error::Environment`: a broken deployment, not a transient failure.
    pub async fn launch(settings: &Settings) -> Result<Self> {
        let browser_path = find_chrome_binary().ok_or_else(|| {
            Error::Environment("Chrome/Chromium binary not found; install one".to_string())
        })?;

        let debug_port = find_free_port().await?;

        // Throwaway profile: every session starts with no cookies or state.
        let profile_dir = std::env::temp_dir().join(format!("slotwatch-profile-{debug_port}"));
        std::fs::create_dir_all(&profile_dir)?;

        let args = build_chrome_args(debug_port, &profile_dir, settings);

        info!(port = debug_port, headless = settings.headless, "Launching browser");

        let child = Command::new(&browser_path)
            .args(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::Environment(format!("failed to launch {browser_path}: {e}")))?;

        wait_for_cdp_ready(debug_port).await?;
        let page_ws_url = get_page_ws_url(debug_port).await?;

        let cdp = CdpClient::connect(&page_ws_url).await?;

        for domain in ["Page", "Runtime", "DOM", "Network"] {
            cdp.enable_domain(domain).await?;
        }

        cdp.set_user_agent(&settings.user_agent).await?;
        cdp.add_init_script(STEALTH_INIT_SCRIPT).await?;

        debug!(ws_url = %page_ws_url, "CDP connection established");

        Ok(Self {
            child,
            cdp,
            profile_dir,
        })
    }

    /// Evaluate a JS snippet operating on the element a locator resolves to.
    /// `body` sees the element bound to `el` (possibly null).
    async fn eval_on_element(&self, locator: &Locator, body: &str) -> Result<Value> {
        let js = format!(
            "(function() {{ var el = {}; {} }})()",
            locator.js_expression(),
            body
        );
        self.cdp.eval(&js).await
    }
}

#[async_trait]
impl BrowserDriver for ChromeSession {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.cdp.navigate(url).await?;
        // Poll readiness instead of a blind post-navigation sleep.
        let start = std::time::Instant::now();
        loop {
            if start.elapsed() > PAGE_LOAD_TIMEOUT {
                return Err(Error::Timeout(format!("page load of {url}")));
            }
            let ready = self.cdp.eval("document.readyState === 'complete'").await?;
            if ready.as_bool() == Some(true) {
                return Ok(());
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn wait_for(&self, locator: &Locator, timeout: Duration) -> Result<()> {
        let js = format!("!!({})", locator.js_expression());
        let start = std::time::Instant::now();
        loop {
            if start.elapsed() > timeout {
                return Err(Error::Timeout(format!("waiting for {locator}")));
            }
            let found = self.cdp.eval(&js).await?;
            if found.as_bool() == Some(true) {
                return Ok(());
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn click(&self, locator: &Locator) -> Result<()> {
        let clicked = self
            .eval_on_element(
                locator,
                "if (!el) return false; \
                 el.scrollIntoView({block: 'center'}); \
                 el.click(); return true;",
            )
            .await?;
        if clicked.as_bool() != Some(true) {
            return Err(Error::Cdp(format!("element not found: {locator}")));
        }
        Ok(())
    }

    async fn fill(&self, locator: &Locator, text: &str) -> Result<()> {
        let focused = self
            .eval_on_element(locator, "if (!el) return false; el.focus(); el.value = ''; return true;")
            .await?;
        if focused.as_bool() != Some(true) {
            return Err(Error::Cdp(format!("element not found: {locator}")));
        }
        self.cdp.insert_text(text).await?;
        // Input event so framework-bound fields observe the change.
        self.cdp
            .eval(
                "document.activeElement && \
                 document.activeElement.dispatchEvent(new Event('input', {bubbles: true}))",
            )
            .await?;
        Ok(())
    }

    async fn select_by_label(&self, locator: &Locator, label: &str) -> Result<()> {
        let body = format!(
            "if (!el) return 'missing'; \
             var opt = Array.from(el.options).find(function(o) {{ \
                 return o.textContent.trim() === '{}'; }}); \
             if (!opt) return 'no-option'; \
             el.value = opt.value; \
             el.dispatchEvent(new Event('change', {{bubbles: true}})); \
             return 'ok';",
            js_escape(label)
        );
        let outcome = self.eval_on_element(locator, &body).await?;
        match outcome.as_str() {
            Some("ok") => Ok(()),
            Some("no-option") => Err(Error::Cdp(format!(
                "no option labeled '{label}' in {locator}"
            ))),
            _ => Err(Error::Cdp(format!("element not found: {locator}"))),
        }
    }

    async fn get_attribute(&self, locator: &Locator, name: &str) -> Result<Option<String>> {
        let body = format!(
            "if (!el) return {{found: false, value: null}}; \
             return {{found: true, value: el.getAttribute('{}')}};",
            js_escape(name)
        );
        let result = self.eval_on_element(locator, &body).await?;
        if result.get("found").and_then(|v| v.as_bool()) != Some(true) {
            return Err(Error::Cdp(format!("element not found: {locator}")));
        }
        Ok(result
            .get("value")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string()))
    }

    async fn is_visible(&self, locator: &Locator) -> Result<bool> {
        let visible = self
            .eval_on_element(
                locator,
                "if (!el) return false; \
                 return !!(el.offsetWidth || el.offsetHeight || el.getClientRects().length);",
            )
            .await?;
        Ok(visible.as_bool() == Some(true))
    }

    async fn current_url(&self) -> Result<String> {
        let url = self.cdp.eval("window.location.href").await?;
        url.as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| Error::Cdp("could not read window.location.href".to_string()))
    }

    async fn close(&mut self) {
        // Graceful close first; the process kill below covers the rest.
        if let Err(e) = self.cdp.send_command("Browser.close", serde_json::json!({})).await {
            debug!("CDP Browser.close failed (may already be closed): {}", e);
        }
        if let Err(e) = self.child.kill().await {
            debug!("browser process kill failed: {}", e);
        }
        if let Err(e) = std::fs::remove_dir_all(&self.profile_dir) {
            debug!(dir = %self.profile_dir.display(), "profile cleanup failed: {}", e);
        }
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        // Best-effort kill on drop
        let _ = self.child.start_kill();
    }
}

/// Launches one Chrome session per `acquire` and tears it down on `release`.
pub struct ChromeController {
    settings: Settings,
}

impl ChromeController {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl SessionController for ChromeController {
    async fn acquire(&self) -> Result<Box<dyn BrowserDriver>> {
        let session = ChromeSession::launch(&self.settings).await?;
        Ok(Box::new(session))
    }

    async fn release(&self, mut session: Box<dyn BrowserDriver>) {
        session.close().await;
    }
}

/// Chrome command line: remote debugging plus the anti-detection and
/// profile-hygiene flags the target site is sensitive to.
fn build_chrome_args(debug_port: u16, profile_dir: &std::path::Path, settings: &Settings) -> Vec<String> {
    let mut args = vec![
        format!("--remote-debugging-port={debug_port}"),
        format!("--user-data-dir={}", profile_dir.display()),
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--disable-blink-features=AutomationControlled".to_string(),
        "--disable-gpu".to_string(),
        "--no-first-run".to_string(),
        "--no-default-browser-check".to_string(),
        "--disable-background-networking".to_string(),
        "--disable-extensions".to_string(),
        "--disable-sync".to_string(),
        "--password-store=basic".to_string(),
        format!("--user-agent={}", settings.user_agent),
        "--window-size=1920,1080".to_string(),
    ];
    if settings.headless {
        args.push("--headless=new".to_string());
    }
    args.push("about:blank".to_string());
    args
}

/// Find a Chrome/Chromium binary on the system.
fn find_chrome_binary() -> Option<String> {
    let candidates: Vec<&str> = if cfg!(target_os = "macos") {
        vec![
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
        ]
    } else if cfg!(target_os = "linux") {
        vec![
            "google-chrome",
            "google-chrome-stable",
            "chromium",
            "chromium-browser",
            "/usr/bin/google-chrome",
            "/usr/bin/chromium",
        ]
    } else {
        vec![
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
        ]
    };

    for candidate in candidates {
        if std::path::Path::new(candidate).exists() {
            return Some(candidate.to_string());
        }
        if !candidate.contains('/') && !candidate.contains('\\') && which::which(candidate).is_ok() {
            return Some(candidate.to_string());
        }
    }
    None
}

/// Find a free TCP port for the debugging endpoint.
async fn find_free_port() -> Result<u16> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|e| Error::Environment(format!("failed to bind to find free port: {e}")))?;
    let port = listener
        .local_addr()
        .map_err(|e| Error::Environment(format!("failed to get local addr: {e}")))?
        .port();
    drop(listener);
    Ok(port)
}

/// Poll /json/version until Chrome's CDP endpoint responds.
async fn wait_for_cdp_ready(port: u16) -> Result<()> {
    let start = std::time::Instant::now();
    let url = format!("http://127.0.0.1:{port}/json/version");

    loop {
        if start.elapsed() > CDP_READY_TIMEOUT {
            return Err(Error::Environment(format!(
                "Chrome CDP not ready after {}s on port {port}",
                CDP_READY_TIMEOUT.as_secs()
            )));
        }

        if let Ok(resp) = reqwest::get(&url).await {
            if let Ok(body) = resp.json::<Value>().await {
                if body.get("webSocketDebuggerUrl").is_some() {
                    return Ok(());
                }
            }
        }

        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// Resolve the first page target's WebSocket URL from /json/list.
/// Retries a few times since the page target may not appear immediately.
async fn get_page_ws_url(port: u16) -> Result<String> {
    let url = format!("http://127.0.0.1:{port}/json/list");

    for attempt in 0..10 {
        if attempt > 0 {
            tokio::time::sleep(Duration::from_millis(300)).await;
        }

        let resp = match reqwest::get(&url).await {
            Ok(r) => r,
            Err(e) => {
                warn!(attempt, "target list request failed: {}", e);
                continue;
            }
        };
        let targets: Vec<Value> = match resp.json().await {
            Ok(t) => t,
            Err(_) => continue,
        };

        for target in &targets {
            if target.get("type").and_then(|v| v.as_str()) == Some("page") {
                if let Some(ws_url) = target.get("webSocketDebuggerUrl").and_then(|v| v.as_str()) {
                    return Ok(ws_url.to_string());
                }
            }
        }
    }

    Err(Error::Environment(
        "no page target found after retries".to_string(),
    ))
}

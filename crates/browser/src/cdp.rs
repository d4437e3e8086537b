//! Low-level Chrome DevTools Protocol client over WebSocket.
//!
//! Talks to a Chrome instance through its per-page debugging endpoint.
//! Commands are matched to responses by request id; unsolicited protocol
//! events are ignored, since the monitor observes page state by polling.

use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{debug, error, warn};

use slotwatch_core::{Error, Result};

const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// A CDP WebSocket client that can send commands and receive responses.
pub struct CdpClient {
    /// Sender to write messages to the WebSocket.
    ws_tx: mpsc::Sender<String>,
    /// Pending command responses, keyed by request ID.
    pending: Arc<Mutex<HashMap<u64, oneshot::Sender<Value>>>>,
    /// Auto-incrementing command ID.
    next_id: AtomicU64,
    /// Handle to the reader task so it is dropped with the client.
    _reader_handle: tokio::task::JoinHandle<()>,
    /// Handle to the writer task.
    _writer_handle: tokio::task::JoinHandle<()>,
}

impl CdpClient {
    /// Connect to a Chrome CDP WebSocket endpoint.
    pub async fn connect(ws_url: &str) -> Result<Self> {
        use futures::{SinkExt, StreamExt};
        use tokio_tungstenite::connect_async;
        use tokio_tungstenite::tungstenite::Message;

        let (ws_stream, _) = connect_async(ws_url)
            .await
            .map_err(|e| Error::Cdp(format!("failed to connect to CDP endpoint {ws_url}: {e}")))?;

        let (mut ws_sink, mut ws_read) = ws_stream.split();

        // Channel for outgoing messages
        let (ws_tx, mut ws_rx) = mpsc::channel::<String>(64);

        let pending: Arc<Mutex<HashMap<u64, oneshot::Sender<Value>>>> =
            Arc::new(Mutex::new(HashMap::new()));
        let pending_reader = pending.clone();

        // Writer task: owns the sink, forwards messages from the channel
        let writer_handle = tokio::spawn(async move {
            while let Some(msg) = ws_rx.recv().await {
                if let Err(e) = ws_sink.send(Message::Text(msg)).await {
                    error!("CDP WebSocket write error: {}", e);
                    break;
                }
            }
        });

        // Reader task: command responses resolve their pending waiter;
        // anything without an id is an event and is dropped.
        let reader_handle = tokio::spawn(async move {
            while let Some(msg_result) = ws_read.next().await {
                match msg_result {
                    Ok(Message::Text(text)) => {
                        if let Ok(val) = serde_json::from_str::<Value>(&text) {
                            if let Some(id) = val.get("id").and_then(|v| v.as_u64()) {
                                let mut pending = pending_reader.lock().await;
                                if let Some(tx) = pending.remove(&id) {
                                    let _ = tx.send(val);
                                }
                            }
                        }
                    }
                    Ok(Message::Close(_)) => {
                        debug!("CDP WebSocket closed by server");
                        break;
                    }
                    Err(e) => {
                        warn!("CDP WebSocket read error: {}", e);
                        break;
                    }
                    _ => {}
                }
            }
        });

        Ok(Self {
            ws_tx,
            pending,
            next_id: AtomicU64::new(1),
            _reader_handle: reader_handle,
            _writer_handle: writer_handle,
        })
    }

    /// Send a CDP command and wait for the response.
    pub async fn send_command(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);

        let msg = json!({
            "id": id,
            "method": method,
            "params": params,
        });

        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.pending.lock().await;
            pending.insert(id, tx);
        }

        self.ws_tx
            .send(msg.to_string())
            .await
            .map_err(|e| Error::Cdp(format!("failed to send CDP command: {e}")))?;

        match tokio::time::timeout(COMMAND_TIMEOUT, rx).await {
            Ok(Ok(response)) => {
                if let Some(error) = response.get("error") {
                    Err(Error::Cdp(format!("{method}: {error}")))
                } else {
                    Ok(response.get("result").cloned().unwrap_or(Value::Null))
                }
            }
            Ok(Err(_)) => Err(Error::Cdp("CDP response channel closed".to_string())),
            Err(_) => {
                self.pending.lock().await.remove(&id);
                Err(Error::Cdp(format!(
                    "CDP command '{method}' timed out after {}s",
                    COMMAND_TIMEOUT.as_secs()
                )))
            }
        }
    }

    /// Enable a CDP domain (e.g., "Page", "Runtime", "DOM", "Network").
    pub async fn enable_domain(&self, domain: &str) -> Result<()> {
        self.send_command(&format!("{domain}.enable"), json!({})).await?;
        Ok(())
    }

    /// Start navigation to a URL. Load completion is observed separately by
    /// polling `document.readyState`.
    pub async fn navigate(&self, url: &str) -> Result<()> {
        self.send_command("Page.navigate", json!({"url": url})).await?;
        Ok(())
    }

    /// Evaluate JavaScript in the page context and return the by-value result.
    pub async fn eval(&self, expression: &str) -> Result<Value> {
        let result = self
            .send_command(
                "Runtime.evaluate",
                json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                }),
            )
            .await?;
        if let Some(details) = result.get("exceptionDetails") {
            let text = details
                .get("text")
                .and_then(|t| t.as_str())
                .unwrap_or("unknown");
            return Err(Error::Cdp(format!("JS exception: {text}")));
        }
        Ok(result
            .get("result")
            .and_then(|r| r.get("value"))
            .cloned()
            .unwrap_or(Value::Null))
    }

    /// Type text into the currently focused element.
    pub async fn insert_text(&self, text: &str) -> Result<()> {
        self.send_command("Input.insertText", json!({"text": text})).await?;
        Ok(())
    }

    /// Override the user agent for all subsequent requests.
    pub async fn set_user_agent(&self, user_agent: &str) -> Result<()> {
        self.send_command(
            "Network.setUserAgentOverride",
            json!({"userAgent": user_agent}),
        )
        .await?;
        Ok(())
    }

    /// Register a script evaluated in every new document before page code runs.
    pub async fn add_init_script(&self, source: &str) -> Result<()> {
        self.send_command(
            "Page.addScriptToEvaluateOnNewDocument",
            json!({"source": source}),
        )
        .await?;
        Ok(())
    }
}

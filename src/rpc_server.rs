//! popup-bookmarks RPC Server: JSON-RPC over stdin/stdout for the popup UI.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"tree.open", "params":{"levelIndex":0,"folderId":"5"}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//! Events:   {"event":"ready",...} once, {"event":"treesChanged","generation":n}
//!           after every rebuild caused by bookmark changes.
//!
//! Logs go to stderr; stdout carries the protocol only.

use std::path::PathBuf;
use std::time::Instant;

use popup_bookmarks::app::App;
use popup_bookmarks::platform;
use popup_bookmarks::rpc_handler::handle_method;

use serde_json::{json, Value};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

/// Simple rate limiter: max requests per second.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self { window_start: Instant::now(), request_count: 0, max_per_second }
    }

    /// Returns true if the request is allowed, false if rate-limited.
    fn check(&mut self) -> bool {
        let elapsed = self.window_start.elapsed();
        if elapsed.as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

async fn send(stdout: &mut io::Stdout, message: &Value) -> io::Result<()> {
    stdout.write_all(format!("{}\n", message).as_bytes()).await?;
    stdout.flush().await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let data_dir = match std::env::var("POPUP_BOOKMARKS_DATA_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => platform::get_data_dir(),
    };
    std::fs::create_dir_all(&data_dir)?;
    let db_path = data_dir.join("bookmarks.db");

    let mut app = App::new(&db_path.to_string_lossy(), None).await?;
    app.startup();
    tracing::info!("Serving bookmarks from {}", db_path.display());

    let mut stdout = io::stdout();
    send(&mut stdout, &json!({"event":"ready","version":env!("CARGO_PKG_VERSION")})).await?;

    let mut rate_limiter = RateLimiter::new(200);
    let mut generation = app.reactor.subscribe_generation();
    let mut lines = BufReader::new(io::stdin()).lines();

    loop {
        tokio::select! {
            changed = generation.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = *generation.borrow_and_update();
                send(&mut stdout, &json!({"event":"treesChanged","generation":current})).await?;
            }
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(l)) => l,
                    Ok(None) => break,
                    Err(e) => {
                        tracing::error!("Failed to read stdin: {}", e);
                        break;
                    }
                };
                if line.trim().is_empty() { continue; }

                let req: Value = match serde_json::from_str(&line) {
                    Ok(v) => v,
                    Err(e) => {
                        send(&mut stdout, &json!({"id":null,"error":format!("parse error: {}",e)})).await?;
                        continue;
                    }
                };

                let id = req.get("id").cloned().unwrap_or(Value::Null);

                if !rate_limiter.check() {
                    send(&mut stdout, &json!({"id": id, "error": "rate limit exceeded"})).await?;
                    continue;
                }

                let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
                let params = req.get("params").cloned().unwrap_or(json!({}));

                let response = match handle_method(&app, method, &params).await {
                    Ok(val) => json!({"id": id, "result": val}),
                    Err(err) => {
                        tracing::warn!("{} failed: {}", method, err);
                        json!({"id": id, "error": err})
                    }
                };
                send(&mut stdout, &response).await?;
            }
        }
    }

    app.shutdown().await;
    Ok(())
}

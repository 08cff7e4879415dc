use std::time::Instant;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use chrono::Local;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;

/// Appends timestamped lines to a file from a background task.
#[derive(Clone)]
pub struct Logger {
    sender: mpsc::Sender<String>,
}

impl Logger {
    /// Must be called inside a tokio runtime.
    pub fn new(file_path: &str) -> Self {
        let (sender, mut receiver): (mpsc::Sender<String>, mpsc::Receiver<String>) = mpsc::channel(100);

        let file_path = file_path.to_string();
        tokio::spawn(async move {
            let mut file = match OpenOptions::new().create(true).append(true).open(&file_path).await {
                Ok(file) => file,
                Err(e) => {
                    tracing::error!(%file_path, "failed to open request log: {e}");
                    return;
                }
            };

            while let Some(log) = receiver.recv().await {
                let written = match file.write_all(log.as_bytes()).await {
                    Ok(()) => file.flush().await,
                    Err(e) => Err(e),
                };
                if let Err(e) = written {
                    tracing::error!(%file_path, "failed to write request log: {e}");
                }
            }
        });
        Self { sender }
    }

    pub async fn log(&self, message: &str) {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let log_entry = format!("[{}] {}\n", timestamp, message);

        if self.sender.send(log_entry).await.is_err() {
            tracing::warn!("request log writer has stopped");
        }
    }
}

/// Records `METHOD URI -> STATUS` for every request.
pub async fn log_requests(State(logger): State<Logger>, request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let level = if status.is_server_error() {
        "ERROR"
    } else if status.is_client_error() {
        "WARN"
    } else {
        "INFO"
    };
    logger
        .log(&format!(
            "[{level}] {method} {uri} -> {} ({} ms)",
            status.as_u16(),
            started.elapsed().as_millis()
        ))
        .await;
    response
}

// components/media_fetch/src/worker.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;

use crate::orchestrator::Orchestrator;
use crate::types::{DownloadOutcome, Request};

/// Runs downloads as background tasks.
#[derive(Clone)]
pub struct Worker {
    orchestrator: Arc<Orchestrator>,
}

impl Worker {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self { orchestrator }
    }

    /// Start `request` on the runtime and return a ticket for it.
    pub fn submit(&self, request: Request) -> DownloadTicket {
        let source_url = request.source_url().to_string();
        tracing::info!("Queued {} download of {}", request.mode(), source_url);

        let orchestrator = Arc::clone(&self.orchestrator);
        let handle = tokio::spawn(async move { orchestrator.execute(&request).await });

        DownloadTicket {
            source_url,
            submitted_at: Utc::now(),
            handle,
        }
    }
}

/// Handle to a download running in the background.
pub struct DownloadTicket {
    source_url: String,
    submitted_at: DateTime<Utc>,
    handle: JoinHandle<DownloadOutcome>,
}

impl DownloadTicket {
    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the download. A task that died becomes a failed outcome.
    pub async fn wait(self) -> DownloadOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("Background download of {} died: {}", self.source_url, e);
                DownloadOutcome::failed(format!("background download stopped unexpectedly: {e}"))
            }
        }
    }
}

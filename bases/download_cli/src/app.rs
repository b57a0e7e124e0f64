// bases/download_cli/src/app.rs
use std::sync::Arc;
use std::time::Duration;

use color_eyre::Result;
use media_fetch::{DownloadOutcome, Session, Worker};
use tokio::time::Instant;

use crate::config::Config;
use crate::output::OutputHandler;

const POLL_INTERVAL: Duration = Duration::from_millis(250);
const HEARTBEAT_EVERY: Duration = Duration::from_secs(5);

pub struct App {
    config: Config,
    session: Session,
    output: OutputHandler,
}

impl App {
    pub fn new(config: Config) -> Self {
        let output = OutputHandler::new(config.verbose, config.json);
        let session = Session::new(Arc::new(config.orchestrator()));
        Self {
            config,
            session,
            output,
        }
    }

    /// Returns whether the run succeeded.
    pub async fn run(&self) -> Result<bool> {
        if self.config.info_only {
            let request = &self.config.request;
            let cached = if request.mode().is_playlist() {
                self.session.playlist_info(request.source_url()).await?
            } else {
                self.session.info(request.source_url()).await?
            };
            self.output.print_info(&cached)?;
            return Ok(true);
        }

        self.output.print_download_start(&self.config.request);
        let outcome = if self.config.background {
            self.run_in_background().await
        } else {
            self.session.download(&self.config.request).await
        };

        self.output.print_outcome(&outcome)?;
        Ok(outcome.is_ok())
    }

    async fn run_in_background(&self) -> DownloadOutcome {
        let worker = Worker::new(Arc::clone(self.session.orchestrator()));
        let ticket = worker.submit(self.config.request.clone());

        let started = Instant::now();
        let mut last_beat = started;
        while !ticket.is_finished() {
            tokio::time::sleep(POLL_INTERVAL).await;
            if last_beat.elapsed() >= HEARTBEAT_EVERY {
                tracing::info!(
                    "Still downloading {} ({}s elapsed)",
                    ticket.source_url(),
                    started.elapsed().as_secs()
                );
                last_beat = Instant::now();
            }
        }

        let outcome = ticket.wait().await;
        self.session.record(outcome.clone());
        outcome
    }

    pub fn print_error(&self, error: &color_eyre::Report) {
        self.output.print_error(error);
    }
}

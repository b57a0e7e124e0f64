// bases/download_cli/src/output.rs
use color_eyre::Result;
use media_fetch::{CachedInfo, DownloadOutcome, Request};

pub struct OutputHandler {
    verbose: bool,
    json: bool,
}

impl OutputHandler {
    pub fn new(verbose: bool, json: bool) -> Self {
        Self { verbose, json }
    }

    pub fn print_download_start(&self, request: &Request) {
        if self.json {
            return;
        }
        println!(
            "Starting {} download from: {}",
            request.mode(),
            request.source_url()
        );
        if let Some(quality) = request.desired_quality() {
            println!("Quality: {}", quality);
        }
    }

    pub fn print_outcome(&self, outcome: &DownloadOutcome) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(outcome)?);
            return Ok(());
        }

        for line in outcome_lines(outcome, self.verbose) {
            println!("{}", line);
        }
        if let Some(message) = outcome.error_message() {
            eprintln!("Download failed: {}", message);
        }
        Ok(())
    }

    pub fn print_info(&self, cached: &CachedInfo) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(&cached.info)?);
            return Ok(());
        }

        let info = &cached.info;
        println!("Title: {}", info.title);
        if let Some(uploader) = &info.uploader {
            println!("Uploader: {}", uploader);
        }
        if let Some(seconds) = info.duration_seconds {
            println!("Duration: {}", format_duration(seconds));
        }
        if let Some(count) = info.entry_count {
            println!("Entries: {}", count);
        }
        if self.verbose {
            println!("Id: {}", info.id);
            if let Some(page) = &info.webpage_url {
                println!("Page: {}", page);
            }
            println!("Engine: {} at {}", cached.engine, cached.fetched_at);
        }
        Ok(())
    }

    pub fn print_error(&self, error: &color_eyre::Report) {
        eprintln!("Error: {}", error);

        if self.verbose {
            eprintln!("\nError details:");
            error.chain().skip(1).for_each(|cause| {
                eprintln!("  caused by: {}", cause);
            });
        }
    }
}

fn outcome_lines(outcome: &DownloadOutcome, verbose: bool) -> Vec<String> {
    let mut lines = Vec::new();

    if outcome.is_ok() {
        lines.push(format!("Downloaded {} file(s):", outcome.output_paths().len()));
        lines.extend(
            outcome
                .output_paths()
                .iter()
                .map(|path| format!("  {}", path.display())),
        );
        if verbose {
            if let Some(engine) = outcome.engine() {
                lines.push(format!("Engine: {}", engine));
            }
        }
    }

    if outcome.skipped_count() > 0 {
        lines.push(format!("Skipped {} item(s):", outcome.skipped_count()));
        lines.extend(outcome.skipped().iter().map(|item| {
            format!("  #{} {}: {}", item.index + 1, item.url, item.reason)
        }));
    }

    lines.extend(
        outcome
            .warnings()
            .iter()
            .map(|warning| format!("Warning: {}", warning)),
    );
    lines
}

/// `m:ss`, or `h:mm:ss` from one hour on
fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    let (hours, minutes, secs) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

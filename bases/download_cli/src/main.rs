// bases/download_cli/src/main.rs
mod app;
mod args;
mod config;
mod output;

use app::App;
use args::CliArgs;
use clap::Parser;
use color_eyre::Result;
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = CliArgs::parse();
    let config = Config::from_args(args);

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter().into()),
        )
        .init();

    let app = App::new(config);
    match app.run().await {
        Ok(true) => Ok(()),
        Ok(false) => std::process::exit(1),
        Err(error) => {
            app.print_error(&error);
            std::process::exit(1);
        }
    }
}

//! Main application entry point.

use canvasboard_cli::Cli;
use clap::Parser;

#[tokio::main]
async fn main() {
    env_logger::init();
    log::info!("Starting Canvasboard");

    let cli = Cli::parse();
    if let Err(err) = canvasboard_cli::run(cli).await {
        log::error!("{err}");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

//! Imagine automator
//!
//! Main entry point for the automator CLI and control server.

mod cli;
mod cmd_run;
mod cmd_state;
mod server;

use clap::Parser;
use tracing::info;

use automator_config::ConfigLoader;

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config_path = cli.config_path();

    if let Some(Commands::CheckConfig) = cli.command {
        return cmd_state::check_config(&config_path);
    }

    let mut config = ConfigLoader::load_or_default(&config_path)?;
    if let Some(cdp) = cli.cdp {
        config.browser.cdp_endpoint = cdp;
    }

    server::init_tracing(&config.logging)?;
    info!("Configuration loaded from {}", config_path.display());

    match cli.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
    }) {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            server::run_server(config).await
        }
        Commands::Media {
            images,
            aspect_ratio,
            output_folder,
            target,
        } => cmd_run::run_media(config, images, aspect_ratio, output_folder, target).await,
        Commands::Edit {
            prompts,
            prompts_file,
            delay,
            output_folder,
            target,
        } => {
            let prompts = cmd_run::collect_prompts(prompts, prompts_file.as_deref())?;
            cmd_run::run_edit(config, prompts, delay, output_folder, target).await
        }
        Commands::State => cmd_state::show_state(&config).await,
        Commands::CheckConfig => cmd_state::check_config(&config_path),
    }
}

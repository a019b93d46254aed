//! CLI definitions for the automator.

use std::path::PathBuf;

use automator_config::automator_home;
use automator_protocols::AspectRatio;
use clap::{Parser, Subcommand};

/// Imagine automator CLI.
#[derive(Parser)]
#[command(name = "automator")]
#[command(about = "Job-queue automator for the Grok Imagine video and edit UI")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (default: ~/.automator/config.toml)
    #[arg(short, long, env = "AUTOMATOR_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Chrome DevTools endpoint, overriding `[browser].cdp_endpoint`
    #[arg(long, env = "AUTOMATOR_CDP", global = true)]
    pub cdp: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| automator_home().join("config.toml"))
    }
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run the control API in the foreground (default)
    Serve {
        /// Server host, overriding `[server].host`
        #[arg(long)]
        host: Option<String>,

        /// Server port, overriding `[server].port`
        #[arg(long)]
        port: Option<u16>,
    },

    /// Turn images into videos, one after another
    Media {
        /// Image files, processed in order
        #[arg(required = true)]
        images: Vec<PathBuf>,

        /// Aspect ratio (2:3, 3:2, 1:1, 9:16, 16:9)
        #[arg(long)]
        aspect_ratio: Option<AspectRatio>,

        /// Output folder name for the exported videos
        #[arg(long)]
        output_folder: Option<String>,

        #[command(flatten)]
        target: RunTarget,
    },

    /// Submit edit prompts against the open image
    Edit {
        /// Prompts, submitted in order
        #[arg(short, long = "prompt")]
        prompts: Vec<String>,

        /// File with one prompt per line
        #[arg(long)]
        prompts_file: Option<PathBuf>,

        /// Seconds to wait between prompts
        #[arg(long)]
        delay: Option<u64>,

        /// Output folder name for the exported images
        #[arg(long)]
        output_folder: Option<String>,

        #[command(flatten)]
        target: RunTarget,
    },

    /// Show the persisted media job state
    State,

    /// Validate the configuration file
    CheckConfig,
}

/// Options shared by the one-shot run commands.
#[derive(clap::Args, Debug, Clone)]
pub(crate) struct RunTarget {
    /// DevTools target id of the tab (default: first tab on the generator page)
    #[arg(long)]
    pub tab: Option<String>,

    /// Leave artifacts unexported when the run ends
    #[arg(long)]
    pub no_export: bool,
}

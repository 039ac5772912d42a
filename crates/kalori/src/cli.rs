//! CLI - Command-line argument parsing
//!
//! Keeps argument parsing separate from execution logic.

use clap::{Parser, Subcommand};
use kalori_common::{CameraSource, KaloriConfig};
use std::path::PathBuf;

/// Kalori CLI
#[derive(Debug, Parser)]
#[command(name = "kalori")]
#[command(about = "Kalori - photograph a meal, get a calorie estimate", long_about = None)]
#[command(version)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Config file (overrides $KALORI_CONFIG and the default location)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Analysis endpoint URL
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand (if not provided, starts an interactive session)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Capture, preview and analyze photos interactively
    Session {
        /// V4L2 device node
        #[arg(long)]
        device: Option<PathBuf>,

        /// Use a still image instead of a camera
        #[arg(long, conflicts_with = "device")]
        photo: Option<PathBuf>,
    },

    /// Analyze an existing JPEG without the capture screens
    Analyze {
        /// Photo to upload
        photo: PathBuf,
    },

    /// Print the effective configuration
    Config {
        /// Write the configuration to the config path
        #[arg(long)]
        init: bool,

        /// Overwrite an existing file with --init
        #[arg(long, requires = "init")]
        force: bool,
    },
}

impl Cli {
    /// Fold command-line overrides into the loaded configuration
    pub fn apply_overrides(&self, config: &mut KaloriConfig) {
        if let Some(endpoint) = &self.endpoint {
            config.service.endpoint = endpoint.clone();
        }

        if let Some(Commands::Session { device, photo }) = &self.command {
            if let Some(device) = device {
                config.camera.source = CameraSource::V4l2;
                config.camera.device = device.clone();
            }
            if let Some(photo) = photo {
                config.camera.source = CameraSource::File;
                config.camera.photo = Some(photo.clone());
            }
        }
    }
}

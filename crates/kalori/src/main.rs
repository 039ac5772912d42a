//! Kalori - photograph a meal and ask the analysis service for its calories

use anyhow::{Context, Result};
use clap::Parser;
use kalori::cli::{Cli, Commands};
use kalori::errors::{
    EXIT_ANALYSIS_FAILED, EXIT_CAMERA_UNAVAILABLE, EXIT_GENERAL_ERROR, EXIT_NO_INPUT,
    EXIT_PERMISSION_DENIED, EXIT_SUCCESS,
};
use kalori::logging;
use kalori::spinner::Spinner;
use kalori::terminal::{print_alert, TerminalSurface};
use kalori_common::config::{config_path, CameraSource};
use kalori_common::presenter::LOADING_MESSAGE;
use kalori_common::{
    present, ConfigError, ConfiguredCamera, HttpUploadClient, KaloriConfig, Orchestrator,
    PhotoArtifact, SessionError, UploadOutcome, Uploader, VERSION,
};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

// Capture and upload are serialized by the session; one thread is enough
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("kalori: {:#}", e);
            EXIT_GENERAL_ERROR
        }
    };
    std::process::exit(code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    let path = cli.config.clone().or_else(config_path);
    let (mut config, load_error) = match path.as_deref() {
        Some(p) => match KaloriConfig::load_from(p) {
            Ok(config) => (config, None),
            Err(e) => (KaloriConfig::default(), Some(e)),
        },
        None => (KaloriConfig::default(), None),
    };
    cli.apply_overrides(&mut config);

    logging::init(&config.log.level, cli.verbose);
    if let Some(e) = load_error {
        warn!(error = %e, "Using default configuration");
    }
    info!(version = VERSION, endpoint = %config.service.endpoint, "Kalori starting");

    match cli.command {
        None => run_session(&config).await,
        Some(Commands::Session { .. }) => run_session(&config).await,
        Some(Commands::Analyze { photo }) => analyze(&config, &photo).await,
        Some(Commands::Config { init, force }) => show_config(&config, path, init, force),
    }
}

async fn run_session(config: &KaloriConfig) -> Result<i32> {
    if config.camera.source == CameraSource::File {
        if let Some(photo) = config.camera.photo.as_deref().filter(|p| !p.is_file()) {
            eprintln!("kalori: {}: no such photo", photo.display());
            return Ok(EXIT_NO_INPUT);
        }
    }

    let camera = match ConfiguredCamera::from_config(&config.camera) {
        Ok(camera) => camera,
        Err(e) => {
            error!(error = %e, "Camera setup failed");
            eprintln!("kalori: {}", e);
            return Ok(EXIT_CAMERA_UNAVAILABLE);
        }
    };
    let uploader =
        HttpUploadClient::new(&config.service.endpoint).context("Failed to create HTTP client")?;
    info!(camera = %camera.describe(), endpoint = uploader.endpoint(), "Session starting");

    let mut surface = TerminalSurface::new(camera.describe());
    let mut session = Orchestrator::new(camera, uploader);

    match session.run(&mut surface).await {
        Ok(()) => Ok(EXIT_SUCCESS),
        Err(SessionError::PermissionDenied) => Ok(EXIT_PERMISSION_DENIED),
    }
}

async fn analyze(config: &KaloriConfig, photo: &Path) -> Result<i32> {
    if !photo.is_file() {
        eprintln!("kalori: {}: no such photo", photo.display());
        return Ok(EXIT_NO_INPUT);
    }
    let uploader =
        HttpUploadClient::new(&config.service.endpoint).context("Failed to create HTTP client")?;

    let spinner = Spinner::new(LOADING_MESSAGE);
    let outcome = uploader.upload(&PhotoArtifact::jpeg(photo)).await;
    spinner.stop();

    if let UploadOutcome::Failure(e) = &outcome {
        error!(kind = e.kind(), error = %e, "Upload failed");
    }
    print_alert(&present(&outcome));

    Ok(if outcome.is_success() {
        EXIT_SUCCESS
    } else {
        EXIT_ANALYSIS_FAILED
    })
}

fn show_config(config: &KaloriConfig, path: Option<PathBuf>, init: bool, force: bool) -> Result<i32> {
    if !init {
        print!("{}", config.to_toml()?);
        return Ok(EXIT_SUCCESS);
    }

    let path = path.ok_or(ConfigError::NoConfigDir)?;
    if path.exists() && !force {
        println!("{} already exists (use --force to overwrite)", path.display());
        return Ok(EXIT_GENERAL_ERROR);
    }
    config.save_to(&path)?;
    println!("Wrote {}", path.display());
    Ok(EXIT_SUCCESS)
}

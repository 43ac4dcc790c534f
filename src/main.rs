//! WAV-to-MP3 converter
//!
//! Thin driver around the conversion library: reads the files named on the
//! command line, converts them sequentially and writes each artifact next to
//! the current working directory.

use std::path::Path;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mp3pipe::{Converter, ConverterConfig, InputFile, Result};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
const APP_NAME: &str = "mp3pipe";

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    tracing::info!("{} v{} starting", APP_NAME, VERSION);

    // Load configuration
    let config_path = "config.toml";
    let config = if Path::new(config_path).exists() {
        match ConverterConfig::from_file(config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(
                    "Failed to load config file {}: {}. Using defaults.",
                    config_path,
                    e
                );
                ConverterConfig::default()
            }
        }
    } else {
        ConverterConfig::default()
    };
    tracing::info!("Configuration loaded: {:?}", config);

    let paths: Vec<String> = std::env::args().skip(1).collect();
    if paths.is_empty() {
        tracing::info!("usage: {} <file.wav> [file.wav ...]", APP_NAME);
        return Ok(());
    }

    let converter = Converter::new(config)?;

    let mut inputs = Vec::with_capacity(paths.len());
    for path in &paths {
        match std::fs::read(path) {
            Ok(data) => {
                let name = Path::new(path)
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| path.clone());
                inputs.push(InputFile { name, data });
            }
            Err(e) => {
                // Unreadable inputs are skipped, like any other per-file failure.
                tracing::warn!(file = %path, error = %e, "cannot read input file");
            }
        }
    }

    let outcomes = converter.convert_batch(inputs).await;

    let mut converted = 0usize;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(display_name) => {
                if let Some(artifact) = converter.take_artifact(display_name) {
                    std::fs::write(&artifact.display_name, &artifact.data)?;
                    tracing::info!(
                        artifact = %artifact.display_name,
                        bytes = artifact.data.len(),
                        "artifact written"
                    );
                    converted += 1;
                }
            }
            Err(e) => {
                tracing::error!(file = %outcome.name, error = %e, "conversion failed");
            }
        }
    }

    tracing::info!(
        "{} of {} file(s) converted successfully",
        converted,
        outcomes.len()
    );

    Ok(())
}

/// Initialize logging with tracing
fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mp3pipe=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}

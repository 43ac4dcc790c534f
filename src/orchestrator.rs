//! Conversion orchestration
//!
//! Sequences one file end-to-end (decode, normalize, encode, assemble) and
//! runs multi-file batches strictly one file at a time. Failures are
//! contained per file: a bad input logs a failure event, drops its progress
//! record and never aborts the rest of the batch.

use bytes::{Bytes, BytesMut};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::config::ConverterConfig;
use crate::decode;
use crate::encoder::Mp3Encoder;
use crate::error::{ConvertError, Result};
use crate::pcm::PcmBuffer;
use crate::pipeline::{self, CancelFlag};
use crate::progress::ProgressTracker;

/// One input file: display name plus raw bytes.
#[derive(Debug, Clone)]
pub struct InputFile {
    pub name: String,
    pub data: Vec<u8>,
}

/// Finished conversion output, immutable after creation.
#[derive(Debug, Clone)]
pub struct OutputArtifact {
    pub display_name: String,
    pub data: Bytes,
}

/// Pipeline phase a file is in, used for event reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Pending,
    Decoding,
    Normalizing,
    Encoding,
    Completed,
    Failed,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Pending => "pending",
            Phase::Decoding => "decoding",
            Phase::Normalizing => "normalizing",
            Phase::Encoding => "encoding",
            Phase::Completed => "completed",
            Phase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Entry in the textual event log consumed by the presentation layer.
#[derive(Debug, Clone)]
pub struct ConversionEvent {
    pub file: String,
    pub phase: Phase,
    pub detail: String,
}

/// Result of one file within a batch.
#[derive(Debug)]
pub struct FileOutcome {
    pub name: String,
    pub result: std::result::Result<String, ConvertError>,
}

impl FileOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Derive the output artifact name from the input file name.
///
/// A trailing `.wav` extension (case-insensitive) becomes `.mp3`; any other
/// name is used unchanged.
pub fn output_name(input: &str) -> String {
    let stem_len = input
        .len()
        .checked_sub(4)
        .filter(|&i| input.is_char_boundary(i))
        .filter(|&i| input[i..].eq_ignore_ascii_case(".wav"));
    match stem_len {
        Some(i) => format!("{}.mp3", &input[..i]),
        None => input.to_string(),
    }
}

/// Drives conversions and owns the per-file progress records, the artifact
/// registry and the event log.
pub struct Converter {
    config: ConverterConfig,
    progress: Arc<ProgressTracker>,
    artifacts: DashMap<String, OutputArtifact>,
    events: Mutex<Vec<ConversionEvent>>,
    cancel: CancelFlag,
}

impl Converter {
    /// Create a converter, rejecting invalid configuration up front.
    pub fn new(config: ConverterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            progress: Arc::new(ProgressTracker::new()),
            artifacts: DashMap::new(),
            events: Mutex::new(Vec::new()),
            cancel: CancelFlag::new(),
        })
    }

    /// Create a converter with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ConverterConfig::default()).expect("default config is valid")
    }

    /// Progress records, shared with the presentation layer.
    pub fn progress(&self) -> Arc<ProgressTracker> {
        Arc::clone(&self.progress)
    }

    /// Cancellation handle for in-flight conversions.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Fetch a finished artifact by its display name.
    pub fn artifact(&self, display_name: &str) -> Option<OutputArtifact> {
        self.artifacts.get(display_name).map(|r| r.value().clone())
    }

    /// Remove and return a finished artifact.
    pub fn take_artifact(&self, display_name: &str) -> Option<OutputArtifact> {
        self.artifacts.remove(display_name).map(|(_, v)| v)
    }

    /// Number of registered artifacts.
    pub fn artifact_count(&self) -> usize {
        self.artifacts.len()
    }

    /// Snapshot of the event log.
    pub fn events(&self) -> Vec<ConversionEvent> {
        self.events.lock().clone()
    }

    fn push_event(&self, file: &str, phase: Phase, detail: impl Into<String>) {
        self.events.lock().push(ConversionEvent {
            file: file.to_string(),
            phase,
            detail: detail.into(),
        });
    }

    /// Convert one file end-to-end.
    ///
    /// On success the artifact is registered and the progress record is torn
    /// down after the configured grace period; on failure the progress record
    /// is removed immediately and the error is returned to the caller.
    pub async fn convert_file(&self, name: &str, data: &[u8]) -> Result<OutputArtifact> {
        match self.run_pipeline(name, data).await {
            Ok(artifact) => {
                self.artifacts
                    .insert(artifact.display_name.clone(), artifact.clone());
                self.progress
                    .clear_after(name.to_string(), self.config.progress_grace());
                self.push_event(name, Phase::Completed, artifact.display_name.clone());
                tracing::info!(
                    file = name,
                    artifact = %artifact.display_name,
                    bytes = artifact.data.len(),
                    "conversion completed"
                );
                Ok(artifact)
            }
            Err(err) => {
                self.progress.clear(name);
                self.push_event(name, Phase::Failed, err.to_string());
                tracing::warn!(file = name, error = %err, "conversion failed");
                Err(err)
            }
        }
    }

    /// Convert a batch of files strictly sequentially.
    ///
    /// Each file fully completes or fails before the next begins; one file's
    /// failure never aborts the batch.
    pub async fn convert_batch(&self, inputs: Vec<InputFile>) -> Vec<FileOutcome> {
        let mut outcomes = Vec::with_capacity(inputs.len());
        for input in inputs {
            self.push_event(&input.name, Phase::Pending, "queued");
            let result = self
                .convert_file(&input.name, &input.data)
                .await
                .map(|artifact| artifact.display_name);
            outcomes.push(FileOutcome {
                name: input.name,
                result,
            });
        }
        outcomes
    }

    async fn run_pipeline(&self, name: &str, data: &[u8]) -> Result<OutputArtifact> {
        tracing::debug!(file = name, bytes = data.len(), "decoding input");
        self.push_event(name, Phase::Decoding, "decoding input");
        let decoded = decode::decode_bytes(data, name)?;
        let sample_rate = decoded.sample_rate;

        tracing::debug!(
            file = name,
            channels = decoded.channels.len(),
            sample_rate,
            samples = decoded.len(),
            "normalizing PCM"
        );
        self.push_event(name, Phase::Normalizing, "normalizing PCM");
        let pcm = PcmBuffer::from_decoded(&decoded)?;
        drop(decoded);

        self.push_event(name, Phase::Encoding, "encoding MP3 stream");
        let encoder = Mp3Encoder::open(sample_rate, self.config.bitrate)?;
        let chunks =
            pipeline::encode_pcm(name, &pcm, encoder, &self.progress, &self.cancel).await?;

        // Chunks must be assembled in production order.
        let total: usize = chunks.iter().map(Bytes::len).sum();
        let mut assembled = BytesMut::with_capacity(total);
        for chunk in &chunks {
            assembled.extend_from_slice(chunk);
        }

        Ok(OutputArtifact {
            display_name: output_name(name),
            data: assembled.freeze(),
        })
    }
}

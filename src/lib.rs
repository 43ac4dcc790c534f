//! Streaming WAV-to-MP3 transcoding pipeline
//!
//! Converts decoded PCM audio into an MP3 bitstream in bounded-size chunks,
//! reporting per-file progress after every frame and yielding to the runtime
//! between frames so long encodes never block other work.
//!
//! Pipeline stages:
//! - [`decode`] - raw input bytes to per-channel f32 PCM (Symphonia)
//! - [`pcm`] - float samples to fixed-point 16-bit stereo buffers
//! - [`encoder`] - LAME-backed MP3 encoding of 1152-sample frames
//! - [`pipeline`] - the chunked, cooperatively-yielding encode loop
//! - [`progress`] - per-file progress records for the presentation layer
//! - [`orchestrator`] - end-to-end sequencing and batch failure isolation

pub mod config;
pub mod decode;
pub mod encoder;
pub mod error;
pub mod orchestrator;
pub mod pcm;
pub mod pipeline;
pub mod progress;

pub use config::{Bitrate, ConverterConfig};
pub use decode::{decode_bytes, DecodedAudio, DEFAULT_SAMPLE_RATE};
pub use encoder::{Mp3Encoder, FRAME_SIZE};
pub use error::{ConvertError, DecodeError, EncodeError, Result};
pub use orchestrator::{
    output_name, ConversionEvent, Converter, FileOutcome, InputFile, OutputArtifact, Phase,
};
pub use pcm::{normalize_channel, PcmBuffer};
pub use pipeline::CancelFlag;
pub use progress::{ConversionStatus, ProgressState, ProgressTracker};

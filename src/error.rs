use thiserror::Error;

/// Main error type for the conversion pipeline
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("conversion cancelled")]
    Cancelled,
}

/// Errors raised while decoding input bytes into PCM audio
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Wrapper around errors produced by the Symphonia decoding library.
    #[error(transparent)]
    Symphonia(#[from] symphonia::core::errors::Error),

    #[error("input stream does not provide a default track")]
    NoDefaultTrack,

    #[error("unsupported codec")]
    UnsupportedCodec,

    #[error("decoded stream contains no audio channels")]
    NoChannels,

    #[error("channel layout changed mid-stream: expected {expected} channels, got {got}")]
    ChannelLayoutChanged { expected: usize, got: usize },
}

/// Errors raised by the MP3 encoding engine
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("failed to initialize MP3 encoder: {0}")]
    EngineInit(String),

    #[error("failed to encode MP3 frame: {0}")]
    EncodeFrame(String),

    #[error("failed to finalize MP3 stream: {0}")]
    Flush(String),

    #[error("channel length mismatch: left={left}, right={right}")]
    ChannelMismatch { left: usize, right: usize },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ConvertError>;

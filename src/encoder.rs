//! MP3 encoder for the transcoding pipeline
//!
//! Wraps the LAME encoding engine to turn fixed-point PCM frames into MP3
//! bytes. One instance is opened per file and consumed by the final flush.

use bytes::Bytes;
use mp3lame_encoder::{Builder, DualPcm, FlushNoGap};

use crate::config::Bitrate;
use crate::error::EncodeError;

/// MP3 frame size (number of samples per channel per frame)
pub const FRAME_SIZE: usize = 1152;

/// Output channel count. The pipeline always feeds two channels; mono sources
/// arrive with the right channel aliasing the left.
const CHANNELS: u8 = 2;

impl From<Bitrate> for mp3lame_encoder::Bitrate {
    fn from(bitrate: Bitrate) -> Self {
        match bitrate {
            Bitrate::Kbps64 => mp3lame_encoder::Bitrate::Kbps64,
            Bitrate::Kbps96 => mp3lame_encoder::Bitrate::Kbps96,
            Bitrate::Kbps128 => mp3lame_encoder::Bitrate::Kbps128,
            Bitrate::Kbps160 => mp3lame_encoder::Bitrate::Kbps160,
            Bitrate::Kbps192 => mp3lame_encoder::Bitrate::Kbps192,
            Bitrate::Kbps256 => mp3lame_encoder::Bitrate::Kbps256,
            Bitrate::Kbps320 => mp3lame_encoder::Bitrate::Kbps320,
        }
    }
}

/// MP3 encoder backed by a LAME engine instance.
///
/// The engine buffers partial frames internally, so `encode_frame` calls must
/// be sequential over contiguous sample ranges and may legitimately return no
/// bytes. `flush` consumes the encoder, which makes the
/// exactly-once-after-all-frames contract a compile-time property.
pub struct Mp3Encoder {
    encoder: mp3lame_encoder::Encoder,
}

impl Mp3Encoder {
    /// Open an MP3 encoder at the given parameters.
    pub fn open(sample_rate: u32, bitrate: Bitrate) -> Result<Self, EncodeError> {
        let mut builder = Builder::new()
            .ok_or_else(|| EncodeError::EngineInit("cannot create LAME builder".to_string()))?;

        builder
            .set_num_channels(CHANNELS)
            .map_err(|e| EncodeError::EngineInit(format!("invalid channel count: {:?}", e)))?;
        builder
            .set_sample_rate(sample_rate)
            .map_err(|e| EncodeError::EngineInit(format!("invalid sample rate: {:?}", e)))?;
        builder
            .set_brate(bitrate.into())
            .map_err(|e| EncodeError::EngineInit(format!("invalid bitrate: {:?}", e)))?;
        builder
            .set_quality(mp3lame_encoder::Quality::Best)
            .map_err(|e| EncodeError::EngineInit(format!("invalid quality: {:?}", e)))?;

        let encoder = builder
            .build()
            .map_err(|e| EncodeError::EngineInit(format!("cannot open LAME encoder: {:?}", e)))?;

        Ok(Self { encoder })
    }

    /// Encode one PCM frame.
    ///
    /// Returns the encoded bytes, which may be empty while the engine is
    /// still buffering; an empty result is not a failure.
    pub fn encode_frame(&mut self, left: &[i16], right: &[i16]) -> Result<Bytes, EncodeError> {
        if left.len() != right.len() {
            return Err(EncodeError::ChannelMismatch {
                left: left.len(),
                right: right.len(),
            });
        }

        let input = DualPcm { left, right };
        let mut out: Vec<u8> =
            Vec::with_capacity(mp3lame_encoder::max_required_buffer_size(left.len()));
        let written = self
            .encoder
            .encode(input, out.spare_capacity_mut())
            .map_err(|e| EncodeError::EncodeFrame(format!("{:?}", e)))?;
        // SAFETY: LAME wrote exactly `written` bytes into the spare capacity.
        unsafe {
            out.set_len(written);
        }

        Ok(Bytes::from(out))
    }

    /// Finalize the stream, emitting any buffered trailing bytes.
    ///
    /// Consumes the encoder; the instance cannot be reused afterwards.
    pub fn flush(mut self) -> Result<Bytes, EncodeError> {
        let mut out: Vec<u8> =
            Vec::with_capacity(mp3lame_encoder::max_required_buffer_size(FRAME_SIZE));
        let written = self
            .encoder
            .flush::<FlushNoGap>(out.spare_capacity_mut())
            .map_err(|e| EncodeError::Flush(format!("{:?}", e)))?;
        // SAFETY: LAME wrote exactly `written` bytes into the spare capacity.
        unsafe {
            out.set_len(written);
        }

        Ok(Bytes::from(out))
    }
}

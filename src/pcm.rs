//! PCM normalization
//!
//! Converts decoded floating-point samples into the fixed-point 16-bit form
//! the MP3 encoder consumes.

use std::sync::Arc;

use crate::decode::DecodedAudio;
use crate::error::DecodeError;

/// Convert one channel of float samples to 16-bit signed integers.
///
/// Each sample is clamped to [-1.0, 1.0] and then scaled asymmetrically:
/// negative values by 32768, non-negative values by 32767. This uses the full
/// signed 16-bit range without overflowing on -1.0.
pub fn normalize_channel(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| {
            let s = s.clamp(-1.0, 1.0);
            if s < 0.0 {
                (s * 32768.0) as i16
            } else {
                (s * 32767.0) as i16
            }
        })
        .collect()
}

/// Fixed-point stereo PCM for one file's conversion.
///
/// Both channels always have identical length. For mono sources the right
/// channel is an `Arc` alias of the left, so the samples are shared rather
/// than duplicated.
#[derive(Debug, Clone)]
pub struct PcmBuffer {
    left: Arc<Vec<i16>>,
    right: Arc<Vec<i16>>,
}

impl PcmBuffer {
    /// Normalize a decoded source into a stereo PCM buffer.
    ///
    /// Channel 0 becomes the left channel and channel 1 the right; sources
    /// with more channels have the extras ignored, and mono sources reuse the
    /// left channel as the right without recomputation.
    pub fn from_decoded(audio: &DecodedAudio) -> Result<Self, DecodeError> {
        let Some(first) = audio.channels.first() else {
            return Err(DecodeError::NoChannels);
        };

        let left = Arc::new(normalize_channel(first));
        let right = match audio.channels.get(1) {
            Some(second) => Arc::new(normalize_channel(second)),
            None => Arc::clone(&left),
        };

        Ok(Self { left, right })
    }

    /// Left channel samples.
    pub fn left(&self) -> &[i16] {
        &self.left
    }

    /// Right channel samples.
    pub fn right(&self) -> &[i16] {
        &self.right
    }

    /// Number of samples per channel.
    pub fn len(&self) -> usize {
        self.left.len()
    }

    /// Whether the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }
}

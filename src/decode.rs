//! Audio decoding
//!
//! Thin adapter over Symphonia that turns raw input bytes into per-channel
//! float PCM. The container/codec machinery is consumed as a black box; the
//! rest of the pipeline only sees [`DecodedAudio`].

use std::io::Cursor;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::default::{get_codecs, get_probe};

use crate::error::DecodeError;

/// Sample rate assumed when the container does not report one.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Decoded PCM audio: one `Vec<f32>` per channel, all of equal length.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    pub channels: Vec<Vec<f32>>,
    pub sample_rate: u32,
}

impl DecodedAudio {
    /// Number of samples per channel.
    pub fn len(&self) -> usize {
        self.channels.first().map(Vec::len).unwrap_or(0)
    }

    /// Whether the audio holds no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Decode raw file bytes into per-channel f32 PCM.
///
/// `name` is only used as a probe hint (file extension); the bytes themselves
/// decide the actual format.
pub fn decode_bytes(data: &[u8], name: &str) -> Result<DecodedAudio, DecodeError> {
    let mut hint = Hint::new();
    if let Some(extension) = Path::new(name).extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(extension);
    }

    let mss = MediaSourceStream::new(Box::new(Cursor::new(data.to_vec())), Default::default());

    let probed = get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut reader = probed.format;

    let track = reader
        .default_track()
        .ok_or(DecodeError::NoDefaultTrack)?;
    if track.codec_params.codec == CODEC_TYPE_NULL {
        return Err(DecodeError::UnsupportedCodec);
    }

    let track_id = track.id;
    let sample_rate = track.codec_params.sample_rate.unwrap_or(DEFAULT_SAMPLE_RATE);
    let declared_channels = track
        .codec_params
        .channels
        .map(|ch| ch.count())
        .unwrap_or(1);

    let mut decoder = get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut channels: Vec<Vec<f32>> = Vec::new();
    loop {
        let packet = match reader.next_packet() {
            Ok(packet) => packet,
            // End of stream for packetized containers.
            Err(SymphoniaError::IoError(ref err))
                if err.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(err) => return Err(err.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                let channel_count = spec.channels.count();
                if channel_count == 0 {
                    return Err(DecodeError::NoChannels);
                }
                if channels.is_empty() {
                    channels = vec![Vec::new(); channel_count];
                } else if channel_count != channels.len() {
                    return Err(DecodeError::ChannelLayoutChanged {
                        expected: channels.len(),
                        got: channel_count,
                    });
                }

                let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                sample_buf.copy_interleaved_ref(decoded);
                // chunks_exact keeps all channels the same length even if a
                // malformed packet carries a partial trailing frame.
                for frame in sample_buf.samples().chunks_exact(channel_count) {
                    for (channel, sample) in channels.iter_mut().zip(frame) {
                        channel.push(*sample);
                    }
                }
            }
            // Corrupt packet; skip it and keep going.
            Err(SymphoniaError::DecodeError(_)) => continue,
            Err(err) => return Err(err.into()),
        }
    }

    // A valid but empty stream still reports its channel layout.
    if channels.is_empty() {
        channels = vec![Vec::new(); declared_channels.max(1)];
    }

    Ok(DecodedAudio {
        channels,
        sample_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_bytes_fail() {
        let result = decode_bytes(&[0xde, 0xad, 0xbe, 0xef, 0x00, 0x01], "junk.wav");
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_input_fails() {
        assert!(decode_bytes(&[], "empty.wav").is_err());
    }

    #[test]
    fn test_decoded_audio_len() {
        let audio = DecodedAudio {
            channels: vec![vec![0.0; 10], vec![0.0; 10]],
            sample_rate: 48_000,
        };
        assert_eq!(audio.len(), 10);
        assert!(!audio.is_empty());

        let silent = DecodedAudio {
            channels: vec![Vec::new()],
            sample_rate: DEFAULT_SAMPLE_RATE,
        };
        assert_eq!(silent.len(), 0);
        assert!(silent.is_empty());
    }
}

//! Chunked encode loop
//!
//! Slices normalized PCM into fixed-size frames, feeds them to the MP3
//! encoder and yields to the runtime after every frame so long encodes never
//! monopolize the task. Encoded chunks are returned in strict frame order;
//! concatenating them (flush tail included) yields the final MP3 stream.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;

use crate::encoder::{Mp3Encoder, FRAME_SIZE};
use crate::error::{ConvertError, Result};
use crate::pcm::PcmBuffer;
use crate::progress::ProgressTracker;

/// Cooperative cancellation flag, checked once per frame.
///
/// A freshly constructed flag is never set, so by default a conversion runs
/// to completion or failure.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; takes effect at the next frame boundary.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Number of frames needed to cover `samples` samples.
pub(crate) fn frame_count(samples: usize) -> usize {
    samples.div_ceil(FRAME_SIZE)
}

/// Run the encode loop over one file's PCM buffer.
///
/// For each 1152-sample frame: encode, collect any produced bytes, report
/// progress, then yield. The final frame may be shorter than 1152 samples
/// and an empty buffer is legal (zero iterations, flush only). The encoder
/// is consumed by the terminal flush, whose output becomes the last chunk.
pub async fn encode_pcm(
    name: &str,
    pcm: &PcmBuffer,
    mut encoder: Mp3Encoder,
    progress: &ProgressTracker,
    cancel: &CancelFlag,
) -> Result<Vec<Bytes>> {
    let total = pcm.len();
    progress.start(name, total as u64);
    tracing::debug!(file = name, samples = total, frames = frame_count(total), "encode loop starting");

    let mut chunks = Vec::with_capacity(frame_count(total) + 1);
    let mut start = 0usize;
    while start < total {
        if cancel.is_cancelled() {
            return Err(ConvertError::Cancelled);
        }

        let end = (start + FRAME_SIZE).min(total);
        let chunk = encoder.encode_frame(&pcm.left()[start..end], &pcm.right()[start..end])?;
        if !chunk.is_empty() {
            chunks.push(chunk);
        }

        progress.update(name, end as u64, total as u64);
        start = end;

        // Hand control back to the runtime between frames.
        tokio::task::yield_now().await;
    }

    let tail = encoder.flush()?;
    if !tail.is_empty() {
        chunks.push(tail);
    }

    Ok(chunks)
}

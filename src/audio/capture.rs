//! Microphone capture via `cpal`.
//!
//! [`AudioCapture`] owns the default input device.  [`AudioCapture::start`]
//! streams [`AudioChunk`]s over an mpsc channel until the returned
//! [`StreamHandle`] is dropped.

use std::sync::mpsc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use thiserror::Error;

// ---------------------------------------------------------------------------
// AudioChunk
// ---------------------------------------------------------------------------

/// One callback's worth of interleaved `f32` samples in `[-1.0, 1.0]`.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    pub samples: Vec<f32>,
    /// Device rate in Hz (commonly 44100 or 48000).
    pub sample_rate: u32,
    pub channels: u16,
}

// ---------------------------------------------------------------------------
// StreamHandle
// ---------------------------------------------------------------------------

/// Keeps the cpal stream alive; dropping it stops the microphone.
pub struct StreamHandle {
    _stream: cpal::Stream,
}

// ---------------------------------------------------------------------------
// CaptureError
// ---------------------------------------------------------------------------

/// Failures while recording or packaging a recording.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no microphone found on the default audio host")]
    NoDevice,

    #[error("failed to query default input config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("failed to resample recording: {0}")]
    Resample(String),

    #[error("failed to encode recording: {0}")]
    Encode(#[from] hound::Error),

    #[error("recording worker stopped unexpectedly")]
    Worker,
}

// ---------------------------------------------------------------------------
// AudioCapture
// ---------------------------------------------------------------------------

/// The system default input device and its preferred stream config.
///
/// ```rust,no_run
/// use std::sync::mpsc;
/// use english_buddy::audio::{AudioCapture, AudioChunk};
///
/// let (tx, rx) = mpsc::channel::<AudioChunk>();
/// let capture = AudioCapture::new().unwrap();
/// let handle = capture.start(tx).unwrap();
/// let first = rx.recv().unwrap();
/// drop(handle);
/// println!("{} samples @ {} Hz", first.samples.len(), first.sample_rate);
/// ```
pub struct AudioCapture {
    device: cpal::Device,
    config: cpal::StreamConfig,
    sample_rate: u32,
    channels: u16,
}

impl AudioCapture {
    /// Open the default input device.
    ///
    /// # Errors
    ///
    /// [`CaptureError::NoDevice`] when the host has no microphone, or
    /// [`CaptureError::DefaultConfig`] when it cannot report a format.
    pub fn new() -> Result<Self, CaptureError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(CaptureError::NoDevice)?;

        let supported = device.default_input_config()?;
        let channels = supported.channels();
        let sample_rate = supported.sample_rate().0;

        if let Ok(name) = device.name() {
            log::info!("microphone: {name} ({sample_rate} Hz, {channels} ch)");
        }

        Ok(Self {
            device,
            config: supported.into(),
            sample_rate,
            channels,
        })
    }

    /// Start streaming chunks to `tx`.
    ///
    /// Send errors are ignored; the receiver going away just means nobody is
    /// listening any more.
    pub fn start(&self, tx: mpsc::Sender<AudioChunk>) -> Result<StreamHandle, CaptureError> {
        let sample_rate = self.sample_rate;
        let channels = self.channels;

        let stream = self.device.build_input_stream(
            &self.config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let _ = tx.send(AudioChunk {
                    samples: data.to_vec(),
                    sample_rate,
                    channels,
                });
            },
            |err: cpal::StreamError| {
                log::error!("cpal stream error: {err}");
            },
            None,
        )?;

        stream.play()?;
        Ok(StreamHandle { _stream: stream })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_chunk_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<AudioChunk>();
    }

    #[test]
    fn capture_error_messages_are_user_readable() {
        assert_eq!(
            CaptureError::NoDevice.to_string(),
            "no microphone found on the default audio host"
        );
        assert_eq!(
            CaptureError::Worker.to_string(),
            "recording worker stopped unexpectedly"
        );
    }
}

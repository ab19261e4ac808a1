//! Push-to-record: microphone on, microphone off, WAV bytes out.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use super::capture::{AudioCapture, AudioChunk, CaptureError, StreamHandle};
use super::format::RECORDING_FORMAT;
use super::resample::{resample, stereo_to_mono, to_pcm16};
use super::wav::encode_wav;

// ---------------------------------------------------------------------------
// SampleAccumulator
// ---------------------------------------------------------------------------

/// Collects mono samples at the device rate, up to `max_secs` of audio.
pub struct SampleAccumulator {
    mono: Vec<f32>,
    source_rate: u32,
    max_secs: f32,
    max_samples: usize,
}

impl SampleAccumulator {
    pub fn new(source_rate: u32, max_secs: f32) -> Self {
        let max_secs = max_secs.max(0.0);
        Self {
            mono: Vec::new(),
            source_rate,
            max_secs,
            max_samples: (source_rate as f32 * max_secs) as usize,
        }
    }

    /// Downmix `chunk` and append what still fits.
    pub fn push(&mut self, chunk: &AudioChunk) {
        if self.is_full() {
            return;
        }
        let room = self.max_samples - self.mono.len();

        let mono = stereo_to_mono(&chunk.samples, chunk.channels);
        if mono.len() > room {
            log::info!("recording reached {:.0}s limit, truncating", self.max_secs);
        }
        self.mono.extend(mono.into_iter().take(room));
    }

    pub fn is_full(&self) -> bool {
        self.mono.len() >= self.max_samples
    }

    pub fn duration_secs(&self) -> f32 {
        if self.source_rate == 0 {
            return 0.0;
        }
        self.mono.len() as f32 / self.source_rate as f32
    }

    /// Resample to the recording format and encode as WAV.
    pub fn finish(self) -> Result<Vec<u8>, CaptureError> {
        let mut samples = resample(&self.mono, self.source_rate, RECORDING_FORMAT.sample_rate)?;
        let max_out = (RECORDING_FORMAT.sample_rate as f32 * self.max_secs) as usize;
        samples.truncate(max_out);
        encode_wav(&to_pcm16(&samples), RECORDING_FORMAT)
    }
}

// ---------------------------------------------------------------------------
// Recorder
// ---------------------------------------------------------------------------

/// A running microphone recording.
///
/// Chunks are drained on a background thread so the cpal callback never
/// blocks.  [`Recorder::stop`] releases the microphone right away; the
/// returned [`StoppedRecording`] does the slow part (join, resample, encode)
/// and can be moved to a blocking worker.
pub struct Recorder {
    handle: Option<StreamHandle>,
    stop: Arc<AtomicBool>,
    worker: Option<thread::JoinHandle<SampleAccumulator>>,
    started: Instant,
}

impl Recorder {
    /// Open the default microphone and start recording.
    pub fn start(max_secs: f32) -> Result<Self, CaptureError> {
        let capture = AudioCapture::new()?;
        let (tx, rx) = mpsc::channel::<AudioChunk>();
        let handle = capture.start(tx)?;

        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let mut acc = SampleAccumulator::new(capture.sample_rate(), max_secs);

        let worker = thread::Builder::new()
            .name("recorder".into())
            .spawn(move || {
                loop {
                    match rx.recv_timeout(Duration::from_millis(50)) {
                        Ok(chunk) => acc.push(&chunk),
                        Err(RecvTimeoutError::Timeout) if flag.load(Ordering::Acquire) => break,
                        Err(RecvTimeoutError::Timeout) => {}
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                while let Ok(chunk) = rx.try_recv() {
                    acc.push(&chunk);
                }
                acc
            })
            .map_err(|_| CaptureError::Worker)?;

        log::info!("recording started (limit {max_secs:.0}s)");

        Ok(Self {
            handle: Some(handle),
            stop,
            worker: Some(worker),
            started: Instant::now(),
        })
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Stop the microphone.  Cheap; call from the UI thread.
    pub fn stop(mut self) -> StoppedRecording {
        drop(self.handle.take());
        self.stop.store(true, Ordering::Release);
        StoppedRecording {
            worker: self.worker.take(),
        }
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        self.handle.take();
        self.stop.store(true, Ordering::Release);
    }
}

// ---------------------------------------------------------------------------
// StoppedRecording
// ---------------------------------------------------------------------------

/// A recording whose microphone is closed but whose samples are not yet
/// encoded.
pub struct StoppedRecording {
    worker: Option<thread::JoinHandle<SampleAccumulator>>,
}

impl StoppedRecording {
    /// Wait for the drain thread, then resample and encode.  Blocking.
    pub fn into_wav(mut self) -> Result<Vec<u8>, CaptureError> {
        let acc = self
            .worker
            .take()
            .ok_or(CaptureError::Worker)?
            .join()
            .map_err(|_| CaptureError::Worker)?;

        log::info!("recording stopped after {:.1}s of audio", acc.duration_secs());
        acc.finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn chunk(len: usize, rate: u32, channels: u16) -> AudioChunk {
        AudioChunk {
            samples: vec![0.25; len],
            sample_rate: rate,
            channels,
        }
    }

    fn decoded_len(wav: Vec<u8>) -> u32 {
        hound::WavReader::new(Cursor::new(wav)).unwrap().len()
    }

    #[test]
    fn accumulates_mono_samples() {
        let mut acc = SampleAccumulator::new(44_100, 10.0);
        acc.push(&chunk(882, 44_100, 2));
        assert!((acc.duration_secs() - 0.01).abs() < 1e-6);
        assert!(!acc.is_full());
    }

    #[test]
    fn truncates_at_max_duration() {
        let mut acc = SampleAccumulator::new(48_000, 1.0);
        for _ in 0..4 {
            acc.push(&chunk(48_000, 48_000, 2));
        }
        assert!(acc.is_full());
        assert!((acc.duration_secs() - 1.0).abs() < 1e-6);

        assert_eq!(decoded_len(acc.finish().unwrap()), 44_100);
    }

    #[test]
    fn finish_resamples_to_recording_rate() {
        let mut acc = SampleAccumulator::new(48_000, 60.0);
        acc.push(&chunk(24_000, 48_000, 1));

        let wav = acc.finish().unwrap();
        let reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
        assert_eq!(reader.spec().sample_rate, 44_100);
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.len(), 22_050);
    }

    #[test]
    fn stopped_recording_encodes_drained_samples() {
        let worker = thread::spawn(|| {
            let mut acc = SampleAccumulator::new(44_100, 10.0);
            acc.push(&chunk(4_410, 44_100, 1));
            acc
        });
        let stopped = StoppedRecording {
            worker: Some(worker),
        };

        assert_eq!(decoded_len(stopped.into_wav().unwrap()), 4_410);
    }

    #[test]
    fn stopped_recording_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<StoppedRecording>();
    }

    #[test]
    fn empty_recording_is_header_only() {
        let wav = SampleAccumulator::new(44_100, 5.0).finish().unwrap();
        assert_eq!(wav.len(), 44);
    }
}

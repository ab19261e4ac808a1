//! Audio path for spoken input: microphone → mono → 44.1 kHz → 16-bit WAV.
//!
//! ```text
//! cpal callback → AudioChunk (mpsc) → SampleAccumulator
//!              → resample → to_pcm16 → encode_wav → Vec<u8>
//! ```
//!
//! The resulting buffer is what the transcription adapter receives.

pub mod capture;
pub mod format;
pub mod recorder;
pub mod resample;
pub mod wav;

pub use capture::{AudioCapture, AudioChunk, CaptureError, StreamHandle};
pub use format::{RecordingFormat, RECORDING_FORMAT};
pub use recorder::{Recorder, SampleAccumulator, StoppedRecording};
pub use resample::{resample, stereo_to_mono, to_pcm16};
pub use wav::encode_wav;

//! Turns a recorded audio buffer into text.
//!
//! The adapter rejects recordings that are obviously too short before any
//! provider call, stages the rest in a temporary `.wav` file, and removes
//! that file again whether or not transcription succeeds.

use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::audio::RECORDING_FORMAT;

use super::engine::SttEngine;

// ---------------------------------------------------------------------------
// TranscriptionError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TranscriptionError {
    /// Estimated duration is under the minimum; no provider call was made.
    #[error("Recording is too short ({duration_secs:.1}s). Please speak for at least {min_secs:.1}s.")]
    TooShort { duration_secs: f64, min_secs: f64 },

    #[error("Transcription failed: {0}")]
    ProviderError(String),
}

// ---------------------------------------------------------------------------
// Transcriber trait
// ---------------------------------------------------------------------------

/// What the session needs from speech recognition.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(
        &self,
        audio: &[u8],
        min_duration_secs: f64,
    ) -> Result<String, TranscriptionError>;
}

// ---------------------------------------------------------------------------
// TranscriptionAdapter
// ---------------------------------------------------------------------------

/// Expects buffers in [`RECORDING_FORMAT`].
pub struct TranscriptionAdapter {
    engine: Arc<dyn SttEngine>,
}

impl TranscriptionAdapter {
    pub fn new(engine: Arc<dyn SttEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl Transcriber for TranscriptionAdapter {
    async fn transcribe(
        &self,
        audio: &[u8],
        min_duration_secs: f64,
    ) -> Result<String, TranscriptionError> {
        let duration_secs = RECORDING_FORMAT.estimate_duration_secs(audio.len());
        if duration_secs < min_duration_secs {
            log::info!("recording rejected: {duration_secs:.2}s < {min_duration_secs:.2}s");
            return Err(TranscriptionError::TooShort {
                duration_secs,
                min_secs: min_duration_secs,
            });
        }

        let bytes = audio.to_vec();
        let staged = tokio::task::spawn_blocking(move || stage(&bytes))
            .await
            .map_err(|e| TranscriptionError::ProviderError(e.to_string()))?
            .map_err(|e| TranscriptionError::ProviderError(format!("staging audio: {e}")))?;

        log::debug!("staged {} bytes at {}", audio.len(), staged.path().display());

        let result = self.engine.transcribe_file(staged.path()).await;

        if let Err(e) = staged.close() {
            log::warn!("failed to remove staged audio: {e}");
        }

        let text = result.map_err(|e| TranscriptionError::ProviderError(e.to_string()))?;
        let text = text.trim();
        if text.is_empty() {
            return Err(TranscriptionError::ProviderError(
                "no speech was recognised".into(),
            ));
        }
        Ok(text.to_string())
    }
}

/// Write `audio` to a fresh temp file that is deleted when dropped.
fn stage(audio: &[u8]) -> std::io::Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("english-buddy-")
        .suffix(".wav")
        .tempfile()?;
    file.write_all(audio)?;
    file.flush()?;
    Ok(file)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stt::SttError;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    /// Records every staged path and whether the file existed during the call.
    struct RecordingEngine {
        response: Result<String, SttError>,
        seen: Mutex<Vec<(PathBuf, bool, usize)>>,
    }

    impl RecordingEngine {
        fn new(response: Result<String, SttError>) -> Arc<Self> {
            Arc::new(Self {
                response,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(PathBuf, bool, usize)> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SttEngine for RecordingEngine {
        async fn transcribe_file(&self, path: &Path) -> Result<String, SttError> {
            let len = std::fs::metadata(path).map(|m| m.len() as usize).unwrap_or(0);
            self.seen
                .lock()
                .unwrap()
                .push((path.to_path_buf(), path.exists(), len));
            self.response.clone()
        }
    }

    fn seconds(secs: f64) -> Vec<u8> {
        vec![0u8; (44_100.0 * 2.0 * secs) as usize]
    }

    #[tokio::test]
    async fn half_second_is_too_short_without_provider_call() {
        let engine = RecordingEngine::new(Ok("hello".into()));
        let adapter = TranscriptionAdapter::new(engine.clone());

        let err = adapter.transcribe(&seconds(0.5), 1.0).await.unwrap_err();

        match err {
            TranscriptionError::TooShort {
                duration_secs,
                min_secs,
            } => {
                assert!((duration_secs - 0.5).abs() < 1e-9);
                assert!((min_secs - 1.0).abs() < 1e-9);
            }
            other => panic!("expected TooShort, got {other:?}"),
        }
        assert!(engine.calls().is_empty());
    }

    #[tokio::test]
    async fn one_and_a_half_seconds_reaches_provider() {
        let engine = RecordingEngine::new(Ok("  I went to school.  ".into()));
        let adapter = TranscriptionAdapter::new(engine.clone());
        let audio = seconds(1.5);

        let text = adapter.transcribe(&audio, 1.0).await.unwrap();

        assert_eq!(text, "I went to school.");
        let calls = engine.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].1, "staged file should exist during the call");
        assert_eq!(calls[0].2, audio.len());
    }

    #[tokio::test]
    async fn exact_minimum_is_accepted() {
        let engine = RecordingEngine::new(Ok("ok".into()));
        let adapter = TranscriptionAdapter::new(engine.clone());
        assert!(adapter.transcribe(&seconds(1.0), 1.0).await.is_ok());
    }

    #[tokio::test]
    async fn exact_fractional_minimum_is_accepted() {
        let engine = RecordingEngine::new(Ok("ok".into()));
        let adapter = TranscriptionAdapter::new(engine.clone());

        // 97_020 bytes is exactly 1.1 s at 44.1 kHz 16-bit mono.
        let audio = vec![0u8; 97_020];
        assert!(adapter.transcribe(&audio, 1.1).await.is_ok());
        assert_eq!(engine.calls().len(), 1);

        let err = adapter.transcribe(&audio[..97_018], 1.1).await.unwrap_err();
        assert!(matches!(err, TranscriptionError::TooShort { .. }));
    }

    #[tokio::test]
    async fn staged_file_is_removed_after_success() {
        let engine = RecordingEngine::new(Ok("hello".into()));
        let adapter = TranscriptionAdapter::new(engine.clone());

        adapter.transcribe(&seconds(1.5), 1.0).await.unwrap();

        let (path, _, _) = engine.calls().remove(0);
        assert!(path.extension().is_some_and(|e| e == "wav"));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn staged_file_is_removed_after_failure() {
        let engine = RecordingEngine::new(Err(SttError::Status {
            status: 500,
            body: "down".into(),
        }));
        let adapter = TranscriptionAdapter::new(engine.clone());

        let err = adapter.transcribe(&seconds(1.5), 1.0).await.unwrap_err();

        assert!(matches!(err, TranscriptionError::ProviderError(_)));
        let (path, existed, _) = engine.calls().remove(0);
        assert!(existed);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn blank_transcript_is_provider_error() {
        let engine = RecordingEngine::new(Ok("   ".into()));
        let adapter = TranscriptionAdapter::new(engine);
        assert!(matches!(
            adapter.transcribe(&seconds(2.0), 1.0).await,
            Err(TranscriptionError::ProviderError(_))
        ));
    }

    #[test]
    fn too_short_message_names_both_durations() {
        let msg = TranscriptionError::TooShort {
            duration_secs: 0.5,
            min_secs: 1.0,
        }
        .to_string();
        assert!(msg.contains("0.5s"));
        assert!(msg.contains("1.0s"));
    }
}

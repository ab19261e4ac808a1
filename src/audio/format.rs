//! The fixed recording format and the duration heuristic built on it.

/// Sample layout of every recording handed to the transcription adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordingFormat {
    /// Samples per second.
    pub sample_rate: u32,
    /// Bits per sample (signed PCM).
    pub bits_per_sample: u16,
    /// Interleaved channels.
    pub channels: u16,
}

/// 44.1 kHz, 16-bit, mono.
pub const RECORDING_FORMAT: RecordingFormat = RecordingFormat {
    sample_rate: 44_100,
    bits_per_sample: 16,
    channels: 1,
};

impl RecordingFormat {
    pub fn bytes_per_sample(&self) -> u32 {
        u32::from(self.bits_per_sample / 8)
    }

    /// Estimated duration of a buffer of `byte_len` bytes:
    /// `byte_len / (sample_rate * bytes_per_sample)`.
    ///
    /// This is a heuristic, not a decode: container headers are counted as
    /// audio and channels are not divided out.
    ///
    /// ```
    /// use english_buddy::audio::RECORDING_FORMAT;
    ///
    /// let one_second = 44_100 * 2;
    /// assert!((RECORDING_FORMAT.estimate_duration_secs(one_second) - 1.0).abs() < 1e-9);
    /// ```
    pub fn estimate_duration_secs(&self, byte_len: usize) -> f64 {
        let bytes_per_sec = f64::from(self.sample_rate) * f64::from(self.bytes_per_sample());
        byte_len as f64 / bytes_per_sec
    }
}

impl Default for RecordingFormat {
    fn default() -> Self {
        RECORDING_FORMAT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_format_is_cd_mono() {
        assert_eq!(RECORDING_FORMAT.sample_rate, 44_100);
        assert_eq!(RECORDING_FORMAT.bytes_per_sample(), 2);
        assert_eq!(RECORDING_FORMAT.channels, 1);
    }

    #[test]
    fn half_and_one_and_a_half_seconds() {
        let half = (44_100.0 * 2.0 * 0.5) as usize;
        let one_and_half = (44_100.0 * 2.0 * 1.5) as usize;

        assert!((RECORDING_FORMAT.estimate_duration_secs(half) - 0.5).abs() < 1e-9);
        assert!((RECORDING_FORMAT.estimate_duration_secs(one_and_half) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn empty_buffer_is_zero_seconds() {
        assert_eq!(RECORDING_FORMAT.estimate_duration_secs(0), 0.0);
    }
}

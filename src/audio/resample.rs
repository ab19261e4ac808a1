//! Channel mixing, resampling and sample conversion.
//!
//! Recordings must end up as **44.1 kHz mono `i16`**.  The device usually
//! delivers interleaved `f32` at 44.1 or 48 kHz, so the path is:
//!
//! 1. [`stereo_to_mono`] downmixes interleaved channels.
//! 2. [`resample`] converts to the target rate (rubato, FFT based).
//! 3. [`to_pcm16`] clamps and converts to signed 16-bit.

use rubato::{FftFixedIn, Resampler};

use super::capture::CaptureError;

// ---------------------------------------------------------------------------
// stereo_to_mono
// ---------------------------------------------------------------------------

/// Mix interleaved multi-channel audio down to mono by averaging all channels.
///
/// The output length is `samples.len() / channels`; a trailing partial frame
/// is dropped.  `channels == 0` yields an empty vector.
///
/// ```rust
/// use english_buddy::audio::stereo_to_mono;
///
/// let stereo = vec![0.5_f32, -0.5, 0.2, -0.2]; // L R L R
/// let mono = stereo_to_mono(&stereo, 2);
/// assert_eq!(mono.len(), 2);
/// assert!((mono[0] - 0.0).abs() < 1e-6);
/// ```
pub fn stereo_to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.to_vec(),
        n => {
            let n = n as usize;
            samples
                .chunks_exact(n)
                .map(|frame| frame.iter().sum::<f32>() / n as f32)
                .collect()
        }
    }
}

// ---------------------------------------------------------------------------
// resample
// ---------------------------------------------------------------------------

const CHUNK: usize = 1024;
const SUB_CHUNKS: usize = 2;

/// Resample mono `samples` from `source_rate` Hz to `target_rate` Hz with
/// rubato's FFT resampler.
///
/// The resampler's group delay is removed and the output is exactly
/// `ceil(len * target_rate / source_rate)` samples long.  Equal rates return
/// a copy; an empty input returns an empty vector.
///
/// ```rust
/// use english_buddy::audio::resample;
///
/// let hi = vec![0.5_f32; 480]; // 10 ms @ 48 kHz
/// let lo = resample(&hi, 48_000, 44_100).unwrap();
/// assert_eq!(lo.len(), 441);
/// ```
pub fn resample(
    samples: &[f32],
    source_rate: u32,
    target_rate: u32,
) -> Result<Vec<f32>, CaptureError> {
    if source_rate == target_rate {
        return Ok(samples.to_vec());
    }
    if samples.is_empty() {
        return Ok(Vec::new());
    }
    if source_rate == 0 || target_rate == 0 {
        return Err(CaptureError::Resample(format!(
            "invalid rates {source_rate} -> {target_rate}"
        )));
    }

    let mut resampler = FftFixedIn::<f32>::new(
        source_rate as usize,
        target_rate as usize,
        CHUNK,
        SUB_CHUNKS,
        1,
    )
    .map_err(|e| CaptureError::Resample(e.to_string()))?;

    let expected =
        (samples.len() as f64 * target_rate as f64 / source_rate as f64).ceil() as usize;
    let delay = resampler.output_delay();
    let mut out = Vec::with_capacity(expected + delay + CHUNK);

    // Trailing blocks are zero-padded until the delayed tail has been flushed.
    let mut pos = 0;
    while out.len() < expected + delay {
        let mut block = vec![0.0_f32; CHUNK];
        if pos < samples.len() {
            let end = (pos + CHUNK).min(samples.len());
            block[..end - pos].copy_from_slice(&samples[pos..end]);
        }
        pos += CHUNK;

        let frames = resampler
            .process(&[block], None)
            .map_err(|e| CaptureError::Resample(e.to_string()))?;
        out.extend_from_slice(&frames[0]);
    }

    out.drain(..delay);
    out.truncate(expected);
    Ok(out)
}

// ---------------------------------------------------------------------------
// to_pcm16
// ---------------------------------------------------------------------------

/// Convert `[-1.0, 1.0]` floats to signed 16-bit PCM, clamping overshoot.
pub fn to_pcm16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stereo_to_mono_already_mono() {
        let input = vec![0.1_f32, 0.2, 0.3];
        assert_eq!(stereo_to_mono(&input, 1), input);
    }

    #[test]
    fn stereo_to_mono_two_channel() {
        let out = stereo_to_mono(&[1.0_f32, -1.0, 0.5, 0.5], 2);
        assert_eq!(out.len(), 2);
        assert!((out[0] - 0.0).abs() < 1e-6);
        assert!((out[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn stereo_to_mono_drops_partial_frame() {
        let out = stereo_to_mono(&[0.2_f32, 0.2, 0.9], 2);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn stereo_to_mono_zero_channels() {
        assert!(stereo_to_mono(&[1.0_f32, 2.0], 0).is_empty());
    }

    #[test]
    fn resample_same_rate_is_noop() {
        let input: Vec<f32> = (0..441).map(|i| i as f32 / 441.0).collect();
        assert_eq!(resample(&input, 44_100, 44_100).unwrap(), input);
    }

    #[test]
    fn resample_empty_input() {
        assert!(resample(&[], 48_000, 44_100).unwrap().is_empty());
    }

    #[test]
    fn resample_one_second_48k_to_44k() {
        let out = resample(&vec![0.0_f32; 48_000], 48_000, 44_100).unwrap();
        assert_eq!(out.len(), 44_100);
    }

    #[test]
    fn resample_upsample_from_22k() {
        let out = resample(&vec![0.0_f32; 2_205], 22_050, 44_100).unwrap();
        assert_eq!(out.len(), 4_410);
    }

    #[test]
    fn resample_constant_signal_keeps_amplitude_in_the_middle() {
        let out = resample(&vec![0.5_f32; 48_000], 48_000, 44_100).unwrap();
        let middle = &out[out.len() / 4..out.len() * 3 / 4];
        for &s in middle {
            assert!((s - 0.5).abs() < 0.02, "amplitude drift: {s}");
        }
    }

    #[test]
    fn pcm16_clamps_and_scales() {
        assert_eq!(to_pcm16(&[0.0, 1.0, -1.0, 2.0, -2.0]), vec![
            0,
            i16::MAX,
            -i16::MAX,
            i16::MAX,
            -i16::MAX
        ]);
    }
}

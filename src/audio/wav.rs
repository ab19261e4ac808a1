//! In-memory WAV encoding of finished recordings.

use std::io::Cursor;

use super::capture::CaptureError;
use super::format::RecordingFormat;

/// Encode 16-bit PCM `samples` as a RIFF/WAV byte buffer in `format`.
///
/// ```rust
/// use english_buddy::audio::{encode_wav, RECORDING_FORMAT};
///
/// let wav = encode_wav(&[0i16; 100], RECORDING_FORMAT).unwrap();
/// assert_eq!(&wav[..4], b"RIFF");
/// assert_eq!(wav.len(), 44 + 200);
/// ```
pub fn encode_wav(samples: &[i16], format: RecordingFormat) -> Result<Vec<u8>, CaptureError> {
    let spec = hound::WavSpec {
        channels: format.channels,
        sample_rate: format.sample_rate,
        bits_per_sample: format.bits_per_sample,
        sample_format: hound::SampleFormat::Int,
    };

    let mut bytes = Vec::with_capacity(44 + samples.len() * 2);
    {
        let mut writer = hound::WavWriter::new(Cursor::new(&mut bytes), spec)?;
        for &s in samples {
            writer.write_sample(s)?;
        }
        writer.finalize()?;
    }
    Ok(bytes)
}

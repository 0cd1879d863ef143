//! Decoding audio files into mono sample buffers.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::AudioError;

/// Fully decoded mono audio
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    /// Mono samples in [-1, 1]
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl DecodedAudio {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_s(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Decode a file, using its extension as a container hint
pub fn decode_file(path: &Path) -> Result<DecodedAudio, AudioError> {
    let bytes = fs::read(path)?;
    let extension = path.extension().map(|ext| ext.to_string_lossy().to_lowercase());
    decode_bytes(bytes, extension.as_deref())
}

/// Decode an in-memory file. WAV goes through hound, everything else
/// through symphonia's probe.
pub fn decode_bytes(bytes: Vec<u8>, extension: Option<&str>) -> Result<DecodedAudio, AudioError> {
    let audio = if bytes.starts_with(b"RIFF") {
        decode_wav(&bytes)?
    } else {
        decode_compressed(bytes, extension)?
    };

    if audio.is_empty() {
        return Err(AudioError::Empty);
    }
    log::debug!(
        "Decoded {} samples @ {} Hz ({:.1} s)",
        audio.len(),
        audio.sample_rate,
        audio.duration_s()
    );
    Ok(audio)
}

fn decode_wav(bytes: &[u8]) -> Result<DecodedAudio, AudioError> {
    let mut reader = hound::WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let full_scale = (1i64 << (spec.bits_per_sample.max(1) - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / full_scale))
                .collect::<Result<_, _>>()?
        }
    };

    Ok(DecodedAudio::new(mix_to_mono(&interleaved, channels), spec.sample_rate))
}

fn decode_compressed(bytes: Vec<u8>, extension: Option<&str>) -> Result<DecodedAudio, AudioError> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format.default_track().ok_or(AudioError::NoTrack)?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(44100);
    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut samples = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(e.into()),
        };
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                sample_rate = spec.rate;
                let channels = spec.channels.count().max(1);
                let mut buffer = SampleBuffer::<f32>::new(decoded.frames() as u64, spec);
                buffer.copy_interleaved_ref(decoded);
                samples.extend(mix_to_mono(buffer.samples(), channels));
            }
            // Corrupt packets are skipped
            Err(SymphoniaError::DecodeError(e)) => log::debug!("Skipping bad packet: {}", e),
            Err(e) => return Err(e.into()),
        }
    }

    Ok(DecodedAudio::new(samples, sample_rate))
}

/// Average interleaved frames down to one channel
fn mix_to_mono(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// In-memory 16-bit WAV
    fn wav_bytes(samples: &[f32], sample_rate: u32, channels: u16) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for &sample in samples {
                writer.write_sample((sample * i16::MAX as f32) as i16).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_decode_mono_wav() {
        let bytes = wav_bytes(&[0.0, 0.5, -0.5, 1.0], 22050, 1);
        let audio = decode_bytes(bytes, Some("wav")).unwrap();
        assert_eq!(audio.sample_rate, 22050);
        assert_eq!(audio.len(), 4);
        assert!((audio.samples[1] - 0.5).abs() < 1e-3);
        assert!((audio.samples[2] + 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_stereo_wav_is_mixed_to_mono() {
        let bytes = wav_bytes(&[0.5, -0.5, 1.0, 0.0], 44100, 2);
        let audio = decode_bytes(bytes, None).unwrap();
        assert_eq!(audio.len(), 2);
        assert!(audio.samples[0].abs() < 1e-3);
        assert!((audio.samples[1] - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_empty_wav_is_an_error() {
        let bytes = wav_bytes(&[], 44100, 1);
        assert!(matches!(decode_bytes(bytes, None), Err(AudioError::Empty)));
    }

    #[test]
    fn test_garbage_is_an_error() {
        let result = decode_bytes(b"definitely not audio".to_vec(), Some("mp3"));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = decode_file(Path::new("/nonexistent/track.mp3"));
        assert!(matches!(result, Err(AudioError::Io(_))));
    }
}

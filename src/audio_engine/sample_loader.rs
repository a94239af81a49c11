//! Audio file loading and decoding functionality.
//!
//! Clips are decoded up front into shared sample buffers that match the engine's output layout:
//! symphonia decodes, rubato converts the sample rate, and mono/stereo is mapped last.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use rubato::{FftFixedIn, Resampler};
use symphonia::core::{
    audio::SampleBuffer as SymphoniaSampleBuffer, codecs::DecoderOptions,
    errors::Error as SymphoniaError, formats::FormatOptions, io::MediaSourceStream,
    meta::MetadataOptions, probe::Hint,
};
use symphonia::default::{get_codecs, get_probe};

use crate::audio_engine::constants::RESAMPLE_CHUNK_FRAMES;
use crate::audio_engine::errors::SampleLoadError;
use crate::messages::SampleBuffer;

/// Decodes an audio file into a sample buffer with the specified output configuration.
///
/// # Parameters
///
/// - `path`: Path to the audio file to load
/// - `output_channels`: Number of output channels (1 for mono, 2 for stereo)
/// - `output_rate_hz`: Output sample rate in Hz
///
/// # Errors
///
/// - File not found or cannot be opened
/// - Audio format not recognized or corrupted
/// - Unsupported channel count
/// - Resampler could not be built for the rate pair
pub fn decode_audio_file_to_sample_buffer(
    path: &Path,
    output_channels: usize,
    output_rate_hz: u32,
) -> Result<SampleBuffer, SampleLoadError> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or(SampleLoadError::NoDefaultTrack)?;
    let track_id = track.id;
    let file_rate_hz = track
        .codec_params
        .sample_rate
        .ok_or(SampleLoadError::MissingSampleRate)?;
    let file_channels = track
        .codec_params
        .channels
        .ok_or(SampleLoadError::MissingChannels)?
        .count();

    let mut decoder = get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut decoded: Vec<f32> = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(err))
                if err.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(err) => return Err(SampleLoadError::Decode(err)),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let audio_buf = decoder.decode(&packet)?;
        let spec = *audio_buf.spec();
        let duration = audio_buf.capacity() as u64;

        let mut sample_buf = SymphoniaSampleBuffer::<f32>::new(duration, spec);
        sample_buf.copy_interleaved_ref(audio_buf);
        decoded.extend_from_slice(sample_buf.samples());
    }

    let resampled = resample_interleaved(decoded, file_channels, file_rate_hz, output_rate_hz)?;
    let mapped = map_channels(resampled, file_channels, output_channels)?;

    Ok(SampleBuffer {
        channels: output_channels,
        samples: Arc::from(mapped.into_boxed_slice()),
    })
}

/// Converts interleaved samples from `input_rate_hz` to `output_rate_hz`.
///
/// The tail is zero-padded up to a full resampler chunk and the output is trimmed back to the
/// length implied by the rate ratio.
pub fn resample_interleaved(
    samples: Vec<f32>,
    channels: usize,
    input_rate_hz: u32,
    output_rate_hz: u32,
) -> Result<Vec<f32>, SampleLoadError> {
    if input_rate_hz == output_rate_hz || channels == 0 || samples.is_empty() {
        return Ok(samples);
    }

    let mut resampler = FftFixedIn::<f32>::new(
        input_rate_hz as usize,
        output_rate_hz as usize,
        RESAMPLE_CHUNK_FRAMES,
        2,
        channels,
    )?;

    let input_frames = samples.len() / channels;
    let mut planar: Vec<Vec<f32>> = vec![Vec::with_capacity(input_frames); channels];
    for frame in samples.chunks_exact(channels) {
        for (channel, value) in frame.iter().enumerate() {
            planar[channel].push(*value);
        }
    }

    let expected_frames =
        (input_frames as u64 * u64::from(output_rate_hz) / u64::from(input_rate_hz)) as usize;
    let mut output: Vec<Vec<f32>> = vec![Vec::with_capacity(expected_frames); channels];

    let mut offset = 0;
    while offset < input_frames {
        let chunk_len = resampler.input_frames_next();
        let end = (offset + chunk_len).min(input_frames);
        let chunk: Vec<Vec<f32>> = planar
            .iter()
            .map(|channel| {
                let mut data = channel[offset..end].to_vec();
                data.resize(chunk_len, 0.0);
                data
            })
            .collect();

        let resampled = resampler.process(&chunk, None)?;
        for (out, part) in output.iter_mut().zip(resampled) {
            out.extend_from_slice(&part);
        }
        offset = end;
    }

    // Flush the resampler delay so the trimmed output still covers the whole input.
    let flushed = resampler.process_partial::<Vec<f32>>(None, None)?;
    for (out, part) in output.iter_mut().zip(flushed) {
        out.extend_from_slice(&part);
    }

    let delay = resampler.output_delay();
    let frames = expected_frames.min(output[0].len().saturating_sub(delay));
    let mut interleaved = Vec::with_capacity(frames * channels);
    for frame in delay..delay + frames {
        for channel in &output {
            interleaved.push(channel[frame]);
        }
    }

    Ok(interleaved)
}

/// Maps audio samples from one channel configuration to another.
///
/// Mono is duplicated into both stereo channels; stereo is averaged down to mono. Any other
/// mismatch is rejected.
pub fn map_channels(
    samples: Vec<f32>,
    file_channels: usize,
    output_channels: usize,
) -> Result<Vec<f32>, SampleLoadError> {
    match (file_channels, output_channels) {
        (from, to) if from == to => Ok(samples),
        (1, 2) => Ok(samples.iter().flat_map(|&s| [s, s]).collect()),
        (2, 1) => Ok(samples
            .chunks_exact(2)
            .map(|frame| (frame[0] + frame[1]) * 0.5)
            .collect()),
        _ => Err(SampleLoadError::UnsupportedChannels {
            file_channels,
            output_channels,
        }),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Write;

    use super::*;

    /// Helper function to create a PCM16 WAV file for testing.
    pub(crate) fn write_pcm16_wav(
        path: &Path,
        channels: u16,
        sample_rate_hz: u32,
        samples: &[i16],
    ) -> std::io::Result<()> {
        let bits_per_sample = 16u16;
        let block_align = channels * (bits_per_sample / 8);
        let byte_rate = sample_rate_hz * u32::from(block_align);
        let data_len_bytes = u32::try_from(samples.len() * 2).expect("sample data too large");
        let chunk_size = 36 + data_len_bytes;

        let mut file = File::create(path)?;
        file.write_all(b"RIFF")?;
        file.write_all(&chunk_size.to_le_bytes())?;
        file.write_all(b"WAVE")?;

        file.write_all(b"fmt ")?;
        file.write_all(&16u32.to_le_bytes())?;
        file.write_all(&1u16.to_le_bytes())?; // PCM
        file.write_all(&channels.to_le_bytes())?;
        file.write_all(&sample_rate_hz.to_le_bytes())?;
        file.write_all(&byte_rate.to_le_bytes())?;
        file.write_all(&block_align.to_le_bytes())?;
        file.write_all(&bits_per_sample.to_le_bytes())?;

        file.write_all(b"data")?;
        file.write_all(&data_len_bytes.to_le_bytes())?;
        for sample in samples {
            file.write_all(&sample.to_le_bytes())?;
        }

        Ok(())
    }

    #[test]
    fn test_decode_wav_to_f32_buffer() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("test.wav");

        let samples = [0i16, 16_384i16, -16_384i16, 32_767i16];
        write_pcm16_wav(&path, 1, 44_100, &samples).unwrap();

        let decoded = decode_audio_file_to_sample_buffer(&path, 1, 44_100).unwrap();
        assert_eq!(decoded.channels, 1);
        assert_eq!(decoded.samples.len(), samples.len());
        assert!(decoded.samples.iter().all(|s| (-1.0..=1.0).contains(s)));
    }

    #[test]
    fn test_decode_channel_mapping_mono_to_stereo() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("test.wav");

        let samples = [0i16, 16_384i16, -16_384i16];
        write_pcm16_wav(&path, 1, 44_100, &samples).unwrap();

        let decoded = decode_audio_file_to_sample_buffer(&path, 2, 44_100).unwrap();
        assert_eq!(decoded.channels, 2);
        assert_eq!(decoded.samples.len(), samples.len() * 2);

        for frame in decoded.samples.chunks_exact(2) {
            assert!((frame[0] - frame[1]).abs() < 1e-6);
        }
    }

    #[test]
    fn test_decode_resamples_to_output_rate() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("test.wav");

        let samples = vec![8_192i16; 44_100];
        write_pcm16_wav(&path, 1, 44_100, &samples).unwrap();

        let decoded = decode_audio_file_to_sample_buffer(&path, 1, 48_000).unwrap();
        assert_eq!(decoded.channels, 1);
        assert_eq!(decoded.frames(), 48_000);
    }

    #[test]
    fn test_resample_same_rate_is_identity() {
        let input = vec![0.1, 0.2, 0.3, 0.4];
        let output = resample_interleaved(input.clone(), 2, 48_000, 48_000).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn test_resample_length_follows_ratio() {
        let input = vec![0.25; 2 * 4_800];
        let output = resample_interleaved(input, 2, 48_000, 24_000).unwrap();
        assert_eq!(output.len(), 2 * 2_400);
    }

    #[test]
    fn test_map_channels_mono_to_stereo() {
        let input = vec![0.5, -0.3, 0.8];
        let output = map_channels(input, 1, 2).unwrap();

        assert_eq!(output, vec![0.5, 0.5, -0.3, -0.3, 0.8, 0.8]);
    }

    #[test]
    fn test_map_channels_stereo_to_mono() {
        let input = vec![0.5, 0.3, -0.2, 0.4, 0.8, 0.6];
        let output = map_channels(input, 2, 1).unwrap();

        assert_eq!(output.len(), 3);
        assert!((output[0] - 0.4).abs() < 1e-6);
        assert!((output[1] - 0.1).abs() < 1e-6);
        assert!((output[2] - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_map_channels_unsupported() {
        let input = vec![0.5, -0.3, 0.8, 0.2];
        let result = map_channels(input, 2, 4);

        assert!(matches!(
            result,
            Err(SampleLoadError::UnsupportedChannels { .. })
        ));
    }

    #[test]
    fn test_decode_invalid_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nonexistent.wav");

        let result = decode_audio_file_to_sample_buffer(&path, 1, 44_100);
        assert!(matches!(result, Err(SampleLoadError::Io(_))));
    }
}

//! Property tests for configuration validation, sample transport and the
//! record loop's chunk count

use proptest::prelude::*;
use std::time::Duration;

use pa_raw::audio::{CaptureStream, MemoryServer, PlaybackStream, SampleFormat, StreamConfig};
use pa_raw::error::{ConfigError, SampleTypeError};
use pa_raw::workflow::{chunk_frames, run_record};
use pa_raw::Error;

fn format_strategy() -> impl Strategy<Value = SampleFormat> {
    prop::sample::select(SampleFormat::ALL.to_vec())
}

proptest! {
    #[test]
    fn validate_accepts_only_supported_configs(
        format in format_strategy(),
        channels in 0u16..40,
        rate in 0u32..400_000,
    ) {
        let server = MemoryServer::new();
        server.set_limits(8, 192_000);
        let config = StreamConfig { format, rate, channels, ..Default::default() };

        match config.validate(&server) {
            Ok(validated) => {
                prop_assert_eq!(format, SampleFormat::Float32Ne);
                prop_assert!((1..=8).contains(&channels));
                prop_assert!((1..=192_000).contains(&rate));
                prop_assert_eq!(validated.frame_bytes(), 4 * channels as usize);
            }
            Err(ConfigError::UnsupportedFormat(f)) => {
                prop_assert_ne!(f, SampleFormat::Float32Ne);
            }
            Err(ConfigError::InvalidChannelCount(c)) => {
                prop_assert_eq!(format, SampleFormat::Float32Ne);
                prop_assert!(c == 0 || c > 8);
            }
            Err(ConfigError::InvalidSampleRate(r)) => {
                prop_assert_eq!(format, SampleFormat::Float32Ne);
                prop_assert!((1..=8).contains(&channels));
                prop_assert!(r == 0 || r > 192_000);
            }
            Err(other) => prop_assert!(false, "unexpected error {:?}", other),
        }
        prop_assert_eq!(server.stats().opens, 0);
    }

    #[test]
    fn mono_samples_survive_playback_then_capture(
        samples in prop::collection::vec(any::<f32>(), 1..2048),
    ) {
        let server = MemoryServer::new();
        let config = StreamConfig::default().validate(&server).unwrap();

        let mut playback = PlaybackStream::open(&server, config.clone()).unwrap();
        playback.write(&samples).unwrap();
        server.push_capture(&server.played());

        let mut capture = CaptureStream::open(&server, config).unwrap();
        let mut back = vec![0.0f32; samples.len()];
        capture.read(&mut back).unwrap();

        let sent: Vec<u32> = samples.iter().map(|s| s.to_bits()).collect();
        let received: Vec<u32> = back.iter().map(|s| s.to_bits()).collect();
        prop_assert_eq!(sent, received);
    }

    #[test]
    fn mismatched_shape_never_reaches_server(channels in 3u16..8, frames in 1usize..64) {
        let server = MemoryServer::new();
        let config = StreamConfig { channels, ..Default::default() }
            .validate(&server)
            .unwrap();
        let mut capture = CaptureStream::open(&server, config).unwrap();

        let mut mono = vec![0.0f32; frames];
        let err = capture.read(&mut mono).unwrap_err();
        let is_mismatch = matches!(
            err,
            Error::Sample(SampleTypeError::ChannelMismatch { expected, actual: 1 }) if expected == channels
        );
        prop_assert!(is_mismatch);
        prop_assert_eq!(server.stats().read_calls, 0);
    }

    #[test]
    fn record_reads_ceil_duration_over_chunk(millis in 0u64..3000, rate in prop::sample::select(vec![8000u32, 22050, 44100, 48000])) {
        let server = MemoryServer::new();
        let config = StreamConfig { rate, ..Default::default() }.validate(&server).unwrap();
        let duration = Duration::from_millis(millis);
        let mut out = Vec::new();

        let summary = run_record(&server, config, duration, &mut out).unwrap();

        let chunk = chunk_frames(rate) as u128;
        let wanted = (duration.as_nanos() * rate as u128).div_ceil(1_000_000_000 * chunk);
        prop_assert_eq!(summary.chunks as u128, wanted);
        prop_assert_eq!(out.len() as u128, summary.chunks as u128 * chunk * 4);
        prop_assert_eq!(server.stats().closes, 1);
    }
}

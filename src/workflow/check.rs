//! Loop-back self-test: capture a stretch of audio, then play it back

use std::time::Duration;
use tracing::info;

use crate::audio::{AudioServer, CaptureStream, PlaybackStream, ValidatedConfig};
use crate::codec::{check_channels, Samples, SamplesMut};
use crate::error::Result;
use crate::workflow::{frames_for, StopSignal};

#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Audio captured and replayed per pass
    pub duration: Duration,
    /// Stop after this many passes; `None` runs until `stop` is raised
    pub passes: Option<usize>,
    pub stop: StopSignal,
}

impl CheckOptions {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            passes: None,
            stop: StopSignal::new(),
        }
    }

    pub fn with_passes(mut self, passes: usize) -> Self {
        self.passes = Some(passes);
        self
    }

    pub fn with_stop(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckSummary {
    pub passes: usize,
    pub frames_per_pass: usize,
}

/// Alternate between recording and replaying `options.duration` of audio
///
/// Each pass flushes stale capture data, blocks until the whole stretch is
/// captured, then blocks until it has all been written for playback. The
/// stop signal and pass limit are only looked at between passes.
pub fn run_check<S>(server: &S, config: ValidatedConfig, options: &CheckOptions) -> Result<CheckSummary>
where
    S: AudioServer,
{
    let channels = config.channels();
    check_channels(channels)?;
    let frames = frames_for(options.duration, config.rate())?;

    let mut capture = CaptureStream::open(server, config.clone())?;
    let mut playback = PlaybackStream::open(server, config)?;

    let mut buffer = vec![0.0f32; frames * channels as usize];
    let mut summary = CheckSummary {
        passes: 0,
        frames_per_pass: frames,
    };

    while !options.stop.is_stopped() && options.passes.map_or(true, |max| summary.passes < max) {
        capture.flush()?;

        info!("Recording");
        capture.read(SamplesMut::interleaved(&mut buffer, channels)?)?;

        info!("Playing");
        playback.write(Samples::interleaved(&buffer, channels)?)?;

        summary.passes += 1;
    }

    info!(passes = summary.passes, "Check finished");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::StreamConfig;
    use crate::audio::memory::{codes, MemoryServer};
    use crate::audio::Direction;
    use crate::error::{AudioError, Error, SampleTypeError};

    fn default_config(server: &MemoryServer) -> ValidatedConfig {
        StreamConfig::default().validate(server).unwrap()
    }

    #[test]
    fn test_passes_replay_capture() {
        let server = MemoryServer::new();
        let config = StreamConfig {
            rate: 1000,
            ..Default::default()
        };
        let options = CheckOptions::new(Duration::from_millis(100)).with_passes(3);

        let summary = run_check(&server, config.validate(&server).unwrap(), &options).unwrap();
        assert_eq!(summary.passes, 3);
        assert_eq!(summary.frames_per_pass, 100);

        let stats = server.stats();
        assert_eq!(stats.flushes, 3);
        assert_eq!(stats.bytes_read, 3 * 100 * 4);
        assert_eq!(stats.bytes_written, 3 * 100 * 4);
        assert_eq!(stats.opens, 2);
        assert_eq!(stats.closes, 2);
    }

    #[test]
    fn test_stop_before_first_pass() {
        let server = MemoryServer::new();
        let stop = StopSignal::new();
        stop.stop();
        let options = CheckOptions::new(Duration::from_secs(1)).with_stop(stop);

        let summary = run_check(&server, default_config(&server), &options).unwrap();
        assert_eq!(summary.passes, 0);
        assert_eq!(server.stats().read_calls, 0);
    }

    #[test]
    fn test_playback_refused_releases_capture() {
        let server = MemoryServer::new();
        server.refuse_open(Direction::Playback, codes::CONNECTION_REFUSED);
        let options = CheckOptions::new(Duration::from_secs(1)).with_passes(1);

        let err = run_check(&server, default_config(&server), &options).unwrap_err();
        assert!(matches!(err, Error::Audio(AudioError::Open { .. })));

        let stats = server.stats();
        assert_eq!(stats.opens, 1);
        assert_eq!(stats.closes, 1);
    }

    #[test]
    fn test_flush_failure_aborts() {
        let server = MemoryServer::new();
        server.fail_flush(codes::BAD_STATE);
        let options = CheckOptions::new(Duration::from_millis(100)).with_passes(2);

        let err = run_check(&server, default_config(&server), &options).unwrap_err();
        match err {
            Error::Audio(e @ AudioError::Flush(_)) => assert_eq!(e.code(), Some(codes::BAD_STATE)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_too_short_duration() {
        let server = MemoryServer::new();
        let options = CheckOptions::new(Duration::from_nanos(1));
        let err = run_check(&server, default_config(&server), &options).unwrap_err();
        assert!(matches!(err, Error::InvalidDuration(_)));
        assert_eq!(server.stats().opens, 0);
    }

    #[test]
    fn test_unshaped_channel_count_never_opens() {
        let server = MemoryServer::new();
        let config = StreamConfig {
            channels: 3,
            ..Default::default()
        };
        let options = CheckOptions::new(Duration::from_millis(100)).with_passes(1);

        let err = run_check(&server, config.validate(&server).unwrap(), &options).unwrap_err();
        assert!(matches!(
            err,
            Error::Sample(SampleTypeError::UnsupportedSampleType(3))
        ));
        assert_eq!(server.stats().opens, 0);
    }
}

//! Record-to-file loop

use std::io::Write;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::audio::{AudioServer, CaptureStream, ValidatedConfig};
use crate::codec::{check_channels, SamplesMut};
use crate::error::Result;
use crate::workflow::chunk_frames;

/// What a finished recording produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSummary {
    pub chunks: usize,
    pub frames: u64,
    pub bytes: u64,
    /// Stream time captured
    pub captured: Duration,
}

/// Capture `duration` of audio into `sink`
///
/// Reads 100 ms chunks until the deadline has passed, so the loop performs
/// `ceil(duration / chunk)` chunks (none for a zero duration) and never reads
/// a partial chunk.
///
/// The deadline is measured in captured stream time, not wall-clock time. A
/// source that delivers audio slower than real time keeps the loop running
/// until the full duration has been captured, which can take longer than
/// `duration` by more than one chunk.
pub fn run_record<S, W>(
    server: &S,
    config: ValidatedConfig,
    duration: Duration,
    sink: &mut W,
) -> Result<RecordSummary>
where
    S: AudioServer,
    W: Write,
{
    let channels = config.channels();
    check_channels(channels)?;
    let frames = chunk_frames(config.rate());
    let mut capture = CaptureStream::open(server, config)?;

    let mut chunk = vec![0.0f32; frames * channels as usize];
    let mut summary = RecordSummary {
        chunks: 0,
        frames: 0,
        bytes: 0,
        captured: Duration::ZERO,
    };

    info!(?duration, "Recording");
    let started = Instant::now();
    while capture.stream_time() < duration {
        capture.read(SamplesMut::interleaved(&mut chunk, channels)?)?;

        let bytes: &[u8] = bytemuck::cast_slice(&chunk[..]);
        sink.write_all(bytes)?;
        summary.chunks += 1;
        summary.bytes += bytes.len() as u64;
        debug!(chunk = summary.chunks, "Captured chunk");
    }
    sink.flush()?;

    summary.frames = capture.frames_read();
    summary.captured = capture.stream_time();
    capture.close();

    info!(
        chunks = summary.chunks,
        bytes = summary.bytes,
        wall = ?started.elapsed(),
        "Done!"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::StreamConfig;
    use crate::audio::memory::{codes, MemoryServer};
    use crate::error::{AudioError, Error, SampleTypeError};

    fn default_config(server: &MemoryServer) -> ValidatedConfig {
        StreamConfig::default().validate(server).unwrap()
    }

    #[test]
    fn test_whole_chunks() {
        let server = MemoryServer::new();
        let mut out = Vec::new();

        let summary = run_record(
            &server,
            default_config(&server),
            Duration::from_secs(1),
            &mut out,
        )
        .unwrap();

        assert_eq!(summary.chunks, 10);
        assert_eq!(summary.frames, 44100);
        assert_eq!(out.len(), 44100 * 4);
        assert_eq!(server.stats().closes, 1);
    }

    #[test]
    fn test_partial_period_rounds_up() {
        let server = MemoryServer::new();
        let mut out = Vec::new();

        let config = StreamConfig {
            rate: 8000,
            ..Default::default()
        };
        let summary = run_record(&server, config.validate(&server).unwrap(), Duration::from_millis(250), &mut out).unwrap();

        assert_eq!(summary.chunks, 3);
        assert_eq!(out.len(), 3 * 800 * 4);
    }

    #[test]
    fn test_read_failure_aborts() {
        let server = MemoryServer::new();
        server.fail_reads_after(2, codes::TIMEOUT);
        let mut out = Vec::new();

        let err = run_record(
            &server,
            default_config(&server),
            Duration::from_secs(1),
            &mut out,
        )
        .unwrap_err();

        match err {
            Error::Audio(e @ AudioError::Read(_)) => assert_eq!(e.code(), Some(codes::TIMEOUT)),
            other => panic!("unexpected error: {other}"),
        }
        // The two chunks read before the failure stay in the output
        assert_eq!(out.len(), 2 * 4410 * 4);
        assert_eq!(server.stats().closes, 1);
    }

    #[test]
    fn test_zero_duration_reads_nothing() {
        let server = MemoryServer::new();
        let mut out = Vec::new();

        let summary =
            run_record(&server, default_config(&server), Duration::ZERO, &mut out).unwrap();

        assert_eq!(summary.chunks, 0);
        assert_eq!(summary.captured, Duration::ZERO);
        assert!(out.is_empty());
        assert_eq!(server.stats().read_calls, 0);
        assert_eq!(server.stats().closes, 1);
    }

    #[test]
    fn test_unshaped_channel_count_never_opens() {
        let server = MemoryServer::new();
        let config = StreamConfig {
            channels: 3,
            ..Default::default()
        };
        let mut out = Vec::new();

        let err = run_record(
            &server,
            config.validate(&server).unwrap(),
            Duration::from_millis(100),
            &mut out,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            Error::Sample(SampleTypeError::UnsupportedSampleType(3))
        ));
        assert_eq!(server.stats().opens, 0);
        assert!(out.is_empty());
    }
}

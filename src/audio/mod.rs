//! Audio subsystem module
//!
//! `pulse` talks to a real PulseAudio server. `memory` is an in-process test
//! backend with failure injection and is not meant for playing audio.

pub mod capture;
pub mod config;
pub mod memory;
pub mod playback;
#[cfg(feature = "pulse")]
pub mod pulse;
pub mod server;

pub use capture::CaptureStream;
pub use config::{SampleFormat, StreamConfig, ValidatedConfig};
pub use memory::MemoryServer;
pub use playback::PlaybackStream;
#[cfg(feature = "pulse")]
pub use pulse::PulseServer;
pub use server::{AudioServer, Connection, Direction, OpenParams};

use std::time::Duration;

use crate::error::AudioError;

/// Reject byte regions that do not hold a whole number of frames
pub(crate) fn check_aligned(len: usize, frame_bytes: usize) -> Result<(), AudioError> {
    if frame_bytes == 0 || len % frame_bytes != 0 {
        return Err(AudioError::Misaligned { len, frame_bytes });
    }
    Ok(())
}

/// Playing time of `frames` channel-frames at `rate`
pub(crate) fn stream_time(frames: u64, rate: u32) -> Duration {
    if rate == 0 {
        return Duration::ZERO;
    }
    let secs = frames / rate as u64;
    let rem = frames % rate as u64;
    Duration::from_secs(secs) + Duration::from_nanos(rem * 1_000_000_000 / rate as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment() {
        assert!(check_aligned(0, 4).is_ok());
        assert!(check_aligned(16, 8).is_ok());
        assert_eq!(
            check_aligned(6, 4),
            Err(AudioError::Misaligned {
                len: 6,
                frame_bytes: 4
            })
        );
    }

    #[test]
    fn test_stream_time() {
        assert_eq!(stream_time(44100, 44100), Duration::from_secs(1));
        assert_eq!(stream_time(4410, 44100), Duration::from_millis(100));
        assert_eq!(stream_time(66150, 44100), Duration::from_millis(1500));
    }
}

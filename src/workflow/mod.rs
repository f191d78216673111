//! Time-bounded record, play and loop-back loops
//!
//! Each loop composes the stream types with a termination condition that is
//! checked between blocking calls. A call already in progress always runs to
//! completion, so a loop can overrun its deadline by at most one chunk.

pub mod check;
pub mod play;
pub mod record;

pub use check::{run_check, CheckOptions, CheckSummary};
pub use play::{run_play, PlaySummary};
pub use record::{run_record, RecordSummary};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::constants::CHUNKS_PER_SECOND;
use crate::error::{Error, Result};

/// Frames per chunk for the record and play loops (100 ms of audio)
pub fn chunk_frames(rate: u32) -> usize {
    ((rate / CHUNKS_PER_SECOND) as usize).max(1)
}

/// Frames covering `duration` at `rate`, rounded down
pub fn frames_for(duration: Duration, rate: u32) -> Result<usize> {
    let frames = (duration.as_nanos() * rate as u128 / 1_000_000_000) as usize;
    if frames == 0 {
        return Err(Error::InvalidDuration(format!(
            "{:?} is shorter than one frame at {} Hz",
            duration, rate
        )));
    }
    Ok(frames)
}

/// Cooperative stop request, checked between blocking calls
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_frames() {
        assert_eq!(chunk_frames(44100), 4410);
        assert_eq!(chunk_frames(48000), 4800);
        assert_eq!(chunk_frames(8), 1);
    }

    #[test]
    fn test_frames_for() {
        assert_eq!(frames_for(Duration::from_secs(1), 44100).unwrap(), 44100);
        assert_eq!(frames_for(Duration::from_millis(500), 48000).unwrap(), 24000);
        assert!(matches!(
            frames_for(Duration::from_micros(10), 8000),
            Err(Error::InvalidDuration(_))
        ));
    }

    #[test]
    fn test_stop_signal_shared() {
        let signal = StopSignal::new();
        let handle = signal.clone();
        assert!(!signal.is_stopped());
        handle.stop();
        assert!(signal.is_stopped());
    }
}

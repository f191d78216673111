//! In-process test backend
//!
//! Serves capture reads from a byte queue and records playback writes, so the
//! streams and workflows can run without a sound daemon. Failures, stalls and
//! short transfers can be injected to exercise the error paths.
//!
//! This backend never touches an audio device. It exists for unit tests,
//! integration tests and benchmarks; applications use
//! `PulseServer` (feature `pulse`).

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::audio::config::SampleFormat;
use crate::audio::server::{AudioServer, Connection, Direction, OpenParams};
use crate::error::ServerError;

/// Error codes used by the in-memory server, numbered like PulseAudio's
pub mod codes {
    pub const ACCESS: i32 = 1;
    pub const CONNECTION_REFUSED: i32 = 6;
    pub const TIMEOUT: i32 = 8;
    pub const BAD_STATE: i32 = 15;
    pub const NO_DATA: i32 = 16;
    pub const IO: i32 = 25;
}

const DEFAULT_MAX_CHANNELS: u16 = 32;
const DEFAULT_MAX_RATE: u32 = 384_000;

/// What a connection was opened with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRecord {
    pub direction: Direction,
    pub app_name: String,
    pub stream_name: String,
    pub format: SampleFormat,
    pub rate: u32,
    pub channels: u16,
    pub buffer_max_bytes: Option<u32>,
}

/// Counters for everything that reached the server
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerStats {
    pub opens: usize,
    pub closes: usize,
    pub flushes: usize,
    pub drains: usize,
    pub read_calls: usize,
    pub write_calls: usize,
    pub bytes_read: usize,
    pub bytes_written: usize,
}

#[derive(Debug, Clone)]
struct Failure {
    after_calls: usize,
    error: ServerError,
}

#[derive(Debug)]
struct State {
    max_channels: u16,
    max_rate: u32,
    capture: VecDeque<u8>,
    silence_when_empty: bool,
    loopback: bool,
    max_transfer: Option<usize>,
    played: Vec<u8>,
    refuse_capture: Option<ServerError>,
    refuse_playback: Option<ServerError>,
    read_failure: Option<Failure>,
    write_failure: Option<Failure>,
    flush_failure: Option<ServerError>,
    opened: Vec<OpenRecord>,
    stats: ServerStats,
}

impl Default for State {
    fn default() -> Self {
        Self {
            max_channels: DEFAULT_MAX_CHANNELS,
            max_rate: DEFAULT_MAX_RATE,
            capture: VecDeque::new(),
            silence_when_empty: true,
            loopback: false,
            max_transfer: None,
            played: Vec::new(),
            refuse_capture: None,
            refuse_playback: None,
            read_failure: None,
            write_failure: None,
            flush_failure: None,
            opened: Vec::new(),
            stats: ServerStats::default(),
        }
    }
}

/// Audio server living in this process
///
/// Clones share the same state, so a test can keep one handle for
/// inspection while a workflow owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryServer {
    state: Arc<Mutex<State>>,
}

impl MemoryServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept channel counts `1..=max_channels` and rates `1..=max_rate`
    pub fn set_limits(&self, max_channels: u16, max_rate: u32) {
        let mut state = self.state.lock();
        state.max_channels = max_channels;
        state.max_rate = max_rate;
    }

    /// Queue raw bytes for capture connections to read
    pub fn push_capture(&self, bytes: &[u8]) {
        self.state.lock().capture.extend(bytes.iter().copied());
    }

    /// Queue native-endian float samples for capture
    pub fn push_capture_samples(&self, samples: &[f32]) {
        self.push_capture(bytemuck::cast_slice(samples));
    }

    /// Bytes queued for capture and not yet read
    pub fn pending_capture(&self) -> usize {
        self.state.lock().capture.len()
    }

    /// When the capture queue runs dry, deliver zeros (default) or stall
    pub fn set_silence_when_empty(&self, silence: bool) {
        self.state.lock().silence_when_empty = silence;
    }

    /// Feed everything played back into the capture queue
    pub fn set_loopback(&self, loopback: bool) {
        self.state.lock().loopback = loopback;
    }

    /// Service at most this many bytes per read or write call
    pub fn set_max_transfer(&self, max: Option<usize>) {
        self.state.lock().max_transfer = max;
    }

    /// Refuse connections in one direction with the given code
    pub fn refuse_open(&self, direction: Direction, code: i32) {
        let error = ServerError::new(code, "Connection refused");
        let mut state = self.state.lock();
        match direction {
            Direction::Capture => state.refuse_capture = Some(error),
            Direction::Playback => state.refuse_playback = Some(error),
        }
    }

    /// Let `calls` reads succeed, then fail every read with `code`
    pub fn fail_reads_after(&self, calls: usize, code: i32) {
        self.state.lock().read_failure = Some(Failure {
            after_calls: calls,
            error: ServerError::new(code, "Read failed"),
        });
    }

    /// Let `calls` writes succeed, then fail every write with `code`
    pub fn fail_writes_after(&self, calls: usize, code: i32) {
        self.state.lock().write_failure = Some(Failure {
            after_calls: calls,
            error: ServerError::new(code, "Write failed"),
        });
    }

    pub fn fail_flush(&self, code: i32) {
        self.state.lock().flush_failure = Some(ServerError::new(code, "Flush failed"));
    }

    /// Everything accepted for playback so far
    pub fn played(&self) -> Vec<u8> {
        self.state.lock().played.clone()
    }

    /// Playback bytes decoded as native-endian floats
    pub fn played_samples(&self) -> Vec<f32> {
        self.state
            .lock()
            .played
            .chunks_exact(4)
            .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
            .collect()
    }

    pub fn opened(&self) -> Vec<OpenRecord> {
        self.state.lock().opened.clone()
    }

    pub fn stats(&self) -> ServerStats {
        self.state.lock().stats.clone()
    }
}

impl AudioServer for MemoryServer {
    type Connection = MemoryConnection;

    fn channels_valid(&self, channels: u16) -> bool {
        channels >= 1 && channels <= self.state.lock().max_channels
    }

    fn rate_valid(&self, rate: u32) -> bool {
        rate >= 1 && rate <= self.state.lock().max_rate
    }

    fn open(
        &self,
        direction: Direction,
        params: &OpenParams<'_>,
    ) -> Result<MemoryConnection, ServerError> {
        let mut state = self.state.lock();
        let refused = match direction {
            Direction::Capture => state.refuse_capture.clone(),
            Direction::Playback => state.refuse_playback.clone(),
        };
        if let Some(error) = refused {
            return Err(error);
        }

        state.opened.push(OpenRecord {
            direction,
            app_name: params.app_name.to_string(),
            stream_name: params.stream_name.to_string(),
            format: params.format,
            rate: params.rate,
            channels: params.channels,
            buffer_max_bytes: params.buffer_max_bytes,
        });
        state.stats.opens += 1;

        Ok(MemoryConnection {
            direction,
            state: self.state.clone(),
        })
    }
}

/// Connection handed out by [`MemoryServer`]; counts as closed when dropped
#[derive(Debug)]
pub struct MemoryConnection {
    direction: Direction,
    state: Arc<Mutex<State>>,
}

impl MemoryConnection {
    fn expect_direction(&self, direction: Direction) -> Result<(), ServerError> {
        if self.direction == direction {
            Ok(())
        } else {
            Err(ServerError::new(
                codes::BAD_STATE,
                format!("Not a {} stream", direction),
            ))
        }
    }
}

impl Connection for MemoryConnection {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ServerError> {
        self.expect_direction(Direction::Capture)?;
        let mut state = self.state.lock();
        state.stats.read_calls += 1;

        if let Some(failure) = &state.read_failure {
            if state.stats.read_calls > failure.after_calls {
                return Err(failure.error.clone());
            }
        }

        let want = state.max_transfer.map_or(buf.len(), |max| max.min(buf.len()));
        let queued = want.min(state.capture.len());
        for (dst, src) in buf[..queued].iter_mut().zip(state.capture.drain(..queued)) {
            *dst = src;
        }

        let mut filled = queued;
        if filled < want && state.silence_when_empty {
            buf[filled..want].fill(0);
            filled = want;
        }

        state.stats.bytes_read += filled;
        Ok(filled)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize, ServerError> {
        self.expect_direction(Direction::Playback)?;
        let mut state = self.state.lock();
        state.stats.write_calls += 1;

        if let Some(failure) = &state.write_failure {
            if state.stats.write_calls > failure.after_calls {
                return Err(failure.error.clone());
            }
        }

        let accepted = state.max_transfer.map_or(buf.len(), |max| max.min(buf.len()));
        state.played.extend_from_slice(&buf[..accepted]);
        if state.loopback {
            state.capture.extend(buf[..accepted].iter().copied());
        }

        state.stats.bytes_written += accepted;
        Ok(accepted)
    }

    fn flush(&mut self) -> Result<(), ServerError> {
        let mut state = self.state.lock();
        if let Some(error) = state.flush_failure.clone() {
            return Err(error);
        }
        state.stats.flushes += 1;
        if self.direction == Direction::Capture {
            state.capture.clear();
        }
        Ok(())
    }

    fn drain(&mut self) -> Result<(), ServerError> {
        self.expect_direction(Direction::Playback)?;
        self.state.lock().stats.drains += 1;
        Ok(())
    }
}

impl Drop for MemoryConnection {
    fn drop(&mut self) {
        self.state.lock().stats.closes += 1;
    }
}

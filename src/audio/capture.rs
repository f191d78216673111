//! Audio capture from the default input device
//!
//! Reads are full-buffer and blocking: a call returns once the whole buffer
//! has been filled, or fails. Partial data is never handed back as success.

use std::time::Duration;
use tracing::debug;

use crate::audio::config::ValidatedConfig;
use crate::audio::server::{AudioServer, Connection, Direction, OpenParams};
use crate::audio::{check_aligned, stream_time};
use crate::codec::SamplesMut;
use crate::error::{AudioError, Result};

/// Capture stream owning one server connection
pub struct CaptureStream<C: Connection> {
    conn: C,
    config: ValidatedConfig,
    frame_bytes: usize,
    frames_read: u64,
}

impl<C: Connection> CaptureStream<C> {
    /// Open a capture connection with an accepted configuration
    pub fn open<S>(server: &S, config: ValidatedConfig) -> std::result::Result<Self, AudioError>
    where
        S: AudioServer<Connection = C>,
    {
        let params = OpenParams {
            app_name: config.app_name(),
            stream_name: config.stream_name(),
            format: config.format(),
            rate: config.rate(),
            channels: config.channels(),
            buffer_max_bytes: None,
        };

        let conn = server
            .open(Direction::Capture, &params)
            .map_err(|source| AudioError::Open {
                direction: Direction::Capture,
                source,
            })?;

        debug!(
            rate = config.rate(),
            channels = config.channels(),
            "Opened capture stream"
        );

        let frame_bytes = config.frame_bytes();
        Ok(Self {
            conn,
            config,
            frame_bytes,
            frames_read: 0,
        })
    }

    /// Drop audio the server captured but has not delivered yet
    pub fn flush(&mut self) -> std::result::Result<(), AudioError> {
        self.conn.flush().map_err(AudioError::Flush)
    }

    /// Fill `buf` with captured bytes
    pub fn read_raw(&mut self, buf: &mut [u8]) -> std::result::Result<(), AudioError> {
        check_aligned(buf.len(), self.frame_bytes)?;

        let requested = buf.len();
        let mut filled = 0;
        while filled < requested {
            let n = self.conn.read(&mut buf[filled..]).map_err(AudioError::Read)?;
            if n == 0 {
                return Err(AudioError::Incomplete {
                    transferred: filled,
                    requested,
                });
            }
            filled += n.min(requested - filled);
        }

        self.frames_read += (requested / self.frame_bytes) as u64;
        Ok(())
    }

    /// Fill a typed sample buffer
    ///
    /// The buffer shape must match the stream's channel count.
    pub fn read<'a>(&mut self, samples: impl Into<SamplesMut<'a>>) -> Result<()> {
        let mut samples = samples.into();
        samples.check(self.config.as_ref())?;
        self.read_raw(samples.as_bytes_mut())?;
        Ok(())
    }

    pub fn config(&self) -> &ValidatedConfig {
        &self.config
    }

    pub fn frame_bytes(&self) -> usize {
        self.frame_bytes
    }

    /// Channel-frames delivered since the stream was opened
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// Amount of audio delivered since the stream was opened
    pub fn stream_time(&self) -> Duration {
        stream_time(self.frames_read, self.config.rate())
    }

    /// Release the server connection
    pub fn close(self) {}
}

impl<C: Connection> Drop for CaptureStream<C> {
    fn drop(&mut self) {
        debug!(frames = self.frames_read, "Closed capture stream");
    }
}

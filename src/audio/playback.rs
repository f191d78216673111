//! Audio playback to the default output device

use std::time::Duration;
use tracing::debug;

use crate::audio::config::ValidatedConfig;
use crate::audio::server::{AudioServer, Connection, Direction, OpenParams};
use crate::audio::{check_aligned, stream_time};
use crate::codec::Samples;
use crate::error::{AudioError, Result};

/// Playback stream owning one server connection
pub struct PlaybackStream<C: Connection> {
    conn: C,
    config: ValidatedConfig,
    frame_bytes: usize,
    frames_written: u64,
}

impl<C: Connection> PlaybackStream<C> {
    /// Open a playback connection with an accepted configuration
    ///
    /// A non-zero `buffer_max_bytes` is requested as the server's buffer cap.
    pub fn open<S>(server: &S, config: ValidatedConfig) -> std::result::Result<Self, AudioError>
    where
        S: AudioServer<Connection = C>,
    {
        let buffer_max_bytes = match config.buffer_max_bytes() {
            0 => None,
            max => Some(max),
        };
        let params = OpenParams {
            app_name: config.app_name(),
            stream_name: config.stream_name(),
            format: config.format(),
            rate: config.rate(),
            channels: config.channels(),
            buffer_max_bytes,
        };

        let conn = server
            .open(Direction::Playback, &params)
            .map_err(|source| AudioError::Open {
                direction: Direction::Playback,
                source,
            })?;

        debug!(
            rate = config.rate(),
            channels = config.channels(),
            ?buffer_max_bytes,
            "Opened playback stream"
        );

        let frame_bytes = config.frame_bytes();
        Ok(Self {
            conn,
            config,
            frame_bytes,
            frames_written: 0,
        })
    }

    /// Hand `buf` to the server, blocking until all of it is accepted
    pub fn write_raw(&mut self, buf: &[u8]) -> std::result::Result<(), AudioError> {
        check_aligned(buf.len(), self.frame_bytes)?;

        let requested = buf.len();
        let mut sent = 0;
        while sent < requested {
            let n = self.conn.write(&buf[sent..]).map_err(AudioError::Write)?;
            if n == 0 {
                return Err(AudioError::Incomplete {
                    transferred: sent,
                    requested,
                });
            }
            sent += n.min(requested - sent);
        }

        self.frames_written += (requested / self.frame_bytes) as u64;
        Ok(())
    }

    /// Write a typed sample buffer
    ///
    /// Accepts `&[f32]` on mono streams and `&[[f32; 2]]` on stereo streams.
    pub fn write<'a>(&mut self, samples: impl Into<Samples<'a>>) -> Result<()> {
        let samples = samples.into();
        samples.check(self.config.as_ref())?;
        self.write_raw(samples.as_bytes())?;
        Ok(())
    }

    /// Block until the server has played everything written so far
    pub fn drain(&mut self) -> std::result::Result<(), AudioError> {
        self.conn.drain().map_err(AudioError::Drain)
    }

    pub fn config(&self) -> &ValidatedConfig {
        &self.config
    }

    pub fn frame_bytes(&self) -> usize {
        self.frame_bytes
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Amount of audio handed to the server so far
    pub fn stream_time(&self) -> Duration {
        stream_time(self.frames_written, self.config.rate())
    }

    /// Release the server connection
    pub fn close(self) {}
}

impl<C: Connection> Drop for PlaybackStream<C> {
    fn drop(&mut self) {
        debug!(frames = self.frames_written, "Closed playback stream");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::config::StreamConfig;
    use crate::audio::memory::{codes, MemoryConnection, MemoryServer};
    use crate::error::{Error, SampleTypeError};

    fn open_with(server: &MemoryServer, config: StreamConfig) -> PlaybackStream<MemoryConnection> {
        let config = config.validate(server).unwrap();
        PlaybackStream::open(server, config).unwrap()
    }

    fn open(server: &MemoryServer, channels: u16) -> PlaybackStream<MemoryConnection> {
        open_with(
            server,
            StreamConfig {
                channels,
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_write_mono() {
        let server = MemoryServer::new();
        let mut playback = open(&server, 1);

        playback.write(&vec![0.5f32, -0.5, 0.25]).unwrap();
        assert_eq!(server.played_samples(), vec![0.5, -0.5, 0.25]);
        assert_eq!(playback.frames_written(), 3);
    }

    #[test]
    fn test_write_stereo() {
        let server = MemoryServer::new();
        let mut playback = open(&server, 2);

        let frames = vec![[0.1f32, 0.2], [0.3, 0.4]];
        playback.write(&frames).unwrap();
        assert_eq!(server.played_samples(), vec![0.1, 0.2, 0.3, 0.4]);
        assert_eq!(playback.frames_written(), 2);
    }

    #[test]
    fn test_stereo_on_mono_stream_does_no_io() {
        let server = MemoryServer::new();
        let mut playback = open(&server, 1);

        let frames = vec![[0.1f32, 0.2]; 8];
        let err = playback.write(&frames).unwrap_err();
        assert!(matches!(
            err,
            Error::Sample(SampleTypeError::ChannelMismatch {
                expected: 1,
                actual: 2
            })
        ));
        assert_eq!(server.stats().write_calls, 0);
        assert!(server.played().is_empty());
    }

    #[test]
    fn test_mono_on_stereo_stream_rejected() {
        let server = MemoryServer::new();
        let mut playback = open(&server, 2);

        let err = playback.write(&vec![0.0f32; 4]).unwrap_err();
        assert!(matches!(
            err,
            Error::Sample(SampleTypeError::ChannelMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_partial_service_completes() {
        let server = MemoryServer::new();
        server.set_max_transfer(Some(5));
        let mut playback = open(&server, 1);

        playback.write(&vec![1.0f32, 2.0, 3.0]).unwrap();
        assert_eq!(server.played_samples(), vec![1.0, 2.0, 3.0]);
        assert_eq!(server.stats().write_calls, 3);
    }

    #[test]
    fn test_stalled_server_is_incomplete() {
        let server = MemoryServer::new();
        server.set_max_transfer(Some(0));
        let mut playback = open(&server, 1);

        let err = playback.write_raw(&[0u8; 8]).unwrap_err();
        assert_eq!(
            err,
            AudioError::Incomplete {
                transferred: 0,
                requested: 8
            }
        );
        assert_eq!(playback.frames_written(), 0);
    }

    #[test]
    fn test_write_error_keeps_code() {
        let server = MemoryServer::new();
        server.fail_writes_after(1, codes::IO);
        let mut playback = open(&server, 1);

        playback.write(&vec![0.0f32; 2]).unwrap();
        let err = playback.write_raw(&[0u8; 4]).unwrap_err();
        assert!(matches!(err, AudioError::Write(_)));
        assert_eq!(err.code(), Some(codes::IO));
    }

    #[test]
    fn test_buffer_cap_requested() {
        let server = MemoryServer::new();
        let _default = open(&server, 1);
        let _capped = open_with(
            &server,
            StreamConfig {
                buffer_max_bytes: 8192,
                ..Default::default()
            },
        );

        let opened = server.opened();
        assert_eq!(opened[0].buffer_max_bytes, None);
        assert_eq!(opened[1].buffer_max_bytes, Some(8192));
        assert_eq!(opened[1].direction, Direction::Playback);
    }

    #[test]
    fn test_drain_and_close() {
        let server = MemoryServer::new();
        let mut playback = open(&server, 1);
        playback.drain().unwrap();
        playback.close();

        let stats = server.stats();
        assert_eq!(stats.drains, 1);
        assert_eq!(stats.closes, 1);
    }
}

//! Error types for demo recording and playback.

use std::fmt;
use std::io;

use ticsync_core::SyncError;
use ticsync_engine::ConfigError;

/// Errors that can occur while recording, reading or playing a demo.
#[derive(Debug)]
pub enum DemoError {
    /// An I/O error occurred during read or write.
    Io(io::Error),
    /// The stream does not start with `b"TICD"`.
    InvalidMagic,
    /// The format version is not supported by this build.
    UnsupportedVersion {
        /// The version found in the stream.
        found: u8,
    },
    /// A header or frame could not be decoded.
    MalformedRecord {
        /// What went wrong.
        detail: String,
    },
    /// The playback session has a different participant count.
    ParticipantMismatch {
        /// Count from the demo header.
        recorded: usize,
        /// Count configured on the playback session.
        session: usize,
    },
    /// A frame's stored hash does not match its contents.
    ChecksumMismatch {
        /// Game tic of the corrupt frame.
        tic: u64,
        /// Hash stored in the frame.
        recorded: u64,
        /// Hash computed from the decoded slot.
        computed: u64,
    },
    /// The playback session rejected its configuration.
    Config(ConfigError),
    /// The playback session failed while running a tic.
    Sync(SyncError),
}

impl fmt::Display for DemoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::InvalidMagic => write!(f, "invalid magic bytes (expected b\"TICD\")"),
            Self::UnsupportedVersion { found } => {
                write!(f, "unsupported format version {found}")
            }
            Self::MalformedRecord { detail } => write!(f, "malformed record: {detail}"),
            Self::ParticipantMismatch { recorded, session } => write!(
                f,
                "demo recorded with {recorded} participant(s), session has {session}"
            ),
            Self::ChecksumMismatch {
                tic,
                recorded,
                computed,
            } => write!(
                f,
                "checksum mismatch at tic {tic}: \
                 recorded={recorded:#018x}, computed={computed:#018x}"
            ),
            Self::Config(e) => write!(f, "playback config: {e}"),
            Self::Sync(e) => write!(f, "playback: {e}"),
        }
    }
}

impl std::error::Error for DemoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Sync(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for DemoError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<ConfigError> for DemoError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<SyncError> for DemoError {
    fn from(e: SyncError) -> Self {
        Self::Sync(e)
    }
}

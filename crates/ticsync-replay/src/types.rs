//! Data types for demo recording and playback.

use ticsync_core::{TicSlot, MAX_PARTICIPANTS};
use ticsync_engine::{SessionConfig, SyncMode};

use crate::error::DemoError;

/// Session parameters stored in the demo header.
///
/// # Examples
///
/// ```
/// use ticsync_engine::{SessionConfig, SyncMode};
/// use ticsync_replay::DemoHeader;
///
/// let header = DemoHeader::from_config(&SessionConfig::new(4, 2, 3, SyncMode::Legacy)).unwrap();
/// assert_eq!(header.participant_count, 4);
///
/// // Recorded frames are per game tic, so playback never duplicates.
/// let playback = header.playback_config();
/// assert_eq!(playback.ticdup, 1);
/// assert!(playback.single_tics);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DemoHeader {
    /// Participants in the recorded session.
    pub participant_count: u8,
    /// Duplication factor of the recorded session (informational).
    pub ticdup: u8,
    /// Sync mode of the recorded session.
    pub sync_mode: SyncMode,
}

impl DemoHeader {
    /// Header describing a session started with `config`.
    pub fn from_config(config: &SessionConfig) -> Result<Self, DemoError> {
        if config.participant_count == 0 || config.participant_count > MAX_PARTICIPANTS {
            return Err(DemoError::MalformedRecord {
                detail: format!("participant count {} out of range", config.participant_count),
            });
        }
        let ticdup = u8::try_from(config.ticdup).map_err(|_| DemoError::MalformedRecord {
            detail: format!("ticdup {} does not fit the header", config.ticdup),
        })?;
        Ok(Self {
            participant_count: config.participant_count as u8,
            ticdup,
            sync_mode: config.sync_mode,
        })
    }

    /// Configuration for a session that plays this demo back: same
    /// participants and sync mode, one game tic per recorded frame,
    /// single-tic pacing.
    pub fn playback_config(&self) -> SessionConfig {
        SessionConfig {
            single_tics: true,
            ..SessionConfig::new(usize::from(self.participant_count), 0, 1, self.sync_mode)
        }
    }
}

/// A single recorded game tic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Game tic number, counted from 0 at recording start.
    pub tic: u64,
    /// Exactly what was passed to `run_tic`.
    pub slot: TicSlot,
}

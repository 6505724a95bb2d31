//! Session configuration, sync mode selection, and validation.
//!
//! [`SessionConfig`] is the parameter set for starting a session.
//! [`validate()`](SessionConfig::validate) checks the invariants the
//! scheduler relies on; a config that fails validation never reaches the
//! counters.

use std::error::Error;
use std::fmt;

use ticsync_core::{MAX_NETGAME_STALL_TICS, MAX_PARTICIPANTS};

// ── SyncMode ───────────────────────────────────────────────────────

/// Scheduling policy, chosen once per session.
///
/// Affects only the producer's look-ahead caps and the frame's tic-count
/// arithmetic. The ring buffer, receiver, and execution loop are shared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SyncMode {
    /// Original lockstep timing: at least one tic per frame, five tics of
    /// look-ahead.
    Legacy,
    /// Clock-offset-adjusted pacing with tighter look-ahead.
    #[default]
    Adaptive,
}

impl SyncMode {
    /// Look-ahead cap for legacy sync.
    pub const LEGACY_MAX_LEAD: u64 = 5;
    /// Look-ahead cap for adaptive sync in a networked session
    /// (about 200ms at the nominal tic rate).
    pub const ADAPTIVE_MAX_LEAD: u64 = 8;
    /// Look-ahead cap for adaptive sync without a connected transport.
    pub const ADAPTIVE_LOCAL_MAX_LEAD: u64 = 2;

    /// Maximum number of network tics the producer may build beyond the
    /// last consumed tic.
    pub fn max_lead(self, connected: bool) -> u64 {
        match self {
            Self::Legacy => Self::LEGACY_MAX_LEAD,
            Self::Adaptive if connected => Self::ADAPTIVE_MAX_LEAD,
            Self::Adaptive => Self::ADAPTIVE_LOCAL_MAX_LEAD,
        }
    }

    /// Stable wire tag, used by the demo format.
    pub fn tag(self) -> u8 {
        match self {
            Self::Legacy => 0,
            Self::Adaptive => 1,
        }
    }

    /// Inverse of [`tag`](Self::tag).
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Legacy),
            1 => Some(Self::Adaptive),
            _ => None,
        }
    }
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => write!(f, "legacy"),
            Self::Adaptive => write!(f, "adaptive"),
        }
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`SessionConfig::validate()`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The tic duplication factor must be at least 1.
    TicdupZero,
    /// Participant count outside `1..=MAX_PARTICIPANTS`.
    ParticipantCountOutOfRange {
        /// The configured count.
        configured: usize,
    },
    /// The local participant index does not name a participant.
    LocalIndexOutOfRange {
        /// The configured local index.
        local_index: usize,
        /// The configured participant count.
        participant_count: usize,
    },
    /// The stall budget must be at least one tic.
    StallBudgetZero,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TicdupZero => write!(f, "ticdup must be at least 1"),
            Self::ParticipantCountOutOfRange { configured } => write!(
                f,
                "participant_count {configured} outside 1..={MAX_PARTICIPANTS}"
            ),
            Self::LocalIndexOutOfRange {
                local_index,
                participant_count,
            } => write!(
                f,
                "local_index {local_index} out of range for {participant_count} participants"
            ),
            Self::StallBudgetZero => write!(f, "stall_budget_tics must be at least 1"),
        }
    }
}

impl Error for ConfigError {}

// ── SessionConfig ──────────────────────────────────────────────────

/// Parameters for starting a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Number of participants, `1..=MAX_PARTICIPANTS`. Default: 1.
    pub participant_count: usize,
    /// Index of this process's own participant. Default: 0.
    pub local_index: usize,
    /// Each network tic is run this many times locally. Default: 1.
    pub ticdup: u32,
    /// Scheduling policy. Default: [`SyncMode::Adaptive`].
    pub sync_mode: SyncMode,
    /// Run exactly one tic per frame regardless of real time (demo
    /// timing and benchmarking). Default: false.
    pub single_tics: bool,
    /// Rendering is not capped to the tic rate, so a frame with nothing
    /// new to run may return immediately. Default: false.
    pub uncapped_frame_rate: bool,
    /// Wall-clock tics to wait for late data before giving the frame
    /// back. Default: [`MAX_NETGAME_STALL_TICS`].
    pub stall_budget_tics: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            participant_count: 1,
            local_index: 0,
            ticdup: 1,
            sync_mode: SyncMode::default(),
            single_tics: false,
            uncapped_frame_rate: false,
            stall_budget_tics: MAX_NETGAME_STALL_TICS,
        }
    }
}

impl SessionConfig {
    /// The `start_session` parameter set; everything else defaulted.
    pub fn new(
        participant_count: usize,
        local_index: usize,
        ticdup: u32,
        sync_mode: SyncMode,
    ) -> Self {
        Self {
            participant_count,
            local_index,
            ticdup,
            sync_mode,
            ..Self::default()
        }
    }

    /// Validate all invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ticdup < 1 {
            return Err(ConfigError::TicdupZero);
        }
        if self.participant_count == 0 || self.participant_count > MAX_PARTICIPANTS {
            return Err(ConfigError::ParticipantCountOutOfRange {
                configured: self.participant_count,
            });
        }
        if self.local_index >= self.participant_count {
            return Err(ConfigError::LocalIndexOutOfRange {
                local_index: self.local_index,
                participant_count: self.participant_count,
            });
        }
        if self.stall_budget_tics == 0 {
            return Err(ConfigError::StallBudgetZero);
        }
        Ok(())
    }
}

//! Error types for the ticsync scheduler.
//!
//! Only invariant violations are errors. Network stalls, look-ahead
//! backpressure, and participants leaving are expected conditions and
//! are reported through frame outcomes and UI notices instead.

use std::error::Error;
use std::fmt;

/// Fatal scheduler faults.
///
/// Returning one of these means the tic counters can no longer be
/// trusted; continuing would desynchronize participants silently. The
/// session refuses further frames after the first fault.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncError {
    /// The lowest fully buffered tic fell below the tics already
    /// consumed by the simulation.
    TicCounterRegressed {
        /// Lowest buffered network tic at the time of the check.
        lowtic: u64,
        /// Network tics already consumed (`gametic / ticdup`).
        consumed: u64,
    },
    /// The execution loop was about to run a tic beyond the lowest
    /// fully buffered tic.
    GameticOverrun {
        /// Network tic about to run.
        consumed: u64,
        /// Lowest buffered network tic.
        lowtic: u64,
    },
    /// The session already hit a fatal fault and must be restarted.
    SessionAborted,
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TicCounterRegressed { lowtic, consumed } => {
                write!(f, "lowtic {lowtic} < consumed tic {consumed}")
            }
            Self::GameticOverrun { consumed, lowtic } => {
                write!(f, "consumed tic {consumed} > lowtic {lowtic}")
            }
            Self::SessionAborted => write!(f, "session aborted after a fatal sync fault"),
        }
    }
}

impl Error for SyncError {}

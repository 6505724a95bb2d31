//! Core types and traits for the ticsync lockstep scheduler.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions shared by the scheduler, the demo
//! recorder, and the embedding game: command records, tic slots,
//! tic identifiers, error types, and the collaborator traits through
//! which the scheduler reaches input, simulation, transport, UI, and
//! the real-time clock.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod command;
pub mod error;
pub mod id;
pub mod slot;
pub mod traits;

pub use command::{Buttons, CommandRecord, OutgoingTic, SpecialAction};
pub use error::SyncError;
pub use id::TicId;
pub use slot::TicSlot;
pub use traits::{Clock, GameLoop, LocalTransport, Notice, Transport, Ui};

/// Number of tic slots in the ring buffer.
///
/// Tic `t` lives in slot `t % BACKUPTICS`. The look-ahead caps keep the
/// distance between the lowest unconsumed tic and the highest written
/// tic well below this value.
pub const BACKUPTICS: usize = 128;

/// Maximum number of participants in one session.
pub const MAX_PARTICIPANTS: usize = 8;

/// Nominal simulation rate in tics per second.
pub const TICRATE: u64 = 35;

/// Default wall-clock budget (in tics) the scheduler waits for late
/// network data before giving the frame back to the UI.
pub const MAX_NETGAME_STALL_TICS: u64 = 5;

/// Convert a millisecond timestamp to whole tics at [`TICRATE`].
///
/// Negative inputs (possible after a clock-offset adjustment early in a
/// session) saturate to zero.
pub fn ms_to_tics(ms: i64) -> u64 {
    if ms <= 0 {
        return 0;
    }
    (ms as u64).saturating_mul(TICRATE) / 1000
}

//! Collaborator traits: everything the scheduler needs from the outside
//! world.
//!
//! The scheduler owns one implementation of each, injected when the
//! session is created. Normal play and demo playback differ only in the
//! [`GameLoop`] they inject.

use crate::command::{CommandRecord, OutgoingTic};

/// The host game mode driven by the scheduler.
///
/// Implementations must be deterministic in [`run_tic`](Self::run_tic):
/// the same sequence of inputs must produce the same simulation on every
/// participant.
pub trait GameLoop: Send {
    /// Drain pending device events. Called once per locally built tic,
    /// before the menu runs.
    fn process_events(&mut self) {}

    /// Run the menu for one tic. May change UI state but must not block.
    fn run_menu(&mut self);

    /// Sample the input devices into a fresh command record.
    ///
    /// Has no knowledge of tic numbers.
    fn build_ticcmd(&mut self) -> CommandRecord;

    /// Execute one game tic with the given commands and presence set.
    ///
    /// Both slices have length [`MAX_PARTICIPANTS`](crate::MAX_PARTICIPANTS).
    fn run_tic(&mut self, commands: &[CommandRecord], present: &[bool]);

    /// Whether the last executed tic asked to quit or advance the demo.
    /// Checked between tics; `true` ends the frame's execution loop.
    fn quit_requested(&self) -> bool {
        false
    }
}

/// Outbound side of the transport layer.
///
/// Inbound tics do not go through this trait: the transport hands them
/// to the session's receiver directly, or through an inbox channel.
pub trait Transport: Send {
    /// Whether a networked session is active. A disconnected transport
    /// means single-player: remote tics are not waited for.
    fn is_connected(&self) -> bool;

    /// Give the transport a turn to do I/O. Called at every pump.
    fn run(&mut self) {}

    /// Send the commands built since the last flush (plus any resent
    /// tics for redundancy).
    fn send(&mut self, tics: &[OutgoingTic]);

    /// Whether the participant at `index` is still part of the session.
    fn is_session_member_present(&self, index: usize) -> bool;

    /// Clock skew adjustment in milliseconds, applied to the pacing
    /// clock in adaptive sync mode.
    fn clock_offset_ms(&self) -> i64 {
        0
    }

    /// Number of already-sent tics to resend with every flush.
    fn extra_tics(&self) -> u32 {
        0
    }

    /// Tics the local producer should skip to let the other
    /// participants catch up. Returns and clears the pending count.
    fn take_skip_tics(&mut self) -> u32 {
        0
    }
}

/// Transport for single-player sessions: never connected, sends nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalTransport;

impl Transport for LocalTransport {
    fn is_connected(&self) -> bool {
        false
    }

    fn send(&mut self, _tics: &[OutgoingTic]) {}

    fn is_session_member_present(&self, _index: usize) -> bool {
        false
    }
}

/// A one-shot user-visible notification raised by the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notice {
    /// The transport reported the connection is gone.
    Disconnected,
    /// A participant's presence flag went from true to false.
    ParticipantLeft(usize),
}

/// The UI collaborator.
pub trait Ui: Send {
    /// Display a notice.
    fn notify(&mut self, notice: Notice);

    /// Whether the game screen is currently shown (not covered by a
    /// wipe or a full-screen menu).
    fn screen_visible(&self) -> bool {
        true
    }
}

/// A monotonic real-time clock.
pub trait Clock: Send {
    /// Milliseconds since an arbitrary fixed origin. Never decreases.
    fn now_ms(&self) -> u64;

    /// Block the calling thread for roughly `ms` milliseconds.
    fn sleep_ms(&self, ms: u64);
}

//! Test utilities and mock collaborators for ticsync development.
//!
//! Every mock hands out a cloneable handle sharing its state, so a test
//! can box the mock into a session and still script and inspect it.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod transport;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use ticsync_core::{ms_to_tics, Clock, CommandRecord, Notice, Ui, TICRATE};

pub use fixtures::{ExecutedTic, GameCounts, GameHandle, MockGame};
pub use transport::{EchoServer, MockTransport, TransportHandle};

/// A clock that only moves when told to. `sleep_ms` advances it.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current time in milliseconds.
    pub fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }

    pub fn advance_ms(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    /// Advance to the earliest millisecond at which exactly `tics` more
    /// whole tics have elapsed.
    pub fn advance_tics(&self, tics: u64) {
        let target_tic = ms_to_tics(self.now() as i64) + tics;
        let target_ms = (target_tic * 1000).div_ceil(TICRATE);
        let now = self.now();
        if target_ms > now {
            self.advance_ms(target_ms - now);
        }
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now()
    }

    fn sleep_ms(&self, ms: u64) {
        self.advance_ms(ms);
    }
}

#[derive(Debug)]
struct UiState {
    notices: Vec<Notice>,
    screen_visible: bool,
}

/// Records notices; screen visibility is scriptable.
#[derive(Debug)]
pub struct MockUi {
    state: Arc<Mutex<UiState>>,
}

/// Shared view of a [`MockUi`].
#[derive(Clone, Debug)]
pub struct UiHandle {
    state: Arc<Mutex<UiState>>,
}

impl MockUi {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(UiState {
                notices: Vec::new(),
                screen_visible: true,
            })),
        }
    }

    pub fn handle(&self) -> UiHandle {
        UiHandle {
            state: Arc::clone(&self.state),
        }
    }
}

impl Default for MockUi {
    fn default() -> Self {
        Self::new()
    }
}

impl Ui for MockUi {
    fn notify(&mut self, notice: Notice) {
        self.state.lock().unwrap().notices.push(notice);
    }

    fn screen_visible(&self) -> bool {
        self.state.lock().unwrap().screen_visible
    }
}

impl UiHandle {
    /// Every notice raised so far, in order.
    pub fn notices(&self) -> Vec<Notice> {
        self.state.lock().unwrap().notices.clone()
    }

    pub fn set_screen_visible(&self, visible: bool) {
        self.state.lock().unwrap().screen_visible = visible;
    }
}

/// The command a simulated remote participant sends for `tic`.
///
/// Deterministic and distinct per tic and participant, so tests can
/// check exactly which remote input reached the game.
pub fn remote_command(tic: u64, index: usize) -> CommandRecord {
    CommandRecord {
        forward: (tic as i8).wrapping_mul(3).wrapping_add(index as i8),
        side: -(index as i8),
        angle_turn: (tic as i16).wrapping_mul(16),
        consistency: (tic as u16) ^ ((index as u16) << 12),
        ..CommandRecord::default()
    }
}

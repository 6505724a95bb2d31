//! Ticsync: tic-synchronized lockstep scheduling for deterministic
//! multiplayer simulations.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all ticsync sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use ticsync::prelude::*;
//!
//! // A game that walks forward while the attack button is held.
//! struct Walker {
//!     position: i64,
//! }
//!
//! impl GameLoop for Walker {
//!     fn run_menu(&mut self) {}
//!     fn build_ticcmd(&mut self) -> CommandRecord {
//!         CommandRecord { forward: 1, buttons: Buttons::ATTACK, ..CommandRecord::default() }
//!     }
//!     fn run_tic(&mut self, commands: &[CommandRecord], present: &[bool]) {
//!         if present[0] && commands[0].buttons.contains(Buttons::ATTACK) {
//!             self.position += i64::from(commands[0].forward);
//!         }
//!     }
//! }
//!
//! struct Console;
//! impl Ui for Console {
//!     fn notify(&mut self, notice: Notice) {
//!         eprintln!("{notice:?}");
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = Session::new(
//!     SessionConfig::default(),
//!     Collaborators::local(Walker { position: 0 }, Console),
//! )?;
//! let report = session.advance_frame()?;
//! assert_eq!(report.outcome, FrameOutcome::Ran);
//! assert!(report.tics_run >= 1);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `ticsync-core` | Command records, tic slots, IDs, collaborator traits |
//! | [`engine`] | `ticsync-engine` | Session, ring buffer, pump, scheduler |
//! | [`replay`] | `ticsync-replay` | Demo recording and playback |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, constants, and collaborator traits (`ticsync-core`).
///
/// Contains [`types::CommandRecord`], [`types::TicSlot`], and the traits
/// a host implements: [`types::GameLoop`], [`types::Transport`],
/// [`types::Ui`], [`types::Clock`].
pub use ticsync_core as types;

/// The lockstep scheduler (`ticsync-engine`).
///
/// [`engine::Session`] owns the counters and the ring buffer; call
/// [`engine::Session::advance_frame`] once per displayed frame.
pub use ticsync_engine as engine;

/// Demo recording and playback (`ticsync-replay`).
///
/// Wrap the game in a [`replay::RecordingLoop`] to record; play back
/// with a [`replay::DemoPlayer`].
pub use ticsync_replay as replay;

/// Common imports for typical ticsync usage.
///
/// ```rust
/// use ticsync::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use ticsync_core::{
        Buttons, Clock, CommandRecord, GameLoop, Notice, OutgoingTic, SpecialAction, TicId,
        TicSlot, Transport, Ui,
    };

    // Errors
    pub use ticsync_core::SyncError;
    pub use ticsync_engine::ConfigError;
    pub use ticsync_replay::DemoError;

    // Engine
    pub use ticsync_engine::{
        Collaborators, FrameOutcome, FrameReport, Incoming, InboxSender, Session, SessionConfig,
        SyncMode,
    };

    // Replay
    pub use ticsync_replay::{DemoPlayer, DemoReader, DemoWriter, RecordingLoop};
}

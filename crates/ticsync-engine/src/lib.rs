//! Tic-synchronized lockstep scheduler.
//!
//! Provides the [`Session`] that decides, once per displayed frame, how
//! many simulation tics to run, assembles every participant's command
//! for each tic in a fixed ring buffer, and feeds complete tics to the
//! game in strictly increasing order.
//!
//! # Data flow
//!
//! ```text
//!   GameLoop::build_ticcmd ──> producer ──> TicRing <── receiver <── Inbox / transport
//!                                             │
//!                       advance_frame ────────┴──> GameLoop::run_tic
//! ```
//!
//! The network pump paces the producer against the real-time clock and
//! flushes freshly built commands to the [`Transport`](ticsync_core::Transport).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod clock;
pub mod config;
pub mod inbox;
pub mod metrics;
pub mod producer;
pub mod pump;
pub mod receiver;
pub mod ring;
pub mod scheduler;
pub mod session;

pub use clock::SystemClock;
pub use config::{ConfigError, SessionConfig, SyncMode};
pub use inbox::{Inbox, InboxError, InboxSender};
pub use metrics::SchedulerMetrics;
pub use receiver::Incoming;
pub use ring::TicRing;
pub use scheduler::{tics_to_run, FrameOutcome, FrameReport};
pub use session::{Collaborators, Session};

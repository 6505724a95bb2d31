//! Demo recording and playback for ticsync sessions.
//!
//! A demo is the exact sequence of slots a session handed to
//! [`GameLoop::run_tic`](ticsync_core::GameLoop::run_tic). Playing it
//! back through [`Session::run_recorded_tic`](ticsync_engine::Session::run_recorded_tic)
//! reproduces those calls bit for bit, with no transport and no clock.
//!
//! # Architecture
//!
//! - [`RecordingLoop`] wraps a game and records every executed tic
//! - [`DemoWriter`] encodes frames to any `Write` sink
//! - [`DemoReader`] decodes frames from any `Read` source
//! - [`DemoPlayer`] feeds decoded frames to a playback session
//!
//! # Format
//!
//! ```text
//! [MAGIC "TICD"] [VERSION u8] [participant_count u8] [ticdup u8] [sync_mode u8]
//! [Frame 1] [Frame 2] ... [Frame N]
//! ```
//!
//! Each frame holds the game tic number, the presence bitmask, all
//! command records, and an FNV-1a hash of the slot.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod error;
pub mod hash;
pub mod player;
pub mod reader;
pub mod recording;
pub mod types;
pub mod writer;

pub use error::DemoError;
pub use hash::slot_hash;
pub use player::DemoPlayer;
pub use reader::{DemoReader, FrameIter};
pub use recording::RecordingLoop;
pub use types::{DemoHeader, Frame};
pub use writer::DemoWriter;

/// Magic bytes at the start of every demo file.
pub const MAGIC: [u8; 4] = *b"TICD";

/// Current binary format version.
pub const FORMAT_VERSION: u8 = 1;

//! Benchmark profiles for the ticsync scheduler.
//!
//! - [`ChecksumGame`]: a game whose simulation folds every command into
//!   a running hash, with seeded input
//! - [`local_profile`]: a single-player session on a manual clock
//! - [`networked_profile`]: a session whose peers are simulated by an
//!   echo transport

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use ticsync_core::{Buttons, CommandRecord, GameLoop};
use ticsync_engine::{Collaborators, ConfigError, Session, SessionConfig, SyncMode};
use ticsync_test_utils::{EchoServer, ManualClock, MockTransport, MockUi};

/// A minimal deterministic game: input is drawn from a seeded stream and
/// each tic hashes the commands of everyone present.
pub struct ChecksumGame {
    rng: ChaCha8Rng,
    checksum: u64,
}

impl ChecksumGame {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            checksum: 0,
        }
    }

    pub fn checksum(&self) -> u64 {
        self.checksum
    }
}

impl GameLoop for ChecksumGame {
    fn run_menu(&mut self) {}

    fn build_ticcmd(&mut self) -> CommandRecord {
        CommandRecord {
            forward: self.rng.random_range(-50..=50),
            side: self.rng.random_range(-40..=40),
            angle_turn: self.rng.random(),
            buttons: Buttons(self.rng.random::<u8>() & 0x7F),
            ..CommandRecord::default()
        }
    }

    fn run_tic(&mut self, commands: &[CommandRecord], present: &[bool]) {
        for (command, &here) in commands.iter().zip(present) {
            if here {
                for b in command.to_bytes() {
                    self.checksum = (self.checksum ^ u64::from(b)).wrapping_mul(0x100000001B3);
                }
            }
        }
    }
}

/// A single-player session driven by a manual clock.
pub fn local_profile(
    ticdup: u32,
    sync_mode: SyncMode,
    seed: u64,
) -> Result<(Session, ManualClock), ConfigError> {
    let clock = ManualClock::new();
    let session = Session::new(
        SessionConfig::new(1, 0, ticdup, sync_mode),
        Collaborators {
            game: Box::new(ChecksumGame::new(seed)),
            transport: Box::new(MockTransport::disconnected()),
            ui: Box::new(MockUi::new()),
            clock: Box::new(clock.clone()),
        },
    )?;
    Ok((session, clock))
}

/// A session with `participants` players, all but the local one played
/// by an echo transport that answers after `latency_runs` pumps.
pub fn networked_profile(
    participants: usize,
    sync_mode: SyncMode,
    latency_runs: u64,
    seed: u64,
) -> Result<(Session, ManualClock), ConfigError> {
    let clock = ManualClock::new();
    let transport =
        MockTransport::with_echo(EchoServer::new(participants, 0).latency(latency_runs));
    let handle = transport.handle();
    let mut session = Session::new(
        SessionConfig::new(participants, 0, 1, sync_mode),
        Collaborators {
            game: Box::new(ChecksumGame::new(seed)),
            transport: Box::new(transport),
            ui: Box::new(MockUi::new()),
            clock: Box::new(clock.clone()),
        },
    )?;
    let tx = session.open_inbox(1024);
    handle.on_deliver(move |slot| {
        let _ = tx.try_deliver(slot);
    });
    Ok((session, clock))
}

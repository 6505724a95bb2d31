//! Scriptable [`GameLoop`] implementations.
//!
//! - [`MockGame`] records every call and produces distinct commands.
//! - [`MockGame::seeded`] produces pseudo-random commands from a seed.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use ticsync_core::{Buttons, CommandRecord, GameLoop, MAX_PARTICIPANTS};

/// One recorded `run_tic` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExecutedTic {
    pub commands: [CommandRecord; MAX_PARTICIPANTS],
    pub present: [bool; MAX_PARTICIPANTS],
}

/// Call counters of a [`MockGame`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GameCounts {
    pub event_polls: u64,
    pub menu_runs: u64,
    pub builds: u64,
    pub tics_run: u64,
}

#[derive(Debug)]
struct GameState {
    counts: GameCounts,
    queued: VecDeque<CommandRecord>,
    built: Vec<CommandRecord>,
    executed: Vec<ExecutedTic>,
    quit_after: Option<u64>,
    rng: Option<ChaCha8Rng>,
}

/// A game that records everything the scheduler does to it.
///
/// Without a seed, the n-th built command has `consistency = n`, so
/// every local command is distinguishable.
#[derive(Debug)]
pub struct MockGame {
    state: Arc<Mutex<GameState>>,
}

/// Shared view of a [`MockGame`].
#[derive(Clone, Debug)]
pub struct GameHandle {
    state: Arc<Mutex<GameState>>,
}

impl MockGame {
    pub fn new() -> Self {
        Self::with_rng(None)
    }

    /// Commands drawn from a ChaCha8 stream seeded with `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(Some(ChaCha8Rng::seed_from_u64(seed)))
    }

    fn with_rng(rng: Option<ChaCha8Rng>) -> Self {
        Self {
            state: Arc::new(Mutex::new(GameState {
                counts: GameCounts::default(),
                queued: VecDeque::new(),
                built: Vec::new(),
                executed: Vec::new(),
                quit_after: None,
                rng,
            })),
        }
    }

    pub fn handle(&self) -> GameHandle {
        GameHandle {
            state: Arc::clone(&self.state),
        }
    }
}

impl Default for MockGame {
    fn default() -> Self {
        Self::new()
    }
}

fn random_command(rng: &mut ChaCha8Rng) -> CommandRecord {
    let mut buttons = Buttons(rng.random::<u8>() & !Buttons::SPECIAL.bits());
    if rng.random_ratio(1, 16) {
        buttons = Buttons::SPECIAL | Buttons::PAUSE;
    }
    CommandRecord {
        forward: rng.random_range(-50..=50),
        side: rng.random_range(-40..=40),
        angle_turn: rng.random(),
        look: 0,
        chat: if rng.random_ratio(1, 8) { b'a' + rng.random_range(0..26) } else { 0 },
        buttons,
        buttons2: 0,
        consistency: rng.random(),
    }
}

impl GameLoop for MockGame {
    fn process_events(&mut self) {
        self.state.lock().unwrap().counts.event_polls += 1;
    }

    fn run_menu(&mut self) {
        self.state.lock().unwrap().counts.menu_runs += 1;
    }

    fn build_ticcmd(&mut self) -> CommandRecord {
        let mut state = self.state.lock().unwrap();
        let n = state.counts.builds;
        state.counts.builds += 1;
        let command = match state.queued.pop_front() {
            Some(command) => command,
            None => match state.rng.as_mut() {
                Some(rng) => random_command(rng),
                None => CommandRecord {
                    forward: (n % 50) as i8,
                    consistency: n as u16,
                    ..CommandRecord::default()
                },
            },
        };
        state.built.push(command);
        command
    }

    fn run_tic(&mut self, commands: &[CommandRecord], present: &[bool]) {
        let mut state = self.state.lock().unwrap();
        let mut tic = ExecutedTic {
            commands: [CommandRecord::default(); MAX_PARTICIPANTS],
            present: [false; MAX_PARTICIPANTS],
        };
        tic.commands.copy_from_slice(commands);
        tic.present.copy_from_slice(present);
        state.executed.push(tic);
        state.counts.tics_run += 1;
    }

    fn quit_requested(&self) -> bool {
        let state = self.state.lock().unwrap();
        state
            .quit_after
            .is_some_and(|n| state.counts.tics_run >= n)
    }
}

impl GameHandle {
    pub fn counts(&self) -> GameCounts {
        self.state.lock().unwrap().counts
    }

    /// Every command returned by `build_ticcmd`, in order.
    pub fn built_commands(&self) -> Vec<CommandRecord> {
        self.state.lock().unwrap().built.clone()
    }

    /// Every `run_tic` call, in order.
    pub fn executed(&self) -> Vec<ExecutedTic> {
        self.state.lock().unwrap().executed.clone()
    }

    /// Return `command` from the next `build_ticcmd` call instead of the
    /// generated one. Queued commands are used first-in first-out.
    pub fn queue_command(&self, command: CommandRecord) {
        self.state.lock().unwrap().queued.push_back(command);
    }

    /// Request quit once `tics` game tics have run.
    pub fn quit_after(&self, tics: u64) {
        self.state.lock().unwrap().quit_after = Some(tics);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_commands_are_distinct() {
        let mut game = MockGame::new();
        let a = game.build_ticcmd();
        let b = game.build_ticcmd();
        assert_ne!(a, b);
        assert_eq!(game.handle().built_commands(), vec![a, b]);
    }

    #[test]
    fn seeded_games_agree() {
        let mut a = MockGame::seeded(7);
        let mut b = MockGame::seeded(7);
        for _ in 0..32 {
            assert_eq!(a.build_ticcmd(), b.build_ticcmd());
        }
    }

    #[test]
    fn queued_command_comes_first() {
        let mut game = MockGame::new();
        let cmd = CommandRecord {
            forward: -7,
            ..CommandRecord::default()
        };
        game.handle().queue_command(cmd);
        assert_eq!(game.build_ticcmd(), cmd);
        assert_ne!(game.build_ticcmd(), cmd);
    }

    #[test]
    fn quit_after_counts_run_tics() {
        let mut game = MockGame::new();
        game.handle().quit_after(2);
        let commands = [CommandRecord::default(); MAX_PARTICIPANTS];
        let present = [false; MAX_PARTICIPANTS];
        game.run_tic(&commands, &present);
        assert!(!game.quit_requested());
        game.run_tic(&commands, &present);
        assert!(game.quit_requested());
    }
}

//! Integration test: a transport thread delivering through a small
//! bounded inbox while the session runs frames.

use std::thread;

use ticsync_core::TicSlot;
use ticsync_engine::{Collaborators, FrameOutcome, Session, SessionConfig, SyncMode};
use ticsync_test_utils::{remote_command, ManualClock, MockGame, MockTransport, MockUi};

const TICS: u64 = 40;

#[test]
fn remote_thread_feeds_session_in_order() {
    let clock = ManualClock::new();
    let game = MockGame::new();
    let handle = game.handle();
    let mut session = Session::new(
        SessionConfig::new(2, 0, 1, SyncMode::Legacy),
        Collaborators {
            game: Box::new(game),
            transport: Box::new(MockTransport::connected(2)),
            ui: Box::new(MockUi::new()),
            clock: Box::new(clock.clone()),
        },
    )
    .unwrap();
    let tx = session.open_inbox(4);

    let producer = thread::spawn(move || {
        for tic in 0..TICS {
            let mut slot = TicSlot::default();
            slot.set(1, remote_command(tic, 1));
            // Blocks while the inbox is full.
            tx.deliver_slot(slot).unwrap();
        }
    });

    let mut frames = 0;
    while session.gametic() < TICS {
        clock.advance_tics(1);
        let report = session.advance_frame().unwrap();
        assert_ne!(report.outcome, FrameOutcome::NoParticipants);
        frames += 1;
        assert!(frames < 100_000, "session never caught up");
        thread::yield_now();
    }
    producer.join().unwrap();

    let built = handle.built_commands();
    for (tic, executed) in handle.executed().iter().enumerate() {
        assert_eq!(executed.commands[0], built[tic]);
        assert_eq!(executed.commands[1], remote_command(tic as u64, 1));
    }
}

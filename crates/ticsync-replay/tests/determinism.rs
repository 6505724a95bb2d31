//! Integration test: a demo recorded from a live networked session plays
//! back with bit-identical `run_tic` inputs.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use ticsync_core::{CommandRecord, SpecialAction};
use ticsync_engine::{Collaborators, FrameOutcome, Session, SessionConfig, SyncMode};
use ticsync_replay::{DemoError, DemoHeader, DemoPlayer, DemoWriter, RecordingLoop};
use ticsync_test_utils::{
    EchoServer, ExecutedTic, GameHandle, ManualClock, MockGame, MockTransport, MockUi,
};

/// A `Write` sink the test can read after the session has taken
/// ownership of the writer.
#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn record(config: SessionConfig, frames: usize) -> (Vec<u8>, Vec<ExecutedTic>) {
    let clock = ManualClock::new();
    let game = MockGame::seeded(0xD00D);
    let game_handle = game.handle();
    game_handle.queue_command(CommandRecord {
        forward: 10,
        chat: b'A',
        buttons: SpecialAction::Pause.to_buttons(),
        ..Default::default()
    });
    let buf = SharedBuf::default();
    let writer = DemoWriter::new(buf.clone(), DemoHeader::from_config(&config).unwrap()).unwrap();

    let transport = MockTransport::with_echo(
        EchoServer::new(config.participant_count, config.local_index)
            .latency(1)
            .depart(2, 6),
    );
    let transport_handle = transport.handle();
    let mut session = Session::new(
        config,
        Collaborators {
            game: Box::new(RecordingLoop::new(game, writer)),
            transport: Box::new(transport),
            ui: Box::new(MockUi::new()),
            clock: Box::new(clock.clone()),
        },
    )
    .unwrap();
    let tx = session.open_inbox(256);
    transport_handle.on_deliver(move |slot| {
        let _ = tx.try_deliver(slot);
    });

    for _ in 0..frames {
        clock.advance_tics(1);
        session.advance_frame().unwrap();
    }
    let bytes = buf.0.lock().unwrap().clone();
    (bytes, game_handle.executed())
}

fn playback_session(header: &DemoHeader) -> (Session, GameHandle) {
    let game = MockGame::new();
    let handle = game.handle();
    let session = Session::new(
        header.playback_config(),
        Collaborators {
            game: Box::new(game),
            transport: Box::new(MockTransport::disconnected()),
            ui: Box::new(MockUi::new()),
            clock: Box::new(ManualClock::new()),
        },
    )
    .unwrap();
    (session, handle)
}

#[test]
fn playback_reproduces_recorded_inputs() {
    for sync_mode in [SyncMode::Legacy, SyncMode::Adaptive] {
        let config = SessionConfig::new(3, 1, 2, sync_mode);
        let (demo, live) = record(config, 40);
        assert!(!live.is_empty());

        let mut player = DemoPlayer::open(demo.as_slice()).unwrap();
        let (mut session, replayed) = playback_session(player.header());
        player.attach(&mut session).unwrap();
        let played = player.play_to_end(&mut session).unwrap();

        assert_eq!(played as usize, live.len());
        assert_eq!(replayed.executed(), live);
        assert_eq!(session.gametic(), live.len() as u64);
    }
}

#[test]
fn recorded_duplicates_keep_their_squelch() {
    let config = SessionConfig::new(3, 1, 3, SyncMode::Adaptive);
    let (demo, live) = record(config, 10);

    let mut player = DemoPlayer::open(demo.as_slice()).unwrap();
    let (mut session, replayed) = playback_session(player.header());
    player.attach(&mut session).unwrap();
    player.play_to_end(&mut session).unwrap();

    let replayed = replayed.executed();
    assert_eq!(replayed[0].commands[1].chat, b'A');
    assert_eq!(replayed[1].commands[1].chat, 0);
    assert_eq!(replayed[2].commands[1].chat, 0);
    assert_eq!(replayed[1].commands[1].forward, 10);
    assert_eq!(replayed[..3], live[..3]);
}

#[test]
fn departure_is_replayed_as_absence() {
    let config = SessionConfig::new(3, 1, 1, SyncMode::Adaptive);
    let (demo, live) = record(config, 20);
    assert!(live.len() > 6);

    let mut player = DemoPlayer::open(demo.as_slice()).unwrap();
    let (mut session, replayed) = playback_session(player.header());
    player.attach(&mut session).unwrap();
    player.play_to_end(&mut session).unwrap();

    let replayed = replayed.executed();
    assert!(replayed[5].present[2]);
    assert!(!replayed[6].present[2]);
}

#[test]
fn wrong_participant_count_is_rejected() {
    let config = SessionConfig::new(3, 1, 1, SyncMode::Legacy);
    let (demo, _) = record(config, 5);

    let mut player = DemoPlayer::open(demo.as_slice()).unwrap();
    let (mut session, _) = playback_session(&DemoHeader {
        participant_count: 2,
        ..*player.header()
    });
    assert!(matches!(
        player.play_tic(&mut session),
        Err(DemoError::ParticipantMismatch {
            recorded: 3,
            session: 2
        })
    ));
}

#[test]
fn playback_stops_on_quit() {
    let config = SessionConfig::new(3, 1, 1, SyncMode::Adaptive);
    let (demo, live) = record(config, 20);

    let mut player = DemoPlayer::open(demo.as_slice()).unwrap();
    let game = MockGame::new();
    let handle = game.handle();
    handle.quit_after(4);
    let mut session = Session::new(
        player.header().playback_config(),
        Collaborators {
            game: Box::new(game),
            transport: Box::new(MockTransport::disconnected()),
            ui: Box::new(MockUi::new()),
            clock: Box::new(ManualClock::new()),
        },
    )
    .unwrap();
    player.attach(&mut session).unwrap();

    assert_eq!(player.play_to_end(&mut session).unwrap(), 4);
    assert_eq!(handle.executed()[..], live[..4]);
    assert_eq!(
        player.play_tic(&mut session).unwrap(),
        Some(FrameOutcome::QuitRequested)
    );
}

#[test]
fn empty_demo_plays_nothing() {
    let header = DemoHeader {
        participant_count: 1,
        ticdup: 1,
        sync_mode: SyncMode::Legacy,
    };
    let writer = DemoWriter::new(Vec::new(), header).unwrap();
    let demo = writer.into_inner();

    let mut player = DemoPlayer::open(demo.as_slice()).unwrap();
    let (mut session, replayed) = playback_session(&header);
    player.attach(&mut session).unwrap();
    assert_eq!(player.play_tic(&mut session).unwrap(), None);
    assert!(replayed.executed().is_empty());
}

//! Run-ahead scheduler: the once-per-frame control loop.
//!
//! Each call to [`Session::advance_frame`] decides how many tics are
//! both owed (by real elapsed time) and available (fully buffered),
//! waits a bounded time for missing data, then executes them in order.

use log::{debug, error, info, warn};
use ticsync_core::{ms_to_tics, Notice, SyncError, TicId, TicSlot};

use crate::config::SyncMode;
use crate::session::Session;

/// What a frame ended up doing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Tics were executed (possibly zero in uncapped adaptive mode).
    Ran,
    /// Required data did not arrive within the stall budget.
    Stalled,
    /// Nothing new to show; returned without waiting.
    Idle,
    /// No participant remains in the session.
    NoParticipants,
    /// The game asked to stop between tics.
    QuitRequested,
}

/// Summary of one [`Session::advance_frame`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameReport {
    /// How the frame ended.
    pub outcome: FrameOutcome,
    /// Game tics executed (network tics times ticdup).
    pub tics_run: u64,
    /// Ticdup-scaled real tics elapsed since the previous frame.
    pub real_tics: u64,
    /// Network tics buffered and not yet run when the frame started.
    pub available: u64,
}

/// Network tics to run this frame given elapsed real tics and the
/// number of tics fully buffered.
///
/// Runs one extra tic to catch up when more than that is buffered,
/// never more than what is buffered.
///
/// ```
/// use ticsync_engine::tics_to_run;
///
/// assert_eq!(tics_to_run(1, 5), 2);
/// assert_eq!(tics_to_run(1, 2), 1);
/// assert_eq!(tics_to_run(4, 3), 3);
/// assert_eq!(tics_to_run(0, 0), 0);
/// ```
pub fn tics_to_run(real_tics: u64, available: u64) -> u64 {
    if real_tics + 1 < available {
        real_tics + 1
    } else if real_tics < available {
        real_tics
    } else {
        available
    }
}

impl Session {
    /// Run one display frame's worth of simulation.
    ///
    /// Stalls, idle frames and departed participants are reported in the
    /// returned [`FrameReport`]. Corrupted tic counters are fatal: the
    /// session is poisoned and every later call returns
    /// [`SyncError::SessionAborted`] until [`start_session`](Self::start_session).
    pub fn advance_frame(&mut self) -> Result<FrameReport, SyncError> {
        if self.aborted {
            return Err(SyncError::SessionAborted);
        }
        self.metrics.frames += 1;

        let enter_ms = self.clock.now_ms();
        let enter_tic = self.real_time_tics();
        let real_tics = enter_tic.saturating_sub(self.old_enter_tic);
        self.old_enter_tic = enter_tic;

        if self.config.single_tics {
            self.build_next_tic();
            self.flush_outgoing();
        } else {
            self.pump();
        }

        let mut lowtic = self.checked_low_tic()?;
        let available = lowtic - self.consumed();
        let mut want = tics_to_run(real_tics, available);

        let report = |outcome, tics_run| FrameReport {
            outcome,
            tics_run,
            real_tics,
            available,
        };

        if self.config.sync_mode == SyncMode::Adaptive && self.config.uncapped_frame_rate {
            if want == 0 && real_tics == 0 && self.ui.screen_visible() {
                self.metrics.early_returns += 1;
                return Ok(report(FrameOutcome::Idle, 0));
            }
        } else {
            want = want.max(1);
        }

        if !self.players_in_game() {
            return Ok(report(FrameOutcome::NoParticipants, 0));
        }
        debug!("frame: real {real_tics}, available {available}, running {want}");

        while lowtic < self.consumed() + want {
            self.pump();
            lowtic = self.checked_low_tic()?;
            if lowtic >= self.consumed() + want {
                break;
            }

            let waited_ms = self.clock.now_ms().saturating_sub(enter_ms);
            if ms_to_tics(waited_ms as i64) >= self.config.stall_budget_tics {
                if !self.stalled {
                    info!(
                        "waiting for tic {} (recvtic {}, maketic {})",
                        lowtic, self.recvtic, self.maketic
                    );
                    self.stalled = true;
                }
                self.metrics.stalls += 1;
                return Ok(report(FrameOutcome::Stalled, 0));
            }
            self.clock.sleep_ms(1);
        }

        let gametic_before = self.gametic;
        let mut outcome = FrameOutcome::Ran;
        for _ in 0..want {
            if !self.players_in_game() {
                outcome = FrameOutcome::NoParticipants;
                break;
            }

            let tic = self.consumed();
            if tic >= lowtic {
                error!("gametic {} overran buffered tics (lowtic {lowtic})", self.gametic);
                self.aborted = true;
                return Err(SyncError::GameticOverrun {
                    consumed: tic,
                    lowtic,
                });
            }

            let mut slot = *self.ring.slot(TicId(tic));
            if !self.transport.is_connected() {
                for (i, present) in slot.present.iter_mut().enumerate() {
                    if i != self.config.local_index {
                        *present = false;
                    }
                }
            }
            self.execute_slot(slot);

            if self.game.quit_requested() {
                outcome = FrameOutcome::QuitRequested;
                break;
            }

            self.pump();
            lowtic = self.checked_low_tic()?;
        }

        let tics_run = self.gametic - gametic_before;
        if tics_run > 0 {
            self.stalled = false;
        }
        Ok(report(outcome, tics_run))
    }

    /// Execute one recorded slot directly, bypassing the producer, the
    /// receiver and the ring.
    ///
    /// Used to play back a demo: the slot goes through the same
    /// absent-participant clearing, departure tracking and ticdup
    /// repetition as a live tic.
    pub fn run_recorded_tic(&mut self, slot: &TicSlot) -> Result<FrameOutcome, SyncError> {
        if self.aborted {
            return Err(SyncError::SessionAborted);
        }
        self.execute_slot(*slot);
        if self.game.quit_requested() {
            Ok(FrameOutcome::QuitRequested)
        } else {
            Ok(FrameOutcome::Ran)
        }
    }

    /// Whether anyone is still in the session. Always true offline.
    pub(crate) fn players_in_game(&self) -> bool {
        if !self.transport.is_connected() {
            return true;
        }
        (0..self.config.participant_count).any(|i| self.transport.is_session_member_present(i))
    }

    /// Run one network tic as `ticdup` game tics.
    fn execute_slot(&mut self, mut slot: TicSlot) {
        slot.clear_absent();
        self.note_departures(&slot.present);

        for _ in 0..self.ticdup() {
            self.game.run_tic(&slot.commands, &slot.present);
            self.gametic += 1;
            self.metrics.tics_run += 1;
            slot.squelch_duplicates();
        }
    }

    fn note_departures(&mut self, present: &[bool]) {
        for (i, (was, is)) in self.last_present.iter_mut().zip(present).enumerate() {
            if *was && !*is {
                warn!("participant {i} left at gametic {}", self.gametic);
                self.ui.notify(Notice::ParticipantLeft(i));
            }
            *was = *is;
        }
    }

    /// The low tic, or a fatal error if it fell behind what already ran.
    fn checked_low_tic(&mut self) -> Result<u64, SyncError> {
        let lowtic = self.low_tic();
        let consumed = self.consumed();
        if lowtic < consumed {
            error!("tic counters regressed: lowtic {lowtic} < consumed {consumed}");
            self.aborted = true;
            return Err(SyncError::TicCounterRegressed { lowtic, consumed });
        }
        Ok(lowtic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::session::Collaborators;
    use ticsync_core::{Buttons, CommandRecord, SpecialAction};
    use ticsync_test_utils::{
        EchoServer, GameHandle, ManualClock, MockGame, MockTransport, MockUi, TransportHandle,
        UiHandle,
    };

    struct Rig {
        session: Session,
        clock: ManualClock,
        game: GameHandle,
        transport: TransportHandle,
        ui: UiHandle,
    }

    fn rig(config: SessionConfig, transport: MockTransport) -> Rig {
        let clock = ManualClock::new();
        let game = MockGame::new();
        let ui = MockUi::new();
        let handles = (game.handle(), transport.handle(), ui.handle());
        let collab = Collaborators {
            game: Box::new(game),
            transport: Box::new(transport),
            ui: Box::new(ui),
            clock: Box::new(clock.clone()),
        };
        Rig {
            session: Session::new(config, collab).unwrap(),
            clock,
            game: handles.0,
            transport: handles.1,
            ui: handles.2,
        }
    }

    fn offline(config: SessionConfig) -> Rig {
        rig(config, MockTransport::disconnected())
    }

    fn echoed(config: SessionConfig, server: EchoServer) -> Rig {
        let mut r = rig(config, MockTransport::with_echo(server));
        let tx = r.session.open_inbox(256);
        r.transport.on_deliver(move |slot| {
            let _ = tx.try_deliver(slot);
        });
        r
    }

    #[test]
    fn tics_to_run_table() {
        assert_eq!(tics_to_run(0, 0), 0);
        assert_eq!(tics_to_run(0, 1), 0);
        assert_eq!(tics_to_run(0, 2), 1);
        assert_eq!(tics_to_run(2, 3), 2);
        assert_eq!(tics_to_run(2, 8), 3);
        assert_eq!(tics_to_run(9, 4), 4);
    }

    #[test]
    fn offline_frame_runs_built_tics_in_order() {
        let mut r = offline(SessionConfig::new(1, 0, 1, SyncMode::Legacy));
        r.clock.advance_tics(1);
        let report = r.session.advance_frame().unwrap();
        assert_eq!(report.outcome, FrameOutcome::Ran);
        assert_eq!(report.tics_run, 1);
        assert_eq!(r.session.gametic(), 1);

        r.clock.advance_tics(2);
        r.session.advance_frame().unwrap();
        let executed = r.game.executed();
        let built = r.game.built_commands();
        for (i, tic) in executed.iter().enumerate() {
            assert_eq!(tic.commands[0], built[i]);
        }
    }

    #[test]
    fn legacy_runs_at_least_one_tic_per_frame() {
        let mut r = offline(SessionConfig::new(1, 0, 1, SyncMode::Legacy));
        r.clock.advance_tics(1);
        r.session.advance_frame().unwrap();
        // No real time passes, but the legacy branch still wants one tic.
        let report = r.session.advance_frame().unwrap();
        assert_eq!(report.real_tics, 0);
        assert_eq!(report.outcome, FrameOutcome::Ran);
        assert_eq!(report.tics_run, 1);
    }

    #[test]
    fn uncapped_adaptive_returns_idle_when_nothing_is_new() {
        let mut r = offline(SessionConfig {
            uncapped_frame_rate: true,
            ..SessionConfig::new(1, 0, 1, SyncMode::Adaptive)
        });
        let report = r.session.advance_frame().unwrap();
        assert_eq!(report.outcome, FrameOutcome::Idle);
        assert_eq!(r.session.metrics().early_returns, 1);
        assert!(r.game.executed().is_empty());
    }

    #[test]
    fn uncapped_adaptive_with_hidden_screen_does_not_return_early() {
        let mut r = offline(SessionConfig {
            uncapped_frame_rate: true,
            ..SessionConfig::new(1, 0, 1, SyncMode::Adaptive)
        });
        r.ui.set_screen_visible(false);
        let report = r.session.advance_frame().unwrap();
        assert_eq!(report.outcome, FrameOutcome::Ran);
        assert_eq!(report.tics_run, 0);
    }

    #[test]
    fn ticdup_repeats_and_squelches_one_shot_fields() {
        let mut r = offline(SessionConfig::new(1, 0, 3, SyncMode::Legacy));
        let cmd = CommandRecord {
            forward: 10,
            chat: b'A',
            buttons: SpecialAction::Pause.to_buttons(),
            ..CommandRecord::default()
        };
        r.game.queue_command(cmd);
        r.clock.advance_tics(3);
        r.session.advance_frame().unwrap();

        let executed = r.game.executed();
        assert_eq!(executed.len(), 3);
        assert_eq!(executed[0].commands[0], cmd);
        for rep in &executed[1..] {
            assert_eq!(rep.commands[0].forward, 10);
            assert_eq!(rep.commands[0].chat, 0);
            assert_eq!(rep.commands[0].buttons, Buttons::NONE);
        }
        assert_eq!(r.session.gametic(), 3);
    }

    #[test]
    fn offline_clears_non_local_participants() {
        let mut r = offline(SessionConfig::new(4, 2, 1, SyncMode::Legacy));
        r.clock.advance_tics(1);
        r.session.advance_frame().unwrap();
        let tic = &r.game.executed()[0];
        assert_eq!(tic.present, [false, false, true, false, false, false, false, false]);
        assert_eq!(tic.commands[0], CommandRecord::default());
    }

    #[test]
    fn networked_frame_waits_for_remote_half() {
        let mut r = echoed(
            SessionConfig::new(2, 0, 1, SyncMode::Adaptive),
            EchoServer::new(2, 0),
        );
        r.clock.advance_tics(1);
        let report = r.session.advance_frame().unwrap();
        assert_eq!(report.outcome, FrameOutcome::Ran);
        assert_eq!(r.session.gametic(), 1);
        let tic = &r.game.executed()[0];
        assert_eq!(tic.present[..2], [true, true]);
        assert_eq!(tic.commands[1], ticsync_test_utils::remote_command(0, 1));
    }

    #[test]
    fn stall_returns_without_running_and_logs_once() {
        let mut r = echoed(
            SessionConfig::new(2, 0, 1, SyncMode::Legacy),
            EchoServer::new(2, 0),
        );
        r.transport.set_paused(true);
        r.clock.advance_tics(1);
        let start = r.clock.now();
        let report = r.session.advance_frame().unwrap();
        assert_eq!(report.outcome, FrameOutcome::Stalled);
        assert!(r.game.executed().is_empty());
        assert!(ms_to_tics((r.clock.now() - start) as i64) <= 6);
        assert!(r.session.stalled);

        let report = r.session.advance_frame().unwrap();
        assert_eq!(report.outcome, FrameOutcome::Stalled);
        assert_eq!(r.session.metrics().stalls, 2);

        r.transport.set_paused(false);
        let report = r.session.advance_frame().unwrap();
        assert_eq!(report.outcome, FrameOutcome::Ran);
        assert!(!r.session.stalled);
    }

    #[test]
    fn departure_produces_one_notice() {
        let mut r = echoed(
            SessionConfig::new(3, 0, 1, SyncMode::Adaptive),
            EchoServer::new(3, 0).depart(2, 2),
        );
        for _ in 0..6 {
            r.clock.advance_tics(1);
            r.session.advance_frame().unwrap();
        }
        assert!(r.session.gametic() >= 4);
        assert_eq!(r.ui.notices(), vec![Notice::ParticipantLeft(2)]);
        let executed = r.game.executed();
        assert!(executed[1].present[2]);
        assert!(!executed[2].present[2]);
        assert_eq!(executed[2].commands[2], CommandRecord::default());
    }

    #[test]
    fn no_participants_left_returns_without_running() {
        let mut r = rig(
            SessionConfig::new(2, 0, 1, SyncMode::Legacy),
            MockTransport::connected(2),
        );
        r.transport.set_member_present(0, false);
        r.transport.set_member_present(1, false);
        r.clock.advance_tics(1);
        let report = r.session.advance_frame().unwrap();
        assert_eq!(report.outcome, FrameOutcome::NoParticipants);
        assert!(r.game.executed().is_empty());
    }

    #[test]
    fn quit_request_stops_the_execution_loop() {
        let mut r = offline(SessionConfig::new(1, 0, 2, SyncMode::Legacy));
        r.game.quit_after(1);
        r.clock.advance_tics(8);
        let report = r.session.advance_frame().unwrap();
        assert_eq!(report.available, 4);
        assert_eq!(report.outcome, FrameOutcome::QuitRequested);
        // Quit is observed only after a whole ticdup group.
        assert_eq!(report.tics_run, 2);
        assert_eq!(r.game.executed().len(), 2);
    }

    #[test]
    fn regressed_counters_poison_the_session() {
        let mut r = rig(
            SessionConfig::new(2, 0, 1, SyncMode::Legacy),
            MockTransport::connected(2),
        );
        r.session.gametic = 3;
        let err = r.session.advance_frame().unwrap_err();
        assert_eq!(
            err,
            SyncError::TicCounterRegressed {
                lowtic: 0,
                consumed: 3
            }
        );
        assert!(r.session.is_aborted());
        assert_eq!(r.session.advance_frame(), Err(SyncError::SessionAborted));

        r.session
            .start_session(SessionConfig::new(2, 0, 1, SyncMode::Legacy))
            .unwrap();
        assert!(!r.session.is_aborted());
    }

    #[test]
    fn recorded_tic_bypasses_the_ring() {
        let mut r = offline(SessionConfig {
            single_tics: true,
            ..SessionConfig::new(2, 0, 1, SyncMode::Legacy)
        });
        let mut slot = TicSlot::default();
        slot.set(0, CommandRecord { forward: 3, ..CommandRecord::default() });
        slot.set(1, CommandRecord { forward: 4, ..CommandRecord::default() });
        assert_eq!(r.session.run_recorded_tic(&slot), Ok(FrameOutcome::Ran));
        assert_eq!(r.session.gametic(), 1);
        assert_eq!(r.session.maketic(), 0);
        let tic = &r.game.executed()[0];
        assert_eq!(tic.commands, slot.commands);
        assert_eq!(tic.present, slot.present);
    }

    #[test]
    fn single_tics_builds_one_tic_per_frame() {
        let mut r = offline(SessionConfig {
            single_tics: true,
            ..SessionConfig::new(1, 0, 1, SyncMode::Legacy)
        });
        for _ in 0..4 {
            let report = r.session.advance_frame().unwrap();
            assert_eq!(report.tics_run, 1);
        }
        assert_eq!(r.session.maketic(), 4);
        assert_eq!(r.session.gametic(), 4);
    }
}

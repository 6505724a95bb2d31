//! The scheduler context: counters, ring buffer, and collaborators for
//! one session.
//!
//! # Ownership model
//!
//! [`Session`] owns every piece of scheduler state. All mutating methods
//! take `&mut self`, so the producer, the receiver, and the run-ahead
//! loop can never interleave. A transport that runs on its own thread
//! hands tics over through an [`Inbox`](crate::inbox::Inbox) channel
//! instead of touching the session.
//!
//! # Counters
//!
//! | Counter   | Meaning                                    | Sole writer |
//! |-----------|--------------------------------------------|-------------|
//! | `maketic` | next network tic to build locally          | producer    |
//! | `recvtic` | network tics fully received from the net   | receiver    |
//! | `gametic` | game tics executed (ticdup per network tic)| scheduler   |

use log::info;
use ticsync_core::{ms_to_tics, Clock, GameLoop, LocalTransport, Transport, Ui, MAX_PARTICIPANTS};

use crate::clock::SystemClock;
use crate::config::{ConfigError, SessionConfig, SyncMode};
use crate::inbox::Inbox;
use crate::metrics::SchedulerMetrics;
use crate::pump::PumpState;
use crate::ring::TicRing;

// Compile-time assertion: Session is Send (collaborators are Send).
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<Session>();
    }
};

/// The external collaborators a session drives.
pub struct Collaborators {
    /// Host game mode: input sampling, menu, and tic execution.
    pub game: Box<dyn GameLoop>,
    /// Outbound network path.
    pub transport: Box<dyn Transport>,
    /// Notices and screen visibility.
    pub ui: Box<dyn Ui>,
    /// Real-time clock used for pacing and the stall budget.
    pub clock: Box<dyn Clock>,
}

impl Collaborators {
    /// Single-player collaborators: no transport, wall clock.
    pub fn local(game: impl GameLoop + 'static, ui: impl Ui + 'static) -> Self {
        Self {
            game: Box::new(game),
            transport: Box::new(LocalTransport),
            ui: Box::new(ui),
            clock: Box::new(SystemClock::new()),
        }
    }
}

/// One lockstep session.
///
/// Created with [`new()`](Session::new), restarted in place with
/// [`start_session()`](Session::start_session). The embedding
/// application calls [`advance_frame()`](Session::advance_frame) once per
/// displayed frame and [`receive()`](Session::receive) from its transport
/// receive path.
///
/// # Example
///
/// ```ignore
/// let mut session = Session::new(SessionConfig::default(), collaborators)?;
/// loop {
///     let report = session.advance_frame()?;
///     render(report);
/// }
/// ```
pub struct Session {
    pub(crate) config: SessionConfig,
    pub(crate) ring: TicRing,
    pub(crate) maketic: u64,
    pub(crate) recvtic: u64,
    pub(crate) gametic: u64,
    pub(crate) pump: PumpState,
    /// Real time (in ticdup-scaled tics) at the previous frame.
    pub(crate) old_enter_tic: u64,
    /// Presence set of the last executed tic, for departure notices.
    pub(crate) last_present: [bool; MAX_PARTICIPANTS],
    /// Set while frames are being abandoned for lack of data.
    pub(crate) stalled: bool,
    /// Set once a fatal fault was returned.
    pub(crate) aborted: bool,
    pub(crate) metrics: SchedulerMetrics,
    pub(crate) game: Box<dyn GameLoop>,
    pub(crate) transport: Box<dyn Transport>,
    pub(crate) ui: Box<dyn Ui>,
    pub(crate) clock: Box<dyn Clock>,
    pub(crate) inbox: Option<Inbox>,
}

impl Session {
    /// Validate `config` and start a session with the given collaborators.
    pub fn new(config: SessionConfig, collaborators: Collaborators) -> Result<Self, ConfigError> {
        config.validate()?;
        let Collaborators {
            game,
            transport,
            ui,
            clock,
        } = collaborators;
        let mut session = Self {
            config: config.clone(),
            ring: TicRing::new(),
            maketic: 0,
            recvtic: 0,
            gametic: 0,
            pump: PumpState::default(),
            old_enter_tic: 0,
            last_present: [false; MAX_PARTICIPANTS],
            stalled: false,
            aborted: false,
            metrics: SchedulerMetrics::default(),
            game,
            transport,
            ui,
            clock,
            inbox: None,
        };
        session.start_session(config)?;
        Ok(session)
    }

    /// Validate `config` and reset every counter, the ring, and the pump
    /// state. Pending inbox items from the previous session are dropped.
    ///
    /// On error nothing is changed.
    pub fn start_session(&mut self, config: SessionConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        self.ring.clear();
        self.maketic = 0;
        self.recvtic = 0;
        self.gametic = 0;
        self.last_present = [false; MAX_PARTICIPANTS];
        self.stalled = false;
        self.aborted = false;
        self.metrics = SchedulerMetrics::default();
        if let Some(inbox) = &self.inbox {
            inbox.discard_pending();
        }

        self.pump = PumpState {
            last_time: self.adjusted_time_tics() / self.ticdup(),
            ..PumpState::default()
        };
        self.old_enter_tic = self.real_time_tics();

        info!(
            "session started: {} participant(s), local {}, ticdup {}, {} sync",
            self.config.participant_count,
            self.config.local_index,
            self.config.ticdup,
            self.config.sync_mode,
        );
        Ok(())
    }

    /// Open a channel through which another thread can deliver tics.
    ///
    /// Replaces any previously opened inbox.
    pub fn open_inbox(&mut self, capacity: usize) -> crate::inbox::InboxSender {
        let (inbox, sender) = Inbox::bounded(capacity);
        self.inbox = Some(inbox);
        sender
    }

    /// Duplication factor as a counter-width integer.
    pub(crate) fn ticdup(&self) -> u64 {
        u64::from(self.config.ticdup)
    }

    /// Network tics already consumed by the simulation.
    pub(crate) fn consumed(&self) -> u64 {
        self.gametic / self.ticdup()
    }

    /// Lowest network tic for which every needed command is buffered.
    ///
    /// Without a connected transport only local input is needed.
    pub(crate) fn low_tic(&self) -> u64 {
        if self.transport.is_connected() {
            self.maketic.min(self.recvtic)
        } else {
            self.maketic
        }
    }

    /// Real time in ticdup-scaled tics, unadjusted.
    pub(crate) fn real_time_tics(&self) -> u64 {
        ms_to_tics(self.clock.now_ms() as i64) / self.ticdup()
    }

    /// Real time in tics, shifted by the transport's clock offset when
    /// adaptive sync is active.
    pub(crate) fn adjusted_time_tics(&self) -> u64 {
        let mut ms = self.clock.now_ms() as i64;
        if self.config.sync_mode == SyncMode::Adaptive {
            ms += self.transport.clock_offset_ms();
        }
        ms_to_tics(ms)
    }

    /// The active configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Next network tic the local producer will build.
    pub fn maketic(&self) -> u64 {
        self.maketic
    }

    /// Network tics fully received from the transport.
    pub fn recvtic(&self) -> u64 {
        self.recvtic
    }

    /// Game tics executed so far.
    pub fn gametic(&self) -> u64 {
        self.gametic
    }

    /// The active sync mode.
    pub fn sync_mode(&self) -> SyncMode {
        self.config.sync_mode
    }

    /// Read-only view of the ring buffer.
    pub fn ring(&self) -> &TicRing {
        &self.ring
    }

    /// Counters accumulated since the session started.
    pub fn metrics(&self) -> &SchedulerMetrics {
        &self.metrics
    }

    /// Whether a fatal fault ended the session.
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("maketic", &self.maketic)
            .field("recvtic", &self.recvtic)
            .field("gametic", &self.gametic)
            .field("aborted", &self.aborted)
            .finish()
    }
}

//! Mock transports.
//!
//! [`MockTransport`] records what the scheduler sends. With an
//! [`EchoServer`] attached it also plays the other participants: every
//! local command it is sent comes back as a complete slot on a later
//! `run()`, through the callback registered with
//! [`TransportHandle::on_deliver`].

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use ticsync_core::{OutgoingTic, TicSlot, Transport, MAX_PARTICIPANTS};

use crate::remote_command;

type DeliverFn = Box<dyn FnMut(Option<TicSlot>) + Send>;

/// Simulated peers answering every local command with a full slot.
#[derive(Clone, Debug)]
pub struct EchoServer {
    participant_count: usize,
    local_index: usize,
    latency_runs: u64,
    departures: Vec<(usize, u64)>,
}

impl EchoServer {
    pub fn new(participant_count: usize, local_index: usize) -> Self {
        Self {
            participant_count,
            local_index,
            latency_runs: 0,
            departures: Vec::new(),
        }
    }

    /// Hold each tic back for `runs` extra transport turns.
    pub fn latency(mut self, runs: u64) -> Self {
        self.latency_runs = runs;
        self
    }

    /// Participant `index` is absent from network tic `tic` onward.
    pub fn depart(mut self, index: usize, tic: u64) -> Self {
        self.departures.push((index, tic));
        self
    }

    fn departed(&self, index: usize, tic: u64) -> bool {
        self.departures.iter().any(|&(i, t)| i == index && tic >= t)
    }

    fn slot_for(&self, sent: &OutgoingTic) -> TicSlot {
        let tic = sent.tic.0;
        let mut slot = TicSlot::default();
        for i in 0..self.participant_count {
            if self.departed(i, tic) {
                continue;
            }
            if i == self.local_index {
                slot.set(i, sent.command);
            } else {
                slot.set(i, remote_command(tic, i));
            }
        }
        slot
    }
}

struct EchoState {
    server: EchoServer,
    next_tic: u64,
    queue: VecDeque<(OutgoingTic, u64)>,
}

struct TransportState {
    connected: bool,
    members: [bool; MAX_PARTICIPANTS],
    clock_offset_ms: i64,
    extra_tics: u32,
    skip_tics: u32,
    run_calls: usize,
    paused: bool,
    disconnect_pending: bool,
    sent: Vec<Vec<OutgoingTic>>,
    echo: Option<EchoState>,
    deliver: Option<DeliverFn>,
}

/// A scriptable [`Transport`].
pub struct MockTransport {
    state: Arc<Mutex<TransportState>>,
}

/// Shared view of a [`MockTransport`].
#[derive(Clone)]
pub struct TransportHandle {
    state: Arc<Mutex<TransportState>>,
}

impl MockTransport {
    fn build(connected: bool, members: usize, echo: Option<EchoServer>) -> Self {
        let mut present = [false; MAX_PARTICIPANTS];
        for p in present.iter_mut().take(members) {
            *p = true;
        }
        Self {
            state: Arc::new(Mutex::new(TransportState {
                connected,
                members: present,
                clock_offset_ms: 0,
                extra_tics: 0,
                skip_tics: 0,
                run_calls: 0,
                paused: false,
                disconnect_pending: false,
                sent: Vec::new(),
                echo: echo.map(|server| EchoState {
                    server,
                    next_tic: 0,
                    queue: VecDeque::new(),
                }),
                deliver: None,
            })),
        }
    }

    /// Single-player: never connected.
    pub fn disconnected() -> Self {
        Self::build(false, 0, None)
    }

    /// Connected with `members` participants present and no peers
    /// answering.
    pub fn connected(members: usize) -> Self {
        Self::build(true, members, None)
    }

    /// Connected, with `server` answering every sent command.
    pub fn with_echo(server: EchoServer) -> Self {
        let members = server.participant_count;
        Self::build(true, members, Some(server))
    }

    pub fn handle(&self) -> TransportHandle {
        TransportHandle {
            state: Arc::clone(&self.state),
        }
    }
}

impl Transport for MockTransport {
    fn is_connected(&self) -> bool {
        self.state.lock().unwrap().connected
    }

    fn run(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.run_calls += 1;
        let now = state.run_calls as u64;

        let mut ready: Vec<Option<TicSlot>> = Vec::new();
        if !state.paused {
            let mut departed = Vec::new();
            if let Some(echo) = state.echo.as_mut() {
                while echo.queue.front().is_some_and(|&(_, due)| due <= now) {
                    let Some((sent, _)) = echo.queue.pop_front() else {
                        break;
                    };
                    for i in 0..echo.server.participant_count {
                        if echo.server.departed(i, sent.tic.0) {
                            departed.push(i);
                        }
                    }
                    ready.push(Some(echo.server.slot_for(&sent)));
                }
            }
            for i in departed {
                state.members[i] = false;
            }
            if state.disconnect_pending {
                state.disconnect_pending = false;
                ready.push(None);
            }
        }

        if let Some(deliver) = state.deliver.as_mut() {
            for item in ready {
                deliver(item);
            }
        }
    }

    fn send(&mut self, tics: &[OutgoingTic]) {
        let mut state = self.state.lock().unwrap();
        state.sent.push(tics.to_vec());
        let now = state.run_calls as u64;
        if let Some(echo) = state.echo.as_mut() {
            for t in tics {
                if t.tic.0 == echo.next_tic {
                    echo.queue.push_back((*t, now + 1 + echo.server.latency_runs));
                    echo.next_tic += 1;
                }
            }
        }
    }

    fn is_session_member_present(&self, index: usize) -> bool {
        self.state
            .lock()
            .unwrap()
            .members
            .get(index)
            .copied()
            .unwrap_or(false)
    }

    fn clock_offset_ms(&self) -> i64 {
        self.state.lock().unwrap().clock_offset_ms
    }

    fn extra_tics(&self) -> u32 {
        self.state.lock().unwrap().extra_tics
    }

    fn take_skip_tics(&mut self) -> u32 {
        std::mem::take(&mut self.state.lock().unwrap().skip_tics)
    }
}

impl TransportHandle {
    /// Route delivered slots (and disconnects, as `None`) to `deliver`.
    pub fn on_deliver(&self, deliver: impl FnMut(Option<TicSlot>) + Send + 'static) {
        self.state.lock().unwrap().deliver = Some(Box::new(deliver));
    }

    pub fn set_connected(&self, connected: bool) {
        self.state.lock().unwrap().connected = connected;
    }

    pub fn set_member_present(&self, index: usize, present: bool) {
        self.state.lock().unwrap().members[index] = present;
    }

    pub fn set_clock_offset_ms(&self, ms: i64) {
        self.state.lock().unwrap().clock_offset_ms = ms;
    }

    pub fn set_extra_tics(&self, extra: u32) {
        self.state.lock().unwrap().extra_tics = extra;
    }

    pub fn add_skip_tics(&self, skip: u32) {
        self.state.lock().unwrap().skip_tics += skip;
    }

    /// While paused, nothing is delivered; sent tics keep queueing.
    pub fn set_paused(&self, paused: bool) {
        self.state.lock().unwrap().paused = paused;
    }

    /// Deliver a disconnect on the next unpaused `run()`.
    pub fn queue_disconnect(&self) {
        self.state.lock().unwrap().disconnect_pending = true;
    }

    /// Every `send` call's batch, in order.
    pub fn sent_batches(&self) -> Vec<Vec<OutgoingTic>> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn run_calls(&self) -> usize {
        self.state.lock().unwrap().run_calls
    }
}

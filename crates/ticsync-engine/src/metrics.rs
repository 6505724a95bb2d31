//! Cumulative scheduler counters for a session.
//!
//! [`SchedulerMetrics`] is reset by `start_session` and only ever grows
//! during play. Nothing in the scheduler reads it back.

/// Counters accumulated since the session started.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SchedulerMetrics {
    /// Calls to `advance_frame`.
    pub frames: u64,
    /// Local commands written into the ring.
    pub tics_built: u64,
    /// Producer calls refused by the look-ahead cap.
    pub lookahead_refusals: u64,
    /// Remote tics written into the ring.
    pub tics_received: u64,
    /// Disconnect signals received.
    pub disconnects: u64,
    /// Game tics executed (including ticdup repetitions).
    pub tics_run: u64,
    /// Frames abandoned because data did not arrive within the stall budget.
    pub stalls: u64,
    /// Frames that returned early with nothing to run.
    pub early_returns: u64,
    /// Outbound flushes handed to the transport.
    pub flushes: u64,
}

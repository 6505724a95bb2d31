//! Network pump: paces local tic production against real time and
//! flushes freshly built commands to the transport.

use std::collections::VecDeque;

use log::trace;
use smallvec::SmallVec;
use ticsync_core::{OutgoingTic, BACKUPTICS};

use crate::session::Session;

/// Bookkeeping carried between pump calls.
#[derive(Debug, Default)]
pub(crate) struct PumpState {
    /// Adjusted real time (ticdup-scaled tics) at the previous pump.
    pub(crate) last_time: u64,
    /// Owed tics still to be skipped before building resumes.
    pub(crate) skip_tics: u64,
    /// Commands built since the last flush.
    pub(crate) pending: SmallVec<[OutgoingTic; 8]>,
    /// Most recently flushed commands, resent for redundancy.
    pub(crate) resend: VecDeque<OutgoingTic>,
}

impl Session {
    /// Convert real time elapsed since the previous pump into owed local
    /// tics and build them, stopping early at the look-ahead cap; then
    /// flush what was built and drain the inbox.
    ///
    /// Does nothing in single-tic mode.
    pub fn pump(&mut self) {
        if self.config.single_tics {
            return;
        }

        self.transport.run();
        self.drain_inbox();

        let now = self.adjusted_time_tics() / self.ticdup();
        let mut new_tics = now.saturating_sub(self.pump.last_time);
        self.pump.last_time = now;

        self.pump.skip_tics += u64::from(self.transport.take_skip_tics());
        if self.pump.skip_tics <= new_tics {
            new_tics -= self.pump.skip_tics;
            self.pump.skip_tics = 0;
        } else {
            self.pump.skip_tics -= new_tics;
            new_tics = 0;
        }

        for _ in 0..new_tics {
            if !self.build_next_tic() {
                break;
            }
        }

        self.flush_outgoing();
    }

    /// Hand every command built since the last flush to the transport,
    /// preceded by the last `extra_tics()` already-sent commands.
    pub(crate) fn flush_outgoing(&mut self) {
        if self.pump.pending.is_empty() {
            return;
        }
        if !self.transport.is_connected() {
            self.pump.pending.clear();
            return;
        }

        let extra = (self.transport.extra_tics() as usize).min(BACKUPTICS);
        let skip = self.pump.resend.len().saturating_sub(extra);
        let batch: SmallVec<[OutgoingTic; 16]> = self
            .pump
            .resend
            .iter()
            .skip(skip)
            .chain(self.pump.pending.iter())
            .copied()
            .collect();
        trace!(
            "flushing {} new tic(s), {} resent",
            self.pump.pending.len(),
            batch.len() - self.pump.pending.len()
        );
        self.transport.send(&batch);
        self.metrics.flushes += 1;

        self.pump.resend.extend(self.pump.pending.drain(..));
        while self.pump.resend.len() > extra {
            self.pump.resend.pop_front();
        }
    }
}

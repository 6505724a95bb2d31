//! Local command producer.
//!
//! Builds this participant's command for the next network tic, subject
//! to the sync mode's look-ahead cap. Hitting the cap is backpressure,
//! not an error.

use log::trace;
use ticsync_core::{OutgoingTic, TicId};

use crate::session::Session;

impl Session {
    /// Run the event and menu collaborators once, then, unless the
    /// look-ahead cap is reached, sample a command into the ring at
    /// `maketic` and advance `maketic`.
    ///
    /// Returns `false` (with no mutation) when the cap is reached.
    pub fn build_next_tic(&mut self) -> bool {
        let consumed = self.consumed();

        self.game.process_events();
        // The menu runs even when no tic is built.
        self.game.run_menu();

        let lead = self.maketic.saturating_sub(consumed);
        let max_lead = self
            .config
            .sync_mode
            .max_lead(self.transport.is_connected());
        if lead >= max_lead {
            self.metrics.lookahead_refusals += 1;
            trace!("producer holding at maketic {} (lead {lead}/{max_lead})", self.maketic);
            return false;
        }

        let command = self.game.build_ticcmd();
        let tic = TicId(self.maketic);
        self.ring.write_local(tic, self.config.local_index, command);
        self.pump.pending.push(OutgoingTic { tic, command });
        self.maketic += 1;
        self.metrics.tics_built += 1;
        true
    }
}

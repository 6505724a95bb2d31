//! Network receiver: folds complete remote tics into the ring.

use log::warn;
use ticsync_core::{Notice, TicId, TicSlot};

use crate::session::Session;

/// One event from the transport's receive path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Incoming {
    /// A complete slot for network tic `recvtic`.
    Tic(TicSlot),
    /// The connection is gone.
    Disconnected,
}

impl From<Option<TicSlot>> for Incoming {
    fn from(slot: Option<TicSlot>) -> Self {
        match slot {
            Some(slot) => Incoming::Tic(slot),
            None => Incoming::Disconnected,
        }
    }
}

impl From<TicSlot> for Incoming {
    fn from(slot: TicSlot) -> Self {
        Incoming::Tic(slot)
    }
}

impl Session {
    /// Accept the next complete network tic, or a disconnect.
    ///
    /// A slot is stored at `recvtic` with the local participant's entry
    /// left untouched, then `recvtic` advances by one. A disconnect
    /// notifies the UI and changes no counter.
    pub fn receive(&mut self, incoming: impl Into<Incoming>) {
        match incoming.into() {
            Incoming::Disconnected => {
                warn!("transport disconnected at recvtic {}", self.recvtic);
                self.metrics.disconnects += 1;
                self.ui.notify(Notice::Disconnected);
            }
            Incoming::Tic(slot) => {
                self.ring
                    .write_remote(TicId(self.recvtic), self.config.local_index, &slot);
                self.recvtic += 1;
                self.metrics.tics_received += 1;
            }
        }
    }

    /// Feed everything waiting in the inbox through [`receive`](Self::receive).
    pub(crate) fn drain_inbox(&mut self) {
        loop {
            let Some(item) = self.inbox.as_ref().and_then(|inbox| inbox.try_next()) else {
                break;
            };
            self.receive(item);
        }
    }
}

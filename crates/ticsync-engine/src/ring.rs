//! Fixed-capacity ring buffer of tic slots.
//!
//! [`TicRing`] maps tic `t` to slot `t % N`. It does not police
//! overwrites: the producer's look-ahead caps keep the distance between
//! the lowest unconsumed tic and the highest written tic below `N`.
//!
//! Two writers share the ring without overlapping: the local producer
//! writes only the local participant's entry, the remote receiver only
//! the others.

use ticsync_core::{CommandRecord, TicId, TicSlot, BACKUPTICS};

/// A fixed-capacity ring of [`TicSlot`]s indexed by tic number.
pub struct TicRing<const N: usize = BACKUPTICS> {
    slots: Box<[TicSlot; N]>,
}

impl<const N: usize> TicRing<N> {
    /// Create a ring of empty slots.
    ///
    /// # Panics
    ///
    /// Panics if `N < 2`.
    pub fn new() -> Self {
        assert!(N >= 2, "TicRing capacity must be >= 2, got {N}");
        Self {
            slots: Box::new([TicSlot::default(); N]),
        }
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        N
    }

    /// The slot tic `tic` maps to.
    pub fn slot(&self, tic: TicId) -> &TicSlot {
        &self.slots[tic.slot(N)]
    }

    /// Write the local participant's command for `tic` and mark it present.
    pub fn write_local(&mut self, tic: TicId, local_index: usize, command: CommandRecord) {
        self.slots[tic.slot(N)].set(local_index, command);
    }

    /// Copy every participant except `local_index` from `incoming` into
    /// the slot for `tic`. The local entry is left untouched.
    pub fn write_remote(&mut self, tic: TicId, local_index: usize, incoming: &TicSlot) {
        let slot = &mut self.slots[tic.slot(N)];
        for i in (0..slot.commands.len()).filter(|&i| i != local_index) {
            slot.commands[i] = incoming.commands[i];
            slot.present[i] = incoming.present[i];
        }
    }

    /// Reset every slot to empty.
    pub fn clear(&mut self) {
        self.slots.fill(TicSlot::default());
    }
}

impl<const N: usize> Default for TicRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> std::fmt::Debug for TicRing<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TicRing").field("capacity", &N).finish()
    }
}

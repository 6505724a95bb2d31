//! Strongly-typed tic identifiers.

use std::fmt;

/// A network tic number.
///
/// Network tics are the unit the ring buffer is indexed by. With a
/// duplication factor of `ticdup`, network tic `n` is executed as game
/// tics `n * ticdup .. (n + 1) * ticdup`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TicId(pub u64);

impl TicId {
    /// Slot index of this tic in a ring of `capacity` slots.
    pub fn slot(self, capacity: usize) -> usize {
        (self.0 % capacity as u64) as usize
    }

    /// The following tic.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for TicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TicId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

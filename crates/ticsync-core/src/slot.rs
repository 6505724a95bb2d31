//! The complete input for one simulation step across all participants.

use crate::command::CommandRecord;
use crate::MAX_PARTICIPANTS;

/// One command record per possible participant plus a parallel presence
/// set, for exactly one tic number.
///
/// A slot is complete once every participant marked present has had its
/// record written, either by the local producer or by the remote
/// receiver.
///
/// # Examples
///
/// ```
/// use ticsync_core::{CommandRecord, TicSlot};
///
/// let mut slot = TicSlot::default();
/// slot.set(2, CommandRecord { forward: 25, ..CommandRecord::default() });
/// assert!(slot.present[2]);
/// assert_eq!(slot.present_count(), 1);
///
/// slot.clear_absent();
/// assert_eq!(slot.commands[2].forward, 25);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TicSlot {
    /// Command record for each participant index.
    pub commands: [CommandRecord; MAX_PARTICIPANTS],
    /// Whether each participant index is in the game for this tic.
    pub present: [bool; MAX_PARTICIPANTS],
}

impl TicSlot {
    /// Write a participant's record and mark it present.
    pub fn set(&mut self, index: usize, command: CommandRecord) {
        self.commands[index] = command;
        self.present[index] = true;
    }

    /// Number of participants flagged present.
    pub fn present_count(&self) -> usize {
        self.present.iter().filter(|&&p| p).count()
    }

    /// Whether any participant is flagged present.
    pub fn any_present(&self) -> bool {
        self.present.iter().any(|&p| p)
    }

    /// Reset every participant not flagged present to the default
    /// "not in game" record, so a stale command is never visible.
    pub fn clear_absent(&mut self) {
        for (cmd, &present) in self.commands.iter_mut().zip(self.present.iter()) {
            if !present {
                *cmd = CommandRecord::default();
            }
        }
    }

    /// Apply [`CommandRecord::squelch_duplicate`] to every participant.
    pub fn squelch_duplicates(&mut self) {
        for cmd in &mut self.commands {
            cmd.squelch_duplicate();
        }
    }

    /// Presence set packed into a bitmask, bit `i` for participant `i`.
    pub fn present_mask(&self) -> u8 {
        self.present
            .iter()
            .enumerate()
            .fold(0u8, |mask, (i, &p)| if p { mask | (1 << i) } else { mask })
    }

    /// Inverse of [`present_mask`](Self::present_mask).
    pub fn set_present_mask(&mut self, mask: u8) {
        for (i, p) in self.present.iter_mut().enumerate() {
            *p = mask & (1 << i) != 0;
        }
    }
}

//! Per-participant command records and the outbound tic envelope.
//!
//! A [`CommandRecord`] is one participant's input for one tic. The
//! scheduler never interprets it beyond the duplicate-tic squelch: it is
//! copied verbatim into and out of the ring buffer.

use crate::id::TicId;

/// Button bitmask carried in a [`CommandRecord`].
///
/// When [`Buttons::SPECIAL`] is set the remaining bits no longer describe
/// held buttons but encode a one-shot [`SpecialAction`] (pause, save).
///
/// # Examples
///
/// ```
/// use ticsync_core::Buttons;
///
/// let held = Buttons::ATTACK | Buttons::USE;
/// assert!(held.contains(Buttons::ATTACK));
/// assert!(!held.is_special());
///
/// let pause = Buttons::SPECIAL | Buttons::PAUSE;
/// assert!(pause.is_special());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Buttons(pub u8);

impl Buttons {
    /// No buttons held.
    pub const NONE: Self = Self(0);
    /// Fire the current weapon.
    pub const ATTACK: Self = Self(1);
    /// Use a door or switch.
    pub const USE: Self = Self(2);
    /// A weapon change is requested; the weapon number sits in `WEAPON_MASK`.
    pub const CHANGE: Self = Self(4);
    /// Bits holding the requested weapon number.
    pub const WEAPON_MASK: Self = Self(8 + 16 + 32);
    /// Shift of the weapon number within the mask.
    pub const WEAPON_SHIFT: u8 = 3;
    /// The record carries a special action rather than held buttons.
    pub const SPECIAL: Self = Self(128);
    /// Bits selecting the special action kind.
    pub const SPECIAL_MASK: Self = Self(3);
    /// Special action: toggle pause.
    pub const PAUSE: Self = Self(1);
    /// Special action: save the game; slot number sits in `SAVE_MASK`.
    pub const SAVEGAME: Self = Self(2);
    /// Bits holding the save slot.
    pub const SAVE_MASK: Self = Self(4 + 8 + 16);
    /// Shift of the save slot within the mask.
    pub const SAVE_SHIFT: u8 = 2;

    /// Raw bit value.
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Whether every bit of `other` is set in `self`.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether the special-action bit is set.
    pub fn is_special(self) -> bool {
        self.contains(Self::SPECIAL)
    }
}

impl std::ops::BitOr for Buttons {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for Buttons {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl std::ops::BitAnd for Buttons {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

/// One-shot action decoded from a [`Buttons`] value with the special bit set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpecialAction {
    /// Toggle the paused state.
    Pause,
    /// Save the game into the given slot.
    SaveGame {
        /// Save slot number (0..8).
        slot: u8,
    },
}

impl SpecialAction {
    /// Encode this action as a special [`Buttons`] value.
    pub fn to_buttons(self) -> Buttons {
        match self {
            Self::Pause => Buttons::SPECIAL | Buttons::PAUSE,
            Self::SaveGame { slot } => {
                Buttons::SPECIAL
                    | Buttons::SAVEGAME
                    | Buttons((slot << Buttons::SAVE_SHIFT) & Buttons::SAVE_MASK.0)
            }
        }
    }
}

/// One participant's intended action for one tic.
///
/// Fixed layout, `Copy`, and always moved as a whole: the scheduler never
/// merges two records field by field.
///
/// # Examples
///
/// ```
/// use ticsync_core::{Buttons, CommandRecord, SpecialAction};
///
/// let mut cmd = CommandRecord {
///     forward: 10,
///     chat: b'A',
///     buttons: SpecialAction::Pause.to_buttons(),
///     ..CommandRecord::default()
/// };
/// assert_eq!(cmd.special_action(), Some(SpecialAction::Pause));
///
/// cmd.squelch_duplicate();
/// assert_eq!(cmd.forward, 10);
/// assert_eq!(cmd.chat, 0);
/// assert_eq!(cmd.buttons, Buttons::NONE);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CommandRecord {
    /// Forward/backward movement, positive is forward.
    pub forward: i8,
    /// Strafe movement, positive is right.
    pub side: i8,
    /// Horizontal turn delta.
    pub angle_turn: i16,
    /// Vertical look delta.
    pub look: i8,
    /// Chat character typed this tic, 0 for none.
    pub chat: u8,
    /// Held buttons or an encoded special action.
    pub buttons: Buttons,
    /// Secondary buttons (jump, crouch), never one-shot.
    pub buttons2: u8,
    /// Consistency checksum stamped by the simulation.
    pub consistency: u16,
}

impl CommandRecord {
    /// Encoded size in bytes.
    pub const ENCODED_LEN: usize = 10;

    /// Decode the special action, if the special bit is set.
    pub fn special_action(&self) -> Option<SpecialAction> {
        if !self.buttons.is_special() {
            return None;
        }
        match (self.buttons & Buttons::SPECIAL_MASK).bits() {
            1 => Some(SpecialAction::Pause),
            2 => Some(SpecialAction::SaveGame {
                slot: (self.buttons & Buttons::SAVE_MASK).bits() >> Buttons::SAVE_SHIFT,
            }),
            _ => None,
        }
    }

    /// Strip the one-shot parts of the record before it is replayed as a
    /// duplicate tic: the chat character, and the whole button byte when
    /// it carries a special action. Movement is left untouched.
    pub fn squelch_duplicate(&mut self) {
        self.chat = 0;
        if self.buttons.is_special() {
            self.buttons = Buttons::NONE;
        }
    }

    /// Fixed little-endian wire layout.
    pub fn to_bytes(&self) -> [u8; Self::ENCODED_LEN] {
        let turn = self.angle_turn.to_le_bytes();
        let consistency = self.consistency.to_le_bytes();
        [
            self.forward as u8,
            self.side as u8,
            turn[0],
            turn[1],
            self.look as u8,
            self.chat,
            self.buttons.0,
            self.buttons2,
            consistency[0],
            consistency[1],
        ]
    }

    /// Inverse of [`to_bytes`](Self::to_bytes).
    pub fn from_bytes(b: [u8; Self::ENCODED_LEN]) -> Self {
        Self {
            forward: b[0] as i8,
            side: b[1] as i8,
            angle_turn: i16::from_le_bytes([b[2], b[3]]),
            look: b[4] as i8,
            chat: b[5],
            buttons: Buttons(b[6]),
            buttons2: b[7],
            consistency: u16::from_le_bytes([b[8], b[9]]),
        }
    }
}

/// A locally built command on its way to the transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutgoingTic {
    /// Network tic the command was built for.
    pub tic: TicId,
    /// The local participant's command.
    pub command: CommandRecord,
}

//! FNV-1a hashing of tic slots.
//!
//! Catches corrupt frames on read; not cryptographically secure.

use ticsync_core::TicSlot;

/// FNV-1a offset basis for 64-bit.
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime for 64-bit.
const FNV_PRIME: u64 = 0x00000100000001B3;

#[inline]
fn fnv1a_byte(hash: u64, byte: u8) -> u64 {
    (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
}

/// Hash the presence mask followed by every command record's encoded
/// bytes, in participant order.
///
/// Absent participants' records are included, so two slots differing
/// only in a stale absent entry hash differently.
pub fn slot_hash(slot: &TicSlot) -> u64 {
    let mut hash = fnv1a_byte(FNV_OFFSET, slot.present_mask());
    for command in &slot.commands {
        for b in command.to_bytes() {
            hash = fnv1a_byte(hash, b);
        }
    }
    hash
}

//! Binary encode/decode for the demo format.
//!
//! All integers are little-endian. Frames are fixed-size: no length
//! prefixes, no compression, no padding.

use std::io::{Read, Write};

use ticsync_core::{CommandRecord, TicSlot, MAX_PARTICIPANTS};
use ticsync_engine::SyncMode;

use crate::error::DemoError;
use crate::hash::slot_hash;
use crate::types::{DemoHeader, Frame};
use crate::{FORMAT_VERSION, MAGIC};

// ── Primitives ──────────────────────────────────────────────────

/// Write a single byte.
pub fn write_u8(w: &mut dyn Write, v: u8) -> Result<(), DemoError> {
    w.write_all(&[v])?;
    Ok(())
}

/// Write a little-endian u64.
pub fn write_u64_le(w: &mut dyn Write, v: u64) -> Result<(), DemoError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Read a single byte.
pub fn read_u8(r: &mut dyn Read) -> Result<u8, DemoError> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

/// Read a little-endian u64.
pub fn read_u64_le(r: &mut dyn Read) -> Result<u64, DemoError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

// ── Header ──────────────────────────────────────────────────────

/// Encode the demo header.
pub fn encode_header(w: &mut dyn Write, header: &DemoHeader) -> Result<(), DemoError> {
    w.write_all(&MAGIC)?;
    write_u8(w, FORMAT_VERSION)?;
    write_u8(w, header.participant_count)?;
    write_u8(w, header.ticdup)?;
    write_u8(w, header.sync_mode.tag())?;
    Ok(())
}

/// Decode and validate the demo header.
pub fn decode_header(r: &mut dyn Read) -> Result<DemoHeader, DemoError> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(DemoError::InvalidMagic);
    }

    let version = read_u8(r)?;
    if version != FORMAT_VERSION {
        return Err(DemoError::UnsupportedVersion { found: version });
    }

    let participant_count = read_u8(r)?;
    if participant_count == 0 || usize::from(participant_count) > MAX_PARTICIPANTS {
        return Err(DemoError::MalformedRecord {
            detail: format!("participant count {participant_count} out of range"),
        });
    }
    let ticdup = read_u8(r)?;
    if ticdup == 0 {
        return Err(DemoError::MalformedRecord {
            detail: "ticdup 0 in header".into(),
        });
    }
    let tag = read_u8(r)?;
    let sync_mode = SyncMode::from_tag(tag).ok_or_else(|| DemoError::MalformedRecord {
        detail: format!("unknown sync mode tag {tag}"),
    })?;

    Ok(DemoHeader {
        participant_count,
        ticdup,
        sync_mode,
    })
}

// ── Frames ──────────────────────────────────────────────────────

/// Encode one frame followed by its slot hash.
pub fn encode_frame(w: &mut dyn Write, frame: &Frame) -> Result<(), DemoError> {
    write_u64_le(w, frame.tic)?;
    write_u8(w, frame.slot.present_mask())?;
    for command in &frame.slot.commands {
        w.write_all(&command.to_bytes())?;
    }
    write_u64_le(w, slot_hash(&frame.slot))?;
    Ok(())
}

/// Decode one frame and verify its hash.
///
/// Returns `Ok(None)` on clean EOF, an error on truncation, corruption,
/// or presence bits beyond `participant_count`.
pub fn decode_frame(
    r: &mut dyn Read,
    participant_count: usize,
) -> Result<Option<Frame>, DemoError> {
    // Read the tic header byte-by-byte to distinguish clean EOF from
    // truncation.
    let mut tic_buf = [0u8; 8];
    let mut filled = 0;
    while filled < 8 {
        match r.read(&mut tic_buf[filled..]) {
            Ok(0) => {
                if filled == 0 {
                    return Ok(None);
                }
                return Err(DemoError::MalformedRecord {
                    detail: format!("truncated frame header: got {filled} of 8 bytes"),
                });
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(DemoError::Io(e)),
        }
    }
    let tic = u64::from_le_bytes(tic_buf);

    let mask = read_u8(r)?;
    if participant_count < MAX_PARTICIPANTS && mask >> participant_count != 0 {
        return Err(DemoError::MalformedRecord {
            detail: format!("presence mask {mask:#04x} at tic {tic} exceeds {participant_count} participant(s)"),
        });
    }

    let mut slot = TicSlot::default();
    slot.set_present_mask(mask);
    for command in slot.commands.iter_mut() {
        let mut buf = [0u8; CommandRecord::ENCODED_LEN];
        r.read_exact(&mut buf)?;
        *command = CommandRecord::from_bytes(buf);
    }

    let recorded = read_u64_le(r)?;
    let computed = slot_hash(&slot);
    if recorded != computed {
        return Err(DemoError::ChecksumMismatch {
            tic,
            recorded,
            computed,
        });
    }

    Ok(Some(Frame { tic, slot }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ticsync_core::{Buttons, SpecialAction};

    fn header() -> DemoHeader {
        DemoHeader {
            participant_count: 3,
            ticdup: 2,
            sync_mode: SyncMode::Legacy,
        }
    }

    fn frame(tic: u64) -> Frame {
        let mut slot = TicSlot::default();
        slot.set(
            0,
            CommandRecord {
                forward: -25,
                side: 40,
                angle_turn: -1024,
                chat: b'g',
                buttons: Buttons::ATTACK,
                consistency: 0xBEEF,
                ..CommandRecord::default()
            },
        );
        slot.set(
            2,
            CommandRecord {
                buttons: SpecialAction::SaveGame { slot: 3 }.to_buttons(),
                ..CommandRecord::default()
            },
        );
        Frame { tic, slot }
    }

    #[test]
    fn header_roundtrip() {
        let mut buf = Vec::new();
        encode_header(&mut buf, &header()).unwrap();
        assert_eq!(buf.len(), 8);
        assert_eq!(decode_header(&mut buf.as_slice()).unwrap(), header());
    }

    #[test]
    fn bad_magic_rejected() {
        let mut buf = Vec::new();
        encode_header(&mut buf, &header()).unwrap();
        buf[0] = b'X';
        assert!(matches!(
            decode_header(&mut buf.as_slice()),
            Err(DemoError::InvalidMagic)
        ));
    }

    #[test]
    fn future_version_rejected() {
        let mut buf = Vec::new();
        encode_header(&mut buf, &header()).unwrap();
        buf[4] = FORMAT_VERSION + 1;
        assert!(matches!(
            decode_header(&mut buf.as_slice()),
            Err(DemoError::UnsupportedVersion { found }) if found == FORMAT_VERSION + 1
        ));
    }

    #[test]
    fn unknown_sync_mode_rejected() {
        let mut buf = Vec::new();
        encode_header(&mut buf, &header()).unwrap();
        buf[7] = 9;
        assert!(matches!(
            decode_header(&mut buf.as_slice()),
            Err(DemoError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn frame_roundtrip_preserves_every_field() {
        let mut buf = Vec::new();
        encode_frame(&mut buf, &frame(17)).unwrap();
        assert_eq!(buf.len(), 8 + 1 + 8 * CommandRecord::ENCODED_LEN + 8);
        let decoded = decode_frame(&mut buf.as_slice(), 3).unwrap().unwrap();
        assert_eq!(decoded, frame(17));
    }

    #[test]
    fn clean_eof_is_none() {
        let empty: &[u8] = &[];
        assert!(decode_frame(&mut &*empty, 3).unwrap().is_none());
    }

    #[test]
    fn truncated_tic_is_malformed() {
        let partial: &[u8] = &[1, 2, 3];
        assert!(matches!(
            decode_frame(&mut &*partial, 3),
            Err(DemoError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn truncated_body_is_io_error() {
        let mut buf = Vec::new();
        encode_frame(&mut buf, &frame(0)).unwrap();
        buf.truncate(20);
        assert!(matches!(
            decode_frame(&mut buf.as_slice(), 3),
            Err(DemoError::Io(_))
        ));
    }

    #[test]
    fn flipped_byte_fails_checksum() {
        let mut buf = Vec::new();
        encode_frame(&mut buf, &frame(5)).unwrap();
        buf[10] ^= 0x40;
        assert!(matches!(
            decode_frame(&mut buf.as_slice(), 3),
            Err(DemoError::ChecksumMismatch { tic: 5, .. })
        ));
    }

    #[test]
    fn presence_beyond_participant_count_rejected() {
        let mut buf = Vec::new();
        encode_frame(&mut buf, &frame(0)).unwrap();
        assert!(matches!(
            decode_frame(&mut buf.as_slice(), 2),
            Err(DemoError::MalformedRecord { .. })
        ));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn command() -> impl Strategy<Value = CommandRecord> {
            (any::<i8>(), any::<i8>(), any::<i16>(), any::<u8>(), any::<u8>(), any::<u16>())
                .prop_map(|(forward, side, angle_turn, chat, buttons, consistency)| {
                    CommandRecord {
                        forward,
                        side,
                        angle_turn,
                        chat,
                        buttons: Buttons(buttons),
                        consistency,
                        ..CommandRecord::default()
                    }
                })
        }

        proptest! {
            #[test]
            fn any_full_slot_survives_encoding(
                tic in any::<u64>(),
                commands in proptest::collection::vec(command(), MAX_PARTICIPANTS),
                mask in any::<u8>(),
            ) {
                let mut slot = TicSlot::default();
                slot.commands.copy_from_slice(&commands);
                slot.set_present_mask(mask);
                let mut buf = Vec::new();
                encode_frame(&mut buf, &Frame { tic, slot }).unwrap();
                let decoded = decode_frame(&mut buf.as_slice(), MAX_PARTICIPANTS).unwrap().unwrap();
                prop_assert_eq!(decoded, Frame { tic, slot });
            }
        }
    }
}

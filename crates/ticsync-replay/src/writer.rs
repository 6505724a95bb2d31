//! Demo recording writer.

use std::io::Write;

use ticsync_core::TicSlot;

use crate::codec::{encode_frame, encode_header};
use crate::error::DemoError;
use crate::types::{DemoHeader, Frame};

/// Writes demo frames to a byte stream. The header is written on
/// construction; frames are numbered from 0 in write order.
///
/// # Examples
///
/// ```
/// use ticsync_core::{CommandRecord, TicSlot};
/// use ticsync_engine::SyncMode;
/// use ticsync_replay::{DemoHeader, DemoReader, DemoWriter};
///
/// let header = DemoHeader { participant_count: 2, ticdup: 1, sync_mode: SyncMode::Adaptive };
///
/// let mut buf = Vec::new();
/// let mut writer = DemoWriter::new(&mut buf, header).unwrap();
/// let mut slot = TicSlot::default();
/// slot.set(1, CommandRecord { forward: 25, ..CommandRecord::default() });
/// writer.write_slot(&slot).unwrap();
/// writer.write_slot(&slot).unwrap();
/// assert_eq!(writer.frames_written(), 2);
/// drop(writer);
///
/// let mut reader = DemoReader::open(buf.as_slice()).unwrap();
/// assert_eq!(reader.header(), &header);
/// assert_eq!(reader.next_frame().unwrap().unwrap().tic, 0);
/// assert_eq!(reader.next_frame().unwrap().unwrap().slot, slot);
/// assert!(reader.next_frame().unwrap().is_none());
/// ```
pub struct DemoWriter<W: Write> {
    writer: W,
    header: DemoHeader,
    frames_written: u64,
}

impl<W: Write> DemoWriter<W> {
    /// Create a writer, immediately writing the header.
    pub fn new(mut writer: W, header: DemoHeader) -> Result<Self, DemoError> {
        encode_header(&mut writer, &header)?;
        Ok(Self {
            writer,
            header,
            frames_written: 0,
        })
    }

    /// Record the next game tic's slot.
    pub fn write_slot(&mut self, slot: &TicSlot) -> Result<(), DemoError> {
        let frame = Frame {
            tic: self.frames_written,
            slot: *slot,
        };
        encode_frame(&mut self.writer, &frame)?;
        self.frames_written += 1;
        Ok(())
    }

    /// The header this writer was created with.
    pub fn header(&self) -> &DemoHeader {
        &self.header
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> Result<(), DemoError> {
        self.writer.flush()?;
        Ok(())
    }

    /// Number of frames written so far.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Consume the writer and return the underlying sink.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

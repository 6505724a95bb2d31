//! Demo playback reader.
//!
//! [`DemoReader`] validates the header on construction, then decodes
//! frames in order, checking each hash and that tic numbers count up
//! from 0 without gaps.

use std::io::Read;

use crate::codec::{decode_frame, decode_header};
use crate::error::DemoError;
use crate::types::{DemoHeader, Frame};

/// Reads demo frames from a byte stream.
pub struct DemoReader<R: Read> {
    reader: R,
    header: DemoHeader,
    frames_read: u64,
}

impl<R: Read> DemoReader<R> {
    /// Open a demo stream, reading and validating the header.
    pub fn open(mut reader: R) -> Result<Self, DemoError> {
        let header = decode_header(&mut reader)?;
        Ok(Self {
            reader,
            header,
            frames_read: 0,
        })
    }

    /// The demo header.
    pub fn header(&self) -> &DemoHeader {
        &self.header
    }

    /// Read the next frame, or `None` at the end of the stream.
    pub fn next_frame(&mut self) -> Result<Option<Frame>, DemoError> {
        let frame = read_next(
            &mut self.reader,
            usize::from(self.header.participant_count),
            self.frames_read,
        )?;
        if frame.is_some() {
            self.frames_read += 1;
        }
        Ok(frame)
    }

    /// Number of frames read so far.
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// Convert into a frame iterator.
    pub fn frames(self) -> FrameIter<R> {
        FrameIter {
            reader: self,
            done: false,
        }
    }
}

fn read_next(
    reader: &mut dyn Read,
    participant_count: usize,
    expected_tic: u64,
) -> Result<Option<Frame>, DemoError> {
    let frame = decode_frame(reader, participant_count)?;
    if let Some(frame) = &frame {
        if frame.tic != expected_tic {
            return Err(DemoError::MalformedRecord {
                detail: format!("expected tic {expected_tic}, found {}", frame.tic),
            });
        }
    }
    Ok(frame)
}

/// Iterator adapter over demo frames. Stops after the first error.
pub struct FrameIter<R: Read> {
    reader: DemoReader<R>,
    done: bool,
}

impl<R: Read> FrameIter<R> {
    /// The demo header.
    pub fn header(&self) -> &DemoHeader {
        self.reader.header()
    }

    /// Number of frames read so far.
    pub fn frames_read(&self) -> u64 {
        self.reader.frames_read()
    }
}

impl<R: Read> Iterator for FrameIter<R> {
    type Item = Result<Frame, DemoError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.next_frame() {
            Ok(Some(frame)) => Some(Ok(frame)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

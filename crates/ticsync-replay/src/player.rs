//! Demo playback driver.

use std::io::Read;

use log::info;
use ticsync_engine::{FrameOutcome, Session};

use crate::error::DemoError;
use crate::reader::{DemoReader, FrameIter};
use crate::types::DemoHeader;

/// Feeds recorded frames to a playback session.
///
/// Each frame goes through [`Session::run_recorded_tic`], so the game
/// sees exactly the `run_tic` inputs of the recording. Start the
/// session with [`attach()`](Self::attach) first.
pub struct DemoPlayer<R: Read> {
    frames: FrameIter<R>,
    header: DemoHeader,
    frames_played: u64,
}

impl<R: Read> DemoPlayer<R> {
    /// Open a demo stream.
    pub fn open(reader: R) -> Result<Self, DemoError> {
        let reader = DemoReader::open(reader)?;
        let header = *reader.header();
        Ok(Self {
            frames: reader.frames(),
            header,
            frames_played: 0,
        })
    }

    /// The demo header.
    pub fn header(&self) -> &DemoHeader {
        &self.header
    }

    /// Restart `session` with this demo's playback configuration.
    pub fn attach(&self, session: &mut Session) -> Result<(), DemoError> {
        session.start_session(self.header.playback_config())?;
        info!(
            "playing demo: {} participant(s), recorded with ticdup {}, {} sync",
            self.header.participant_count, self.header.ticdup, self.header.sync_mode
        );
        Ok(())
    }

    /// Play the next recorded tic. Returns `None` at the end of the demo.
    pub fn play_tic(&mut self, session: &mut Session) -> Result<Option<FrameOutcome>, DemoError> {
        let recorded = usize::from(self.header.participant_count);
        let configured = session.config().participant_count;
        if configured != recorded {
            return Err(DemoError::ParticipantMismatch {
                recorded,
                session: configured,
            });
        }

        let Some(frame) = self.frames.next().transpose()? else {
            return Ok(None);
        };
        let outcome = session.run_recorded_tic(&frame.slot)?;
        self.frames_played += 1;
        Ok(Some(outcome))
    }

    /// Play until the demo ends or the game asks to quit. Returns the
    /// number of tics played by this call.
    pub fn play_to_end(&mut self, session: &mut Session) -> Result<u64, DemoError> {
        let start = self.frames_played;
        while let Some(outcome) = self.play_tic(session)? {
            if outcome == FrameOutcome::QuitRequested {
                break;
            }
        }
        Ok(self.frames_played - start)
    }

    /// Tics played so far.
    pub fn frames_played(&self) -> u64 {
        self.frames_played
    }
}

//! Recording decorator for a [`GameLoop`].

use std::io::Write;

use log::error;
use ticsync_core::{CommandRecord, GameLoop, TicSlot, MAX_PARTICIPANTS};

use crate::error::DemoError;
use crate::writer::DemoWriter;

/// Wraps a game, writing every slot passed to `run_tic` to a demo
/// before forwarding the call.
///
/// `run_tic` cannot return an error, so the first write failure is
/// logged and kept; recording stops there and the game keeps running.
/// Check [`error()`](Self::error) or [`finish()`](Self::finish).
pub struct RecordingLoop<G, W: Write> {
    inner: G,
    writer: DemoWriter<W>,
    error: Option<DemoError>,
}

impl<G: GameLoop, W: Write + Send> RecordingLoop<G, W> {
    /// Record `inner`'s tics into `writer`.
    pub fn new(inner: G, writer: DemoWriter<W>) -> Self {
        Self {
            inner,
            writer,
            error: None,
        }
    }

    /// Frames recorded so far.
    pub fn frames_recorded(&self) -> u64 {
        self.writer.frames_written()
    }

    /// The write failure that stopped recording, if any.
    pub fn error(&self) -> Option<&DemoError> {
        self.error.as_ref()
    }

    /// Flush and return the wrapped game and sink, or the first error.
    pub fn finish(mut self) -> Result<(G, W), DemoError> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.writer.flush()?;
        Ok((self.inner, self.writer.into_inner()))
    }
}

impl<G: GameLoop, W: Write + Send> GameLoop for RecordingLoop<G, W> {
    fn process_events(&mut self) {
        self.inner.process_events();
    }

    fn run_menu(&mut self) {
        self.inner.run_menu();
    }

    fn build_ticcmd(&mut self) -> CommandRecord {
        self.inner.build_ticcmd()
    }

    fn run_tic(&mut self, commands: &[CommandRecord], present: &[bool]) {
        if self.error.is_none() {
            let mut slot = TicSlot::default();
            let n = commands.len().min(MAX_PARTICIPANTS);
            slot.commands[..n].copy_from_slice(&commands[..n]);
            let n = present.len().min(MAX_PARTICIPANTS);
            slot.present[..n].copy_from_slice(&present[..n]);
            if let Err(e) = self.writer.write_slot(&slot) {
                error!(
                    "demo recording stopped after {} frame(s): {e}",
                    self.writer.frames_written()
                );
                self.error = Some(e);
            }
        }
        self.inner.run_tic(commands, present);
    }

    fn quit_requested(&self) -> bool {
        self.inner.quit_requested()
    }
}

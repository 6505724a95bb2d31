//! Cross-thread delivery of received tics.
//!
//! A transport that runs on its own thread cannot borrow the session.
//! It holds an [`InboxSender`] instead; the session drains the matching
//! [`Inbox`] at the start of every pump, in arrival order.

use crossbeam_channel::{Receiver, Sender, TryRecvError, TrySendError};
use ticsync_core::TicSlot;

use crate::receiver::Incoming;

/// Errors from delivering into an [`Inbox`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboxError {
    /// The inbox is at capacity (back-pressure).
    Full,
    /// The session side of the inbox has been dropped or replaced.
    Closed,
}

impl std::fmt::Display for InboxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Full => write!(f, "inbox full"),
            Self::Closed => write!(f, "inbox closed"),
        }
    }
}

impl std::error::Error for InboxError {}

/// Session side of the delivery channel.
#[derive(Debug)]
pub struct Inbox {
    rx: Receiver<Incoming>,
}

/// Transport side of the delivery channel. Cheap to clone.
#[derive(Debug, Clone)]
pub struct InboxSender {
    tx: Sender<Incoming>,
}

impl Inbox {
    /// Create a bounded inbox holding at most `capacity` undelivered items.
    pub fn bounded(capacity: usize) -> (Inbox, InboxSender) {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        (Inbox { rx }, InboxSender { tx })
    }

    /// Take the next delivered item, if any.
    pub fn try_next(&self) -> Option<Incoming> {
        match self.rx.try_recv() {
            Ok(item) => Some(item),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Number of items waiting.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Whether nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Drop everything waiting. Returns how many items were discarded.
    pub fn discard_pending(&self) -> usize {
        self.rx.try_iter().count()
    }
}

impl InboxSender {
    /// Deliver, blocking while the inbox is full.
    pub fn deliver(&self, incoming: impl Into<Incoming>) -> Result<(), InboxError> {
        self.tx.send(incoming.into()).map_err(|_| InboxError::Closed)
    }

    /// Deliver without blocking.
    pub fn try_deliver(&self, incoming: impl Into<Incoming>) -> Result<(), InboxError> {
        self.tx.try_send(incoming.into()).map_err(|e| match e {
            TrySendError::Full(_) => InboxError::Full,
            TrySendError::Disconnected(_) => InboxError::Closed,
        })
    }

    /// Deliver a complete slot for the next network tic.
    pub fn deliver_slot(&self, slot: TicSlot) -> Result<(), InboxError> {
        self.deliver(Incoming::Tic(slot))
    }
}

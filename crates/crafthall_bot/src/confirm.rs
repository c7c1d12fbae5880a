//! Confirmation prompts for destructive commands.
//!
//! A handler registers an awaiting state with [`Confirmations::begin`], sends
//! its prompt, then waits on the returned [`PendingConfirmation`]. The
//! dispatcher feeds every incoming message to [`Confirmations::offer`]; a
//! `confirm` from the same member resolves the wait. Each member has at most
//! one pending confirmation and many members can be waiting at once.

use crafthall_core::MemberId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::oneshot;

/// The literal reply that confirms a prompt, compared case-insensitively.
pub const CONFIRM_WORD: &str = "confirm";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Confirmed,
    TimedOut,
    /// The same member started another confirmation before answering this one.
    Superseded,
}

struct Waiter {
    ticket: u64,
    tx: oneshot::Sender<()>,
}

#[derive(Clone, Default)]
pub struct Confirmations {
    waiting: Arc<Mutex<HashMap<MemberId, Waiter>>>,
    next_ticket: Arc<AtomicU64>,
}

impl Confirmations {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<MemberId, Waiter>> {
        self.waiting.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Enter the awaiting state for `member_id`. Replaces any earlier wait by
    /// the same member, which then resolves as [`ConfirmOutcome::Superseded`].
    pub fn begin(&self, member_id: MemberId) -> PendingConfirmation {
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        if self.lock().insert(member_id, Waiter { ticket, tx }).is_some() {
            tracing::debug!("Member {} restarted a pending confirmation", member_id);
        }
        PendingConfirmation {
            member_id,
            ticket,
            rx,
            registry: self.clone(),
        }
    }

    /// Offer a message from `member_id`. Returns true if it confirmed a
    /// pending prompt, in which case the message should not be processed further.
    pub fn offer(&self, member_id: MemberId, text: &str) -> bool {
        if !text.trim().eq_ignore_ascii_case(CONFIRM_WORD) {
            return false;
        }
        match self.lock().remove(&member_id) {
            Some(waiter) => waiter.tx.send(()).is_ok(),
            None => false,
        }
    }

    pub fn is_pending(&self, member_id: MemberId) -> bool {
        self.lock().contains_key(&member_id)
    }

    fn release(&self, member_id: MemberId, ticket: u64) {
        let mut waiting = self.lock();
        if waiting.get(&member_id).is_some_and(|w| w.ticket == ticket) {
            waiting.remove(&member_id);
        }
    }
}

/// An awaiting-confirmation state. Dropping it abandons the wait.
pub struct PendingConfirmation {
    member_id: MemberId,
    ticket: u64,
    rx: oneshot::Receiver<()>,
    registry: Confirmations,
}

impl PendingConfirmation {
    pub async fn wait(mut self, timeout: Duration) -> ConfirmOutcome {
        match tokio::time::timeout(timeout, &mut self.rx).await {
            Ok(Ok(())) => ConfirmOutcome::Confirmed,
            Ok(Err(_)) => ConfirmOutcome::Superseded,
            Err(_) => ConfirmOutcome::TimedOut,
        }
    }
}

impl Drop for PendingConfirmation {
    fn drop(&mut self) {
        self.registry.release(self.member_id, self.ticket);
    }
}

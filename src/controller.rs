//! Mailbox session controller: owns the active session, the message
//! collection, and the selection pointer, and drives rotation, polling,
//! and the expiry countdown against a [`ProvisioningService`].

use std::collections::HashSet;
use std::sync::{Arc, Mutex, Weak};

use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, warn};

use crate::constants::{COUNTDOWN_TICK, POLL_INTERVAL, SESSION_TTL_SECS};
use crate::format::format_countdown;
use crate::models::{InboxSnapshot, Message, RawMessage, Session};
use crate::provisioning::ProvisioningService;

/// Which caller triggered an inbox sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncKind {
    /// The recurring poll timer.
    Poll,
    /// An explicit user refresh.
    Manual,
}

#[derive(Default)]
struct InboxState {
    session: Option<Session>,
    messages: Vec<Message>,
    selected: Option<String>,
    loading: bool,
    refreshing: bool,
    polling: bool,
    error: Option<String>,
    /// Latest issued rotation attempt; completions bearing an older value
    /// are discarded.
    rotation_seq: u64,
    /// Bumped when a rotation succeeds and the credential is replaced;
    /// syncs started under an older epoch are discarded on completion.
    sync_epoch: u64,
}

struct Inner {
    state: Mutex<InboxState>,
    provisioner: Arc<dyn ProvisioningService>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Ok(tasks) = self.tasks.get_mut() {
            for task in tasks.drain(..) {
                task.abort();
            }
        }
    }
}

/// Controller for one disposable-mailbox session.
///
/// All shared state lives behind a single mutex that is never held across an
/// await point: each operation is a lock, transition, unlock step, and every
/// network completion is validated against the sequence counters captured
/// when the call was issued.
#[derive(Clone)]
pub struct MailboxController {
    inner: Arc<Inner>,
}

impl MailboxController {
    pub fn new(provisioner: Arc<dyn ProvisioningService>) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(InboxState::default()),
                provisioner,
                tasks: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Provision the first session and start the countdown and poll timers.
    pub async fn start(&self) {
        self.rotate().await;
        self.spawn_timers();
    }

    /// Replace the current session with a freshly provisioned one, clearing
    /// the message collection and the selection.
    ///
    /// On failure the prior session, messages, and selection are left
    /// untouched and a blocking error is surfaced. When rotations overlap,
    /// only the latest issued attempt may apply its result.
    pub async fn rotate(&self) {
        let seq = {
            let mut state = self.lock();
            state.rotation_seq += 1;
            state.loading = true;
            state.error = None;
            state.rotation_seq
        };

        let outcome = self.inner.provisioner.create_address().await;

        let mut state = self.lock();
        if state.rotation_seq != seq {
            debug!(seq, "discarding superseded rotation result");
            return;
        }
        state.loading = false;
        match outcome {
            Ok(provisioned) => {
                debug!(address = %provisioned.address, "rotated to new session");
                state.session = Some(Session::new(provisioned.address, provisioned.credential));
                state.messages.clear();
                state.selected = None;
                state.error = None;
                state.sync_epoch += 1;
            }
            Err(err) => {
                warn!(error = %err, "address provisioning failed");
                state.error = Some(format!("Failed to generate temporary email: {err}"));
            }
        }
    }

    /// Fetch and merge new messages for the current credential.
    ///
    /// A no-op while any sync is already in flight or no session exists.
    /// Results arriving after the session rotated away from the credential
    /// they were fetched with are discarded.
    pub async fn sync(&self, kind: SyncKind) {
        let (credential, epoch) = {
            let mut state = self.lock();
            if state.polling || state.refreshing {
                return;
            }
            let Some(session) = state.session.as_ref() else {
                return;
            };
            let credential = session.credential.clone();
            match kind {
                SyncKind::Poll => state.polling = true,
                SyncKind::Manual => state.refreshing = true,
            }
            (credential, state.sync_epoch)
        };

        let outcome = self.inner.provisioner.list_messages(&credential).await;

        let mut state = self.lock();
        match kind {
            SyncKind::Poll => state.polling = false,
            SyncKind::Manual => state.refreshing = false,
        }
        if state.sync_epoch != epoch {
            debug!("discarding sync result for rotated-away credential");
            return;
        }
        match outcome {
            Ok(raw) => {
                let merged = merge_new(&mut state.messages, raw);
                if merged > 0 {
                    debug!(count = merged, "merged new messages");
                }
                state.error = None;
            }
            Err(err) => {
                warn!(error = %err, "inbox sync failed");
                state.error = Some(format!("Failed to fetch emails: {err}"));
            }
        }
    }

    /// Explicit user-triggered refresh.
    pub async fn refresh(&self) {
        self.sync(SyncKind::Manual).await;
    }

    /// One countdown step. At zero the visible value resets to a full
    /// period within the same step and a rotation runs in the background,
    /// so the presentation layer never observes zero or a negative value.
    pub fn tick(&self) {
        let expired = {
            let mut state = self.lock();
            match state.session.as_mut() {
                Some(session) if session.ttl_remaining <= 1 => {
                    session.ttl_remaining = SESSION_TTL_SECS;
                    true
                }
                Some(session) => {
                    session.ttl_remaining -= 1;
                    false
                }
                None => false,
            }
        };
        if expired {
            debug!("mailbox lifetime expired, rotating");
            let controller = self.clone();
            tokio::spawn(async move { controller.rotate().await });
        }
    }

    /// Point the selection at `id`, marking the matching message read.
    /// Selecting an id not present in the inbox still moves the pointer
    /// without marking anything read.
    pub fn select(&self, id: &str) {
        let mut state = self.lock();
        state.selected = Some(id.to_string());
        if let Some(message) = state.messages.iter_mut().find(|m| m.id == id) {
            message.read = true;
        }
    }

    /// Clear the selection pointer.
    pub fn deselect(&self) {
        self.lock().selected = None;
    }

    /// Read-only projection of the current state for the presentation layer.
    pub fn snapshot(&self) -> InboxSnapshot {
        let state = self.lock();
        let ttl = state
            .session
            .as_ref()
            .map(|s| s.ttl_remaining)
            .unwrap_or(SESSION_TTL_SECS);
        InboxSnapshot {
            address: state
                .session
                .as_ref()
                .map(|s| s.address.clone())
                .unwrap_or_default(),
            countdown: format_countdown(ttl),
            messages: state.messages.clone(),
            selected: state.selected.clone(),
            loading: state.loading,
            refreshing: state.refreshing,
            error: state.error.clone(),
        }
    }

    /// Stop the countdown and poll timers. Idempotent; also runs when the
    /// last controller handle is dropped.
    pub fn shutdown(&self) {
        let mut tasks = self.inner.tasks.lock().unwrap_or_else(|e| e.into_inner());
        for task in tasks.drain(..) {
            task.abort();
        }
    }

    fn spawn_timers(&self) {
        let mut tasks = self.inner.tasks.lock().unwrap_or_else(|e| e.into_inner());
        if !tasks.is_empty() {
            return;
        }

        // The timer tasks hold weak handles so they never keep the
        // controller alive on their own.
        let weak = Arc::downgrade(&self.inner);
        let countdown = tokio::spawn(async move {
            let mut timer = interval(COUNTDOWN_TICK);
            timer.tick().await;
            loop {
                timer.tick().await;
                let Some(controller) = upgrade(&weak) else {
                    break;
                };
                controller.tick();
            }
        });

        let weak = Arc::downgrade(&self.inner);
        let poll = tokio::spawn(async move {
            let mut timer = interval(POLL_INTERVAL);
            timer.tick().await;
            loop {
                timer.tick().await;
                let Some(controller) = upgrade(&weak) else {
                    break;
                };
                controller.sync(SyncKind::Poll).await;
            }
        });

        tasks.push(countdown);
        tasks.push(poll);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, InboxState> {
        self.inner.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn upgrade(weak: &Weak<Inner>) -> Option<MailboxController> {
    weak.upgrade().map(|inner| MailboxController { inner })
}

/// Prepend the records whose id is not already known, preserving existing
/// order and read flags. Returns how many messages were merged.
fn merge_new(existing: &mut Vec<Message>, raw: Vec<RawMessage>) -> usize {
    let mut seen: HashSet<String> = existing.iter().map(|m| m.id.clone()).collect();
    let mut fresh = Vec::new();
    for record in raw {
        let message = Message::from_raw(record);
        if seen.insert(message.id.clone()) {
            fresh.push(message);
        }
    }
    let merged = fresh.len();
    fresh.extend(existing.drain(..));
    *existing = fresh;
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: &str) -> RawMessage {
        RawMessage {
            id: Some(id.to_string()),
            ..RawMessage::default()
        }
    }

    #[test]
    fn merge_prepends_new_messages() {
        let mut inbox = Vec::new();
        assert_eq!(merge_new(&mut inbox, vec![raw("a"), raw("b")]), 2);
        assert_eq!(merge_new(&mut inbox, vec![raw("c")]), 1);
        let ids: Vec<&str> = inbox.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["c", "a", "b"]);
    }

    #[test]
    fn merge_skips_known_ids_and_keeps_first_flags() {
        let mut inbox = Vec::new();
        merge_new(&mut inbox, vec![raw("a")]);
        inbox[0].read = true;

        let duplicate = RawMessage {
            id: Some("a".into()),
            read: Some(false),
            ..RawMessage::default()
        };
        assert_eq!(merge_new(&mut inbox, vec![duplicate, raw("b")]), 1);
        assert_eq!(inbox.len(), 2);
        let a = inbox.iter().find(|m| m.id == "a").unwrap();
        assert!(a.read, "earlier merge's read flag must survive duplicates");
    }

    #[test]
    fn merge_dedups_within_a_single_batch() {
        let mut inbox = Vec::new();
        assert_eq!(merge_new(&mut inbox, vec![raw("a"), raw("a")]), 1);
        assert_eq!(inbox.len(), 1);
    }
}

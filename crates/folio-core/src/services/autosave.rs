//! Autosave reconciliation for one authoring session.
//!
//! Every edit is mirrored into the local cache right away; the remote draft
//! store only sees the latest state after a quiet period. A session runs as a
//! single task so at most one remote save is ever in flight, and edits made
//! while it is outstanding are coalesced into one follow-up save.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::{DraftInput, PostStatus};
use crate::error::DomainError;
use crate::ports::{DraftStore, LocalCache};

/// Key of the single most-recent-draft record in the local cache.
pub const LOCAL_DRAFT_KEY: &str = "folio:autosave:current-draft";

/// Everything the author has typed so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthoringState {
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub serialized_content: String,
    pub category: String,
    pub tags: Vec<String>,
    pub is_featured: bool,
    pub status: PostStatus,
    pub publish_date: Option<DateTime<Utc>>,
    pub cover_image: Option<String>,
}

impl AuthoringState {
    pub fn to_draft_input(&self, id: Option<Uuid>) -> DraftInput {
        DraftInput {
            id,
            title: self.title.clone(),
            slug: self.slug.clone(),
            serialized_content: self.serialized_content.clone(),
            excerpt: self.excerpt.clone(),
            cover_image: self.cover_image.clone(),
            category: self.category.clone(),
            tags: self.tags.clone(),
            is_featured: self.is_featured,
            publish_date: self.publish_date,
        }
    }
}

/// Layout of the record stored under [`LOCAL_DRAFT_KEY`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalDraftRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft_id: Option<Uuid>,
    #[serde(flatten)]
    pub state: AuthoringState,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AutosaveStatus {
    #[default]
    Idle,
    Editing,
    Saving,
    Saved,
}

#[derive(Debug, Clone)]
pub struct AutosaveConfig {
    /// Quiet period after the last edit before a remote save starts.
    pub debounce: Duration,
    /// How long `Saved` is reported before falling back to `Idle`.
    pub saved_display: Duration,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(1500),
            saved_display: Duration::from_millis(2000),
        }
    }
}

/// How an authoring session is seeded.
#[derive(Debug, Clone)]
pub enum SessionStart {
    /// Editing a known post or draft; the local cache is not consulted.
    Explicit {
        draft_id: Option<Uuid>,
        state: AuthoringState,
    },
    /// Pick up whatever the local cache holds from a previous session.
    Resume,
}

enum Command {
    Edit(AuthoringState),
    Flush(oneshot::Sender<Option<Uuid>>),
    Published(oneshot::Sender<()>),
    DraftId(oneshot::Sender<Option<Uuid>>),
}

/// Handle to a running autosave session.
pub struct AutosaveSession {
    commands: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<AutosaveStatus>,
    initial: AuthoringState,
    task: JoinHandle<()>,
}

impl AutosaveSession {
    pub async fn start(
        store: Arc<dyn DraftStore>,
        cache: Arc<dyn LocalCache>,
        config: AutosaveConfig,
        start: SessionStart,
    ) -> Self {
        let (draft_id, initial) = match start {
            SessionStart::Explicit { draft_id, state } => (draft_id, state),
            SessionStart::Resume => match load_record(cache.as_ref()).await {
                Some(record) => {
                    debug!(draft_id = ?record.draft_id, saved_at = %record.saved_at, "resuming local draft");
                    (record.draft_id, record.state)
                }
                None => (None, AuthoringState::default()),
            },
        };

        let (commands, receiver) = mpsc::unbounded_channel();
        let (status_tx, status) = watch::channel(AutosaveStatus::Idle);
        let reconciler = Reconciler {
            store,
            cache,
            config,
            draft_id,
            latest: initial.clone(),
            pending: None,
            deadline: None,
            in_flight: false,
            saved_until: None,
            epoch: 0,
            status: status_tx,
            waiters: Vec::new(),
        };
        let task = tokio::spawn(reconciler.run(receiver));

        Self {
            commands,
            status,
            initial,
            task,
        }
    }

    /// State the editor should open with.
    pub fn initial_state(&self) -> &AuthoringState {
        &self.initial
    }

    /// Records a change; never blocks on storage.
    pub fn edit(&self, state: AuthoringState) {
        if self.commands.send(Command::Edit(state)).is_err() {
            warn!("autosave session has stopped, edit not recorded");
        }
    }

    pub fn status(&self) -> AutosaveStatus {
        *self.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<AutosaveStatus> {
        self.status.clone()
    }

    /// Saves any pending edit now and waits for it. Returns the draft id
    /// subsequent saves target.
    pub async fn flush(&self) -> Option<Uuid> {
        self.request(Command::Flush).await.flatten()
    }

    /// Forgets the local draft after a successful publish.
    pub async fn published(&self) {
        self.request(Command::Published).await;
    }

    pub async fn draft_id(&self) -> Option<Uuid> {
        self.request(Command::DraftId).await.flatten()
    }

    /// Stops the session. Unsaved edits stay in the local cache.
    pub async fn shutdown(self) {
        drop(self.commands);
        if let Err(e) = self.task.await {
            warn!(error = %e, "autosave task ended abnormally");
        }
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Option<T> {
        let (tx, rx) = oneshot::channel();
        self.commands.send(command(tx)).ok()?;
        rx.await.ok()
    }
}

async fn load_record(cache: &dyn LocalCache) -> Option<LocalDraftRecord> {
    let raw = match cache.get(LOCAL_DRAFT_KEY).await {
        Ok(raw) => raw?,
        Err(e) => {
            warn!(error = %e, "local draft cache unreadable, starting empty");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(record) => Some(record),
        Err(e) => {
            warn!(error = %e, "local draft record is corrupt, starting empty");
            None
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}

type SaveResult = (u64, Result<Uuid, DomainError>);

struct Reconciler {
    store: Arc<dyn DraftStore>,
    cache: Arc<dyn LocalCache>,
    config: AutosaveConfig,
    draft_id: Option<Uuid>,
    latest: AuthoringState,
    /// Edited state not yet handed to the store.
    pending: Option<AuthoringState>,
    deadline: Option<Instant>,
    in_flight: bool,
    saved_until: Option<Instant>,
    /// Bumped on publish so results of older saves are ignored.
    epoch: u64,
    status: watch::Sender<AutosaveStatus>,
    waiters: Vec<oneshot::Sender<Option<Uuid>>>,
}

impl Reconciler {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<SaveResult>();

        loop {
            let debounce = self.deadline.filter(|_| !self.in_flight);
            let saved_until = self.saved_until;

            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle(command, &done_tx).await,
                    None => break,
                },
                _ = wait_until(debounce) => {
                    self.deadline = None;
                    self.begin_save(&done_tx);
                }
                Some((epoch, result)) = done_rx.recv() => {
                    self.finish_save(epoch, result, &done_tx).await;
                }
                _ = wait_until(saved_until) => {
                    self.saved_until = None;
                    if *self.status.borrow() == AutosaveStatus::Saved {
                        self.set_status(AutosaveStatus::Idle);
                    }
                }
            }
        }

        if self.pending.is_some() {
            debug!("autosave session closed with unsaved edits, kept locally");
        }
    }

    async fn handle(&mut self, command: Command, done_tx: &mpsc::UnboundedSender<SaveResult>) {
        match command {
            Command::Edit(state) => {
                self.latest = state.clone();
                self.pending = Some(state);
                self.deadline = Some(Instant::now() + self.config.debounce);
                self.saved_until = None;
                if !self.in_flight {
                    self.set_status(AutosaveStatus::Editing);
                }
                self.write_local().await;
            }
            Command::Flush(reply) => {
                if self.in_flight {
                    self.waiters.push(reply);
                } else if self.pending.is_some() {
                    self.waiters.push(reply);
                    self.deadline = None;
                    self.begin_save(done_tx);
                } else {
                    let _ = reply.send(self.draft_id);
                }
            }
            Command::Published(reply) => {
                self.epoch += 1;
                self.pending = None;
                self.deadline = None;
                self.saved_until = None;
                self.draft_id = None;
                self.latest = AuthoringState::default();
                if let Err(e) = self.cache.remove(LOCAL_DRAFT_KEY).await {
                    warn!(error = %e, "failed to clear local draft after publish");
                }
                self.set_status(AutosaveStatus::Idle);
                for waiter in self.waiters.drain(..) {
                    let _ = waiter.send(None);
                }
                let _ = reply.send(());
            }
            Command::DraftId(reply) => {
                let _ = reply.send(self.draft_id);
            }
        }
    }

    fn begin_save(&mut self, done_tx: &mpsc::UnboundedSender<SaveResult>) {
        let Some(state) = self.pending.take() else {
            return;
        };
        self.in_flight = true;
        self.set_status(AutosaveStatus::Saving);

        let input = state.to_draft_input(self.draft_id);
        let store = self.store.clone();
        let done = done_tx.clone();
        let epoch = self.epoch;
        tokio::spawn(async move {
            let result = store.save_draft(input).await;
            let _ = done.send((epoch, result));
        });
    }

    async fn finish_save(
        &mut self,
        epoch: u64,
        result: Result<Uuid, DomainError>,
        done_tx: &mpsc::UnboundedSender<SaveResult>,
    ) {
        self.in_flight = false;

        let saved = match result {
            Ok(id) if epoch == self.epoch => {
                let threaded = self.draft_id != Some(id);
                self.draft_id = Some(id);
                if threaded {
                    self.write_local().await;
                }
                debug!(draft_id = %id, "draft saved");
                true
            }
            Ok(id) => {
                debug!(draft_id = %id, "ignoring save that completed after publish");
                false
            }
            Err(e) => {
                warn!(error = %e, "autosave failed, edits remain in the local cache");
                false
            }
        };

        if self.pending.is_some() {
            self.set_status(AutosaveStatus::Editing);
            if !self.waiters.is_empty() {
                self.deadline = None;
                self.begin_save(done_tx);
            }
            return;
        }

        if saved {
            self.set_status(AutosaveStatus::Saved);
            self.saved_until = Some(Instant::now() + self.config.saved_display);
        } else {
            self.set_status(AutosaveStatus::Idle);
        }
        for waiter in self.waiters.drain(..) {
            let _ = waiter.send(self.draft_id);
        }
    }

    async fn write_local(&self) {
        let record = LocalDraftRecord {
            draft_id: self.draft_id,
            state: self.latest.clone(),
            saved_at: Utc::now(),
        };
        let result = match serde_json::to_string(&record) {
            Ok(json) => self.cache.set(LOCAL_DRAFT_KEY, &json).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = result {
            warn!(error = %e, "failed to mirror edits into the local cache");
        }
    }

    fn set_status(&self, status: AutosaveStatus) {
        self.status.send_replace(status);
    }
}

//! Rebuilds the open levels when the bookmark store changes.
//!
//! Notifications come in bursts (a sort emits one move per sibling), so
//! they are debounced: the first one marks a rebuild as pending and starts
//! a single timer, later ones only merge into the pending rebuild and push
//! its deadline back. The timer fires once `window` has passed since the
//! latest notification and rebuilds against the state as it is then.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};

use crate::managers::bookmark_store::BookmarkStore;
use crate::managers::popup_state::PopupState;
use crate::services::tree_builder::TreeLevelBuilder;
use crate::types::bookmark::BookmarkEvent;

/// Quiet period after the latest notification before rebuilding.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(100);

#[derive(Debug)]
struct PendingRebuild {
    /// Folders that moved or vanished; their levels close before rebuilding.
    closed_folder_ids: Vec<String>,
    last_event: Instant,
}

enum Settle {
    Ready(PendingRebuild),
    Wait(Instant),
    Idle,
}

struct Inner<S: ?Sized> {
    state: Arc<tokio::sync::Mutex<PopupState>>,
    builder: TreeLevelBuilder<S>,
    window: Duration,
    pending: Mutex<Option<PendingRebuild>>,
    rebuilds: AtomicUsize,
    generation: watch::Sender<u64>,
}

impl<S: BookmarkStore + ?Sized + 'static> Inner<S> {
    fn lock_pending(&self) -> MutexGuard<'_, Option<PendingRebuild>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes the pending rebuild once its window has elapsed.
    fn settle(&self) -> Settle {
        let mut pending = self.lock_pending();
        match pending.as_ref() {
            None => Settle::Idle,
            Some(p) => {
                let deadline = p.last_event + self.window;
                if Instant::now() < deadline {
                    return Settle::Wait(deadline);
                }
                match pending.take() {
                    Some(p) => Settle::Ready(p),
                    None => Settle::Idle,
                }
            }
        }
    }

    async fn run_timer(self: Arc<Self>) {
        let pending = loop {
            match self.settle() {
                Settle::Ready(pending) => break pending,
                Settle::Wait(deadline) => tokio::time::sleep_until(deadline).await,
                Settle::Idle => return,
            }
        };

        {
            let mut state = self.state.lock().await;
            match state
                .rebuild_after_change(&self.builder, &pending.closed_folder_ids)
                .await
            {
                Ok(()) => tracing::debug!("Rebuilt {} levels after bookmark changes", state.stack().len()),
                Err(e) => tracing::error!("Failed to rebuild levels after bookmark changes: {}", e),
            }
        }

        self.rebuilds.fetch_add(1, Ordering::SeqCst);
        self.generation.send_modify(|generation| *generation += 1);
    }
}

/// Debounced listener for store notifications.
pub struct ChangeReactor<S: ?Sized> {
    inner: Arc<Inner<S>>,
}

impl<S: ?Sized> Clone for ChangeReactor<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: BookmarkStore + ?Sized + 'static> ChangeReactor<S> {
    pub fn new(
        state: Arc<tokio::sync::Mutex<PopupState>>,
        builder: TreeLevelBuilder<S>,
        window: Duration,
    ) -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                state,
                builder,
                window,
                pending: Mutex::new(None),
                rebuilds: AtomicUsize::new(0),
                generation,
            }),
        }
    }

    /// Number of rebuilds run so far.
    pub fn rebuild_count(&self) -> usize {
        self.inner.rebuilds.load(Ordering::SeqCst)
    }

    /// Receiver bumped after every rebuild.
    pub fn subscribe_generation(&self) -> watch::Receiver<u64> {
        self.inner.generation.subscribe()
    }

    pub fn is_pending(&self) -> bool {
        self.inner.lock_pending().is_some()
    }

    /// Records a store notification. Must be called inside a tokio runtime.
    pub fn notify(&self, event: &BookmarkEvent) {
        let closed_folder_id = match event {
            BookmarkEvent::Moved { id, .. } | BookmarkEvent::Removed { id, .. } => Some(id.clone()),
            BookmarkEvent::Created { .. } | BookmarkEvent::Changed { .. } => None,
        };
        tracing::debug!("Bookmark {} changed, scheduling rebuild", event.id());
        self.schedule(closed_folder_id);
    }

    /// Schedules a rebuild of every open level.
    pub fn request_rebuild(&self) {
        self.schedule(None);
    }

    fn schedule(&self, closed_folder_id: Option<String>) {
        let start_timer = {
            let mut pending = self.inner.lock_pending();
            let now = Instant::now();
            match pending.as_mut() {
                Some(p) => {
                    p.last_event = now;
                    p.closed_folder_ids.extend(closed_folder_id);
                    false
                }
                None => {
                    *pending = Some(PendingRebuild {
                        closed_folder_ids: closed_folder_id.into_iter().collect(),
                        last_event: now,
                    });
                    true
                }
            }
        };

        if start_timer {
            tokio::spawn(Arc::clone(&self.inner).run_timer());
        }
    }

    /// Feeds every notification from `events` into the reactor until the
    /// channel closes. Missed notifications schedule a full rebuild.
    pub fn listen(&self, mut events: broadcast::Receiver<BookmarkEvent>) -> JoinHandle<()> {
        let reactor = self.clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => reactor.notify(&event),
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        tracing::warn!("Missed {} bookmark notifications, rebuilding everything", missed);
                        reactor.request_rebuild();
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::debug!("Bookmark notification channel closed");
                        break;
                    }
                }
            }
        })
    }
}

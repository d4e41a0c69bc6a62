//! In-memory workout collection kept consistent with a [`WorkoutStore`].
//!
//! [`WorkoutRepository`] is constructed explicitly and handed to consumers;
//! clones share the same collection. Lifecycle: `new` → [`initialize`] →
//! ready or failed. Every load and mutation runs on its own spawned task
//! behind a write gate, so an operation that reached the store finishes
//! even if the caller stops waiting. A mutation hits the store first and
//! only on success touches the cache and notifies subscribers.
//!
//! [`initialize`]: WorkoutRepository::initialize

pub mod events;
pub mod snapshot;


use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinError;
use tracing::Instrument;
use workout::{
    insert_newest_first, sort_newest_first, IdGenerator, OccurredAtPolicy, ValidationError,
    WorkoutDraft, WorkoutId, WorkoutRecord,
};

use crate::persistence::{SortDirection, StoreError, WorkoutStore};
pub use events::{MutationKind, RepositoryEvent};
pub use snapshot::{LoadStatus, RepositorySnapshot};

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("workout repository is not ready ({0})")]
    NotReady(LoadStatus),
    #[error("invalid workout: {0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("workout operation was cancelled: {0}")]
    Cancelled(JoinError),
}

impl RepositoryError {
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_unavailable())
    }
}

#[derive(Debug, Default)]
struct RepositoryState {
    status: LoadStatus,
    workouts: Vec<WorkoutRecord>,
}

impl RepositoryState {
    fn snapshot(&self) -> RepositorySnapshot {
        RepositorySnapshot {
            status: self.status.clone(),
            workouts: self.workouts.clone(),
        }
    }
}

/// Owns the cached, newest-first collection of workouts.
pub struct WorkoutRepository<S> {
    shared: Arc<Shared<S>>,
}

impl<S> Clone for WorkoutRepository<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

struct Shared<S> {
    store: S,
    ids: IdGenerator,
    policy: OccurredAtPolicy,
    state: RwLock<RepositoryState>,
    /// Serializes loads and mutations; held across the store call.
    writes: Mutex<()>,
    event_tx: broadcast::Sender<RepositoryEvent>,
}

impl<S: WorkoutStore + 'static> WorkoutRepository<S> {
    pub fn new(store: S) -> Self {
        Self::with_policy(store, OccurredAtPolicy::default())
    }

    pub fn with_policy(store: S, policy: OccurredAtPolicy) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                store,
                ids: IdGenerator::new(),
                policy,
                state: RwLock::new(RepositoryState::default()),
                writes: Mutex::new(()),
                event_tx,
            }),
        }
    }

    pub fn store(&self) -> &S {
        &self.shared.store
    }

    pub fn policy(&self) -> OccurredAtPolicy {
        self.shared.policy
    }

    /// Load every record from the store. Can be called again from any
    /// state, e.g. to recover from `LoadStatus::Failed`. While loading the
    /// collection is empty, and a failed reload leaves it empty.
    pub async fn initialize(&self) -> Result<(), RepositoryError> {
        let shared = Arc::clone(&self.shared);
        run_to_completion(
            async move { shared.initialize_inner().await }
                .instrument(tracing::info_span!("workouts", op = "initialize")),
        )
        .await
    }

    /// Validate `draft`, persist it under a fresh id, and insert it into the
    /// cache at its newest-first position.
    pub async fn create(&self, draft: &WorkoutDraft) -> Result<WorkoutRecord, RepositoryError> {
        let shared = Arc::clone(&self.shared);
        let draft = draft.clone();
        run_to_completion(
            async move { shared.create_inner(&draft).await }
                .instrument(tracing::info_span!("workouts", op = "create")),
        )
        .await
    }

    /// Replace every mutable field of the record with `id`.
    pub async fn update(
        &self,
        id: &WorkoutId,
        draft: &WorkoutDraft,
    ) -> Result<WorkoutRecord, RepositoryError> {
        let shared = Arc::clone(&self.shared);
        let span = tracing::info_span!("workouts", op = "update", id = %id);
        let (id, draft) = (id.clone(), draft.clone());
        run_to_completion(async move { shared.update_inner(&id, &draft).await }.instrument(span))
            .await
    }

    /// Remove the record with `id`. Deleting an unknown id succeeds.
    pub async fn delete(&self, id: &WorkoutId) -> Result<(), RepositoryError> {
        let shared = Arc::clone(&self.shared);
        let span = tracing::info_span!("workouts", op = "delete", id = %id);
        let id = id.clone();
        run_to_completion(async move { shared.delete_inner(&id).await }.instrument(span)).await
    }

    /// Copy of the cached collection, newest first.
    pub async fn list(&self) -> Vec<WorkoutRecord> {
        self.shared.state.read().await.workouts.clone()
    }

    pub async fn get(&self, id: &WorkoutId) -> Option<WorkoutRecord> {
        self.shared
            .state
            .read()
            .await
            .workouts
            .iter()
            .find(|w| w.id == *id)
            .cloned()
    }

    pub async fn status(&self) -> LoadStatus {
        self.shared.state.read().await.status.clone()
    }

    pub async fn snapshot(&self) -> RepositorySnapshot {
        self.shared.state.read().await.snapshot()
    }

    /// Current snapshot plus a receiver for every later event. Taken under
    /// the state lock, so no transition is missed or seen twice.
    pub async fn subscribe(&self) -> (RepositorySnapshot, broadcast::Receiver<RepositoryEvent>) {
        let state = self.shared.state.read().await;
        (state.snapshot(), self.shared.event_tx.subscribe())
    }
}

/// Run `op` on its own task and wait for it. Dropping the returned future
/// detaches the task instead of cancelling it.
async fn run_to_completion<T, F>(op: F) -> Result<T, RepositoryError>
where
    T: Send + 'static,
    F: Future<Output = Result<T, RepositoryError>> + Send + 'static,
{
    match tokio::spawn(op).await {
        Ok(result) => result,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => Err(RepositoryError::Cancelled(e)),
    }
}

impl<S: WorkoutStore> Shared<S> {
    async fn initialize_inner(&self) -> Result<(), RepositoryError> {
        let _gate = self.writes.lock().await;
        self.replace_state(LoadStatus::Loading, Vec::new()).await;

        match self.store.list_all(SortDirection::Descending).await {
            Ok(mut workouts) => {
                sort_newest_first(&mut workouts);
                for w in &workouts {
                    self.ids.observe(&w.id);
                }
                tracing::info!(count = workouts.len(), "Workouts loaded");
                self.replace_state(LoadStatus::Ready, workouts).await;
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to load workouts: {}", e);
                let status = LoadStatus::Failed {
                    reason: e.to_string(),
                };
                self.replace_state(status, Vec::new()).await;
                Err(e.into())
            }
        }
    }

    async fn create_inner(&self, draft: &WorkoutDraft) -> Result<WorkoutRecord, RepositoryError> {
        let _gate = self.writes.lock().await;
        self.ensure_ready().await?;

        let fields = draft
            .validate(self.policy, Utc::now())
            .map_err(|e| self.reject(MutationKind::Create, e))?;
        let record = fields.into_record(self.ids.next_id());
        self.store
            .insert(&record)
            .await
            .map_err(|e| self.reject(MutationKind::Create, e))?;

        let mut state = self.state.write().await;
        insert_newest_first(&mut state.workouts, record.clone());
        self.notify(&state);
        tracing::debug!(id = %record.id, "Workout created");
        Ok(record)
    }

    async fn update_inner(
        &self,
        id: &WorkoutId,
        draft: &WorkoutDraft,
    ) -> Result<WorkoutRecord, RepositoryError> {
        let _gate = self.writes.lock().await;
        self.ensure_ready().await?;

        let fields = draft
            .validate(self.policy, Utc::now())
            .map_err(|e| self.reject(MutationKind::Update, e))?;
        self.store
            .update(id, &fields)
            .await
            .map_err(|e| self.reject(MutationKind::Update, e))?;
        let record = fields.into_record(id.clone());

        let mut state = self.state.write().await;
        state.workouts.retain(|w| w.id != *id);
        insert_newest_first(&mut state.workouts, record.clone());
        self.notify(&state);
        tracing::debug!("Workout updated");
        Ok(record)
    }

    async fn delete_inner(&self, id: &WorkoutId) -> Result<(), RepositoryError> {
        let _gate = self.writes.lock().await;
        self.ensure_ready().await?;

        let existed = self
            .store
            .delete(id)
            .await
            .map_err(|e| self.reject(MutationKind::Delete, e))?;

        let mut state = self.state.write().await;
        let before = state.workouts.len();
        state.workouts.retain(|w| w.id != *id);
        if state.workouts.len() != before {
            self.notify(&state);
        }
        tracing::debug!(existed, "Workout deleted");
        Ok(())
    }

    async fn ensure_ready(&self) -> Result<(), RepositoryError> {
        let state = self.state.read().await;
        if state.status.is_ready() {
            Ok(())
        } else {
            Err(RepositoryError::NotReady(state.status.clone()))
        }
    }

    async fn replace_state(&self, status: LoadStatus, workouts: Vec<WorkoutRecord>) {
        let mut state = self.state.write().await;
        state.status = status;
        state.workouts = workouts;
        self.notify(&state);
    }

    /// Must be called while the state lock is held, after the cache change.
    fn notify(&self, state: &RepositoryState) {
        if self.event_tx.receiver_count() > 0 {
            let _ = self
                .event_tx
                .send(RepositoryEvent::StateChanged(state.snapshot()));
        }
    }

    fn reject(&self, operation: MutationKind, err: impl Into<RepositoryError>) -> RepositoryError {
        let err = err.into();
        tracing::warn!("Workout {} rejected: {}", operation, err);
        let _ = self.event_tx.send(RepositoryEvent::MutationFailed {
            operation,
            reason: err.to_string(),
        });
        err
    }
}

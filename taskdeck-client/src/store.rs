/// Cached task list with optimistic mutations
///
/// Every mutation goes through the same three steps:
///
/// 1. **Apply locally**: snapshot the collection and apply the predicted
///    result (a create gets a temporary negative id).
/// 2. **Send** the request through the [`TaskApi`].
/// 3. **Reconcile**: on success the prediction is replaced with the server
///    row; on failure the snapshot is restored and the error recorded.
///
/// The collection lock is only held for the synchronous steps, never across
/// the network call. Concurrent mutations are not serialized, so the last one
/// to reconcile wins.
///
/// # Example
///
/// ```no_run
/// use taskdeck_client::{HttpTaskApi, MutationPhase, TaskStore};
/// use taskdeck_shared::models::task::NewTask;
///
/// # async fn demo() {
/// let store = TaskStore::new(HttpTaskApi::new("http://localhost:8080", "token"), 1);
///
/// let outcome = store
///     .create(NewTask {
///         title: "Write spec".to_string(),
///         ..Default::default()
///     })
///     .await;
///
/// if outcome.phase() == MutationPhase::RolledBack {
///     eprintln!("create failed: {:?}", store.last_error().await);
/// }
/// # }
/// ```

use crate::api::{ClientError, TaskApi};
use chrono::{NaiveDate, Utc};
use taskdeck_shared::models::task::{NewTask, Task, TaskPatch, TaskPriority, TaskStats};
use tokio::sync::RwLock;

/// Lifecycle of a single mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationPhase {
    /// Nothing applied yet
    Idle,

    /// Local prediction applied, request in flight
    OptimisticApplied,

    /// Server confirmed; prediction replaced with the server row
    Reconciled,

    /// Server refused or was unreachable; snapshot restored
    RolledBack,
}

/// Result of a mutation plus the phases it went through
#[derive(Debug)]
pub struct MutationOutcome<T> {
    /// Phases in order, starting with `Idle`
    pub phases: Vec<MutationPhase>,

    pub result: Result<T, ClientError>,
}

impl<T> MutationOutcome<T> {
    /// Outcome of a mutation that was applied locally and then sent
    fn settled(result: Result<T, ClientError>) -> Self {
        let last = match result {
            Ok(_) => MutationPhase::Reconciled,
            Err(_) => MutationPhase::RolledBack,
        };

        Self {
            phases: vec![MutationPhase::Idle, MutationPhase::OptimisticApplied, last],
            result,
        }
    }

    /// Outcome of a mutation refused before anything was applied
    fn refused(error: ClientError) -> Self {
        Self {
            phases: vec![MutationPhase::Idle],
            result: Err(error),
        }
    }

    /// Final phase
    pub fn phase(&self) -> MutationPhase {
        self.phases.last().copied().unwrap_or(MutationPhase::Idle)
    }

    pub fn is_reconciled(&self) -> bool {
        self.phase() == MutationPhase::Reconciled
    }

    pub fn into_result(self) -> Result<T, ClientError> {
        self.result
    }
}

#[derive(Debug)]
struct StoreState {
    tasks: Vec<Task>,
    is_loading: bool,
    error: Option<ClientError>,
    next_temp_id: i32,
}

impl StoreState {
    fn temp_id(&mut self) -> i32 {
        let id = self.next_temp_id;
        self.next_temp_id -= 1;
        id
    }
}

/// Task cache for one user
pub struct TaskStore<A> {
    api: A,
    user_id: i32,
    state: RwLock<StoreState>,
}

impl<A: TaskApi> TaskStore<A> {
    pub fn new(api: A, user_id: i32) -> Self {
        Self {
            api,
            user_id,
            state: RwLock::new(StoreState {
                tasks: Vec::new(),
                is_loading: false,
                error: None,
                next_temp_id: -1,
            }),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Copy of the cached collection
    pub async fn tasks(&self) -> Vec<Task> {
        self.state.read().await.tasks.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.is_loading
    }

    /// Error recorded by the last failed operation, cleared by the next success
    pub async fn last_error(&self) -> Option<ClientError> {
        self.state.read().await.error.clone()
    }

    /// Replaces the collection with the server list
    pub async fn refresh(&self) -> Result<(), ClientError> {
        self.state.write().await.is_loading = true;

        let result = self.api.list().await;

        let mut state = self.state.write().await;
        state.is_loading = false;

        match result {
            Ok(tasks) => {
                tracing::debug!(user_id = self.user_id, count = tasks.len(), "Task list refreshed");
                state.tasks = tasks;
                state.error = None;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(user_id = self.user_id, error = %e, "Task list refresh failed");
                state.error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Creates a task, showing it immediately under a temporary negative id
    pub async fn create(&self, new_task: NewTask) -> MutationOutcome<Task> {
        let (snapshot, temp_id) = {
            let mut state = self.state.write().await;
            let snapshot = state.tasks.clone();
            let temp_id = state.temp_id();
            let predicted = self.predict(temp_id, &new_task);
            state.tasks.push(predicted);
            (snapshot, temp_id)
        };
        tracing::debug!(user_id = self.user_id, temp_id, "Optimistic create applied");

        match self.api.create(&new_task).await {
            Ok(task) => {
                let mut state = self.state.write().await;
                match state.tasks.iter_mut().find(|t| t.id == temp_id) {
                    Some(slot) => *slot = task.clone(),
                    None => state.tasks.push(task.clone()),
                }
                state.error = None;

                tracing::debug!(user_id = self.user_id, temp_id, task_id = task.id, "Create reconciled");
                MutationOutcome::settled(Ok(task))
            }
            Err(e) => {
                self.rollback(snapshot, &e, "create").await;
                MutationOutcome::settled(Err(e))
            }
        }
    }

    /// Patches the task in place, then replaces it with the server row
    pub async fn update(&self, id: i32, patch: TaskPatch) -> MutationOutcome<Task> {
        let snapshot = {
            let mut state = self.state.write().await;
            let snapshot = state.tasks.clone();
            let now = Utc::now();
            for task in state.tasks.iter_mut().filter(|t| t.id == id) {
                patch.apply_to(task);
                task.updated_at = now;
            }
            snapshot
        };
        tracing::debug!(user_id = self.user_id, task_id = id, "Optimistic update applied");

        match self.api.update(id, &patch).await {
            Ok(task) => {
                let mut state = self.state.write().await;
                for slot in state.tasks.iter_mut().filter(|t| t.id == task.id) {
                    *slot = task.clone();
                }
                state.error = None;

                tracing::debug!(user_id = self.user_id, task_id = id, "Update reconciled");
                MutationOutcome::settled(Ok(task))
            }
            Err(e) => {
                self.rollback(snapshot, &e, "update").await;
                MutationOutcome::settled(Err(e))
            }
        }
    }

    /// Removes the task immediately; restores it if the server refuses
    pub async fn delete(&self, id: i32) -> MutationOutcome<()> {
        let snapshot = {
            let mut state = self.state.write().await;
            let snapshot = state.tasks.clone();
            state.tasks.retain(|t| t.id != id);
            snapshot
        };
        tracing::debug!(user_id = self.user_id, task_id = id, "Optimistic delete applied");

        match self.api.delete(id).await {
            Ok(()) => {
                self.state.write().await.error = None;
                tracing::debug!(user_id = self.user_id, task_id = id, "Delete reconciled");
                MutationOutcome::settled(Ok(()))
            }
            Err(e) => {
                self.rollback(snapshot, &e, "delete").await;
                MutationOutcome::settled(Err(e))
            }
        }
    }

    /// Flips the favorite flag of a cached task
    ///
    /// A task missing from the cache fails with `NotFound` without a request;
    /// the error is still recorded for [`TaskStore::last_error`].
    pub async fn toggle_favorite(&self, id: i32) -> MutationOutcome<Task> {
        let current = self
            .state
            .read()
            .await
            .tasks
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.favorite);

        match current {
            Some(favorite) => {
                self.update(
                    id,
                    TaskPatch {
                        favorite: Some(!favorite),
                        ..Default::default()
                    },
                )
                .await
            }
            None => {
                let error = ClientError::NotFound("Task not found".to_string());
                self.state.write().await.error = Some(error.clone());
                tracing::debug!(user_id = self.user_id, task_id = id, "Favorite toggle on uncached task");
                MutationOutcome::refused(error)
            }
        }
    }

    /// Counters over the cached collection
    pub async fn stats(&self) -> TaskStats {
        TaskStats::from_tasks(&self.state.read().await.tasks)
    }

    /// Cached tasks due on `date`, optionally of one priority, earliest first
    pub async fn due_on(&self, date: NaiveDate, priority: Option<TaskPriority>) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .state
            .read()
            .await
            .tasks
            .iter()
            .filter(|t| t.is_due_on(date))
            .filter(|t| priority.map_or(true, |p| t.priority == p))
            .cloned()
            .collect();

        tasks.sort_by(|a, b| a.due_date.cmp(&b.due_date).then(a.id.cmp(&b.id)));
        tasks
    }

    /// Cached tasks, newest first
    pub async fn recent(&self) -> Vec<Task> {
        let mut tasks = self.tasks().await;
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        tasks
    }

    fn predict(&self, temp_id: i32, new_task: &NewTask) -> Task {
        let defaults = new_task.with_defaults();
        let now = Utc::now();

        Task {
            id: temp_id,
            title: defaults.title,
            description: defaults.description,
            status: defaults.status.unwrap_or_default(),
            priority: defaults.priority.unwrap_or_default(),
            due_date: defaults.due_date,
            user_id: self.user_id,
            project_id: defaults.project_id,
            category_id: defaults.category_id,
            favorite: defaults.favorite.unwrap_or(false),
            created_at: now,
            updated_at: now,
        }
    }

    async fn rollback(&self, snapshot: Vec<Task>, error: &ClientError, operation: &'static str) {
        let mut state = self.state.write().await;
        state.tasks = snapshot;
        state.error = Some(error.clone());

        tracing::warn!(user_id = self.user_id, operation, error = %error, "Mutation rolled back");
    }
}

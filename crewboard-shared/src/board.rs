/// Optimistic client board state
///
/// The task board applies a mutation locally before the server round
/// trip completes, then reconciles: the server's row replaces the
/// optimistic one on success, and the pre-mutation snapshot is restored
/// wholesale on failure. This is a compensating-action pattern; there is
/// no partial-field revert and no merge.
///
/// State is an owned value passed explicitly to whatever drives it;
/// there are no process-wide singletons.
///
/// # Protocol
///
/// 1. [`BoardState::stage`] snapshots the task and applies the patch in
///    place, returning a [`StagedUpdate`] holding the snapshot.
/// 2. On a 2xx response, [`BoardState::commit`] stores the server's
///    authoritative row.
/// 3. On any failure, [`BoardState::rollback`] restores the snapshot
///    exactly as it was.
///
/// # Example
///
/// ```
/// use crewboard_shared::board::BoardState;
/// use crewboard_shared::models::task::{TaskStatus, UpdateTask};
/// # use crewboard_shared::models::task::{Task, TaskPriority};
/// # use chrono::Utc;
/// # use uuid::Uuid;
///
/// # let task = Task {
/// #     id: Uuid::new_v4(),
/// #     title: "Ship it".to_string(),
/// #     description: None,
/// #     status: TaskStatus::Todo,
/// #     priority: TaskPriority::Medium,
/// #     assigned_to: None,
/// #     team_id: Uuid::new_v4(),
/// #     created_by: Uuid::new_v4(),
/// #     due_date: None,
/// #     created_at: Utc::now(),
/// #     updated_at: Utc::now(),
/// # };
/// # let task_id = task.id;
/// let mut board = BoardState::new();
/// board.insert(task);
///
/// // Drag the card to "done" before the server answers
/// let staged = board
///     .stage(task_id, &UpdateTask { status: Some(TaskStatus::Done), ..Default::default() })
///     .unwrap();
/// assert_eq!(board.get(task_id).unwrap().status, TaskStatus::Done);
///
/// // Server rejected the mutation: restore the snapshot
/// board.rollback(staged);
/// assert_eq!(board.get(task_id).unwrap().status, TaskStatus::Todo);
/// ```

use std::collections::HashMap;
use uuid::Uuid;

use crate::models::task::{Task, UpdateTask};

/// Cached task rows keyed by id
#[derive(Debug, Clone, Default)]
pub struct BoardState {
    tasks: HashMap<Uuid, Task>,
}

/// Handle for an in-flight optimistic update
///
/// Holds the wholesale pre-mutation snapshot. Consumed by either
/// [`BoardState::commit`] or [`BoardState::rollback`], so an update
/// cannot be both confirmed and reverted.
#[derive(Debug, Clone)]
pub struct StagedUpdate {
    snapshot: Task,
}

impl StagedUpdate {
    /// Id of the task this update touches
    pub fn task_id(&self) -> Uuid {
        self.snapshot.id
    }

    /// The pre-mutation row
    pub fn snapshot(&self) -> &Task {
        &self.snapshot
    }
}

impl BoardState {
    /// Creates an empty board
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the cached rows with a fresh server listing
    pub fn load(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks.into_iter().map(|t| (t.id, t)).collect();
    }

    /// Inserts or replaces a single row
    pub fn insert(&mut self, task: Task) {
        self.tasks.insert(task.id, task);
    }

    /// Removes a row (e.g. after a confirmed deletion)
    pub fn remove(&mut self, task_id: Uuid) -> Option<Task> {
        self.tasks.remove(&task_id)
    }

    /// Looks up a cached row
    pub fn get(&self, task_id: Uuid) -> Option<&Task> {
        self.tasks.get(&task_id)
    }

    /// Number of cached rows
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the board has no cached rows
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Stages an optimistic update
    ///
    /// Snapshots the current row, applies the patch in place, and
    /// returns the snapshot handle. Returns None if the task is not in
    /// the cache.
    pub fn stage(&mut self, task_id: Uuid, patch: &UpdateTask) -> Option<StagedUpdate> {
        let task = self.tasks.get_mut(&task_id)?;
        let snapshot = task.clone();

        if let Some(title) = &patch.title {
            task.title = title.clone();
        }
        if let Some(description) = &patch.description {
            task.description = Some(description.clone());
        }
        if let Some(status) = patch.status {
            task.status = status;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(assigned_to) = patch.assigned_to {
            task.assigned_to = assigned_to;
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = due_date;
        }

        Some(StagedUpdate { snapshot })
    }

    /// Confirms a staged update with the server's authoritative row
    pub fn commit(&mut self, staged: StagedUpdate, server_task: Task) {
        debug_assert_eq!(staged.task_id(), server_task.id);
        self.tasks.insert(server_task.id, server_task);
    }

    /// Reverts a staged update, restoring the exact pre-mutation row
    pub fn rollback(&mut self, staged: StagedUpdate) {
        self.tasks.insert(staged.snapshot.id, staged.snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::{TaskPriority, TaskStatus};
    use chrono::Utc;

    fn sample_task() -> Task {
        Task {
            id: Uuid::new_v4(),
            title: "Fix login redirect".to_string(),
            description: Some("Redirect loops on expired session".to_string()),
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            assigned_to: None,
            team_id: Uuid::new_v4(),
            created_by: Uuid::new_v4(),
            due_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_stage_applies_patch_immediately() {
        let task = sample_task();
        let task_id = task.id;
        let mut board = BoardState::new();
        board.insert(task);

        let staged = board
            .stage(
                task_id,
                &UpdateTask {
                    status: Some(TaskStatus::Done),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(board.get(task_id).unwrap().status, TaskStatus::Done);
        assert_eq!(staged.snapshot().status, TaskStatus::Todo);
    }

    #[test]
    fn test_rollback_restores_exact_snapshot() {
        let task = sample_task();
        let task_id = task.id;
        let original = task.clone();
        let mut board = BoardState::new();
        board.insert(task);

        // Optimistically change several fields at once
        let assignee = Uuid::new_v4();
        let staged = board
            .stage(
                task_id,
                &UpdateTask {
                    title: Some("Renamed".to_string()),
                    status: Some(TaskStatus::Done),
                    priority: Some(TaskPriority::High),
                    assigned_to: Some(Some(assignee)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(board.get(task_id).unwrap().assigned_to, Some(assignee));

        // Server rejected the mutation: the whole row comes back, not a
        // field-by-field merge
        board.rollback(staged);
        assert_eq!(board.get(task_id).unwrap(), &original);
    }

    #[test]
    fn test_commit_stores_server_row() {
        let task = sample_task();
        let task_id = task.id;
        let mut board = BoardState::new();
        board.insert(task.clone());

        let staged = board
            .stage(
                task_id,
                &UpdateTask {
                    status: Some(TaskStatus::InProgress),
                    ..Default::default()
                },
            )
            .unwrap();

        // Server's row carries its own updated_at
        let mut server_task = task;
        server_task.status = TaskStatus::InProgress;
        server_task.updated_at = Utc::now();

        board.commit(staged, server_task.clone());
        assert_eq!(board.get(task_id).unwrap(), &server_task);
    }

    #[test]
    fn test_stage_unknown_task_is_none() {
        let mut board = BoardState::new();
        assert!(board.stage(Uuid::new_v4(), &UpdateTask::default()).is_none());
    }

    #[test]
    fn test_stage_with_null_clears_assignment() {
        let mut task = sample_task();
        task.assigned_to = Some(Uuid::new_v4());
        let task_id = task.id;
        let mut board = BoardState::new();
        board.insert(task);

        let staged = board
            .stage(
                task_id,
                &UpdateTask {
                    assigned_to: Some(None),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(board.get(task_id).unwrap().assigned_to, None);
        assert!(staged.snapshot().assigned_to.is_some());
    }

    #[test]
    fn test_load_replaces_cache() {
        let mut board = BoardState::new();
        board.insert(sample_task());

        let fresh = vec![sample_task(), sample_task()];
        board.load(fresh);
        assert_eq!(board.len(), 2);
    }
}

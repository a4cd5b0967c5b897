//! In-memory board state with ordering invariants.
//!
//! DESIGN
//! ======
//! Columns hold tasks sorted ascending by `order_idx` (stable, so equal keys
//! keep insertion order). Every mutation replaces whole records; snapshots
//! are owned clones, so a snapshot taken before a change is never affected
//! by it.
//!
//! Each mutation stamps the touched region with a fresh value of a global
//! revision counter. The mutation controller compares a region's stamp before
//! and after its remote call to detect that some other change landed on the
//! same region in the meantime.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::model::{Column, ColumnId, Comment, CommentId, Task, TaskId};
use crate::error::BoardError;

/// The single store instance shared by the controller and readers.
pub type SharedBoard = Arc<Mutex<BoardStateStore>>;

/// Portion of the store an operation touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Region {
    /// One or more columns, including all of their tasks.
    Columns(Vec<ColumnId>),
    /// The comment thread of one task.
    Comments(TaskId),
}

/// Owned copy of a region, sufficient to restore it exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSnapshot {
    columns: Vec<Column>,
    thread: Option<(TaskId, Option<Vec<Comment>>)>,
}

#[derive(Debug, Clone, Default)]
pub struct BoardStateStore {
    columns: Vec<Column>,
    comments: HashMap<TaskId, Vec<Comment>>,
    revision: u64,
    stamps: HashMap<String, u64>,
}

impl BoardStateStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn shared(self) -> SharedBoard {
        Arc::new(Mutex::new(self))
    }

    // =========================================================================
    // READS
    // =========================================================================

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[must_use]
    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == column_id)
    }

    /// Locate a task and the column holding it.
    #[must_use]
    pub fn find_task(&self, task_id: &str) -> Option<(&Column, &Task)> {
        self.columns
            .iter()
            .find_map(|c| c.tasks.iter().find(|t| t.id == task_id).map(|t| (c, t)))
    }

    #[must_use]
    pub fn comments(&self, task_id: &str) -> &[Comment] {
        self.comments.get(task_id).map_or(&[], Vec::as_slice)
    }

    /// Global mutation counter.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Latest revision stamped on any part of `region`.
    #[must_use]
    pub fn region_revision(&self, region: &Region) -> u64 {
        match region {
            Region::Columns(ids) => ids
                .iter()
                .filter_map(|id| self.stamps.get(&column_key(id)))
                .copied()
                .max()
                .unwrap_or(0),
            Region::Comments(task_id) => self.stamps.get(&thread_key(task_id)).copied().unwrap_or(0),
        }
    }

    /// Every column sorted by `order_idx` with no duplicate keys.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.columns.iter().all(|column| {
            column
                .tasks
                .windows(2)
                .all(|pair| pair[0].order_idx < pair[1].order_idx)
        })
    }

    // =========================================================================
    // COLUMN / TASK MUTATIONS
    // =========================================================================

    /// Replace the whole board. Columns are ordered by their own `order_idx`
    /// and each column's tasks are re-sorted.
    pub fn load(&mut self, mut columns: Vec<Column>) {
        columns.sort_by_key(|c| c.order_idx);
        for column in &mut columns {
            column.tasks.sort_by_key(|t| t.order_idx);
        }
        let keys: Vec<String> = columns.iter().map(|c| column_key(&c.id)).collect();
        self.columns = columns;
        for key in keys {
            self.stamp(key);
        }
    }

    /// Insert or replace `task` in `column_id`. A task with the same id held
    /// by another column is removed from it first.
    ///
    /// # Errors
    ///
    /// Returns an error if the column is unknown.
    pub fn upsert_task(&mut self, column_id: &str, task: Task) -> Result<(), BoardError> {
        let target = self.column_index(column_id)?;
        let mut touched = vec![column_id.to_owned()];
        for (idx, column) in self.columns.iter_mut().enumerate() {
            if idx != target && column.tasks.iter().any(|t| t.id == task.id) {
                column.tasks.retain(|t| t.id != task.id);
                touched.push(column.id.clone());
            }
        }

        let tasks = &mut self.columns[target].tasks;
        match tasks.iter().position(|t| t.id == task.id) {
            Some(pos) => tasks[pos] = task,
            None => tasks.push(task),
        }
        sort_tasks(tasks);
        for id in touched {
            self.stamp(column_key(&id));
        }
        Ok(())
    }

    /// Replace the task `old_id` (typically a placeholder) with `task`,
    /// keeping it in the same column.
    ///
    /// # Errors
    ///
    /// Returns an error if the column or the old task is unknown.
    pub fn replace_task(&mut self, column_id: &str, old_id: &str, task: Task) -> Result<(), BoardError> {
        let target = self.column_index(column_id)?;
        let tasks = &mut self.columns[target].tasks;
        let pos = tasks
            .iter()
            .position(|t| t.id == old_id)
            .ok_or_else(|| BoardError::UnknownTask(old_id.to_owned()))?;
        tasks.remove(pos);
        self.upsert_task(column_id, task)
    }

    /// Remove a task from a column, returning it.
    ///
    /// # Errors
    ///
    /// Returns an error if the column or task is unknown.
    pub fn remove_task(&mut self, column_id: &str, task_id: &str) -> Result<Task, BoardError> {
        let target = self.column_index(column_id)?;
        let tasks = &mut self.columns[target].tasks;
        let pos = tasks
            .iter()
            .position(|t| t.id == task_id)
            .ok_or_else(|| BoardError::UnknownTask(task_id.to_owned()))?;
        let task = tasks.remove(pos);
        self.stamp(column_key(column_id));
        Ok(task)
    }

    /// Move a task between (or within) columns.
    ///
    /// The moved task takes the target column's length as its `order_idx`
    /// (append semantics), bumped past the current maximum if that value is
    /// already taken. It is inserted at `new_index` (clamped) and the column
    /// is re-sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if either column or the task is unknown.
    pub fn move_task(&mut self, task_id: &str, from_column_id: &str, to_column_id: &str, new_index: usize) -> Result<(), BoardError> {
        let from = self.column_index(from_column_id)?;
        let to = self.column_index(to_column_id)?;
        let pos = self.columns[from]
            .tasks
            .iter()
            .position(|t| t.id == task_id)
            .ok_or_else(|| BoardError::UnknownTask(task_id.to_owned()))?;

        let mut task = self.columns[from].tasks.remove(pos);
        let target = &mut self.columns[to].tasks;
        task.order_idx = next_order_idx(target);
        let index = new_index.min(target.len());
        target.insert(index, task);
        sort_tasks(target);

        self.stamp(column_key(from_column_id));
        self.stamp(column_key(to_column_id));
        Ok(())
    }

    /// Re-sort a column's tasks by `order_idx`.
    ///
    /// # Errors
    ///
    /// Returns an error if the column is unknown.
    pub fn reorder(&mut self, column_id: &str) -> Result<(), BoardError> {
        let target = self.column_index(column_id)?;
        sort_tasks(&mut self.columns[target].tasks);
        self.stamp(column_key(column_id));
        Ok(())
    }

    /// Replace a column's tasks with a server copy.
    ///
    /// # Errors
    ///
    /// Returns an error if the column is unknown.
    pub fn replace_column_tasks(&mut self, column_id: &str, mut tasks: Vec<Task>) -> Result<(), BoardError> {
        let target = self.column_index(column_id)?;
        sort_tasks(&mut tasks);
        self.columns[target].tasks = tasks;
        self.stamp(column_key(column_id));
        Ok(())
    }

    /// The `order_idx` a task appended to `column_id` would receive.
    ///
    /// # Errors
    ///
    /// Returns an error if the column is unknown.
    pub fn next_order_idx(&self, column_id: &str) -> Result<i64, BoardError> {
        let target = self.column_index(column_id)?;
        Ok(next_order_idx(&self.columns[target].tasks))
    }

    // =========================================================================
    // COMMENT MUTATIONS
    // =========================================================================

    pub fn load_comments(&mut self, task_id: &str, comments: Vec<Comment>) {
        self.comments.insert(task_id.to_owned(), comments);
        self.stamp(thread_key(task_id));
    }

    /// Insert or replace a comment in its task's thread (appending new ones).
    pub fn upsert_comment(&mut self, task_id: &str, comment: Comment) {
        let thread = self.comments.entry(task_id.to_owned()).or_default();
        match thread.iter().position(|c| c.id == comment.id) {
            Some(pos) => thread[pos] = comment,
            None => thread.push(comment),
        }
        self.stamp(thread_key(task_id));
    }

    /// Replace comment `old_id` in place, keeping its position.
    ///
    /// # Errors
    ///
    /// Returns an error if the comment is unknown.
    pub fn replace_comment(&mut self, task_id: &str, old_id: &str, comment: Comment) -> Result<(), BoardError> {
        let slot = self
            .comments
            .get_mut(task_id)
            .and_then(|thread| thread.iter_mut().find(|c| c.id == old_id))
            .ok_or_else(|| BoardError::UnknownComment(old_id.to_owned()))?;
        *slot = comment;
        self.stamp(thread_key(task_id));
        Ok(())
    }

    /// Remove a comment, returning it.
    ///
    /// # Errors
    ///
    /// Returns an error if the comment is unknown.
    pub fn remove_comment(&mut self, task_id: &str, comment_id: &CommentId) -> Result<Comment, BoardError> {
        let thread = self
            .comments
            .get_mut(task_id)
            .ok_or_else(|| BoardError::UnknownComment(comment_id.clone()))?;
        let pos = thread
            .iter()
            .position(|c| &c.id == comment_id)
            .ok_or_else(|| BoardError::UnknownComment(comment_id.clone()))?;
        let comment = thread.remove(pos);
        self.stamp(thread_key(task_id));
        Ok(comment)
    }

    // =========================================================================
    // SNAPSHOT / RESTORE
    // =========================================================================

    /// Capture an owned copy of `region`.
    #[must_use]
    pub fn snapshot(&self, region: &Region) -> RegionSnapshot {
        match region {
            Region::Columns(ids) => RegionSnapshot {
                columns: self
                    .columns
                    .iter()
                    .filter(|c| ids.contains(&c.id))
                    .cloned()
                    .collect(),
                thread: None,
            },
            Region::Comments(task_id) => RegionSnapshot {
                columns: Vec::new(),
                thread: Some((task_id.clone(), self.comments.get(task_id).cloned())),
            },
        }
    }

    /// Put a region back exactly as captured. Columns no longer present are
    /// skipped.
    pub fn restore(&mut self, snapshot: RegionSnapshot) {
        for saved in snapshot.columns {
            let key = column_key(&saved.id);
            if let Some(slot) = self.columns.iter_mut().find(|c| c.id == saved.id) {
                *slot = saved;
                self.stamp(key);
            }
        }
        if let Some((task_id, thread)) = snapshot.thread {
            match thread {
                Some(comments) => {
                    self.comments.insert(task_id.clone(), comments);
                }
                None => {
                    self.comments.remove(&task_id);
                }
            }
            self.stamp(thread_key(&task_id));
        }
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn column_index(&self, column_id: &str) -> Result<usize, BoardError> {
        self.columns
            .iter()
            .position(|c| c.id == column_id)
            .ok_or_else(|| BoardError::UnknownColumn(column_id.to_owned()))
    }

    fn stamp(&mut self, key: String) {
        self.revision += 1;
        self.stamps.insert(key, self.revision);
    }
}

fn column_key(column_id: &str) -> String {
    format!("column:{column_id}")
}

fn thread_key(task_id: &str) -> String {
    format!("comments:{task_id}")
}

fn sort_tasks(tasks: &mut [Task]) {
    tasks.sort_by_key(|t| t.order_idx);
}

fn next_order_idx(tasks: &[Task]) -> i64 {
    let appended = i64::try_from(tasks.len()).unwrap_or(i64::MAX);
    if tasks.iter().any(|t| t.order_idx == appended) {
        tasks.iter().map(|t| t.order_idx).max().map_or(appended, |max| max.saturating_add(1))
    } else {
        appended
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;

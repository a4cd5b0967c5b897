//! Local board projection: columns of ordered tasks plus per-task comment
//! threads, mutated only through [`BoardStateStore`].

pub mod model;
pub mod store;

pub use model::{Column, ColumnId, Comment, CommentId, Task, TaskId};
pub use store::{BoardStateStore, Region, RegionSnapshot, SharedBoard};

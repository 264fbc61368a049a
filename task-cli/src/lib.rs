//! Local task tracking backed by a single JSON document.
//!
//! [`TaskStore`] holds the ordered collection, hands out ids and rewrites the
//! whole document through [`codec`] after every change.
pub mod codec;
pub mod config;
pub mod error;
pub mod store;
pub mod task;

pub use error::{Result, TaskError};
pub use store::{Clock, FileStorage, Listing, MemoryStorage, Storage, SystemClock, TaskStore};
pub use task::{Filter, Status, Task, TaskId};

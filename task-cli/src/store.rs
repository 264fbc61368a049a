use crate::codec::{ParseProblem, parse_document, render_document};
use crate::error::{Result, TaskError};
use crate::task::{Filter, Status, Task, TaskId};
use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Timestamp layout used for `createdAt` and `updatedAt`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Backing text of the task document.
#[cfg_attr(test, mockall::automock)]
pub trait Storage {
    /// Returns the stored document, or `None` when nothing has been stored yet.
    fn read(&self) -> io::Result<Option<String>>;
    /// Replaces the stored document.
    fn write(&mut self, document: &str) -> io::Result<()>;
}

/// Stores the document in a file on disk.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        temp.into()
    }
}

impl Storage for FileStorage {
    // Invalid UTF-8 is replaced rather than rejected; the affected records
    // are then judged by the reader like any other malformed input.
    fn read(&self) -> io::Result<Option<String>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        match String::from_utf8(bytes) {
            Ok(text) => Ok(Some(text)),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    "task file is not valid UTF-8, invalid bytes replaced"
                );
                Ok(Some(String::from_utf8_lossy(e.as_bytes()).into_owned()))
            }
        }
    }

    // The document is written beside the target and renamed over it, so a
    // failed write leaves the previous document intact.
    fn write(&mut self, document: &str) -> io::Result<()> {
        let temp = self.temp_path();
        let result = fs::write(&temp, document).and_then(|_| fs::rename(&temp, &self.path));
        if result.is_err() {
            let _ = fs::remove_file(&temp);
        }
        result
    }
}

/// Keeps the document in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    document: Option<String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(document: impl Into<String>) -> Self {
        Self {
            document: Some(document.into()),
        }
    }

    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }
}

impl Storage for MemoryStorage {
    fn read(&self) -> io::Result<Option<String>> {
        Ok(self.document.clone())
    }

    fn write(&mut self, document: &str) -> io::Result<()> {
        self.document = Some(document.to_string());
        Ok(())
    }
}

/// Source of timestamps for created and updated tasks.
pub trait Clock {
    fn now(&self) -> String;
}

/// Local wall-clock time formatted with [`TIMESTAMP_FORMAT`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> String {
        chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
    }
}

impl<F: Fn() -> String> Clock for F {
    fn now(&self) -> String {
        self()
    }
}

/// Ordered, in-memory task collection persisted in full after every change.
///
/// A mutation either succeeds and is written, or fails and leaves both the
/// collection and the stored document untouched.
pub struct TaskStore<S: Storage, C: Clock> {
    storage: S,
    clock: C,
    tasks: Vec<Task>,
    problems: Vec<ParseProblem>,
    last_id: TaskId,
}

impl<S: Storage, C: Clock> TaskStore<S, C> {
    /// Loads the collection from `storage`. Missing storage means no tasks.
    pub fn open(storage: S, clock: C) -> Result<Self> {
        let (tasks, problems) = match storage.read()? {
            Some(text) => {
                let parsed = parse_document(&text);
                (parsed.tasks, parsed.problems)
            }
            None => {
                debug!("no task document yet, starting empty");
                (Vec::new(), Vec::new())
            }
        };
        if !problems.is_empty() {
            warn!(
                loaded = tasks.len(),
                skipped = problems.len(),
                "task document loaded with problems"
            );
        }
        let last_id = tasks.iter().map(Task::id).max().unwrap_or(0);
        debug!(count = tasks.len(), "tasks loaded");
        Ok(Self {
            storage,
            clock,
            tasks,
            problems,
            last_id,
        })
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id() == id)
    }

    /// Problems found in the stored document when it was loaded.
    pub fn problems(&self) -> &[ParseProblem] {
        &self.problems
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// The id the next added task will receive. Ids are never handed out
    /// twice by the same store, even after the highest one is deleted.
    pub fn allocate_id(&self) -> Result<TaskId> {
        self.last_id.checked_add(1).ok_or(TaskError::IdOverflow)
    }

    pub fn add(&mut self, description: &str) -> Result<TaskId> {
        if description.is_empty() {
            return Err(TaskError::EmptyDescription);
        }
        let id = self.allocate_id()?;
        let task = Task::new(id, description.to_string(), self.clock.now());
        self.commit(|tasks| tasks.push(task))?;
        self.last_id = id;
        info!(id, "task added");
        Ok(id)
    }

    pub fn update(&mut self, id: TaskId, description: &str) -> Result<()> {
        if description.is_empty() {
            return Err(TaskError::EmptyDescription);
        }
        let index = self.position(id)?;
        let now = self.clock.now();
        self.commit(|tasks| tasks[index].set_description(description.to_string(), now))?;
        info!(id, "task updated");
        Ok(())
    }

    /// Removes a task, keeping the order of the rest.
    pub fn delete(&mut self, id: TaskId) -> Result<Task> {
        let index = self.position(id)?;
        let removed = self.tasks[index].clone();
        self.commit(|tasks| {
            tasks.remove(index);
        })?;
        info!(id, "task deleted");
        Ok(removed)
    }

    /// Sets the status and refreshes `updatedAt`, even when the status is unchanged.
    pub fn set_status(&mut self, id: TaskId, status: Status) -> Result<()> {
        let index = self.position(id)?;
        let now = self.clock.now();
        self.commit(|tasks| tasks[index].set_status(status, now))?;
        info!(id, %status, "task status set");
        Ok(())
    }

    pub fn list(&self, filter: Filter) -> Listing<'_> {
        Listing {
            filter,
            tasks: self.tasks.iter().filter(|task| filter.matches(task)).collect(),
        }
    }

    fn position(&self, id: TaskId) -> Result<usize> {
        self.tasks
            .iter()
            .position(|task| task.id() == id)
            .ok_or(TaskError::NotFound(id))
    }

    fn commit(&mut self, change: impl FnOnce(&mut Vec<Task>)) -> Result<()> {
        let mut tasks = self.tasks.clone();
        change(&mut tasks);
        self.storage.write(&render_document(&tasks))?;
        debug!(count = tasks.len(), "task document written");
        self.tasks = tasks;
        Ok(())
    }
}

/// Tasks selected by a [`Filter`], in collection order.
#[derive(Debug)]
pub struct Listing<'a> {
    filter: Filter,
    tasks: Vec<&'a Task>,
}

impl<'a> Listing<'a> {
    pub fn tasks(&self) -> &[&'a Task] {
        &self.tasks
    }

    pub fn ids(&self) -> Vec<TaskId> {
        self.tasks.iter().map(|task| task.id()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

const SEPARATOR: &str = "-------------";

impl Display for Listing<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.filter {
            Filter::All => writeln!(f, "--- Tasks ---")?,
            Filter::Status(status) => writeln!(f, "--- Tasks (Status: {status}) ---")?,
        }
        if self.tasks.is_empty() {
            match self.filter {
                Filter::All => writeln!(f, "No tasks found.")?,
                Filter::Status(status) => writeln!(f, "No tasks found with status '{status}'.")?,
            }
            return write!(f, "{SEPARATOR}");
        }
        for (i, task) in self.tasks.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "{task}")?;
            write!(f, "{SEPARATOR}")?;
        }
        Ok(())
    }
}

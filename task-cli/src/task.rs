use crate::error::TaskError;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub type TaskId = u32;

/// A single tracked task. Every value of this type holds a positive id, a
/// non-empty description and non-empty timestamps.
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct Task {
    id: TaskId,
    description: String,
    status: Status,
    created_at: String,
    updated_at: String,
}

#[derive(Debug, Default, Eq, PartialEq, Clone, Copy, Hash)]
pub enum Status {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Todo, Status::InProgress, Status::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::InProgress => "in-progress",
            Status::Done => "done",
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| TaskError::InvalidStatus(s.to_string()))
    }
}

/// Selection key used when listing tasks.
#[derive(Debug, Default, Eq, PartialEq, Clone, Copy)]
pub enum Filter {
    #[default]
    All,
    Status(Status),
}

impl Filter {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Filter::All => true,
            Filter::Status(status) => task.status == *status,
        }
    }
}

impl Display for Filter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Filter::All => f.write_str("all"),
            Filter::Status(status) => status.fmt(f),
        }
    }
}

impl FromStr for Filter {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(Filter::All);
        }
        s.parse()
            .map(Filter::Status)
            .map_err(|_| TaskError::InvalidFilter(s.to_string()))
    }
}

/// The five persisted fields of a task.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum Field {
    Id,
    Description,
    Status,
    CreatedAt,
    UpdatedAt,
}

impl Field {
    /// Key used for the field in the task document.
    pub fn key(&self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Description => "description",
            Field::Status => "status",
            Field::CreatedAt => "createdAt",
            Field::UpdatedAt => "updatedAt",
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Field text extracted from a stored record, not yet validated.
#[derive(Debug, Default, Clone)]
pub struct RawTask {
    pub id: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Describes the first field of a [`RawTask`] that failed validation.
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct FieldError {
    /// The record's id, when it was readable.
    pub id: Option<TaskId>,
    pub field: Field,
}

impl Task {
    /// Creates a fresh `todo` task whose timestamps are both `now`.
    pub fn new(id: TaskId, description: String, now: String) -> Self {
        Self {
            id,
            description,
            status: Status::Todo,
            updated_at: now.clone(),
            created_at: now,
        }
    }

    /// Assembles a task from stored field text, checking all five fields at once.
    pub fn from_fields(raw: RawTask) -> Result<Self, FieldError> {
        let id = raw
            .id
            .as_deref()
            .and_then(|id| id.parse::<TaskId>().ok())
            .filter(|id| *id > 0)
            .ok_or(FieldError {
                id: None,
                field: Field::Id,
            })?;
        let invalid = |field| FieldError {
            id: Some(id),
            field,
        };

        let description = raw
            .description
            .filter(|d| !d.is_empty())
            .ok_or_else(|| invalid(Field::Description))?;
        let status = raw
            .status
            .as_deref()
            .and_then(|s| s.parse::<Status>().ok())
            .ok_or_else(|| invalid(Field::Status))?;
        let created_at = raw
            .created_at
            .filter(|t| !t.is_empty())
            .ok_or_else(|| invalid(Field::CreatedAt))?;
        let updated_at = raw
            .updated_at
            .filter(|t| !t.is_empty())
            .ok_or_else(|| invalid(Field::UpdatedAt))?;

        Ok(Self {
            id,
            description,
            status,
            created_at,
            updated_at,
        })
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    pub fn updated_at(&self) -> &str {
        &self.updated_at
    }

    pub(crate) fn set_description(&mut self, description: String, now: String) {
        self.description = description;
        self.updated_at = now;
    }

    pub(crate) fn set_status(&mut self, status: Status, now: String) {
        self.status = status;
        self.updated_at = now;
    }
}

impl Display for Task {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "ID: {}", self.id)?;
        writeln!(f, "  Description: {}", self.description)?;
        writeln!(f, "  Status: {}", self.status)?;
        writeln!(f, "  Created: {}", self.created_at)?;
        write!(f, "  Updated: {}", self.updated_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: &str, description: &str, status: &str) -> RawTask {
        RawTask {
            id: Some(id.to_string()),
            description: Some(description.to_string()),
            status: Some(status.to_string()),
            created_at: Some("2025-01-01 10:00:00".to_string()),
            updated_at: Some("2025-01-01 10:00:00".to_string()),
        }
    }

    #[test]
    fn new_task_starts_as_todo_with_equal_timestamps() {
        let task = Task::new(1, "Test task".to_string(), "2025-01-01 10:00:00".to_string());

        assert_eq!(task.id(), 1);
        assert_eq!(task.description(), "Test task");
        assert_eq!(task.status(), Status::Todo);
        assert_eq!(task.created_at(), task.updated_at());
    }

    #[test]
    fn status_parses_only_known_values() {
        assert_eq!("todo".parse::<Status>().unwrap(), Status::Todo);
        assert_eq!("in-progress".parse::<Status>().unwrap(), Status::InProgress);
        assert_eq!("done".parse::<Status>().unwrap(), Status::Done);
        assert!(matches!(
            "Done".parse::<Status>(),
            Err(TaskError::InvalidStatus(s)) if s == "Done"
        ));
        assert!("in_progress".parse::<Status>().is_err());
    }

    #[test]
    fn status_display_matches_stored_form() {
        for status in Status::ALL {
            assert_eq!(status.to_string().parse::<Status>().unwrap(), status);
        }
    }

    #[test]
    fn filter_parses_all_and_statuses() {
        assert_eq!("all".parse::<Filter>().unwrap(), Filter::All);
        assert_eq!(
            "done".parse::<Filter>().unwrap(),
            Filter::Status(Status::Done)
        );
        assert!(matches!(
            "everything".parse::<Filter>(),
            Err(TaskError::InvalidFilter(_))
        ));
    }

    #[test]
    fn filter_matches_by_status() {
        let task = Task::new(1, "Task".to_string(), "now".to_string());

        assert!(Filter::All.matches(&task));
        assert!(Filter::Status(Status::Todo).matches(&task));
        assert!(!Filter::Status(Status::Done).matches(&task));
    }

    #[test]
    fn from_fields_accepts_complete_record() {
        let task = Task::from_fields(raw("7", "Read book", "in-progress")).unwrap();

        assert_eq!(task.id(), 7);
        assert_eq!(task.description(), "Read book");
        assert_eq!(task.status(), Status::InProgress);
    }

    #[test]
    fn from_fields_rejects_bad_id() {
        for id in ["", "-3", "0", "abc", "99999999999"] {
            let err = Task::from_fields(raw(id, "Task", "todo")).unwrap_err();
            assert_eq!(
                err,
                FieldError {
                    id: None,
                    field: Field::Id
                },
                "id {id:?} should be rejected"
            );
        }
    }

    #[test]
    fn from_fields_reports_known_id_with_failing_field() {
        let err = Task::from_fields(raw("4", "Task", "blocked")).unwrap_err();
        assert_eq!(
            err,
            FieldError {
                id: Some(4),
                field: Field::Status
            }
        );

        let err = Task::from_fields(raw("5", "", "todo")).unwrap_err();
        assert_eq!(err.field, Field::Description);
    }

    #[test]
    fn from_fields_requires_timestamps() {
        let mut record = raw("2", "Task", "done");
        record.updated_at = Some(String::new());

        let err = Task::from_fields(record).unwrap_err();

        assert_eq!(err.field, Field::UpdatedAt);
    }

    #[test]
    fn setters_refresh_updated_at_only() {
        let mut task = Task::new(1, "Old".to_string(), "t0".to_string());

        task.set_description("New".to_string(), "t1".to_string());
        task.set_status(Status::Done, "t2".to_string());

        assert_eq!(task.description(), "New");
        assert_eq!(task.status(), Status::Done);
        assert_eq!(task.created_at(), "t0");
        assert_eq!(task.updated_at(), "t2");
    }
}

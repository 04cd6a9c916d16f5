//! Task domain model.
//!
//! This module contains the central `Task` record together with the value
//! objects it is built from. The entity itself performs no validation beyond
//! field presence; see [`crate::domain::validation`] for the input rules.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Value Objects - Newtypes
// =============================================================================

/// Unique identifier for a task.
///
/// Identifiers are assigned by the storage layer on the first save and never
/// change afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a `TaskId` from an existing UUID.
    ///
    /// This is a pure function - it does not generate a new UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Generates a new `TaskId` with a time-ordered UUID (v7).
    ///
    /// **Note**: This is an impure function (side effect: time + random).
    /// Only storage backends call it, when a task is saved for the first time.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl std::str::FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value).map(Self)
    }
}

/// A timestamp wrapper for `DateTime<Utc>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a `Timestamp` from a `DateTime<Utc>`.
    #[must_use]
    pub const fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Self(datetime)
    }

    /// Returns the inner `DateTime<Utc>`.
    #[must_use]
    pub const fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns the current time as a `Timestamp`.
    ///
    /// **Note**: This is an impure function (side effect: system clock).
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0.to_rfc3339())
    }
}

// =============================================================================
// Enums
// =============================================================================

/// The priority level of a task.
///
/// Ordering follows declaration order: `High < Medium < Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Returns the stable storage name of the priority.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }

    /// Returns the declaration index, used wherever priorities are sorted.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_uppercase().as_str() {
            "HIGH" => Ok(Self::High),
            "MEDIUM" => Ok(Self::Medium),
            "LOW" => Ok(Self::Low),
            _ => Err(format!("unknown priority '{value}'")),
        }
    }
}

// =============================================================================
// Task
// =============================================================================

/// The task record.
///
/// `id` and `created_at` are `None` until the task has been saved; both are
/// owned by the storage layer and are never written by updates.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use todo_list_api::domain::{Priority, Task};
///
/// let due = NaiveDate::from_ymd_opt(2099, 1, 1).unwrap();
/// let task = Task::new("Study", "", Priority::Medium, due, "College");
///
/// assert!(!task.completed);
/// assert!(!task.is_persisted());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Storage-assigned identifier.
    pub id: Option<TaskId>,
    /// Title of the task.
    pub title: String,
    /// Description; may be empty.
    pub description: String,
    /// Priority level of the task.
    pub priority: Priority,
    /// Calendar date the task is due.
    pub due_date: NaiveDate,
    /// Whether the task has been completed.
    pub completed: bool,
    /// Free-form category, searched by substring.
    pub category: String,
    /// Set once, when the task is first stored.
    pub created_at: Option<Timestamp>,
}

impl Task {
    /// Creates a new, unsaved, open task.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        priority: Priority,
        due_date: NaiveDate,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: description.into(),
            priority,
            due_date,
            completed: false,
            category: category.into(),
            created_at: None,
        }
    }

    /// Returns a new task with the completed flag set to the given value.
    #[must_use]
    pub fn with_completed(self, completed: bool) -> Self {
        Self { completed, ..self }
    }

    /// Returns a new task carrying the storage-assigned identity.
    ///
    /// Only storage backends call this.
    #[must_use]
    pub fn with_identity(self, id: TaskId, created_at: Timestamp) -> Self {
        Self {
            id: Some(id),
            created_at: Some(created_at),
            ..self
        }
    }

    /// Returns `true` once the storage layer has assigned an identifier.
    #[must_use]
    pub const fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

// =============================================================================
// Tests
// =============================================================================

//! Partial-update merge engine.
//!
//! A [`TaskPatch`] is a sparse change-set: each field is independently absent,
//! explicitly cleared, or set. Merging validates every present field with the
//! same rules used on creation and then overwrites only those fields. `id` and
//! `created_at` are not part of a patch and are never touched.
//!
//! The merge does not consult the lifecycle guard; callers run
//! [`crate::domain::lifecycle::ensure_open`] first.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use super::task::{Priority, Task};
use super::validation::{
    COMPLETED_NULL, ValidationError, collect, validate_category, validate_description,
    validate_due_date, validate_priority, validate_title,
};

// =============================================================================
// FieldPatch
// =============================================================================

/// The state of one field in a sparse change-set.
///
/// When used inside a struct with `#[serde(default)]`, an omitted key
/// deserializes to `Absent`, a JSON `null` to `Cleared` and any other value to
/// `Set`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldPatch<T> {
    /// No value supplied; the field is left untouched.
    #[default]
    Absent,
    /// The field was explicitly set to null.
    Cleared,
    /// A new value for the field.
    Set(T),
}

impl<T> FieldPatch<T> {
    /// Returns `true` if no value was supplied.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Returns `true` if the field was supplied, either as a value or as null.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        !self.is_absent()
    }

    /// Converts `&FieldPatch<T>` into `FieldPatch<&T>`.
    #[must_use]
    pub const fn as_ref(&self) -> FieldPatch<&T> {
        match self {
            Self::Absent => FieldPatch::Absent,
            Self::Cleared => FieldPatch::Cleared,
            Self::Set(value) => FieldPatch::Set(value),
        }
    }

    /// Maps a set value, leaving `Absent` and `Cleared` as they are.
    pub fn map<U>(self, function: impl FnOnce(T) -> U) -> FieldPatch<U> {
        match self {
            Self::Absent => FieldPatch::Absent,
            Self::Cleared => FieldPatch::Cleared,
            Self::Set(value) => FieldPatch::Set(function(value)),
        }
    }
}

impl<T> From<Option<T>> for FieldPatch<T> {
    /// `Some` becomes `Set`, `None` becomes `Cleared`.
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Cleared, Self::Set)
    }
}

impl<'de, T> Deserialize<'de> for FieldPatch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Self::from)
    }
}

// =============================================================================
// TaskPatch
// =============================================================================

/// A sparse set of field changes for a task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: FieldPatch<String>,
    pub description: FieldPatch<String>,
    pub priority: FieldPatch<Priority>,
    pub due_date: FieldPatch<NaiveDate>,
    pub completed: FieldPatch<bool>,
    pub category: FieldPatch<String>,
}

impl TaskPatch {
    /// Returns a patch that sets the title.
    #[must_use]
    pub fn with_title(self, title: impl Into<String>) -> Self {
        Self {
            title: FieldPatch::Set(title.into()),
            ..self
        }
    }

    /// Returns a patch that sets the description.
    #[must_use]
    pub fn with_description(self, description: impl Into<String>) -> Self {
        Self {
            description: FieldPatch::Set(description.into()),
            ..self
        }
    }

    /// Returns a patch that sets the priority.
    #[must_use]
    pub fn with_priority(self, priority: Priority) -> Self {
        Self {
            priority: FieldPatch::Set(priority),
            ..self
        }
    }

    /// Returns a patch that sets the due date.
    #[must_use]
    pub fn with_due_date(self, due_date: NaiveDate) -> Self {
        Self {
            due_date: FieldPatch::Set(due_date),
            ..self
        }
    }

    /// Returns a patch that sets the completed flag.
    #[must_use]
    pub fn with_completed(self, completed: bool) -> Self {
        Self {
            completed: FieldPatch::Set(completed),
            ..self
        }
    }

    /// Returns a patch that sets the category.
    #[must_use]
    pub fn with_category(self, category: impl Into<String>) -> Self {
        Self {
            category: FieldPatch::Set(category.into()),
            ..self
        }
    }

    /// Returns `true` if every field is absent.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_absent()
            && self.description.is_absent()
            && self.priority.is_absent()
            && self.due_date.is_absent()
            && self.completed.is_absent()
            && self.category.is_absent()
    }

    /// Applies the patch onto `task`.
    ///
    /// Every present field is validated first; if any fails, nothing is
    /// applied and all causes are returned together.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` naming each present field that violates its
    /// constraint. A `Cleared` field counts as a violation since every task
    /// field is required.
    pub fn merge(&self, task: Task, today: NaiveDate) -> Result<Task, ValidationError> {
        let mut errors = ValidationError::new();

        let title = check(&mut errors, self.title.as_ref(), |title| {
            validate_title(title.map(String::as_str))
        });
        let description = check(&mut errors, self.description.as_ref(), |description| {
            validate_description(description.map(String::as_str))
        });
        let priority = check(&mut errors, self.priority.as_ref(), |priority| {
            validate_priority(priority.copied())
        });
        let due_date = check(&mut errors, self.due_date.as_ref(), |due_date| {
            validate_due_date(due_date.copied(), today)
        });
        let completed = check(&mut errors, self.completed.as_ref(), |completed| {
            completed
                .copied()
                .ok_or_else(|| ValidationError::single("completed", COMPLETED_NULL))
        });
        let category = check(&mut errors, self.category.as_ref(), |category| {
            validate_category(category.map(String::as_str))
        });

        errors.into_result()?;

        Ok(Task {
            title: title.unwrap_or(task.title),
            description: description.unwrap_or(task.description),
            priority: priority.unwrap_or(task.priority),
            due_date: due_date.unwrap_or(task.due_date),
            completed: completed.unwrap_or(task.completed),
            category: category.unwrap_or(task.category),
            ..task
        })
    }
}

/// Validates a present field; absent fields yield `None` without a check.
fn check<'a, T, U>(
    errors: &mut ValidationError,
    field: FieldPatch<&'a T>,
    validate: impl FnOnce(Option<&'a T>) -> Result<U, ValidationError>,
) -> Option<U> {
    match field {
        FieldPatch::Absent => None,
        FieldPatch::Cleared => collect(errors, validate(None)),
        FieldPatch::Set(value) => collect(errors, validate(Some(value))),
    }
}

// =============================================================================
// Tests
// =============================================================================

//! Input validation rules for tasks.
//!
//! Validators are pure functions. The reference date for the "future due
//! date" rule is passed in by the caller, so a date that is in the future when
//! a request is validated is accepted even if it has passed by the time the
//! task is stored.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use thiserror::Error;

use super::task::{Priority, Task};

/// Maximum title length, counted in characters.
pub const TITLE_MAX_CHARS: usize = 20;

pub const TITLE_EMPTY: &str = "title must not be empty";
pub const TITLE_LENGTH: &str = "title must contain between 1 and 20 characters";
pub const DESCRIPTION_NULL: &str =
    "description is optional but must not be null; send an empty string instead";
pub const PRIORITY_NULL: &str = "priority must not be null; choose one of HIGH, MEDIUM or LOW";
pub const DUE_DATE_NULL: &str = "due date must be provided";
pub const DUE_DATE_NOT_FUTURE: &str = "due date must be a future date";
pub const CATEGORY_MISSING: &str = "category must be provided";
pub const COMPLETED_NULL: &str = "completed must not be null";

// =============================================================================
// Validation Error
// =============================================================================

/// One or more field constraints violated on input.
///
/// Causes are keyed by the wire name of the field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error(
    "validation failed for {}",
    .errors.keys().map(String::as_str).collect::<Vec<_>>().join(", ")
)]
pub struct ValidationError {
    errors: BTreeMap<String, String>,
}

impl ValidationError {
    /// Creates an empty validation error, to be filled with [`Self::insert`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a validation error with a single field cause.
    #[must_use]
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut error = Self::new();
        error.insert(field, message);
        error
    }

    /// Records a cause for `field`. The first cause recorded for a field wins.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_insert_with(|| message.into());
    }

    /// Absorbs every cause of `other`.
    pub fn merge(&mut self, other: Self) {
        for (field, message) in other.errors {
            self.insert(field, message);
        }
    }

    /// Returns true if there are no validation errors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the cause recorded for `field`, if any.
    #[must_use]
    pub fn cause(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    /// Returns the full field → cause mapping.
    #[must_use]
    pub const fn field_errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    /// Returns the names of the invalid fields.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    /// Converts an accumulated error into a `Result`.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one cause was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

/// Collects the outcome of one field validator into `errors`.
pub(crate) fn collect<T>(
    errors: &mut ValidationError,
    result: Result<T, ValidationError>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            errors.merge(error);
            None
        }
    }
}

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a task title.
///
/// # Validation Rules
///
/// - Title must not be empty
/// - Title must not exceed 20 characters (on the raw string, no trimming)
///
/// # Errors
///
/// Returns a `ValidationError` on the `title` field.
pub fn validate_title(title: Option<&str>) -> Result<String, ValidationError> {
    let Some(title) = title else {
        return Err(ValidationError::single("title", TITLE_EMPTY));
    };

    if title.is_empty() {
        return Err(ValidationError::single("title", TITLE_EMPTY));
    }

    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(ValidationError::single("title", TITLE_LENGTH));
    }

    Ok(title.to_string())
}

/// Validates a task description: present, possibly empty.
///
/// # Errors
///
/// Returns a `ValidationError` on the `description` field.
pub fn validate_description(description: Option<&str>) -> Result<String, ValidationError> {
    description
        .map(str::to_string)
        .ok_or_else(|| ValidationError::single("description", DESCRIPTION_NULL))
}

/// Validates that a priority was supplied.
///
/// # Errors
///
/// Returns a `ValidationError` on the `priority` field.
pub fn validate_priority(priority: Option<Priority>) -> Result<Priority, ValidationError> {
    priority.ok_or_else(|| ValidationError::single("priority", PRIORITY_NULL))
}

/// Validates a due date against the reference date `today`.
///
/// # Errors
///
/// Returns a `ValidationError` on the `dueDate` field when the date is missing
/// or not strictly after `today`.
pub fn validate_due_date(
    due_date: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<NaiveDate, ValidationError> {
    match due_date {
        None => Err(ValidationError::single("dueDate", DUE_DATE_NULL)),
        Some(date) if date <= today => Err(ValidationError::single("dueDate", DUE_DATE_NOT_FUTURE)),
        Some(date) => Ok(date),
    }
}

/// Validates a category: present and non-empty, no length limit.
///
/// # Errors
///
/// Returns a `ValidationError` on the `category` field.
pub fn validate_category(category: Option<&str>) -> Result<String, ValidationError> {
    match category {
        Some(category) if !category.is_empty() => Ok(category.to_string()),
        _ => Err(ValidationError::single("category", CATEGORY_MISSING)),
    }
}

// =============================================================================
// Full Payload
// =============================================================================

/// An unvalidated full task payload, as used by create and full replace.
///
/// Every field is optional so that a missing field is reported as a field
/// cause instead of a decoding failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<NaiveDate>,
    /// Defaults to `false` when omitted.
    pub completed: Option<bool>,
    pub category: Option<String>,
}

/// A full payload that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidTask {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub due_date: NaiveDate,
    pub completed: bool,
    pub category: String,
}

impl TaskDraft {
    /// Validates every field, reporting all violations at once.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` listing every invalid field.
    pub fn validate(&self, today: NaiveDate) -> Result<ValidTask, ValidationError> {
        let mut errors = ValidationError::new();

        let title = collect(&mut errors, validate_title(self.title.as_deref()));
        let description = collect(&mut errors, validate_description(self.description.as_deref()));
        let priority = collect(&mut errors, validate_priority(self.priority));
        let due_date = collect(&mut errors, validate_due_date(self.due_date, today));
        let category = collect(&mut errors, validate_category(self.category.as_deref()));

        match (title, description, priority, due_date, category) {
            (Some(title), Some(description), Some(priority), Some(due_date), Some(category)) => {
                Ok(ValidTask {
                    title,
                    description,
                    priority,
                    due_date,
                    completed: self.completed.unwrap_or(false),
                    category,
                })
            }
            _ => Err(errors),
        }
    }
}

impl ValidTask {
    /// Builds a new, unsaved task from the payload.
    #[must_use]
    pub fn into_task(self) -> Task {
        Task::new(
            self.title,
            self.description,
            self.priority,
            self.due_date,
            self.category,
        )
        .with_completed(self.completed)
    }

    /// Overwrites every mutable field of `task`, keeping `id` and `created_at`.
    #[must_use]
    pub fn apply_to(self, task: Task) -> Task {
        Task {
            title: self.title,
            description: self.description,
            priority: self.priority,
            due_date: self.due_date,
            completed: self.completed,
            category: self.category,
            ..task
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

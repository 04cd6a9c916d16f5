//! Repository contract for tasks.
//!
//! This module defines the paging types shared by every backend and the
//! `TaskRepository` trait the service layer depends on.

use std::cmp::Ordering;
use std::str::FromStr;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Task, TaskId};

// =============================================================================
// Repository Error
// =============================================================================

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Entity was not found.
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// Database connection or query error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// A stored row could not be converted into a task.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// =============================================================================
// Sorting
// =============================================================================

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// The task fields a listing may be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Title,
    Description,
    Priority,
    DueDate,
    Completed,
    Category,
    CreatedAt,
    Id,
}

/// Errors produced while parsing a sort expression.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SortParseError {
    #[error("Unknown sort field: '{0}'")]
    UnknownField(String),

    #[error("Unknown sort direction: '{0}'. Expected 'asc' or 'desc'")]
    UnknownDirection(String),
}

impl FromStr for SortDirection {
    type Err = SortParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(SortParseError::UnknownDirection(value.to_string())),
        }
    }
}

impl FromStr for SortField {
    type Err = SortParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(Self::Title),
            "description" => Ok(Self::Description),
            "priority" => Ok(Self::Priority),
            "duedate" | "due_date" => Ok(Self::DueDate),
            "completed" => Ok(Self::Completed),
            "category" => Ok(Self::Category),
            "createdat" | "created_at" => Ok(Self::CreatedAt),
            "id" => Ok(Self::Id),
            _ => Err(SortParseError::UnknownField(value.to_string())),
        }
    }
}

/// A single sort criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Sort {
    #[must_use]
    pub const fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    #[must_use]
    pub const fn ascending(field: SortField) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    #[must_use]
    pub const fn descending(field: SortField) -> Self {
        Self::new(field, SortDirection::Desc)
    }

    /// Compares two tasks according to this criterion.
    ///
    /// Priorities compare by declaration order. Unsaved tasks sort before
    /// saved ones on `Id` and `CreatedAt`.
    #[must_use]
    pub fn compare(&self, left: &Task, right: &Task) -> Ordering {
        let ordering = match self.field {
            SortField::Title => left.title.cmp(&right.title),
            SortField::Description => left.description.cmp(&right.description),
            SortField::Priority => left.priority.cmp(&right.priority),
            SortField::DueDate => left.due_date.cmp(&right.due_date),
            SortField::Completed => left.completed.cmp(&right.completed),
            SortField::Category => left.category.cmp(&right.category),
            SortField::CreatedAt => left.created_at.cmp(&right.created_at),
            SortField::Id => left.id.cmp(&right.id),
        };

        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl FromStr for Sort {
    type Err = SortParseError;

    /// Parses `field` or `field,direction`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (field, direction) = match value.split_once(',') {
            Some((field, direction)) => (field, direction.parse()?),
            None => (value, SortDirection::default()),
        };
        Ok(Self::new(field.parse()?, direction))
    }
}

// =============================================================================
// Pageable
// =============================================================================

/// Invalid paging parameters.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PageableError {
    #[error("page size must be greater than 0")]
    ZeroPageSize,
}

/// Page request for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pageable {
    page: u32,
    size: u32,
    sort: Option<Sort>,
}

impl Pageable {
    /// Creates page parameters without a sort.
    ///
    /// # Errors
    ///
    /// Returns `PageableError::ZeroPageSize` if `size` is 0.
    pub const fn new(page: u32, size: u32) -> Result<Self, PageableError> {
        if size == 0 {
            return Err(PageableError::ZeroPageSize);
        }
        Ok(Self {
            page,
            size,
            sort: None,
        })
    }

    #[must_use]
    pub const fn with_sort(self, sort: Sort) -> Self {
        Self {
            sort: Some(sort),
            ..self
        }
    }

    /// Page index, zero-based.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    #[must_use]
    pub const fn sort(&self) -> Option<Sort> {
        self.sort
    }

    /// Returns the number of rows to skip.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.page as u64 * self.size as u64
    }
}

impl Default for Pageable {
    fn default() -> Self {
        Self {
            page: 0,
            size: 20,
            sort: None,
        }
    }
}

// =============================================================================
// Page
// =============================================================================

/// A bounded slice of a result set plus its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// The items in the current page.
    pub content: Vec<T>,
    /// Current page (0-indexed).
    pub page: u32,
    /// Requested page size.
    pub size: u32,
    /// Total number of matching items across all pages.
    pub total_elements: u64,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn new(content: Vec<T>, page: u32, size: u32, total_elements: u64) -> Self {
        Self {
            content,
            page,
            size,
            total_elements,
        }
    }

    /// Returns an empty page for the given request.
    #[must_use]
    pub const fn empty(pageable: &Pageable) -> Self {
        Self::new(Vec::new(), pageable.page, pageable.size, 0)
    }

    /// Returns the total number of pages; 0 when there are no elements.
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        if self.size == 0 {
            return 0;
        }
        self.total_elements.div_ceil(self.size as u64)
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        (self.page as u64 + 1) < self.total_pages()
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 0
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Converts the content while keeping the metadata.
    pub fn map<U>(self, function: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(function).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
        }
    }
}

/// Sorts and slices an in-process result set.
///
/// The sort is stable, so ties keep their incoming order. A page past the end
/// yields empty content with the correct totals.
#[must_use]
pub fn paginate(mut items: Vec<Task>, pageable: &Pageable) -> Page<Task> {
    if let Some(sort) = pageable.sort {
        items.sort_by(|left, right| sort.compare(left, right));
    }

    let total_elements = items.len() as u64;
    let offset = usize::try_from(pageable.offset()).unwrap_or(usize::MAX);
    let size = usize::try_from(pageable.size).unwrap_or(usize::MAX);
    let content = items.into_iter().skip(offset).take(size).collect();

    Page::new(content, pageable.page, pageable.size, total_elements)
}

// =============================================================================
// Task Repository
// =============================================================================

/// Storage contract for tasks.
///
/// Implementations must be shareable across request handlers, so the trait is
/// object safe and used as `Arc<dyn TaskRepository>`.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Inserts or updates a task and returns the stored record.
    ///
    /// A task without an id is inserted and receives a fresh id and
    /// `created_at`. A task with an id replaces the stored record, keeping the
    /// stored `created_at`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the task carries an id that is no
    /// longer stored.
    async fn save(&self, task: Task) -> Result<Task, RepositoryError>;

    /// Finds a task by its ID.
    async fn find_by_id(&self, id: &TaskId) -> Result<Option<Task>, RepositoryError>;

    /// Deletes a task by its ID.
    ///
    /// Returns `Ok(true)` if the task was deleted, `Ok(false)` if it didn't exist.
    async fn delete_by_id(&self, id: &TaskId) -> Result<bool, RepositoryError>;

    /// Lists all tasks, one page at a time.
    async fn find_all(&self, pageable: Pageable) -> Result<Page<Task>, RepositoryError>;

    /// Lists tasks whose category contains `category`, ignoring case.
    async fn find_by_category_containing_ignore_case(
        &self,
        pageable: Pageable,
        category: &str,
    ) -> Result<Page<Task>, RepositoryError>;
}

// =============================================================================
// Tests
// =============================================================================

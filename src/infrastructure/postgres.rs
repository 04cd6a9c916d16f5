//! `PostgreSQL` repository implementation.
//!
//! Uses `sqlx` with a connection pool. Each task field is a column, so sorting
//! and the category search run in the database.
//!
//! # Table Schema
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS tasks (
//!     id UUID PRIMARY KEY,
//!     title TEXT NOT NULL,
//!     description TEXT NOT NULL,
//!     priority VARCHAR(10) NOT NULL,
//!     due_date DATE NOT NULL,
//!     completed BOOLEAN NOT NULL DEFAULT FALSE,
//!     category TEXT NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL
//! );
//! ```

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Priority, Task, TaskId, Timestamp};
use crate::infrastructure::{
    Page, Pageable, RepositoryError, Sort, SortDirection, SortField, TaskRepository,
};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS tasks (\
     id UUID PRIMARY KEY, \
     title TEXT NOT NULL, \
     description TEXT NOT NULL, \
     priority VARCHAR(10) NOT NULL, \
     due_date DATE NOT NULL, \
     completed BOOLEAN NOT NULL DEFAULT FALSE, \
     category TEXT NOT NULL, \
     created_at TIMESTAMPTZ NOT NULL)";

const COLUMNS: &str = "id, title, description, priority, due_date, completed, category, created_at";

// =============================================================================
// Row Mapping
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct TaskRow {
    id: Uuid,
    title: String,
    description: String,
    priority: String,
    due_date: NaiveDate,
    completed: bool,
    category: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = RepositoryError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let priority: Priority = row
            .priority
            .parse()
            .map_err(RepositoryError::SerializationError)?;

        Ok(Self::new(
            row.title,
            row.description,
            priority,
            row.due_date,
            row.category,
        )
        .with_completed(row.completed)
        .with_identity(
            TaskId::from_uuid(row.id),
            Timestamp::from_datetime(row.created_at),
        ))
    }
}

fn database_error(error: sqlx::Error) -> RepositoryError {
    RepositoryError::DatabaseError(error.to_string())
}

// =============================================================================
// Query Helpers
// =============================================================================

/// Escapes `LIKE` wildcards so `term` matches literally, then wraps it for a
/// substring match. Pair with `ESCAPE '\'`.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for character in term.chars() {
        if matches!(character, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(character);
    }
    pattern.push('%');
    pattern
}

const fn sort_expression(field: SortField) -> &'static str {
    match field {
        SortField::Title => "title",
        SortField::Description => "description",
        SortField::Priority => {
            "CASE priority WHEN 'HIGH' THEN 0 WHEN 'MEDIUM' THEN 1 ELSE 2 END"
        }
        SortField::DueDate => "due_date",
        SortField::Completed => "completed",
        SortField::Category => "category",
        SortField::CreatedAt => "created_at",
        SortField::Id => "id",
    }
}

/// Renders the `ORDER BY` clause. The id tiebreaker keeps paging stable.
fn order_by_clause(sort: Option<Sort>) -> String {
    match sort {
        None | Some(Sort {
            field: SortField::Id,
            direction: SortDirection::Asc,
        }) => "ORDER BY id ASC".to_string(),
        Some(sort) => {
            let direction = match sort.direction {
                SortDirection::Asc => "ASC",
                SortDirection::Desc => "DESC",
            };
            format!(
                "ORDER BY {} {direction}, id ASC",
                sort_expression(sort.field)
            )
        }
    }
}

fn limit_and_offset(pageable: &Pageable) -> (i64, i64) {
    (
        i64::from(pageable.size()),
        i64::try_from(pageable.offset()).unwrap_or(i64::MAX),
    )
}

#[allow(clippy::cast_sign_loss)]
const fn count_to_u64(count: i64) -> u64 {
    if count < 0 { 0 } else { count as u64 }
}

// =============================================================================
// PostgreSQL Task Repository
// =============================================================================

/// `PostgreSQL` implementation of `TaskRepository`.
///
/// # Example
///
/// ```ignore
/// let pool = PgPool::connect("postgres://localhost/todo").await?;
/// let repository = PostgresTaskRepository::new(pool);
/// repository.ensure_schema().await?;
/// ```
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    /// Creates a new `PostgreSQL` task repository with the given connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the `tasks` table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DatabaseError` if the statement fails.
    pub async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;
        Ok(())
    }

    async fn insert(&self, task: Task) -> Result<Task, RepositoryError> {
        let sql = format!(
            "INSERT INTO tasks ({COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        let row: TaskRow = sqlx::query_as(&sql)
            .bind(*TaskId::generate().as_uuid())
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.priority.as_str())
            .bind(task.due_date)
            .bind(task.completed)
            .bind(&task.category)
            .bind(*Timestamp::now().as_datetime())
            .fetch_one(&self.pool)
            .await
            .map_err(database_error)?;

        Task::try_from(row)
    }

    async fn update(&self, id: TaskId, task: Task) -> Result<Task, RepositoryError> {
        let sql = format!(
            "UPDATE tasks SET title = $2, description = $3, priority = $4, due_date = $5, \
             completed = $6, category = $7 WHERE id = $1 RETURNING {COLUMNS}"
        );
        let row: Option<TaskRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.priority.as_str())
            .bind(task.due_date)
            .bind(task.completed)
            .bind(&task.category)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?;

        row.map_or_else(
            || Err(RepositoryError::NotFound(id.to_string())),
            Task::try_from,
        )
    }

    async fn fetch_page(
        &self,
        pageable: Pageable,
        category: Option<&str>,
    ) -> Result<Page<Task>, RepositoryError> {
        let filter = if category.is_some() {
            "WHERE category ILIKE $1 ESCAPE '\\'"
        } else {
            ""
        };
        let pattern = category.map(contains_pattern);

        let count_sql = format!("SELECT COUNT(*) FROM tasks {filter}");
        let mut count_query = sqlx::query_as::<_, (i64,)>(&count_sql);
        if let Some(pattern) = &pattern {
            count_query = count_query.bind(pattern);
        }
        let (total,) = count_query
            .fetch_one(&self.pool)
            .await
            .map_err(database_error)?;

        let (limit, offset) = limit_and_offset(&pageable);
        let (limit_slot, offset_slot) = if pattern.is_some() { (2, 3) } else { (1, 2) };
        let data_sql = format!(
            "SELECT {COLUMNS} FROM tasks {filter} {} LIMIT ${limit_slot} OFFSET ${offset_slot}",
            order_by_clause(pageable.sort())
        );
        let mut data_query = sqlx::query_as::<_, TaskRow>(&data_sql);
        if let Some(pattern) = &pattern {
            data_query = data_query.bind(pattern);
        }
        let rows = data_query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(database_error)?;

        let content = rows
            .into_iter()
            .map(Task::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(
            content,
            pageable.page(),
            pageable.size(),
            count_to_u64(total),
        ))
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn save(&self, task: Task) -> Result<Task, RepositoryError> {
        match task.id {
            None => self.insert(task).await,
            Some(id) => self.update(id, task).await,
        }
    }

    async fn find_by_id(&self, id: &TaskId) -> Result<Option<Task>, RepositoryError> {
        let sql = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1");
        let row: Option<TaskRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?;

        row.map(Task::try_from).transpose()
    }

    async fn delete_by_id(&self, id: &TaskId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_all(&self, pageable: Pageable) -> Result<Page<Task>, RepositoryError> {
        self.fetch_page(pageable, None).await
    }

    async fn find_by_category_containing_ignore_case(
        &self,
        pageable: Pageable,
        category: &str,
    ) -> Result<Page<Task>, RepositoryError> {
        self.fetch_page(pageable, Some(category)).await
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("facul", "%facul%")]
    #[case("", "%%")]
    #[case("100%", "%100\\%%")]
    #[case("a_b", "%a\\_b%")]
    #[case("c:\\dir", "%c:\\\\dir%")]
    fn test_contains_pattern_escapes_wildcards(#[case] term: &str, #[case] expected: &str) {
        assert_eq!(contains_pattern(term), expected);
    }

    #[rstest]
    fn test_order_by_defaults_to_id() {
        assert_eq!(order_by_clause(None), "ORDER BY id ASC");
        assert_eq!(
            order_by_clause(Some(Sort::ascending(SortField::Id))),
            "ORDER BY id ASC"
        );
    }

    #[rstest]
    fn test_order_by_renders_direction_and_tiebreaker() {
        assert_eq!(
            order_by_clause(Some(Sort::descending(SortField::DueDate))),
            "ORDER BY due_date DESC, id ASC"
        );
    }

    #[rstest]
    fn test_order_by_priority_uses_declaration_order() {
        let clause = order_by_clause(Some(Sort::ascending(SortField::Priority)));
        assert!(clause.starts_with("ORDER BY CASE priority WHEN 'HIGH' THEN 0"));
    }

    #[rstest]
    fn test_limit_and_offset() {
        let pageable = Pageable::new(3, 25).unwrap();
        assert_eq!(limit_and_offset(&pageable), (25, 75));
    }

    #[rstest]
    fn test_row_conversion() {
        let id = Uuid::now_v7();
        let created_at = Utc::now();
        let row = TaskRow {
            id,
            title: "Study".to_string(),
            description: String::new(),
            priority: "HIGH".to_string(),
            due_date: NaiveDate::from_ymd_opt(2099, 1, 1).unwrap(),
            completed: true,
            category: "College".to_string(),
            created_at,
        };

        let task = Task::try_from(row).unwrap();
        assert_eq!(task.id, Some(TaskId::from_uuid(id)));
        assert_eq!(task.priority, Priority::High);
        assert!(task.completed);
        assert_eq!(task.created_at, Some(Timestamp::from_datetime(created_at)));
    }

    #[rstest]
    fn test_row_conversion_rejects_unknown_priority() {
        let row = TaskRow {
            id: Uuid::now_v7(),
            title: "Study".to_string(),
            description: String::new(),
            priority: "URGENT".to_string(),
            due_date: NaiveDate::from_ymd_opt(2099, 1, 1).unwrap(),
            completed: false,
            category: "College".to_string(),
            created_at: Utc::now(),
        };

        assert!(matches!(
            Task::try_from(row),
            Err(RepositoryError::SerializationError(_))
        ));
    }
}

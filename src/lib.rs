//! # todo-list-api
//!
//! A task management API: clients create, list, search, replace, patch,
//! complete and delete tasks.
//!
//! ## Layers
//!
//! - [`domain`]: the task entity, field validation, the partial-update merge
//!   engine and the lifecycle guard
//! - [`infrastructure`]: the repository contract, pagination and the
//!   in-memory / `PostgreSQL` backends
//! - [`service`]: the task application service
//! - [`api`]: HTTP handlers, DTOs and error mapping
//! - [`config`]: environment configuration
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use chrono::{Days, Utc};
//! use todo_list_api::domain::{Priority, TaskDraft};
//! use todo_list_api::infrastructure::InMemoryTaskRepository;
//! use todo_list_api::service::TaskService;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let service = TaskService::new(Arc::new(InMemoryTaskRepository::new()));
//! let draft = TaskDraft {
//!     title: Some("Estudar".to_string()),
//!     description: Some(String::new()),
//!     priority: Some(Priority::Medium),
//!     due_date: Utc::now().date_naive().checked_add_days(Days::new(1)),
//!     completed: None,
//!     category: Some("Faculdade".to_string()),
//! };
//!
//! let task = service.create(draft).await.unwrap();
//! assert!(task.id.is_some());
//! assert!(!task.completed);
//! # });
//! ```

#![forbid(unsafe_code)]

pub mod api;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod service;

//! Infrastructure module for storage.
//!
//! This module contains the repository contract, its in-memory and
//! `PostgreSQL` backends, and the factory that selects one at startup.

pub mod factory;
pub mod in_memory;
pub mod postgres;
pub mod repository;

pub use factory::{
    ConfigurationError, FactoryError, RepositoryConfig, RepositoryFactory, StorageMode,
};
pub use in_memory::InMemoryTaskRepository;
pub use postgres::PostgresTaskRepository;
pub use repository::{
    Page, Pageable, PageableError, RepositoryError, Sort, SortDirection, SortField,
    SortParseError, TaskRepository, paginate,
};

//! Data access for book rows.

mod memory;
mod postgres;

pub use memory::InMemoryBookStore;
pub use postgres::PgBookStore;

use async_trait::async_trait;
use bookly_http::error::AppError;

use super::models::Book;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("No book with isbn '{0}'")]
    NotFound(String),

    #[error("A book with isbn '{0}' already exists")]
    Conflict(String),

    #[error("database failure: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(_) => AppError::not_found(error.to_string()),
            StoreError::Conflict(_) => AppError::conflict(error.to_string()),
            StoreError::Database(e) => AppError::Internal(anyhow::Error::new(e)),
        }
    }
}

/// Single-statement book persistence.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// All books ordered by title ascending
    async fn list_all(&self) -> Result<Vec<Book>, StoreError>;

    async fn get_by_isbn(&self, isbn: &str) -> Result<Book, StoreError>;

    /// Insert a new row and return it as stored
    async fn create(&self, book: Book) -> Result<Book, StoreError>;

    /// Overwrite every column of the row keyed by `isbn`
    async fn update(&self, isbn: &str, book: Book) -> Result<Book, StoreError>;
}

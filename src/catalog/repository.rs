//! Backing store interface for the catalog.

use async_trait::async_trait;
use thiserror::Error;

use crate::catalog::models::{Author, Book, Genre, User};
use crate::models::{BookQuery, BookRequest, CreateUserRequest, NameRequest, UpdateUserRequest};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepoError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("persistence error: {0}")]
    Persistence(String),
}

pub type RepoResult<T> = std::result::Result<T, RepoError>;

/// The authoritative store behind the cache.
///
/// Every method either commits fully or fails; the service only invalidates
/// cache keys after an `Ok`.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn users(&self) -> RepoResult<Vec<User>>;
    async fn user(&self, id: i64) -> RepoResult<User>;
    async fn create_user(&self, req: CreateUserRequest) -> RepoResult<i64>;
    async fn update_user(&self, id: i64, req: UpdateUserRequest) -> RepoResult<()>;
    async fn delete_user(&self, id: i64) -> RepoResult<()>;

    async fn books(&self) -> RepoResult<Vec<Book>>;
    async fn books_filtered(&self, query: &BookQuery) -> RepoResult<Vec<Book>>;
    async fn book(&self, id: i64) -> RepoResult<Book>;
    async fn create_book(&self, req: BookRequest) -> RepoResult<i64>;
    async fn update_book(&self, id: i64, req: BookRequest) -> RepoResult<()>;
    async fn delete_book(&self, id: i64) -> RepoResult<()>;
    /// Records `filename` on the book and returns the one it replaced, empty
    /// if there was none.
    async fn set_book_file(&self, id: i64, filename: String) -> RepoResult<String>;

    async fn authors(&self) -> RepoResult<Vec<Author>>;
    async fn author(&self, id: i64) -> RepoResult<Author>;
    async fn create_author(&self, req: NameRequest) -> RepoResult<i64>;
    async fn update_author(&self, id: i64, req: NameRequest) -> RepoResult<()>;
    async fn delete_author(&self, id: i64) -> RepoResult<()>;

    async fn genres(&self) -> RepoResult<Vec<Genre>>;
    async fn genre(&self, id: i64) -> RepoResult<Genre>;
    async fn create_genre(&self, req: NameRequest) -> RepoResult<i64>;
    async fn update_genre(&self, id: i64, req: NameRequest) -> RepoResult<()>;
    async fn delete_genre(&self, id: i64) -> RepoResult<()>;
}

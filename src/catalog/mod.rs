//! Catalog Module
//!
//! Users, books, authors and genres: the entities, the backing store
//! interface with an in-memory implementation, and the cached service.

mod memory;
pub mod models;
mod repository;
mod service;

pub use memory::MemoryRepository;
pub use models::{Author, AuthorList, Book, BookIndex, BookList, Genre, GenreList, User, UserList};
pub use repository::{CatalogRepository, RepoError, RepoResult};
pub use service::CatalogService;

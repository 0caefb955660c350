//! API Handlers
//!
//! HTTP request handlers for the catalog endpoints. Reads and writes both go
//! through [`CatalogService`], which owns the cache discipline.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::cache::CacheStore;
use crate::catalog::{
    Author, AuthorList, Book, BookList, CatalogRepository, CatalogService, Genre, GenreList,
    MemoryRepository, User, UserList,
};
use crate::config::Config;
use crate::error::{CatalogError, Result};
use crate::models::{
    AttachFileRequest, AttachFileResponse, BookQuery, BookRequest, CreateUserRequest,
    CreatedResponse, HealthResponse, MessageResponse, NameRequest, StatsResponse,
    UpdateUserRequest,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
}

impl AppState {
    pub fn new(catalog: CatalogService) -> Self {
        Self { catalog }
    }

    /// Builds the state from configuration, backed by `repo` and a fresh
    /// cache.
    pub fn from_config(config: &Config, repo: Arc<dyn CatalogRepository>) -> Self {
        let cache = Arc::new(CacheStore::new());
        Self::new(CatalogService::new(repo, cache, config.cache_ttl()))
    }

    /// Builds the state over an empty in-memory repository.
    pub fn in_memory(config: &Config) -> Self {
        Self::from_config(config, Arc::new(MemoryRepository::new()))
    }
}

fn validated(message: Option<String>) -> Result<()> {
    match message {
        Some(msg) => Err(CatalogError::InvalidRequest(msg)),
        None => Ok(()),
    }
}

type Created = (StatusCode, Json<CreatedResponse>);

fn created(id: i64) -> Created {
    (StatusCode::CREATED, Json(CreatedResponse { id }))
}

// == Users ==
pub async fn list_users(State(state): State<AppState>) -> Result<Json<UserList>> {
    Ok(Json(state.catalog.users().await?))
}

pub async fn get_user(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<User>> {
    Ok(Json(state.catalog.user(id).await?))
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<Created> {
    validated(req.validate())?;
    Ok(created(state.catalog.create_user(req).await?))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<MessageResponse>> {
    validated(req.validate())?;
    state.catalog.update_user(id, req).await?;
    Ok(Json(MessageResponse::new(format!("user {} updated", id))))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    state.catalog.delete_user(id).await?;
    Ok(Json(MessageResponse::new(format!("user {} deleted", id))))
}

// == Books ==
pub async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<BookQuery>,
) -> Result<Json<BookList>> {
    Ok(Json(state.catalog.books(&query).await?))
}

pub async fn get_book(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Book>> {
    Ok(Json(state.catalog.book(id).await?))
}

pub async fn create_book(
    State(state): State<AppState>,
    Json(req): Json<BookRequest>,
) -> Result<Created> {
    validated(req.validate())?;
    Ok(created(state.catalog.create_book(req).await?))
}

pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<BookRequest>,
) -> Result<Json<MessageResponse>> {
    validated(req.validate())?;
    state.catalog.update_book(id, req).await?;
    Ok(Json(MessageResponse::new(format!("book {} updated", id))))
}

pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    state.catalog.delete_book(id).await?;
    Ok(Json(MessageResponse::new(format!("book {} deleted", id))))
}

pub async fn attach_book_file(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<AttachFileRequest>,
) -> Result<Json<AttachFileResponse>> {
    validated(req.validate())?;
    let filename = req.filename.clone();
    let previous = state.catalog.attach_book_file(id, req.filename).await?;
    Ok(Json(AttachFileResponse {
        filename,
        replaced: (!previous.is_empty()).then_some(previous),
    }))
}

pub async fn books_by_author(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<BookList>> {
    Ok(Json(state.catalog.books_by_author(id).await?))
}

pub async fn books_by_genre(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<BookList>> {
    Ok(Json(state.catalog.books_by_genre(id).await?))
}

// == Authors ==
pub async fn list_authors(State(state): State<AppState>) -> Result<Json<AuthorList>> {
    Ok(Json(state.catalog.authors().await?))
}

pub async fn get_author(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Author>> {
    Ok(Json(state.catalog.author(id).await?))
}

pub async fn create_author(
    State(state): State<AppState>,
    Json(req): Json<NameRequest>,
) -> Result<Created> {
    validated(req.validate())?;
    Ok(created(state.catalog.create_author(req).await?))
}

pub async fn update_author(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<NameRequest>,
) -> Result<Json<MessageResponse>> {
    validated(req.validate())?;
    state.catalog.update_author(id, req).await?;
    Ok(Json(MessageResponse::new(format!("author {} updated", id))))
}

pub async fn delete_author(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    state.catalog.delete_author(id).await?;
    Ok(Json(MessageResponse::new(format!("author {} deleted", id))))
}

// == Genres ==
pub async fn list_genres(State(state): State<AppState>) -> Result<Json<GenreList>> {
    Ok(Json(state.catalog.genres().await?))
}

pub async fn get_genre(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Genre>> {
    Ok(Json(state.catalog.genre(id).await?))
}

pub async fn create_genre(
    State(state): State<AppState>,
    Json(req): Json<NameRequest>,
) -> Result<Created> {
    validated(req.validate())?;
    Ok(created(state.catalog.create_genre(req).await?))
}

pub async fn update_genre(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<NameRequest>,
) -> Result<Json<MessageResponse>> {
    validated(req.validate())?;
    state.catalog.update_genre(id, req).await?;
    Ok(Json(MessageResponse::new(format!("genre {} updated", id))))
}

pub async fn delete_genre(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    state.catalog.delete_genre(id).await?;
    Ok(Json(MessageResponse::new(format!("genre {} deleted", id))))
}

// == Operations ==
/// Handler for GET /cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.catalog.cache().stats()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        AppState::in_memory(&Config::default())
    }

    fn name(value: &str) -> NameRequest {
        NameRequest {
            name: value.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_genre() {
        let state = state();

        let (status, Json(body)) = create_genre(State(state.clone()), Json(name("Horror")))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let Json(genre) = get_genre(State(state), Path(body.id)).await.unwrap();
        assert_eq!(genre.name, "Horror");
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let result = create_author(State(state()), Json(name(""))).await;
        assert!(matches!(result, Err(CatalogError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_get_missing_user() {
        let result = get_user(State(state()), Path(5)).await;
        assert!(matches!(result, Err(CatalogError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_stats_handler_counts_cache_use() {
        let state = state();
        list_genres(State(state.clone())).await.unwrap();
        list_genres(State(state.clone())).await.unwrap();

        let Json(stats) = stats_handler(State(state)).await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}

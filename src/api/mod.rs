//! API Module
//!
//! HTTP handlers and routing for the catalog REST API.
//!
//! # Endpoints
//! - `/users`, `/users/:id`
//! - `/books`, `/books/:id`, `/books/:id/file`
//! - `/authors`, `/authors/:id`, `/authors/:id/books`
//! - `/genres`, `/genres/:id`, `/genres/:id/books`
//! - `GET /cache/stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;

//! Request and Response models for the catalog API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{
    AttachFileRequest, BookQuery, BookRequest, CreateUserRequest, NameRequest, SortField,
    SortOrder, UpdateUserRequest,
};
pub use responses::{
    AttachFileResponse, CreatedResponse, HealthResponse, MessageResponse, StatsResponse,
};

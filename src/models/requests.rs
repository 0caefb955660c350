//! Request DTOs for the catalog API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;

// == Validation Helpers ==
fn require(field: &str, value: &str) -> Option<String> {
    if value.trim().is_empty() {
        Some(format!("{} cannot be empty", field))
    } else {
        None
    }
}

/// Request body for POST /users
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

impl CreateUserRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        require("username", &self.username).or_else(|| require("email", &self.email))
    }
}

/// Request body for PUT /users/:id
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    /// Left unchanged when omitted
    #[serde(default)]
    pub user_role: Option<String>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Option<String> {
        require("username", &self.username).or_else(|| require("email", &self.email))
    }
}

/// Request body for POST /books and PUT /books/:id
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRequest {
    pub name: String,
    pub author_id: i64,
    pub genre_id: i64,
    #[serde(default)]
    pub isbn: String,
    #[serde(default)]
    pub description: String,
}

impl BookRequest {
    pub fn validate(&self) -> Option<String> {
        require("name", &self.name)
    }
}

/// Request body for authors and genres, which only carry a name
#[derive(Debug, Clone, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

impl NameRequest {
    pub fn validate(&self) -> Option<String> {
        require("name", &self.name)
    }
}

/// Request body for PUT /books/:id/file
#[derive(Debug, Clone, Deserialize)]
pub struct AttachFileRequest {
    pub filename: String,
}

impl AttachFileRequest {
    pub fn validate(&self) -> Option<String> {
        require("filename", &self.filename)
    }
}

// == Book Listing Query ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Title,
    CreatedAt,
    UpdatedAt,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Query string for GET /books: `?author=&genre=&sort=&order=`
///
/// Any filter or sort makes the listing bypass the cache. Unknown parameters
/// are rejected so a misspelled filter never falls back to the full list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BookQuery {
    #[serde(default, rename = "author")]
    pub author_id: Option<i64>,
    #[serde(default, rename = "genre")]
    pub genre_id: Option<i64>,
    #[serde(default, rename = "sort")]
    pub sort_by: Option<SortField>,
    #[serde(default)]
    pub order: Option<SortOrder>,
}

impl BookQuery {
    pub fn is_unfiltered(&self) -> bool {
        self.author_id.is_none() && self.genre_id.is_none() && self.sort_by.is_none()
    }
}

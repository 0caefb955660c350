//! Catalog entities as they are returned to clients and cached.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub user_role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

/// A book snapshot with its author and genre embedded.
///
/// `filename` names the attached file, empty when none is attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i64,
    pub name: String,
    pub author: Author,
    pub genre: Genre,
    pub isbn: String,
    pub filename: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserList {
    pub items: Vec<User>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookList {
    pub books_count: usize,
    pub items: Vec<Book>,
}

impl BookList {
    pub fn new(items: Vec<Book>) -> Self {
        Self {
            books_count: items.len(),
            items,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorList {
    pub authors_count: usize,
    pub items: Vec<Author>,
}

impl AuthorList {
    pub fn new(items: Vec<Author>) -> Self {
        Self {
            authors_count: items.len(),
            items,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenreList {
    pub genres_count: usize,
    pub items: Vec<Genre>,
}

impl GenreList {
    pub fn new(items: Vec<Genre>) -> Self {
        Self {
            genres_count: items.len(),
            items,
        }
    }
}

/// Books grouped by author or genre id, built from one full listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookIndex {
    pub groups: BTreeMap<i64, Vec<Book>>,
}

impl BookIndex {
    pub fn by_author(books: Vec<Book>) -> Self {
        Self::group(books, |book| book.author.id)
    }

    pub fn by_genre(books: Vec<Book>) -> Self {
        Self::group(books, |book| book.genre.id)
    }

    fn group(books: Vec<Book>, id_of: impl Fn(&Book) -> i64) -> Self {
        let mut groups: BTreeMap<i64, Vec<Book>> = BTreeMap::new();
        for book in books {
            groups.entry(id_of(&book)).or_default().push(book);
        }
        Self { groups }
    }

    /// Books under `id`; empty if there are none.
    pub fn books_for(&self, id: i64) -> BookList {
        BookList::new(self.groups.get(&id).cloned().unwrap_or_default())
    }
}

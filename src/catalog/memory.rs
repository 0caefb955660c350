//! In-process implementation of [`CatalogRepository`].

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::catalog::models::{Author, Book, Genre, User};
use crate::catalog::repository::{CatalogRepository, RepoError, RepoResult};
use crate::models::{
    BookQuery, BookRequest, CreateUserRequest, NameRequest, SortField, SortOrder,
    UpdateUserRequest,
};

const DEFAULT_ROLE: &str = "user";

#[derive(Debug, Clone)]
struct BookRow {
    name: String,
    author_id: i64,
    genre_id: i64,
    isbn: String,
    filename: String,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// A table with its own id sequence. Ids start at 1 and are never reused.
#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T> Table<T> {
    fn insert(&mut self, row: T) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        self.rows.insert(id, row);
        id
    }

    fn get(&self, id: i64, what: &str) -> RepoResult<&T> {
        self.rows
            .get(&id)
            .ok_or_else(|| RepoError::NotFound(format!("{what} {id}")))
    }

    fn get_mut(&mut self, id: i64, what: &str) -> RepoResult<&mut T> {
        self.rows
            .get_mut(&id)
            .ok_or_else(|| RepoError::NotFound(format!("{what} {id}")))
    }

    fn remove(&mut self, id: i64, what: &str) -> RepoResult<T> {
        self.rows
            .remove(&id)
            .ok_or_else(|| RepoError::NotFound(format!("{what} {id}")))
    }
}

#[derive(Debug, Default)]
struct Tables {
    users: Table<User>,
    books: Table<BookRow>,
    authors: Table<String>,
    genres: Table<String>,
}

impl Tables {
    fn join(&self, id: i64, row: &BookRow) -> RepoResult<Book> {
        let author = self.authors.get(row.author_id, "author")?;
        let genre = self.genres.get(row.genre_id, "genre")?;
        Ok(Book {
            id,
            name: row.name.clone(),
            author: Author {
                id: row.author_id,
                name: author.clone(),
            },
            genre: Genre {
                id: row.genre_id,
                name: genre.clone(),
            },
            isbn: row.isbn.clone(),
            filename: row.filename.clone(),
            description: row.description.clone(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    fn all_books(&self) -> RepoResult<Vec<Book>> {
        self.books
            .rows
            .iter()
            .map(|(id, row)| self.join(*id, row))
            .collect()
    }

    fn check_refs(&self, req: &BookRequest) -> RepoResult<()> {
        if !self.authors.rows.contains_key(&req.author_id) {
            return Err(RepoError::InvalidInput(format!(
                "unknown author {}",
                req.author_id
            )));
        }
        if !self.genres.rows.contains_key(&req.genre_id) {
            return Err(RepoError::InvalidInput(format!(
                "unknown genre {}",
                req.genre_id
            )));
        }
        Ok(())
    }
}

/// Catalog tables held in memory.
///
/// Counts every read so callers can tell whether a request reached the
/// store, and can be switched offline to make every call fail.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    tables: RwLock<Tables>,
    reads: AtomicUsize,
    offline: AtomicBool,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of read calls served so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> RepoResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(RepoError::Persistence("store unavailable".to_string()))
        } else {
            Ok(())
        }
    }

    fn begin_read(&self) -> RepoResult<()> {
        self.check_online()?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl CatalogRepository for MemoryRepository {
    async fn users(&self) -> RepoResult<Vec<User>> {
        self.begin_read()?;
        Ok(self.tables.read().await.users.rows.values().cloned().collect())
    }

    async fn user(&self, id: i64) -> RepoResult<User> {
        self.begin_read()?;
        self.tables.read().await.users.get(id, "user").cloned()
    }

    async fn create_user(&self, req: CreateUserRequest) -> RepoResult<i64> {
        self.check_online()?;
        let mut tables = self.tables.write().await;
        if tables.users.rows.values().any(|u| u.username == req.username) {
            return Err(RepoError::InvalidInput(format!(
                "username {} already taken",
                req.username
            )));
        }
        let id = tables.users.next_id;
        tables.users.insert(User {
            id,
            username: req.username,
            email: req.email,
            phone: req.phone,
            user_role: DEFAULT_ROLE.to_string(),
        });
        Ok(id)
    }

    async fn update_user(&self, id: i64, req: UpdateUserRequest) -> RepoResult<()> {
        self.check_online()?;
        let mut tables = self.tables.write().await;
        let user = tables.users.get_mut(id, "user")?;
        user.username = req.username;
        user.email = req.email;
        user.phone = req.phone;
        if let Some(role) = req.user_role {
            user.user_role = role;
        }
        Ok(())
    }

    async fn delete_user(&self, id: i64) -> RepoResult<()> {
        self.check_online()?;
        self.tables.write().await.users.remove(id, "user")?;
        Ok(())
    }

    async fn books(&self) -> RepoResult<Vec<Book>> {
        self.begin_read()?;
        self.tables.read().await.all_books()
    }

    async fn books_filtered(&self, query: &BookQuery) -> RepoResult<Vec<Book>> {
        self.begin_read()?;
        let mut books: Vec<Book> = self
            .tables
            .read()
            .await
            .all_books()?
            .into_iter()
            .filter(|b| query.author_id.map_or(true, |id| b.author.id == id))
            .filter(|b| query.genre_id.map_or(true, |id| b.genre.id == id))
            .collect();

        if let Some(field) = query.sort_by {
            match field {
                SortField::Title => books.sort_by(|a, b| a.name.cmp(&b.name)),
                SortField::CreatedAt => books.sort_by_key(|b| b.created_at),
                SortField::UpdatedAt => books.sort_by_key(|b| b.updated_at),
            }
            if query.order.unwrap_or_default() == SortOrder::Desc {
                books.reverse();
            }
        }
        Ok(books)
    }

    async fn book(&self, id: i64) -> RepoResult<Book> {
        self.begin_read()?;
        let tables = self.tables.read().await;
        let row = tables.books.get(id, "book")?;
        tables.join(id, row)
    }

    async fn create_book(&self, req: BookRequest) -> RepoResult<i64> {
        self.check_online()?;
        let mut tables = self.tables.write().await;
        tables.check_refs(&req)?;
        let now = Utc::now();
        Ok(tables.books.insert(BookRow {
            name: req.name,
            author_id: req.author_id,
            genre_id: req.genre_id,
            isbn: req.isbn,
            filename: String::new(),
            description: req.description,
            created_at: now,
            updated_at: now,
        }))
    }

    async fn update_book(&self, id: i64, req: BookRequest) -> RepoResult<()> {
        self.check_online()?;
        let mut tables = self.tables.write().await;
        tables.check_refs(&req)?;
        let row = tables.books.get_mut(id, "book")?;
        row.name = req.name;
        row.author_id = req.author_id;
        row.genre_id = req.genre_id;
        row.isbn = req.isbn;
        row.description = req.description;
        row.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_book(&self, id: i64) -> RepoResult<()> {
        self.check_online()?;
        self.tables.write().await.books.remove(id, "book")?;
        Ok(())
    }

    async fn set_book_file(&self, id: i64, filename: String) -> RepoResult<String> {
        self.check_online()?;
        let mut tables = self.tables.write().await;
        let row = tables.books.get_mut(id, "book")?;
        row.updated_at = Utc::now();
        Ok(std::mem::replace(&mut row.filename, filename))
    }

    async fn authors(&self) -> RepoResult<Vec<Author>> {
        self.begin_read()?;
        let tables = self.tables.read().await;
        Ok(tables
            .authors
            .rows
            .iter()
            .map(|(id, name)| Author {
                id: *id,
                name: name.clone(),
            })
            .collect())
    }

    async fn author(&self, id: i64) -> RepoResult<Author> {
        self.begin_read()?;
        let tables = self.tables.read().await;
        let name = tables.authors.get(id, "author")?;
        Ok(Author {
            id,
            name: name.clone(),
        })
    }

    async fn create_author(&self, req: NameRequest) -> RepoResult<i64> {
        self.check_online()?;
        Ok(self.tables.write().await.authors.insert(req.name))
    }

    async fn update_author(&self, id: i64, req: NameRequest) -> RepoResult<()> {
        self.check_online()?;
        *self.tables.write().await.authors.get_mut(id, "author")? = req.name;
        Ok(())
    }

    async fn delete_author(&self, id: i64) -> RepoResult<()> {
        self.check_online()?;
        let mut tables = self.tables.write().await;
        if tables.books.rows.values().any(|b| b.author_id == id) {
            return Err(RepoError::InvalidInput(format!(
                "author {id} still has books"
            )));
        }
        tables.authors.remove(id, "author")?;
        Ok(())
    }

    async fn genres(&self) -> RepoResult<Vec<Genre>> {
        self.begin_read()?;
        let tables = self.tables.read().await;
        Ok(tables
            .genres
            .rows
            .iter()
            .map(|(id, name)| Genre {
                id: *id,
                name: name.clone(),
            })
            .collect())
    }

    async fn genre(&self, id: i64) -> RepoResult<Genre> {
        self.begin_read()?;
        let tables = self.tables.read().await;
        let name = tables.genres.get(id, "genre")?;
        Ok(Genre {
            id,
            name: name.clone(),
        })
    }

    async fn create_genre(&self, req: NameRequest) -> RepoResult<i64> {
        self.check_online()?;
        Ok(self.tables.write().await.genres.insert(req.name))
    }

    async fn update_genre(&self, id: i64, req: NameRequest) -> RepoResult<()> {
        self.check_online()?;
        *self.tables.write().await.genres.get_mut(id, "genre")? = req.name;
        Ok(())
    }

    async fn delete_genre(&self, id: i64) -> RepoResult<()> {
        self.check_online()?;
        let mut tables = self.tables.write().await;
        if tables.books.rows.values().any(|b| b.genre_id == id) {
            return Err(RepoError::InvalidInput(format!("genre {id} still has books")));
        }
        tables.genres.remove(id, "genre")?;
        Ok(())
    }
}

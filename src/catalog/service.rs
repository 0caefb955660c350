//! Catalog service: cached reads, invalidating writes.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::cache::{CacheKey, CacheStore, EntityKind, Invalidator, Mutation, ReadThrough};
use crate::catalog::models::{
    Author, AuthorList, Book, BookIndex, BookList, Genre, GenreList, User, UserList,
};
use crate::catalog::repository::{CatalogRepository, RepoError, RepoResult};
use crate::models::{BookQuery, BookRequest, CreateUserRequest, NameRequest, UpdateUserRequest};

/// Service layer between the HTTP handlers and the repository.
///
/// Every read consults the cache first. Every write commits to the
/// repository and only then drops the keys it made stale; a failed write
/// invalidates nothing.
#[derive(Clone)]
pub struct CatalogService {
    repo: Arc<dyn CatalogRepository>,
    reader: ReadThrough,
    invalidator: Invalidator,
}

impl CatalogService {
    pub fn new(repo: Arc<dyn CatalogRepository>, cache: Arc<CacheStore>, ttl: Duration) -> Self {
        Self {
            repo,
            reader: ReadThrough::new(cache.clone(), ttl),
            invalidator: Invalidator::new(cache),
        }
    }

    pub fn cache(&self) -> &Arc<CacheStore> {
        self.reader.cache()
    }

    fn invalidate(&self, kind: EntityKind, mutation: Mutation) {
        let keys = self.invalidator.apply(kind, mutation);
        debug!(%kind, ?mutation, count = keys.len(), "write committed, keys invalidated");
    }

    // == Users ==
    pub async fn users(&self) -> RepoResult<UserList> {
        self.reader
            .get_or_fetch(CacheKey::collection(EntityKind::User), || async {
                Ok::<_, RepoError>(UserList {
                    items: self.repo.users().await?,
                })
            })
            .await
    }

    pub async fn user(&self, id: i64) -> RepoResult<User> {
        self.reader
            .get_or_fetch(CacheKey::entity(EntityKind::User, id), || self.repo.user(id))
            .await
    }

    pub async fn create_user(&self, req: CreateUserRequest) -> RepoResult<i64> {
        let id = self.repo.create_user(req).await?;
        self.invalidate(EntityKind::User, Mutation::Create);
        Ok(id)
    }

    pub async fn update_user(&self, id: i64, req: UpdateUserRequest) -> RepoResult<()> {
        self.repo.update_user(id, req).await?;
        self.invalidate(EntityKind::User, Mutation::Update(id));
        Ok(())
    }

    pub async fn delete_user(&self, id: i64) -> RepoResult<()> {
        self.repo.delete_user(id).await?;
        self.invalidate(EntityKind::User, Mutation::Delete(id));
        Ok(())
    }

    // == Books ==
    /// Lists books. Only the unfiltered, unsorted listing is cached; any
    /// filter or sort goes straight to the repository.
    pub async fn books(&self, query: &BookQuery) -> RepoResult<BookList> {
        if !query.is_unfiltered() {
            debug!(?query, "filtered book listing, cache bypassed");
            return Ok(BookList::new(self.repo.books_filtered(query).await?));
        }

        self.reader
            .get_or_fetch(CacheKey::collection(EntityKind::Book), || async {
                Ok::<_, RepoError>(BookList::new(self.repo.books().await?))
            })
            .await
    }

    pub async fn book(&self, id: i64) -> RepoResult<Book> {
        self.reader
            .get_or_fetch(CacheKey::entity(EntityKind::Book, id), || self.repo.book(id))
            .await
    }

    /// Books written by `author_id`, served from the cached author grouping.
    pub async fn books_by_author(&self, author_id: i64) -> RepoResult<BookList> {
        let index = self
            .reader
            .get_or_fetch(CacheKey::BooksByAuthor, || async {
                Ok::<_, RepoError>(BookIndex::by_author(self.repo.books().await?))
            })
            .await?;
        Ok(index.books_for(author_id))
    }

    /// Books in `genre_id`, served from the cached genre grouping.
    pub async fn books_by_genre(&self, genre_id: i64) -> RepoResult<BookList> {
        let index = self
            .reader
            .get_or_fetch(CacheKey::BooksByGenre, || async {
                Ok::<_, RepoError>(BookIndex::by_genre(self.repo.books().await?))
            })
            .await?;
        Ok(index.books_for(genre_id))
    }

    pub async fn create_book(&self, req: BookRequest) -> RepoResult<i64> {
        let id = self.repo.create_book(req).await?;
        self.invalidate(EntityKind::Book, Mutation::Create);
        Ok(id)
    }

    pub async fn update_book(&self, id: i64, req: BookRequest) -> RepoResult<()> {
        self.repo.update_book(id, req).await?;
        self.invalidate(EntityKind::Book, Mutation::Update(id));
        Ok(())
    }

    pub async fn delete_book(&self, id: i64) -> RepoResult<()> {
        self.repo.delete_book(id).await?;
        self.invalidate(EntityKind::Book, Mutation::Delete(id));
        Ok(())
    }

    /// Records a new file on the book. Returns the filename it replaced.
    pub async fn attach_book_file(&self, id: i64, filename: String) -> RepoResult<String> {
        let previous = self.repo.set_book_file(id, filename).await?;
        self.invalidate(EntityKind::Book, Mutation::UploadFile(id));
        Ok(previous)
    }

    // == Authors ==
    pub async fn authors(&self) -> RepoResult<AuthorList> {
        self.reader
            .get_or_fetch(CacheKey::collection(EntityKind::Author), || async {
                Ok::<_, RepoError>(AuthorList::new(self.repo.authors().await?))
            })
            .await
    }

    pub async fn author(&self, id: i64) -> RepoResult<Author> {
        self.reader
            .get_or_fetch(CacheKey::entity(EntityKind::Author, id), || {
                self.repo.author(id)
            })
            .await
    }

    pub async fn create_author(&self, req: NameRequest) -> RepoResult<i64> {
        let id = self.repo.create_author(req).await?;
        self.invalidate(EntityKind::Author, Mutation::Create);
        Ok(id)
    }

    pub async fn update_author(&self, id: i64, req: NameRequest) -> RepoResult<()> {
        self.repo.update_author(id, req).await?;
        self.invalidate(EntityKind::Author, Mutation::Update(id));
        Ok(())
    }

    pub async fn delete_author(&self, id: i64) -> RepoResult<()> {
        self.repo.delete_author(id).await?;
        self.invalidate(EntityKind::Author, Mutation::Delete(id));
        Ok(())
    }

    // == Genres ==
    pub async fn genres(&self) -> RepoResult<GenreList> {
        self.reader
            .get_or_fetch(CacheKey::collection(EntityKind::Genre), || async {
                Ok::<_, RepoError>(GenreList::new(self.repo.genres().await?))
            })
            .await
    }

    pub async fn genre(&self, id: i64) -> RepoResult<Genre> {
        self.reader
            .get_or_fetch(CacheKey::entity(EntityKind::Genre, id), || {
                self.repo.genre(id)
            })
            .await
    }

    pub async fn create_genre(&self, req: NameRequest) -> RepoResult<i64> {
        let id = self.repo.create_genre(req).await?;
        self.invalidate(EntityKind::Genre, Mutation::Create);
        Ok(id)
    }

    pub async fn update_genre(&self, id: i64, req: NameRequest) -> RepoResult<()> {
        self.repo.update_genre(id, req).await?;
        self.invalidate(EntityKind::Genre, Mutation::Update(id));
        Ok(())
    }

    pub async fn delete_genre(&self, id: i64) -> RepoResult<()> {
        self.repo.delete_genre(id).await?;
        self.invalidate(EntityKind::Genre, Mutation::Delete(id));
        Ok(())
    }
}

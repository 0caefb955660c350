//! Cache Key Module
//!
//! The naming convention every cached read and every invalidation goes
//! through. Keys are only ever produced here, so a read and the write that
//! must invalidate it always agree on the string.

use std::fmt;

// == Entity Kind ==
/// Catalog entity types that own a slice of the key namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Book,
    Author,
    Genre,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [Self::User, Self::Book, Self::Author, Self::Genre];

    /// Fixed key of the unfiltered collection listing.
    pub fn collection_key(self) -> &'static str {
        match self {
            Self::User => "allUsers",
            Self::Book => "allBooks",
            Self::Author => "allAuthors",
            Self::Genre => "allGenres",
        }
    }

    /// Prefix of the per-entity key, followed by the decimal id.
    pub fn id_prefix(self) -> &'static str {
        match self {
            Self::User => "userID",
            Self::Book => "bookID",
            Self::Author => "authorID",
            Self::Genre => "genreID",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::User => "user",
            Self::Book => "book",
            Self::Author => "author",
            Self::Genre => "genre",
        };
        f.write_str(name)
    }
}

// == Cache Key ==
/// A typed cache key.
///
/// The cross-reference keys are not parametrized by author or genre id:
/// each holds the grouping for every id at once, so dropping one drops the
/// cached answer for all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Unfiltered listing of one entity type
    Collection(EntityKind),
    /// A single entity by id
    Entity(EntityKind, i64),
    /// Books grouped by author id
    BooksByAuthor,
    /// Books grouped by genre id
    BooksByGenre,
}

impl CacheKey {
    pub fn collection(kind: EntityKind) -> Self {
        Self::Collection(kind)
    }

    pub fn entity(kind: EntityKind, id: i64) -> Self {
        Self::Entity(kind, id)
    }

    /// The exact string stored in the cache.
    pub fn as_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Collection(kind) => f.write_str(kind.collection_key()),
            Self::Entity(kind, id) => write!(f, "{}{}", kind.id_prefix(), id),
            Self::BooksByAuthor => f.write_str("getBooksByAuthorId"),
            Self::BooksByGenre => f.write_str("getBooksByGenreId"),
        }
    }
}

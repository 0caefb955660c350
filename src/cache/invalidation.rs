//! Invalidation Module
//!
//! Which keys a successful write makes stale, and the coordinator that
//! deletes them.

use std::sync::Arc;

use tracing::debug;

use crate::cache::{CacheKey, CacheStore, EntityKind};

// == Mutation ==
/// A committed change to the backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// A new entity was inserted; it had no entity key yet.
    Create,
    Update(i64),
    Delete(i64),
    /// A file was attached to (or replaced on) the entity.
    UploadFile(i64),
}

// == Invalidation Set ==
/// Returns every key whose cached value may be stale after `mutation` on
/// `kind`.
///
/// | Mutation                   | Keys                                          |
/// |----------------------------|-----------------------------------------------|
/// | create                     | collection (+ book cross-references)          |
/// | update / delete            | collection, entity (+ book cross-references)  |
/// | upload file                | entity                                        |
pub fn invalidation_set(kind: EntityKind, mutation: Mutation) -> Vec<CacheKey> {
    let mut keys = Vec::with_capacity(4);

    match mutation {
        Mutation::UploadFile(id) => {
            keys.push(CacheKey::entity(kind, id));
            return keys;
        }
        Mutation::Create => keys.push(CacheKey::collection(kind)),
        Mutation::Update(id) | Mutation::Delete(id) => {
            keys.push(CacheKey::collection(kind));
            keys.push(CacheKey::entity(kind, id));
        }
    }

    if kind == EntityKind::Book {
        keys.push(CacheKey::BooksByAuthor);
        keys.push(CacheKey::BooksByGenre);
    }

    keys
}

// == Invalidator ==
/// Applies [`invalidation_set`] to a shared store.
///
/// Called after the backing write has committed. It cannot fail: a key
/// that is already gone is simply skipped.
#[derive(Debug, Clone)]
pub struct Invalidator {
    cache: Arc<CacheStore>,
}

impl Invalidator {
    pub fn new(cache: Arc<CacheStore>) -> Self {
        Self { cache }
    }

    /// Deletes every key made stale by `mutation` and returns the keys
    /// that were targeted.
    pub fn apply(&self, kind: EntityKind, mutation: Mutation) -> Vec<CacheKey> {
        let keys = invalidation_set(kind, mutation);
        for key in &keys {
            let removed = self.cache.delete(&key.as_string());
            debug!(%kind, ?mutation, key = %key, removed, "cache invalidate");
        }
        keys
    }
}

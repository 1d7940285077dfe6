//! Stale-while-revalidate cache of account balances.
//!
//! Entries are keyed by entity slug (`None` for all entities) and move through
//! `Fresh -> Stale -> Revalidating -> Fresh`. An expired or invalidated entry is still served,
//! flagged stale, while a single background task reloads it from the store. A generation
//! counter makes a reload that raced an invalidation land as `Stale` so the next read refreshes
//! it again.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use chrono::{NaiveDateTime, Utc};
use sea_orm::DatabaseConnection;
use tokio::time::Instant;

use crate::server::{
    data::{
        balance::{AccountBalance, BalanceSnapshotRepository},
        entity::BusinessEntityRepository,
    },
    error::{sync::SyncError, Error},
};

/// Cache key, the entity slug or `None` for every entity.
type CacheKey = Option<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryState {
    Fresh,
    Stale,
    Revalidating,
}

struct CacheEntry {
    data: Arc<Vec<AccountBalance>>,
    loaded_at: Instant,
    state: EntryState,
    generation: u64,
}

/// Balances served from the cache along with their freshness.
#[derive(Debug, Clone)]
pub struct CachedBalances {
    pub balances: Arc<Vec<AccountBalance>>,
    /// The entry expired or was invalidated, a refresh is under way
    pub is_stale: bool,
    /// The data is older than the maximum staleness window
    pub stale_beyond_limit: bool,
}

/// Balance cache in front of the reconciliation store. Cheap to clone.
#[derive(Clone)]
pub struct BalanceCache {
    inner: Arc<BalanceCacheRef>,
}

struct BalanceCacheRef {
    db: DatabaseConnection,
    ttl: Duration,
    max_staleness: Duration,
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
}

enum Lookup {
    Hit(CachedBalances),
    Revalidate(CachedBalances, u64),
    Miss,
}

impl BalanceCache {
    /// Creates an empty cache.
    ///
    /// # Arguments
    /// - `db` - Connection used to load balances
    /// - `ttl` - Time an entry is served as fresh
    /// - `max_staleness` - Age beyond which served data carries the `StaleBeyondLimit` warning
    pub fn new(db: DatabaseConnection, ttl: Duration, max_staleness: Duration) -> Self {
        Self {
            inner: Arc::new(BalanceCacheRef {
                db,
                ttl,
                max_staleness,
                entries: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Latest balance of every account of an entity, or of every entity when `None`.
    ///
    /// A cold miss loads synchronously from the store. An expired or invalidated entry is
    /// served immediately with `is_stale` set, and at most one background reload runs per key.
    ///
    /// # Returns
    /// - `Ok(CachedBalances)` - Balances with their freshness flags
    /// - `Err(Error::SyncError(UnknownEntity))` - No business entity has this slug
    /// - `Err(Error::DbErr)` - The store could not be read on a cold miss
    pub async fn get_balances(&self, entity: Option<&str>) -> Result<CachedBalances, Error> {
        let key: CacheKey = entity.map(str::to_string);

        let lookup = {
            let mut entries = self.lock();
            match entries.get_mut(&key) {
                None => Lookup::Miss,
                Some(entry) => {
                    if entry.state == EntryState::Fresh && entry.loaded_at.elapsed() >= self.inner.ttl {
                        entry.state = EntryState::Stale;
                    }

                    match entry.state {
                        EntryState::Fresh => Lookup::Hit(self.view(entry, false)),
                        EntryState::Revalidating => Lookup::Hit(self.view(entry, true)),
                        EntryState::Stale => {
                            entry.state = EntryState::Revalidating;
                            Lookup::Revalidate(self.view(entry, true), entry.generation)
                        }
                    }
                }
            }
        };

        match lookup {
            Lookup::Hit(cached) => Ok(cached),
            Lookup::Revalidate(cached, generation) => {
                self.spawn_revalidation(key, generation);
                Ok(cached)
            }
            Lookup::Miss => {
                let data = Arc::new(self.load(entity).await?);
                let mut entries = self.lock();
                let entry = entries.entry(key).or_insert_with(|| CacheEntry {
                    data: Arc::clone(&data),
                    loaded_at: Instant::now(),
                    state: EntryState::Fresh,
                    generation: 0,
                });

                let is_stale = entry.state != EntryState::Fresh;

                Ok(self.view(entry, is_stale))
            }
        }
    }

    /// Marks the entries of an entity, and the all-entities entry, as stale.
    pub fn invalidate(&self, entity: &str) {
        let mut entries = self.lock();

        for key in [Some(entity.to_string()), None] {
            if let Some(entry) = entries.get_mut(&key) {
                entry.generation += 1;
                // A running reload sees the generation change and lands as stale
                if entry.state == EntryState::Fresh {
                    entry.state = EntryState::Stale;
                }
            }
        }
    }

    /// Marks every entry as stale.
    pub fn invalidate_all(&self) {
        for entry in self.lock().values_mut() {
            entry.generation += 1;
            if entry.state == EntryState::Fresh {
                entry.state = EntryState::Stale;
            }
        }
    }

    fn spawn_revalidation(&self, key: CacheKey, generation: u64) {
        let cache = self.clone();

        tokio::spawn(async move {
            let result = cache.load(key.as_deref()).await;
            let mut entries = cache.lock();
            let Some(entry) = entries.get_mut(&key) else {
                return;
            };

            match result {
                Ok(data) => {
                    entry.data = Arc::new(data);
                    entry.loaded_at = Instant::now();
                    entry.state = if entry.generation == generation {
                        EntryState::Fresh
                    } else {
                        EntryState::Stale
                    };
                }
                Err(e) => {
                    tracing::warn!(entity = ?key, "Balance cache revalidation failed: {}", e);
                    entry.state = EntryState::Stale;
                }
            }
        });
    }

    async fn load(&self, entity: Option<&str>) -> Result<Vec<AccountBalance>, Error> {
        let db = &self.inner.db;
        let entity_id = match entity {
            Some(slug) => Some(
                BusinessEntityRepository::new(db)
                    .find_by_slug(slug)
                    .await?
                    .ok_or_else(|| SyncError::UnknownEntity(slug.to_string()))?
                    .id,
            ),
            None => None,
        };

        Ok(BalanceSnapshotRepository::new(db)
            .latest_balances(entity_id)
            .await?)
    }

    fn view(&self, entry: &CacheEntry, is_stale: bool) -> CachedBalances {
        CachedBalances {
            balances: Arc::clone(&entry.data),
            is_stale,
            stale_beyond_limit: self.beyond_limit(entry),
        }
    }

    fn beyond_limit(&self, entry: &CacheEntry) -> bool {
        if entry.loaded_at.elapsed() > self.inner.max_staleness {
            return true;
        }

        let newest: Option<NaiveDateTime> =
            entry.data.iter().map(|b| b.snapshot.observed_at).max();
        match (newest, chrono::Duration::from_std(self.inner.max_staleness)) {
            (Some(newest), Ok(limit)) => Utc::now().naive_utc() - newest > limit,
            _ => false,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, CacheEntry>> {
        self.inner
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

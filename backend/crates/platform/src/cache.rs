//! TTL Cache Store Infrastructure
//!
//! Key/value storage with automatic expiry, used for verification codes
//! and send-rate flags. The trait is implemented by a Redis-backed store
//! for production and an in-memory store for tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use redis::aio::ConnectionManager;
use thiserror::Error;

/// Cache store errors
#[derive(Debug, Error)]
pub enum CacheError {
    /// Connecting to the store failed
    #[error("Cache connection failed: {0}")]
    Connection(String),

    /// A command against the store failed
    #[error("Cache command failed: {0}")]
    Command(String),
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError::Command(err.to_string())
    }
}

/// One entry of a pipelined multi-key write
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: String,
    pub value: String,
    pub ttl: Duration,
}

impl CacheEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>, ttl: Duration) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            ttl,
        }
    }
}

/// Trait for TTL key/value storage backends
#[trait_variant::make(TtlStore: Send)]
pub trait LocalTtlStore {
    /// Store a value under a key with an expiry
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Read a value without consuming it
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Atomically read and delete a value (single-use consume)
    async fn take(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Whether a key currently exists
    async fn exists(&self, key: &str) -> Result<bool, CacheError>;

    /// Store several entries in a single round-trip
    async fn put_many(&self, entries: &[CacheEntry]) -> Result<(), CacheError>;
}

// ============================================================================
// Redis implementation
// ============================================================================

/// Redis-backed TTL store using the async connection manager
#[derive(Clone)]
pub struct RedisTtlStore {
    conn: ConnectionManager,
}

impl RedisTtlStore {
    /// Connect and build the shared connection manager
    pub async fn connect(redis_url: &str) -> Result<Self, CacheError> {
        let client =
            redis::Client::open(redis_url).map_err(|e| CacheError::Connection(e.to_string()))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))?;
        Ok(Self { conn })
    }
}

impl TtlStore for RedisTtlStore {
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(ttl.as_secs())
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = redis::cmd("GET").arg(key).query_async(&mut conn).await?;
        Ok(value)
    }

    async fn take(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        // GETDEL keeps consume-once atomic under concurrent readers
        let value: Option<String> = redis::cmd("GETDEL").arg(key).query_async(&mut conn).await?;
        Ok(value)
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.conn.clone();
        let exists: bool = redis::cmd("EXISTS").arg(key).query_async(&mut conn).await?;
        Ok(exists)
    }

    async fn put_many(&self, entries: &[CacheEntry]) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let mut pipe = redis::pipe();
        for entry in entries {
            pipe.cmd("SET")
                .arg(&entry.key)
                .arg(&entry.value)
                .arg("EX")
                .arg(entry.ttl.as_secs())
                .ignore();
        }
        pipe.query_async::<_, ()>(&mut conn).await?;
        Ok(())
    }
}

// ============================================================================
// In-memory implementation (tests, local development)
// ============================================================================

/// In-memory TTL store
///
/// Entries are dropped lazily on access once their deadline has passed.
#[derive(Clone, Default)]
pub struct MemoryTtlStore {
    entries: Arc<Mutex<HashMap<String, (String, Instant)>>>,
}

impl MemoryTtlStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn live_value(&self, key: &str, remove: bool) -> Option<String> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some((value, deadline)) if *deadline > Instant::now() => {
                let value = value.clone();
                if remove {
                    entries.remove(key);
                }
                Some(value)
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }
}

impl TtlStore for MemoryTtlStore {
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.live_value(key, false))
    }

    async fn take(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.live_value(key, true))
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.live_value(key, false).is_some())
    }

    async fn put_many(&self, entries: &[CacheEntry]) -> Result<(), CacheError> {
        let now = Instant::now();
        let mut map = self.entries.lock().unwrap();
        for entry in entries {
            map.insert(entry.key.clone(), (entry.value.clone(), now + entry.ttl));
        }
        Ok(())
    }
}

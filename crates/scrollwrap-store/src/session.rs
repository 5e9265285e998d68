//! The session key/value seam and its in-memory reference implementation.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::{StoreError, StoreResult};

/// Session-scoped opaque string storage.
///
/// Implementations live exactly as long as a browsing/app session: a browser
/// host backs this with sessionStorage, tests with a map. The engine only
/// ever does one read (at mount) and one write (at commit) per gate, so
/// implementations need no batching or caching.
#[async_trait]
pub trait SessionKv: Send + Sync {
    /// Read the raw value at `key`, if present.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Write `value` at `key`, replacing any previous value.
    async fn put(&self, key: &str, value: &str) -> StoreResult<()>;
}

/// In-memory session store.
///
/// Deterministic and test-friendly; also the natural adapter for native
/// hosts where "session" means "process lifetime". A fresh instance models a
/// fresh session.
#[derive(Default)]
pub struct InMemorySessionKv {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemorySessionKv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries held, for diagnostics and tests.
    pub fn len(&self) -> usize {
        self.entries.read().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SessionKv for InMemorySessionKv {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let guard = self
            .entries
            .read()
            .map_err(|_| StoreError::Backend("session kv lock poisoned".to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut guard = self
            .entries
            .write()
            .map_err(|_| StoreError::Backend("session kv lock poisoned".to_string()))?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

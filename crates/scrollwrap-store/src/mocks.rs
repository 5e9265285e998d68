//! Test doubles for the session storage seam.
//!
//! Exported so the engine crate's failure-fallback tests can exercise the
//! "storage broken, reveal anyway" contract without a real host.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;

use crate::session::{InMemorySessionKv, SessionKv};
use crate::{StoreError, StoreResult};

/// Session KV whose reads and/or writes can be made to fail.
///
/// Successful operations are delegated to an inner in-memory store, so a
/// test can break storage, observe the fallback, then heal it and inspect
/// what (if anything) was written.
pub struct FaultySessionKv {
    inner: InMemorySessionKv,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    read_attempts: AtomicU32,
    write_attempts: AtomicU32,
}

impl FaultySessionKv {
    /// Fully healthy double; break it per-operation as the test requires.
    pub fn healthy() -> Self {
        Self {
            inner: InMemorySessionKv::new(),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            read_attempts: AtomicU32::new(0),
            write_attempts: AtomicU32::new(0),
        }
    }

    /// Double that fails every operation, modeling an absent session store.
    pub fn unavailable() -> Self {
        let kv = Self::healthy();
        kv.fail_reads.store(true, Ordering::SeqCst);
        kv.fail_writes.store(true, Ordering::SeqCst);
        kv
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Reads attempted, including failed ones.
    pub fn read_attempts(&self) -> u32 {
        self.read_attempts.load(Ordering::SeqCst)
    }

    /// Writes attempted, including failed ones.
    pub fn write_attempts(&self) -> u32 {
        self.write_attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionKv for FaultySessionKv {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.read_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "session storage rejected the read".to_string(),
            ));
        }
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: &str) -> StoreResult<()> {
        self.write_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "session storage rejected the write".to_string(),
            ));
        }
        self.inner.put(key, value).await
    }
}

//! SQLite-backed search result cache.
//!
//! One row per query fingerprint. Entries older than the TTL are invisible
//! to lookups and removed by [`SqliteCacheStore::cleanup`].
//!
//! File-backed stores hold two connections, a writer and a reader, so
//! lookups never queue behind a write (WAL mode). In-memory stores share
//! one connection since a second would open a separate database.
//!
//! All calls block; async callers run them on `spawn_blocking`.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use techsearch_providers::{Fingerprint, Provider, SearchResult};

use super::schema::{apply_schema, read_schema_version};
use super::types::{CacheEntry, CacheError, CacheStats};

/// How long a connection waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed result cache.
pub struct SqliteCacheStore {
    path: Option<PathBuf>,
    ttl: Duration,
    writer: Mutex<Connection>,
    /// `None` for in-memory stores; reads then go through `writer`.
    reader: Option<Mutex<Connection>>,
}

impl SqliteCacheStore {
    /// Open (or create) the cache database at `path`.
    ///
    /// Creates parent directories and applies the schema if needed.
    pub fn open(path: &Path, ttl: Duration) -> Result<Self, CacheError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| CacheError::Io(e.to_string()))?;
        }

        let writer = Connection::open(path)?;
        writer.busy_timeout(BUSY_TIMEOUT)?;
        apply_schema(&writer)?;

        let reader = Connection::open(path)?;
        reader.busy_timeout(BUSY_TIMEOUT)?;

        tracing::debug!(path = %path.display(), ttl_secs = ttl.as_secs(), "cache store opened");
        Ok(Self {
            path: Some(path.to_path_buf()),
            ttl,
            writer: Mutex::new(writer),
            reader: Some(Mutex::new(reader)),
        })
    }

    /// A private in-memory cache, gone when the store is dropped.
    pub fn open_in_memory(ttl: Duration) -> Result<Self, CacheError> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self {
            path: None,
            ttl,
            writer: Mutex::new(conn),
            reader: None,
        })
    }

    /// Database file, `None` when in memory.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn schema_version(&self) -> Result<Option<u32>, CacheError> {
        let conn = self.read_conn()?;
        Ok(read_schema_version(&conn)?)
    }

    /// Live entry for `fingerprint`, if any.
    pub fn get(&self, fingerprint: &Fingerprint) -> Result<Option<CacheEntry>, CacheError> {
        self.get_at(fingerprint, Utc::now())
    }

    /// [`get`](Self::get) evaluated as if the current time were `now`.
    pub fn get_at(
        &self,
        fingerprint: &Fingerprint,
        now: DateTime<Utc>,
    ) -> Result<Option<CacheEntry>, CacheError> {
        let cutoff = self.cutoff_millis(now);
        let conn = self.read_conn()?;
        let row = conn
            .query_row(
                "SELECT results, providers, created_at FROM search_cache \
                 WHERE fingerprint = ?1 AND created_at >= ?2",
                params![fingerprint.as_str(), cutoff],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                },
            )
            .optional()?;
        drop(conn);

        let Some((results, providers, created_at)) = row else {
            return Ok(None);
        };

        Ok(Some(CacheEntry {
            fingerprint: fingerprint.clone(),
            results: decode_results(&results)?,
            created_at: decode_timestamp(created_at)?,
            providers: decode_providers(&providers)?,
        }))
    }

    /// Store `results` under `fingerprint`, replacing any previous entry.
    pub fn put(
        &self,
        fingerprint: &Fingerprint,
        results: &[SearchResult],
        providers: &[Provider],
    ) -> Result<(), CacheError> {
        self.put_at(fingerprint, results, providers, Utc::now())
    }

    /// [`put`](Self::put) with an explicit creation time.
    pub fn put_at(
        &self,
        fingerprint: &Fingerprint,
        results: &[SearchResult],
        providers: &[Provider],
        created_at: DateTime<Utc>,
    ) -> Result<(), CacheError> {
        let results_json = serde_json::to_string(results)
            .map_err(|e| CacheError::Corrupt(format!("cannot encode results: {e}")))?;
        let providers_csv = encode_providers(providers);

        let conn = self.write_conn()?;
        conn.execute(
            "INSERT INTO search_cache (fingerprint, results, providers, created_at) \
             VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT(fingerprint) DO UPDATE SET \
             results = excluded.results, \
             providers = excluded.providers, \
             created_at = excluded.created_at",
            params![
                fingerprint.as_str(),
                results_json,
                providers_csv,
                created_at.timestamp_millis()
            ],
        )?;
        Ok(())
    }

    /// Delete every entry older than the TTL. Returns the number removed.
    pub fn cleanup(&self) -> Result<usize, CacheError> {
        self.cleanup_at(Utc::now())
    }

    /// [`cleanup`](Self::cleanup) evaluated as if the current time were `now`.
    pub fn cleanup_at(&self, now: DateTime<Utc>) -> Result<usize, CacheError> {
        let cutoff = self.cutoff_millis(now);
        let conn = self.write_conn()?;
        Ok(conn.execute(
            "DELETE FROM search_cache WHERE created_at < ?1",
            params![cutoff],
        )?)
    }

    /// Delete every entry regardless of age. Returns the number removed.
    pub fn clear(&self) -> Result<usize, CacheError> {
        let conn = self.write_conn()?;
        Ok(conn.execute("DELETE FROM search_cache", [])?)
    }

    pub fn stats(&self) -> Result<CacheStats, CacheError> {
        self.stats_at(Utc::now())
    }

    pub fn stats_at(&self, now: DateTime<Utc>) -> Result<CacheStats, CacheError> {
        let cutoff = self.cutoff_millis(now);
        let conn = self.read_conn()?;
        let (entries, expired, oldest, newest) = conn.query_row(
            "SELECT COUNT(*), \
                    COALESCE(SUM(CASE WHEN created_at < ?1 THEN 1 ELSE 0 END), 0), \
                    MIN(created_at), MAX(created_at) \
             FROM search_cache",
            params![cutoff],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, Option<i64>>(2)?,
                    row.get::<_, Option<i64>>(3)?,
                ))
            },
        )?;
        drop(conn);

        Ok(CacheStats {
            entries: u64::try_from(entries).unwrap_or(0),
            expired: u64::try_from(expired).unwrap_or(0),
            oldest: oldest.map(decode_timestamp).transpose()?,
            newest: newest.map(decode_timestamp).transpose()?,
        })
    }

    /// Oldest `created_at` (unix millis) still considered live at `now`.
    fn cutoff_millis(&self, now: DateTime<Utc>) -> i64 {
        let ttl_ms = i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX);
        now.timestamp_millis().saturating_sub(ttl_ms)
    }

    fn write_conn(&self) -> Result<MutexGuard<'_, Connection>, CacheError> {
        self.writer.lock().map_err(|_| CacheError::Poisoned)
    }

    fn read_conn(&self) -> Result<MutexGuard<'_, Connection>, CacheError> {
        self.reader
            .as_ref()
            .unwrap_or(&self.writer)
            .lock()
            .map_err(|_| CacheError::Poisoned)
    }
}

impl std::fmt::Debug for SqliteCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteCacheStore")
            .field("path", &self.path)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Row conversion helpers
// ---------------------------------------------------------------------------

fn decode_results(json: &str) -> Result<Vec<SearchResult>, CacheError> {
    serde_json::from_str(json).map_err(|e| CacheError::Corrupt(format!("results column: {e}")))
}

fn encode_providers(providers: &[Provider]) -> String {
    providers
        .iter()
        .map(|p| p.slug())
        .collect::<Vec<_>>()
        .join(",")
}

fn decode_providers(csv: &str) -> Result<Vec<Provider>, CacheError> {
    csv.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| Provider::from_str(s).map_err(CacheError::Corrupt))
        .collect()
}

fn decode_timestamp(millis: i64) -> Result<DateTime<Utc>, CacheError> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .ok_or_else(|| CacheError::Corrupt(format!("created_at out of range: {millis}")))
}

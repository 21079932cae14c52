//! Snapshot cache and re-derivation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::FilterSettings;
use crate::error::Result;
use crate::ports::{CaptureSource, DirectoryLookup, ProcessTerminator};

use super::pipeline::{derive, Derivation};

/// One raw capture, identified so callers can tell captures apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub id: Uuid,
    pub raw: String,
    /// Order in which the capture was started within its session.
    pub sequence: u64,
}

impl Snapshot {
    pub fn new(raw: impl Into<String>, sequence: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            raw: raw.into(),
            sequence,
        }
    }
}

/// Directory lookups already made for one snapshot.
#[derive(Debug, Default)]
struct DirectoryCache {
    snapshot: Option<Uuid>,
    entries: HashMap<u32, Option<String>>,
}

/// Answers lookups from the cache, asking the inner lookup once per PID.
struct CachedLookup<'a, D> {
    inner: &'a D,
    cache: &'a Mutex<DirectoryCache>,
    snapshot: Uuid,
}

impl<D: DirectoryLookup> DirectoryLookup for CachedLookup<'_, D> {
    fn directory(&self, pid: u32) -> Option<String> {
        let mut cache = self.cache.lock();
        if cache.snapshot != Some(self.snapshot) {
            cache.snapshot = Some(self.snapshot);
            cache.entries.clear();
        }
        cache
            .entries
            .entry(pid)
            .or_insert_with(|| self.inner.directory(pid))
            .clone()
    }
}

/// Holds the active settings and the last capture, and runs the pipeline
/// against either a fresh capture or the cached one.
///
/// All state sits behind locks so a session can be shared with background
/// tasks through an `Arc`. Overlapping refreshes are ordered by when their
/// capture started: a capture finishing after a newer one has been cached is
/// derived and returned but never cached. Callers still drop results from
/// superseded requests.
///
/// Working directories are looked up at most once per process and snapshot,
/// so re-deriving for a new search term does not repeat them.
pub struct Session<C, T, D> {
    capture: C,
    terminator: T,
    directories: D,
    settings: RwLock<FilterSettings>,
    snapshot: RwLock<Option<Snapshot>>,
    next_sequence: AtomicU64,
    directory_cache: Mutex<DirectoryCache>,
}

impl<C, T, D> Session<C, T, D>
where
    C: CaptureSource,
    T: ProcessTerminator,
    D: DirectoryLookup,
{
    /// Create a session with no capture yet.
    pub fn new(capture: C, terminator: T, directories: D, settings: FilterSettings) -> Self {
        Self {
            capture,
            terminator,
            directories,
            settings: RwLock::new(settings),
            snapshot: RwLock::new(None),
            next_sequence: AtomicU64::new(1),
            directory_cache: Mutex::new(DirectoryCache::default()),
        }
    }

    /// Capture fresh data, replace the cached snapshot and derive rows.
    ///
    /// The previous snapshot is kept if either the capture or its parse fails,
    /// or if a capture started later has already been cached.
    pub async fn refresh(&self) -> Result<Derivation> {
        let sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst);
        let raw = self.capture.capture().await?;
        let snapshot = Snapshot::new(raw, sequence);
        let derivation = self.derive_from(&snapshot)?;

        let mut cached = self.snapshot.write();
        if cached.as_ref().is_some_and(|c| c.sequence > sequence) {
            debug!(
                snapshot = %snapshot.id,
                sequence = sequence,
                "Capture superseded by a newer one, not caching"
            );
            return Ok(derivation);
        }

        info!(
            snapshot = %snapshot.id,
            processes = derivation.processes.len(),
            rows = derivation.table.len(),
            "Refreshed snapshot"
        );
        *cached = Some(snapshot);
        Ok(derivation)
    }

    /// Derive rows from the cached snapshot without capturing.
    ///
    /// Without a snapshot this behaves like an empty capture.
    pub fn rederive(&self) -> Result<Derivation> {
        let snapshot = self.snapshot.read();
        match snapshot.as_ref() {
            Some(snapshot) => self.derive_from(snapshot),
            None => {
                debug!("No snapshot cached yet, deriving from an empty capture");
                let settings = self.settings.read();
                derive("", &settings, &self.directories)
            }
        }
    }

    /// Replace the search term and re-derive from the cache.
    pub fn set_search_term(&self, term: impl Into<String>) -> Result<Derivation> {
        self.update_settings(|settings| settings.search_term = term.into())
    }

    /// Apply a settings change and re-derive from the cache.
    pub fn update_settings(&self, update: impl FnOnce(&mut FilterSettings)) -> Result<Derivation> {
        update(&mut *self.settings.write());
        self.rederive()
    }

    /// Request termination of a process.
    ///
    /// On success the set of live processes has changed, so callers should
    /// `refresh` rather than re-derive. On failure the cache is untouched.
    pub async fn terminate(&self, pid: u32) -> Result<()> {
        info!(pid = pid, "Terminating process");
        self.terminator.terminate(pid).await
    }

    /// Terminate a process, then capture fresh data.
    pub async fn terminate_and_refresh(&self, pid: u32) -> Result<Derivation> {
        self.terminate(pid).await?;
        self.refresh().await
    }

    /// Current settings.
    pub fn settings(&self) -> FilterSettings {
        self.settings.read().clone()
    }

    /// Identifier of the cached snapshot, if any.
    pub fn snapshot_id(&self) -> Option<Uuid> {
        self.snapshot.read().as_ref().map(|snapshot| snapshot.id)
    }

    fn derive_from(&self, snapshot: &Snapshot) -> Result<Derivation> {
        let settings = self.settings.read();
        let directories = CachedLookup {
            inner: &self.directories,
            cache: &self.directory_cache,
            snapshot: snapshot.id,
        };
        let mut derivation = derive(&snapshot.raw, &settings, &directories)?;
        derivation.snapshot_id = Some(snapshot.id);
        Ok(derivation)
    }
}

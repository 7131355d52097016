use dashmap::DashMap;
use handlekit_concurrent::{SegmentQueue, ShardedMap, MAX_SHARDS};
use handlekit_core::{
    ConfigManager, Handle, HandleKitConfig, HandleKitError, Result, StructureKind,
};
use once_cell::sync::Lazy;
use rustc_hash::FxBuildHasher;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// A registered structure, tagged with its kind.
#[derive(Debug, Clone)]
pub enum Structure {
    Map(Arc<ShardedMap>),
    Queue(Arc<SegmentQueue>),
}

impl Structure {
    pub fn kind(&self) -> StructureKind {
        match self {
            Structure::Map(_) => StructureKind::Map,
            Structure::Queue(_) => StructureKind::Queue,
        }
    }
}

/// Table from opaque handles to the structures they own.
///
/// Handles come from a monotonically increasing counter, so a value is never issued
/// twice and never depends on allocation addresses. Entries are never removed; every
/// structure lives as long as the registry.
pub struct HandleRegistry {
    entries: DashMap<Handle, Structure, FxBuildHasher>,
    /// Next raw handle value to issue; starts at 1 so 0 stays invalid
    next: AtomicUsize,
    map_shards: usize,
}

impl HandleRegistry {
    /// Creates an empty registry whose maps use `map_shards` shards each, clamped to
    /// `1..=MAX_SHARDS` and rounded up to a power of two.
    pub fn new(map_shards: usize) -> Self {
        Self {
            entries: DashMap::with_hasher(FxBuildHasher),
            next: AtomicUsize::new(1),
            map_shards: map_shards.clamp(1, MAX_SHARDS).next_power_of_two(),
        }
    }

    pub fn from_config(config: &HandleKitConfig) -> Self {
        Self::new(config.map.effective_shard_count())
    }

    fn mint(&self) -> Result<Handle> {
        self.next
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_add(1))
            .map(Handle::from_raw)
            .map_err(|_| HandleKitError::HandlesExhausted)
    }

    /// Allocates a new empty structure of `kind` and returns its handle.
    pub fn create(&self, kind: StructureKind) -> Result<Handle> {
        let handle = self.mint()?;
        let structure = match kind {
            StructureKind::Map => Structure::Map(Arc::new(ShardedMap::with_shards(self.map_shards))),
            StructureKind::Queue => Structure::Queue(Arc::new(SegmentQueue::new())),
        };
        self.entries.insert(handle, structure);
        trace!(%handle, %kind, "registered structure");
        Ok(handle)
    }

    pub fn create_map(&self) -> Result<Handle> {
        self.create(StructureKind::Map)
    }

    pub fn create_queue(&self) -> Result<Handle> {
        self.create(StructureKind::Queue)
    }

    /// Looks up `handle` and checks that it refers to a structure of `expected` kind.
    pub fn resolve(&self, handle: Handle, expected: StructureKind) -> Result<Structure> {
        let structure = self
            .entries
            .get(&handle)
            .map(|entry| entry.value().clone())
            .ok_or(HandleKitError::InvalidHandle(handle))?;

        let actual = structure.kind();
        if actual != expected {
            return Err(HandleKitError::WrongKind {
                handle,
                expected,
                actual,
            });
        }
        Ok(structure)
    }

    pub fn map(&self, handle: Handle) -> Result<Arc<ShardedMap>> {
        match self.resolve(handle, StructureKind::Map)? {
            Structure::Map(map) => Ok(map),
            Structure::Queue(_) => Err(HandleKitError::WrongKind {
                handle,
                expected: StructureKind::Map,
                actual: StructureKind::Queue,
            }),
        }
    }

    pub fn queue(&self, handle: Handle) -> Result<Arc<SegmentQueue>> {
        match self.resolve(handle, StructureKind::Queue)? {
            Structure::Queue(queue) => Ok(queue),
            Structure::Map(_) => Err(HandleKitError::WrongKind {
                handle,
                expected: StructureKind::Queue,
                actual: StructureKind::Map,
            }),
        }
    }

    pub fn kind_of(&self, handle: Handle) -> Option<StructureKind> {
        self.entries.get(&handle).map(|entry| entry.value().kind())
    }

    /// Number of structures registered so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn map_shards(&self) -> usize {
        self.map_shards
    }
}

impl Default for HandleRegistry {
    fn default() -> Self {
        Self::from_config(&HandleKitConfig::default())
    }
}

impl std::fmt::Debug for HandleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandleRegistry")
            .field("structures", &self.len())
            .field("map_shards", &self.map_shards)
            .finish()
    }
}

static GLOBAL_REGISTRY: Lazy<HandleRegistry> = Lazy::new(|| {
    let config = match ConfigManager::load() {
        Ok(manager) => manager.config().clone(),
        Err(e) => {
            warn!("Invalid HandleKit configuration, using defaults: {}", e);
            HandleKitConfig::default()
        }
    };
    let registry = HandleRegistry::from_config(&config);
    debug!(map_shards = registry.map_shards(), "global handle registry ready");
    registry
});

/// The process-wide registry, built on first use.
pub fn global() -> &'static HandleRegistry {
    &GLOBAL_REGISTRY
}

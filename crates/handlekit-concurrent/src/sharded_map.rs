use crossbeam_utils::CachePadded;
use parking_lot::RwLock;
use rustc_hash::FxBuildHasher;
use std::collections::HashMap;
use std::hash::BuildHasher;

type Shard = HashMap<u64, u64, FxBuildHasher>;

/// Largest shard count a map will allocate.
pub const MAX_SHARDS: usize = 4096;

/// Concurrent `u64 -> u64` hash map partitioned into independently locked shards.
///
/// A key always lives in the shard selected by its hash, so operations on keys in
/// different shards never wait on each other. Each shard lock is held only for the
/// single bucket read or write, which makes every operation linearizable per key.
pub struct ShardedMap {
    /// Padded so neighbouring shard locks do not share a cache line
    shards: Box<[CachePadded<RwLock<Shard>>]>,
    /// `shards.len() - 1`; the shard count is always a power of two
    shard_mask: usize,
    hasher: FxBuildHasher,
}

impl ShardedMap {
    /// Creates a map with four shards per available CPU.
    pub fn new() -> Self {
        Self::with_shards(default_shard_count())
    }

    /// Creates a map with `shard_count` shards, clamped to `1..=MAX_SHARDS` and rounded
    /// up to a power of two.
    pub fn with_shards(shard_count: usize) -> Self {
        let shard_count = shard_count.clamp(1, MAX_SHARDS).next_power_of_two();
        let shards = (0..shard_count)
            .map(|_| CachePadded::new(RwLock::new(Shard::default())))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self {
            shards,
            shard_mask: shard_count - 1,
            hasher: FxBuildHasher,
        }
    }

    #[inline(always)]
    fn shard(&self, key: u64) -> &RwLock<Shard> {
        let idx = (self.hasher.hash_one(key) as usize) & self.shard_mask;
        &self.shards[idx]
    }

    /// Returns the value stored under `key`, if any.
    #[inline]
    pub fn get(&self, key: u64) -> Option<u64> {
        self.shard(key).read().get(&key).copied()
    }

    /// Stores `value` under `key`, overwriting any previous value, and returns the
    /// value now associated with `key`.
    #[inline]
    pub fn insert(&self, key: u64, value: u64) -> u64 {
        self.shard(key).write().insert(key, value);
        value
    }

    /// Stores `value` under `key` and returns the value it replaced.
    #[inline]
    pub fn replace(&self, key: u64, value: u64) -> Option<u64> {
        self.shard(key).write().insert(key, value)
    }

    pub fn contains_key(&self, key: u64) -> bool {
        self.shard(key).read().contains_key(&key)
    }

    /// Number of entries across all shards.
    ///
    /// Shards are visited one at a time, so under concurrent inserts the result is a
    /// lower bound of the final size rather than a snapshot.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.read().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|shard| shard.read().is_empty())
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }
}

impl Default for ShardedMap {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ShardedMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShardedMap")
            .field("shards", &self.shard_count())
            .field("len", &self.len())
            .finish()
    }
}

fn default_shard_count() -> usize {
    (num_cpus::get() * 4).next_power_of_two()
}

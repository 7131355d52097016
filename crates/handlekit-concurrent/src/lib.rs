//! Concurrent data structures over 64-bit integers
//!
//! - `sharded_map`: hash map split into independently locked shards
//! - `segment_queue`: unbounded lock-free MPMC FIFO built from linked segments

pub mod segment_queue;
pub mod sharded_map;

pub use segment_queue::SegmentQueue;
pub use sharded_map::{ShardedMap, MAX_SHARDS};

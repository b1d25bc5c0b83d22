//! # Hasher Module
//!
//! Content fingerprinting and bounded-concurrency hashing (§4.4, §4.5).
//!
//! `chunk` implements the live Chunk Hasher: a head+tail SHA-256 sampling
//! policy that is the sole basis for the Planner's content-duplicate
//! detection. `pool` fans that hasher out across a worker pool sized to
//! the machine. `perceptual` is an unwired prototype, never invoked from
//! `scan()`.

mod chunk;
mod perceptual;
mod pool;

pub use chunk::{fingerprint_file, Fingerprint, CHUNK_SIZE};
pub use pool::{hash_all, HashedFile};

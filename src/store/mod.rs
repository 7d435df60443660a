//! Store Module
//!
//! In-memory state the commands operate on.
//!
//! ## Responsibilities
//! - Flat key → value mapping (SET/GET)
//! - Hash key → (field → value) mapping (HSET/HGET/HGETALL)
//! - Concurrent readers, exclusive writers, per store
//!
//! ## Locking
//! Each store owns its own `RwLock`. The two stores are independent and are
//! never locked together, so there are no cross-store transactions.
//!
//! Keys, fields and values are opaque byte strings compared byte-for-byte.

mod strings;
mod hashes;

pub use strings::StringStore;
pub use hashes::HashStore;

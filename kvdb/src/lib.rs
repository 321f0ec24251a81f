//! Ordered key-value access on top of Redis.
//!
//! Redis can only look keys up exactly or walk them in no particular order
//! with `SCAN`. This crate keeps an in-memory ordered index of every key under
//! a namespace prefix, built from a full scan when the [`Backend`] opens and
//! updated on every successful write, so callers can iterate entries in key
//! order from any starting key.
//!
//! # Example
//!
//! ```no_run
//! use kvdb::Config;
//!
//! let db = kvdb::open_redis(&Config::new("redis://127.0.0.1:6379/"))?;
//! db.put("user:1", b"alice")?;
//! db.put("user:2", b"bob")?;
//!
//! for entry in db.find("user:") {
//!     let (key, value) = entry?;
//!     println!("{} = {}", key, String::from_utf8_lossy(&value));
//! }
//! # Ok::<(), kvdb::Error>(())
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod index;
pub mod iter;
pub mod memory;
pub mod redis_store;
pub mod store;

pub use backend::Backend;
pub use config::Config;
pub use error::{Error, Result};
pub use index::KeyIndex;
pub use iter::Iter;
pub use memory::MemoryStore;
pub use redis_store::RedisStore;
pub use store::{BoxedRemoteStore, RemoteStore, ScanCursor, ScanPage};

/// Connect to Redis and open a backend over it.
pub fn open_redis(config: &Config) -> Result<Backend<RedisStore>> {
    config.validate()?;
    let store = RedisStore::connect(config)?;
    Backend::open(store, config)
}

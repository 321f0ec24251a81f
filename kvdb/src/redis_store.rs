//! Redis-backed remote store.

use redis::{Client, Connection};
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::store::{RemoteStore, ScanCursor, ScanPage};

/// A remote store over a single synchronous Redis connection.
pub struct RedisStore {
    conn: Connection,
}

impl RedisStore {
    /// Connect to the Redis server named by the config and check it answers.
    pub fn connect(config: &Config) -> Result<Self> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| Error::InvalidConfig(format!("redis url {:?}: {}", config.url, e)))?;

        let conn = match config.connect_timeout() {
            Some(timeout) => client.get_connection_with_timeout(timeout),
            None => client.get_connection(),
        }
        .map_err(|e| Error::Connection(format!("redis dial failed: {}", e)))?;

        Self::from_connection(conn, config)
    }

    /// Wrap an established connection.
    pub fn from_connection(mut conn: Connection, config: &Config) -> Result<Self> {
        let timeout = config.io_timeout();
        conn.set_read_timeout(timeout)
            .and_then(|_| conn.set_write_timeout(timeout))
            .map_err(|e| Error::Connection(e.to_string()))?;

        let pong: String = redis::cmd("PING").query(&mut conn)?;
        debug!(reply = %pong, url = %config.url, "redis connected");

        Ok(Self { conn })
    }
}

impl RemoteStore for RedisStore {
    fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>> {
        let value: Option<Vec<u8>> = redis::cmd("GET").arg(key).query(&mut self.conn)?;
        Ok(value)
    }

    fn put(&mut self, key: &str, value: &[u8]) -> Result<()> {
        redis::cmd("SET").arg(key).arg(value).query::<()>(&mut self.conn)?;
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        redis::cmd("DEL").arg(key).query::<i64>(&mut self.conn)?;
        Ok(())
    }

    fn scan_page(&mut self, cursor: &ScanCursor, pattern: &str, count: usize) -> Result<ScanPage> {
        let (next, keys): (String, Vec<String>) = redis::cmd("SCAN")
            .arg(cursor.as_str())
            .arg("MATCH")
            .arg(pattern)
            .arg("COUNT")
            .arg(count)
            .query(&mut self.conn)?;
        Ok(ScanPage {
            cursor: ScanCursor::new(next),
            keys,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Option<Config> {
        std::env::var("KVDB_TEST_REDIS_URL")
            .ok()
            .map(|url| Config::new(url).with_prefix("_KVDB_TEST_"))
    }

    #[test]
    fn test_bad_url() {
        let err = RedisStore::connect(&Config::new("not a url")).err().unwrap();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    #[ignore = "requires KVDB_TEST_REDIS_URL"]
    fn test_redis_round_trip() {
        let cfg = test_config().expect("KVDB_TEST_REDIS_URL not set");
        let mut store = RedisStore::connect(&cfg).unwrap();

        let key = format!("{}round_trip", cfg.prefix);
        store.put(&key, b"value1").unwrap();
        assert_eq!(store.get(&key).unwrap(), Some(b"value1".to_vec()));

        let mut cursor = ScanCursor::start();
        let mut seen = false;
        loop {
            let page = store.scan_page(&cursor, &cfg.match_pattern(), 100).unwrap();
            seen |= page.keys.contains(&key);
            if store.is_complete(&page.cursor) {
                break;
            }
            cursor = page.cursor;
        }
        assert!(seen);

        store.delete(&key).unwrap();
        assert_eq!(store.get(&key).unwrap(), None);
    }
}

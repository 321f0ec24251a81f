//! Command implementations.

use anyhow::Context as _;
use serde_json::json;
use tracing::debug;

use kvdb::{Backend, Config, RedisStore};

use crate::{Cli, Commands};

/// Builds the effective config: file first, then flag overrides.
pub fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut cfg = match &cli.config {
        Some(path) => Config::from_file(path).with_context(|| format!("loading {}", path))?,
        None => Config::default(),
    };
    if let Some(url) = &cli.url {
        cfg.url = url.clone();
    }
    if let Some(prefix) = &cli.prefix {
        cfg.prefix = prefix.clone();
    }
    if let Some(size) = cli.page_size {
        cfg.scan_page_size = size;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn open(cli: &Cli) -> anyhow::Result<Backend<RedisStore>> {
    let cfg = load_config(cli)?;
    debug!(url = %cfg.url, prefix = %cfg.prefix, "opening backend");
    kvdb::open_redis(&cfg).with_context(|| format!("opening {}", cfg.url))
}

pub fn run(cli: &Cli) -> anyhow::Result<()> {
    let db = open(cli)?;

    match &cli.command {
        Commands::Get { key } => match db.get(key)? {
            Some(value) => print_entry(cli, key, Some(&value)),
            None => anyhow::bail!("key '{}' not found", key),
        },
        Commands::Put { key, value } => {
            db.put(key, value.as_bytes())?;
        }
        Commands::Del { key } => {
            db.delete(key)?;
        }
        Commands::Find {
            start,
            limit,
            keys_only,
        } => {
            let limit = limit.unwrap_or(usize::MAX);
            if *keys_only {
                for key in db.keys_from(start).take(limit) {
                    print_entry(cli, &key, None);
                }
            } else {
                for entry in db.find(start).take(limit) {
                    let (key, value) = entry?;
                    print_entry(cli, &key, Some(&value));
                }
            }
        }
        Commands::Count => {
            if cli.json {
                println!("{}", json!({ "count": db.key_count() }));
            } else {
                println!("{}", db.key_count());
            }
        }
    }

    db.close();
    Ok(())
}

fn print_entry(cli: &Cli, key: &str, value: Option<&[u8]>) {
    let value = value.map(String::from_utf8_lossy);
    if cli.json {
        println!("{}", json!({ "key": key, "value": value }));
        return;
    }
    match value {
        Some(v) => println!("{}\t{}", key, v),
        None => println!("{}", key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::parse_from([
            "kvdb",
            "--url",
            "redis://db:6390/",
            "--prefix",
            "app:",
            "--page-size",
            "7",
            "count",
        ]);
        let cfg = load_config(&cli).unwrap();
        assert_eq!(cfg.url, "redis://db:6390/");
        assert_eq!(cfg.prefix, "app:");
        assert_eq!(cfg.scan_page_size, 7);
    }

    #[test]
    fn test_invalid_flags_rejected() {
        let cli = Cli::parse_from(["kvdb", "--page-size", "0", "count"]);
        assert!(load_config(&cli).is_err());
    }

    #[test]
    fn test_find_defaults() {
        let cli = Cli::parse_from(["kvdb", "find"]);
        match cli.command {
            Commands::Find {
                start,
                limit,
                keys_only,
            } => {
                assert_eq!(start, "");
                assert_eq!(limit, None);
                assert!(!keys_only);
            }
            _ => panic!("expected find"),
        }
    }
}

//! Shared start-up for the kbase binaries.

use std::path::PathBuf;

use kbase_core::config::{Config, RetrievalSettings};
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins; otherwise info for the kbase crates and warnings elsewhere.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,kbase=info,kbase_core=info,kbase_hybrid=info,kbase_embed=info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init();
}

/// Settings from `config.toml` + env, with relative paths resolved against the
/// working directory.
pub fn load_settings() -> anyhow::Result<(RetrievalSettings, PathBuf)> {
    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {e:#}");
        e
    })?;
    let base = std::env::current_dir()?;
    Ok((config.retrieval()?, base))
}

/// Value following `flag` in `args`, parsed.
pub fn flag_value<T: std::str::FromStr>(args: &[String], flag: &str) -> anyhow::Result<Option<T>> {
    match args.iter().position(|a| a == flag) {
        None => Ok(None),
        Some(i) => {
            let raw = args.get(i + 1).ok_or_else(|| anyhow::anyhow!("{flag} requires a value"))?;
            raw.parse::<T>().map(Some).map_err(|_| anyhow::anyhow!("{flag}: cannot parse '{raw}'"))
        }
    }
}

/// Positional (non-flag) arguments, skipping the values of `value_flags`.
pub fn positional(args: &[String], value_flags: &[&str]) -> Vec<String> {
    let mut out = Vec::new();
    let mut skip = false;
    for a in args {
        if skip {
            skip = false;
        } else if value_flags.contains(&a.as_str()) {
            skip = true;
        } else if !a.starts_with("--") {
            out.push(a.clone());
        }
    }
    out
}

//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars.
//! Provides helpers to expand `~` and `${VAR}` and to resolve relative paths
//! against a known base directory.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::corpus::DEFAULT_STORE_LABEL;
use crate::error::Error;

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new()
            .merge(Serialized::defaults(Defaults::default()))
            .merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.validate()?;
        Ok(config)
    }

    /// Build from an explicit figment; used by tests and embedders of the crate.
    pub fn from_figment(figment: Figment) -> Self {
        Self { figment: Figment::new().merge(Serialized::defaults(Defaults::default())).merge(figment) }
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    pub fn retrieval(&self) -> anyhow::Result<RetrievalSettings> {
        self.get("retrieval")
    }

    fn validate(&self) -> anyhow::Result<()> {
        let settings = self.retrieval()?;
        if !(0.0..=1.5).contains(&settings.min_score) {
            return Err(Error::InvalidConfig(format!(
                "retrieval.min_score must be within 0.0..=1.5, got {}",
                settings.min_score
            ))
            .into());
        }
        if settings.batch_size == 0 {
            return Err(Error::InvalidConfig("retrieval.batch_size must be > 0".into()).into());
        }
        Ok(())
    }
}

#[derive(Debug, Default, Serialize)]
struct Defaults {
    retrieval: RetrievalSettings,
}

/// `[retrieval]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrievalSettings {
    pub knowledge_base_path: String,
    pub index_dir: String,
    pub model_name: String,
    /// Local directory with `tokenizer.json`, `config.json` and weights.
    pub model_dir: Option<String>,
    pub store_label: String,
    pub top_k: usize,
    pub min_score: f32,
    pub batch_size: usize,
    pub use_fake_embeddings: bool,
    pub fake_dim: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            knowledge_base_path: "data/knowledge_base.json".to_string(),
            index_dir: "data/embeddings_v2".to_string(),
            model_name: "intfloat/multilingual-e5-base".to_string(),
            model_dir: None,
            store_label: DEFAULT_STORE_LABEL.to_string(),
            top_k: 7,
            min_score: 0.30,
            batch_size: 32,
            use_fake_embeddings: false,
            fake_dim: 384,
        }
    }
}

impl RetrievalSettings {
    pub fn knowledge_base_path(&self, base: &Path) -> PathBuf {
        resolve_with_base(base, &self.knowledge_base_path)
    }

    pub fn index_dir(&self, base: &Path) -> PathBuf {
        resolve_with_base(base, &self.index_dir)
    }

    pub fn model_dir(&self, base: &Path) -> Option<PathBuf> {
        self.model_dir.as_ref().map(|d| resolve_with_base(base, d))
    }
}

/// `~` plus `$VAR` / `${VAR}` expansion. If a variable is unset only the
/// tilde is expanded.
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let raw = input.as_ref();
    match shellexpand::full(raw) {
        Ok(expanded) => PathBuf::from(expanded.into_owned()),
        Err(_) => PathBuf::from(shellexpand::tilde(raw).into_owned()),
    }
}

/// Absolute paths pass through; relative ones are joined onto `base`.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    match expand_path(p) {
        path if path.is_absolute() => path,
        relative => base.join(relative),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::providers::Toml;

    #[test]
    fn retrieval_defaults_fill_missing_keys() {
        let cfg = Config::from_figment(Figment::from(Toml::string(
            "[retrieval]\ntop_k = 3\nuse_fake_embeddings = true\n",
        )));
        let s = cfg.retrieval().unwrap();
        assert_eq!(s.top_k, 3);
        assert!(s.use_fake_embeddings);
        assert_eq!(s.model_name, "intfloat/multilingual-e5-base");
        assert!((s.min_score - 0.30).abs() < 1e-6);
    }

    #[test]
    fn unset_variables_leave_the_path_alone() {
        let p = expand_path("$KBASE_SURELY_UNSET_VAR/kb.json");
        assert_eq!(p, PathBuf::from("$KBASE_SURELY_UNSET_VAR/kb.json"));
    }

    #[test]
    fn relative_paths_resolve_against_base() {
        let s = RetrievalSettings::default();
        let base = Path::new("/srv/bot");
        assert_eq!(s.index_dir(base), PathBuf::from("/srv/bot/data/embeddings_v2"));
        assert_eq!(resolve_with_base(base, "/abs/kb.json"), PathBuf::from("/abs/kb.json"));
    }
}

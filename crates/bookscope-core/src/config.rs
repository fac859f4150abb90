use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::aggregate::{Aggregator, DEFAULT_THRESHOLD_RATIO, DedupPolicy};
use crate::error::{CoreError, Result};
use crate::models::SourceTag;
use crate::scoring::{ScoreWeights, Scorer};

/// Root application configuration, loaded from `~/.config/bookscope/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub search: SearchConfig,
    pub autocomplete: AutocompleteConfig,
    pub sources: SourcesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Source receiving the small tie-break bonus; `"none"` disables it.
    #[serde(with = "source_preference")]
    pub preferred_source: Option<SourceTag>,
    pub threshold_ratio: f64,
    pub dedup: DedupPolicy,
    pub google_limit: usize,
    pub naver_limit: usize,
    pub weights: ScoreWeights,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutocompleteConfig {
    pub min_query_chars: usize,
    pub debounce_ms: u64,
    pub per_source_limit: usize,
    pub max_suggestions: usize,
    pub dedup: DedupPolicy,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub google: GoogleConfig,
    pub naver: NaverConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    pub enabled: bool,
    pub base_url: String,
    /// Environment variable holding an optional API key.
    pub api_key_env: String,
    pub min_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NaverConfig {
    pub enabled: bool,
    pub base_url: String,
    pub client_id_env: String,
    pub client_secret_env: String,
    pub min_interval_ms: u64,
}

/// `Option<SourceTag>` as a plain string, with `"none"` for no preference.
mod source_preference {
    use serde::{Deserialize, Deserializer, Serializer, de};

    use crate::models::SourceTag;

    pub fn serialize<S: Serializer>(value: &Option<SourceTag>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(value.map_or("none", |tag| tag.as_str()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<SourceTag>, D::Error> {
        let raw = String::deserialize(d)?;
        if raw.trim().eq_ignore_ascii_case("none") {
            return Ok(None);
        }
        raw.parse().map(Some).map_err(de::Error::custom)
    }
}

// ─── Defaults ──────────────────────────────────────────────

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            preferred_source: Some(SourceTag::Google),
            threshold_ratio: DEFAULT_THRESHOLD_RATIO,
            dedup: DedupPolicy::HighestScore,
            google_limit: 40,
            naver_limit: 20,
            weights: ScoreWeights::default(),
        }
    }
}

impl Default for AutocompleteConfig {
    fn default() -> Self {
        Self {
            min_query_chars: 2,
            debounce_ms: 250,
            per_source_limit: 6,
            max_suggestions: 8,
            dedup: DedupPolicy::HighestScore,
        }
    }
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://www.googleapis.com/books/v1".to_string(),
            api_key_env: "GOOGLE_BOOKS_API_KEY".to_string(),
            min_interval_ms: 100,
        }
    }
}

impl Default for NaverConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://openapi.naver.com".to_string(),
            client_id_env: "NAVER_CLIENT_ID".to_string(),
            client_secret_env: "NAVER_CLIENT_SECRET".to_string(),
            min_interval_ms: 100,
        }
    }
}

// ─── Derived components ────────────────────────────────────

impl SearchConfig {
    pub fn scorer(&self) -> Scorer {
        Scorer::new(self.preferred_source).with_weights(self.weights)
    }

    pub fn aggregator(&self) -> Aggregator {
        Aggregator::new(self.scorer())
            .with_threshold_ratio(self.threshold_ratio)
            .with_dedup(self.dedup)
    }

    pub fn limit_for(&self, source: SourceTag) -> usize {
        match source {
            SourceTag::Google => self.google_limit,
            SourceTag::Naver => self.naver_limit,
        }
    }
}

// ─── Load / Save ───────────────────────────────────────────

impl AppConfig {
    /// Standard config file path: `~/.config/bookscope/config.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("BOOKSCOPE_CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("bookscope")
            .join("config.toml")
    }

    /// Load config from disk, falling back to defaults if file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        Self::load_from(&path)
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.search.threshold_ratio) {
            return Err(CoreError::ConfigError(format!(
                "search.threshold_ratio must be within 0..=1, got {}",
                self.search.threshold_ratio
            )));
        }
        if self.autocomplete.max_suggestions == 0 {
            return Err(CoreError::ConfigError(
                "autocomplete.max_suggestions must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

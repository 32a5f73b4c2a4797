use std::collections::BTreeMap;

use anyhow::Result;
use config::Config;
use serde::Deserialize;

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub sources: SourcesConfig,
    pub output: OutputConfig,
    pub generation: GenerationConfig,
    #[serde(default)]
    pub seasons: SeasonTable,
    pub logging: LoggingConfig,
}

/// Locations of the declarative inputs.
#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    /// YAML file listing recurring event definitions.
    pub recurring: String,
    /// YAML file listing external calendar declarations.
    pub external: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    /// Number of days after today covered by the generation window.
    pub lookahead_days: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// ## Summary
/// Immutable mapping from season names to the months they cover.
///
/// Names are stored lowercase and looked up case-insensitively. The
/// default table covers spring, summer, fall/autumn and winter; the
/// configuration can override any entry or add new ones.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "BTreeMap<String, Vec<u8>>")]
pub struct SeasonTable {
    seasons: BTreeMap<String, Vec<u8>>,
}

impl SeasonTable {
    /// Builds a table from `(name, months)` pairs.
    #[must_use]
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<u8>)>,
        S: AsRef<str>,
    {
        Self {
            seasons: entries
                .into_iter()
                .map(|(name, months)| (name.as_ref().to_ascii_lowercase(), months))
                .collect(),
        }
    }

    /// Returns the months covered by `name`, if the season is known.
    #[must_use]
    pub fn months(&self, name: &str) -> Option<&[u8]> {
        self.seasons
            .get(&name.trim().to_ascii_lowercase())
            .map(Vec::as_slice)
    }

    /// ## Summary
    /// Checks that every season covers at least one month and that all
    /// months are within 1-12.
    ///
    /// ## Errors
    /// Returns `CoreError::ValidationError` naming the first offending season.
    pub fn validate(&self) -> CoreResult<()> {
        for (name, months) in &self.seasons {
            if months.is_empty() {
                return Err(CoreError::ValidationError(format!(
                    "season '{name}' covers no months"
                )));
            }
            if let Some(month) = months.iter().find(|m| !(1..=12).contains(*m)) {
                return Err(CoreError::ValidationError(format!(
                    "season '{name}' has invalid month {month}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for SeasonTable {
    fn default() -> Self {
        Self::new([
            ("spring", vec![3, 4, 5]),
            ("summer", vec![6, 7, 8, 9]),
            ("fall", vec![10, 11]),
            ("autumn", vec![10, 11]),
            ("winter", vec![12, 1, 2]),
        ])
    }
}

impl From<BTreeMap<String, Vec<u8>>> for SeasonTable {
    fn from(overrides: BTreeMap<String, Vec<u8>>) -> Self {
        let mut table = Self::default();
        for (name, months) in overrides {
            table.seasons.insert(name.to_ascii_lowercase(), months);
        }
        table
    }
}

impl Settings {
    /// ## Summary
    /// Loads configuration from `.env` file and environment variables into a `Settings`.
    /// Environment variables take precedence over `config.toml` values.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        Ok(Config::builder()
            .set_default("sources.recurring", "recurring.yaml")?
            .set_default("output.dir", "output")?
            .set_default("generation.lookahead_days", 90)?
            .set_default("logging.level", "debug")?
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            // Environment, e.g. CALRIPPER_GENERATION__LOOKAHEAD_DAYS
            .add_source(
                config::Environment::with_prefix("CALRIPPER")
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?)
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    if let Err(err) = dotenvy::dotenv() {
        tracing::trace!(error = %err, "No .env file loaded");
    }

    Settings::load()
}

//! Configuration for the sitepeek pipeline.
//!
//! Settings are stored in TOML and every field has a default, so a partial file
//! (or none at all) is valid.
//!
//! ## Configuration Hierarchy
//!
//! 1. **Defaults**: [`Config::default`]
//! 2. **Config file**: `config.toml` in the platform config directory, or an
//!    explicit path passed to [`Config::load_from`]
//! 3. **Environment variables**: `SITEPEEK_*` overrides applied by [`Config::apply_env`]
//!
//! ## Example Configuration File
//!
//! ```toml
//! [fetch]
//! page_timeout_secs = 15
//! page_max_bytes = 5242880
//!
//! [analysis]
//! enrich_stylesheets = true
//! max_enrichment_stylesheets = 5
//!
//! [bundle]
//! concurrency = 6
//! caps = { css = 20, js = 20, images = 30, others = 10 }
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::fetcher::FetchLimits;
use crate::types::AssetCategory;

/// Browser-like user agent; some sites refuse obvious bots.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Upper bound for [`BundleConfig::concurrency`].
pub const MAX_BUNDLE_CONCURRENCY: usize = 32;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Outbound request settings
    pub fetch: FetchConfig,
    /// Page analysis settings
    pub analysis: AnalysisConfig,
    /// Bundle settings
    pub bundle: BundleConfig,
}

/// Outbound request settings shared by page and asset fetches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
    /// Timeout for the page fetch of an analysis.
    pub page_timeout_secs: u64,
    /// Byte ceiling for the page body.
    pub page_max_bytes: usize,
    /// Timeout for each asset fetch (enrichment, bundling, single download).
    pub asset_timeout_secs: u64,
    /// Byte ceiling for each asset body.
    pub asset_max_bytes: usize,
    /// Maximum redirects followed per request.
    pub max_redirects: usize,
}

/// Settings for the analysis pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Outer deadline for one whole analysis.
    pub deadline_secs: u64,
    /// Whether to fetch linked stylesheets to find more colors and fonts.
    pub enrich_stylesheets: bool,
    /// How many of the discovered stylesheets may be fetched for enrichment.
    pub max_enrichment_stylesheets: usize,
    /// How many colors a presentation layer should show.
    pub palette_size: usize,
}

/// Settings for bundle building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleConfig {
    /// Per-category limits on how many assets are fetched.
    pub caps: BundleCaps,
    /// Maximum number of concurrent asset fetches.
    pub concurrency: usize,
    /// Outer deadline for one bundle; entries collected so far are kept.
    pub deadline_secs: u64,
}

/// Per-category limits applied when selecting assets for a bundle.
///
/// Assets are taken in extraction order; anything beyond the cap is not fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BundleCaps {
    /// Stylesheets
    pub css: usize,
    /// Scripts
    pub js: usize,
    /// Images
    pub images: usize,
    /// Fonts, media and documents
    pub others: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            page_timeout_secs: 15,
            page_max_bytes: 5 * 1024 * 1024,
            asset_timeout_secs: 10,
            asset_max_bytes: 10 * 1024 * 1024,
            max_redirects: 5,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            deadline_secs: 30,
            enrich_stylesheets: true,
            max_enrichment_stylesheets: 5,
            palette_size: 24,
        }
    }
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            caps: BundleCaps::default(),
            concurrency: 6,
            deadline_secs: 120,
        }
    }
}

impl Default for BundleCaps {
    fn default() -> Self {
        Self {
            css: 20,
            js: 20,
            images: 30,
            others: 10,
        }
    }
}

impl BundleCaps {
    /// The cap for one category.
    #[must_use]
    pub const fn get(&self, category: AssetCategory) -> usize {
        match category {
            AssetCategory::Css => self.css,
            AssetCategory::Js => self.js,
            AssetCategory::Image => self.images,
            AssetCategory::Other => self.others,
        }
    }
}

impl FetchConfig {
    /// Limits for the page fetch of an analysis.
    #[must_use]
    pub const fn page_limits(&self) -> FetchLimits {
        FetchLimits::new(
            Duration::from_secs(self.page_timeout_secs),
            self.page_max_bytes,
        )
    }

    /// Limits for an individual asset fetch.
    #[must_use]
    pub const fn asset_limits(&self) -> FetchLimits {
        FetchLimits::new(
            Duration::from_secs(self.asset_timeout_secs),
            self.asset_max_bytes,
        )
    }
}

impl AnalysisConfig {
    /// Outer deadline as a [`Duration`].
    #[must_use]
    pub const fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }
}

impl BundleConfig {
    /// Concurrency clamped to `1..=MAX_BUNDLE_CONCURRENCY`.
    #[must_use]
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.clamp(1, MAX_BUNDLE_CONCURRENCY)
    }

    /// Outer deadline as a [`Duration`].
    #[must_use]
    pub const fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }
}

impl Config {
    /// Load configuration from the default location, or defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid TOML.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config {}: {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Serialize configuration to pretty TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Where [`Config::load`] looks for `config.toml`.
    ///
    /// - Linux: `~/.config/sitepeek/config.toml`
    /// - macOS: `~/Library/Application Support/dev.sitepeek.sitepeek/config.toml`
    /// - Windows: `%APPDATA%\sitepeek\sitepeek\config\config.toml`
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "sitepeek", "sitepeek")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Apply `SITEPEEK_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply `SITEPEEK_*` overrides using a custom lookup (used by tests).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the variable when a value does not parse.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(agent) = lookup("SITEPEEK_USER_AGENT") {
            self.fetch.user_agent = agent;
        }
        override_number(&lookup, "SITEPEEK_PAGE_TIMEOUT_SECS", &mut self.fetch.page_timeout_secs)?;
        override_number(&lookup, "SITEPEEK_PAGE_MAX_BYTES", &mut self.fetch.page_max_bytes)?;
        override_number(&lookup, "SITEPEEK_ASSET_TIMEOUT_SECS", &mut self.fetch.asset_timeout_secs)?;
        override_number(&lookup, "SITEPEEK_ASSET_MAX_BYTES", &mut self.fetch.asset_max_bytes)?;
        override_number(&lookup, "SITEPEEK_ANALYSIS_DEADLINE_SECS", &mut self.analysis.deadline_secs)?;
        override_number(&lookup, "SITEPEEK_BUNDLE_CONCURRENCY", &mut self.bundle.concurrency)?;
        override_number(&lookup, "SITEPEEK_BUNDLE_DEADLINE_SECS", &mut self.bundle.deadline_secs)?;
        if let Some(raw) = lookup("SITEPEEK_ENRICH_STYLESHEETS") {
            self.analysis.enrich_stylesheets = parse_bool("SITEPEEK_ENRICH_STYLESHEETS", &raw)?;
        }
        Ok(())
    }
}

fn override_number<F, T>(lookup: &F, key: &str, slot: &mut T) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    if let Some(raw) = lookup(key) {
        *slot = raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{key} must be a non-negative integer, got '{raw}'")))?;
    }
    Ok(())
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::Config(format!("{key} must be a boolean, got '{raw}'"))),
    }
}

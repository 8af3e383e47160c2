//! Service configuration.
//!
//! Values come from built-in defaults, then an optional RON file, then
//! `MD2DRAFT_*` environment variables (a `.env` file is honoured).

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use draft_engine::{
    EngineSettings, FetchSettings, PlatformSettings, RenderSettings, DEFAULT_PLATFORM_BASE_URL,
    DEFAULT_RENDER_BASE_URL,
};
use draft_logging::{LogDestination, LogSettings};
use serde::Deserialize;

const CONFIG_PATH_VAR: &str = "MD2DRAFT_CONFIG";
const DEFAULT_CONFIG_PATHS: [&str; 2] = ["./configs/md2draft.ron", "./md2draft.ron"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Debug,
    Release,
    Test,
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "release" => Ok(Self::Release),
            "test" => Ok(Self::Test),
            other => Err(format!("unknown mode `{other}`")),
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunMode::Debug => "debug",
            RunMode::Release => "release",
            RunMode::Test => "test",
        };
        f.write_str(name)
    }
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub base_url: String,
    /// Used when a request carries no key of its own.
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_RENDER_BASE_URL.to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

impl fmt::Debug for RenderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub base_url: String,
    /// Applies to platform calls and cover image downloads.
    pub timeout_secs: u64,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PLATFORM_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub port: u16,
    pub mode: RunMode,
    pub log: LogSettings,
    pub render: RenderConfig,
    pub platform: PlatformConfig,
    /// Cover scratch directory; the OS temp dir when unset.
    pub scratch_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            mode: RunMode::Debug,
            log: LogSettings::default(),
            render: RenderConfig::default(),
            platform: PlatformConfig::default(),
            scratch_dir: None,
        }
    }
}

impl AppConfig {
    /// Load from the process environment and the default file locations.
    pub fn load() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenvy::dotenv();

        let explicit = std::env::var(CONFIG_PATH_VAR).ok().map(PathBuf::from);
        let file = match explicit {
            Some(path) => Some(path),
            None => DEFAULT_CONFIG_PATHS
                .iter()
                .map(PathBuf::from)
                .find(|path| path.is_file()),
        };
        Self::from_sources(file.as_deref(), |name| std::env::var(name).ok())
    }

    /// Build a configuration from an optional RON file plus a variable
    /// lookup. A named file that does not exist is skipped.
    pub fn from_sources<F>(file: Option<&Path>, var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match file {
            Some(path) if path.exists() => Self::from_file(path)?,
            _ => Self::default(),
        };
        config.apply_overrides(var)?;
        config.check()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        ron::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    fn apply_overrides<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| var(name).filter(|value| !value.trim().is_empty());

        if let Some(port) = get("MD2DRAFT_PORT") {
            self.port = port
                .trim()
                .parse()
                .context("MD2DRAFT_PORT must be a valid port number")?;
        }
        if let Some(mode) = get("MD2DRAFT_MODE") {
            self.mode = mode
                .parse::<RunMode>()
                .map_err(anyhow::Error::msg)
                .context("MD2DRAFT_MODE must be debug, release or test")?;
        }
        if let Some(level) = get("MD2DRAFT_LOG_LEVEL") {
            self.log.level = level.trim().to_string();
        }
        if let Some(destination) = get("MD2DRAFT_LOG_DESTINATION") {
            self.log.destination = destination
                .parse::<LogDestination>()
                .map_err(anyhow::Error::msg)
                .context("MD2DRAFT_LOG_DESTINATION must be terminal, file or both")?;
        }
        if let Some(file) = get("MD2DRAFT_LOG_FILE") {
            self.log.file = Some(PathBuf::from(file));
        }
        if let Some(base_url) = get("MD2DRAFT_RENDER_BASE_URL") {
            self.render.base_url = base_url;
        }
        if let Some(api_key) = get("MD2DRAFT_RENDER_API_KEY") {
            self.render.api_key = Some(api_key);
        }
        if let Some(secs) = get("MD2DRAFT_RENDER_TIMEOUT_SECS") {
            self.render.timeout_secs = secs
                .trim()
                .parse()
                .context("MD2DRAFT_RENDER_TIMEOUT_SECS must be a whole number of seconds")?;
        }
        if let Some(base_url) = get("MD2DRAFT_PLATFORM_BASE_URL") {
            self.platform.base_url = base_url;
        }
        if let Some(secs) = get("MD2DRAFT_PLATFORM_TIMEOUT_SECS") {
            self.platform.timeout_secs = secs
                .trim()
                .parse()
                .context("MD2DRAFT_PLATFORM_TIMEOUT_SECS must be a whole number of seconds")?;
        }
        if let Some(dir) = get("MD2DRAFT_SCRATCH_DIR") {
            self.scratch_dir = Some(PathBuf::from(dir));
        }
        Ok(())
    }

    fn check(&self) -> Result<()> {
        if self.render.timeout_secs == 0 {
            bail!("render timeout must be at least one second");
        }
        if self.platform.timeout_secs == 0 {
            bail!("platform timeout must be at least one second");
        }
        Ok(())
    }

    /// The configured rendering key, ignoring blank values.
    pub fn render_api_key(&self) -> Option<String> {
        self.render
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
    }

    pub fn engine_settings(&self) -> EngineSettings {
        let platform_timeout = Duration::from_secs(self.platform.timeout_secs);
        EngineSettings {
            render: RenderSettings {
                base_url: self.render.base_url.clone(),
                request_timeout: Duration::from_secs(self.render.timeout_secs),
            },
            platform: PlatformSettings {
                base_url: self.platform.base_url.clone(),
                request_timeout: platform_timeout,
            },
            fetch: FetchSettings {
                request_timeout: platform_timeout,
                ..FetchSettings::default()
            },
            scratch_dir: self.scratch_dir.clone(),
        }
    }
}

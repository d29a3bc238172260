use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::utils::app_paths::AppPaths;

/// Public catalog queried when nothing else is configured
pub const DEFAULT_ENDPOINT: &str = "https://rickandmortyapi.com/api/character";

/// Environment variable that overrides `api.endpoint`
pub const ENDPOINT_ENV: &str = "CATALOG_API_URL";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub display: DisplayConfig,
    pub behavior: BehaviorConfig,
    pub messages: MessagesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Character listing endpoint; searches append `/?name=`
    pub endpoint: String,

    pub user_agent: String,

    /// Request timeout. Unset means requests wait indefinitely
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Use Unicode glyphs for icons
    pub use_glyphs: bool,

    /// Show row numbers in the character list
    pub show_row_numbers: bool,

    pub icons: IconConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IconConfig {
    pub loading: String,
    pub error: String,
    pub success: String,
    pub info: String,
    pub alive: String,
    pub dead: String,
    pub unknown: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Fetch the full listing as soon as the view opens
    pub load_on_start: bool,
}

/// User-facing failure texts; the three must stay distinguishable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagesConfig {
    pub load_failed: String,
    pub search_not_found: String,
    pub search_failed: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: format!("catalog-cli/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: None,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            use_glyphs: true,
            show_row_numbers: false,
            icons: IconConfig::default(),
        }
    }
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            loading: "⏳".to_string(),
            error: "❌".to_string(),
            success: "✅".to_string(),
            info: "ℹ️".to_string(),
            alive: "●".to_string(),
            dead: "✝".to_string(),
            unknown: "?".to_string(),
        }
    }
}

impl IconConfig {
    /// ASCII alternatives for terminals without glyph support
    pub fn simple() -> Self {
        Self {
            loading: "[..]".to_string(),
            error: "[X]".to_string(),
            success: "[OK]".to_string(),
            info: "[i]".to_string(),
            alive: "+".to_string(),
            dead: "x".to_string(),
            unknown: "?".to_string(),
        }
    }

    /// Icon for a character's life status as reported by the catalog
    pub fn for_status(&self, status: &str) -> &str {
        match status.to_ascii_lowercase().as_str() {
            "alive" => self.alive.as_str(),
            "dead" => self.dead.as_str(),
            _ => self.unknown.as_str(),
        }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            load_on_start: true,
        }
    }
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            load_failed: "Could not load characters. Please try again later.".to_string(),
            search_not_found: "No characters match that search term.".to_string(),
            search_failed: "Error searching characters. Please try again later.".to_string(),
        }
    }
}

impl Config {
    /// Load config from the default location, creating it on first run
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            let default_config = Self::default();
            default_config.save_to(&config_path)?;
            return Ok(default_config);
        }

        Self::load_from(&config_path)
    }

    /// Load config from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;

        if !config.display.use_glyphs {
            config.display.icons = IconConfig::simple();
        }

        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        Ok(())
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        AppPaths::config_file()
    }

    /// Apply `CATALOG_API_URL` if it is set and non-empty
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(ENDPOINT_ENV) {
            if !url.trim().is_empty() {
                self.api.endpoint = url.trim().to_string();
            }
        }
        self
    }

    /// Create a default config file with comments
    pub fn create_default_with_comments() -> String {
        format!(
            r#"# Catalog CLI Configuration File
# Location: ~/.config/catalog-cli/config.toml (Linux)
#           ~/Library/Application Support/catalog-cli/config.toml (macOS)
#           %APPDATA%\catalog-cli\config.toml (Windows)

[api]
# Character listing endpoint. Searches request "<endpoint>/?name=<term>".
# The CATALOG_API_URL environment variable overrides this value.
endpoint = "{DEFAULT_ENDPOINT}"

user_agent = "catalog-cli/{version}"

# Give up on a request after this many seconds (no timeout when unset)
# timeout_secs = 10

[display]
# Set to false for ASCII-only icons
use_glyphs = true

# Show row numbers in the character list
show_row_numbers = false

[behavior]
# Fetch the full listing when the list view opens
load_on_start = true

[messages]
load_failed = "Could not load characters. Please try again later."
search_not_found = "No characters match that search term."
search_failed = "Error searching characters. Please try again later."
"#,
            version = env!("CARGO_PKG_VERSION"),
        )
    }
}

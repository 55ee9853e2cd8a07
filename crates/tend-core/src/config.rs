//! Configuration types for Tend.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use crate::{Dimensions, Error};

/// Application configuration loaded from a YAML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Shell process settings
    pub shell: ShellSettings,
    /// Host supervisor process settings
    pub host: HostSettings,
    /// Terminal pane settings
    pub terminal: TerminalSettings,
    /// Transport settings
    pub transport: TransportSettings,
    /// Pages that can hold terminals
    pub pages: Pages,
}

impl AppConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    pub fn from_yaml(yaml: &str) -> crate::Result<Self> {
        let config: AppConfig =
            serde_yaml::from_str(yaml).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> crate::Result<()> {
        if self.host.command.trim().is_empty() {
            return Err(Error::Config("host.command cannot be empty".to_string()));
        }

        if self.terminal.cols == 0 || self.terminal.rows == 0 {
            return Err(Error::Config("terminal dimensions must be > 0".to_string()));
        }

        if self.terminal.scrollback_lines == 0 {
            return Err(Error::Config(
                "terminal.scrollback_lines must be > 0".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for (i, page) in self.pages.0.iter().enumerate() {
            page.validate(i)?;
            if !seen.insert(page.key.as_str()) {
                return Err(Error::Config(format!(
                    "duplicate page key '{}'",
                    page.key
                )));
            }
        }

        Ok(())
    }
}

/// Shell process settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellSettings {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Host supervisor settings.
///
/// The host is an external program speaking the JSON-lines protocol on its
/// stdin and stdout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostSettings {
    /// Host executable
    pub command: String,
    /// Host arguments
    pub args: Vec<String>,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            command: "tend-host".to_string(),
            args: vec![],
        }
    }
}

/// Terminal pane settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalSettings {
    /// Initial columns of a new pane
    pub cols: u16,
    /// Initial rows of a new pane
    pub rows: u16,
    /// Scrollback buffer lines
    pub scrollback_lines: usize,
    /// How long a session may wait for the host to acknowledge it (0 = forever)
    pub spawn_timeout_ms: u64,
}

impl TerminalSettings {
    /// Initial pane dimensions.
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.rows, self.cols)
    }

    /// Spawn acknowledgement deadline, if any.
    pub fn spawn_timeout(&self) -> Option<Duration> {
        (self.spawn_timeout_ms > 0).then(|| Duration::from_millis(self.spawn_timeout_ms))
    }
}

impl Default for TerminalSettings {
    fn default() -> Self {
        Self {
            cols: 80,
            rows: 30,
            scrollback_lines: 1000,
            spawn_timeout_ms: 0,
        }
    }
}

/// Transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportSettings {
    /// Route `data` messages without a session id to the sole live session
    pub accept_legacy_data: bool,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            accept_legacy_data: true,
        }
    }
}

/// A page that can hold terminals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    /// Page key used by the sidebar
    pub key: String,
    /// Name shown in tab labels
    pub name: String,
}

impl PageConfig {
    /// Create a page entry.
    pub fn new(key: &str, name: &str) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
        }
    }

    /// Built-in pages.
    pub fn defaults() -> Vec<PageConfig> {
        vec![
            PageConfig::new("terminals", "Terminal"),
            PageConfig::new("files", "File Explorer"),
            PageConfig::new("git", "Git"),
            PageConfig::new("calculator", "Calculator"),
            PageConfig::new("converter", "Converter"),
            PageConfig::new("generator", "Generator"),
        ]
    }

    fn validate(&self, index: usize) -> crate::Result<()> {
        if self.key.trim().is_empty() {
            return Err(Error::Config(format!("pages[{index}].key cannot be empty")));
        }
        if self.name.trim().is_empty() {
            return Err(Error::Config(format!(
                "page '{}' name cannot be empty",
                self.key
            )));
        }
        Ok(())
    }
}

/// Configured page list; defaults to the built-in pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pages(pub Vec<PageConfig>);

impl Default for Pages {
    fn default() -> Self {
        Self(PageConfig::defaults())
    }
}

impl std::ops::Deref for Pages {
    type Target = [PageConfig];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

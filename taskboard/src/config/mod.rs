//! Configuration system for the Taskboard client.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/taskboard/config.toml`)
//! 4. Compiled defaults
//!
//! Missing config file is not an error (defaults are used). An explicit
//! `--config` path that doesn't exist is an error.

use std::path::PathBuf;
use std::time::Duration;

use crate::api::BoardScope;
use crate::board::drag::DEFAULT_ACTIVATION_DISTANCE;
use crate::net::{DEFAULT_CHANNEL_CAPACITY, NetConfig};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    api: ApiFileConfig,
    board: BoardFileConfig,
    ui: UiFileConfig,
}

/// `[api]` section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ApiFileConfig {
    base_url: Option<String>,
    token: Option<String>,
    username: Option<String>,
    request_timeout_secs: Option<u64>,
}

/// `[board]` section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct BoardFileConfig {
    project_id: Option<u64>,
    drag_activation_distance: Option<u16>,
}

/// `[ui]` section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct UiFileConfig {
    poll_timeout_ms: Option<u64>,
    notice_timeout_secs: Option<u64>,
    channel_capacity: Option<usize>,
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// Fully resolved client configuration.
#[derive(Clone)]
pub struct ClientConfig {
    // -- API --
    /// Root of the REST API, e.g. `http://localhost:8000/api/`.
    pub base_url: Option<String>,
    /// Bearer access token.
    pub token: Option<String>,
    /// Login name, used with `password` when no token is set.
    pub username: Option<String>,
    /// Login password (CLI or environment only).
    pub password: Option<String>,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Use the in-memory demo board instead of the API.
    pub offline: bool,

    // -- Board --
    /// Project whose board to show; `None` shows personal tasks.
    pub project_id: Option<u64>,
    /// Cells the pointer must travel before a press becomes a drag.
    pub drag_activation_distance: u16,

    // -- UI --
    /// Poll timeout for the TUI event loop.
    pub poll_timeout: Duration,
    /// How long a notice stays in the status bar.
    pub notice_timeout: Duration,
    /// Capacity of the net worker channels.
    pub channel_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            token: None,
            username: None,
            password: None,
            request_timeout: Duration::from_secs(10),
            offline: false,
            project_id: None,
            drag_activation_distance: DEFAULT_ACTIVATION_DISTANCE,
            poll_timeout: Duration::from_millis(50),
            notice_timeout: Duration::from_secs(4),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("request_timeout", &self.request_timeout)
            .field("offline", &self.offline)
            .field("project_id", &self.project_id)
            .field("drag_activation_distance", &self.drag_activation_distance)
            .field("poll_timeout", &self.poll_timeout)
            .field("notice_timeout", &self.notice_timeout)
            .field("channel_capacity", &self.channel_capacity)
            .finish()
    }
}

impl ClientConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the explicit config file cannot be read,
    /// or if any config file present cannot be parsed.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Ok(Self::resolve(cli, &file))
    }

    /// Priority: CLI > file > default.
    fn resolve(cli: &CliArgs, file: &ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            base_url: cli.base_url.clone().or_else(|| file.api.base_url.clone()),
            token: cli.token.clone().or_else(|| file.api.token.clone()),
            username: cli.username.clone().or_else(|| file.api.username.clone()),
            password: cli.password.clone(),
            request_timeout: file
                .api
                .request_timeout_secs
                .map_or(defaults.request_timeout, Duration::from_secs),
            offline: cli.offline,
            project_id: cli.project.or(file.board.project_id),
            drag_activation_distance: file
                .board
                .drag_activation_distance
                .unwrap_or(defaults.drag_activation_distance),
            poll_timeout: file
                .ui
                .poll_timeout_ms
                .map_or(defaults.poll_timeout, Duration::from_millis),
            notice_timeout: file
                .ui
                .notice_timeout_secs
                .map_or(defaults.notice_timeout, Duration::from_secs),
            channel_capacity: file
                .ui
                .channel_capacity
                .unwrap_or(defaults.channel_capacity),
        }
    }

    /// Whether to run against the in-memory demo board.
    #[must_use]
    pub const fn is_offline(&self) -> bool {
        self.offline || self.base_url.is_none()
    }

    /// Task list the board shows. Offline mode always shows personal tasks.
    #[must_use]
    pub const fn scope(&self) -> BoardScope {
        match self.project_id {
            Some(id) if !self.is_offline() => BoardScope::Project(id),
            _ => BoardScope::Personal,
        }
    }

    /// Settings for a net worker serving `scope`.
    ///
    /// The scope is passed in because the board falls back to personal
    /// tasks when the API cannot be reached.
    #[must_use]
    pub const fn net_config(&self, scope: BoardScope) -> NetConfig {
        NetConfig {
            scope,
            channel_capacity: self.channel_capacity,
        }
    }
}

/// CLI arguments parsed by clap.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Terminal Kanban board for the Taskboard API")]
pub struct CliArgs {
    /// Root URL of the REST API.
    #[arg(long, env = "TASKBOARD_URL")]
    pub base_url: Option<String>,

    /// Bearer access token.
    #[arg(long, env = "TASKBOARD_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Username for password login.
    #[arg(long, env = "TASKBOARD_USER")]
    pub username: Option<String>,

    /// Password for login when no token is given.
    #[arg(long, env = "TASKBOARD_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Project whose board to show (default: personal tasks).
    #[arg(short, long, env = "TASKBOARD_PROJECT")]
    pub project: Option<u64>,

    /// Run against a local demo board, no network.
    #[arg(long)]
    pub offline: bool,

    /// Path to config file (default: `~/.config/taskboard/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "TASKBOARD_LOG")]
    pub log_level: String,

    /// Path to log file (default: `$TMPDIR/taskboard.log`).
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Load and parse a TOML config file.
///
/// An explicit path must exist. The default path may be missing.
fn load_config_file(explicit_path: Option<&std::path::Path>) -> Result<ConfigFile, ConfigError> {
    if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    }

    let Some(config_dir) = dirs::config_dir() else {
        return Ok(ConfigFile::default());
    };
    let path = config_dir.join("taskboard").join("config.toml");

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}

//! Configuration for traceinbox
//!
//! Centralized configuration with sensible defaults.

use std::env;
use std::path::PathBuf;

use tracing::Span;

/// Fallback persistence directory when neither a flag nor `$WORK_DIR` is set
pub const DEFAULT_BASE_DIR: &str = "/tmp";

/// Default rotation threshold for event files (10 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Default agent port
pub const DEFAULT_PORT: u16 = 50051;

/// Main configuration for an agent / event store instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Directory holding the event files
    /// Internal structure:
    ///   {base_dir}/
    ///     ├── rank0_events_20240501_1a2b3c4d.json
    ///     └── rank0_events_20240501_9f8e7d6c.json
    pub base_dir: PathBuf,

    /// Serialized size (bytes) above which the active file is rotated.
    /// Zero means `DEFAULT_MAX_FILE_SIZE`.
    pub max_file_size: u64,

    /// Node rank, only used to namespace file names
    pub node_rank: String,

    /// Span the store enters for every public operation.
    /// `None` means the store builds its own `event_storage` span.
    pub span: Option<Span>,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max concurrent client connections
    pub max_connections: usize,

    /// Connection read timeout (milliseconds)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds)
    pub write_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from(DEFAULT_BASE_DIR),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            node_rank: String::new(),
            span: None,
            listen_addr: format!("0.0.0.0:{}", DEFAULT_PORT),
            max_connections: 1024,
            read_timeout_ms: 5000,
            write_timeout_ms: 10000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Defaults overlaid with the agent's environment:
    /// `WORK_DIR` (persistence directory), `NODE_RANK` and `DEEPTRACED_PORT`.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(dir) = non_empty_var("WORK_DIR") {
            config.base_dir = PathBuf::from(dir);
        }
        if let Some(rank) = non_empty_var("NODE_RANK") {
            config.node_rank = rank;
        }
        if let Some(port) = non_empty_var("DEEPTRACED_PORT") {
            config.listen_addr = format!("0.0.0.0:{}", port);
        }

        config
    }

    /// Prefix every event file of this node starts with
    pub fn file_prefix(&self) -> String {
        format!("rank{}_events_", self.node_rank)
    }

    /// Rotation threshold with the zero-means-default rule applied
    pub fn effective_max_file_size(&self) -> u64 {
        if self.max_file_size == 0 {
            DEFAULT_MAX_FILE_SIZE
        } else {
            self.max_file_size
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Start from the environment-derived config instead of the plain defaults
    pub fn from_env() -> Self {
        Self {
            config: Config::from_env(),
        }
    }

    /// Set the persistence directory
    pub fn base_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.base_dir = path.into();
        self
    }

    /// Set the rotation threshold (in bytes)
    pub fn max_file_size(mut self, size: u64) -> Self {
        self.config.max_file_size = size;
        self
    }

    /// Set the node rank used in file names
    pub fn node_rank(mut self, rank: impl Into<String>) -> Self {
        self.config.node_rank = rank.into();
        self
    }

    /// Hand the store an explicit tracing span
    pub fn span(mut self, span: Span) -> Self {
        self.config.span = Some(span);
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

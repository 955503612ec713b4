//! Configuration file management for itinera.
//!
//! Provides a TOML-based config file at `~/.config/itinera/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Development secret used when nothing else is configured.
pub const FALLBACK_SECRET: &str = "change-this-secret";

pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MAX_UPLOAD_MB: usize = 16;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub server: ServerSection,
    pub auth: Option<AuthSection>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

fn default_bind() -> String {
    DEFAULT_BIND.to_owned()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_max_upload_mb() -> usize {
    DEFAULT_MAX_UPLOAD_MB
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthSection {
    /// Key used to sign flash cookies.
    pub secret_key: String,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the itinera config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/itinera` or `~/.config/itinera`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("itinera");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("itinera")
}

/// Return the path to the itinera config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> Result<ConfigFile> {
    toml::from_str(contents).context("failed to parse config file")
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

/// Generate a random secret: 32 random bytes, hex-encoded (64 chars).
pub fn generate_secret() -> String {
    use rand::Rng;
    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    hex::encode(bytes)
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Values given on the command line, each overriding everything else.
#[derive(Debug, Default)]
pub struct CliOverrides<'a> {
    pub bind: Option<&'a str>,
    pub port: Option<u16>,
}

/// Fully resolved server configuration.
#[derive(Debug)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub secret_key: String,
    /// True when [`FALLBACK_SECRET`] is in use.
    pub insecure_secret: bool,
}

impl ServerConfig {
    /// Resolve using the chain: CLI flag > env var > config file > default.
    ///
    /// - bind: `--bind` > `ITINERA_BIND` > `server.bind` > `127.0.0.1`
    /// - port: `--port` > `ITINERA_PORT` > `server.port` > `5000`
    /// - secret: `ITINERA_SECRET_KEY` > `auth.secret_key` > fallback (with warning)
    pub fn resolve(cli: &CliOverrides<'_>) -> Result<Self> {
        let file_config = match load_config() {
            Ok(cfg) => Some(cfg),
            Err(e) if config_path().exists() => return Err(e),
            Err(_) => None,
        };
        Self::resolve_with(cli, file_config.unwrap_or_default())
    }

    fn resolve_with(cli: &CliOverrides<'_>, file: ConfigFile) -> Result<Self> {
        let bind = if let Some(bind) = cli.bind {
            bind.to_owned()
        } else if let Ok(bind) = std::env::var("ITINERA_BIND") {
            bind
        } else {
            file.server.bind
        };

        let port = if let Some(port) = cli.port {
            port
        } else if let Ok(port) = std::env::var("ITINERA_PORT") {
            port.parse()
                .with_context(|| format!("ITINERA_PORT is not a valid port: {port:?}"))?
        } else {
            file.server.port
        };

        let (secret_key, insecure_secret) = if let Ok(secret) = std::env::var("ITINERA_SECRET_KEY") {
            (secret, false)
        } else if let Some(auth) = file.auth {
            (auth.secret_key, false)
        } else {
            (FALLBACK_SECRET.to_owned(), true)
        };

        Ok(Self {
            bind,
            port,
            max_upload_bytes: file.server.max_upload_mb * 1024 * 1024,
            secret_key,
            insecure_secret,
        })
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

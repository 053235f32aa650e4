//! Configuration file management.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use topbadge_types::{ChainId, IDENTITY_COUNT};

/// Environment variable that overrides the data directory.
pub const DATA_DIR_ENV: &str = "TOPBADGE_DATA_DIR";

/// Complete daemon configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Signing key source.
    #[serde(default)]
    pub signer: SignerConfig,
    /// IPC settings.
    #[serde(default)]
    pub rpc: RpcConfig,
    /// Attestation policy.
    #[serde(default)]
    pub attestation: AttestationConfig,
    /// Target network.
    #[serde(default)]
    pub chain: ChainConfig,
    /// Advanced settings.
    #[serde(default)]
    pub advanced: AdvancedConfig,
}

/// Where the attestation key comes from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignerConfig {
    /// File holding the hex key. Relative paths resolve against the data
    /// directory. Empty = read `key_env` instead.
    #[serde(default)]
    pub key_file: String,
    /// Environment variable holding the hex key.
    #[serde(default = "default_key_env")]
    pub key_env: String,
    /// Generate a throwaway key when none is configured. Development only.
    #[serde(default)]
    pub ephemeral_dev_key: bool,
}

/// IPC configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Unix socket path. Empty = $data_dir/daemon.sock.
    #[serde(default)]
    pub socket_path: String,
}

/// Attestation policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttestationConfig {
    /// Minimum ranked items an issue request must carry.
    ///
    /// A data-sufficiency floor on the provider's list, not the number of
    /// identities attested: a record always binds exactly the top three, so
    /// raising this only rejects users with short histories.
    #[serde(default = "default_required_items")]
    pub required_items: usize,
}

/// Target network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Chain the badge contract is deployed on.
    #[serde(default = "default_chain_id")]
    pub expected_chain_id: ChainId,
}

/// Advanced configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvancedConfig {
    /// Log level: "debug" | "info" | "warn" | "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_key_env() -> String {
    "TOPBADGE_SIGNER_KEY".to_string()
}

fn default_required_items() -> usize {
    IDENTITY_COUNT
}

fn default_chain_id() -> ChainId {
    ChainId::BASE_MAINNET
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            key_file: String::new(),
            key_env: default_key_env(),
            ephemeral_dev_key: false,
        }
    }
}

impl Default for AttestationConfig {
    fn default() -> Self {
        Self {
            required_items: default_required_items(),
        }
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            expected_chain_id: default_chain_id(),
        }
    }
}

impl Default for AdvancedConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl DaemonConfig {
    /// Load configuration from the default config file location.
    ///
    /// Falls back to defaults if file does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::data_dir().join("config.toml");
        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::parse(&content)?
        } else {
            Self::default()
        };
        Ok(config)
    }

    /// Parse and validate a config file body.
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: DaemonConfig = toml::from_str(content)?;
        if config.attestation.required_items < IDENTITY_COUNT {
            anyhow::bail!(
                "attestation.required_items must be at least {IDENTITY_COUNT}, got {}",
                config.attestation.required_items
            );
        }
        Ok(config)
    }

    /// Get the data directory path.
    pub fn data_dir() -> PathBuf {
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            return PathBuf::from(dir);
        }
        #[cfg(target_os = "macos")]
        {
            dirs_fallback("Library/Application Support/TopBadge")
        }
        #[cfg(not(target_os = "macos"))]
        {
            dirs_fallback(".topbadge")
        }
    }

    /// Resolved IPC socket path.
    pub fn socket_path(&self, data_dir: &Path) -> PathBuf {
        if self.rpc.socket_path.is_empty() {
            data_dir.join("daemon.sock")
        } else {
            PathBuf::from(&self.rpc.socket_path)
        }
    }

    /// Resolved key file path, if one is configured.
    pub fn key_file(&self, data_dir: &Path) -> Option<PathBuf> {
        if self.signer.key_file.is_empty() {
            return None;
        }
        let path = PathBuf::from(&self.signer.key_file);
        Some(if path.is_absolute() {
            path
        } else {
            data_dir.join(path)
        })
    }
}

/// Fallback home directory resolution.
fn dirs_fallback(subpath: &str) -> PathBuf {
    std::env::var("HOME")
        .map(|h| PathBuf::from(h).join(subpath))
        .unwrap_or_else(|_| PathBuf::from("/tmp/topbadge"))
}

//! topbadge-daemon: the attestation backend.
//!
//! Single OS process running a Tokio async runtime. It is the only holder
//! of the attestation signing key. The HTTP/OAuth front end talks to it via
//! JSON-RPC over a Unix socket.

mod commands;
mod config;
mod rpc;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::broadcast;
use topbadge_attest::{AttestationSigner, MemorySessionStore};
use topbadge_crypto::secp256k1::SigningKey;
use tracing::{error, info, warn};
use zeroize::Zeroizing;

use crate::config::DaemonConfig;
use crate::rpc::RpcServer;

/// Daemon-wide shared state.
pub struct DaemonState {
    /// Configuration.
    pub config: DaemonConfig,
    /// The attestation key.
    pub signer: AttestationSigner,
    /// Attestation records keyed by session.
    pub sessions: MemorySessionStore,
    /// Shutdown signal sender.
    pub shutdown_tx: broadcast::Sender<()>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load config
    let config = DaemonConfig::load()?;
    let data_dir = DaemonConfig::data_dir();

    // Initialize tracing; RUST_LOG wins over the config file.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().or_else(|_| {
        tracing_subscriber::EnvFilter::try_new(format!("topbadge={}", config.advanced.log_level))
    })?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("TopBadge daemon starting");

    // Ensure data directory exists
    std::fs::create_dir_all(&data_dir)?;

    // 2. Load the signing key
    let signer = load_signer(&config, &data_dir)?;
    info!(address = %signer.address(), "attestation signer ready");

    // 3. Create shutdown channel
    let (shutdown_tx, _shutdown_rx) = broadcast::channel(1);

    // 4. Build daemon state
    let socket_path = config.socket_path(&data_dir);
    let state = Arc::new(DaemonState {
        config,
        signer,
        sessions: MemorySessionStore::new(),
        shutdown_tx: shutdown_tx.clone(),
    });

    // 5. Start IPC server
    let rpc_server = RpcServer::new(state.clone(), socket_path.clone());
    info!("Starting JSON-RPC server on {:?}", socket_path);

    // 6. Run the RPC server until shutdown
    let mut shutdown_rx = shutdown_tx.subscribe();
    tokio::select! {
        result = rpc_server.run() => {
            if let Err(e) = result {
                error!("RPC server error: {}", e);
            }
        }
        _ = shutdown_rx.recv() => {
            info!("Shutdown signal received");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl-C received, shutting down");
        }
    }

    // Graceful shutdown
    info!("Daemon shutting down gracefully");

    // Clean up socket file
    let _ = std::fs::remove_file(&socket_path);

    info!("Daemon stopped");
    Ok(())
}

/// Key file, then key environment variable, then (if allowed) a throwaway key.
fn load_signer(config: &DaemonConfig, data_dir: &Path) -> anyhow::Result<AttestationSigner> {
    if let Some(path) = config.key_file(data_dir) {
        let contents = Zeroizing::new(
            std::fs::read_to_string(&path)
                .with_context(|| format!("reading signer key file {}", path.display()))?,
        );
        return AttestationSigner::from_hex(contents.trim())
            .with_context(|| format!("parsing signer key file {}", path.display()));
    }

    if let Ok(value) = std::env::var(&config.signer.key_env) {
        let value = Zeroizing::new(value);
        return AttestationSigner::from_hex(value.trim())
            .with_context(|| format!("parsing ${}", config.signer.key_env));
    }

    if config.signer.ephemeral_dev_key {
        warn!("no signer key configured, using an ephemeral development key");
        return Ok(AttestationSigner::new(SigningKey::generate()));
    }

    anyhow::bail!(
        "no signer key: set signer.key_file in config.toml or ${}",
        config.signer.key_env
    )
}

#[cfg(test)]
pub(crate) fn test_state() -> Arc<DaemonState> {
    test_state_with(DaemonConfig::default())
}

#[cfg(test)]
pub(crate) fn test_state_with(config: DaemonConfig) -> Arc<DaemonState> {
    let (shutdown_tx, _) = broadcast::channel(1);
    Arc::new(DaemonState {
        config,
        signer: AttestationSigner::new(SigningKey::generate()),
        sessions: MemorySessionStore::new(),
        shutdown_tx,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_file_takes_precedence() {
        let dir = std::env::temp_dir().join(format!("topbadge-daemon-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("mkdir");
        std::fs::write(
            dir.join("signer.key"),
            "0x0000000000000000000000000000000000000000000000000000000000000001\n",
        )
        .expect("write key");

        let mut config = DaemonConfig::default();
        config.signer.key_file = "signer.key".to_string();
        let signer = load_signer(&config, &dir).expect("load");
        assert_eq!(
            signer.address().to_string(),
            "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf"
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_key_is_an_error_unless_ephemeral() {
        let mut config = DaemonConfig::default();
        config.signer.key_env = "TOPBADGE_TEST_KEY_THAT_IS_NEVER_SET".to_string();
        assert!(load_signer(&config, Path::new("/nonexistent")).is_err());

        config.signer.ephemeral_dev_key = true;
        assert!(load_signer(&config, Path::new("/nonexistent")).is_ok());
    }
}

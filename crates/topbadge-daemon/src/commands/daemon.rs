//! Daemon and signer command handlers.

use std::sync::Arc;

use serde_json::Value;

use crate::rpc::RpcError;
use crate::DaemonState;

type Result = std::result::Result<Value, RpcError>;

/// Address whose signatures the badge contract accepts.
pub async fn signer_address(state: &Arc<DaemonState>) -> Result {
    Ok(serde_json::json!({
        "address": state.signer.address().to_string(),
    }))
}

/// Daemon version and the network it attests for.
pub async fn version(state: &Arc<DaemonState>) -> Result {
    Ok(serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "expected_chain_id": state.config.chain.expected_chain_id.to_string(),
    }))
}

/// Ask the daemon to stop.
pub async fn shutdown(state: &Arc<DaemonState>) -> Result {
    // No receivers just means shutdown is already under way.
    let _ = state.shutdown_tx.send(());
    Ok(serde_json::json!({"stopping": true}))
}

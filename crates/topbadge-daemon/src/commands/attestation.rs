//! Attestation command handlers.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use topbadge_attest::{AttestError, SessionId, SessionStore};
use topbadge_types::RankedItem;

use crate::rpc::RpcError;
use crate::DaemonState;

type Result = std::result::Result<Value, RpcError>;

#[derive(Deserialize)]
struct IssueParams {
    session_id: String,
    items: Vec<RankedItem>,
}

#[derive(Deserialize)]
struct SessionParams {
    session_id: String,
}

fn parse<T: for<'de> Deserialize<'de>>(params: &Value) -> std::result::Result<T, RpcError> {
    serde_json::from_value(params.clone()).map_err(|e| RpcError::invalid_params(&e.to_string()))
}

fn session(params: &Value) -> std::result::Result<SessionId, RpcError> {
    let SessionParams { session_id } = parse(params)?;
    if session_id.is_empty() {
        return Err(RpcError::invalid_params("session_id must not be empty"));
    }
    Ok(SessionId::new(session_id))
}

fn to_rpc(err: AttestError) -> RpcError {
    match err {
        AttestError::UpstreamData(detail) => RpcError::upstream_data(&detail),
        AttestError::NotFound(_) => RpcError::not_logged_in(),
        other => RpcError::internal_error(&other.to_string()),
    }
}

/// Sign the caller's top items and store the record for the session.
///
/// A rejected issue leaves any earlier record for the session in place.
pub async fn issue(state: &Arc<DaemonState>, params: &Value) -> Result {
    let IssueParams { session_id, items } = parse(params)?;
    if session_id.is_empty() {
        return Err(RpcError::invalid_params("session_id must not be empty"));
    }

    let required = state.config.attestation.required_items;
    if items.len() < required {
        tracing::warn!(session = %session_id, items = items.len(), required, "issue rejected");
        return Err(RpcError::upstream_data(&format!(
            "need {required} ranked items, got {}",
            items.len()
        )));
    }

    let record = state.signer.attest(&items).map_err(to_rpc)?;
    let stored = state.sessions.put(&SessionId::new(session_id), record);

    serde_json::to_value(&*stored).map_err(|e| RpcError::internal_error(&e.to_string()))
}

/// The session's current record.
pub async fn get(state: &Arc<DaemonState>, params: &Value) -> Result {
    let record = state.sessions.get(&session(params)?).map_err(to_rpc)?;
    serde_json::to_value(&*record).map_err(|e| RpcError::internal_error(&e.to_string()))
}

/// Circuit inputs for the session's record.
pub async fn commitments(state: &Arc<DaemonState>, params: &Value) -> Result {
    let record = state.sessions.get(&session(params)?).map_err(to_rpc)?;
    let (input, _) = topbadge_proof::build_inputs(&record);
    serde_json::to_value(&input).map_err(|e| RpcError::internal_error(&e.to_string()))
}

/// Forget the session's record (logout).
pub async fn clear(state: &Arc<DaemonState>, params: &Value) -> Result {
    let removed = state.sessions.remove(&session(params)?).is_some();
    Ok(serde_json::json!({"cleared": removed}))
}

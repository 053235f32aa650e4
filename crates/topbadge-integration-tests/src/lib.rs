//! Integration test crate for the badge pipeline.
//!
//! Holds the deterministic collaborators the scenarios in `tests/` share:
//! an identity provider that hands out scripted rankings, and a wallet and
//! chain that record what they were asked to do.
//!
//! Run all integration tests:
//! ```sh
//! cargo test -p topbadge-integration-tests
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

use topbadge_attest::provider::{AccessToken, IdentityProvider, ProviderError};
use topbadge_mint::{
    ChainSubmitter, CollaboratorError, Finality, Receipt, SwitchOutcome, TransactionRequest,
    TxHandle, Wallet,
};
use topbadge_types::{ChainId, RankedItem};

/// Identity provider whose rankings are set per authorization code.
#[derive(Default)]
pub struct ScriptedProvider {
    rankings: Mutex<HashMap<String, Vec<RankedItem>>>,
}

impl ScriptedProvider {
    /// Make `code` log in as a user whose top items are `names`.
    pub fn script(&self, code: &str, names: &[&str]) {
        let items = names.iter().map(|n| RankedItem::named(*n)).collect();
        if let Ok(mut rankings) = self.rankings.lock() {
            rankings.insert(code.to_string(), items);
        }
    }
}

impl IdentityProvider for ScriptedProvider {
    async fn exchange_code(&self, code: &str) -> Result<AccessToken, ProviderError> {
        let known = self
            .rankings
            .lock()
            .map_err(|_| "poisoned")?
            .contains_key(code);
        if known {
            Ok(AccessToken(code.to_string()))
        } else {
            Err(format!("unknown authorization code {code:?}").into())
        }
    }

    async fn top_items(
        &self,
        token: &AccessToken,
        limit: usize,
    ) -> Result<Vec<RankedItem>, ProviderError> {
        let rankings = self.rankings.lock().map_err(|_| "poisoned")?;
        let items = rankings.get(&token.0).cloned().unwrap_or_default();
        Ok(items.into_iter().take(limit).collect())
    }
}

/// Wallet that starts on a given chain and accepts or refuses switches.
pub struct FakeWallet {
    chain: AtomicU64,
    accept_switch: bool,
    switch_requests: AtomicUsize,
}

impl FakeWallet {
    pub fn on(chain: ChainId, accept_switch: bool) -> Self {
        Self {
            chain: AtomicU64::new(chain.0),
            accept_switch,
            switch_requests: AtomicUsize::new(0),
        }
    }

    pub fn switch_requests(&self) -> usize {
        self.switch_requests.load(Ordering::SeqCst)
    }
}

impl Wallet for FakeWallet {
    async fn get_network(&self) -> Result<ChainId, CollaboratorError> {
        Ok(ChainId(self.chain.load(Ordering::SeqCst)))
    }

    async fn request_network_switch(
        &self,
        chain: ChainId,
    ) -> Result<SwitchOutcome, CollaboratorError> {
        self.switch_requests.fetch_add(1, Ordering::SeqCst);
        if self.accept_switch {
            self.chain.store(chain.0, Ordering::SeqCst);
            Ok(SwitchOutcome::Switched)
        } else {
            Ok(SwitchOutcome::Rejected)
        }
    }
}

/// Chain that confirms everything and keeps the submitted requests.
#[derive(Default)]
pub struct RecordingChain {
    sent: Mutex<Vec<TransactionRequest>>,
}

impl RecordingChain {
    pub fn sent(&self) -> Vec<TransactionRequest> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl ChainSubmitter for RecordingChain {
    async fn send_transaction(
        &self,
        request: &TransactionRequest,
    ) -> Result<TxHandle, CollaboratorError> {
        let mut sent = self.sent.lock().map_err(|_| "poisoned")?;
        sent.push(request.clone());
        let mut hash = [0u8; 32];
        hash[24..].copy_from_slice(&(sent.len() as u64).to_be_bytes());
        Ok(TxHandle(hash))
    }

    async fn await_finality(&self, tx: &TxHandle) -> Result<Finality, CollaboratorError> {
        Ok(Finality::Confirmed(Receipt {
            tx: *tx,
            block_number: 1,
        }))
    }
}

//! Mint orchestrator.
//!
//! ## States
//!
//! ```text
//! Idle -> ProofReady -> NetworkChecked -> Submitted -> Confirmed
//!              |               |              |
//!              +---------------+--------------+-----> Failed
//! ```
//!
//! A refused network switch leaves the attempt in `ProofReady`. `Failed`
//! and `Confirmed` are terminal until [`MintOrchestrator::reset`]. Nothing
//! is retried automatically.
//!
//! Dropping an in-flight `submit` or `await_confirmation` future abandons
//! the attempt: the state stays where it was and never reaches `Confirmed`.

use std::collections::HashSet;

use topbadge_crypto::secp256k1::Address;
use topbadge_types::ChainId;

use crate::intent::MintIntent;
use crate::wallet::{
    ChainSubmitter, Finality, Receipt, SwitchOutcome, TransactionRequest, TxHandle, Wallet,
};
use crate::{MintError, Result};

/// Where the badge contract lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MintConfig {
    pub expected_chain: ChainId,
    pub contract: Address,
}

/// State of the current mint attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MintState {
    Idle,
    /// An adapted proof is loaded.
    ProofReady,
    /// The wallet is on the expected chain.
    NetworkChecked,
    /// The transaction is broadcast.
    Submitted { tx: TxHandle },
    /// The transaction is final.
    Confirmed { receipt: Receipt },
    /// The attempt is over; `cause` is shown to the user.
    Failed { cause: String },
}

impl MintState {
    pub fn name(&self) -> &'static str {
        match self {
            MintState::Idle => "Idle",
            MintState::ProofReady => "ProofReady",
            MintState::NetworkChecked => "NetworkChecked",
            MintState::Submitted { .. } => "Submitted",
            MintState::Confirmed { .. } => "Confirmed",
            MintState::Failed { .. } => "Failed",
        }
    }
}

/// Drives one session's mint attempts.
pub struct MintOrchestrator<W, C> {
    wallet: W,
    chain: C,
    config: MintConfig,
    state: MintState,
    intent: Option<MintIntent>,
    /// Fingerprints of proofs that reached `Confirmed`.
    minted: HashSet<[u8; 32]>,
}

impl<W: Wallet, C: ChainSubmitter> MintOrchestrator<W, C> {
    pub fn new(wallet: W, chain: C, config: MintConfig) -> Self {
        Self {
            wallet,
            chain,
            config,
            state: MintState::Idle,
            intent: None,
            minted: HashSet::new(),
        }
    }

    pub fn state(&self) -> &MintState {
        &self.state
    }

    pub fn config(&self) -> &MintConfig {
        &self.config
    }

    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    pub fn chain(&self) -> &C {
        &self.chain
    }

    /// `Idle -> ProofReady`.
    ///
    /// # Errors
    ///
    /// [`MintError::AlreadyMinted`] if this intent's proof was already
    /// confirmed; a fresh proof is required for every attempt.
    pub fn load(&mut self, intent: MintIntent) -> Result<()> {
        self.expect_state("Idle", matches!(self.state, MintState::Idle))?;

        if self.minted.contains(&intent.fingerprint()) {
            tracing::warn!("refusing to reload a proof that was already minted");
            return Err(MintError::AlreadyMinted);
        }

        tracing::info!(period = %intent.period, "mint intent loaded");
        self.intent = Some(intent);
        self.state = MintState::ProofReady;
        Ok(())
    }

    /// `ProofReady -> NetworkChecked`, asking for a switch when needed.
    ///
    /// A refused switch is a recoverable [`MintError::NetworkMismatch`] and
    /// leaves the state at `ProofReady`.
    pub async fn check_network(&mut self) -> Result<()> {
        self.expect_state("ProofReady", matches!(self.state, MintState::ProofReady))?;
        let expected = self.config.expected_chain;

        let reported = self.wallet.get_network().await;
        let actual = match reported {
            Ok(chain) => chain,
            Err(e) => return Err(self.fail(MintError::Wallet(e.to_string()))),
        };
        if actual == expected {
            self.state = MintState::NetworkChecked;
            return Ok(());
        }

        tracing::info!(%actual, %expected, "wallet on wrong chain, requesting switch");
        let outcome = self.wallet.request_network_switch(expected).await;
        match outcome {
            Ok(SwitchOutcome::Switched) => {}
            Ok(SwitchOutcome::Rejected) => {
                tracing::warn!(%actual, %expected, "network switch refused");
                return Err(MintError::NetworkMismatch { expected, actual });
            }
            Err(e) => return Err(self.fail(MintError::Wallet(e.to_string()))),
        }

        // Trust the wallet's answer, not the switch acknowledgement.
        let reported = self.wallet.get_network().await;
        let actual = match reported {
            Ok(chain) => chain,
            Err(e) => return Err(self.fail(MintError::Wallet(e.to_string()))),
        };
        if actual != expected {
            tracing::warn!(%actual, %expected, "wallet still on wrong chain after switch");
            return Err(MintError::NetworkMismatch { expected, actual });
        }

        self.state = MintState::NetworkChecked;
        Ok(())
    }

    /// `NetworkChecked -> Submitted`.
    pub async fn submit(&mut self) -> Result<TxHandle> {
        self.expect_state(
            "NetworkChecked",
            matches!(self.state, MintState::NetworkChecked),
        )?;
        let Some(intent) = self.intent.as_ref() else {
            return Err(MintError::InvalidState {
                expected: "loaded intent",
                actual: self.state.name(),
            });
        };

        let request = TransactionRequest {
            chain_id: self.config.expected_chain,
            to: self.config.contract,
            data: intent.calldata(),
        };

        let sent = self.chain.send_transaction(&request).await;
        match sent {
            Ok(tx) => {
                tracing::info!(%tx, "mint transaction submitted");
                self.state = MintState::Submitted { tx };
                Ok(tx)
            }
            Err(e) => Err(self.fail(MintError::Transaction(e.to_string()))),
        }
    }

    /// `Submitted -> Confirmed`, or `Failed` on revert.
    pub async fn await_confirmation(&mut self) -> Result<Receipt> {
        let MintState::Submitted { tx } = self.state else {
            return Err(MintError::InvalidState {
                expected: "Submitted",
                actual: self.state.name(),
            });
        };

        let finality = self.chain.await_finality(&tx).await;
        match finality {
            Ok(Finality::Confirmed(receipt)) => {
                if let Some(intent) = self.intent.take() {
                    self.minted.insert(intent.fingerprint());
                }
                tracing::info!(%tx, block = receipt.block_number, "badge minted");
                self.state = MintState::Confirmed {
                    receipt: receipt.clone(),
                };
                Ok(receipt)
            }
            Ok(Finality::Reverted { reason }) => {
                Err(self.fail(MintError::Transaction(format!("reverted: {reason}"))))
            }
            Err(e) => Err(self.fail(MintError::Transaction(e.to_string()))),
        }
    }

    /// Run a full attempt from `Idle`.
    pub async fn mint(&mut self, intent: MintIntent) -> Result<Receipt> {
        self.load(intent)?;
        self.check_network().await?;
        self.submit().await?;
        self.await_confirmation().await
    }

    /// Drop the current attempt and return to `Idle`.
    pub fn reset(&mut self) {
        if self.state != MintState::Idle {
            tracing::debug!(from = self.state.name(), "mint attempt reset");
        }
        self.intent = None;
        self.state = MintState::Idle;
    }

    fn expect_state(&self, expected: &'static str, ok: bool) -> Result<()> {
        if ok {
            Ok(())
        } else {
            Err(MintError::InvalidState {
                expected,
                actual: self.state.name(),
            })
        }
    }

    fn fail(&mut self, err: MintError) -> MintError {
        tracing::warn!(error = %err, from = self.state.name(), "mint attempt failed");
        self.intent = None;
        self.state = MintState::Failed {
            cause: err.to_string(),
        };
        err
    }
}

//! Badge metadata and token URI.
//!
//! The token URI is the metadata JSON itself, inlined as a base64 data URI,
//! so the contract stores no off-chain reference.

use base64::Engine;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use topbadge_types::{ChainId, IdentityTriple};

use crate::wallet::TxHandle;
use crate::{MintError, Result};

const DESCRIPTION: &str = "Verified top 3 Spotify artists using ZK.";
const TOKEN_URI_PREFIX: &str = "data:application/json;base64,";

/// One metadata attribute.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub trait_type: String,
    pub value: String,
}

/// ERC-721 metadata for a badge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeMetadata {
    pub name: String,
    pub description: String,
    pub image: String,
    pub attributes: Vec<Attribute>,
}

impl BadgeMetadata {
    /// Metadata for `identities` in `period`, with an already rendered image reference.
    pub fn new(identities: &IdentityTriple, period: &str, image: impl Into<String>) -> Self {
        let mut attributes = vec![Attribute {
            trait_type: "Month".to_string(),
            value: period.to_string(),
        }];
        attributes.extend(identities.iter().enumerate().map(|(i, name)| Attribute {
            trait_type: format!("Artist {}", i + 1),
            value: name.to_string(),
        }));

        Self {
            name: format!("Top Listener Badge - {period}"),
            description: DESCRIPTION.to_string(),
            image: image.into(),
            attributes,
        }
    }

    /// `data:application/json;base64,<metadata>`.
    pub fn token_uri(&self) -> Result<String> {
        let json = serde_json::to_vec(self).map_err(|e| MintError::Metadata(e.to_string()))?;
        Ok(format!(
            "{TOKEN_URI_PREFIX}{}",
            base64::engine::general_purpose::STANDARD.encode(json)
        ))
    }

    /// Parse metadata back out of a token URI.
    pub fn from_token_uri(uri: &str) -> Result<Self> {
        let encoded = uri
            .strip_prefix(TOKEN_URI_PREFIX)
            .ok_or_else(|| MintError::Metadata("not a base64 JSON data URI".to_string()))?;
        let json = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| MintError::Metadata(e.to_string()))?;
        serde_json::from_slice(&json).map_err(|e| MintError::Metadata(e.to_string()))
    }
}

/// Month and year, e.g. `"March 2025"`.
pub fn period_label(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

/// Block explorer link for a transaction, for chains with a known explorer.
pub fn explorer_tx_url(chain: ChainId, tx: &TxHandle) -> Option<String> {
    let base = match chain {
        ChainId::ETHEREUM => "https://etherscan.io",
        ChainId::BASE_MAINNET => "https://basescan.org",
        ChainId::BASE_SEPOLIA => "https://sepolia.basescan.org",
        _ => return None,
    };
    Some(format!("{base}/tx/{tx}"))
}

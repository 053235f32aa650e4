//! EVM chain identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An EIP-155 chain id.
///
/// Wallets report chain ids as `0x`-prefixed hex; configuration may use
/// either hex or decimal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChainId(pub u64);

impl ChainId {
    /// Ethereum mainnet.
    pub const ETHEREUM: ChainId = ChainId(1);
    /// Base mainnet, where the badge contract is deployed.
    pub const BASE_MAINNET: ChainId = ChainId(0x2105);
    /// Base Sepolia testnet.
    pub const BASE_SEPOLIA: ChainId = ChainId(0x14a34);

    /// Human-readable network name, if known.
    pub fn name(&self) -> Option<&'static str> {
        match *self {
            Self::ETHEREUM => Some("ethereum"),
            Self::BASE_MAINNET => Some("base-mainnet"),
            Self::BASE_SEPOLIA => Some("base-sepolia"),
            _ => None,
        }
    }
}

/// A chain id string that is neither hex nor decimal.
#[derive(Debug, thiserror::Error)]
#[error("invalid chain id: {0:?}")]
pub struct ParseChainIdError(String);

impl FromStr for ChainId {
    type Err = ParseChainIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parsed = match trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => trimmed.parse::<u64>(),
        };
        parsed
            .map(ChainId)
            .map_err(|_| ParseChainIdError(s.to_string()))
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl Serialize for ChainId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ChainId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(u64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(n) => Ok(ChainId(n)),
            Repr::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

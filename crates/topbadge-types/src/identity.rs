//! Ranked identity items and the ordered triple bound by an attestation.

use serde::{Deserialize, Serialize};

use crate::IDENTITY_COUNT;

/// One ranked item as returned by the identity provider (e.g. a top artist).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct RankedItem {
    /// Display name; becomes the identity string.
    pub name: String,
    /// First image reference, if the provider supplied one.
    #[serde(default)]
    pub image_url: Option<String>,
}

impl RankedItem {
    /// Create an item without an image.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image_url: None,
        }
    }
}

/// Why a set of identity strings cannot form a triple.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    /// A string is empty after trimming.
    #[error("identity at position {position} is empty")]
    Empty { position: usize },

    /// Two positions carry the same trimmed string.
    #[error("identity {name:?} appears more than once")]
    Duplicate { name: String },
}

/// Three trimmed, non-empty, pairwise distinct identity strings.
///
/// Order is significant: position 0 is the top-ranked item.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ts_rs::TS)]
#[serde(try_from = "[String; 3]", into = "[String; 3]")]
#[ts(export)]
pub struct IdentityTriple([String; IDENTITY_COUNT]);

impl IdentityTriple {
    /// Trim and validate three identity strings, keeping their order.
    pub fn new(names: [String; IDENTITY_COUNT]) -> Result<Self, IdentityError> {
        let trimmed = names.map(|n| n.trim().to_string());

        for (position, name) in trimmed.iter().enumerate() {
            if name.is_empty() {
                return Err(IdentityError::Empty { position });
            }
        }
        for i in 0..IDENTITY_COUNT {
            for j in (i + 1)..IDENTITY_COUNT {
                if trimmed[i] == trimmed[j] {
                    return Err(IdentityError::Duplicate {
                        name: trimmed[i].clone(),
                    });
                }
            }
        }

        Ok(Self(trimmed))
    }

    /// Convenience constructor from string slices.
    pub fn from_strs(a: &str, b: &str, c: &str) -> Result<Self, IdentityError> {
        Self::new([a.to_string(), b.to_string(), c.to_string()])
    }

    /// The identities as borrowed strings, in rank order.
    pub fn as_strs(&self) -> [&str; IDENTITY_COUNT] {
        [&self.0[0], &self.0[1], &self.0[2]]
    }

    /// Identity at `position` (0-based).
    pub fn get(&self, position: usize) -> Option<&str> {
        self.0.get(position).map(String::as_str)
    }

    /// Iterate in rank order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl TryFrom<[String; IDENTITY_COUNT]> for IdentityTriple {
    type Error = IdentityError;

    fn try_from(value: [String; IDENTITY_COUNT]) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<IdentityTriple> for [String; IDENTITY_COUNT] {
    fn from(value: IdentityTriple) -> Self {
        value.0
    }
}

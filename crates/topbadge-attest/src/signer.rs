//! The attestation signer.
//!
//! Exactly one signer instance exists, inside the backend process that owns
//! the private key. It is deliberately not `Clone`.

use std::time::{SystemTime, UNIX_EPOCH};

use topbadge_crypto::secp256k1::{Address, RecoverableSignature, SigningKey};
use topbadge_types::{IdentityTriple, RankedItem, IDENTITY_COUNT};

use crate::record::{attestation_digest, AttestationRecord};
use crate::{AttestError, Result};

/// Signs ordered identity triples with the backend key.
pub struct AttestationSigner {
    key: SigningKey,
}

impl AttestationSigner {
    /// Wrap a signing key.
    pub fn new(key: SigningKey) -> Self {
        tracing::info!(address = %key.address(), "attestation signer ready");
        Self { key }
    }

    /// Load the key from hex, with or without a `0x` prefix.
    pub fn from_hex(key_hex: &str) -> Result<Self> {
        Ok(Self::new(SigningKey::from_hex(key_hex)?))
    }

    /// The address the badge contract should trust.
    pub fn address(&self) -> Address {
        self.key.address()
    }

    /// Sign an ordered identity triple.
    pub fn sign(&self, identities: &IdentityTriple) -> Result<RecoverableSignature> {
        let digest = attestation_digest(identities);
        Ok(self.key.sign_message(&digest)?)
    }

    /// Build and sign a record from the provider's ranked items.
    ///
    /// Only the first three items are used. Fewer than three items, or an
    /// empty or repeated name among the first three, fails with
    /// [`AttestError::UpstreamData`]; nothing is padded.
    pub fn attest(&self, items: &[RankedItem]) -> Result<AttestationRecord> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        self.attest_at(items, now)
    }

    /// [`attest`](Self::attest) with an explicit issuance time.
    pub fn attest_at(&self, items: &[RankedItem], created_at: u64) -> Result<AttestationRecord> {
        if items.len() < IDENTITY_COUNT {
            return Err(AttestError::UpstreamData(format!(
                "need {IDENTITY_COUNT} ranked items, provider returned {}",
                items.len()
            )));
        }

        let top = &items[..IDENTITY_COUNT];
        let identities = IdentityTriple::new([
            top[0].name.clone(),
            top[1].name.clone(),
            top[2].name.clone(),
        ])
        .map_err(|e| AttestError::UpstreamData(e.to_string()))?;

        let images = [
            non_empty(&top[0].image_url),
            non_empty(&top[1].image_url),
            non_empty(&top[2].image_url),
        ];

        let signature = self.sign(&identities)?;

        tracing::info!(
            first = identities.as_strs()[0],
            second = identities.as_strs()[1],
            third = identities.as_strs()[2],
            "issued attestation"
        );

        Ok(AttestationRecord {
            identities,
            images,
            signature,
            created_at,
        })
    }
}

impl std::fmt::Debug for AttestationSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttestationSigner")
            .field("address", &self.address())
            .finish()
    }
}

fn non_empty(url: &Option<String>) -> Option<String> {
    url.as_ref()
        .map(|u| u.trim())
        .filter(|u| !u.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn signer() -> AttestationSigner {
        let mut bytes = [0u8; 32];
        bytes[31] = 7;
        AttestationSigner::new(SigningKey::from_bytes(&bytes).expect("key"))
    }

    fn items(names: &[&str]) -> Vec<RankedItem> {
        names.iter().map(|n| RankedItem::named(*n)).collect()
    }

    #[test]
    fn test_attest_signs_top_three() {
        let signer = signer();
        let record = signer
            .attest_at(
                &items(&["Radiohead", "Boards of Canada", "Aphex Twin", "Autechre"]),
                1_700_000_000,
            )
            .expect("attest");
        assert_eq!(
            record.identities.as_strs(),
            ["Radiohead", "Boards of Canada", "Aphex Twin"]
        );
        assert_eq!(record.created_at, 1_700_000_000);
        assert!(record.verify(&signer.address()).is_ok());
    }

    #[test]
    fn test_fewer_than_three_rejected() {
        let err = signer()
            .attest_at(&items(&["Radiohead", "Aphex Twin"]), 0)
            .expect_err("two items");
        assert!(matches!(err, AttestError::UpstreamData(_)));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_duplicate_names_rejected_not_padded() {
        let err = signer()
            .attest_at(&items(&["Radiohead", "Radiohead ", "Aphex Twin", "Autechre"]), 0)
            .expect_err("duplicate");
        assert!(matches!(err, AttestError::UpstreamData(_)));
    }

    #[test]
    fn test_blank_name_rejected() {
        let err = signer()
            .attest_at(&items(&["Radiohead", "  ", "Aphex Twin"]), 0)
            .expect_err("blank");
        assert!(matches!(err, AttestError::UpstreamData(_)));
    }

    #[test]
    fn test_names_trimmed_before_signing() {
        let signer = signer();
        let padded = signer
            .attest_at(&items(&[" Radiohead ", "Boards of Canada", "Aphex Twin"]), 0)
            .expect("attest");
        let clean = signer
            .attest_at(&items(&["Radiohead", "Boards of Canada", "Aphex Twin"]), 0)
            .expect("attest");
        assert_eq!(padded.signature, clean.signature);
    }

    #[test]
    fn test_images_carried_and_blank_dropped() {
        let list = vec![
            RankedItem {
                name: "a".into(),
                image_url: Some("https://i.scdn.co/a.jpg".into()),
            },
            RankedItem {
                name: "b".into(),
                image_url: Some("   ".into()),
            },
            RankedItem::named("c"),
        ];
        let record = signer().attest_at(&list, 0).expect("attest");
        assert_eq!(
            record.images,
            [Some("https://i.scdn.co/a.jpg".to_string()), None, None]
        );
    }

    #[test]
    fn test_debug_shows_only_address() {
        let signer = signer();
        let rendered = format!("{signer:?}");
        assert!(rendered.contains(&signer.address().to_string()));
    }

    #[test]
    fn test_fixture_permutations_sign_differently() {
        let signer = signer();
        let a = IdentityTriple::from_strs("Radiohead", "Boards of Canada", "Aphex Twin")
            .expect("valid");
        let b = IdentityTriple::from_strs("Radiohead", "Aphex Twin", "Boards of Canada")
            .expect("valid");
        assert_ne!(signer.sign(&a).expect("sign"), signer.sign(&b).expect("sign"));
    }

    #[test]
    fn test_shifted_boundary_permutation_signs_differently() {
        let signer = signer();
        let x = IdentityTriple::from_strs("ab", "a", "b").expect("valid");
        let y = IdentityTriple::from_strs("a", "b", "ab").expect("valid");
        assert_ne!(signer.sign(&x).expect("sign"), signer.sign(&y).expect("sign"));
    }

    proptest! {
        #[test]
        // A two-letter alphabet makes equal concatenations common.
        fn prop_permutations_sign_differently(
            a in "[ab]{1,4}",
            b in "[ab]{1,4}",
            c in "[ab]{1,4}",
        ) {
            prop_assume!(a != b && b != c && a != c);
            let signer = signer();
            let orders = [
                [&a, &b, &c], [&a, &c, &b], [&b, &a, &c],
                [&b, &c, &a], [&c, &a, &b], [&c, &b, &a],
            ];
            let mut seen = std::collections::HashSet::new();
            for order in orders {
                let ids = IdentityTriple::from_strs(order[0], order[1], order[2])
                    .expect("distinct");
                let sig = signer.sign(&ids).expect("sign");
                prop_assert!(seen.insert(*sig.as_bytes()));
            }
        }
    }
}

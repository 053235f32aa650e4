//! Identity-provider collaborator and the login flow.
//!
//! The OAuth code exchange and the provider's ranking are external. This
//! module only defines what the backend needs from them and wires the
//! result through the signer into the session store.

use std::future::Future;
use std::sync::Arc;

use topbadge_types::{RankedItem, IDENTITY_COUNT};

use crate::record::AttestationRecord;
use crate::session::{SessionId, SessionStore};
use crate::signer::AttestationSigner;
use crate::{AttestError, Result};

/// Opaque bearer token from the OAuth exchange.
#[derive(Clone)]
pub struct AccessToken(pub String);

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

/// Failure reported by the identity provider.
pub type ProviderError = Box<dyn std::error::Error + Send + Sync>;

/// The identity provider behind the OAuth flow.
///
/// Implementors perform the network calls. This abstraction allows the
/// login flow to be tested without a real provider.
pub trait IdentityProvider {
    /// Exchange an authorization code for an access token.
    fn exchange_code(
        &self,
        code: &str,
    ) -> impl Future<Output = std::result::Result<AccessToken, ProviderError>> + Send;

    /// Fetch up to `limit` top-ranked items for the token's user, best first.
    fn top_items(
        &self,
        token: &AccessToken,
        limit: usize,
    ) -> impl Future<Output = std::result::Result<Vec<RankedItem>, ProviderError>> + Send;
}

/// Complete a login: exchange the code, fetch the top items, sign and store.
///
/// On any failure the session keeps whatever record it had before; a partial
/// attestation is never stored.
pub async fn login<P, S>(
    provider: &P,
    signer: &AttestationSigner,
    store: &S,
    session: &SessionId,
    code: &str,
) -> Result<Arc<AttestationRecord>>
where
    P: IdentityProvider,
    S: SessionStore + ?Sized,
{
    if code.is_empty() {
        return Err(AttestError::Provider("missing authorization code".to_string()));
    }

    let token = provider
        .exchange_code(code)
        .await
        .map_err(|e| AttestError::Provider(e.to_string()))?;

    let items = provider
        .top_items(&token, IDENTITY_COUNT)
        .await
        .map_err(|e| AttestError::Provider(e.to_string()))?;

    let record = signer.attest(&items).inspect_err(|e| {
        tracing::warn!(session = %session, error = %e, "attestation rejected");
    })?;

    Ok(store.put(session, record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemorySessionStore;
    use topbadge_crypto::secp256k1::SigningKey;

    struct FakeProvider {
        items: Vec<RankedItem>,
        fail_exchange: bool,
    }

    impl FakeProvider {
        fn with(names: &[&str]) -> Self {
            Self {
                items: names.iter().map(|n| RankedItem::named(*n)).collect(),
                fail_exchange: false,
            }
        }
    }

    impl IdentityProvider for FakeProvider {
        async fn exchange_code(
            &self,
            code: &str,
        ) -> std::result::Result<AccessToken, ProviderError> {
            if self.fail_exchange {
                return Err("invalid_grant".into());
            }
            Ok(AccessToken(format!("token-for-{code}")))
        }

        async fn top_items(
            &self,
            _token: &AccessToken,
            limit: usize,
        ) -> std::result::Result<Vec<RankedItem>, ProviderError> {
            Ok(self.items.iter().take(limit).cloned().collect())
        }
    }

    fn signer() -> AttestationSigner {
        AttestationSigner::new(SigningKey::generate())
    }

    #[tokio::test]
    async fn test_login_stores_signed_record() {
        let provider = FakeProvider::with(&["Radiohead", "Boards of Canada", "Aphex Twin"]);
        let signer = signer();
        let store = MemorySessionStore::new();
        let session = SessionId::new("cookie-1");

        let record = login(&provider, &signer, &store, &session, "code")
            .await
            .expect("login");
        assert!(record.verify(&signer.address()).is_ok());
        assert_eq!(*store.get(&session).expect("stored"), *record);
    }

    #[tokio::test]
    async fn test_insufficient_data_stores_nothing() {
        let provider = FakeProvider::with(&["Radiohead", "Aphex Twin"]);
        let store = MemorySessionStore::new();
        let session = SessionId::new("cookie-1");

        let err = login(&provider, &signer(), &store, &session, "code")
            .await
            .expect_err("two items");
        assert!(matches!(err, AttestError::UpstreamData(_)));
        assert!(store.get(&session).is_err());
    }

    #[tokio::test]
    async fn test_failed_relogin_keeps_previous_record() {
        let signer = signer();
        let store = MemorySessionStore::new();
        let session = SessionId::new("cookie-1");

        let good = FakeProvider::with(&["a", "b", "c"]);
        login(&good, &signer, &store, &session, "code").await.expect("login");

        let short = FakeProvider::with(&["d"]);
        assert!(login(&short, &signer, &store, &session, "code").await.is_err());
        assert_eq!(
            store.get(&session).expect("kept").identities.as_strs(),
            ["a", "b", "c"]
        );
    }

    #[tokio::test]
    async fn test_exchange_failure_is_provider_error() {
        let mut provider = FakeProvider::with(&["a", "b", "c"]);
        provider.fail_exchange = true;
        let store = MemorySessionStore::new();
        let err = login(&provider, &signer(), &store, &SessionId::new("s"), "code")
            .await
            .expect_err("exchange fails");
        assert!(matches!(err, AttestError::Provider(msg) if msg.contains("invalid_grant")));
    }

    #[tokio::test]
    async fn test_missing_code_rejected() {
        let provider = FakeProvider::with(&["a", "b", "c"]);
        let store = MemorySessionStore::new();
        let err = login(&provider, &signer(), &store, &SessionId::new("s"), "")
            .await
            .expect_err("no code");
        assert!(matches!(err, AttestError::Provider(_)));
    }
}

//! Session identity management.
//!
//! A [`SessionManager`] owns at most one [`Identity`] for the lifetime of the
//! process. Identities never leave memory: there is no persistence, and the
//! underlying signing key is zeroized when the identity is replaced or the
//! manager is dropped.

use std::fmt;

use lumen_core::crypto::KeyPair;
use lumen_core::traits::{Faucet, FundingReceipt};
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::error::WalletError;

/// A loaded account: keypair plus its derived public address.
pub struct Identity {
    public_address: String,
    keypair: KeyPair,
}

impl Identity {
    fn from_keypair(keypair: KeyPair) -> Self {
        Self {
            public_address: keypair.account_id(),
            keypair,
        }
    }

    /// Parse an `S…` secret seed. Surrounding whitespace is ignored.
    pub fn from_secret(secret: &str) -> Result<Self, WalletError> {
        let keypair =
            KeyPair::from_secret_seed(secret.trim()).map_err(|_| WalletError::InvalidSecret)?;
        Ok(Self::from_keypair(keypair))
    }

    /// The `G…` account id.
    pub fn public_address(&self) -> &str {
        &self.public_address
    }

    /// The `S…` secret seed. Only ever shown to the user, never logged.
    pub fn secret_key(&self) -> Zeroizing<String> {
        self.keypair.secret_seed()
    }

    pub(crate) fn keypair(&self) -> &KeyPair {
        &self.keypair
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("public_address", &self.public_address)
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

/// Outcome of [`SessionManager::create_identity`].
///
/// Key generation cannot fail; funding can. Both are reported so the user
/// still sees the generated key when the faucet is down.
pub struct GeneratedIdentity {
    pub public_address: String,
    pub secret_key: Zeroizing<String>,
    /// Faucet result. On `Ok` the identity is now the current one.
    pub funding: Result<FundingReceipt, WalletError>,
}

impl fmt::Debug for GeneratedIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedIdentity")
            .field("public_address", &self.public_address)
            .field("secret_key", &"[REDACTED]")
            .field("funding", &self.funding)
            .finish()
    }
}

/// Holder of the single active identity.
#[derive(Debug, Default)]
pub struct SessionManager {
    current: Option<Identity>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a fresh keypair and ask the faucet to fund it.
    ///
    /// The new identity becomes current only if funding succeeds; otherwise
    /// any previously loaded identity stays active.
    pub async fn create_identity(&mut self, faucet: &dyn Faucet) -> GeneratedIdentity {
        let identity = Identity::from_keypair(KeyPair::generate());
        let public_address = identity.public_address().to_string();
        let secret_key = identity.secret_key();

        let funding = faucet
            .fund(&public_address)
            .await
            .map_err(WalletError::from);

        match &funding {
            Ok(receipt) => {
                info!(account = %public_address, hash = ?receipt.hash, "funded new account");
                self.install(identity);
            }
            Err(e) => warn!(account = %public_address, "funding failed: {e}"),
        }

        GeneratedIdentity {
            public_address,
            secret_key,
            funding,
        }
    }

    /// Validate `secret` and make it the current identity, replacing any prior one.
    pub fn load_identity(&mut self, secret: &str) -> Result<&Identity, WalletError> {
        let identity = Identity::from_secret(secret)?;
        Ok(self.install(identity))
    }

    /// The active identity, if any.
    pub fn current(&self) -> Option<&Identity> {
        self.current.as_ref()
    }

    fn install(&mut self, identity: Identity) -> &Identity {
        info!(account = %identity.public_address(), "identity installed");
        self.current.insert(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::error::FaucetError;
    use lumen_core::testing::{MockFaucet, MockLedger};
    use std::sync::Arc;

    const SEED_1: &str = "SAAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEAQC5MY";
    const ACCOUNT_1: &str = "GCFIRY65OQE7DFP5KLNS2PF2LVZMUZYJX4OZIEQ36N2IQANUB5XVYOJR";
    const SEED_2: &str = "SABAEAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAFNE7";
    const ACCOUNT_2: &str = "GCATS5YOVB6ROX2WUNKGNQ2MP3GMXDMKSG2O4N5CLX3A6W4PZGZZI55U";

    #[test]
    fn starts_empty() {
        assert!(SessionManager::new().current().is_none());
    }

    #[test]
    fn load_derives_public_address() {
        let mut session = SessionManager::new();
        let id = session.load_identity(SEED_1).unwrap();
        assert_eq!(id.public_address(), ACCOUNT_1);
        assert_eq!(session.current().unwrap().secret_key().as_str(), SEED_1);
    }

    #[test]
    fn load_trims_input() {
        let mut session = SessionManager::new();
        session.load_identity(&format!("  {SEED_1}\n")).unwrap();
        assert_eq!(session.current().unwrap().public_address(), ACCOUNT_1);
    }

    #[test]
    fn load_replaces_previous_identity() {
        let mut session = SessionManager::new();
        session.load_identity(SEED_1).unwrap();
        session.load_identity(SEED_2).unwrap();
        assert_eq!(session.current().unwrap().public_address(), ACCOUNT_2);
    }

    #[test]
    fn invalid_secret_keeps_previous_identity() {
        let mut session = SessionManager::new();
        session.load_identity(SEED_1).unwrap();
        let err = session.load_identity("SNOTASECRET").unwrap_err();
        assert_eq!(err, WalletError::InvalidSecret);
        let err = session.load_identity(ACCOUNT_2).unwrap_err();
        assert_eq!(err, WalletError::InvalidSecret);
        assert_eq!(session.current().unwrap().public_address(), ACCOUNT_1);
    }

    #[test]
    fn debug_redacts_secret() {
        let id = Identity::from_secret(SEED_1).unwrap();
        let dbg = format!("{id:?}");
        assert!(dbg.contains(ACCOUNT_1));
        assert!(!dbg.contains(SEED_1));
    }

    #[tokio::test]
    async fn create_installs_funded_identity() {
        let ledger = Arc::new(MockLedger::new());
        let faucet = MockFaucet::funding(ledger.clone());
        let mut session = SessionManager::new();

        let generated = session.create_identity(&faucet).await;

        assert!(generated.funding.is_ok());
        assert_eq!(
            session.current().unwrap().public_address(),
            generated.public_address
        );
        assert_eq!(faucet.funded(), vec![generated.public_address.clone()]);
        assert!(ledger.account(&generated.public_address).is_some());
    }

    #[tokio::test]
    async fn create_with_failed_funding_reports_key_but_does_not_install() {
        let faucet = MockFaucet::failing(FaucetError::Http(502));
        let mut session = SessionManager::new();
        session.load_identity(SEED_1).unwrap();

        let generated = session.create_identity(&faucet).await;

        assert_eq!(
            generated.funding,
            Err(WalletError::Funding("faucet returned HTTP 502".into()))
        );
        assert!(generated.public_address.starts_with('G'));
        assert!(generated.secret_key.starts_with('S'));
        assert_eq!(session.current().unwrap().public_address(), ACCOUNT_1);
    }
}

//! Shared fixtures for the end-to-end tests.

use std::sync::Arc;

use lumen_core::crypto::KeyPair;
use lumen_core::strkey::{self, KeyKind};
use lumen_core::testing::{MockFaucet, MockLedger};
use lumen_wallet::{Controller, ControllerConfig};
use tokio::io::AsyncBufRead;

/// Secret seed whose 32 seed bytes are all `n`.
pub fn seed(n: u8) -> String {
    strkey::encode(KeyKind::Seed, &[n; 32])
}

/// Account id derived from [`seed`]`(n)`.
pub fn account(n: u8) -> String {
    KeyPair::from_seed_bytes([n; 32]).account_id()
}

/// Ledger holding one account per `(seed byte, native balance)` pair.
pub fn ledger_with(accounts: &[(u8, &str)]) -> Arc<MockLedger> {
    let ledger = MockLedger::new();
    for (n, balance) in accounts {
        ledger.create_account(
            &account(*n),
            lumen_core::amount::Amount::parse(balance).unwrap(),
        );
    }
    Arc::new(ledger)
}

/// Run a controller over `input` until it exits and return everything it printed.
pub async fn run_controller<R>(ledger: Arc<MockLedger>, config: ControllerConfig, input: R) -> String
where
    R: AsyncBufRead + Unpin,
{
    let faucet = Arc::new(MockFaucet::funding(ledger.clone()));
    let mut controller = Controller::new(ledger, faucet, config, input, Vec::new());
    controller.run().await.unwrap();
    String::from_utf8(controller.into_output()).unwrap()
}

/// Run a controller over a fixed script.
pub async fn run_script(ledger: Arc<MockLedger>, script: &str) -> String {
    run_controller(
        ledger,
        ControllerConfig::default(),
        tokio::io::BufReader::new(script.as_bytes()),
    )
    .await
}

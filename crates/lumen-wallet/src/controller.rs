//! Interactive menu loop.
//!
//! The controller is an explicit state machine:
//!
//! ```text
//!            token            done
//! MainMenu ────────► Executing ────► MainMenu
//!    │                   │ monitor
//!    │ EOF / exit        ▼
//!    ▼               Monitoring ── next line ──► MainMenu
//!  Exit ◄─────────────── (EOF)
//! ```
//!
//! Every command is awaited to completion before the next token is read.
//! The balance monitor is the only thing that runs alongside the loop; while
//! it does, the controller prints its reports and waits for one input line.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use lumen_core::constants::{
    BASE_FEE, DEFAULT_MONITOR_INTERVAL_MS, HISTORY_LIMIT, TESTNET_PASSPHRASE,
};
use lumen_core::strkey;
use lumen_core::traits::{Faucet, LedgerClient};
use lumen_core::types::Order;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::sync::mpsc;
use tracing::debug;
use zeroize::Zeroizing;

use crate::amount::normalize_amount;
use crate::batch::{BatchExecutor, parse_destinations};
use crate::builder::PaymentBuilder;
use crate::error::WalletError;
use crate::fee::estimate_fee;
use crate::monitor::{BalanceMonitor, MonitorEvent, MonitorHandle};
use crate::render;
use crate::session::SessionManager;

/// Runtime settings for the menu.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Network passphrase payments are signed for.
    pub passphrase: String,
    /// Monitor interval used when the user enters nothing usable.
    pub monitor_interval: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            passphrase: TESTNET_PASSPHRASE.to_string(),
            monitor_interval: Duration::from_millis(DEFAULT_MONITOR_INTERVAL_MS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    CreateIdentity,
    LoadIdentity,
    Balance,
    Send,
    History,
    Airdrop,
    Monitor,
    FeeCalculator,
    Exit,
}

impl Command {
    fn parse(token: &str) -> Option<Self> {
        Some(match token.trim() {
            "1" => Command::CreateIdentity,
            "2" => Command::LoadIdentity,
            "3" => Command::Balance,
            "4" => Command::Send,
            "5" => Command::History,
            "6" => Command::Airdrop,
            "7" => Command::Monitor,
            "8" => Command::FeeCalculator,
            "9" => Command::Exit,
            _ => return None,
        })
    }
}

enum State {
    MainMenu,
    Executing(Command),
    Monitoring(MonitorHandle, mpsc::UnboundedReceiver<MonitorEvent>),
    Exit,
}

/// Menu-driven front end over the wallet components.
pub struct Controller<R, W> {
    session: SessionManager,
    ledger: Arc<dyn LedgerClient>,
    faucet: Arc<dyn Faucet>,
    builder: PaymentBuilder,
    monitor: BalanceMonitor,
    input: Lines<R>,
    out: W,
    config: ControllerConfig,
}

impl<R, W> Controller<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        faucet: Arc<dyn Faucet>,
        config: ControllerConfig,
        input: R,
        out: W,
    ) -> Self {
        Self {
            session: SessionManager::new(),
            builder: PaymentBuilder::new(ledger.clone(), config.passphrase.clone()),
            monitor: BalanceMonitor::new(ledger.clone()),
            ledger,
            faucet,
            input: input.lines(),
            out,
            config,
        }
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Drive the menu until the exit command or end of input.
    ///
    /// Wallet errors are printed and the loop continues; only I/O errors on
    /// the console itself are returned.
    pub async fn run(&mut self) -> io::Result<()> {
        let mut state = State::MainMenu;
        loop {
            state = match state {
                State::MainMenu => self.main_menu().await?,
                State::Executing(command) => {
                    debug!(?command, "executing");
                    self.execute(command).await?
                }
                State::Monitoring(handle, events) => self.monitoring(handle, events).await?,
                State::Exit => break,
            };
        }
        writeln!(self.out, "Goodbye.")?;
        self.out.flush()
    }

    async fn main_menu(&mut self) -> io::Result<State> {
        let active = self
            .session
            .current()
            .map(|id| id.public_address().to_string());
        writeln!(self.out, "\n=== LUMEN TESTNET WALLET ===")?;
        writeln!(
            self.out,
            "Active account: {}",
            active.as_deref().unwrap_or("none")
        )?;
        writeln!(self.out, "1. Create new account")?;
        writeln!(self.out, "2. Load existing account")?;
        writeln!(self.out, "3. View balance")?;
        writeln!(self.out, "4. Send payment")?;
        writeln!(self.out, "5. View payment history")?;
        writeln!(self.out, "6. Airdrop (batch send)")?;
        writeln!(self.out, "7. Monitor balance")?;
        writeln!(self.out, "8. Fee calculator")?;
        writeln!(self.out, "9. Exit")?;
        write!(self.out, "Choose an option: ")?;
        self.out.flush()?;

        let Some(line) = self.input.next_line().await? else {
            return Ok(State::Exit);
        };
        Ok(match Command::parse(&line) {
            Some(command) => State::Executing(command),
            None => {
                writeln!(self.out, "Invalid option.")?;
                State::MainMenu
            }
        })
    }

    async fn execute(&mut self, command: Command) -> io::Result<State> {
        let result = match command {
            Command::Exit => return Ok(State::Exit),
            Command::Monitor => return self.start_monitor().await,
            Command::CreateIdentity => self.create_identity().await,
            Command::LoadIdentity => self.load_identity().await,
            Command::Balance => self.show_balance().await,
            Command::Send => self.send_payment().await,
            Command::History => self.show_history().await,
            Command::Airdrop => self.airdrop().await,
            Command::FeeCalculator => self.fee_calculator().await,
        };
        if let Err(e) = result? {
            writeln!(self.out, "Error: {e}")?;
        }
        Ok(State::MainMenu)
    }

    /// Print `label` and read one line. End of input reads as an empty line.
    async fn prompt(&mut self, label: &str) -> io::Result<String> {
        write!(self.out, "{label}")?;
        self.out.flush()?;
        Ok(self
            .input
            .next_line()
            .await?
            .map(|line| line.trim().to_string())
            .unwrap_or_default())
    }

    /// Read a secret line straight into zeroizing storage.
    async fn prompt_secret(&mut self, label: &str) -> io::Result<Zeroizing<String>> {
        write!(self.out, "{label}")?;
        self.out.flush()?;
        Ok(Zeroizing::new(
            self.input.next_line().await?.unwrap_or_default(),
        ))
    }

    /// The session's address, or one entered by the user.
    async fn target_address(&mut self) -> io::Result<Result<String, WalletError>> {
        if let Some(id) = self.session.current() {
            return Ok(Ok(id.public_address().to_string()));
        }
        let address = self.prompt("Public key: ").await?;
        if !strkey::is_valid_account_id(&address) {
            return Ok(Err(WalletError::InvalidAddress(address)));
        }
        Ok(Ok(address))
    }

    async fn create_identity(&mut self) -> io::Result<Result<(), WalletError>> {
        writeln!(self.out, "Generating keypair and requesting testnet funds...")?;
        self.out.flush()?;
        let generated = self.session.create_identity(self.faucet.as_ref()).await;
        write!(self.out, "{}", render::generated_identity(&generated))?;
        Ok(Ok(()))
    }

    async fn load_identity(&mut self) -> io::Result<Result<(), WalletError>> {
        let secret = self.prompt_secret("Secret key: ").await?;
        Ok(match self.session.load_identity(secret.trim()) {
            Ok(identity) => {
                writeln!(self.out, "Account loaded: {}", identity.public_address())?;
                Ok(())
            }
            Err(e) => Err(e),
        })
    }

    async fn show_balance(&mut self) -> io::Result<Result<(), WalletError>> {
        let address = match self.target_address().await? {
            Ok(address) => address,
            Err(e) => return Ok(Err(e)),
        };
        Ok(match self.ledger.load_account(&address).await {
            Ok(snapshot) => {
                write!(self.out, "{}", render::account(&snapshot))?;
                Ok(())
            }
            Err(e) => Err(e.into()),
        })
    }

    async fn send_payment(&mut self) -> io::Result<Result<(), WalletError>> {
        if self.session.current().is_none() {
            return Ok(Err(WalletError::NoActiveSession));
        }
        let destination = self.prompt("Destination: ").await?;
        let amount = self.prompt("Amount (XLM): ").await?;
        let memo = self.prompt("Memo (optional): ").await?;

        writeln!(self.out, "Submitting...")?;
        self.out.flush()?;
        let result = self
            .builder
            .build(&self.session, &destination, &amount, Some(&memo))
            .await;
        Ok(match result {
            Ok(res) => {
                let text = render::submission(&destination, &normalize_amount(&amount), &res);
                write!(self.out, "{text}")?;
                Ok(())
            }
            Err(e) => Err(e),
        })
    }

    async fn show_history(&mut self) -> io::Result<Result<(), WalletError>> {
        let address = match self.target_address().await? {
            Ok(address) => address,
            Err(e) => return Ok(Err(e)),
        };
        Ok(
            match self
                .ledger
                .payments_for(&address, HISTORY_LIMIT, Order::Desc)
                .await
            {
                Ok(records) => {
                    write!(self.out, "{}", render::history(&address, &records))?;
                    Ok(())
                }
                Err(e) => Err(e.into()),
            },
        )
    }

    async fn airdrop(&mut self) -> io::Result<Result<(), WalletError>> {
        if self.session.current().is_none() {
            return Ok(Err(WalletError::NoActiveSession));
        }
        let raw = self.prompt("Destinations (comma separated): ").await?;
        let destinations = parse_destinations(&raw);
        if destinations.is_empty() {
            writeln!(self.out, "No destinations given.")?;
            return Ok(Ok(()));
        }
        let amount = self.prompt("Amount per destination (XLM): ").await?;

        writeln!(
            self.out,
            "Sending to {} destinations...",
            destinations.len()
        )?;
        self.out.flush()?;
        let result = BatchExecutor::new(&self.builder)
            .run(&self.session, &destinations, &amount)
            .await;
        Ok(match result {
            Ok(report) => {
                write!(self.out, "{}", render::batch(&report))?;
                Ok(())
            }
            Err(e) => Err(e),
        })
    }

    async fn fee_calculator(&mut self) -> io::Result<Result<(), WalletError>> {
        let txs = self.prompt("Number of transactions: ").await?;
        let Some(txs) = parse_positive(&txs) else {
            return Ok(Err(WalletError::InvalidAmount(format!(
                "{txs:?}: expected a positive integer"
            ))));
        };
        let ops = self.prompt("Operations per transaction: ").await?;
        let Some(ops) = parse_positive(&ops) else {
            return Ok(Err(WalletError::InvalidAmount(format!(
                "{ops:?}: expected a positive integer"
            ))));
        };
        let fee = estimate_fee(txs, ops, BASE_FEE);
        writeln!(self.out, "\n=== FEE ESTIMATE ===")?;
        writeln!(self.out, "Transactions: {txs}")?;
        writeln!(self.out, "Operations per transaction: {ops}")?;
        writeln!(self.out, "Base fee: {BASE_FEE} stroops per operation")?;
        writeln!(self.out, "Estimated total: {fee:.7} XLM")?;
        Ok(Ok(()))
    }

    async fn start_monitor(&mut self) -> io::Result<State> {
        let address = match self.target_address().await? {
            Ok(address) => address,
            Err(e) => {
                writeln!(self.out, "Error: {e}")?;
                return Ok(State::MainMenu);
            }
        };
        let default_ms = self.config.monitor_interval.as_millis();
        let raw = self
            .prompt(&format!("Interval in ms [{default_ms}]: "))
            .await?;
        let interval = parse_positive(&raw)
            .map(Duration::from_millis)
            .unwrap_or(self.config.monitor_interval);

        let (handle, events) = self.monitor.start(address.clone(), interval);
        writeln!(
            self.out,
            "Monitoring {address} every {} ms. Press Enter to stop.",
            handle.interval().as_millis()
        )?;
        self.out.flush()?;
        Ok(State::Monitoring(handle, events))
    }

    async fn monitoring(
        &mut self,
        handle: MonitorHandle,
        mut events: mpsc::UnboundedReceiver<MonitorEvent>,
    ) -> io::Result<State> {
        let mut events_open = true;
        loop {
            tokio::select! {
                event = events.recv(), if events_open => match event {
                    Some(event) => {
                        writeln!(self.out, "{}", render::monitor_event(&event))?;
                        self.out.flush()?;
                    }
                    None => events_open = false,
                },
                line = self.input.next_line() => {
                    // A fetch already in flight finishes in the background
                    // and its result is discarded.
                    handle.cancel();
                    while let Ok(event) = events.try_recv() {
                        writeln!(self.out, "{}", render::monitor_event(&event))?;
                    }
                    writeln!(self.out, "Monitoring stopped.")?;
                    self.out.flush()?;
                    drop(handle);
                    return Ok(match line? {
                        Some(_) => State::MainMenu,
                        None => State::Exit,
                    });
                }
            }
        }
    }
}

fn parse_positive(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|n| *n > 0)
}

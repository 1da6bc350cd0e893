//! Console formatting for the interactive menu.
//!
//! Everything here returns plain `String`s so the controller decides where
//! they go and tests can assert on them.

use std::fmt::Write;

use lumen_core::types::{AccountSnapshot, Balance, PaymentRecord, SubmissionResult};

use crate::batch::BatchReport;
use crate::error::WalletError;
use crate::monitor::MonitorEvent;
use crate::reserve::reserve_breakdown;
use crate::session::GeneratedIdentity;

/// First `n` characters of `s`, with an ellipsis when something was cut.
pub fn short(s: &str, n: usize) -> String {
    if s.chars().count() <= n {
        return s.to_string();
    }
    let head: String = s.chars().take(n).collect();
    format!("{head}…")
}

pub fn generated_identity(generated: &GeneratedIdentity) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n=== ACCOUNT CREATED ===");
    let _ = writeln!(out, "Public key: {}", generated.public_address);
    let _ = writeln!(out, "Secret key: {}", generated.secret_key.as_str());
    let _ = writeln!(out, "\nWARNING: The secret key will NOT be shown again.");
    match &generated.funding {
        Ok(receipt) => {
            let _ = writeln!(
                out,
                "Funded by faucet. Tx: {}",
                receipt.hash.as_deref().unwrap_or("(not reported)")
            );
        }
        Err(WalletError::Funding(reason)) => {
            let _ = writeln!(out, "Funding failed: {reason}");
            let _ = writeln!(out, "The account was NOT activated for this session.");
        }
        Err(e) => {
            let _ = writeln!(out, "Funding failed: {e}");
            let _ = writeln!(out, "The account was NOT activated for this session.");
        }
    }
    out
}

/// Account id, sequence and every balance line. The native line carries the
/// reserve split.
pub fn account(snapshot: &AccountSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n=== ACCOUNT BALANCE ===");
    let _ = writeln!(out, "Account:  {}", snapshot.id());
    let _ = writeln!(out, "Sequence: {}", snapshot.sequence());
    let _ = writeln!(out, "Subentries: {}", snapshot.subentry_count());
    if snapshot.balances().is_empty() {
        let _ = writeln!(out, "\nNo balances.");
        return out;
    }
    let _ = writeln!(out);
    for balance in snapshot.balances() {
        match balance {
            Balance::Native { amount } => {
                let b = reserve_breakdown(snapshot);
                let _ = writeln!(out, "XLM:       {amount}");
                let _ = writeln!(out, "  Locked:    {}", b.locked);
                let _ = writeln!(out, "  Available: {}", b.available);
            }
            Balance::Issued {
                asset_code,
                asset_issuer,
                amount,
            } => {
                let _ = writeln!(
                    out,
                    "{asset_code}: {amount} (issuer {})",
                    short(asset_issuer, 8)
                );
            }
        }
    }
    out
}

/// Payment-type records from `account`'s point of view.
pub fn history(account: &str, records: &[PaymentRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n=== PAYMENT HISTORY ===");
    let _ = writeln!(out, "Account: {account}");
    let payments: Vec<&PaymentRecord> = records.iter().filter(|r| r.is_payment()).collect();
    if payments.is_empty() {
        let _ = writeln!(out, "No payments found.");
        return out;
    }
    for record in payments {
        let (dir, counterparty) = if record.is_incoming_for(account) {
            ("IN ", &record.from)
        } else {
            ("OUT", &record.to)
        };
        let _ = writeln!(
            out,
            "{} {dir} {} {} {} {}",
            record.created_at.format("%Y-%m-%d %H:%M:%S"),
            record.amount,
            record.asset,
            if dir == "OUT" { "to" } else { "from" },
            short(counterparty, 8),
        );
    }
    out
}

pub fn submission(destination: &str, amount: &str, result: &SubmissionResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n=== PAYMENT SENT ===");
    let _ = writeln!(out, "To:     {destination}");
    let _ = writeln!(out, "Amount: {amount} XLM");
    let _ = writeln!(out, "Hash:   {}", result.hash);
    match result.ledger {
        Some(ledger) => {
            let _ = writeln!(out, "Ledger: {ledger}");
        }
        None => {
            let _ = writeln!(out, "Status: {:?}", result.status);
        }
    }
    out
}

/// One line per destination followed by a summary.
pub fn batch(report: &BatchReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n=== AIRDROP RESULTS ===");
    for (i, outcome) in report.outcomes.iter().enumerate() {
        match &outcome.result {
            Ok(res) => {
                let _ = writeln!(
                    out,
                    "[{}] OK   {} hash {}",
                    i + 1,
                    short(&outcome.destination, 8),
                    res.hash
                );
            }
            Err(e) => {
                let _ = writeln!(
                    out,
                    "[{}] FAIL {} {e}",
                    i + 1,
                    short(&outcome.destination, 8)
                );
            }
        }
    }
    let _ = writeln!(
        out,
        "\nSent {} XLM to {} of {} destinations ({} failed).",
        report.amount,
        report.succeeded(),
        report.outcomes.len(),
        report.failed()
    );
    out
}

pub fn monitor_event(event: &MonitorEvent) -> String {
    match event {
        MonitorEvent::Balance {
            at,
            account,
            native,
        } => format!(
            "[{}] {}: {native} XLM",
            at.format("%H:%M:%S"),
            short(account, 8)
        ),
        MonitorEvent::Error { at, message } => {
            format!("[{}] error: {message}", at.format("%H:%M:%S"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use lumen_core::amount::Amount;
    use lumen_core::traits::FundingReceipt;
    use lumen_core::types::{Asset, SubmissionStatus};
    use zeroize::Zeroizing;

    const ME: &str = "GCFIRY65OQE7DFP5KLNS2PF2LVZMUZYJX4OZIEQ36N2IQANUB5XVYOJR";
    const OTHER: &str = "GCATS5YOVB6ROX2WUNKGNQ2MP3GMXDMKSG2O4N5CLX3A6W4PZGZZI55U";

    fn record(kind: &str, from: &str, to: &str) -> PaymentRecord {
        PaymentRecord {
            id: "1".into(),
            kind: kind.into(),
            from: from.into(),
            to: to.into(),
            amount: Amount::from_stroops(50_000_000),
            asset: Asset::Native,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            transaction_hash: "ab".into(),
        }
    }

    fn generated(funding: Result<FundingReceipt, WalletError>) -> GeneratedIdentity {
        GeneratedIdentity {
            public_address: ME.into(),
            secret_key: Zeroizing::new("SSECRET".into()),
            funding,
        }
    }

    #[test]
    fn generated_identity_reports_funding() {
        let text = generated_identity(&generated(Ok(FundingReceipt {
            hash: Some("cafe".into()),
        })));
        assert!(text.contains("Secret key: SSECRET"));
        assert!(text.contains("Funded by faucet. Tx: cafe"));
        assert!(!text.contains("NOT activated"));
    }

    #[test]
    fn generated_identity_reports_funding_failure() {
        let text = generated_identity(&generated(Err(WalletError::Funding(
            "faucet returned HTTP 503".into(),
        ))));
        assert!(text.contains(&format!("Public key: {ME}")));
        assert!(text.contains("Funding failed: faucet returned HTTP 503\n"));
        assert!(text.contains("The account was NOT activated for this session."));
        assert!(!text.contains("Funded by faucet"));

        let text = generated_identity(&generated(Err(WalletError::TransientNetwork(
            "timed out".into(),
        ))));
        assert!(text.contains("Funding failed: network error: timed out"));
        assert!(text.contains("NOT activated"));
    }

    #[test]
    fn short_truncates_with_ellipsis() {
        assert_eq!(short("GABCDEFGH", 4), "GABC…");
        assert_eq!(short("GAB", 4), "GAB");
    }

    #[test]
    fn account_shows_reserve_split_and_issuer() {
        let snap = AccountSnapshot::new(
            ME,
            77,
            1,
            vec![
                Balance::Native {
                    amount: Amount::from_stroops(100_000_000),
                },
                Balance::Issued {
                    asset_code: "USDC".into(),
                    asset_issuer: OTHER.into(),
                    amount: Amount::from_stroops(1),
                },
            ],
        )
        .unwrap();
        let text = account(&snap);
        assert!(text.contains("Sequence: 77"));
        assert!(text.contains("XLM:       10.0000000"));
        assert!(text.contains("Locked:    1.0000000"));
        assert!(text.contains("Available: 9.0000000"));
        assert!(text.contains("USDC: 0.0000001 (issuer GCATS5YO…)"));
    }

    #[test]
    fn history_marks_direction_and_skips_non_payments() {
        let records = vec![
            record("payment", OTHER, ME),
            record("create_account", OTHER, ME),
            record("payment", ME, OTHER),
        ];
        let text = history(ME, &records);
        let lines: Vec<&str> = text.lines().filter(|l| l.starts_with("1970")).collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(" IN  5.0000000 XLM from GCATS5YO…"));
        assert!(lines[1].contains(" OUT 5.0000000 XLM to GCATS5YO…"));
    }

    #[test]
    fn empty_history() {
        assert!(history(ME, &[]).contains("No payments found."));
    }

    #[test]
    fn submission_shows_hash_and_ledger() {
        let res = SubmissionResult {
            hash: "deadbeef".into(),
            status: SubmissionStatus::Success,
            ledger: Some(12),
        };
        let text = submission(OTHER, "5", &res);
        assert!(text.contains("Hash:   deadbeef"));
        assert!(text.contains("Ledger: 12"));
    }
}

//! Protocol constants. All monetary values in stroops (1 XLM = 10^7 stroops).

/// Stroops per whole unit of the native asset.
pub const STROOPS_PER_UNIT: i64 = 10_000_000;

/// Maximum number of fractional digits a native amount may carry.
pub const AMOUNT_DECIMALS: usize = 7;

/// Minimum balance every account must keep, independent of activity (0.5 XLM).
pub const BASE_RESERVE: i64 = STROOPS_PER_UNIT / 2;

/// Additional reserve locked per subentry such as a trust line (0.5 XLM).
pub const SUBENTRY_RESERVE: i64 = STROOPS_PER_UNIT / 2;

/// Protocol minimum fee per operation, in stroops.
pub const BASE_FEE: u32 = 100;

/// Maximum size of a text memo, in bytes.
pub const MAX_MEMO_BYTES: usize = 28;

/// Validity window attached to every submitted transaction, in seconds.
pub const TX_TIMEOUT_SECS: u64 = 30;

/// Number of records the history view requests.
pub const HISTORY_LIMIT: u32 = 10;

/// Default balance monitor polling interval, in milliseconds.
pub const DEFAULT_MONITOR_INTERVAL_MS: u64 = 10_000;

/// Passphrase of the public test network.
pub const TESTNET_PASSPHRASE: &str = "Test SDF Network ; September 2015";

/// Passphrase of the production network.
pub const PUBLIC_PASSPHRASE: &str = "Public Global Stellar Network ; September 2015";

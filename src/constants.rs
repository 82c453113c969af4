use std::time::Duration;

/// Contract deployed when `--contract` is not given.
pub const DEFAULT_CONTRACT: &str = "Exchange";
/// Maximum number of whitelisted addresses.
pub const DEFAULT_CONSTRUCTOR_ARGS: &[&str] = &["10"];
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8545";
pub const DEFAULT_ETHERSCAN_API_URL: &str = "https://api.etherscan.io/v2/api";

/// Time given to the explorer to index a fresh deployment before verifying it.
pub const DEFAULT_VERIFICATION_DELAY_SECS: u64 = 30;

pub const STATUS_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const MAX_STATUS_CHECKS: usize = 20;

/// EIP-170 runtime code limit, in KiB.
pub const RUNTIME_CODE_LIMIT_KIB: u64 = 24;
/// EIP-3860 init code limit, in KiB.
pub const INIT_CODE_LIMIT_KIB: u64 = 48;

//! Application constants
//!
//! Centralized location for all domain-level constants used by the sync
//! engine and its adapters.

// Batch sizing
/// Remote bulk node lookup limit.
pub const FETCH_BATCH_SIZE: usize = 250;
/// Items per inventory write mutation.
pub const WRITE_BATCH_SIZE: usize = 10;
pub const BATCH_DELAY_MS: u64 = 100;

// Retry policy
pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const RETRY_DELAYS_MS: [u64; 2] = [100, 500];
pub const RETRYABLE_STATUS_CODES: [u16; 6] = [408, 429, 500, 502, 503, 504];
pub const NON_RETRYABLE_STATUS_CODES: [u16; 5] = [400, 401, 403, 404, 422];

// Critical failure detection
pub const HIGH_FAILURE_RATE_THRESHOLD: f64 = 0.5;
pub const CONSECUTIVE_FAILURE_THRESHOLD: u32 = 3;

// Run log
pub const LOG_ERROR_LIMIT: usize = 5;

// Remote commerce API
pub const DEFAULT_API_VERSION: &str = "2024-10";
pub const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";
pub const INVENTORY_QUANTITY_NAME: &str = "available";
pub const INVENTORY_ADJUST_REASON: &str = "correction";

//! Shared constants used across FieldGrid crates.

/// Default API port for FieldGrid.
pub const DEFAULT_PORT: u16 = 38420;

/// Default maximum request body accepted by the API layer.
pub const DEFAULT_MAX_REQUEST_SIZE: usize = 8 * 1024 * 1024;

/// Posts shown per grid page.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Posts sent per save request.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Pause between consecutive save requests, in milliseconds.
pub const DEFAULT_BATCH_PAUSE_MS: u64 = 100;

/// Anti-forgery token lifetime in seconds.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 12 * 60 * 60;

/// Most anti-forgery tokens kept at once; the oldest are evicted first.
pub const MAX_LIVE_TOKENS: usize = 1024;

/// Default base URL for CLI/API clients.
pub const DEFAULT_CLI_SERVER_URL: &str = "http://localhost:38420";

/// Prefix marking a meta key as internal; such keys never reach the grid.
pub const INTERNAL_KEY_PREFIX: char = '_';

/// Return `true` when `key` is reserved for host-internal use.
pub fn is_internal_key(key: &str) -> bool {
    key.starts_with(INTERNAL_KEY_PREFIX)
}

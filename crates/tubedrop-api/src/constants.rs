//! API constants

/// Versioned prefix for the JSON API.
pub const API_PREFIX: &str = "/api/v0";

/// Path under which local bucket mode serves published files.
pub const LOCAL_FILES_PATH: &str = "/files";

/// Seconds between refreshes of a pending download page.
pub const PENDING_REFRESH_SECS: u32 = 2;

/// Largest accepted request body. Requests only carry a short form.
pub const MAX_REQUEST_BODY_BYTES: usize = 16 * 1024;

/// Requests handled at once. Download jobs run outside this limit.
pub const MAX_CONCURRENT_REQUESTS: usize = 256;

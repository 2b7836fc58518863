//! Network-related constants.

/// Default port for the management API server.
pub const DEFAULT_API_PORT: u16 = 8443;

/// Response header carrying the per-request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

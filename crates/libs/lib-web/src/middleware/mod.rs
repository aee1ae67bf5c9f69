//! # Middleware
//!
//! - **[`mw_auth`]**: JWT authentication and the admin guard
//! - **[`mw_req_stamp`]**: request id and timestamp stamping
//! - **[`mw_logging`]**: request/response logging with header redaction
//! - **[`mw_res_map`]**: uniform JSON error bodies

// region: --- Modules
pub mod mw_auth;
pub mod mw_logging;
pub mod mw_req_stamp;
pub mod mw_res_map;
// endregion: --- Modules

// region: --- Re-exports
pub use mw_auth::{require_admin, require_auth};
pub use mw_logging::log_requests;
pub use mw_req_stamp::{stamp_req, RequestStamp};
pub use mw_res_map::map_res;
// endregion: --- Re-exports

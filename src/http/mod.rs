//! HTTP session module
//!
//! Wraps `reqwest` with the pieces every API call shares:
//!
//! - **Token injection**: the access token rides along as a header
//! - **Envelope handling**: responses arrive as `{response|payload, meta}`
//! - **URL building**: paths join the configured base URL, absolute URLs
//!   pass through untouched

mod session;

pub use session::{ApiResponse, Session};

//! # parlor
//!
//! An async Rust client for the GroupMe group-messaging REST API.
//!
//! ## Features
//!
//! - **Resource managers**: groups, messages, direct messages, memberships,
//!   chats, bots, blocks, users, and the image service
//! - **Cursor pagination**: page-number, message-ID, and timestamp cursors
//!   behind one generic [`Pager`](pagination::Pager)
//! - **Asynchronous membership results**: bulk member adds with bounded
//!   polling until the server finishes processing
//! - **Attribute filters**: locate a unique entity in a collection with
//!   operator-suffixed attribute tests
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use parlor::{Client, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = Client::new("<access token>")?;
//!
//!     // Page through every group
//!     for group in client.groups().list_all(Some(50), None).await? {
//!         println!("{}", group.name);
//!     }
//!
//!     // Drain a group's message history
//!     let messages = client.messages("12345").list().await?.all().await?;
//!     println!("{} messages", messages.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Client                             │
//! │  groups() chats() bots() user() images() messages(id) ...   │
//! └─────────────────────────────────────────────────────────────┘
//!                │                 │                 │
//! ┌──────────────┴───┬─────────────┴─────┬───────────┴──────────┐
//! │     Session      │     Pagination    │   Membership poller  │
//! ├──────────────────┼───────────────────┼──────────────────────┤
//! │ token header     │ page cursor       │ guid correlation     │
//! │ envelope unwrap  │ id cursor         │ pending/ready/expired│
//! │ GET/POST/DELETE  │ timestamp cursor  │ bounded poll loop    │
//! └──────────────────┴───────────────────┴──────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the client
pub mod error;

/// Configuration for API endpoints and credentials
pub mod config;

/// HTTP session and response envelope handling
pub mod http;

/// Cursor strategies and the generic pager
pub mod pagination;

/// Resource managers and entities
pub mod api;

/// Attribute filters for locating entities in collections
pub mod filter;

/// The top-level client
pub mod client;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::Client;
pub use config::Config;
pub use error::{Error, Result};
pub use filter::Filter;
pub use pagination::{Pager, Params};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

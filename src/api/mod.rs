// snip server API module.
// Client, typed endpoints, and wire types.

pub mod client;
pub mod endpoints;
pub mod types;

pub use client::{ApiClient, ensure_https};
pub use types::*;

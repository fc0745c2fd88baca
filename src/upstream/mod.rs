//! Upstream fetch subsystem.
//!
//! # Data Flow
//! ```text
//! validated target URL + caller's Accept header
//!     → client.rs (browser-like request, header deadline, per-read body timeout)
//!     → reqwest::Response handed to the content dispatcher
//! ```
//!
//! # Design Decisions
//! - One shared `reqwest::Client` (connection pooling across requests)
//! - No caching and no retries: a failed fetch is reported to the caller
//! - Redirects are followed, like a browser fetch

pub mod client;

pub use client::{ClientBuildError, FetchError, UpstreamClient};

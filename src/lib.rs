//! Rewriting reverse proxy that makes third-party pages embeddable in an iframe.
//!
//! A request for `/?url=<absolute-url>` fetches the target, strips headers
//! that forbid framing, forces permissive CORS, and rewrites every resource
//! reference in HTML and CSS so it loads through the proxy as well.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod rewrite;
pub mod upstream;

pub use config::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;

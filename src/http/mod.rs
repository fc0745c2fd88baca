//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, graceful shutdown)
//!     → request.rs (request ID)
//!     → handler.rs (method routing, `url` validation, upstream fetch)
//!     → dispatch.rs (HTML / CSS rewrite or byte passthrough)
//!     → headers.rs (strip framing headers, force CORS)
//!     → Send to client
//! ```

pub mod dispatch;
pub mod error;
pub mod handler;
pub mod headers;
pub mod request;
pub mod server;

pub use error::ProxyError;
pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer, ServerError};

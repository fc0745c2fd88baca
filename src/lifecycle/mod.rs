//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     spawn(server) → server task owned by the coordinator
//!     drain(grace)  → trigger → servers stop accepting → in-flight finish
//!                   → stragglers aborted after the grace period
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → graceful shutdown
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;

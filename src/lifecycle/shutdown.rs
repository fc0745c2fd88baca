//! Shutdown coordination for the proxy.

use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::http::{HttpServer, ServerError};

/// Owns the running servers and stops them together.
///
/// Servers started through [`Shutdown::spawn`] run on their own tasks and
/// listen for [`Shutdown::trigger`] as well as OS signals. Dropping the
/// coordinator triggers shutdown without waiting.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
    servers: Vec<JoinHandle<Result<(), ServerError>>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            tx,
            servers: Vec::new(),
        }
    }

    /// Serve `listener` on a background task until shutdown.
    pub fn spawn(&mut self, server: HttpServer, listener: TcpListener) {
        let signal = self.tx.subscribe();
        self.servers
            .push(tokio::spawn(async move { server.run(listener, signal).await }));
    }

    /// Number of spawned servers that have not exited yet.
    pub fn running(&self) -> usize {
        self.servers.iter().filter(|h| !h.is_finished()).count()
    }

    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Wait for every spawned server to exit on its own (OS signal or error).
    ///
    /// Returns the first server error; a panicked server task is logged.
    pub async fn wait(&mut self) -> Result<(), ServerError> {
        let mut first_error = None;
        for handle in self.servers.drain(..) {
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "Server exited with error");
                    first_error.get_or_insert(e);
                }
                Err(e) => tracing::error!(error = %e, "Server task failed"),
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Trigger shutdown and give servers `grace` to finish in-flight requests.
    ///
    /// Servers still running after the grace period are aborted. Returns
    /// whether everything stopped in time.
    pub async fn drain(mut self, grace: Duration) -> bool {
        self.trigger();
        let aborts: Vec<_> = self.servers.iter().map(|h| h.abort_handle()).collect();

        match tokio::time::timeout(grace, self.wait()).await {
            Ok(_) => true,
            Err(_) => {
                tracing::warn!(grace_secs = grace.as_secs(), "Servers did not drain in time");
                aborts.iter().for_each(|h| h.abort());
                false
            }
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Shutdown {
    fn drop(&mut self) {
        self.trigger();
    }
}

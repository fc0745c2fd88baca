//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::time::Duration;

use frame_proxy::config::ProxyConfig;
use frame_proxy::http::HttpServer;
use frame_proxy::lifecycle::Shutdown;
use frame_proxy::rewrite::ProxyBase;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// A proxy running on an ephemeral local port; stopped on drop.
pub struct TestProxy {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

#[allow(dead_code)]
impl TestProxy {
    /// Base URL of the running proxy, e.g. `http://127.0.0.1:41234`.
    pub fn base(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// URL asking the proxy to fetch `target`.
    pub fn proxied(&self, target: &str) -> String {
        ProxyBase::new(self.base()).endpoint(target)
    }

    /// Stop the proxy, allowing `grace` for in-flight requests.
    pub async fn stop(self, grace: Duration) -> bool {
        self.shutdown.drain(grace).await
    }
}

/// Start a proxy with default config, adjusted by `configure`.
pub async fn start_proxy<F>(configure: F) -> TestProxy
where
    F: FnOnce(&mut ProxyConfig),
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let mut config = ProxyConfig::default();
    config.listener.bind_address = addr.to_string();
    config.proxy.public_url = Some(format!("http://{}", addr));
    configure(&mut config);

    let mut shutdown = Shutdown::new();
    shutdown.spawn(HttpServer::new(config).unwrap(), listener);

    TestProxy { addr, shutdown }
}

/// Client that never routes through a system proxy.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

/// An address nothing listens on.
#[allow(dead_code)]
pub fn closed_port() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// Start a raw HTTP/1.1 upstream that writes `head`, then each of `chunks`
/// with `pause` between them.
#[allow(dead_code)]
pub async fn start_trickle_backend(
    head: &'static str,
    chunks: Vec<&'static [u8]>,
    pause: Duration,
) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let chunks = chunks.clone();
                    tokio::spawn(async move {
                        let mut request = Vec::new();
                        let mut buf = [0u8; 1024];
                        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                            match socket.read(&mut buf).await {
                                Ok(0) | Err(_) => return,
                                Ok(n) => request.extend_from_slice(&buf[..n]),
                            }
                        }

                        if socket.write_all(head.as_bytes()).await.is_err() {
                            return;
                        }
                        for (i, chunk) in chunks.iter().enumerate() {
                            if i > 0 {
                                tokio::time::sleep(pause).await;
                            }
                            if socket.write_all(chunk).await.is_err() {
                                return;
                            }
                        }
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

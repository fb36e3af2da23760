use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;
use crate::{log_info, log_warn};

use super::ConnectivityMonitor;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

/// Background reachability probe. Issues a HEAD request against the
/// configured probe URL on an interval and feeds the verdict into the
/// monitor; the monitor decides whether that is a transition worth
/// announcing.
pub struct HttpProber {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl HttpProber {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
        }
    }

    /// Spawn the probe loop. The first probe fires immediately so the
    /// monitor leaves `Unknown` without waiting a full interval.
    pub fn start(&mut self, monitor: ConnectivityMonitor, config: Arc<AppConfig>) -> Result<()> {
        if self.handle.is_some() {
            bail!("connectivity probing already active");
        }

        let client = reqwest::Client::builder()
            .timeout(config.probe_timeout())
            .build()
            .context("failed to build connectivity probe client")?;

        let cancel_token = CancellationToken::new();
        let token_clone = cancel_token.clone();

        let handle = tokio::spawn(probe_loop(client, monitor, config, token_clone));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("probe loop task failed to join")
                .map(|_| ())
        } else {
            Ok(())
        }
    }
}

impl Default for HttpProber {
    fn default() -> Self {
        Self::new()
    }
}

async fn probe_loop(
    client: reqwest::Client,
    monitor: ConnectivityMonitor,
    config: Arc<AppConfig>,
    cancel_token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(config.probe_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let reachable = probe_once(&client, &config.probe_url).await;
                monitor.report(reachable);
            }
            _ = cancel_token.cancelled() => {
                log_info!("connectivity probe loop shutting down");
                break;
            }
        }
    }
}

/// A probe counts as online only on a 2xx answer. Transport errors
/// (DNS, refused, timeout) all read as offline.
async fn probe_once(client: &reqwest::Client, url: &str) -> bool {
    match client.head(url).send().await {
        Ok(response) => response.status().is_success(),
        Err(err) => {
            log_warn!("connectivity probe failed: {err}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;
    use crate::connectivity::ConnectivityState;

    async fn canned_head_server(response: &'static str) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    break;
                };
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf).await;
                let _ = stream.write_all(response.as_bytes()).await;
            }
        });
        addr
    }

    #[tokio::test]
    async fn successful_probe_marks_monitor_online() {
        let addr = canned_head_server("HTTP/1.1 200 OK\r\ncontent-length: 0\r\n\r\n").await;
        let config = Arc::new(AppConfig {
            probe_url: format!("http://{addr}/"),
            ..AppConfig::default()
        });

        let monitor = ConnectivityMonitor::new();
        let mut events = monitor.subscribe();
        let mut prober = HttpProber::new();
        prober.start(monitor.clone(), config).unwrap();

        let change = events.recv().await.unwrap();
        assert_eq!(change.current, ConnectivityState::Online);
        assert!(monitor.is_online());

        prober.stop().await.unwrap();
    }

    #[tokio::test]
    async fn unreachable_probe_marks_monitor_offline() {
        // Bind then drop so the port is very likely closed.
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };
        let config = Arc::new(AppConfig {
            probe_url: format!("http://{addr}/"),
            ..AppConfig::default()
        });

        let monitor = ConnectivityMonitor::new();
        let mut events = monitor.subscribe();
        let mut prober = HttpProber::new();
        prober.start(monitor.clone(), config).unwrap();

        let change = events.recv().await.unwrap();
        assert_eq!(change.current, ConnectivityState::Offline);

        prober.stop().await.unwrap();
    }

    #[tokio::test]
    async fn starting_twice_is_rejected() {
        let monitor = ConnectivityMonitor::new();
        let config = Arc::new(AppConfig::default());
        let mut prober = HttpProber::new();
        prober.start(monitor.clone(), Arc::clone(&config)).unwrap();
        assert!(prober.start(monitor, config).is_err());
        prober.stop().await.unwrap();
    }
}

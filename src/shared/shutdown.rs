//! Graceful shutdown signalling shared by the HTTP server and background tasks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

/// Cloneable shutdown flag. Every clone observes the same trigger.
#[derive(Clone)]
pub struct ShutdownSignal {
    sender: Arc<watch::Sender<bool>>,
    triggered: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
            triggered: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    pub fn trigger(&self) {
        if !self.triggered.swap(true, Ordering::SeqCst) {
            info!("Shutdown signal triggered");
            self.sender.send_replace(true);
        }
    }

    /// Resolves once [`ShutdownSignal::trigger`] has been called, including
    /// when it was called before this future was created.
    pub async fn wait(&self) {
        let mut rx = self.sender.subscribe();
        // Err only when the sender is gone, which cannot happen while `self` holds it.
        let _ = rx.wait_for(|triggered| *triggered).await;
    }

    /// Spawns a task that triggers this signal on SIGINT / SIGTERM.
    pub fn listen_for_os_signals(&self) {
        let signal = self.clone();
        tokio::spawn(async move {
            wait_for_os_signal().await;
            signal.trigger();
        });
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

async fn wait_for_os_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler, falling back to Ctrl+C only");
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Received SIGINT");
                }
                return;
            }
        };

        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM"),
            res = tokio::signal::ctrl_c() => {
                if let Err(e) = res {
                    warn!(error = %e, "Ctrl+C handler failed");
                }
                info!("Received SIGINT");
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Ctrl+C handler failed");
        }
        info!("Received Ctrl+C");
    }
}

//! Runtime - shutdown and signal handling for the native front end

use futures::channel::mpsc;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use crate::app::Event;

/// Shutdown signal broadcaster. Triggers at most once.
#[derive(Clone)]
pub struct Shutdown {
    sender: broadcast::Sender<()>,
    triggered: Arc<RwLock<bool>>,
}

impl Default for Shutdown {
    fn default() -> Self { Self::new() }
}

impl Shutdown {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self { sender, triggered: Arc::new(RwLock::new(false)) }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }

    pub async fn trigger(&self) {
        let mut triggered = self.triggered.write().await;
        if !*triggered {
            *triggered = true;
            let _ = self.sender.send(());
        }
    }

    pub async fn is_triggered(&self) -> bool {
        *self.triggered.read().await
    }

    /// Deliver `Event::Shutdown` to an app's event channel once triggered.
    pub fn forward_to(&self, events: mpsc::UnboundedSender<Event>) {
        let mut rx = self.subscribe();
        tokio::spawn(async move {
            if rx.recv().await.is_ok() {
                let _ = events.unbounded_send(Event::Shutdown);
            }
        });
    }
}

/// Install SIGINT/SIGTERM handlers and return the shutdown handle.
pub fn install_signal_handlers() -> Shutdown {
    let shutdown = Shutdown::new();
    let handle = shutdown.clone();

    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let (mut sigterm, mut sigint) = match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(term), Ok(int)) => (term, int),
                (Err(e), _) | (_, Err(e)) => {
                    tracing::warn!("signal handlers unavailable: {}", e);
                    return;
                }
            };

            tokio::select! {
                _ = sigterm.recv() => tracing::info!("Received SIGTERM"),
                _ = sigint.recv() => tracing::info!("Received SIGINT"),
            }
        }

        #[cfg(not(unix))]
        {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("Ctrl+C handler unavailable: {}", e);
                return;
            }
            tracing::info!("Received Ctrl+C");
        }

        handle.trigger().await;
    });

    shutdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn trigger_is_idempotent() {
        let shutdown = Shutdown::new();
        let mut rx = shutdown.subscribe();
        assert!(!shutdown.is_triggered().await);
        shutdown.trigger().await;
        shutdown.trigger().await;
        assert!(shutdown.is_triggered().await);
        assert!(rx.recv().await.is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn forwards_shutdown_event() {
        let shutdown = Shutdown::new();
        let (tx, mut rx) = mpsc::unbounded();
        shutdown.forward_to(tx);
        shutdown.trigger().await;
        assert_eq!(rx.next().await, Some(Event::Shutdown));
    }
}

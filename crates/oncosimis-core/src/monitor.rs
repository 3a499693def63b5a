use std::time::Duration;

use tracing::debug;

use crate::client::BackendClient;
use crate::connectivity::Connectivity;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Polls `/health` and reports a [`Connectivity`] after every attempt.
pub struct StatusMonitor {
    client: BackendClient,
    interval: Duration,
}

impl StatusMonitor {
    pub fn new(client: BackendClient, interval: Duration) -> Self {
        Self { client, interval }
    }

    pub async fn poll_once(&self) -> Connectivity {
        let outcome = self.client.health().await;
        if let Err(e) = &outcome {
            debug!(error = %e, "health poll failed");
        }
        Connectivity::classify(&outcome)
    }

    /// Poll until `report` returns false.
    ///
    /// The wait starts after a poll resolves, so a slow backend stretches the
    /// cycle instead of stacking requests.
    pub async fn run<F>(self, mut report: F)
    where
        F: FnMut(Connectivity) -> bool,
    {
        loop {
            let connectivity = self.poll_once().await;
            if !report(connectivity) {
                break;
            }
            tokio::time::sleep(self.interval).await;
        }
    }
}

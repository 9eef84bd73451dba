//! Per-node fetch loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::config::schema::NodeConfig;
use crate::panel::{FetchOutcome, NodeInfo, PanelClient, PanelResult};

/// Poll period used until the panel announces its own `pull_interval`.
pub const DEFAULT_PULL_INTERVAL: Duration = Duration::from_secs(60);

/// Upper bound on the poll period, whatever the panel announces.
pub const MAX_PULL_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Latest node information published by a [`NodeSync`].
pub type NodeInfoReceiver = watch::Receiver<Option<Arc<NodeInfo>>>;

pub struct NodeSync {
    client: PanelClient,
    tx: watch::Sender<Option<Arc<NodeInfo>>>,
    period: Duration,
}

impl NodeSync {
    /// Create the loop for one node and the receiver its results go to.
    pub fn new(config: &NodeConfig) -> PanelResult<(Self, NodeInfoReceiver)> {
        let client = PanelClient::new(config)?;
        let (tx, rx) = watch::channel(None);
        Ok((
            Self {
                client,
                tx,
                period: DEFAULT_PULL_INTERVAL,
            },
            rx,
        ))
    }

    /// Current poll period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Fetch once and publish a changed result.
    ///
    /// Returns true when new node information was published.
    pub async fn sync_once(&mut self) -> bool {
        let node_id = self.client.identity().node_id;
        match self.client.fetch().await {
            Ok(FetchOutcome::Changed(info)) => {
                let pull = info.base_config.pull_interval;
                if pull > 0 {
                    self.period = Duration::from_secs(pull).min(MAX_PULL_INTERVAL);
                }
                self.tx.send_replace(Some(Arc::new(info)));
                true
            }
            Ok(FetchOutcome::Unchanged) => false,
            Err(e) => {
                tracing::error!(node_id, error = %e, "Get node info failed");
                false
            }
        }
    }

    /// Poll until the task is dropped or aborted.
    pub async fn run(mut self) {
        tracing::info!(
            node_id = self.client.identity().node_id,
            node_type = %self.client.identity().node_type,
            "Node sync starting"
        );

        let mut ticker = time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let before = self.period;
            if self.sync_once().await && self.period != before {
                tracing::info!(
                    node_id = self.client.identity().node_id,
                    period_secs = self.period.as_secs(),
                    "Pull interval changed"
                );
                let start = Instant::now()
                    .checked_add(self.period)
                    .unwrap_or_else(Instant::now);
                ticker = time::interval_at(start, self.period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            }
        }
    }
}

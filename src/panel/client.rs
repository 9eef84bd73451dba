//! Panel HTTP client with ETag change detection.

use std::time::Duration;

use reqwest::header::ETAG;
use url::Url;

use crate::config::schema::NodeConfig;
use crate::observability::metrics;
use crate::panel::error::{PanelError, PanelResult};
use crate::panel::node::{NodeIdentity, NodeInfo, RawNodeInfo};

/// Node configuration endpoint, relative to `ApiHost`.
pub const NODE_INFO_PATH: &str = "/api/v1/server/UniProxy/config";

/// Result of a successful fetch.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The panel served a new node configuration.
    Changed(NodeInfo),
    /// The freshness token matched the previous response.
    Unchanged,
}

/// Client for one node's panel endpoint.
///
/// `fetch` takes `&mut self` because it updates the stored freshness token;
/// callers sharing a client must serialize access.
#[derive(Debug)]
pub struct PanelClient {
    http: reqwest::Client,
    endpoint: Url,
    identity: NodeIdentity,
    etag: Option<String>,
}

impl PanelClient {
    pub fn new(config: &NodeConfig) -> PanelResult<Self> {
        let base = config.api_host.trim_end_matches('/');
        let mut endpoint = Url::parse(&format!("{base}{NODE_INFO_PATH}")).map_err(|source| {
            PanelError::InvalidEndpoint {
                host: config.api_host.clone(),
                source,
            }
        })?;
        endpoint
            .query_pairs_mut()
            .append_pair("node_id", &config.node_id.to_string())
            .append_pair("node_type", &config.node_type)
            .append_pair("token", &config.api_key);

        let mut builder =
            reqwest::Client::builder().user_agent(concat!("panel-sync/", env!("CARGO_PKG_VERSION")));
        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }
        let http = builder.build().map_err(PanelError::Client)?;

        Ok(Self {
            http,
            endpoint,
            identity: NodeIdentity::from(config),
            etag: None,
        })
    }

    pub fn identity(&self) -> &NodeIdentity {
        &self.identity
    }

    /// Freshness token captured from the last decoded response.
    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    /// Fetch and normalize the node configuration.
    ///
    /// The body is decoded before the token comparison, so an invalid body is
    /// an error even when nothing changed. The token from every decoded
    /// response replaces the stored one, whichever branch is taken.
    pub async fn fetch(&mut self) -> PanelResult<FetchOutcome> {
        let result = self.fetch_inner().await;
        metrics::record_fetch(&self.identity.node_type, &result);
        result
    }

    async fn fetch_inner(&mut self) -> PanelResult<FetchOutcome> {
        let res = self
            .http
            .get(self.endpoint.clone())
            .send()
            .await
            .map_err(|source| PanelError::Transport {
                path: NODE_INFO_PATH,
                source,
            })?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(PanelError::Status {
                path: NODE_INFO_PATH,
                status,
                body,
            });
        }

        let etag = res
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = res.bytes().await.map_err(|source| PanelError::Transport {
            path: NODE_INFO_PATH,
            source,
        })?;

        let raw = RawNodeInfo::decode(&body)?;

        let previous = std::mem::replace(&mut self.etag, etag);
        if previous.is_some() && previous == self.etag {
            tracing::debug!(node_id = self.identity.node_id, "Node info not changed");
            return Ok(FetchOutcome::Unchanged);
        }

        match raw.normalize(self.identity.clone()) {
            Ok(info) => {
                tracing::info!(
                    node_id = self.identity.node_id,
                    node_type = %self.identity.node_type,
                    rules = info.rules.len(),
                    pull_interval = info.base_config.pull_interval,
                    "Node info updated"
                );
                Ok(FetchOutcome::Changed(info))
            }
            Err(e) => {
                // The captured token is dropped rather than kept: keeping it
                // would turn the next fetch of this same broken document into
                // `Unchanged`, hiding the error while no NodeInfo was produced.
                self.etag = None;
                Err(e)
            }
        }
    }
}

//! Configuration schema definitions.
//!
//! This module defines the local configuration document. Keys are PascalCase
//! to stay compatible with existing deployments. Every struct defaults its
//! absent fields, so a reload never inherits values from the previous tree.

use serde::{Deserialize, Serialize};

/// Root configuration for the process.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ConfigTree {
    /// Logging settings.
    #[serde(rename = "Log")]
    pub log: LogConfig,

    /// Satellite file consumed by the proxy engine's DNS module.
    #[serde(rename = "DnsConfigPath")]
    pub dns_config_path: String,

    /// Satellite file with extra inbounds.
    #[serde(rename = "InboundConfigPath")]
    pub inbound_config_path: String,

    /// Satellite file with extra outbounds.
    #[serde(rename = "OutboundConfigPath")]
    pub outbound_config_path: String,

    /// Satellite file with engine routing rules.
    #[serde(rename = "RouteConfigPath")]
    pub route_config_path: String,

    /// Connection policy shared by all nodes.
    #[serde(rename = "ConnectionConfig")]
    pub connection: ConnectionConfig,

    /// Nodes to keep in sync with the panel, in declaration order.
    #[serde(rename = "Nodes")]
    pub nodes: Vec<NodeConfig>,

    /// Prometheus exporter bind address (e.g. "127.0.0.1:9090").
    #[serde(rename = "MetricsAddress")]
    pub metrics_address: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(rename = "Level")]
    pub level: String,

    /// Log file path. Empty means stderr.
    #[serde(rename = "Output")]
    pub output: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            output: String::new(),
        }
    }
}

/// Connection policy, all values in seconds except `buffer_size` (KiB).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ConnectionConfig {
    #[serde(rename = "handshake")]
    pub handshake: u32,

    #[serde(rename = "connIdle")]
    pub conn_idle: u32,

    #[serde(rename = "uplinkOnly")]
    pub uplink_only: u32,

    #[serde(rename = "downlinkOnly")]
    pub downlink_only: u32,

    #[serde(rename = "bufferSize")]
    pub buffer_size: i32,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            handshake: 4,
            conn_idle: 30,
            uplink_only: 2,
            downlink_only: 4,
            buffer_size: 64,
        }
    }
}

/// One node managed through the panel.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct NodeConfig {
    /// Panel base URL (e.g. "https://panel.example.com").
    #[serde(rename = "ApiHost")]
    pub api_host: String,

    /// Panel communication key.
    #[serde(rename = "ApiKey")]
    pub api_key: String,

    #[serde(rename = "NodeID")]
    pub node_id: u32,

    /// Protocol served by this node (e.g. "vmess", "shadowsocks").
    #[serde(rename = "NodeType")]
    pub node_type: String,

    /// Panel request timeout in seconds.
    #[serde(rename = "Timeout")]
    pub timeout_secs: u64,

    #[serde(rename = "EnableVless")]
    pub enable_vless: bool,

    #[serde(rename = "EnableTls")]
    pub enable_tls: bool,

    /// Per-user speed limit in Mbps, 0 for unlimited.
    #[serde(rename = "SpeedLimit")]
    pub speed_limit: u32,

    /// Per-user online device limit, 0 for unlimited.
    #[serde(rename = "DeviceLimit")]
    pub device_limit: u32,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            api_host: String::new(),
            api_key: String::new(),
            node_id: 0,
            node_type: String::new(),
            timeout_secs: 30,
            enable_vless: false,
            enable_tls: false,
            speed_limit: 0,
            device_limit: 0,
        }
    }
}

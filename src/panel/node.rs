//! Node descriptor decoding and normalization.
//!
//! The panel sends some fields in more than one shape. Those are decoded into
//! boundary enums here and normalized into fixed types before a [`NodeInfo`]
//! leaves this module.

use serde::Deserialize;
use serde_json::value::RawValue;

use crate::config::schema::NodeConfig;
use crate::panel::error::{PanelError, PanelResult};
use crate::panel::rules::{self, DestinationRule};
use crate::routing::RuleSet;

/// Route action that produces destination rules.
pub const BLOCK_ACTION: &str = "block";

/// Transport and identity parameters of one proxy node, as served by the panel.
#[derive(Debug, Clone, Default)]
pub struct NodeDescriptor {
    pub host: String,
    pub server_port: u16,
    pub server_name: String,
    pub network: String,
    /// Transport settings, kept verbatim for the proxy engine.
    pub network_settings: Option<Box<RawValue>>,
    pub cipher: String,
    pub server_key: String,
    /// TLS mode flag (0 = off).
    pub tls: i32,
}

/// Locally configured identity stamped onto a fetched descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeIdentity {
    pub node_id: u32,
    pub node_type: String,
    pub enable_vless: bool,
    pub enable_tls: bool,
    pub speed_limit: u32,
    pub device_limit: u32,
}

impl From<&NodeConfig> for NodeIdentity {
    fn from(config: &NodeConfig) -> Self {
        Self {
            node_id: config.node_id,
            node_type: config.node_type.clone(),
            enable_vless: config.enable_vless,
            enable_tls: config.enable_tls,
            speed_limit: config.speed_limit,
            device_limit: config.device_limit,
        }
    }
}

/// Report and sync intervals in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BaseConfig {
    pub push_interval: u64,
    pub pull_interval: u64,
}

/// Fully normalized node information.
#[derive(Debug, Clone, Default)]
pub struct NodeInfo {
    pub descriptor: NodeDescriptor,
    pub identity: NodeIdentity,
    pub base_config: BaseConfig,
    pub rules: RuleSet,
}

/// Wire shape of the panel response.
#[derive(Debug, Deserialize)]
pub(crate) struct RawNodeInfo {
    #[serde(default)]
    host: String,
    #[serde(default)]
    server_port: u16,
    #[serde(default)]
    server_name: String,
    #[serde(default)]
    network: String,
    #[serde(default, rename = "networkSettings", alias = "network_settings")]
    network_settings: Option<Box<RawValue>>,
    #[serde(default)]
    cipher: String,
    #[serde(default)]
    server_key: String,
    #[serde(default)]
    tls: i32,
    #[serde(default)]
    routes: Vec<RawRoute>,
    base_config: RawBaseConfig,
}

#[derive(Debug, Deserialize)]
struct RawRoute {
    id: i64,
    #[serde(default, rename = "match")]
    match_field: Option<MatchField>,
    #[serde(default)]
    action: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MatchField {
    Joined(String),
    List(Vec<String>),
    Other(serde_json::Value),
}

#[derive(Debug, Deserialize)]
struct RawBaseConfig {
    push_interval: IntervalField,
    pull_interval: IntervalField,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IntervalField {
    Number(u64),
    Text(String),
    Other(serde_json::Value),
}

impl IntervalField {
    fn normalize(self, field: &'static str) -> PanelResult<u64> {
        match self {
            IntervalField::Number(n) => Ok(n),
            IntervalField::Text(s) => s.parse::<u64>().map_err(|_| PanelError::InvalidInterval {
                field,
                value: format!("{s:?}"),
            }),
            IntervalField::Other(v) => Err(PanelError::InvalidInterval {
                field,
                value: v.to_string(),
            }),
        }
    }
}

impl RawRoute {
    fn compile(self) -> PanelResult<Vec<DestinationRule>> {
        let route_id = self.id;
        let patterns = match self.match_field {
            Some(MatchField::Joined(joined)) => rules::split_joined(&joined),
            Some(MatchField::List(list)) => list,
            Some(MatchField::Other(v)) => {
                return Err(PanelError::MalformedRule {
                    route_id,
                    found: v.to_string(),
                })
            }
            None => {
                return Err(PanelError::MalformedRule {
                    route_id,
                    found: "<missing>".to_string(),
                })
            }
        };

        rules::compile(route_id, patterns.iter().map(String::as_str)).map_err(|(pattern, source)| {
            PanelError::InvalidPattern {
                route_id,
                pattern,
                source,
            }
        })
    }
}

impl RawNodeInfo {
    /// Decode a response body. Routes stay in wire form until [`normalize`](Self::normalize).
    pub(crate) fn decode(body: &[u8]) -> PanelResult<Self> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Stamp identity, compile block routes and coerce intervals.
    ///
    /// Consumes the routes; nothing is returned unless every step succeeds.
    pub(crate) fn normalize(self, identity: NodeIdentity) -> PanelResult<NodeInfo> {
        let mut compiled = Vec::new();
        for route in self.routes {
            if route.action != BLOCK_ACTION {
                continue;
            }
            compiled.extend(route.compile()?);
        }

        let base_config = BaseConfig {
            push_interval: self.base_config.push_interval.normalize("push_interval")?,
            pull_interval: self.base_config.pull_interval.normalize("pull_interval")?,
        };

        Ok(NodeInfo {
            descriptor: NodeDescriptor {
                host: self.host,
                server_port: self.server_port,
                server_name: self.server_name,
                network: self.network,
                network_settings: self.network_settings,
                cipher: self.cipher,
                server_key: self.server_key,
                tls: self.tls,
            },
            identity,
            base_config,
            rules: RuleSet::new(compiled),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(routes: &str, push: &str, pull: &str) -> Vec<u8> {
        format!(
            r#"{{
                "host": "node1.example.com",
                "server_port": 443,
                "server_name": "sni.example.com",
                "network": "ws",
                "networkSettings": {{"path": "/ws", "headers": {{"Host": "a"}}}},
                "cipher": "aes-128-gcm",
                "server_key": "k",
                "tls": 1,
                "routes": {routes},
                "base_config": {{"push_interval": {push}, "pull_interval": {pull}}}
            }}"#
        )
        .into_bytes()
    }

    fn normalize(body: &[u8]) -> PanelResult<NodeInfo> {
        RawNodeInfo::decode(body)?.normalize(NodeIdentity {
            node_id: 1,
            node_type: "vmess".to_string(),
            ..Default::default()
        })
    }

    fn rule_pairs(info: &NodeInfo) -> Vec<(i64, String)> {
        info.rules
            .iter()
            .map(|r| (r.id, r.pattern.as_str().to_string()))
            .collect()
    }

    #[test]
    fn test_descriptor_fields() {
        let info = normalize(&body("[]", "60", "60")).unwrap();
        assert_eq!(info.descriptor.host, "node1.example.com");
        assert_eq!(info.descriptor.server_port, 443);
        assert_eq!(info.descriptor.tls, 1);
        assert_eq!(info.identity.node_type, "vmess");
        let settings = info.descriptor.network_settings.unwrap();
        assert_eq!(settings.get(), r#"{"path": "/ws", "headers": {"Host": "a"}}"#);
    }

    #[test]
    fn test_match_shapes_equivalent() {
        let joined = normalize(&body(
            r#"[{"id": 9, "match": "a.com,b.com", "action": "block"}]"#,
            "60",
            "60",
        ))
        .unwrap();
        let list = normalize(&body(
            r#"[{"id": 9, "match": ["a.com", "b.com"], "action": "block"}]"#,
            "60",
            "60",
        ))
        .unwrap();

        let expected = vec![(9, "a.com".to_string()), (9, "b.com".to_string())];
        assert_eq!(rule_pairs(&joined), expected);
        assert_eq!(rule_pairs(&list), expected);
    }

    #[test]
    fn test_only_block_routes_compile() {
        let info = normalize(&body(
            r#"[
                {"id": 1, "match": "allowed.com", "action": "allow"},
                {"id": 2, "match": "x,y", "action": "block"},
                {"id": 3, "match": ["z"], "action": "block"}
            ]"#,
            "60",
            "60",
        ))
        .unwrap();
        assert_eq!(
            rule_pairs(&info),
            vec![(2, "x".to_string()), (2, "y".to_string()), (3, "z".to_string())]
        );
    }

    #[test]
    fn test_non_block_route_shape_not_inspected() {
        let info = normalize(&body(
            r#"[{"id": 1, "match": 42, "action": "dns"}]"#,
            "60",
            "60",
        ))
        .unwrap();
        assert!(info.rules.is_empty());
    }

    #[test]
    fn test_malformed_match_aborts() {
        let err = normalize(&body(
            r#"[
                {"id": 1, "match": "fine", "action": "block"},
                {"id": 2, "match": {"domain": "a"}, "action": "block"}
            ]"#,
            "60",
            "60",
        ))
        .unwrap_err();
        assert!(matches!(err, PanelError::MalformedRule { route_id: 2, .. }));

        let err = normalize(&body(r#"[{"id": 5, "action": "block"}]"#, "60", "60")).unwrap_err();
        assert!(matches!(err, PanelError::MalformedRule { route_id: 5, .. }));
    }

    #[test]
    fn test_invalid_pattern_aborts() {
        let err = normalize(&body(
            r#"[{"id": 7, "match": "ok.com,(bad", "action": "block"}]"#,
            "60",
            "60",
        ))
        .unwrap_err();
        match err {
            PanelError::InvalidPattern { route_id, pattern, .. } => {
                assert_eq!(route_id, 7);
                assert_eq!(pattern, "(bad");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_interval_coercion() {
        let text = normalize(&body("[]", r#""60""#, r#""120""#)).unwrap();
        let number = normalize(&body("[]", "60", "120")).unwrap();
        assert_eq!(text.base_config, BaseConfig { push_interval: 60, pull_interval: 120 });
        assert_eq!(number.base_config, text.base_config);
    }

    #[test]
    fn test_invalid_interval() {
        let err = normalize(&body("[]", r#""abc""#, "60")).unwrap_err();
        assert!(matches!(err, PanelError::InvalidInterval { field: "push_interval", .. }));

        let err = normalize(&body("[]", "60", "-1")).unwrap_err();
        assert!(matches!(err, PanelError::InvalidInterval { field: "pull_interval", .. }));

        let err = normalize(&body("[]", "60", "null")).unwrap_err();
        assert!(matches!(err, PanelError::InvalidInterval { field: "pull_interval", .. }));
    }

    #[test]
    fn test_missing_base_config_is_malformed() {
        let err = normalize(br#"{"host": "h", "routes": []}"#).unwrap_err();
        assert!(matches!(err, PanelError::MalformedResponse(_)));
    }

    #[test]
    fn test_identity_from_node_config() {
        let config = NodeConfig {
            node_id: 12,
            node_type: "trojan".to_string(),
            enable_tls: true,
            device_limit: 3,
            ..Default::default()
        };
        let identity = NodeIdentity::from(&config);
        assert_eq!(identity.node_id, 12);
        assert_eq!(identity.node_type, "trojan");
        assert!(identity.enable_tls);
        assert_eq!(identity.device_limit, 3);
    }
}

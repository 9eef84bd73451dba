//! panel-sync
//!
//! Keeps proxy nodes in sync with their control panel and the local
//! configuration file.
//!
//! # Startup Order
//!
//! ```text
//! load config ──▶ logging/metrics ──▶ arm watcher ──▶ spawn node sync tasks
//!                                          │
//!                     write event ─────────┘
//!                     → reload → abort node tasks → respawn from new tree
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use panel_sync::config::{ConfigStore, ConfigTree, ConfigWatcher, NodeConfig, WatchErrorPolicy};
use panel_sync::observability::{logging, metrics};
use panel_sync::sync::{NodeInfoReceiver, NodeSync};

#[derive(Parser)]
#[command(name = "panel-sync")]
#[command(about = "Synchronize proxy node configuration from a control panel", long_about = None)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, default_value = "config.yml")]
    config: PathBuf,

    /// Log watcher failures instead of exiting.
    #[arg(long)]
    keep_running_on_watch_error: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let store = Arc::new(ConfigStore::new());
    let tree = store.load(&cli.config)?;

    logging::init(&tree.log)?;
    tracing::info!(
        config = %cli.config.display(),
        nodes = tree.nodes.len(),
        "panel-sync v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    if let Some(addr) = &tree.metrics_address {
        match addr.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(metrics_address = %addr, "Failed to parse metrics address"),
        }
    }

    let policy = if cli.keep_running_on_watch_error {
        WatchErrorPolicy::Log
    } else {
        WatchErrorPolicy::Exit
    };
    let (reload_tx, mut reload_rx) = mpsc::unbounded_channel::<Arc<ConfigTree>>();
    ConfigWatcher::new(Arc::clone(&store), &cli.config)
        .with_error_policy(policy)
        .watch(move |tree| {
            let _ = reload_tx.send(tree);
        })?;

    let mut tasks = spawn_nodes(&tree.nodes);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            Some(tree) = reload_rx.recv() => {
                for task in tasks.drain(..) {
                    task.abort();
                }
                tasks = spawn_nodes(&tree.nodes);
                tracing::info!(nodes = tree.nodes.len(), "Node sync restarted after reload");
            }
            _ = &mut shutdown => {
                tracing::info!("Shutdown signal received");
                break;
            }
        }
    }

    for task in tasks {
        task.abort();
    }
    tracing::info!("Shutdown complete");
    Ok(())
}

fn spawn_nodes(nodes: &[NodeConfig]) -> Vec<JoinHandle<()>> {
    let mut tasks = Vec::with_capacity(nodes.len() * 2);
    for node in nodes {
        match NodeSync::new(node) {
            Ok((sync, rx)) => {
                tasks.push(tokio::spawn(sync.run()));
                tasks.push(tokio::spawn(report_updates(node.node_id, rx)));
            }
            Err(e) => {
                tracing::error!(node_id = node.node_id, error = %e, "Failed to create panel client");
            }
        }
    }
    tasks
}

async fn report_updates(node_id: u32, mut rx: NodeInfoReceiver) {
    while rx.changed().await.is_ok() {
        let Some(info) = rx.borrow_and_update().clone() else {
            continue;
        };
        tracing::info!(
            node_id,
            host = %info.descriptor.host,
            port = info.descriptor.server_port,
            network = %info.descriptor.network,
            block_rules = info.rules.len(),
            "Node configuration applied"
        );
    }
}

//! Configuration directory watcher for hot reload.

use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use notify::event::ModifyKind;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;

use crate::config::hints;
use crate::config::schema::ConfigTree;
use crate::config::store::ConfigStore;
use crate::observability::metrics;

/// Errors from the watch subsystem itself, as opposed to reload failures.
#[derive(Debug, Error)]
pub enum WatchError {
    /// The watcher could not be created or armed.
    #[error("watch setup error: {0}")]
    Setup(#[source] notify::Error),

    /// The event processing thread could not be started.
    #[error("spawn watcher thread: {0}")]
    Thread(#[source] std::io::Error),

    /// The watch mechanism reported an error after arming.
    #[error("watcher error: {0}")]
    Runtime(#[source] notify::Error),
}

/// What to do when the watch mechanism itself fails after arming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WatchErrorPolicy {
    /// Log and terminate the process.
    #[default]
    Exit,
    /// Log and keep processing events.
    Log,
}

/// Watches the directory containing the configuration file and reloads the
/// store on every write event.
pub struct ConfigWatcher {
    store: Arc<ConfigStore>,
    path: PathBuf,
    policy: WatchErrorPolicy,
}

impl ConfigWatcher {
    /// Create a watcher for `path`. The store must already hold the initial load.
    pub fn new(store: Arc<ConfigStore>, path: impl Into<PathBuf>) -> Self {
        Self {
            store,
            path: path.into(),
            policy: WatchErrorPolicy::default(),
        }
    }

    pub fn with_error_policy(mut self, policy: WatchErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Arm the watch and start processing events on a dedicated thread.
    ///
    /// Returns once the directory is watched. The thread owns the watch handle
    /// and runs until the process exits. `on_reload` runs inline on that thread
    /// after every successful reload.
    pub fn watch<F>(self, on_reload: F) -> Result<(), WatchError>
    where
        F: FnMut(Arc<ConfigTree>) + Send + 'static,
    {
        let dir = hints::config_dir(&self.path);
        let (tx, rx) = mpsc::channel::<notify::Result<Event>>();

        let mut watcher = RecommendedWatcher::new(tx, Config::default()).map_err(WatchError::Setup)?;
        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(WatchError::Setup)?;

        let mut reloader = Reloader {
            store: self.store,
            path: self.path,
            policy: self.policy,
            on_reload,
        };

        thread::Builder::new()
            .name("config-watcher".to_string())
            .spawn(move || {
                let _watcher = watcher;
                for res in rx {
                    reloader.handle(res);
                }
            })
            .map_err(WatchError::Thread)?;

        tracing::info!(dir = %dir.display(), "Config watcher started");
        Ok(())
    }
}

fn is_write(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Modify(ModifyKind::Data(_)) | EventKind::Modify(ModifyKind::Any)
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Handled {
    Ignored,
    Reloaded,
    ReloadFailed,
    WatchFailed,
}

/// Per-event state machine: `Idle -> Reloading -> Idle`.
pub(crate) struct Reloader<F> {
    store: Arc<ConfigStore>,
    path: PathBuf,
    policy: WatchErrorPolicy,
    on_reload: F,
}

impl<F> Reloader<F>
where
    F: FnMut(Arc<ConfigTree>),
{
    pub(crate) fn handle(&mut self, res: notify::Result<Event>) -> Handled {
        let event = match res {
            Ok(event) => event,
            Err(e) => {
                let err = WatchError::Runtime(e);
                match self.policy {
                    WatchErrorPolicy::Exit => {
                        tracing::error!(error = %err, "Config watcher failed, terminating");
                        std::process::exit(1);
                    }
                    WatchErrorPolicy::Log => {
                        tracing::error!(error = %err, "Config watcher error");
                        return Handled::WatchFailed;
                    }
                }
            }
        };

        if !is_write(&event.kind) {
            return Handled::Ignored;
        }

        tracing::info!(path = %self.path.display(), "Config dir changed, reloading...");
        match self.store.load(&self.path) {
            Ok(tree) => {
                metrics::record_reload(true);
                tracing::info!(nodes = tree.nodes.len(), "Reload config success");
                (self.on_reload)(tree);
                Handled::Reloaded
            }
            Err(e) => {
                metrics::record_reload(false);
                tracing::error!(error = %e, "Reload config failed. Keeping current configuration.");
                Handled::ReloadFailed
            }
        }
    }
}

//! Configuration file watcher for hot reload.
//!
//! # Responsibilities
//! - Coalesce bursts of file events into one reload
//! - Forward a validated config only when a live-reloadable section changed
//! - Warn about edits that only take effect after a restart

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::GuardConfig;

/// Quiet period after the last file event before the file is re-read.
pub const RELOAD_DEBOUNCE: Duration = Duration::from_millis(250);

/// Sections that differ between two configurations, split by whether the
/// running server picks them up.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigChanges {
    pub reloaded: Vec<&'static str>,
    pub restart_required: Vec<&'static str>,
}

impl ConfigChanges {
    pub fn between(old: &GuardConfig, new: &GuardConfig) -> Self {
        let reloadable = [
            ("listener.public_scheme", old.listener.public_scheme != new.listener.public_scheme),
            ("security.app_base_url", old.security.app_base_url != new.security.app_base_url),
            (
                "security.strict_header_parsing",
                old.security.strict_header_parsing != new.security.strict_header_parsing,
            ),
            ("contact", old.contact != new.contact),
            ("auth", old.auth != new.auth),
        ];
        let fixed = [
            ("listener.bind_address", old.listener.bind_address != new.listener.bind_address),
            ("timeouts", old.timeouts != new.timeouts),
            ("security.max_body_size", old.security.max_body_size != new.security.max_body_size),
            ("observability", old.observability != new.observability),
        ];

        let changed = |sections: &[(&'static str, bool)]| -> Vec<&'static str> {
            sections.iter().filter(|(_, c)| *c).map(|(name, _)| *name).collect()
        };

        Self {
            reloaded: changed(&reloadable),
            restart_required: changed(&fixed),
        }
    }
}

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    current: GuardConfig,
    update_tx: mpsc::UnboundedSender<GuardConfig>,
}

impl ConfigWatcher {
    /// Create a watcher for `path`, whose contents are currently `current`.
    ///
    /// Returns the watcher and a receiver for validated configuration updates.
    pub fn new(path: &Path, current: GuardConfig) -> (Self, mpsc::UnboundedReceiver<GuardConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        let watcher = Self {
            path: path.to_path_buf(),
            current,
            update_tx,
        };
        (watcher, update_rx)
    }

    /// Start watching the file. Must be called inside a Tokio runtime.
    /// The returned handle must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    let _ = event_tx.send(());
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;
        tracing::info!(path = ?self.path, "Config watcher started");

        tokio::spawn(self.reload_loop(event_rx));
        Ok(watcher)
    }

    async fn reload_loop(mut self, mut events: mpsc::UnboundedReceiver<()>) {
        while events.recv().await.is_some() {
            // Editors save in several writes; reload once they go quiet.
            loop {
                match tokio::time::timeout(RELOAD_DEBOUNCE, events.recv()).await {
                    Ok(Some(())) => continue,
                    Ok(None) => return,
                    Err(_) => break,
                }
            }
            self.reload();
        }
    }

    /// Re-read the file. Returns true if an update was forwarded.
    fn reload(&mut self) -> bool {
        let new_config = match load_config(&self.path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, "Failed to reload config, keeping current configuration");
                return false;
            }
        };

        let changes = ConfigChanges::between(&self.current, &new_config);
        if !changes.restart_required.is_empty() {
            tracing::warn!(
                sections = ?changes.restart_required,
                "Config changes ignored until restart"
            );
        }
        self.current = new_config.clone();

        if changes.reloaded.is_empty() {
            tracing::debug!(path = ?self.path, "Config file changed without reloadable edits");
            return false;
        }

        tracing::info!(sections = ?changes.reloaded, "Config file change detected, reloading");
        self.update_tx.send(new_config).is_ok()
    }
}

//! Cache Runtime
//!
//! Owns the registry and initializer for one process and the background
//! tasks started on their behalf.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::Config;
use crate::registry::CacheRegistry;
use crate::source::DirectoryDataSource;
use crate::tasks::spawn_cleanup_task;
use crate::warmup::CacheInitializer;

pub struct CacheRuntime {
    registry: CacheRegistry,
    initializer: Arc<CacheInitializer>,
    cleanup_interval: u64,
    handles: Vec<JoinHandle<()>>,
}

impl CacheRuntime {
    /// Builds the named caches and the standard warmers. Nothing runs until
    /// `start`.
    pub fn new(config: &Config, source: Arc<dyn DirectoryDataSource>) -> Self {
        let registry = CacheRegistry::from_config(config);
        let initializer =
            CacheInitializer::with_default_warmers(registry.clone(), source, &config.warmup);
        Self {
            registry,
            initializer: Arc::new(initializer),
            cleanup_interval: config.cleanup_interval,
            handles: Vec::new(),
        }
    }

    pub fn registry(&self) -> &CacheRegistry {
        &self.registry
    }

    pub fn initializer(&self) -> &Arc<CacheInitializer> {
        &self.initializer
    }

    /// Kicks off cache initialization in the background and starts the
    /// periodic cleanup. Calling it again while running is a no-op.
    pub fn start(&mut self) {
        if !self.handles.is_empty() {
            warn!("Cache runtime already started");
            return;
        }

        let initializer = Arc::clone(&self.initializer);
        self.handles.push(tokio::spawn(async move {
            initializer.initialize().await;
        }));
        self.handles
            .push(spawn_cleanup_task(self.registry.clone(), self.cleanup_interval));
        info!("Cache runtime started");
    }

    /// Aborts the background tasks. Cached data stays available.
    pub fn stop(&mut self) {
        for handle in self.handles.drain(..) {
            handle.abort();
        }
        info!("Cache runtime stopped");
    }

    pub fn is_running(&self) -> bool {
        self.handles.iter().any(|h| !h.is_finished())
    }
}

impl Drop for CacheRuntime {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warmup::testing::MockSource;
    use std::time::Duration;

    fn runtime() -> CacheRuntime {
        CacheRuntime::new(&Config::default(), Arc::new(MockSource::default()))
    }

    #[tokio::test]
    async fn test_new_does_not_start_anything() {
        let runtime = runtime();

        assert!(!runtime.is_running());
        assert!(!runtime.initializer().is_initialized());
        assert!(runtime.registry().general().is_empty().await);
    }

    #[tokio::test]
    async fn test_start_initializes_in_background() {
        let mut runtime = runtime();
        runtime.start();

        // Joins the run started by `start` rather than launching another.
        let summary = runtime.initializer().initialize().await;

        assert!(summary.is_complete());
        assert!(runtime.registry().general().contains("system:stats").await);
        assert!(runtime.is_running());
        runtime.stop();
    }

    #[tokio::test]
    async fn test_stop_aborts_tasks() {
        let mut runtime = runtime();
        runtime.start();
        runtime.stop();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!runtime.is_running());
    }
}

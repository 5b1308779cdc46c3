//! Rebuild scheduler.
//!
//! A single loop consumes watcher events and decides when to rebuild:
//!
//! 1. Events that are not content changes are ignored.
//! 2. An event arriving within `debounce` of the last build attempt is dropped.
//! 3. Otherwise the loop waits `settle`, runs the build and awaits it.
//! 4. A successful build broadcasts [`RELOAD`] to every connected client.
//!
//! The loop never runs two builds at once and a failed build never stops it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::hub::{Hub, ReloadSink};
use super::watch::{WatchEvents, WatchSet, is_change};

/// Payload broadcast after a successful rebuild.
pub const RELOAD: &str = "reload";

/// Boxed error returned by rebuild functions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Something that can rebuild the site on demand.
pub trait Rebuild: Send + Sync + 'static {
    /// Rebuild and return the number of pages written.
    ///
    /// # Errors
    ///
    /// Any failure; it is logged and the previous output stays in place.
    fn rebuild(&self) -> Result<usize, BoxError>;
}

impl<F> Rebuild for F
where
    F: Fn() -> Result<usize, BoxError> + Send + Sync + 'static,
{
    fn rebuild(&self) -> Result<usize, BoxError> {
        self()
    }
}

/// Scheduler timing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timing {
    /// Minimum time since the last build before an event may trigger another.
    pub debounce: Duration,
    /// Pause between accepting an event and starting the build.
    pub settle: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
            settle: Duration::from_millis(100),
        }
    }
}

/// Watch-driven rebuild loop.
pub struct Scheduler<R, S> {
    rebuild: Arc<R>,
    hub: Arc<Hub<S>>,
    timing: Timing,
    watch: Option<WatchSet>,
    last_build: Option<Instant>,
}

impl<R: Rebuild, S: ReloadSink> Scheduler<R, S> {
    #[must_use]
    pub fn new(rebuild: R, hub: Arc<Hub<S>>, timing: Timing) -> Self {
        Self {
            rebuild: Arc::new(rebuild),
            hub,
            timing,
            watch: None,
            last_build: None,
        }
    }

    /// Track newly created directories in `watch`.
    #[must_use]
    pub fn with_watch_set(mut self, watch: WatchSet) -> Self {
        self.watch = Some(watch);
        self
    }

    /// Consume events until the channel closes.
    ///
    /// # Returns
    ///
    /// The number of builds attempted.
    pub async fn run(mut self, mut events: WatchEvents) -> usize {
        let mut builds = 0;

        while let Some(result) = events.recv().await {
            let event = match result {
                Ok(event) => event,
                Err(err) => {
                    tracing::warn!(error = %err, "File watcher error");
                    continue;
                }
            };
            if !is_change(&event.kind) {
                continue;
            }
            if let Some(watch) = self.watch.as_mut() {
                watch.track_created(&event);
            }
            if self
                .last_build
                .is_some_and(|at| at.elapsed() <= self.timing.debounce)
            {
                tracing::trace!(paths = ?event.paths, "Change within debounce window, skipped");
                continue;
            }

            tracing::debug!(paths = ?event.paths, "Change detected");
            tokio::time::sleep(self.timing.settle).await;
            self.build_and_notify().await;
            self.last_build = Some(Instant::now());
            builds += 1;
        }

        tracing::debug!("Watch channel closed, scheduler stopped");
        builds
    }

    async fn build_and_notify(&self) {
        let rebuild = Arc::clone(&self.rebuild);
        let start = Instant::now();

        match tokio::task::spawn_blocking(move || rebuild.rebuild()).await {
            Ok(Ok(pages)) => {
                let clients = self.hub.broadcast(RELOAD).await;
                tracing::info!(
                    pages,
                    clients,
                    elapsed_ms = start.elapsed().as_millis(),
                    "Site rebuilt"
                );
            }
            Ok(Err(err)) => tracing::error!(error = %err, "Rebuild failed"),
            Err(err) => tracing::error!(error = %err, "Rebuild task aborted"),
        }
    }
}

//! Filesystem watch registration.
//!
//! Every directory is watched non-recursively and registered at most once.
//! Single files are watched through their parent directory so that editors
//! saving via "write temp file, rename over original" are still noticed.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use walkdir::WalkDir;

/// Raw watcher events, as delivered by the notify callback.
pub type WatchEvents = mpsc::Receiver<notify::Result<Event>>;

/// Capacity of the watcher event channel.
const EVENT_BUFFER: usize = 256;

/// Locations watched for changes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WatchRoots {
    /// Directory trees, watched at every level.
    pub trees: Vec<PathBuf>,
    /// Individual files, watched via their parent directory.
    pub files: Vec<PathBuf>,
}

/// Directories registered with the watcher.
pub struct WatchSet {
    watcher: RecommendedWatcher,
    dirs: HashSet<PathBuf>,
}

impl WatchSet {
    /// Create a watcher for `roots` and return it with its event stream.
    ///
    /// Missing roots are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the watcher cannot be created or an existing
    /// directory cannot be watched.
    pub fn start(roots: &WatchRoots) -> notify::Result<(Self, WatchEvents)> {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            // Receiver gone means the scheduler has stopped.
            let _ = tx.blocking_send(res);
        })?;

        let mut set = Self {
            watcher,
            dirs: HashSet::new(),
        };
        for tree in &roots.trees {
            set.add_tree(tree)?;
        }
        for file in &roots.files {
            set.add_file(file)?;
        }
        tracing::debug!(directories = set.len(), "Watching for changes");

        Ok((set, rx))
    }

    /// Watch `root` and every directory below it.
    ///
    /// # Returns
    ///
    /// The number of newly registered directories.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be watched.
    pub fn add_tree(&mut self, root: &Path) -> notify::Result<usize> {
        if !root.is_dir() {
            tracing::warn!(path = %root.display(), "Watch root not found, skipping");
            return Ok(0);
        }

        let mut added = 0;
        for entry in WalkDir::new(root).into_iter().filter_map(Result::ok) {
            if entry.file_type().is_dir() && self.add_dir(entry.path())? {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Watch the directory containing `file`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be watched.
    pub fn add_file(&mut self, file: &Path) -> notify::Result<bool> {
        let parent = match file.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        if !parent.is_dir() {
            tracing::warn!(path = %file.display(), "Parent of watched file not found, skipping");
            return Ok(false);
        }
        self.add_dir(parent)
    }

    fn add_dir(&mut self, dir: &Path) -> notify::Result<bool> {
        let dir = normalize(dir);
        if self.dirs.contains(&dir) {
            return Ok(false);
        }
        self.watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        self.dirs.insert(dir);
        Ok(true)
    }

    /// Register directories that appeared after startup.
    pub fn track_created(&mut self, event: &Event) {
        if !matches!(event.kind, EventKind::Create(_)) {
            return;
        }
        for path in event.paths.iter().filter(|p| p.is_dir()) {
            match self.add_tree(path) {
                Ok(0) => {}
                Ok(added) => tracing::debug!(path = %path.display(), added, "Watching new directory"),
                Err(err) => tracing::warn!(path = %path.display(), error = %err, "Failed to watch new directory"),
            }
        }
    }

    #[must_use]
    pub fn contains(&self, dir: &Path) -> bool {
        self.dirs.contains(&normalize(dir))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }
}

/// Canonical form used for de-duplication.
fn normalize(dir: &Path) -> PathBuf {
    std::fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf())
}

/// Whether an event should trigger a rebuild.
///
/// Content changes count; access and metadata-only events do not.
#[must_use]
pub fn is_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_)
            | EventKind::Remove(_)
            | EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Name(_) | ModifyKind::Any)
    )
}

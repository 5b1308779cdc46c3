//! Live reload: hub, file watching and rebuild scheduling.

mod hub;
mod scheduler;
mod watch;
mod websocket;

pub use hub::{ClientId, Hub, ReloadSink};
pub use scheduler::{BoxError, RELOAD, Rebuild, Scheduler, Timing};
pub use watch::{WatchEvents, WatchRoots, WatchSet, is_change};
pub use websocket::{ReloadHub, WsSink};

pub(crate) use websocket::ws_handler;

//! Logging bootstrap for binaries embedding the iterator. The iterator
//! itself never calls this; it only emits `log::debug!`/`log::warn!`
//! call sites and lets the embedder decide how (or whether) to install
//! a logger.

pub use log::Level;
use simple_logger::SimpleLogger;

/// Initialize the logging facility at the given level. Panics if called
/// more than once, matching the underlying `log` facade's contract.
pub fn init(level: Level) {
    SimpleLogger::new().with_level(level.to_level_filter()).init().unwrap()
}

#[inline]
pub fn set_max_level(level: Level) {
    log::set_max_level(level.to_level_filter())
}

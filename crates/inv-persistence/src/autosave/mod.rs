//! Safety-net autosave.
//!
//! Every mutating workflow saves on its own; autosave only catches changes
//! that were marked dirty without an explicit save.
//!
//! - `DirtyTracker` - records unsaved changes
//! - `AutoSaveConfig` - interval and debounce settings
//! - `run_autosave` - periodic driver for a shared store

mod config;
mod runner;
mod tracker;

pub use config::AutoSaveConfig;
pub use runner::{AutoSaveTarget, run_autosave};
pub use tracker::DirtyTracker;

//! Tracked series and their download progress.
//!
//! The `WatchlistStore` trait is the only way the rest of the crate reads or
//! advances tracking state. `JsonWatchlistStore` keeps it in a JSON file.

mod json_store;
mod seed;
mod store;
mod types;

pub use json_store::JsonWatchlistStore;
pub use seed::{names_from_folder, names_from_list};
pub use store::{WatchlistError, WatchlistStore};
pub use types::*;

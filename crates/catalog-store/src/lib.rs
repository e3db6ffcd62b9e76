pub mod storage;
pub mod watchlist;

pub use storage::{FileStorage, KeyValueStorage, StorageError};
pub use watchlist::{WatchlistError, WatchlistStore, WATCHLIST_KEY};

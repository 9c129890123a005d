// History module.
// Time series of user and repository snapshots that outlives the response cache.

pub mod store;

pub use store::{HistoryStore, RepoSnapshot, UserSnapshot};

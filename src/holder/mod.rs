/* src/holder/mod.rs */

mod record;
mod snapshot;
mod store;

pub use record::RefreshRecord;
pub use snapshot::Snapshot;
pub use store::{CacheState, Commit, Store, Superseded};

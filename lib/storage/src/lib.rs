pub mod persistence;
pub mod snapshot;

pub use persistence::SnapshotFile;
pub use snapshot::{decode, encode, load, save, StoreSnapshot};

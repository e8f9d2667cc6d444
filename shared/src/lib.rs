pub mod pose;
pub mod protocol;
pub mod store;

pub use pose::*;
pub use protocol::*;
pub use store::BulletinBoard;

pub const RELAY_HOST: &str = "127.0.0.1";
pub const RELAY_PORT: u16 = 8080;

/// Default sync cadence: exchange state with the relay every Kth frame.
pub const SYNC_INTERVAL: u64 = 1;

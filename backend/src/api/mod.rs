pub mod admin;
pub mod channel;
pub mod snapshot;

pub use admin::*;
pub use channel::*;
pub use snapshot::*;

pub mod error;
pub mod map;
pub mod protocol;
pub mod team;

pub use error::SnapshotError;
pub use map::*;
pub use protocol::*;
pub use team::Team;

pub mod handler;
pub mod relay;
pub mod room;
pub mod router;
pub mod types;

pub use relay::EventRelay;
pub use router::{RoomManager, router};

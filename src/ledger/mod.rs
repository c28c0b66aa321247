pub mod accounts;
pub mod address;
pub mod assets;
pub mod block;
pub mod entities;
pub mod events;
pub mod keys;
pub mod store;

pub use address::Address;
pub use block::{Block, BlockSource, Transaction, TransactionId};
pub use events::{CanvasEvent, EventBus};
pub use store::{MemoryStore, StateBatch, StateReader, StateStore};

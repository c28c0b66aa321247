pub mod canvas_account;
pub mod canvas_block;
pub mod canvas_transaction;
pub mod timelapse_preview;
pub mod timelapse_snapshot;
pub mod timelapse_summary;
pub mod transaction_summary;

pub use canvas_account::Entity as CanvasAccount;
pub use canvas_block::Entity as CanvasBlock;
pub use canvas_transaction::Entity as CanvasTransaction;
pub use timelapse_preview::Entity as TimelapsePreview;
pub use timelapse_snapshot::Entity as TimelapseSnapshot;
pub use timelapse_summary::Entity as TimelapseSummary;
pub use transaction_summary::Entity as TransactionSummary;

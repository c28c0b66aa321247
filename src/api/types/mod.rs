mod canvas;
mod chain;
mod common;
mod statistics;
mod view;

pub use canvas::*;
pub use chain::*;
pub use common::*;
pub use statistics::*;
pub use view::*;

pub mod activity;
pub mod statistics;
pub mod timelapse;

pub use activity::ActivityRepository;
pub use statistics::StatisticsRepository;
pub use timelapse::{NewTimelapseSummary, TimelapseRepository};

pub mod canvas;
pub mod chain;
pub mod consumer;
pub mod statistics;
pub mod timelapse;
pub mod view;

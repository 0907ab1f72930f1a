pub mod batch;
pub mod checkpoint;
pub mod cli;
pub mod dataset;
pub mod device;
pub mod error;
pub mod metrics;
pub mod model;
pub mod train;

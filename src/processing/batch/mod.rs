mod config;
mod metrics;
mod processor;

pub use config::ProgressConfig;
pub use metrics::BatchStats;
pub use processor::{BatchSession, BatchStage, ExportFailure, ExportReport};

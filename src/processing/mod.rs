//! Simulated compression and the processing sessions built on it.

pub mod batch;
pub mod driver;
pub mod optimizer;
pub mod single;

pub use batch::{BatchSession, BatchStage, BatchStats, ExportFailure, ExportReport, ProgressConfig};
pub use driver::{ProgressSession, drive};
pub use optimizer::Estimate;
pub use single::{SingleImageSession, SingleStage};

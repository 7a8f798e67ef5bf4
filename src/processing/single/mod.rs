mod session;

pub use session::{SingleImageSession, SingleStage};

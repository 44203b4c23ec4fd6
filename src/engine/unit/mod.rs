pub mod handle;
pub mod message;
pub mod worker;

pub use handle::{MergeHandle, MergeUnit};
pub use message::{MergeMessage, MergeStatus, StepOutcome, UnitState};
pub use worker::MergeReport;

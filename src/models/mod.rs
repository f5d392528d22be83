pub mod report;
pub mod violation;

pub use report::{ProctoringReport, ViolationTally};
pub use violation::{ViolationEvent, ViolationKind};

pub mod controller;
pub mod hooks;
pub mod state;

pub use controller::{ProctoringController, WeakProctoringController};
pub use hooks::ProctoringHooks;
pub use state::{ProctoringSnapshot, ProctoringState, ViolationOutcome};

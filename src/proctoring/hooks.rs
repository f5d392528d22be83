use std::{fmt, sync::Arc};

use crate::models::ViolationKind;

type ViolationCallback = Arc<dyn Fn(ViolationKind) + Send + Sync>;
type DisqualifyCallback = Arc<dyn Fn() + Send + Sync>;

/// Callbacks into the hosting exam flow. Invoked outside the state lock, so
/// they may call back into the controller's read-only methods. Transitions
/// are serialised per session: `on_violation` calls arrive in count order
/// and `on_disqualify` comes last.
#[derive(Clone, Default)]
pub struct ProctoringHooks {
    on_violation: Option<ViolationCallback>,
    on_disqualify: Option<DisqualifyCallback>,
}

impl ProctoringHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called once per counted violation, including the one that
    /// disqualifies.
    pub fn on_violation(mut self, callback: impl Fn(ViolationKind) + Send + Sync + 'static) -> Self {
        self.on_violation = Some(Arc::new(callback));
        self
    }

    /// Called exactly once, when the threshold is crossed.
    pub fn on_disqualify(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_disqualify = Some(Arc::new(callback));
        self
    }

    pub(crate) fn violation(&self, kind: ViolationKind) {
        if let Some(callback) = &self.on_violation {
            callback(kind);
        }
    }

    pub(crate) fn disqualify(&self) {
        if let Some(callback) = &self.on_disqualify {
            callback();
        }
    }
}

impl fmt::Debug for ProctoringHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProctoringHooks")
            .field("on_violation", &self.on_violation.is_some())
            .field("on_disqualify", &self.on_disqualify.is_some())
            .finish()
    }
}

//! Summary handed to the hosting exam flow when a proctored session ends.
//!
//! Nothing here is persisted by this crate; the host records pass/fail and
//! violation results through its own data service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ViolationKind;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ViolationTally {
    pub no_face: u32,
    pub tab_switch: u32,
    pub window_blur: u32,
}

impl ViolationTally {
    pub fn record(&mut self, kind: ViolationKind) {
        match kind {
            ViolationKind::NoFace => self.no_face += 1,
            ViolationKind::TabSwitch => self.tab_switch += 1,
            ViolationKind::WindowBlur => self.window_blur += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.no_face + self.tab_switch + self.window_blur
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProctoringReport {
    /// `None` when the camera never started successfully.
    pub session_id: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: DateTime<Utc>,
    pub violations: u32,
    pub max_violations: u32,
    pub disqualified: bool,
    pub tally: ViolationTally,
    pub last_error: Option<String>,
}

impl ProctoringReport {
    pub fn passed(&self) -> bool {
        self.session_id.is_some() && !self.disqualified
    }
}

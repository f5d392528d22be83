use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    focus::FocusEvent,
    models::{ViolationKind, ViolationTally},
};

/// Result of feeding one signal through the accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationOutcome {
    /// Nothing counted: session inactive, already disqualified, or the
    /// signal was not a violation.
    Ignored,
    Recorded { kind: ViolationKind, count: u32 },
    /// The violation that crossed the threshold.
    Disqualified { kind: ViolationKind, count: u32 },
}

impl ViolationOutcome {
    pub fn kind(&self) -> Option<ViolationKind> {
        match self {
            ViolationOutcome::Ignored => None,
            ViolationOutcome::Recorded { kind, .. } | ViolationOutcome::Disqualified { kind, .. } => {
                Some(*kind)
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProctoringState {
    pub camera_active: bool,
    /// True until the first classification says otherwise.
    pub face_detected: bool,
    pub tab_focused: bool,
    pub violation_count: u32,
    /// Absorbing: never reset within a session.
    pub disqualified: bool,
    pub last_error: Option<String>,
    pub session_id: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub tally: ViolationTally,
}

impl Default for ProctoringState {
    fn default() -> Self {
        Self {
            camera_active: false,
            face_detected: true,
            tab_focused: true,
            violation_count: 0,
            disqualified: false,
            last_error: None,
            session_id: None,
            started_at: None,
            tally: ViolationTally::default(),
        }
    }
}

impl ProctoringState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the device as acquired. Identity is assigned on the first
    /// successful start only, so a retry after a device error or an explicit
    /// stop stays within the same session.
    pub fn begin_capture(&mut self, session_id: String, now: DateTime<Utc>) {
        self.camera_active = true;
        self.last_error = None;
        if self.session_id.is_none() {
            self.session_id = Some(session_id);
            self.started_at = Some(now);
        }
    }

    pub fn capture_failed(&mut self, message: String) {
        self.camera_active = false;
        self.last_error = Some(message);
    }

    pub fn end_capture(&mut self) {
        self.camera_active = false;
    }

    /// Core transition: `Active + violation -> Active | Disqualified`.
    pub fn apply_violation(&mut self, kind: ViolationKind, max_violations: u32) -> ViolationOutcome {
        if self.disqualified {
            return ViolationOutcome::Ignored;
        }

        self.violation_count += 1;
        self.tally.record(kind);

        if self.violation_count >= max_violations {
            self.disqualified = true;
            ViolationOutcome::Disqualified {
                kind,
                count: self.violation_count,
            }
        } else {
            ViolationOutcome::Recorded {
                kind,
                count: self.violation_count,
            }
        }
    }

    /// Presence signal from the classifier. Only the detected -> absent edge
    /// counts; sustained absence does not re-trigger.
    pub fn apply_presence(&mut self, face_detected: bool, max_violations: u32) -> ViolationOutcome {
        if !self.camera_active || self.disqualified {
            return ViolationOutcome::Ignored;
        }

        let was_detected = self.face_detected;
        self.face_detected = face_detected;

        if was_detected && !face_detected {
            self.apply_violation(ViolationKind::NoFace, max_violations)
        } else {
            ViolationOutcome::Ignored
        }
    }

    /// Focus signal. A loss only registers while the camera is live and the
    /// session is not disqualified; regaining focus always registers.
    pub fn apply_focus(&mut self, event: FocusEvent, max_violations: u32) -> ViolationOutcome {
        if !event.loses_focus() {
            self.tab_focused = true;
            return ViolationOutcome::Ignored;
        }
        if !self.camera_active || self.disqualified {
            return ViolationOutcome::Ignored;
        }

        self.tab_focused = false;
        match event.violation_kind() {
            Some(kind) => self.apply_violation(kind, max_violations),
            None => ViolationOutcome::Ignored,
        }
    }

    pub fn snapshot(&self) -> ProctoringSnapshot {
        ProctoringSnapshot {
            camera_enabled: self.camera_active,
            face_detected: self.face_detected,
            multiple_faces: false,
            tab_focused: self.tab_focused,
            violations: self.violation_count,
            is_disqualified: self.disqualified,
            error: self.last_error.clone(),
        }
    }
}

/// What the hosting exam view renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProctoringSnapshot {
    pub camera_enabled: bool,
    pub face_detected: bool,
    /// Reserved; the heuristic cannot count faces.
    pub multiple_faces: bool,
    pub tab_focused: bool,
    pub violations: u32,
    pub is_disqualified: bool,
    pub error: Option<String>,
}

impl Default for ProctoringSnapshot {
    fn default() -> Self {
        ProctoringState::default().snapshot()
    }
}

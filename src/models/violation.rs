use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    NoFace,
    TabSwitch,
    WindowBlur,
}

impl ViolationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::NoFace => "no_face",
            ViolationKind::TabSwitch => "tab_switch",
            ViolationKind::WindowBlur => "window_blur",
        }
    }
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single policy signal. Consumed by the accumulator as soon as it is
/// produced; only the running count survives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationEvent {
    pub kind: ViolationKind,
    pub timestamp: DateTime<Utc>,
}

impl ViolationEvent {
    pub fn new(kind: ViolationKind) -> Self {
        Self {
            kind,
            timestamp: Utc::now(),
        }
    }
}

//! Tab and window attention tracking.
//!
//! The browser (or any other host) is abstracted as a [`FocusSource`] that
//! yields [`FocusEvent`]s; [`FocusMonitor`] forwards them to a session as
//! they arrive, without debouncing.

pub mod monitor;
pub mod source;

use std::str::FromStr;

use anyhow::{anyhow, Error};
use serde::{Deserialize, Serialize};

use crate::models::ViolationKind;

pub use monitor::FocusMonitor;
pub use source::{ChannelFocusSource, FocusSender, FocusSource, LineFocusSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FocusEvent {
    /// Document visibility changed to hidden.
    Hidden,
    /// Document visible again.
    Visible,
    /// Window lost focus.
    Blur,
    /// Window regained focus.
    Focus,
}

impl FocusEvent {
    pub fn loses_focus(&self) -> bool {
        matches!(self, FocusEvent::Hidden | FocusEvent::Blur)
    }

    pub fn violation_kind(&self) -> Option<ViolationKind> {
        match self {
            FocusEvent::Hidden => Some(ViolationKind::TabSwitch),
            FocusEvent::Blur => Some(ViolationKind::WindowBlur),
            FocusEvent::Visible | FocusEvent::Focus => None,
        }
    }
}

impl FromStr for FocusEvent {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "hidden" => Ok(FocusEvent::Hidden),
            "visible" => Ok(FocusEvent::Visible),
            "blur" => Ok(FocusEvent::Blur),
            "focus" => Ok(FocusEvent::Focus),
            other => Err(anyhow!("unknown focus event '{other}'")),
        }
    }
}

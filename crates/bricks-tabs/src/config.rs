//! Tab view configuration

use serde::{Deserialize, Serialize};

use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabViewConfig {
    /// Keep the previously selected content visible after a selection change
    /// until the host calls `TabView::unmap_extra_pages` from an idle callback
    pub defer_unmap: bool,
    /// Remember the focused element of a page when it loses the selection and
    /// give focus back to it when the page is selected again
    pub restore_focus: bool,
}

impl TabViewConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for TabViewConfig {
    fn default() -> Self {
        Self {
            defer_unmap: true,
            restore_focus: true,
        }
    }
}

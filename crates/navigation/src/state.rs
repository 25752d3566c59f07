use serde::Serialize;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Map,
    Panorama,
}

/// Which view is live. Exactly one is visible and accepts input.
///
/// Only [`crate::NavigationController`] constructs transitions; everything
/// else reads.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum NavigationState {
    #[default]
    Map,
    Panorama {
        #[serde(rename = "activePanoramaId")]
        active_id: String,
    },
}

impl NavigationState {
    pub fn mode(&self) -> ViewMode {
        match self {
            NavigationState::Map => ViewMode::Map,
            NavigationState::Panorama { .. } => ViewMode::Panorama,
        }
    }

    pub fn active_panorama_id(&self) -> Option<&str> {
        match self {
            NavigationState::Map => None,
            NavigationState::Panorama { active_id } => Some(active_id),
        }
    }
}

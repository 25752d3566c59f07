use serde::{Deserialize, Serialize};

use crate::hotspot::{FlatHotspotConfig, HotspotProjector, RenderMode, SphericalArrowConfig};
use crate::scene::ImagerySettings;

/// Rotation from world north to the map's compass north, in degrees.
///
/// Calibrated against the observed map, where the world's axes are turned
/// relative to the compass. Deployments with other data must re-calibrate.
pub const WORLD_TO_COMPASS_OFFSET_DEG: f64 = -62.0;

/// Farthest neighbor reachable from a panorama, in world units.
pub const DEFAULT_MAX_DISTANCE: f64 = 500.0;

/// When the controller reloads the metadata feed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CatalogPolicy {
    /// Keep the first snapshot until it is explicitly invalidated.
    #[default]
    Snapshot,
    /// Fetch the feed again before every panorama visit.
    RefetchEachVisit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationConfig {
    pub max_distance: f64,
    pub compass_correction_deg: f64,
    pub render_mode: RenderMode,
    pub flat: FlatHotspotConfig,
    pub spherical: SphericalArrowConfig,
    pub catalog_policy: CatalogPolicy,
    pub imagery: ImagerySettings,
    /// Hold each transition until the host reports the panorama texture
    /// loaded (see `NavigationController::complete_image`).
    #[serde(default)]
    pub confirm_imagery: bool,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            max_distance: DEFAULT_MAX_DISTANCE,
            compass_correction_deg: WORLD_TO_COMPASS_OFFSET_DEG,
            render_mode: RenderMode::default(),
            flat: FlatHotspotConfig::default(),
            spherical: SphericalArrowConfig::default(),
            catalog_policy: CatalogPolicy::default(),
            imagery: ImagerySettings::default(),
            confirm_imagery: false,
        }
    }
}

impl NavigationConfig {
    pub fn projector(&self) -> HotspotProjector {
        HotspotProjector {
            mode: self.render_mode,
            flat: self.flat,
            spherical: self.spherical,
        }
    }

    /// Offset a viewer's compass needs so it points at map north.
    pub fn north_offset_deg(&self) -> f64 {
        -self.compass_correction_deg
    }
}

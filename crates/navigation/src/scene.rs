use catalog::{CatalogSnapshot, PanoramaRecord};
use serde::{Deserialize, Serialize};

use crate::config::NavigationConfig;
use crate::error::NavigationError;
use crate::hotspot::{Hotspot, RenderMode};
use crate::neighbors::resolve;

/// Where panorama textures live: `<base_url>/<id>.<extension>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagerySettings {
    pub base_url: String,
    pub extension: String,
}

impl Default for ImagerySettings {
    fn default() -> Self {
        Self {
            base_url: "content/views".to_string(),
            extension: "jpg".to_string(),
        }
    }
}

impl ImagerySettings {
    pub fn image_url(&self, id: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let ext = self.extension.trim_start_matches('.');
        if base.is_empty() {
            format!("{id}.{ext}")
        } else {
            format!("{base}/{id}.{ext}")
        }
    }
}

/// Everything the panorama renderer needs to show one panorama.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanoramaScene {
    pub id: String,
    pub title: String,
    pub image_url: String,
    pub mode: RenderMode,
    /// Compass correction for the viewer's north indicator, in degrees.
    pub north_offset: f64,
    /// The texture's own north alignment, in degrees.
    pub rotation_offset: f64,
    pub hotspots: Vec<Hotspot>,
}

impl PanoramaScene {
    pub fn has_hotspot_to(&self, target_id: &str) -> bool {
        self.hotspots.iter().any(|h| h.target_id() == target_id)
    }
}

/// Resolve neighbors for `id` and project them for the configured viewer.
pub fn build_scene(
    id: &str,
    snapshot: &CatalogSnapshot,
    config: &NavigationConfig,
) -> Result<PanoramaScene, NavigationError> {
    let current: &PanoramaRecord = snapshot.find_by_id(id)?;
    let neighbors = resolve(
        current,
        snapshot.records(),
        config.max_distance,
        config.compass_correction_deg,
    )?;
    let hotspots = config.projector().project_all(&neighbors, current);

    Ok(PanoramaScene {
        id: current.id.clone(),
        title: current.display_name().to_string(),
        image_url: config.imagery.image_url(&current.id),
        mode: config.render_mode,
        north_offset: config.north_offset_deg(),
        rotation_offset: current.rotation_offset,
        hotspots,
    })
}

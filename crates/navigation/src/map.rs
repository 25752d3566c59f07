use catalog::PanoramaRecord;
use serde::{Deserialize, Serialize};

use crate::transform::{
    AxisSigns, LatLng, MapProjector, ProjectionBounds, SimpleCrsProjector, TransformError,
    WorldExtent, compute_factors, projection_bounds, world_to_projected,
};

/// Pan/zoom of the top-down map, kept while a panorama is open.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapCamera {
    pub center: LatLng,
    pub zoom: u8,
}

impl Default for MapCamera {
    fn default() -> Self {
        Self {
            center: LatLng::new(-241.0, 368.0),
            zoom: 3,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerIcon {
    pub size: [u32; 2],
    /// Pixel of the icon that sits on the marker position.
    pub anchor: [u32; 2],
}

impl Default for MarkerIcon {
    fn default() -> Self {
        Self {
            size: [25, 41],
            anchor: [12, 41],
        }
    }
}

/// Map configuration handed to the tile-map collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapViewSettings {
    pub tile_url_template: String,
    pub tile_size: u32,
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub attribution: String,
    pub initial_camera: MapCamera,
    pub world_extent: WorldExtent,
    pub axis_signs: AxisSigns,
    pub marker_icon: MarkerIcon,
}

impl Default for MapViewSettings {
    fn default() -> Self {
        Self {
            tile_url_template: "https://tiles.tinyarmy.org/1/1/{z}/{x}/{y}.jpg".to_string(),
            tile_size: 256,
            min_zoom: 2,
            max_zoom: 7,
            attribution: "Tiles by that_shaman".to_string(),
            initial_camera: MapCamera::default(),
            world_extent: WorldExtent::default(),
            axis_signs: AxisSigns::default(),
            marker_icon: MarkerIcon::default(),
        }
    }
}

impl MapViewSettings {
    /// Simple-CRS projector matching this map's zoom range.
    pub fn projector(&self) -> SimpleCrsProjector {
        SimpleCrsProjector::new(self.min_zoom, self.max_zoom)
    }
}

/// What a marker reports when clicked: the id bound at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerClick {
    pub panorama_id: String,
}

impl MarkerClick {
    pub fn new(panorama_id: impl Into<String>) -> Self {
        Self {
            panorama_id: panorama_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapMarker {
    pub panorama_id: String,
    pub label: String,
    pub position: LatLng,
    pub icon: MarkerIcon,
}

impl MapMarker {
    pub fn click(&self) -> MarkerClick {
        MarkerClick::new(self.panorama_id.clone())
    }
}

/// One marker per record, placed with factors derived from `projector` now.
pub fn place_markers<P: MapProjector + ?Sized>(
    records: &[PanoramaRecord],
    settings: &MapViewSettings,
    projector: &P,
) -> Result<Vec<MapMarker>, TransformError> {
    let factors = compute_factors(settings.world_extent, projector, settings.axis_signs)?;
    Ok(records
        .iter()
        .map(|r| MapMarker {
            panorama_id: r.id.clone(),
            label: r.display_name().to_string(),
            position: world_to_projected(r.position(), factors),
            icon: settings.marker_icon,
        })
        .collect())
}

/// Map payload: settings, world bounds (used as max pan bounds) and markers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapView {
    pub settings: MapViewSettings,
    pub max_bounds: ProjectionBounds,
    pub markers: Vec<MapMarker>,
}

impl MapView {
    pub fn build<P: MapProjector + ?Sized>(
        settings: MapViewSettings,
        records: &[PanoramaRecord],
        projector: &P,
    ) -> Result<Self, TransformError> {
        let max_bounds = projection_bounds(settings.world_extent, projector)?;
        let markers = place_markers(records, &settings, projector)?;
        Ok(Self {
            settings,
            max_bounds,
            markers,
        })
    }
}

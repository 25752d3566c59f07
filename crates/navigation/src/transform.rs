//! World units to map-projection space.
//!
//! The map collaborator works in a latitude/longitude-like space. For the
//! flat game map this is a simple linear scale per axis, derived by
//! projecting the world's two corners at the projector's deepest zoom.

use foundation::math::Vec2;
use serde::{Deserialize, Serialize};

/// World extent of the observed deployment, in world units.
pub const OBSERVED_WORLD_MAX_X: f64 = 81_920.0;
pub const OBSERVED_WORLD_MAX_Y: f64 = 114_688.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    Configuration(String),
}

impl std::fmt::Display for TransformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransformError::Configuration(msg) => write!(f, "projection misconfigured: {msg}"),
        }
    }
}

impl std::error::Error for TransformError {}

/// A point in projection space.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// What the core needs from the map collaborator.
pub trait MapProjector {
    fn min_zoom(&self) -> u8 {
        0
    }

    fn max_zoom(&self) -> u8;

    /// Pixel point at `zoom` to projection space.
    fn unproject(&self, point: Vec2, zoom: u8) -> LatLng;
}

/// Leaflet-style "Simple" CRS: one pixel per unit at zoom 0, y pointing down.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleCrsProjector {
    pub min_zoom: u8,
    pub max_zoom: u8,
}

impl SimpleCrsProjector {
    pub const fn new(min_zoom: u8, max_zoom: u8) -> Self {
        Self { min_zoom, max_zoom }
    }
}

impl Default for SimpleCrsProjector {
    fn default() -> Self {
        Self::new(2, 7)
    }
}

impl MapProjector for SimpleCrsProjector {
    fn min_zoom(&self) -> u8 {
        self.min_zoom
    }

    fn max_zoom(&self) -> u8 {
        self.max_zoom
    }

    fn unproject(&self, point: Vec2, zoom: u8) -> LatLng {
        let scale = 2f64.powi(i32::from(zoom));
        LatLng::new(-point.y / scale, point.x / scale)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldExtent {
    pub max_x: f64,
    pub max_y: f64,
}

impl WorldExtent {
    pub const fn new(max_x: f64, max_y: f64) -> Self {
        Self { max_x, max_y }
    }

    fn validate(self) -> Result<(), TransformError> {
        for (axis, v) in [("max_x", self.max_x), ("max_y", self.max_y)] {
            if v == 0.0 || !v.is_finite() {
                return Err(TransformError::Configuration(format!(
                    "world extent {axis} must be finite and non-zero (got {v})"
                )));
            }
        }
        Ok(())
    }
}

impl Default for WorldExtent {
    fn default() -> Self {
        Self::new(OBSERVED_WORLD_MAX_X, OBSERVED_WORLD_MAX_Y)
    }
}

/// Sign multipliers for the projector's east and south axes.
///
/// Deployments disagree on whether projected south grows with world y, so
/// this is configuration rather than a constant.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisSigns {
    pub east: f64,
    pub south: f64,
}

impl AxisSigns {
    pub const fn new(east: f64, south: f64) -> Self {
        Self { east, south }
    }
}

impl Default for AxisSigns {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

/// Projected corners of the world, as a lat/lng bounding box.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl ProjectionBounds {
    pub fn from_corners(a: LatLng, b: LatLng) -> Self {
        Self {
            north: a.lat.max(b.lat),
            south: a.lat.min(b.lat),
            east: a.lng.max(b.lng),
            west: a.lng.min(b.lng),
        }
    }

    pub fn south_west(&self) -> LatLng {
        LatLng::new(self.south, self.west)
    }

    pub fn north_east(&self) -> LatLng {
        LatLng::new(self.north, self.east)
    }
}

/// Linear world-to-projection scale. Only valid for the projector
/// configuration it was computed from.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionFactors {
    pub factor_x: f64,
    pub factor_y: f64,
}

pub fn projection_bounds<P: MapProjector + ?Sized>(
    extent: WorldExtent,
    projector: &P,
) -> Result<ProjectionBounds, TransformError> {
    extent.validate()?;
    if projector.min_zoom() > projector.max_zoom() {
        return Err(TransformError::Configuration(format!(
            "min zoom {} is deeper than max zoom {}",
            projector.min_zoom(),
            projector.max_zoom()
        )));
    }
    // Deepest zoom keeps rounding in the projector to a minimum.
    let zoom = projector.max_zoom();
    let origin = projector.unproject(Vec2::ZERO, zoom);
    let far = projector.unproject(Vec2::new(extent.max_x, extent.max_y), zoom);
    let bounds = ProjectionBounds::from_corners(origin, far);
    if ![bounds.north, bounds.south, bounds.east, bounds.west]
        .iter()
        .all(|v| v.is_finite())
    {
        return Err(TransformError::Configuration(format!(
            "projector returned non-finite bounds at zoom {zoom}: {bounds:?}"
        )));
    }
    Ok(bounds)
}

pub fn compute_factors<P: MapProjector + ?Sized>(
    extent: WorldExtent,
    projector: &P,
    signs: AxisSigns,
) -> Result<ProjectionFactors, TransformError> {
    let usable = |s: f64| s != 0.0 && s.is_finite();
    if !usable(signs.east) || !usable(signs.south) {
        return Err(TransformError::Configuration(format!(
            "axis signs must be finite and non-zero (got {signs:?})"
        )));
    }
    let bounds = projection_bounds(extent, projector)?;
    Ok(ProjectionFactors {
        factor_x: signs.east * bounds.east / extent.max_x,
        factor_y: signs.south * bounds.south / extent.max_y,
    })
}

/// World point to projection space.
///
/// World y lands on the latitude-like axis and world x on the
/// longitude-like one. Marker placement depends on this swap.
pub fn world_to_projected(point: Vec2, factors: ProjectionFactors) -> LatLng {
    LatLng::new(point.y * factors.factor_y, point.x * factors.factor_x)
}

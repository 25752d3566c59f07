//! Neighbor to on-screen control, for each supported viewer.
//!
//! A flat equirectangular viewer places hotspots by yaw/pitch. An
//! orbit-camera viewer renders a sphere around the camera and floats an arrow
//! (a cone) between the eye and the texture. Both come from the same
//! [`Neighbor`], so the viewer is a strategy choice, not a separate code path.

use std::str::FromStr;

use catalog::PanoramaRecord;
use foundation::math::{Quat, Vec3, wrap_degrees_180};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::neighbors::Neighbor;

/// Eye-level downward tilt for flat hotspots, in degrees.
pub const DEFAULT_PITCH_DEG: f64 = -15.0;
/// How far from the eye an arrow floats, in viewer units.
pub const DEFAULT_PLACEMENT_DISTANCE: f64 = 8.0;
/// How far below the eye line an arrow floats, in viewer units.
pub const DEFAULT_VERTICAL_OFFSET: f64 = 10.0;
pub const DEFAULT_ARROW_COLOR: [f32; 4] = [1.0, 0.8, 0.0, 1.0];
pub const DEFAULT_ARROW_HOVER_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    #[default]
    Flat,
    Spherical,
}

impl RenderMode {
    pub fn as_str(self) -> &'static str {
        match self {
            RenderMode::Flat => "flat",
            RenderMode::Spherical => "spherical",
        }
    }
}

impl FromStr for RenderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flat" | "equirectangular" => Ok(RenderMode::Flat),
            "spherical" | "sphere" | "3d" => Ok(RenderMode::Spherical),
            other => Err(format!("unknown render mode: {other} (expected flat|spherical)")),
        }
    }
}

impl std::fmt::Display for RenderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatHotspotConfig {
    pub pitch_deg: f64,
    pub yaw_offset_deg: f64,
}

impl Default for FlatHotspotConfig {
    fn default() -> Self {
        Self {
            pitch_deg: DEFAULT_PITCH_DEG,
            yaw_offset_deg: 0.0,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct SphericalArrowConfig {
    /// Camera position inside the panorama sphere.
    pub origin: Vec3,
    pub placement_distance: f64,
    pub vertical_offset: f64,
    pub color: [f32; 4],
    pub hover_color: [f32; 4],
}

impl Default for SphericalArrowConfig {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            placement_distance: DEFAULT_PLACEMENT_DISTANCE,
            vertical_offset: DEFAULT_VERTICAL_OFFSET,
            color: DEFAULT_ARROW_COLOR,
            hover_color: DEFAULT_ARROW_HOVER_COLOR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatHotspot {
    pub yaw: f64,
    pub pitch: f64,
    pub target_id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SphericalArrow {
    pub position: Vec3,
    pub direction: Vec3,
    /// Rotates the arrow model's up axis onto `direction`.
    pub orientation: Quat,
    pub target_id: String,
    /// Hover tooltip.
    pub label: String,
    pub color: [f32; 4],
    pub hover_color: [f32; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Hotspot {
    Flat(FlatHotspot),
    Spherical(SphericalArrow),
}

impl Hotspot {
    pub fn target_id(&self) -> &str {
        match self {
            Hotspot::Flat(h) => &h.target_id,
            Hotspot::Spherical(a) => &a.target_id,
        }
    }
}

/// `rotation_offset` is the current panorama's own north alignment; yaw is
/// measured in the panorama image, so it is taken out here.
pub fn to_flat_hotspot(
    neighbor: &Neighbor<'_>,
    rotation_offset: f64,
    config: &FlatHotspotConfig,
) -> FlatHotspot {
    FlatHotspot {
        yaw: wrap_degrees_180(neighbor.bearing + config.yaw_offset_deg - rotation_offset),
        pitch: config.pitch_deg,
        target_id: neighbor.target.id.clone(),
        label: neighbor.target.display_name().to_string(),
    }
}

/// Viewer axes: world x to viewer x, world y to viewer z, viewer y is up.
///
/// Returns `None` when the neighbor sits on top of `from`, since there is no
/// direction to point in.
pub fn to_spherical_arrow(
    neighbor: &Neighbor<'_>,
    from: &PanoramaRecord,
    config: &SphericalArrowConfig,
) -> Option<SphericalArrow> {
    let direction = Vec3::new(neighbor.target.x - from.x, 0.0, neighbor.target.y - from.y)
        .normalize()?;
    let position = config.origin
        + direction.scale(config.placement_distance)
        + Vec3::new(0.0, -config.vertical_offset, 0.0);
    Some(SphericalArrow {
        position,
        direction,
        orientation: Quat::from_unit_vectors(Vec3::UP, direction),
        target_id: neighbor.target.id.clone(),
        label: neighbor.target.display_name().to_string(),
        color: config.color,
        hover_color: config.hover_color,
    })
}

/// Render-mode strategy plus the constants both modes need.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HotspotProjector {
    pub mode: RenderMode,
    pub flat: FlatHotspotConfig,
    pub spherical: SphericalArrowConfig,
}

impl HotspotProjector {
    pub fn new(mode: RenderMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn project(&self, neighbor: &Neighbor<'_>, origin: &PanoramaRecord) -> Option<Hotspot> {
        match self.mode {
            RenderMode::Flat => Some(Hotspot::Flat(to_flat_hotspot(
                neighbor,
                origin.rotation_offset,
                &self.flat,
            ))),
            RenderMode::Spherical => {
                to_spherical_arrow(neighbor, origin, &self.spherical).map(Hotspot::Spherical)
            }
        }
    }

    pub fn project_all(&self, neighbors: &[Neighbor<'_>], origin: &PanoramaRecord) -> Vec<Hotspot> {
        neighbors
            .iter()
            .filter_map(|n| {
                let h = self.project(n, origin);
                if h.is_none() {
                    warn!(from = %origin.id, to = %n.target.id, "co-located panorama has no arrow");
                }
                h
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        FlatHotspotConfig, Hotspot, HotspotProjector, RenderMode, SphericalArrowConfig,
        to_flat_hotspot, to_spherical_arrow,
    };
    use crate::neighbors::{Neighbor, resolve};
    use catalog::PanoramaRecord;
    use foundation::math::Vec3;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn assert_vec_close(a: Vec3, b: Vec3, eps: f64) {
        let diff = (a - b).length();
        assert!(diff <= eps, "expected {a:?} ~= {b:?} (diff {diff})");
    }

    #[test]
    fn flat_hotspot_uses_bearing_and_fixed_pitch() {
        let target = PanoramaRecord::new("b", 0.0, 0.0).with_display_name("Bridge");
        let n = Neighbor {
            target: &target,
            distance: 10.0,
            bearing: 298.0,
        };
        let h = to_flat_hotspot(&n, 0.0, &FlatHotspotConfig::default());
        assert_close(h.yaw, -62.0, 1e-12);
        assert_close(h.pitch, -15.0, 1e-12);
        assert_eq!(h.target_id, "b");
        assert_eq!(h.label, "Bridge");

        let shifted = to_flat_hotspot(
            &n,
            30.0,
            &FlatHotspotConfig {
                pitch_deg: -5.0,
                yaw_offset_deg: 10.0,
            },
        );
        assert_close(shifted.yaw, -82.0, 1e-12);
        assert_close(shifted.pitch, -5.0, 1e-12);
    }

    #[test]
    fn spherical_arrow_points_at_neighbor() {
        let from = PanoramaRecord::new("a", 100.0, 100.0);
        let target = PanoramaRecord::new("b", 100.0, 0.0);
        let n = Neighbor {
            target: &target,
            distance: 100.0,
            bearing: 0.0,
        };
        let arrow = to_spherical_arrow(&n, &from, &SphericalArrowConfig::default()).unwrap();
        assert_vec_close(arrow.direction, Vec3::new(0.0, 0.0, -1.0), 1e-12);
        assert_vec_close(arrow.position, Vec3::new(0.0, -10.0, -8.0), 1e-12);
        assert_vec_close(arrow.orientation.rotate(Vec3::UP), arrow.direction, 1e-9);
        assert_eq!(arrow.target_id, "b");
    }

    #[test]
    fn spherical_arrow_is_offset_from_camera_origin() {
        let from = PanoramaRecord::new("a", 0.0, 0.0);
        let target = PanoramaRecord::new("b", 30.0, 40.0);
        let n = Neighbor {
            target: &target,
            distance: 50.0,
            bearing: 0.0,
        };
        let config = SphericalArrowConfig {
            origin: Vec3::new(1.0, 2.0, 3.0),
            placement_distance: 5.0,
            vertical_offset: 1.0,
            ..SphericalArrowConfig::default()
        };
        let arrow = to_spherical_arrow(&n, &from, &config).unwrap();
        assert_vec_close(arrow.direction, Vec3::new(0.6, 0.0, 0.8), 1e-12);
        assert_vec_close(arrow.position, Vec3::new(4.0, 1.0, 7.0), 1e-12);
    }

    #[test]
    fn co_located_neighbor_gets_no_arrow() {
        let all = vec![
            PanoramaRecord::new("a", 5.0, 5.0),
            PanoramaRecord::new("twin", 5.0, 5.0),
            PanoramaRecord::new("b", 5.0, 50.0),
        ];
        let neighbors = resolve(&all[0], &all, 500.0, 0.0).unwrap();
        assert_eq!(neighbors.len(), 2);

        let arrows = HotspotProjector::new(RenderMode::Spherical).project_all(&neighbors, &all[0]);
        assert_eq!(arrows.len(), 1);
        assert_eq!(arrows[0].target_id(), "b");

        let flats = HotspotProjector::new(RenderMode::Flat).project_all(&neighbors, &all[0]);
        assert_eq!(flats.len(), 2);
    }

    #[test]
    fn projection_is_idempotent_and_pure() {
        let all = vec![
            PanoramaRecord::new("a", 0.0, 0.0),
            PanoramaRecord::new("b", 120.0, -80.0),
        ];
        let before = all.clone();
        let neighbors = resolve(&all[0], &all, 500.0, -62.0).unwrap();
        for mode in [RenderMode::Flat, RenderMode::Spherical] {
            let p = HotspotProjector::new(mode);
            let first = p.project(&neighbors[0], &all[0]);
            let second = p.project(&neighbors[0], &all[0]);
            assert_eq!(first, second);
        }
        assert_eq!(all, before);
    }

    #[test]
    fn hotspots_serialize_with_kind_tag() {
        let target = PanoramaRecord::new("b", 0.0, 0.0);
        let n = Neighbor {
            target: &target,
            distance: 1.0,
            bearing: 90.0,
        };
        let h = Hotspot::Flat(to_flat_hotspot(&n, 0.0, &FlatHotspotConfig::default()));
        let json = serde_json::to_value(&h).unwrap();
        assert_eq!(json["kind"], "flat");
        assert_eq!(json["targetId"], "b");
        assert_eq!(json["yaw"], 90.0);
    }

    #[test]
    fn parses_render_modes() {
        assert_eq!("flat".parse::<RenderMode>().unwrap(), RenderMode::Flat);
        assert_eq!("Spherical".parse::<RenderMode>().unwrap(), RenderMode::Spherical);
        assert!("cube".parse::<RenderMode>().is_err());
    }
}

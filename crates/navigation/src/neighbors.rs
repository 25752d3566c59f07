use std::collections::BTreeSet;

use catalog::PanoramaRecord;
use foundation::math::{canonical_f64, stable_total_cmp_f64, wrap_degrees_360};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::NavigationError;

/// A panorama reachable from the current one.
///
/// `bearing` is in degrees from world north, clockwise, with the compass
/// correction already applied and wrapped to `[0, 360)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Neighbor<'a> {
    pub target: &'a PanoramaRecord,
    pub distance: f64,
    pub bearing: f64,
}

/// Bearing from `from` to `to` before any compass correction.
///
/// World y grows southwards, so a target at smaller y is due north (0°) and
/// a target at larger x is due east (90°). Returned in `(-180, 180]`.
pub fn raw_bearing(from: &PanoramaRecord, to: &PanoramaRecord) -> f64 {
    let dx = from.x - to.x;
    let dy = from.y - to.y;
    let bearing = -dx.atan2(dy).to_degrees();
    if bearing <= -180.0 {
        bearing + 360.0
    } else {
        canonical_f64(bearing)
    }
}

fn measure<'a>(
    current: &PanoramaRecord,
    other: &'a PanoramaRecord,
    compass_correction_deg: f64,
) -> Neighbor<'a> {
    Neighbor {
        target: other,
        distance: current.position().distance(other.position()),
        bearing: wrap_degrees_360(raw_bearing(current, other) + compass_correction_deg),
    }
}

/// Every other panorama within `max_distance` of `current`, in catalog order.
///
/// Records are matched by id. `current` itself must be part of `all`.
pub fn resolve<'a>(
    current: &PanoramaRecord,
    all: &'a [PanoramaRecord],
    max_distance: f64,
    compass_correction_deg: f64,
) -> Result<Vec<Neighbor<'a>>, NavigationError> {
    if !all.iter().any(|r| r.id == current.id) {
        return Err(NavigationError::NotFound(current.id.clone()));
    }

    let mut out = Vec::new();
    for other in all.iter().filter(|r| r.id != current.id) {
        let n = measure(current, other, compass_correction_deg);
        debug!(
            from = %current.id,
            to = %other.id,
            distance = n.distance,
            bearing = n.bearing,
            "neighbor candidate"
        );
        if n.distance <= max_distance {
            out.push(n);
        }
    }
    Ok(out)
}

/// Resolve an explicit list of linked ids instead of scanning by distance.
///
/// Links that point at panoramas missing from `all` are skipped rather than
/// failing the whole set, and a repeated id yields one neighbor. The
/// distance limit still applies.
pub fn resolve_links<'a>(
    current: &PanoramaRecord,
    link_ids: &[&str],
    all: &'a [PanoramaRecord],
    max_distance: f64,
    compass_correction_deg: f64,
) -> Vec<Neighbor<'a>> {
    let mut out = Vec::with_capacity(link_ids.len());
    let mut seen = BTreeSet::new();
    for id in link_ids {
        if *id == current.id || !seen.insert(*id) {
            continue;
        }
        let Some(other) = all.iter().find(|r| r.id == *id) else {
            warn!(from = %current.id, link = %id, "skipping link to unknown panorama");
            continue;
        };
        let n = measure(current, other, compass_correction_deg);
        if n.distance <= max_distance {
            out.push(n);
        }
    }
    out
}

/// Reorder neighbors nearest first, ties broken by id.
pub fn sort_nearest_first(neighbors: &mut [Neighbor<'_>]) {
    neighbors.sort_by(|a, b| {
        stable_total_cmp_f64(a.distance, b.distance).then_with(|| a.target.id.cmp(&b.target.id))
    });
}

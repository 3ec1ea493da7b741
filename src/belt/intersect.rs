//! Reference-plane intersection: locating the entry and exit landmarks of
//! a rail.
//!
//! The design uses a fixed reference plane through the origin with its
//! normal along X (the YZ plane), and orders crossings by their Y
//! coordinate: the entry landmark is the crossing with the most positive
//! Y, the exit landmark the most negative.

use serde::Serialize;

use crate::geom::{Plane, Point3, curve_plane_intersections};

use super::diagnostics::{BeltDiagnostics, Stage};
use super::error::BeltError;
use super::rail::Rail;

/// Sample count for the sign-change walk used as the exact intersector.
const EXACT_WALK_SAMPLES: usize = 256;

/// Tuning for the sampling fallback used when no exact crossing is found.
///
/// Both values are heuristic defaults carried over from the original
/// design; neither is a load-bearing invariant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlaneIntersectOptions {
    /// Number of uniform samples taken over the rail domain.
    pub fallback_samples: usize,
    /// Absolute distance from the plane within which a sample counts as a
    /// crossing candidate.
    pub plane_band: f64,
}

impl Default for PlaneIntersectOptions {
    fn default() -> Self {
        Self {
            fallback_samples: 36,
            plane_band: 1.0,
        }
    }
}

/// One crossing of a rail with the reference plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneCrossing {
    pub point: Point3,
    pub param: f64,
}

/// Entry and exit landmarks of one rail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneCrossings {
    pub entry: PlaneCrossing,
    pub exit: PlaneCrossing,
}

/// The fixed reference plane separating the entry side from the exit side.
#[must_use]
pub fn reference_plane() -> Plane {
    Plane::yz()
}

/// Locate the entry and exit crossings of `rail` with the reference plane.
///
/// Exact crossings are searched first; when none are found (degenerate or
/// tangent geometry) a sparse sampling fallback selects the samples
/// nearest the plane instead. The fallback never fails as long as the
/// rail yields any samples at all.
pub fn find_plane_crossings(
    rail: &Rail,
    which: &'static str,
    options: &PlaneIntersectOptions,
    diagnostics: &mut BeltDiagnostics,
) -> Result<PlaneCrossings, BeltError> {
    if !rail.length().is_finite() || rail.length() <= 0.0 {
        return Err(BeltError::NoIntersection { rail: which });
    }

    let plane = reference_plane();

    let events = curve_plane_intersections(rail.curve(), &plane, EXACT_WALK_SAMPLES);
    if !events.is_empty() {
        let mut crossings: Vec<PlaneCrossing> = events
            .into_iter()
            .map(|(point, param)| PlaneCrossing { point, param })
            .collect();
        crossings.sort_by(|a, b| a.point.y.total_cmp(&b.point.y));
        return Ok(PlaneCrossings {
            entry: crossings[crossings.len() - 1],
            exit: crossings[0],
        });
    }

    // Sampling fallback for rails that never quite touch the plane.
    let samples = options.fallback_samples.max(2);
    let mut sampled: Vec<PlaneCrossing> = (0..samples)
        .map(|i| {
            let param = i as f64 / samples as f64;
            PlaneCrossing {
                point: rail.point_at(param),
                param,
            }
        })
        .collect();
    if sampled.is_empty() {
        return Err(BeltError::NoIntersection { rail: which });
    }

    let mut near: Vec<PlaneCrossing> = sampled
        .iter()
        .copied()
        .filter(|c| plane.signed_distance(c.point).abs() < options.plane_band)
        .collect();
    if near.len() < 2 {
        near = std::mem::take(&mut sampled);
    }
    near.sort_by(|a, b| a.point.y.total_cmp(&b.point.y));

    diagnostics.info(
        Stage::Intersect,
        format!("{which} rail: no exact plane crossing, sampling fallback used"),
    );

    Ok(PlaneCrossings {
        entry: near[near.len() - 1],
        exit: near[0],
    })
}

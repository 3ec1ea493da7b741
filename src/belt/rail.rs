//! Rail extraction: pulling the closed outer boundary curve out of a
//! trimmed boundary surface.

use crate::geom::{Curve3, Point3, Polyline3, TrimLoop3, TrimLoopKind, TrimmedSurface, Vec3};

use super::diagnostics::{BeltDiagnostics, Stage};
use super::error::BeltError;

/// A boundary rail: a closed curve on normalized arc-length domain [0, 1].
///
/// The rail owns its polyline; seam shifts and reversals produce new rails
/// rather than mutating in place, so each alignment step works from an
/// immutable snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Rail {
    curve: Polyline3,
}

impl Rail {
    pub fn new(points: Vec<Point3>, closed: bool) -> Result<Self, String> {
        Ok(Self {
            curve: Polyline3::new(points, closed)?,
        })
    }

    #[must_use]
    pub fn point_at(&self, t: f64) -> Point3 {
        self.curve.point_at(t)
    }

    #[must_use]
    pub fn tangent_at(&self, t: f64) -> Option<Vec3> {
        self.curve.tangent_at(t)
    }

    #[must_use]
    pub fn closest_param(&self, p: Point3) -> f64 {
        self.curve.closest_param(p)
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.curve.length()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.curve.is_closed()
    }

    /// New rail whose domain starts at parameter `t` of this one.
    #[must_use]
    pub fn with_seam_at(&self, t: f64) -> Self {
        Self {
            curve: self.curve.with_seam_at(t),
        }
    }

    /// New rail traversing in the opposite direction, seam preserved.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            curve: self.curve.reversed(),
        }
    }

    #[must_use]
    pub fn curve(&self) -> &Polyline3 {
        &self.curve
    }
}

/// Extract the boundary rail of a trimmed surface.
///
/// Prefers the loop tagged outer; when no loop carries the tag, falls back
/// to the loop with the greatest 3D arc length.
pub fn extract_rail(
    surface: &dyn TrimmedSurface,
    which: &'static str,
    diagnostics: &mut BeltDiagnostics,
) -> Result<Rail, BeltError> {
    let loops = surface.trim_loops();
    if loops.is_empty() {
        return Err(BeltError::Extraction {
            surface: which,
            reason: "surface has no trim loops".to_string(),
        });
    }

    let chosen: &TrimLoop3 = loops
        .iter()
        .find(|l| l.kind == TrimLoopKind::Outer)
        .or_else(|| {
            loops
                .iter()
                .max_by(|a, b| a.length().total_cmp(&b.length()))
        })
        .ok_or_else(|| BeltError::Extraction {
            surface: which,
            reason: "no loop with a 3D projection".to_string(),
        })?;

    let rail = Rail::new(chosen.points.clone(), true).map_err(|reason| BeltError::Extraction {
        surface: which,
        reason,
    })?;

    diagnostics.info(
        Stage::Extract,
        format!("{which} rail length = {:.2}", rail.length()),
    );

    Ok(rail)
}

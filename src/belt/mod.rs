//! Belt surface generation: builds a smooth periodic surface connecting a
//! dome and a bowl boundary surface with a controllable, asymmetric blend
//! of tangency and offset magnitude around the shared perimeter.
//!
//! The pipeline is synchronous and single-pass: rails are extracted from
//! the boundary surfaces, aligned to a common domain, populated with
//! control points, turned into cross-section curves, and lofted. All
//! intermediate state lives in one [`generate_belt`] invocation.

mod align;
mod config;
mod diagnostics;
mod error;
mod frame;
mod intersect;
mod loft;
mod plan;
mod rail;
mod section;

pub use align::{AlignedRails, align_rails};
pub use config::{BeltConfig, PointProfile, SideProfile};
pub use diagnostics::{BeltDiagnostics, DiagnosticRecord, Severity, Stage};
pub use error::BeltError;
pub use frame::{
    FrameOptions, PointVector, ResolvedControlPoint, outward_perpendicular,
    resolve_control_points,
};
pub use intersect::{
    PlaneCrossing, PlaneCrossings, PlaneIntersectOptions, find_plane_crossings, reference_plane,
};
pub use loft::loft_belt;
pub use plan::{ControlPointDefinition, Landmark, PointRole, interpolate_value, plan_control_points};
pub use rail::{Rail, extract_rail};
pub use section::{build_cross_sections, sections_for_loft};

use crate::geom::{CubicBezier3, Line3, LoftedSurface, Surface, Tolerance, TrimmedSurface};

/// Everything a belt generation run produces.
///
/// The cross-sections and offset segments are kept even when the run
/// fails after building them, so a host can visualize how far the
/// pipeline got.
#[derive(Debug)]
pub struct BeltResult {
    pub surface: Result<LoftedSurface, BeltError>,
    pub diagnostics: BeltDiagnostics,
    /// All built cross-section curves, in parameter order.
    pub cross_sections: Vec<CubicBezier3>,
    /// Offset-vector segments (point to point + vector), two per control
    /// point, for visualization.
    pub offset_segments: Vec<Line3>,
}

impl BeltResult {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.surface.is_ok()
    }
}

/// Compare each surface's mid-UV normal against the up/down convention
/// (dome bulges up, bowl bulges down) and record the finding. A flipped
/// input is not fatal, but it is the first thing to check when the belt
/// comes out inside-out.
fn check_orientation(
    dome: &dyn TrimmedSurface,
    bowl: &dyn TrimmedSurface,
    diagnostics: &mut BeltDiagnostics,
) {
    for (surface, which, upward) in [(dome, "dome", true), (bowl, "bowl", false)] {
        match surface.normal_at(0.5, 0.5) {
            Some(normal) if (normal.z > 0.0) == upward => {}
            Some(_) => diagnostics.warn(
                Stage::Extract,
                format!(
                    "{which} mid-surface normal faces {}, expected {}",
                    if upward { "down" } else { "up" },
                    if upward { "up" } else { "down" },
                ),
            ),
            None => diagnostics.info(
                Stage::Extract,
                format!("{which} mid-surface normal is degenerate, orientation unchecked"),
            ),
        }
    }
}

/// Generate the belt surface connecting `dome` and `bowl`.
///
/// On failure the result carries the error in place of the surface plus
/// every diagnostic and visualization artifact accumulated up to the
/// failing stage; there is no partial surface.
#[must_use]
pub fn generate_belt(
    dome: &dyn TrimmedSurface,
    bowl: &dyn TrimmedSurface,
    config: &BeltConfig,
    tol: Tolerance,
) -> BeltResult {
    let mut diagnostics = BeltDiagnostics::new();
    let mut cross_sections = Vec::new();
    let mut offset_segments = Vec::new();

    let surface = run_pipeline(
        dome,
        bowl,
        config,
        tol,
        &mut diagnostics,
        &mut cross_sections,
        &mut offset_segments,
    );

    BeltResult {
        surface,
        diagnostics,
        cross_sections,
        offset_segments,
    }
}

fn run_pipeline(
    dome: &dyn TrimmedSurface,
    bowl: &dyn TrimmedSurface,
    config: &BeltConfig,
    tol: Tolerance,
    diagnostics: &mut BeltDiagnostics,
    cross_sections: &mut Vec<CubicBezier3>,
    offset_segments: &mut Vec<Line3>,
) -> Result<LoftedSurface, BeltError> {
    let config = config.sanitized(diagnostics);

    check_orientation(dome, bowl, diagnostics);

    let dome_rail = extract_rail(dome, "dome", diagnostics)?;
    let bowl_rail = extract_rail(bowl, "bowl", diagnostics)?;
    if dome_rail.length() > 0.0 {
        diagnostics.info(
            Stage::Extract,
            format!(
                "rail length ratio (bowl/dome) = {:.3}",
                bowl_rail.length() / dome_rail.length()
            ),
        );
    }

    let aligned = align_rails(&dome_rail, &bowl_rail, &config.intersect, diagnostics)?;

    let planned = plan_control_points(aligned.dome_exit, &config, diagnostics);
    let resolved = resolve_control_points(
        &planned,
        dome,
        bowl,
        &aligned,
        &config.frame,
        tol,
        diagnostics,
    );

    for control_point in &resolved {
        for side in [&control_point.dome, &control_point.bowl] {
            offset_segments.push(Line3::new(side.point, side.point.add_vec(side.vector)));
        }
    }

    let sections = build_cross_sections(&resolved, diagnostics)?;
    *cross_sections = sections.clone();

    let used = sections_for_loft(&sections, tol, diagnostics);
    let params: Vec<f64> = resolved[..used]
        .iter()
        .map(|cp| cp.definition.param)
        .collect();
    let bowl_params: Vec<f64> = resolved[..used].iter().map(|cp| cp.bowl_param).collect();

    loft_belt(
        &aligned,
        &sections[..used],
        &params,
        &bowl_params,
        config.rebuild_tolerance,
        tol,
        diagnostics,
    )
}

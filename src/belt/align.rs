//! Rail alignment: reparameterizing both rails to a common [0, 1] domain
//! starting at their entry landmarks, and matching traversal direction.

use crate::geom::Vec3;

use super::diagnostics::{BeltDiagnostics, Stage};
use super::error::BeltError;
use super::intersect::{PlaneIntersectOptions, find_plane_crossings};
use super::rail::Rail;

/// Both rails on a shared normalized domain, entry at 0, with their exit
/// parameters located in that domain.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedRails {
    pub dome: Rail,
    pub bowl: Rail,
    pub dome_exit: f64,
    pub bowl_exit: f64,
    pub bowl_reversed: bool,
}

/// Align the dome and bowl rails.
///
/// Seam-shifting moves each rail's parameter origin to its entry crossing,
/// which invalidates previously found parameters, so both rails are
/// re-intersected afterwards to locate their exits. Reversing the bowl
/// rail invalidates its exit a second time, hence the third intersection
/// pass on that rail alone.
pub fn align_rails(
    dome_rail: &Rail,
    bowl_rail: &Rail,
    options: &PlaneIntersectOptions,
    diagnostics: &mut BeltDiagnostics,
) -> Result<AlignedRails, BeltError> {
    let dome_crossings = find_plane_crossings(dome_rail, "dome", options, diagnostics)?;
    let bowl_crossings = find_plane_crossings(bowl_rail, "bowl", options, diagnostics)?;

    diagnostics.info(
        Stage::Align,
        format!(
            "entry params: dome = {:.4}, bowl = {:.4}",
            dome_crossings.entry.param, bowl_crossings.entry.param
        ),
    );

    let dome = dome_rail.with_seam_at(dome_crossings.entry.param);
    let mut bowl = bowl_rail.with_seam_at(bowl_crossings.entry.param);

    let dome_exit = find_plane_crossings(&dome, "dome", options, diagnostics)?
        .exit
        .param;
    let mut bowl_exit = find_plane_crossings(&bowl, "bowl", options, diagnostics)?
        .exit
        .param;

    diagnostics.info(
        Stage::Align,
        format!("exit params after seam shift: dome = {dome_exit:.4}, bowl = {bowl_exit:.4}"),
    );

    // Compare traversal sense by the start tangents projected to the XY
    // plane (looking down the design axis).
    let dome_tangent = dome
        .tangent_at(0.0)
        .map_or(Vec3::ZERO, |t| t.to_xy().normalized().unwrap_or(Vec3::ZERO));
    let bowl_tangent = bowl
        .tangent_at(0.0)
        .map_or(Vec3::ZERO, |t| t.to_xy().normalized().unwrap_or(Vec3::ZERO));

    let bowl_reversed = dome_tangent.dot(bowl_tangent) < 0.0;
    if bowl_reversed {
        // Reversal changes where the curve crosses the reference plane, so
        // the bowl exit must be located a third time. If reversal were ever
        // to swap which physical landmark is entry versus exit, this pass
        // would keep the previously chosen entry seam; that behavior is
        // inherited from the original design.
        bowl = bowl.reversed();
        bowl_exit = find_plane_crossings(&bowl, "bowl", options, diagnostics)?
            .exit
            .param;
        diagnostics.info(
            Stage::Align,
            format!(
                "bowl rail reversed to match dome direction, exit param now {bowl_exit:.4}"
            ),
        );
    } else {
        diagnostics.info(Stage::Align, "rails already travel in the same direction");
    }

    Ok(AlignedRails {
        dome,
        bowl,
        dome_exit,
        bowl_exit,
        bowl_reversed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Point3;

    fn circle_rail(z: f64) -> Rail {
        let mut points = Vec::new();
        for i in 0..96 {
            let angle = std::f64::consts::TAU * f64::from(i) / 96.0;
            points.push(Point3::new(angle.cos(), angle.sin(), z));
        }
        Rail::new(points, true).unwrap()
    }

    #[test]
    fn test_aligned_rails_start_at_entry() {
        let mut diag = BeltDiagnostics::new();
        let aligned = align_rails(
            &circle_rail(0.5),
            &circle_rail(-0.5),
            &PlaneIntersectOptions::default(),
            &mut diag,
        )
        .unwrap();

        // Both rails now start at the entry landmark (x ~ 0, most +Y).
        for rail in [&aligned.dome, &aligned.bowl] {
            let start = rail.point_at(0.0);
            assert!(start.x.abs() < 1e-9);
            assert!((start.y - 1.0).abs() < 1e-9);
        }
        assert!(!aligned.bowl_reversed);
        assert!((aligned.dome_exit - 0.5).abs() < 1e-6);
        assert!((aligned.bowl_exit - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_opposite_traversal_gets_reversed() {
        let mut diag = BeltDiagnostics::new();
        let bowl = circle_rail(-0.5).reversed();
        let aligned = align_rails(
            &circle_rail(0.5),
            &bowl,
            &PlaneIntersectOptions::default(),
            &mut diag,
        )
        .unwrap();

        assert!(aligned.bowl_reversed);
        // Post-fix invariant: projected start tangents agree in direction.
        let dome_tangent = aligned.dome.tangent_at(0.0).unwrap().to_xy();
        let bowl_tangent = aligned.bowl.tangent_at(0.0).unwrap().to_xy();
        assert!(dome_tangent.dot(bowl_tangent) > 0.0);
        assert!((aligned.bowl_exit - 0.5).abs() < 1e-6);
    }
}

//! Surface lofting: feeding the aligned rails and ordered cross-sections
//! to the two-rail periodic loft, with the optional density rebuild.

use crate::geom::{CubicBezier3, LoftedSurface, Tolerance, TwoRailLoftOptions, loft_two_rails};

use super::align::AlignedRails;
use super::diagnostics::{BeltDiagnostics, Stage};
use super::error::BeltError;

/// Loft the cross-sections across the two rails into the belt surface.
///
/// `params` are the dome-rail stations of the sections, `bowl_params` the
/// matching bowl-rail stations (which differ wherever the bowl side was
/// resolved by closest point). Both slices must already exclude a trimmed
/// closure section.
///
/// When `rebuild_tolerance` is present and positive, the surface is
/// rebuilt at 1.5x control density in both directions; a failed rebuild
/// keeps the original surface and is reported as a warning.
pub fn loft_belt(
    aligned: &AlignedRails,
    sections: &[CubicBezier3],
    params: &[f64],
    bowl_params: &[f64],
    rebuild_tolerance: Option<f64>,
    tol: Tolerance,
    diagnostics: &mut BeltDiagnostics,
) -> Result<LoftedSurface, BeltError> {
    let options = TwoRailLoftOptions {
        closed: true,
        rail_b_params: Some(bowl_params.to_vec()),
        ..TwoRailLoftOptions::default()
    };

    let surface = loft_two_rails(
        aligned.dome.curve(),
        aligned.bowl.curve(),
        sections,
        params,
        &options,
        tol,
    )
    .map_err(|source| BeltError::Loft {
        source,
        dome_rail_closed: aligned.dome.is_closed(),
        bowl_rail_closed: aligned.bowl.is_closed(),
        first_section_valid: sections.first().is_some_and(CubicBezier3::is_valid),
        last_section_valid: sections.last().is_some_and(CubicBezier3::is_valid),
    })?;

    diagnostics.info(
        Stage::Loft,
        format!(
            "surface created, {}x{} control grid, valid = {}",
            surface.control_count_u(),
            surface.control_count_v(),
            surface.is_valid()
        ),
    );

    let Some(rebuild) = rebuild_tolerance.filter(|rt| *rt > 0.0) else {
        return Ok(surface);
    };

    let count_u = surface.control_count_u() * 3 / 2;
    let count_v = surface.control_count_v() * 3 / 2;
    match surface.rebuilt(count_u, count_v) {
        Some(rebuilt) => {
            diagnostics.info(
                Stage::Loft,
                format!(
                    "surface rebuilt to {}x{} (tolerance {rebuild})",
                    rebuilt.control_count_u(),
                    rebuilt.control_count_v()
                ),
            );
            Ok(rebuilt)
        }
        None => {
            diagnostics.warn(Stage::Loft, "surface rebuild failed, keeping original");
            Ok(surface)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::belt::align::align_rails;
    use crate::belt::diagnostics::BeltDiagnostics;
    use crate::belt::intersect::PlaneIntersectOptions;
    use crate::belt::rail::Rail;
    use crate::geom::{LoftError, Point3, Surface};

    fn circle_rail(z: f64) -> Rail {
        let mut points = Vec::new();
        for i in 0..96 {
            let angle = std::f64::consts::TAU * f64::from(i) / 96.0;
            points.push(Point3::new(angle.cos(), angle.sin(), z));
        }
        Rail::new(points, true).unwrap()
    }

    fn aligned_circles() -> AlignedRails {
        let mut diag = BeltDiagnostics::new();
        align_rails(
            &circle_rail(0.5),
            &circle_rail(-0.5),
            &PlaneIntersectOptions::default(),
            &mut diag,
        )
        .unwrap()
    }

    fn vertical_sections(aligned: &AlignedRails, params: &[f64]) -> Vec<CubicBezier3> {
        params
            .iter()
            .map(|&t| {
                let top = aligned.dome.point_at(t);
                let bottom = aligned.bowl.point_at(t);
                CubicBezier3::new(top, top.lerp(bottom, 0.25), top.lerp(bottom, 0.75), bottom)
            })
            .collect()
    }

    #[test]
    fn test_loft_belt_produces_periodic_surface() {
        let aligned = aligned_circles();
        let params = [0.0, 0.25, 0.5, 0.75];
        let sections = vertical_sections(&aligned, &params);
        let mut diag = BeltDiagnostics::new();

        let surface = loft_belt(
            &aligned,
            &sections,
            &params,
            &params,
            None,
            Tolerance::new(1e-3),
            &mut diag,
        )
        .unwrap();

        assert!(surface.is_valid());
        assert!(surface.is_u_periodic());
        assert_eq!(diag.warning_count(), 0);
    }

    #[test]
    fn test_rebuild_densifies_the_grid() {
        let aligned = aligned_circles();
        let params = [0.0, 0.25, 0.5, 0.75];
        let sections = vertical_sections(&aligned, &params);
        let mut diag = BeltDiagnostics::new();

        let plain = loft_belt(
            &aligned,
            &sections,
            &params,
            &params,
            None,
            Tolerance::new(1e-3),
            &mut diag,
        )
        .unwrap();
        let rebuilt = loft_belt(
            &aligned,
            &sections,
            &params,
            &params,
            Some(0.01),
            Tolerance::new(1e-3),
            &mut diag,
        )
        .unwrap();

        assert!(rebuilt.control_count_u() > plain.control_count_u());
        assert!(rebuilt.control_count_v() > plain.control_count_v());
    }

    #[test]
    fn test_open_bowl_rail_fails_with_flags() {
        let aligned = aligned_circles();
        let open_bowl = Rail::new(
            vec![Point3::new(1.0, 0.0, -0.5), Point3::new(-1.0, 0.0, -0.5)],
            false,
        )
        .unwrap();
        let broken = AlignedRails {
            bowl: open_bowl,
            ..aligned
        };

        let params = [0.0, 0.5];
        let sections = vertical_sections(&broken, &params);
        let mut diag = BeltDiagnostics::new();

        let err = loft_belt(
            &broken,
            &sections,
            &params,
            &params,
            None,
            Tolerance::new(1e-3),
            &mut diag,
        )
        .unwrap_err();

        match err {
            BeltError::Loft {
                source,
                dome_rail_closed,
                bowl_rail_closed,
                first_section_valid,
                last_section_valid,
            } => {
                assert!(matches!(source, LoftError::OpenRail { which: "second" }));
                assert!(dome_rail_closed);
                assert!(!bowl_rail_closed);
                assert!(first_section_valid);
                assert!(last_section_valid);
            }
            other => panic!("expected loft error, got {other:?}"),
        }
    }

    #[test]
    fn test_edges_follow_rails() {
        let aligned = aligned_circles();
        let params = [0.0, 0.25, 0.5, 0.75];
        let sections = vertical_sections(&aligned, &params);
        let mut diag = BeltDiagnostics::new();

        let surface = loft_belt(
            &aligned,
            &sections,
            &params,
            &params,
            None,
            Tolerance::new(1e-3),
            &mut diag,
        )
        .unwrap();

        // u values on loft stations, where the rail correction is exact
        for &u in &[0.09375, 0.3125, 0.625, 0.90625] {
            let top = surface.point_at(u, 0.0);
            let expected = aligned.dome.point_at(u);
            assert!(top.sub_point(expected).length() < 1e-9);
        }
    }
}

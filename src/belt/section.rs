//! Cross-section construction: one cubic Bezier per resolved control
//! point, spanning from the dome rail to the bowl rail.

use crate::geom::{CubicBezier3, Tolerance};

use super::diagnostics::{BeltDiagnostics, Stage};
use super::error::BeltError;
use super::frame::ResolvedControlPoint;

/// Build the ordered cross-section list.
///
/// Control polygon per section: dome point, dome point + dome vector,
/// bowl point + bowl vector, bowl point. Any invalid curve is fatal for
/// the run; all sections must be valid before lofting.
pub fn build_cross_sections(
    resolved: &[ResolvedControlPoint],
    diagnostics: &mut BeltDiagnostics,
) -> Result<Vec<CubicBezier3>, BeltError> {
    let mut sections = Vec::with_capacity(resolved.len());

    for control_point in resolved {
        let dome = control_point.dome;
        let bowl = control_point.bowl;
        let bezier = CubicBezier3::new(
            dome.point,
            dome.point.add_vec(dome.vector),
            bowl.point.add_vec(bowl.vector),
            bowl.point,
        );

        if !bezier.is_valid() {
            return Err(BeltError::InvalidCrossSection {
                label: control_point.definition.label.clone(),
            });
        }
        sections.push(bezier);
    }

    diagnostics.info(
        Stage::Section,
        format!("{} cross-section curves", sections.len()),
    );

    Ok(sections)
}

/// Number of leading sections to hand to the loft.
///
/// When the first and last sections start at the same location (a closure
/// section duplicating entry), the last one is dropped; the periodic loft
/// closes the loop itself.
#[must_use]
pub fn sections_for_loft(
    sections: &[CubicBezier3],
    tol: Tolerance,
    diagnostics: &mut BeltDiagnostics,
) -> usize {
    if sections.len() > 1 {
        let first = sections[0].start();
        let last = sections[sections.len() - 1].start();
        if first.distance_to(last) < tol.eps * 10.0 {
            diagnostics.info(
                Stage::Section,
                format!(
                    "duplicate closure section dropped, {} sections used for loft",
                    sections.len() - 1
                ),
            );
            return sections.len() - 1;
        }
    }
    diagnostics.info(
        Stage::Section,
        format!("{} sections used for loft", sections.len()),
    );
    sections.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::belt::frame::PointVector;
    use crate::belt::plan::{ControlPointDefinition, Landmark, PointRole};
    use crate::belt::config::SideProfile;
    use crate::geom::{Point3, Vec3};

    fn resolved(label: &str, param: f64, top: Point3, bottom: Point3) -> ResolvedControlPoint {
        ResolvedControlPoint {
            definition: ControlPointDefinition {
                label: label.to_string(),
                role: PointRole::Landmark(Landmark::Entry),
                param,
                dome: SideProfile::default(),
                bowl: SideProfile::default(),
            },
            dome: PointVector {
                point: top,
                vector: Vec3::new(0.0, 0.0, -0.25),
            },
            bowl: PointVector {
                point: bottom,
                vector: Vec3::new(0.0, 0.0, 0.25),
            },
            bowl_param: param,
        }
    }

    #[test]
    fn test_sections_span_dome_to_bowl() {
        let top = Point3::new(0.0, 1.0, 0.5);
        let bottom = Point3::new(0.0, 1.0, -0.5);
        let mut diag = BeltDiagnostics::new();
        let sections =
            build_cross_sections(&[resolved("entry", 0.0, top, bottom)], &mut diag).unwrap();

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].start(), top);
        assert_eq!(sections[0].end(), bottom);
        assert_eq!(sections[0].p1, Point3::new(0.0, 1.0, 0.25));
        assert_eq!(sections[0].p2, Point3::new(0.0, 1.0, -0.25));
    }

    #[test]
    fn test_invalid_section_is_fatal() {
        let top = Point3::new(0.0, f64::NAN, 0.5);
        let bottom = Point3::new(0.0, 1.0, -0.5);
        let mut diag = BeltDiagnostics::new();
        let err = build_cross_sections(&[resolved("A", 0.2, top, bottom)], &mut diag).unwrap_err();
        assert!(matches!(err, BeltError::InvalidCrossSection { label } if label == "A"));
    }

    #[test]
    fn test_duplicate_closure_is_trimmed() {
        let top = Point3::new(0.0, 1.0, 0.5);
        let bottom = Point3::new(0.0, 1.0, -0.5);
        let other_top = Point3::new(0.0, -1.0, 0.5);
        let other_bottom = Point3::new(0.0, -1.0, -0.5);

        let mut diag = BeltDiagnostics::new();
        let sections = build_cross_sections(
            &[
                resolved("entry", 0.0, top, bottom),
                resolved("exit", 0.5, other_top, other_bottom),
                resolved("closure", 1.0, top, bottom),
            ],
            &mut diag,
        )
        .unwrap();

        let tol = Tolerance::new(1e-3);
        assert_eq!(sections_for_loft(&sections, tol, &mut diag), 2);

        // distinct first/last starts keep the full list
        let mut diag = BeltDiagnostics::new();
        assert_eq!(sections_for_loft(&sections[..2], tol, &mut diag), 2);
    }
}

//! Frame-vector computation: for every control point, resolve the 3D
//! location on each rail and derive the rotated, scaled offset vector
//! from the local surface frame.

use serde::Serialize;

use crate::geom::{FaceRelation, Point3, Tolerance, TrimmedSurface, Vec3};

use super::align::AlignedRails;
use super::diagnostics::{BeltDiagnostics, Stage};
use super::plan::{ControlPointDefinition, Landmark, PointRole};
use super::rail::Rail;

/// Tuning for the outward-frame computation.
///
/// Heuristic defaults carried over from the original design; treat them
/// as configuration, not invariants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameOptions {
    /// Scale applied to the dome-bowl distance when substituting the
    /// vertical fallback vector for a failed perpendicular.
    pub vertical_fallback_scale: f64,
    /// Containment probe distances, as multiples of the working tolerance.
    pub probe_multipliers: [f64; 3],
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            vertical_fallback_scale: 0.3,
            probe_multipliers: [10.0, 50.0, 100.0],
        }
    }
}

/// A resolved location and its offset vector on one side of the belt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointVector {
    pub point: Point3,
    pub vector: Vec3,
}

/// A control point with both sides resolved. Constructed whole; the
/// definition it was built from rides along for labeling and ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedControlPoint {
    pub definition: ControlPointDefinition,
    pub dome: PointVector,
    pub bowl: PointVector,
    /// Parameter on the bowl rail where the bowl-side point was resolved.
    pub bowl_param: f64,
}

/// The outward vector at `t` on a rail: tangent to the surface,
/// perpendicular to the rail, pointing off the trimmed face.
///
/// Direction is disambiguated by classifying containment probes at
/// increasing distances along the candidate (majority vote), with the
/// projected direction toward the surface's bounding-box center breaking
/// ties. The vote establishes the inward sense; the final reversal yields
/// the outward convention used by the belt.
#[must_use]
pub fn outward_perpendicular(
    surface: &dyn TrimmedSurface,
    rail: &Rail,
    t: f64,
    options: &FrameOptions,
    tol: Tolerance,
) -> Option<Vec3> {
    let point = rail.point_at(t);
    let tangent = rail.tangent_at(t)?;

    let (u, v) = surface.closest_point(point)?;
    let normal = surface.normal_at(u, v)?;

    let mut perp = normal.cross(tangent).normalized()?;

    let mut interior = 0usize;
    let mut exterior = 0usize;
    for multiplier in options.probe_multipliers {
        let probe = point.add_vec(perp.mul_scalar(tol.eps * multiplier));
        if let Some((pu, pv)) = surface.closest_point(probe) {
            match surface.classify_uv(pu, pv) {
                FaceRelation::Interior => interior += 1,
                FaceRelation::Exterior => exterior += 1,
                FaceRelation::Boundary => {}
            }
        }
    }

    let to_center = surface.bounding_box().center().sub_point(point);
    let center_alignment = to_center
        .project_onto_plane(normal)
        .normalized()
        .map_or(0.0, |dir| perp.dot(dir));

    if exterior > interior {
        perp = perp.neg();
    } else if exterior == interior && center_alignment < 0.0 {
        perp = perp.neg();
    }

    // perp now points onto the face; the belt extends the other way.
    Some(perp.neg())
}

fn side_vector(
    surface: &dyn TrimmedSurface,
    rail: &Rail,
    t: f64,
    angle_deg: f64,
    magnitude: f64,
    distance: f64,
    fallback: Vec3,
    label: &str,
    side: &'static str,
    options: &FrameOptions,
    tol: Tolerance,
    diagnostics: &mut BeltDiagnostics,
) -> Vec3 {
    let Some(perp) = outward_perpendicular(surface, rail, t, options, tol) else {
        diagnostics.warn(
            Stage::Frame,
            format!("could not compute {side} vector for '{label}', vertical fallback used"),
        );
        return fallback.mul_scalar(distance * options.vertical_fallback_scale);
    };

    // The rail acts as the axle: the outward vector rotates around the
    // local tangent by the side's angle.
    let rotated = rail
        .tangent_at(t)
        .and_then(|axis| perp.rotated_about(axis, angle_deg.to_radians()))
        .and_then(Vec3::normalized)
        .unwrap_or(perp);

    rotated.mul_scalar(magnitude * distance)
}

/// Resolve every planned control point into per-side points and offset
/// vectors.
///
/// The dome side always resolves by parameter on the dome rail. The bowl
/// side dispatches on the point's role: landmarks use the bowl rail's own
/// crossing parameters, everything else follows the closest point on the
/// bowl rail to the resolved dome point.
#[must_use]
pub fn resolve_control_points(
    definitions: &[ControlPointDefinition],
    dome_surface: &dyn TrimmedSurface,
    bowl_surface: &dyn TrimmedSurface,
    aligned: &AlignedRails,
    options: &FrameOptions,
    tol: Tolerance,
    diagnostics: &mut BeltDiagnostics,
) -> Vec<ResolvedControlPoint> {
    let mut resolved = Vec::with_capacity(definitions.len());

    for definition in definitions {
        let dome_point = aligned.dome.point_at(definition.param);

        let bowl_param = match definition.role {
            PointRole::Landmark(Landmark::Entry) => 0.0,
            PointRole::Landmark(Landmark::Exit) => aligned.bowl_exit,
            PointRole::Landmark(Landmark::Closure) => 1.0,
            PointRole::Interpolated => aligned.bowl.closest_param(dome_point),
        };
        let bowl_point = aligned.bowl.point_at(bowl_param);

        let mut distance = dome_point.distance_to(bowl_point);
        if distance < tol.eps {
            diagnostics.warn(
                Stage::Frame,
                format!("zero dome-bowl distance at '{}'", definition.label),
            );
            distance = 1.0;
        }

        let dome_vector = side_vector(
            dome_surface,
            &aligned.dome,
            definition.param,
            definition.dome.angle_deg,
            definition.dome.magnitude,
            distance,
            Vec3::Z,
            &definition.label,
            "dome",
            options,
            tol,
            diagnostics,
        );
        let bowl_vector = side_vector(
            bowl_surface,
            &aligned.bowl,
            bowl_param,
            definition.bowl.angle_deg,
            definition.bowl.magnitude,
            distance,
            Vec3::Z.neg(),
            &definition.label,
            "bowl",
            options,
            tol,
            diagnostics,
        );

        resolved.push(ResolvedControlPoint {
            definition: definition.clone(),
            dome: PointVector {
                point: dome_point,
                vector: dome_vector,
            },
            bowl: PointVector {
                point: bowl_point,
                vector: bowl_vector,
            },
            bowl_param,
        });
    }

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::belt::align::align_rails;
    use crate::belt::config::{BeltConfig, SideProfile};
    use crate::belt::intersect::PlaneIntersectOptions;
    use crate::belt::plan::plan_control_points;
    use crate::belt::rail::extract_rail;
    use crate::geom::{CapOrientation, SphericalCapSurface};

    fn dome() -> SphericalCapSurface {
        SphericalCapSurface::new(Point3::new(0.0, 0.0, 0.5), 1.0, 0.0, CapOrientation::Up)
            .unwrap()
    }

    fn bowl() -> SphericalCapSurface {
        SphericalCapSurface::new(Point3::new(0.0, 0.0, -0.5), 1.0, 0.0, CapOrientation::Down)
            .unwrap()
    }

    fn aligned_mirror_rails(diag: &mut BeltDiagnostics) -> AlignedRails {
        let dome_rail = extract_rail(&dome(), "dome", diag).unwrap();
        let bowl_rail = extract_rail(&bowl(), "bowl", diag).unwrap();
        align_rails(
            &dome_rail,
            &bowl_rail,
            &PlaneIntersectOptions::default(),
            diag,
        )
        .unwrap()
    }

    #[test]
    fn test_outward_vector_points_off_the_dome() {
        let surface = dome();
        let mut diag = BeltDiagnostics::new();
        let aligned = aligned_mirror_rails(&mut diag);

        let tol = Tolerance::new(1e-3);
        let perp = outward_perpendicular(
            &surface,
            &aligned.dome,
            0.125,
            &FrameOptions::default(),
            tol,
        )
        .expect("perpendicular should resolve");

        // The dome occupies the upper hemisphere; off the face is downward.
        assert!(perp.z < -0.9);
    }

    #[test]
    fn test_mirror_scenario_vectors_are_vertical_at_entry() {
        let dome_surface = dome();
        let bowl_surface = bowl();
        let mut diag = BeltDiagnostics::new();
        let aligned = aligned_mirror_rails(&mut diag);

        let config = BeltConfig {
            include_a: false,
            include_b: false,
            intermediate_sections: 0,
            ..BeltConfig::default()
        };
        let points = plan_control_points(aligned.dome_exit, &config, &mut diag);
        let tol = Tolerance::new(1e-3);
        let resolved = resolve_control_points(
            &points,
            &dome_surface,
            &bowl_surface,
            &aligned,
            &FrameOptions::default(),
            tol,
            &mut diag,
        );

        assert_eq!(resolved.len(), points.len());
        let entry = &resolved[0];
        assert!((entry.dome.point.y - 1.0).abs() < 1e-6);
        // zero angle, magnitude 0.5, distance 1.0: half-unit vertical offsets
        assert!(entry.dome.vector.x.abs() < 1e-6);
        assert!(entry.dome.vector.y.abs() < 1e-6);
        assert!((entry.dome.vector.z + 0.5).abs() < 1e-6);
        assert!((entry.bowl.vector.z - 0.5).abs() < 1e-6);
        assert_eq!(diag.warning_count(), 0);
    }

    #[test]
    fn test_rotation_tilts_the_offset_vector() {
        let dome_surface = dome();
        let bowl_surface = bowl();
        let mut diag = BeltDiagnostics::new();
        let aligned = aligned_mirror_rails(&mut diag);

        let angled = SideProfile {
            angle_deg: 90.0,
            magnitude: 0.5,
        };
        let config = BeltConfig {
            include_a: false,
            include_b: false,
            intermediate_sections: 0,
            entry: crate::belt::config::PointProfile {
                dome: angled,
                bowl: SideProfile::default(),
            },
            ..BeltConfig::default()
        };
        let points = plan_control_points(aligned.dome_exit, &config, &mut diag);
        let tol = Tolerance::new(1e-3);
        let resolved = resolve_control_points(
            &points,
            &dome_surface,
            &bowl_surface,
            &aligned,
            &FrameOptions::default(),
            tol,
            &mut diag,
        );

        // A quarter-turn around the rail tangent moves the dome vector from
        // vertical into the horizontal plane.
        let entry = &resolved[0];
        assert!(entry.dome.vector.z.abs() < 1e-6);
        assert!((entry.dome.vector.length() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_zero_distance_substitutes_unit_span() {
        // Same cap for both sides: rails coincide, distance collapses.
        let surface = dome();
        let mut diag = BeltDiagnostics::new();
        let rail = extract_rail(&surface, "dome", &mut diag).unwrap();
        let aligned = align_rails(
            &rail,
            &rail.clone(),
            &PlaneIntersectOptions::default(),
            &mut diag,
        )
        .unwrap();

        let config = BeltConfig {
            include_a: false,
            include_b: false,
            intermediate_sections: 0,
            ..BeltConfig::default()
        };
        let points = plan_control_points(aligned.dome_exit, &config, &mut diag);
        let tol = Tolerance::new(1e-3);
        let resolved = resolve_control_points(
            &points,
            &surface,
            &surface,
            &aligned,
            &FrameOptions::default(),
            tol,
            &mut diag,
        );

        assert!(diag.has_warnings());
        // substituted distance 1.0 with magnitude 0.5 gives half-unit vectors
        assert!((resolved[0].dome.vector.length() - 0.5).abs() < 1e-6);
    }
}

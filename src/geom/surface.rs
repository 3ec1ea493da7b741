use std::f64::consts::{FRAC_PI_2, TAU};

use super::core::{BBox, Point3, Tolerance, Vec3};

/// Classification of a UV location against a trimmed face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceRelation {
    Interior,
    Exterior,
    Boundary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimLoopKind {
    Outer,
    Inner,
}

/// A trim loop projected to 3D, as a closed point sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct TrimLoop3 {
    pub points: Vec<Point3>,
    pub kind: TrimLoopKind,
}

impl TrimLoop3 {
    /// Total arc length of the loop, including the closing segment.
    #[must_use]
    pub fn length(&self) -> f64 {
        if self.points.len() < 2 {
            return 0.0;
        }
        let mut total = 0.0;
        for window in self.points.windows(2) {
            total += window[1].sub_point(window[0]).length();
        }
        total
            + self
                .points
                .last()
                .copied()
                .zip(self.points.first().copied())
                .map(|(last, first)| first.sub_point(last).length())
                .unwrap_or(0.0)
    }
}

pub trait Surface {
    fn point_at(&self, u: f64, v: f64) -> Point3;

    #[must_use]
    fn domain_u(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    #[must_use]
    fn domain_v(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    #[must_use]
    fn is_u_closed(&self) -> bool {
        false
    }

    #[must_use]
    fn partial_derivatives_at(&self, u: f64, v: f64) -> (Vec3, Vec3) {
        let (u0, u1) = self.domain_u();
        let (v0, v1) = self.domain_v();
        let u_span = u1 - u0;
        let v_span = v1 - v0;

        let mut du = Vec3::ZERO;
        let mut dv = Vec3::ZERO;

        if u_span.is_finite() && u_span != 0.0 {
            let h = Tolerance::DERIVATIVE.relative_to(u_span);
            let (ua, ub) = if self.is_u_closed() {
                (u - h, u + h)
            } else {
                ((u - h).max(u0), (u + h).min(u1))
            };
            if ua != ub {
                let pa = self.point_at(ua, v);
                let pb = self.point_at(ub, v);
                du = pb.sub_point(pa).mul_scalar(1.0 / (ub - ua));
            }
        }

        if v_span.is_finite() && v_span != 0.0 {
            let h = Tolerance::DERIVATIVE.relative_to(v_span);
            let va = (v - h).max(v0);
            let vb = (v + h).min(v1);
            if va != vb {
                let pa = self.point_at(u, va);
                let pb = self.point_at(u, vb);
                dv = pb.sub_point(pa).mul_scalar(1.0 / (vb - va));
            }
        }

        (du, dv)
    }

    /// Unit surface normal at (u, v), or `None` where the partials are
    /// degenerate (poles, collapsed edges).
    #[must_use]
    fn normal_at(&self, u: f64, v: f64) -> Option<Vec3> {
        let (du, dv) = self.partial_derivatives_at(u, v);
        du.cross(dv).normalized()
    }

    /// Axis-aligned bounding box, sampled over the UV domain.
    #[must_use]
    fn bounding_box(&self) -> BBox {
        let (u0, u1) = self.domain_u();
        let (v0, v1) = self.domain_v();
        let steps = 16;
        let mut points = Vec::with_capacity((steps + 1) * (steps + 1));
        for i in 0..=steps {
            let u = u0 + (u1 - u0) * i as f64 / steps as f64;
            for j in 0..=steps {
                let v = v0 + (v1 - v0) * j as f64 / steps as f64;
                points.push(self.point_at(u, v));
            }
        }
        BBox::from_points(&points).unwrap_or(BBox::new(Point3::ORIGIN, Point3::ORIGIN))
    }
}

/// A trimmed surface: the boundary-surface contract consumed by the belt
/// pipeline. Implementations expose their trim loops in 3D, classify UV
/// locations against the trimmed face, and answer closest-point queries.
pub trait TrimmedSurface: Surface {
    /// All trim loops of the face, projected to 3D.
    fn trim_loops(&self) -> Vec<TrimLoop3>;

    /// Classify a UV location against the trimmed face. Implementations may
    /// receive out-of-domain parameters from `closest_point` and should
    /// classify them as `Exterior`.
    fn classify_uv(&self, u: f64, v: f64) -> FaceRelation;

    /// UV parameters of the surface point closest to `p`.
    ///
    /// The default is a coarse grid search with iterative refinement;
    /// analytic surfaces should override it.
    #[must_use]
    fn closest_point(&self, p: Point3) -> Option<(f64, f64)> {
        let (u0, u1) = self.domain_u();
        let (v0, v1) = self.domain_v();

        let mut best = (u0, v0);
        let mut best_dist_sq = f64::INFINITY;
        let mut u_lo = u0;
        let mut u_hi = u1;
        let mut v_lo = v0;
        let mut v_hi = v1;

        let steps = 24;
        for _ in 0..4 {
            for i in 0..=steps {
                let u = u_lo + (u_hi - u_lo) * i as f64 / steps as f64;
                for j in 0..=steps {
                    let v = v_lo + (v_hi - v_lo) * j as f64 / steps as f64;
                    let dist_sq = p.sub_point(self.point_at(u, v)).length_squared();
                    if dist_sq < best_dist_sq {
                        best_dist_sq = dist_sq;
                        best = (u, v);
                    }
                }
            }
            let u_cell = (u_hi - u_lo) / steps as f64;
            let v_cell = (v_hi - v_lo) / steps as f64;
            u_lo = (best.0 - u_cell).max(u0);
            u_hi = (best.0 + u_cell).min(u1);
            v_lo = (best.1 - v_cell).max(v0);
            v_hi = (best.1 + v_cell).min(v1);
        }

        if best_dist_sq.is_finite() {
            Some(best)
        } else {
            None
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SphericalCapSurface
// ─────────────────────────────────────────────────────────────────────────────

/// Whether the cap bulges toward +Z (a dome) or -Z (a bowl).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapOrientation {
    Up,
    Down,
}

/// A spherical cap trimmed at a latitude: the portion of a sphere between
/// its rim circle (v = 0) and its pole (v = 1), optionally mirrored to
/// bulge downward.
///
/// The rim circle is the single outer trim loop. `closest_point` is
/// analytic and returns v < 0 for query points beyond the rim, which is
/// what makes interior/exterior containment probes reliable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalCapSurface {
    pub center: Point3,
    pub radius: f64,
    /// Rim latitude as a height above the sphere center, in (-radius, radius).
    pub rim_height: f64,
    pub orientation: CapOrientation,
    /// Number of points used to sample the rim trim loop.
    pub loop_samples: usize,
}

impl SphericalCapSurface {
    pub fn new(
        center: Point3,
        radius: f64,
        rim_height: f64,
        orientation: CapOrientation,
    ) -> Result<Self, String> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err("spherical cap radius must be finite and > 0".to_string());
        }
        if !rim_height.is_finite() || rim_height.abs() >= radius {
            return Err("spherical cap rim height must lie strictly inside the sphere".to_string());
        }

        Ok(Self {
            center,
            radius,
            rim_height,
            orientation,
            loop_samples: 96,
        })
    }

    fn phi_rim(&self) -> f64 {
        (self.rim_height / self.radius).asin()
    }

    fn signed_z(&self, z: f64) -> f64 {
        match self.orientation {
            CapOrientation::Up => z,
            CapOrientation::Down => -z,
        }
    }
}

impl Surface for SphericalCapSurface {
    fn point_at(&self, u: f64, v: f64) -> Point3 {
        let u = u.rem_euclid(1.0);
        let v = v.clamp(0.0, 1.0);

        let theta = TAU * u;
        let phi_rim = self.phi_rim();
        let phi = phi_rim + (FRAC_PI_2 - phi_rim) * v;

        let cos_phi = phi.cos();
        Point3::new(
            self.center.x + self.radius * cos_phi * theta.cos(),
            self.center.y + self.radius * cos_phi * theta.sin(),
            self.center.z + self.signed_z(self.radius * phi.sin()),
        )
    }

    fn is_u_closed(&self) -> bool {
        true
    }

    fn normal_at(&self, u: f64, v: f64) -> Option<Vec3> {
        // Radial sphere normal; oriented away from the surface's bulge side.
        self.point_at(u, v).sub_point(self.center).normalized()
    }

    fn bounding_box(&self) -> BBox {
        let phi_rim = self.phi_rim();
        let r_xy = if phi_rim <= 0.0 {
            self.radius
        } else {
            self.radius * phi_rim.cos()
        };
        let rim_z = self.signed_z(self.rim_height);
        let pole_z = self.signed_z(self.radius);
        BBox::new(
            Point3::new(
                self.center.x - r_xy,
                self.center.y - r_xy,
                self.center.z + rim_z.min(pole_z),
            ),
            Point3::new(
                self.center.x + r_xy,
                self.center.y + r_xy,
                self.center.z + rim_z.max(pole_z),
            ),
        )
    }
}

impl TrimmedSurface for SphericalCapSurface {
    fn trim_loops(&self) -> Vec<TrimLoop3> {
        let samples = self.loop_samples.max(8);
        let mut points = Vec::with_capacity(samples);
        for i in 0..samples {
            points.push(self.point_at(i as f64 / samples as f64, 0.0));
        }
        vec![TrimLoop3 {
            points,
            kind: TrimLoopKind::Outer,
        }]
    }

    fn classify_uv(&self, _u: f64, v: f64) -> FaceRelation {
        const BOUNDARY_BAND: f64 = 1e-9;
        if v < -BOUNDARY_BAND {
            FaceRelation::Exterior
        } else if v <= BOUNDARY_BAND {
            FaceRelation::Boundary
        } else {
            FaceRelation::Interior
        }
    }

    fn closest_point(&self, p: Point3) -> Option<(f64, f64)> {
        let d = p.sub_point(self.center);
        let dz = self.signed_z(d.z);
        let r_xy = (d.x * d.x + d.y * d.y).sqrt();

        if r_xy == 0.0 && dz == 0.0 {
            return None;
        }

        let u = if r_xy == 0.0 {
            0.0
        } else {
            d.y.atan2(d.x).rem_euclid(TAU) / TAU
        };

        let phi = dz.atan2(r_xy);
        let phi_rim = self.phi_rim();
        let span = FRAC_PI_2 - phi_rim;
        if span <= 0.0 {
            return None;
        }

        // Deliberately unclamped: v < 0 flags a point beyond the rim.
        Some((u, (phi - phi_rim) / span))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn dome() -> SphericalCapSurface {
        SphericalCapSurface::new(Point3::new(0.0, 0.0, 0.5), 1.0, 0.0, CapOrientation::Up)
            .unwrap()
    }

    fn bowl() -> SphericalCapSurface {
        SphericalCapSurface::new(Point3::new(0.0, 0.0, -0.5), 1.0, 0.0, CapOrientation::Down)
            .unwrap()
    }

    #[test]
    fn test_cap_rim_and_pole() {
        let cap = dome();
        let rim = cap.point_at(0.0, 0.0);
        assert!((rim.x - 1.0).abs() < 1e-12);
        assert!(rim.y.abs() < 1e-12);
        assert!((rim.z - 0.5).abs() < 1e-12);

        let pole = cap.point_at(0.3, 1.0);
        assert!(pole.x.abs() < 1e-12);
        assert!((pole.z - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_cap_mid_normal_orientation() {
        let up = dome().normal_at(0.5, 0.5).unwrap();
        assert!(up.z > 0.0);
        let down = bowl().normal_at(0.5, 0.5).unwrap();
        assert!(down.z < 0.0);
    }

    #[test]
    fn test_cap_trim_loop_is_outer_rim() {
        let cap = dome();
        let loops = cap.trim_loops();
        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].kind, TrimLoopKind::Outer);
        // rim circle of radius 1 at z = 0.5
        for p in &loops[0].points {
            assert!(((p.x * p.x + p.y * p.y).sqrt() - 1.0).abs() < 1e-12);
            assert!((p.z - 0.5).abs() < 1e-12);
        }
        // circumference of the sampled rim approximates 2*pi
        assert!((loops[0].length() - TAU).abs() < 0.02);
    }

    #[test]
    fn test_closest_point_classification() {
        let cap = dome();

        // A point above the cap interior projects inside the face.
        let (_, v) = cap.closest_point(Point3::new(0.3, 0.2, 2.0)).unwrap();
        assert!(matches!(cap.classify_uv(0.0, v), FaceRelation::Interior));

        // A point below the rim plane projects beyond the rim.
        let (_, v) = cap.closest_point(Point3::new(0.9, 0.0, 0.2)).unwrap();
        assert!(matches!(cap.classify_uv(0.0, v), FaceRelation::Exterior));
    }

    #[test]
    fn test_closest_point_roundtrip() {
        let cap = dome();
        let on_surface = cap.point_at(0.37, 0.42);
        let (u, v) = cap.closest_point(on_surface).unwrap();
        let reprojected = cap.point_at(u, v);
        assert!(on_surface.sub_point(reprojected).length() < 1e-9);
    }
}

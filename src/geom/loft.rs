//! Two-rail loft: sweeps an ordered family of cross-section curves along a
//! pair of guide rails into a single surface.
//!
//! The result is a dense sampled grid. Each output row is a blend of the
//! two bracketing sections, corrected so that the first column follows
//! rail A and the last column follows rail B exactly; at the section
//! parameters the correction vanishes and the surface interpolates the
//! sections themselves.

use super::core::{Point3, Tolerance};
use super::curve::Curve3;
use super::surface::Surface;

/// Options for the two-rail loft.
#[derive(Debug, Clone)]
pub struct TwoRailLoftOptions {
    /// Close the surface in the rail direction (periodic loft).
    pub closed: bool,
    /// Number of samples taken along each cross-section (columns).
    pub section_samples: usize,
    /// Number of output rows generated per section-to-section span.
    pub span_subdivisions: usize,
    /// Per-section parameters on rail B, when the B-side correspondence
    /// differs from rail A's parameterization. When absent, rail B is
    /// sampled at the section parameters directly.
    pub rail_b_params: Option<Vec<f64>>,
}

impl Default for TwoRailLoftOptions {
    fn default() -> Self {
        Self {
            closed: true,
            section_samples: 17,
            span_subdivisions: 8,
            rail_b_params: None,
        }
    }
}

/// Errors that can occur during a two-rail loft.
#[derive(Debug, thiserror::Error)]
pub enum LoftError {
    #[error("two-rail loft requires at least 2 sections, got {count}")]
    NotEnoughSections { count: usize },
    #[error("the {which} rail is not closed; a periodic loft requires closed rails")]
    OpenRail { which: &'static str },
    #[error("sections and parameters count mismatch: {sections} sections, {params} parameters")]
    SectionParameterCountMismatch { sections: usize, params: usize },
    #[error("section parameters must be strictly increasing within [0, 1]")]
    InvalidSectionParameters,
    #[error("section {index} contains non-finite points")]
    NonFiniteSection { index: usize },
    #[error("loft produced no usable surface")]
    EmptySurface,
}

// ─────────────────────────────────────────────────────────────────────────────
// LoftedSurface
// ─────────────────────────────────────────────────────────────────────────────

/// A lofted surface stored as a sampled point grid: one row per station
/// along the rails (u), one column per sample across the sections (v).
#[derive(Debug, Clone, PartialEq)]
pub struct LoftedSurface {
    rows: Vec<Vec<Point3>>,
    u_params: Vec<f64>,
    u_closed: bool,
}

impl LoftedSurface {
    pub fn new(rows: Vec<Vec<Point3>>, u_params: Vec<f64>, u_closed: bool) -> Result<Self, String> {
        if rows.len() != u_params.len() {
            return Err("lofted surface requires one parameter per row".to_string());
        }
        let min_rows = if u_closed { 3 } else { 2 };
        if rows.len() < min_rows {
            return Err(format!("lofted surface requires at least {min_rows} rows"));
        }
        let cols = rows[0].len();
        if cols < 2 {
            return Err("lofted surface requires at least 2 columns".to_string());
        }
        if rows.iter().any(|row| row.len() != cols) {
            return Err("lofted surface rows must have equal lengths".to_string());
        }
        if u_params.windows(2).any(|w| w[0] >= w[1]) {
            return Err("lofted surface row parameters must be increasing".to_string());
        }
        Ok(Self {
            rows,
            u_params,
            u_closed,
        })
    }

    #[must_use]
    pub fn control_count_u(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn control_count_v(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    #[must_use]
    pub const fn is_u_periodic(&self) -> bool {
        self.u_closed
    }

    /// A surface is usable when it has enough rows and columns and every
    /// grid point is finite.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let min_rows = if self.u_closed { 3 } else { 2 };
        self.rows.len() >= min_rows
            && self.control_count_v() >= 2
            && self.rows.iter().all(|row| row.iter().all(|p| p.is_finite()))
    }

    /// Resample the grid to the given counts. Returns `None` when the
    /// requested counts are degenerate or the resampled grid is not finite.
    #[must_use]
    pub fn rebuilt(&self, count_u: usize, count_v: usize) -> Option<Self> {
        let min_rows = if self.u_closed { 3 } else { 2 };
        if count_u < min_rows || count_v < 2 {
            return None;
        }

        let mut rows = Vec::with_capacity(count_u);
        let mut u_params = Vec::with_capacity(count_u);
        let u_denominator = if self.u_closed {
            count_u as f64
        } else {
            (count_u - 1) as f64
        };

        for i in 0..count_u {
            let u = i as f64 / u_denominator;
            let mut row = Vec::with_capacity(count_v);
            for j in 0..count_v {
                let v = j as f64 / (count_v - 1) as f64;
                let p = self.point_at(u, v);
                if !p.is_finite() {
                    return None;
                }
                row.push(p);
            }
            rows.push(row);
            u_params.push(u);
        }

        Self::new(rows, u_params, self.u_closed).ok()
    }

    /// Row interpolation for a wrapped/clamped `u`, returning the bracketing
    /// row indices and the local blend fraction.
    fn locate_u(&self, u: f64) -> (usize, usize, f64) {
        let n = self.rows.len();
        let first = self.u_params[0];
        let last = self.u_params[n - 1];

        if self.u_closed {
            let wrapped = first + (u - first).rem_euclid(1.0);
            if wrapped >= last {
                // wrap span from the last row back to the first
                let span = first + 1.0 - last;
                let f = if span > 0.0 { (wrapped - last) / span } else { 0.0 };
                return (n - 1, 0, f.clamp(0.0, 1.0));
            }
            let idx = match self
                .u_params
                .binary_search_by(|value| value.total_cmp(&wrapped))
            {
                Ok(i) => return (i, i, 0.0),
                Err(i) => i.max(1) - 1,
            };
            let span = self.u_params[idx + 1] - self.u_params[idx];
            let f = if span > 0.0 {
                (wrapped - self.u_params[idx]) / span
            } else {
                0.0
            };
            (idx, idx + 1, f.clamp(0.0, 1.0))
        } else {
            let clamped = u.clamp(first, last);
            let idx = match self
                .u_params
                .binary_search_by(|value| value.total_cmp(&clamped))
            {
                Ok(i) => return (i.min(n - 1), i.min(n - 1), 0.0),
                Err(i) => (i.max(1) - 1).min(n - 2),
            };
            let span = self.u_params[idx + 1] - self.u_params[idx];
            let f = if span > 0.0 {
                (clamped - self.u_params[idx]) / span
            } else {
                0.0
            };
            (idx, idx + 1, f.clamp(0.0, 1.0))
        }
    }
}

impl Surface for LoftedSurface {
    fn point_at(&self, u: f64, v: f64) -> Point3 {
        let (i0, i1, fu) = self.locate_u(u);

        let cols = self.control_count_v();
        let scaled = v.clamp(0.0, 1.0) * (cols - 1) as f64;
        let j0 = (scaled.floor() as usize).min(cols - 2);
        let fv = scaled - j0 as f64;

        let a = self.rows[i0][j0].lerp(self.rows[i0][j0 + 1], fv);
        let b = self.rows[i1][j0].lerp(self.rows[i1][j0 + 1], fv);
        a.lerp(b, fu)
    }

    fn is_u_closed(&self) -> bool {
        self.u_closed
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Two-rail loft
// ─────────────────────────────────────────────────────────────────────────────

/// Loft an ordered family of cross-sections along two rails.
///
/// # Arguments
/// * `rail_a` - First guide rail; the v = 0 edge of the surface follows it.
/// * `rail_b` - Second guide rail; the v = 1 edge follows it.
/// * `sections` - Cross-section curves, one per parameter.
/// * `params` - Station of each section on rail A's [0, 1] domain,
///   strictly increasing.
/// * `options` - Sampling densities, periodicity, rail B correspondence.
///
/// For a periodic loft the final span wraps from the last section back to
/// the first, and both rails must be closed.
pub fn loft_two_rails<RA, RB, S>(
    rail_a: &RA,
    rail_b: &RB,
    sections: &[S],
    params: &[f64],
    options: &TwoRailLoftOptions,
    _tol: Tolerance,
) -> Result<LoftedSurface, LoftError>
where
    RA: Curve3,
    RB: Curve3,
    S: Curve3,
{
    if sections.len() < 2 {
        return Err(LoftError::NotEnoughSections {
            count: sections.len(),
        });
    }
    if params.len() != sections.len() {
        return Err(LoftError::SectionParameterCountMismatch {
            sections: sections.len(),
            params: params.len(),
        });
    }
    if params
        .iter()
        .any(|t| !t.is_finite() || *t < 0.0 || *t > 1.0)
        || params.windows(2).any(|w| w[0] >= w[1])
    {
        return Err(LoftError::InvalidSectionParameters);
    }
    if let Some(ref b_params) = options.rail_b_params {
        if b_params.len() != sections.len() {
            return Err(LoftError::SectionParameterCountMismatch {
                sections: sections.len(),
                params: b_params.len(),
            });
        }
    }
    if options.closed {
        if !rail_a.is_closed() {
            return Err(LoftError::OpenRail { which: "first" });
        }
        if !rail_b.is_closed() {
            return Err(LoftError::OpenRail { which: "second" });
        }
    }

    let cols = options.section_samples.max(2);
    let mut section_rows = Vec::with_capacity(sections.len());
    for (index, section) in sections.iter().enumerate() {
        let mut row = Vec::with_capacity(cols);
        for j in 0..cols {
            let p = section.point_at(j as f64 / (cols - 1) as f64);
            if !p.is_finite() {
                return Err(LoftError::NonFiniteSection { index });
            }
            row.push(p);
        }
        section_rows.push(row);
    }

    let subdivisions = options.span_subdivisions.max(1);
    let span_count = if options.closed {
        sections.len()
    } else {
        sections.len() - 1
    };

    let mut rows = Vec::new();
    let mut u_params = Vec::new();

    for span in 0..span_count {
        let next = (span + 1) % sections.len();
        let t0 = params[span];
        let t1 = if next == 0 { params[0] + 1.0 } else { params[next] };
        let b0 = options
            .rail_b_params
            .as_ref()
            .map_or(t0, |b| b[span]);
        let b1 = options.rail_b_params.as_ref().map_or(t1, |b| {
            if next == 0 { b[0] + 1.0 } else { b[next] }
        });

        for k in 0..subdivisions {
            let f = k as f64 / subdivisions as f64;
            let t = t0 + (t1 - t0) * f;
            let b = b0 + (b1 - b0) * f;

            let a_pt = rail_a.point_at(t.rem_euclid(1.0).min(1.0));
            let b_pt = rail_b.point_at(b.rem_euclid(1.0).min(1.0));

            let from = &section_rows[span];
            let to = &section_rows[next];
            let a_shift = a_pt.sub_point(from[0].lerp(to[0], f));
            let b_shift = b_pt.sub_point(from[cols - 1].lerp(to[cols - 1], f));

            let mut row = Vec::with_capacity(cols);
            for j in 0..cols {
                let w = j as f64 / (cols - 1) as f64;
                let base = from[j].lerp(to[j], f);
                row.push(
                    base.add_vec(a_shift.mul_scalar(1.0 - w).add(b_shift.mul_scalar(w))),
                );
            }
            rows.push(row);
            u_params.push(t.rem_euclid(1.0).min(1.0));
        }
    }

    if !options.closed {
        rows.push(section_rows[sections.len() - 1].clone());
        u_params.push(params[sections.len() - 1]);
    }

    LoftedSurface::new(rows, u_params, options.closed).map_err(|_| LoftError::EmptySurface)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::curve::{CubicBezier3, Polyline3};

    fn circle(radius: f64, z: f64, segments: usize) -> Polyline3 {
        let mut points = Vec::with_capacity(segments);
        for i in 0..segments {
            let angle = std::f64::consts::TAU * i as f64 / segments as f64;
            points.push(Point3::new(radius * angle.cos(), radius * angle.sin(), z));
        }
        Polyline3::new(points, true).unwrap()
    }

    fn vertical_section(t: f64, top_z: f64, bottom_z: f64) -> CubicBezier3 {
        let angle = std::f64::consts::TAU * t;
        let (x, y) = (angle.cos(), angle.sin());
        CubicBezier3::new(
            Point3::new(x, y, top_z),
            Point3::new(x, y, top_z - 0.5),
            Point3::new(x, y, bottom_z + 0.5),
            Point3::new(x, y, bottom_z),
        )
    }

    #[test]
    fn test_periodic_loft_interpolates_sections() {
        let rail_a = circle(1.0, 1.0, 64);
        let rail_b = circle(1.0, -1.0, 64);
        let params = vec![0.0, 0.25, 0.5, 0.75];
        let sections: Vec<CubicBezier3> = params
            .iter()
            .map(|&t| vertical_section(t, 1.0, -1.0))
            .collect();

        let surface = loft_two_rails(
            &rail_a,
            &rail_b,
            &sections,
            &params,
            &TwoRailLoftOptions::default(),
            Tolerance::default_geom(),
        )
        .expect("loft should succeed");

        assert!(surface.is_valid());
        assert!(surface.is_u_periodic());

        // surface passes through each section's endpoints
        for (&t, section) in params.iter().zip(&sections) {
            let top = surface.point_at(t, 0.0);
            let bottom = surface.point_at(t, 1.0);
            assert!(top.sub_point(section.p0).length() < 1e-6);
            assert!(bottom.sub_point(section.p3).length() < 1e-6);
        }

        // edges follow the rails between stations
        let edge = surface.point_at(0.125, 0.0);
        let rail_pt = rail_a.point_at(0.125);
        assert!(edge.sub_point(rail_pt).length() < 1e-9);
    }

    #[test]
    fn test_open_rail_is_rejected() {
        let rail_a = circle(1.0, 1.0, 64);
        let open_rail = Polyline3::new(
            vec![
                Point3::new(1.0, 0.0, -1.0),
                Point3::new(-1.0, 0.0, -1.0),
            ],
            false,
        )
        .unwrap();
        let params = vec![0.0, 0.5];
        let sections: Vec<CubicBezier3> = params
            .iter()
            .map(|&t| vertical_section(t, 1.0, -1.0))
            .collect();

        let err = loft_two_rails(
            &rail_a,
            &open_rail,
            &sections,
            &params,
            &TwoRailLoftOptions::default(),
            Tolerance::default_geom(),
        )
        .unwrap_err();
        assert!(matches!(err, LoftError::OpenRail { which: "second" }));
    }

    #[test]
    fn test_unsorted_params_are_rejected() {
        let rail_a = circle(1.0, 1.0, 64);
        let rail_b = circle(1.0, -1.0, 64);
        let sections = vec![
            vertical_section(0.0, 1.0, -1.0),
            vertical_section(0.5, 1.0, -1.0),
        ];
        let err = loft_two_rails(
            &rail_a,
            &rail_b,
            &sections,
            &[0.5, 0.0],
            &TwoRailLoftOptions::default(),
            Tolerance::default_geom(),
        )
        .unwrap_err();
        assert!(matches!(err, LoftError::InvalidSectionParameters));
    }

    #[test]
    fn test_rebuild_increases_density() {
        let rail_a = circle(1.0, 1.0, 64);
        let rail_b = circle(1.0, -1.0, 64);
        let params = vec![0.0, 0.25, 0.5, 0.75];
        let sections: Vec<CubicBezier3> = params
            .iter()
            .map(|&t| vertical_section(t, 1.0, -1.0))
            .collect();
        let surface = loft_two_rails(
            &rail_a,
            &rail_b,
            &sections,
            &params,
            &TwoRailLoftOptions::default(),
            Tolerance::default_geom(),
        )
        .unwrap();

        let denser = surface
            .rebuilt(surface.control_count_u() * 3 / 2, surface.control_count_v() * 3 / 2)
            .expect("rebuild should succeed");
        assert!(denser.is_valid());
        assert!(denser.control_count_u() > surface.control_count_u());
        assert!(denser.control_count_v() > surface.control_count_v());

        // rebuild preserves the surface shape at a sample of locations
        for &(u, v) in &[(0.1, 0.3), (0.6, 0.7), (0.9, 0.1)] {
            let before = surface.point_at(u, v);
            let after = denser.point_at(u, v);
            assert!(before.sub_point(after).length() < 0.05);
        }
    }
}

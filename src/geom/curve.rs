use super::core::{Plane, Point3, Tolerance, Vec3};

pub trait Curve3 {
    fn point_at(&self, t: f64) -> Point3;

    #[must_use]
    fn domain(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    #[must_use]
    fn is_closed(&self) -> bool {
        false
    }

    #[must_use]
    fn derivative_at(&self, t: f64) -> Vec3 {
        let (a, b) = self.domain();
        let span = b - a;
        if !span.is_finite() || span == 0.0 {
            return Vec3::ZERO;
        }

        let h = Tolerance::DERIVATIVE.relative_to(span);
        if !h.is_finite() || h == 0.0 {
            return Vec3::ZERO;
        }

        let (t0, t1) = if self.is_closed() {
            (t - h, t + h)
        } else {
            ((t - h).max(a), (t + h).min(b))
        };
        if t1 == t0 {
            return Vec3::ZERO;
        }

        let p0 = self.point_at(t0);
        let p1 = self.point_at(t1);
        p1.sub_point(p0).mul_scalar(1.0 / (t1 - t0))
    }

    #[must_use]
    fn second_derivative_at(&self, t: f64) -> Vec3 {
        let (a, b) = self.domain();
        let span = b - a;
        if !span.is_finite() || span == 0.0 {
            return Vec3::ZERO;
        }

        // second differences need more separation than first derivatives
        let h = (Tolerance::DERIVATIVE.eps * 100.0) * span.abs();
        if !h.is_finite() || h == 0.0 {
            return Vec3::ZERO;
        }

        let (t0, t2) = if self.is_closed() {
            (t - h, t + h)
        } else {
            ((t - h).max(a), (t + h).min(b))
        };
        if t2 == t0 {
            return Vec3::ZERO;
        }
        let tm = 0.5 * (t0 + t2);
        let dt = tm - t0;
        if dt == 0.0 {
            return Vec3::ZERO;
        }

        let p0 = self.point_at(t0);
        let p1 = self.point_at(tm);
        let p2 = self.point_at(t2);
        p0.sub_point(p1)
            .add(p2.sub_point(p1))
            .mul_scalar(1.0 / (dt * dt))
    }

    #[must_use]
    fn curvature_at(&self, t: f64) -> Option<f64> {
        let d1 = self.derivative_at(t);
        let d2 = self.second_derivative_at(t);
        let denom = d1.length();
        if denom <= 0.0 || !denom.is_finite() {
            return None;
        }
        let k = d1.cross(d2).length() / (denom * denom * denom);
        if k.is_finite() { Some(k) } else { None }
    }

    /// Returns the unit tangent vector at parameter `t`.
    /// Returns `None` if the derivative is zero or degenerate.
    #[must_use]
    fn tangent_at(&self, t: f64) -> Option<Vec3> {
        self.derivative_at(t).normalized()
    }
}

fn lerp_point(a: Point3, b: Point3, t: f64) -> Point3 {
    a.lerp(b, t)
}

// ─────────────────────────────────────────────────────────────────────────────
// Line3
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line3 {
    pub start: Point3,
    pub end: Point3,
}

impl Line3 {
    #[must_use]
    pub const fn new(start: Point3, end: Point3) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn direction(self) -> Vec3 {
        self.end.sub_point(self.start)
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.direction().length()
    }
}

impl Curve3 for Line3 {
    fn point_at(&self, t: f64) -> Point3 {
        self.start.add_vec(self.direction().mul_scalar(t))
    }

    fn derivative_at(&self, _t: f64) -> Vec3 {
        self.direction()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CubicBezier3
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier3 {
    pub p0: Point3,
    pub p1: Point3,
    pub p2: Point3,
    pub p3: Point3,
}

impl CubicBezier3 {
    #[must_use]
    pub const fn new(p0: Point3, p1: Point3, p2: Point3, p3: Point3) -> Self {
        Self { p0, p1, p2, p3 }
    }

    /// A curve is usable when every control point is finite.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.p0.is_finite() && self.p1.is_finite() && self.p2.is_finite() && self.p3.is_finite()
    }

    #[must_use]
    pub const fn start(&self) -> Point3 {
        self.p0
    }

    #[must_use]
    pub const fn end(&self) -> Point3 {
        self.p3
    }
}

impl Curve3 for CubicBezier3 {
    fn point_at(&self, t: f64) -> Point3 {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        let u2 = u * u;
        let t2 = t * t;
        let w0 = u2 * u;
        let w1 = 3.0 * u2 * t;
        let w2 = 3.0 * u * t2;
        let w3 = t2 * t;
        Point3::new(
            self.p0.x * w0 + self.p1.x * w1 + self.p2.x * w2 + self.p3.x * w3,
            self.p0.y * w0 + self.p1.y * w1 + self.p2.y * w2 + self.p3.y * w3,
            self.p0.z * w0 + self.p1.z * w1 + self.p2.z * w2 + self.p3.z * w3,
        )
    }

    fn derivative_at(&self, t: f64) -> Vec3 {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        let a = self.p1.sub_point(self.p0);
        let b = self.p2.sub_point(self.p1);
        let c = self.p3.sub_point(self.p2);
        a.mul_scalar(3.0 * u * u)
            .add(b.mul_scalar(6.0 * u * t))
            .add(c.mul_scalar(3.0 * t * t))
    }

    fn second_derivative_at(&self, t: f64) -> Vec3 {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        let a = self
            .p2
            .sub_point(self.p1)
            .sub(self.p1.sub_point(self.p0));
        let b = self
            .p3
            .sub_point(self.p2)
            .sub(self.p2.sub_point(self.p1));
        a.mul_scalar(6.0 * u).add(b.mul_scalar(6.0 * t))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Polyline3
// ─────────────────────────────────────────────────────────────────────────────

/// A polyline curve parameterized by normalized arc length over [0, 1].
///
/// Closed polylines store their vertices without repeating the first point;
/// the closing segment is implied. Parameter 0 is the seam (first vertex).
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline3 {
    points: Vec<Point3>,
    cumulative_lengths: Vec<f64>,
    total_length: f64,
    closed: bool,
}

impl Polyline3 {
    pub fn new(mut points: Vec<Point3>, closed: bool) -> Result<Self, String> {
        if points.len() < 2 {
            return Err("polyline requires at least 2 points".to_string());
        }
        if closed && points.len() > 2 && points.first() == points.last() {
            points.pop();
        }
        if points.iter().any(|p| !p.is_finite()) {
            return Err("polyline points must be finite".to_string());
        }

        let mut cumulative_lengths = Vec::with_capacity(points.len());
        cumulative_lengths.push(0.0);
        let mut total = 0.0;
        for window in points.windows(2) {
            total += window[1].sub_point(window[0]).length();
            cumulative_lengths.push(total);
        }

        if closed {
            total += points
                .first()
                .copied()
                .zip(points.last().copied())
                .map(|(first, last)| first.sub_point(last).length())
                .unwrap_or(0.0);
        }

        Ok(Self {
            points,
            cumulative_lengths,
            total_length: total,
            closed,
        })
    }

    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    #[must_use]
    pub const fn length(&self) -> f64 {
        self.total_length
    }

    /// Returns the segment (start, end) for a given index, including the
    /// closing segment of a closed polyline.
    fn segment(&self, index: usize) -> (Point3, Point3) {
        if index + 1 < self.points.len() {
            (self.points[index], self.points[index + 1])
        } else {
            (self.points[index], self.points[0])
        }
    }

    fn segment_count(&self) -> usize {
        if self.closed {
            self.points.len()
        } else {
            self.points.len() - 1
        }
    }

    /// Normalized arc-length parameter of the point on this polyline
    /// closest to `p`.
    #[must_use]
    pub fn closest_param(&self, p: Point3) -> f64 {
        let mut best_dist_sq = f64::INFINITY;
        let mut best_length = 0.0;

        for i in 0..self.segment_count() {
            let (a, b) = self.segment(i);
            let dir = b.sub_point(a);
            let seg_len_sq = dir.length_squared();
            let s = if seg_len_sq > 0.0 {
                (p.sub_point(a).dot(dir) / seg_len_sq).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let candidate = lerp_point(a, b, s);
            let dist_sq = p.sub_point(candidate).length_squared();
            if dist_sq < best_dist_sq {
                best_dist_sq = dist_sq;
                best_length = self.cumulative_lengths[i] + dir.length() * s;
            }
        }

        if self.total_length > 0.0 {
            (best_length / self.total_length).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Move the seam of a closed polyline to the point at parameter `t`,
    /// so the returned polyline starts there. Open polylines are returned
    /// unchanged.
    #[must_use]
    pub fn with_seam_at(&self, t: f64) -> Self {
        if !self.closed || self.total_length <= 0.0 {
            return self.clone();
        }

        let target = t.rem_euclid(1.0) * self.total_length;
        let count = self.segment_count();

        for i in 0..count {
            let (a, b) = self.segment(i);
            let seg_len = b.sub_point(a).length();
            let seg_start = self.cumulative_lengths[i];
            if seg_start + seg_len >= target || i == count - 1 {
                let local = if seg_len > 0.0 {
                    ((target - seg_start).max(0.0) / seg_len).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let seam = lerp_point(a, b, local);

                let mut reordered = Vec::with_capacity(self.points.len() + 1);
                reordered.push(seam);
                for j in 1..=count {
                    let idx = (i + j) % self.points.len();
                    if self.points[idx] != seam {
                        reordered.push(self.points[idx]);
                    }
                }
                // Constructor failure is impossible here: the reordered list
                // preserves all distinct vertices of a valid polyline.
                return Self::new(reordered, true).unwrap_or_else(|_| self.clone());
            }
        }

        self.clone()
    }

    /// Reverse the traversal direction. For closed polylines the seam point
    /// is preserved as the start, matching seam-aware curve reversal.
    #[must_use]
    pub fn reversed(&self) -> Self {
        let points = if self.closed {
            let mut reordered = Vec::with_capacity(self.points.len());
            reordered.push(self.points[0]);
            reordered.extend(self.points[1..].iter().rev().copied());
            reordered
        } else {
            self.points.iter().rev().copied().collect()
        };
        Self::new(points, self.closed).unwrap_or_else(|_| self.clone())
    }
}

impl Curve3 for Polyline3 {
    fn point_at(&self, t: f64) -> Point3 {
        if self.total_length <= 0.0 || !self.total_length.is_finite() {
            return self.points[0];
        }

        let t = if self.closed {
            t.rem_euclid(1.0)
        } else {
            t.clamp(0.0, 1.0)
        };
        let mut target = t * self.total_length;

        let last_index = self.points.len() - 1;
        if target >= self.cumulative_lengths[last_index] {
            if !self.closed {
                return self.points[last_index];
            }

            let last = self.points[last_index];
            let first = self.points[0];
            let segment_length = first.sub_point(last).length();
            if segment_length == 0.0 {
                return last;
            }
            let ratio =
                ((target - self.cumulative_lengths[last_index]) / segment_length).clamp(0.0, 1.0);
            return lerp_point(last, first, ratio);
        }

        let idx = match self
            .cumulative_lengths
            .binary_search_by(|value| value.total_cmp(&target))
        {
            Ok(i) => i,
            Err(i) => i.max(1) - 1,
        };

        let seg_start = self.points[idx];
        let seg_end = self.points[idx + 1];
        let seg_len = seg_end.sub_point(seg_start).length();
        if seg_len == 0.0 {
            return seg_start;
        }
        target -= self.cumulative_lengths[idx];
        lerp_point(seg_start, seg_end, (target / seg_len).clamp(0.0, 1.0))
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Curve-plane intersection
// ─────────────────────────────────────────────────────────────────────────────

/// Finds plane intersection points of a curve by walking a dense sampling
/// for sign changes of the signed distance and refining each crossing by
/// linear interpolation.
///
/// # Returns
/// A vector of `(point, parameter)` tuples, one per crossing, in
/// parameter order.
#[must_use]
pub fn curve_plane_intersections<C: Curve3>(
    curve: &C,
    plane: &Plane,
    samples: usize,
) -> Vec<(Point3, f64)> {
    let samples = samples.max(2);
    let (t0, t1) = curve.domain();
    let span = t1 - t0;

    if !span.is_finite() || span == 0.0 {
        return Vec::new();
    }

    let mut results = Vec::new();

    let mut prev_t = t0;
    let mut prev_pt = curve.point_at(t0);
    let mut prev_dist = plane.signed_distance(prev_pt);

    for i in 1..=samples {
        let u = i as f64 / samples as f64;
        let t = t0 + span * u;
        let pt = curve.point_at(t);
        let dist = plane.signed_distance(pt);

        if prev_dist.abs() < 1e-12 {
            results.push((prev_pt, prev_t));
        } else if prev_dist.signum() != dist.signum() {
            let denom = prev_dist - dist;
            if denom.abs() > 1e-14 {
                let ratio = prev_dist / denom;
                let t_intersect = prev_t + (t - prev_t) * ratio.clamp(0.0, 1.0);
                let pt_intersect = curve.point_at(t_intersect);
                results.push((pt_intersect, t_intersect));
            }
        }

        prev_t = t;
        prev_pt = pt;
        prev_dist = dist;
    }

    if prev_dist.abs() < 1e-12
        && results
            .last()
            .is_none_or(|(_, t)| (*t - prev_t).abs() > 1e-9)
    {
        results.push((prev_pt, prev_t));
    }

    results
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

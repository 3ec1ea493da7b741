//! Configuration surface for belt generation.
//!
//! Defaults reproduce the original design-component behavior: A at 0.33
//! and B at 0.66 of the first half, both included, all tangency angles
//! zero, all magnitudes 0.5, three intermediate sections per span, linear
//! transition bias, rebuild tolerance 0.01.

use serde::Serialize;

use super::diagnostics::{BeltDiagnostics, Stage};
use super::frame::FrameOptions;
use super::intersect::PlaneIntersectOptions;

/// Tangency angle (degrees) and offset magnitude (fraction of the local
/// dome-bowl distance) for one side of one control point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SideProfile {
    pub angle_deg: f64,
    pub magnitude: f64,
}

impl Default for SideProfile {
    fn default() -> Self {
        Self {
            angle_deg: 0.0,
            magnitude: 0.5,
        }
    }
}

/// Per-side profiles for one named control point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PointProfile {
    pub dome: SideProfile,
    pub bowl: SideProfile,
}

/// All scalar and boolean inputs of a belt generation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BeltConfig {
    /// Position of point A within the first half of the domain, in [0, 1].
    pub a_position: f64,
    /// Position of point B within the first half of the domain, in [0, 1].
    pub b_position: f64,
    pub include_a: bool,
    pub include_b: bool,

    pub entry: PointProfile,
    pub a: PointProfile,
    pub b: PointProfile,
    pub exit: PointProfile,

    /// Number of interpolated sections inserted between each pair of
    /// consecutive primary control points.
    pub intermediate_sections: usize,
    /// Interpolation shape parameter in [0, 1]; 0.5 is linear.
    pub transition_bias: f64,
    /// When present and positive, the lofted surface is rebuilt at 1.5x
    /// control density.
    pub rebuild_tolerance: Option<f64>,

    pub intersect: PlaneIntersectOptions,
    pub frame: FrameOptions,
}

impl Default for BeltConfig {
    fn default() -> Self {
        Self {
            a_position: 0.33,
            b_position: 0.66,
            include_a: true,
            include_b: true,
            entry: PointProfile::default(),
            a: PointProfile::default(),
            b: PointProfile::default(),
            exit: PointProfile::default(),
            intermediate_sections: 3,
            transition_bias: 0.5,
            rebuild_tolerance: Some(0.01),
            intersect: PlaneIntersectOptions::default(),
            frame: FrameOptions::default(),
        }
    }
}

impl BeltConfig {
    /// Returns a copy with out-of-range positions and bias clamped to
    /// [0, 1], recording a warning for each clamp.
    #[must_use]
    pub fn sanitized(&self, diagnostics: &mut BeltDiagnostics) -> Self {
        let mut config = self.clone();

        for (name, value) in [
            ("A position", &mut config.a_position),
            ("B position", &mut config.b_position),
            ("transition bias", &mut config.transition_bias),
        ] {
            let clamped = value.clamp(0.0, 1.0);
            if !value.is_finite() {
                diagnostics.warn(Stage::Plan, format!("{name} is not finite, using 0.5"));
                *value = 0.5;
            } else if clamped != *value {
                diagnostics.warn(
                    Stage::Plan,
                    format!("{name} {value} outside [0, 1], clamped to {clamped}"),
                );
                *value = clamped;
            }
        }

        config
    }
}

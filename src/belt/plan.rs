//! Control-point planning: the ordered sequence of named locations around
//! the shared rail domain, with per-side angle/magnitude profiles.
//!
//! Every definition is built complete before it is added to the sequence;
//! nothing is mutated after the final sort.

use super::config::{BeltConfig, SideProfile};
use super::diagnostics::{BeltDiagnostics, Stage};

/// Parameter distance under which two control points count as the same
/// location, and under which a point counts as sitting on the domain end.
const CLOSURE_EPS: f64 = 1e-6;

/// The plane-crossing landmarks that anchor the belt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landmark {
    Entry,
    Exit,
    Closure,
}

/// How a control point's bowl-side location is resolved: landmarks map to
/// the bowl rail's own crossing parameters, every other point follows the
/// closest point on the bowl rail to its dome-side location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointRole {
    Landmark(Landmark),
    Interpolated,
}

/// A fully specified control location on the shared [0, 1] domain.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlPointDefinition {
    pub label: String,
    pub role: PointRole,
    pub param: f64,
    pub dome: SideProfile,
    pub bowl: SideProfile,
}

/// Interpolate between two scalar values with a bias-shaped weight.
///
/// * `bias < 0.5` holds the source value longer, with a sharp transition
///   near the target;
/// * `bias > 0.5` establishes the target value early;
/// * `bias = 0.5` is linear.
///
/// The `+ 0.01` terms keep the exponent finite at the bias extremes.
#[must_use]
pub fn interpolate_value(v0: f64, v1: f64, t: f64, bias: f64) -> f64 {
    let weight = if bias < 0.5 {
        t.powf(1.0 / (2.0 * bias + 0.01))
    } else if bias > 0.5 {
        1.0 - (1.0 - t).powf(1.0 / (2.0 * (1.0 - bias) + 0.01))
    } else {
        t
    };
    v0 + (v1 - v0) * weight
}

fn interpolate_profile(from: SideProfile, to: SideProfile, t: f64, bias: f64) -> SideProfile {
    SideProfile {
        angle_deg: interpolate_value(from.angle_deg, to.angle_deg, t, bias),
        magnitude: interpolate_value(from.magnitude, to.magnitude, t, bias),
    }
}

/// Build the primary control points: entry and exit landmarks plus the
/// optional A/B points and their mirrors, sorted by parameter.
///
/// A and B live in the first half of the domain (entry to exit); their
/// mirrors sit at the same relative position within the second half.
fn build_primary_points(exit_param: f64, config: &BeltConfig) -> Vec<ControlPointDefinition> {
    let mut points = vec![ControlPointDefinition {
        label: "entry".to_string(),
        role: PointRole::Landmark(Landmark::Entry),
        param: 0.0,
        dome: config.entry.dome,
        bowl: config.entry.bowl,
    }];

    if config.include_a {
        points.push(ControlPointDefinition {
            label: "A".to_string(),
            role: PointRole::Interpolated,
            param: config.a_position * exit_param,
            dome: config.a.dome,
            bowl: config.a.bowl,
        });
    }

    if config.include_b {
        points.push(ControlPointDefinition {
            label: "B".to_string(),
            role: PointRole::Interpolated,
            param: config.b_position * exit_param,
            dome: config.b.dome,
            bowl: config.b.bowl,
        });
    }

    points.push(ControlPointDefinition {
        label: "exit".to_string(),
        role: PointRole::Landmark(Landmark::Exit),
        param: exit_param,
        dome: config.exit.dome,
        bowl: config.exit.bowl,
    });

    if config.include_b {
        points.push(ControlPointDefinition {
            label: "B_mirror".to_string(),
            role: PointRole::Interpolated,
            param: exit_param + (1.0 - exit_param) * config.b_position,
            dome: config.b.dome,
            bowl: config.b.bowl,
        });
    }

    if config.include_a {
        points.push(ControlPointDefinition {
            label: "A_mirror".to_string(),
            role: PointRole::Interpolated,
            param: exit_param + (1.0 - exit_param) * config.a_position,
            dome: config.a.dome,
            bowl: config.a.bowl,
        });
    }

    points.sort_by(|a, b| a.param.total_cmp(&b.param));
    points
}

/// Interpolated points between two consecutive primaries. For the closing
/// pair (wrapping past the domain end back to entry) the inserted
/// parameters advance from the first point toward 1.0, filling the
/// remaining arc rather than cutting back through the start.
fn build_intermediate_points(
    from: &ControlPointDefinition,
    to: &ControlPointDefinition,
    count: usize,
    bias: f64,
) -> Vec<ControlPointDefinition> {
    let wrapping = to.param < from.param;
    let mut points = Vec::with_capacity(count);

    for i in 1..=count {
        let t = i as f64 / (count + 1) as f64;
        let param = if wrapping {
            (from.param + (1.0 - from.param) * t).clamp(from.param, 1.0)
        } else {
            from.param + (to.param - from.param) * t
        };

        points.push(ControlPointDefinition {
            label: format!("{}_to_{}_{}", from.label, to.label, i),
            role: PointRole::Interpolated,
            param,
            dome: interpolate_profile(from.dome, to.dome, t, bias),
            bowl: interpolate_profile(from.bowl, to.bowl, t, bias),
        });
    }

    points
}

/// Plan the complete control-point sequence for one run: primaries,
/// intermediates on every consecutive pair (wrap included), and a closure
/// point at the domain end when none of the planned points lands there.
#[must_use]
pub fn plan_control_points(
    exit_param: f64,
    config: &BeltConfig,
    diagnostics: &mut BeltDiagnostics,
) -> Vec<ControlPointDefinition> {
    let primaries = build_primary_points(exit_param, config);
    diagnostics.info(
        Stage::Plan,
        format!("{} primary control points", primaries.len()),
    );

    let mut all = primaries.clone();
    for i in 0..primaries.len() {
        let from = &primaries[i];
        let to = &primaries[(i + 1) % primaries.len()];
        all.extend(build_intermediate_points(
            from,
            to,
            config.intermediate_sections,
            config.transition_bias,
        ));
    }

    all.sort_by(|a, b| a.param.total_cmp(&b.param));

    // Collapse coincident parameters (e.g. A positioned on top of entry);
    // duplicate stations would break the loft ordering downstream.
    let mut deduped: Vec<ControlPointDefinition> = Vec::with_capacity(all.len());
    for cp in all {
        if let Some(last) = deduped.last() {
            if (cp.param - last.param).abs() < CLOSURE_EPS {
                diagnostics.warn(
                    Stage::Plan,
                    format!(
                        "control point '{}' coincides with '{}' at param {:.6}, dropped",
                        cp.label, last.label, cp.param
                    ),
                );
                continue;
            }
        }
        deduped.push(cp);
    }
    let mut all = deduped;

    let has_closure = all.iter().any(|cp| (cp.param - 1.0).abs() < CLOSURE_EPS);
    if !has_closure {
        let entry_profiles = all
            .iter()
            .find(|cp| cp.param.abs() < CLOSURE_EPS)
            .map(|cp| (cp.dome, cp.bowl));
        if let Some((dome, bowl)) = entry_profiles {
            all.push(ControlPointDefinition {
                label: "closure".to_string(),
                role: PointRole::Landmark(Landmark::Closure),
                param: 1.0,
                dome,
                bowl,
            });
            all.sort_by(|a, b| a.param.total_cmp(&b.param));
        }
    }

    diagnostics.info(
        Stage::Plan,
        format!(
            "{} control points, param range {:.6} to {:.6}",
            all.len(),
            all.first().map_or(0.0, |cp| cp.param),
            all.last().map_or(0.0, |cp| cp.param),
        ),
    );

    all
}

mod core;
mod curve;
mod loft;
mod surface;

pub use core::{BBox, Plane, Point3, Tolerance, Vec3};
pub use curve::{CubicBezier3, Curve3, Line3, Polyline3, curve_plane_intersections};
pub use loft::{LoftError, LoftedSurface, TwoRailLoftOptions, loft_two_rails};
pub use surface::{
    CapOrientation, FaceRelation, SphericalCapSurface, Surface, TrimLoop3, TrimLoopKind,
    TrimmedSurface,
};

#[cfg(test)]
mod tests;

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

//! Belt surface generation between two trimmed boundary surfaces.
//!
//! The crate has two layers:
//!
//! - [`geom`] supplies the geometry primitives the pipeline consumes:
//!   points and vectors, polyline curves with seam control, cubic
//!   Beziers, trimmed-surface traits, and the two-rail periodic loft.
//! - [`belt`] is the generation pipeline itself: rail extraction,
//!   reference-plane alignment, control-point planning with biased
//!   interpolation, frame-vector computation, cross-section construction,
//!   and lofting.
//!
//! # Example
//!
//! ```
//! use belt_engine::belt::{BeltConfig, generate_belt};
//! use belt_engine::geom::{CapOrientation, Point3, SphericalCapSurface, Tolerance};
//!
//! let dome = SphericalCapSurface::new(
//!     Point3::new(0.0, 0.0, 0.5),
//!     1.0,
//!     0.0,
//!     CapOrientation::Up,
//! )
//! .unwrap();
//! let bowl = SphericalCapSurface::new(
//!     Point3::new(0.0, 0.0, -0.5),
//!     1.0,
//!     0.0,
//!     CapOrientation::Down,
//! )
//! .unwrap();
//!
//! let result = generate_belt(&dome, &bowl, &BeltConfig::default(), Tolerance::new(1e-3));
//! assert!(result.is_success());
//! ```

pub mod belt;
pub mod geom;

pub use belt::{BeltConfig, BeltDiagnostics, BeltError, BeltResult, generate_belt};
pub use geom::{Point3, Tolerance, Vec3};

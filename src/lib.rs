//! Pre-processor for wind-turbine aerodynamic simulations.
//!
//! A text configuration file describes a project, the turbine and its
//! operating envelope, and references the airfoil, blade and wind-field
//! data files. The crate parses and validates everything, normalizes the
//! airfoil contours, interpolates intermediate sections along the blade
//! span, optionally loads a TurbSim wind field, and exports the assembled
//! geometry for downstream blade-element analysis.
//!
//! The core pipeline lives in [`airfoil`] (contour normalization and
//! thickness interpolation), [`blade`] (section assembly) and
//! [`windfield`] (Bladed/AeroDyn `.wnd` reader and bilinear velocity
//! interpolation). Everything is synchronous and single-threaded; callers
//! that need concurrency wrap whole operations externally.

pub mod airfoil;
pub mod blade;
pub mod config;
pub mod export;
pub mod geom;
pub mod interpolate;
pub mod performance;
pub mod project;
pub mod windfield;

pub use airfoil::{Airfoil, GeometryError};
pub use blade::{BladeDefinition, BladeSection};
pub use geom::{Marker, MarkerKind, Point, Vec3};
pub use performance::{PerformancePoint, PerformanceTable};
pub use project::{AirfoilCatalog, Project, ProjectError};
pub use windfield::{
    BilinearVelocityInterpolator, BladedWindReader, WindFieldError, WindFieldManager,
};

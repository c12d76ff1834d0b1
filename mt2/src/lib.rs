//! Computation of the stransverse mass `MT2`, the semi-invisible-decay
//! analogue of the transverse mass used throughout collider physics
//! analyses (Lester & Summers, 1999; Barr, Lester & Stephens, 2003).
//!
//! The entry points are:
//!
//! - [`mt2`]: compute `MT2` for one event from ten scalar kinematic fields.
//! - [`mt2_batched`]: the same computation, broadcast elementwise over
//!   `ndarray` arrays.
//! - [`make_ellipses`]: the pair of conic sections in the invisible-momentum
//!   plane whose intersection the bisection searches for, exposed for
//!   diagnostics and plotting.
//!
//! `MT2` is found by bisection on a trial parent mass: at each trial, the
//! two transverse-mass constraints become ellipses in the plane of one
//! invisible particle's momentum, and a trial mass is feasible exactly when
//! those ellipses share a real point. See [`oracle`] for that feasibility
//! test and [`bisect`] for the search built on top of it.

mod batch;
mod bisect;
mod cubic;
mod ellipse;
mod error;
mod oracle;
mod options;

pub use batch::mt2_batched;
pub use bisect::{mt2, SENTINEL};
pub use ellipse::{build_ellipse, make_ellipses, Ellipse};
pub use error::Mt2Error;
pub use oracle::{ellipses_intersect, Feasibility};
pub use options::Mt2Options;

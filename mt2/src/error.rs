use thiserror::Error;

/// Errors surfaced at the batched-evaluation boundary.
///
/// The scalar engine ([`crate::mt2`]) never returns a `Result`: per the
/// sentinel convention, infeasible or non-finite inputs simply collapse to
/// a negative `f64`. This type only covers failures that must be reported
/// synchronously, before any computation begins.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Mt2Error {
    /// The ten input arrays (plus any extra per-element options) cannot be
    /// broadcast to a common shape.
    #[error("input arrays have incompatible shapes and cannot be broadcast together")]
    ShapeMismatch,

    /// A caller-supplied output buffer does not match the shape that
    /// broadcasting the inputs produces.
    #[error(
        "output buffer has shape {out:?}, but the broadcast input shape is {expected:?}"
    )]
    OutputShapeMismatch {
        out: Vec<usize>,
        expected: Vec<usize>,
    },
}

/// Tunables accepted by the scalar and batched MT2 entry points.
///
/// Bundled into a small `Copy` struct rather than threaded through as
/// positional arguments, following the original library's ufunc signature
/// (`desired_precision_on_mt2`, `use_deci_sections_initially`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mt2Options {
    /// Absolute termination tolerance on MT2 itself (not MT2²). Must be
    /// non-negative; zero requests the tightest precision the bisection can
    /// reach before floating-point resolution takes over. See spec §4.3.
    pub desired_precision_on_mt2: f64,

    /// Legacy compatibility flag from the original library, where the first
    /// few bracket refinements used ten-way sectioning rather than plain
    /// bisection. This implementation always bisects; the field is accepted
    /// for API compatibility and is currently a no-op.
    pub use_deci_sections_initially: bool,
}

impl Default for Mt2Options {
    fn default() -> Self {
        Self {
            desired_precision_on_mt2: 0.0,
            use_deci_sections_initially: true,
        }
    }
}

//! Separable smoothing filters.
//!
//! The inference stage runs one light Gaussian pass over the blended surface
//! to hide residual patch seams. Borders use half-sample symmetric reflection
//! (`d c b a | a b c d | d c b a`).

mod gaussian;

pub use gaussian::{apply_separable_reflect, GaussianFilter};

/// Trait implemented by separable 1D filters.
pub trait SeparableFilter {
    /// 1D taps in left-to-right order; the centre tap sits at `len / 2`.
    fn taps(&self) -> &[f32];
}

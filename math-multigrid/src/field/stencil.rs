//! One-dimensional finite-difference stencils
//!
//! Weights are unscaled: first derivatives are multiplied by `1/(2h)` and
//! second derivatives by `1/h²` (see [`Geometry`](super::Geometry)).

/// Which one-dimensional stencil applies at a grid index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stencil {
    /// Low-index edge: one-sided, looking towards increasing index
    Forward,
    /// Interior: second-order centred difference
    Centered,
    /// High-index edge: mirror image of [`Stencil::Forward`]
    Backward,
}

/// `(offset, weight)` pairs of a stencil
pub type Weights = &'static [(isize, f64)];

impl Stencil {
    /// Stencil to use at `index` on an axis of `len` points
    pub fn at(index: usize, len: usize) -> Self {
        if index == 0 {
            Stencil::Forward
        } else if index + 1 >= len {
            Stencil::Backward
        } else {
            Stencil::Centered
        }
    }

    /// First-derivative weights on an axis of `len` points
    ///
    /// Edges use the 3-point one-sided formula, reduced to a two-point
    /// difference when the axis only has two points.
    pub fn first_derivative(self, len: usize) -> Weights {
        match (self, len) {
            (_, 0 | 1) => &[],
            (Stencil::Forward, 2) => &[(0, -2.0), (1, 2.0)],
            (Stencil::Backward, 2) => &[(0, 2.0), (-1, -2.0)],
            (Stencil::Forward, _) => &[(0, -3.0), (1, 4.0), (2, -1.0)],
            (Stencil::Centered, _) => &[(-1, -1.0), (1, 1.0)],
            (Stencil::Backward, _) => &[(0, 3.0), (-1, -4.0), (-2, 1.0)],
        }
    }

    /// Second-derivative weights on an axis of `len` points
    ///
    /// Edges use the 4-point one-sided formula, or the 3-point one when the
    /// axis is too short for it.
    pub fn second_derivative(self, len: usize) -> Weights {
        match (self, len) {
            (_, 0..=2) => &[],
            (Stencil::Forward, 3) => &[(0, 1.0), (1, -2.0), (2, 1.0)],
            (Stencil::Backward, 3) => &[(0, 1.0), (-1, -2.0), (-2, 1.0)],
            (Stencil::Forward, _) => &[(0, 2.0), (1, -5.0), (2, 4.0), (3, -1.0)],
            (Stencil::Centered, _) => &[(-1, 1.0), (0, -2.0), (1, 1.0)],
            (Stencil::Backward, _) => &[(0, 2.0), (-1, -5.0), (-2, 4.0), (-3, -1.0)],
        }
    }
}

/// Weight applied to the centre point of a stencil
pub fn self_weight(weights: Weights) -> f64 {
    weights
        .iter()
        .find(|(offset, _)| *offset == 0)
        .map_or(0.0, |&(_, w)| w)
}

/// Index `index + offset`; callers only pass offsets that stay on the grid
#[inline]
pub(crate) fn shifted(index: usize, offset: isize) -> usize {
    index.wrapping_add_signed(offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection() {
        assert_eq!(Stencil::at(0, 9), Stencil::Forward);
        assert_eq!(Stencil::at(4, 9), Stencil::Centered);
        assert_eq!(Stencil::at(8, 9), Stencil::Backward);
    }

    #[test]
    fn test_weights_annihilate_constants() {
        for stencil in [Stencil::Forward, Stencil::Centered, Stencil::Backward] {
            for len in [2, 3, 4, 9] {
                let first: f64 = stencil.first_derivative(len).iter().map(|w| w.1).sum();
                let second: f64 = stencil.second_derivative(len).iter().map(|w| w.1).sum();
                assert!(first.abs() < 1e-14);
                assert!(second.abs() < 1e-14);
            }
        }
    }

    #[test]
    fn test_first_derivative_is_exact_for_lines() {
        // Σ w·offset must equal 2 (the scale factor is 1/2h)
        for stencil in [Stencil::Forward, Stencil::Centered, Stencil::Backward] {
            let moment: f64 = stencil
                .first_derivative(9)
                .iter()
                .map(|&(o, w)| o as f64 * w)
                .sum();
            assert!((moment - 2.0).abs() < 1e-14);
        }
    }

    #[test]
    fn test_self_weights() {
        assert_eq!(self_weight(Stencil::Forward.first_derivative(9)), -3.0);
        assert_eq!(self_weight(Stencil::Centered.first_derivative(9)), 0.0);
        assert_eq!(self_weight(Stencil::Backward.first_derivative(9)), 3.0);
        assert_eq!(self_weight(Stencil::Forward.second_derivative(9)), 2.0);
        assert_eq!(self_weight(Stencil::Centered.second_derivative(9)), -2.0);
    }
}

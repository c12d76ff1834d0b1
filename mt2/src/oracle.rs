//! The conic-intersection feasibility oracle (spec §4.2).
//!
//! Given two ellipses in the invisible-momentum plane, decides whether
//! their solution sets share a real point, by reducing to root isolation
//! of the cubic characteristic polynomial of the conic pencil and
//! splitting a degenerate pencil member into a pair of real lines.

use nalgebra::{Matrix3, Vector3};

use crate::cubic::{has_real_root_quadratic, real_roots_cubic};
use crate::ellipse::Ellipse;

/// A multiple of machine epsilon used to zero out determinants and
/// discriminants that are dominated by rounding noise. Order 10⁻¹² per
/// spec §4.2's numeric policy.
const EPS_MIX: f64 = 1e-12;

/// Outcome of the feasibility oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feasibility {
    /// The two ellipses share at least one real point.
    Feasible,
    /// The two ellipses do not intersect.
    Infeasible,
    /// Degeneracies defeated the algebraic reduction. Callers treat this as
    /// infeasible; see spec §4.2.
    Indeterminate,
}

/// Decide whether two transverse-mass ellipses intersect.
pub fn ellipses_intersect(e1: &Ellipse, e2: &Ellipse) -> Feasibility {
    if !e1.is_non_degenerate_real_ellipse() || !e2.is_non_degenerate_real_ellipse() {
        return Feasibility::Infeasible;
    }

    let a1 = e1.matrix();
    let a2 = e2.matrix();

    if !a1.iter().all(|v| v.is_finite()) || !a2.iter().all(|v| v.is_finite()) {
        return Feasibility::Infeasible;
    }

    let (d0, d1, d2, d3) = pencil_characteristic_cubic(&a1, &a2);
    let roots = real_roots_cubic(d0, d1, d2, d3);
    if roots.is_empty() {
        return Feasibility::Indeterminate;
    }

    let scale = a1.amax().max(a2.amax()).max(1.0);
    let tol = scale * scale * EPS_MIX;

    let mut saw_complex_split = false;
    let mut saw_valid_split = false;
    for lambda in &roots {
        let q = a1 + a2 * *lambda;
        match split_degenerate_conic(&q, tol) {
            LineSplit::Lines(l1, l2) => {
                saw_valid_split = true;
                if line_meets_ellipse(l1, e1) || line_meets_ellipse(l2, e1) {
                    return Feasibility::Feasible;
                }
            }
            LineSplit::Complex => saw_complex_split = true,
            LineSplit::Indeterminate => {}
        }
    }

    if saw_valid_split || saw_complex_split {
        Feasibility::Infeasible
    } else {
        Feasibility::Indeterminate
    }
}

/// Coefficients `(d0, d1, d2, d3)` of `det(A1 + lambda*A2) = d0 + d1*lambda
/// + d2*lambda^2 + d3*lambda^3`, obtained by expanding the determinant as a
/// sum over which columns come from `A1` versus `A2` (the standard "mixed
/// determinant" expansion of a matrix pencil).
fn pencil_characteristic_cubic(a1: &Matrix3<f64>, a2: &Matrix3<f64>) -> (f64, f64, f64, f64) {
    let c10 = a1.column(0).into_owned();
    let c11 = a1.column(1).into_owned();
    let c12 = a1.column(2).into_owned();
    let c20 = a2.column(0).into_owned();
    let c21 = a2.column(1).into_owned();
    let c22 = a2.column(2).into_owned();

    let det3 = |a: Vector3<f64>, b: Vector3<f64>, c: Vector3<f64>| -> f64 {
        Matrix3::from_columns(&[a, b, c]).determinant()
    };

    let d0 = det3(c10, c11, c12);
    let d1 = det3(c20, c11, c12) + det3(c10, c21, c12) + det3(c10, c11, c22);
    let d2 = det3(c10, c21, c22) + det3(c20, c11, c22) + det3(c20, c21, c12);
    let d3 = det3(c20, c21, c22);

    (d0, d1, d2, d3)
}

enum LineSplit {
    Lines((f64, f64, f64), (f64, f64, f64)),
    /// The pencil member's singular point is complex: no real line pair.
    Complex,
    /// Numerical degeneracy prevented a conclusive split.
    Indeterminate,
}

/// Split a (numerically) rank-deficient symmetric 3x3 conic matrix into a
/// pair of real lines, following the classical adjugate-based
/// decomposition for degenerate conics (see e.g. Richter-Gebert,
/// *Perspectives on Projective Geometry*, on splitting line pairs out of a
/// conic pencil).
fn split_degenerate_conic(q: &Matrix3<f64>, tol: f64) -> LineSplit {
    let adj = adjugate3(q);

    let diag = [adj[(0, 0)], adj[(1, 1)], adj[(2, 2)]];
    let (i, &b_ii) = diag
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.abs().partial_cmp(&b.1.abs()).unwrap())
        .expect("diag has 3 elements");

    if b_ii.abs() <= tol {
        // adj(Q) is numerically zero: Q itself already has rank <= 1, i.e.
        // it is a repeated line.
        return match largest_row(q, tol) {
            Some(line) => LineSplit::Lines(line, line),
            None => LineSplit::Indeterminate,
        };
    }

    if b_ii > 0.0 {
        // The singular point of this pencil member is complex: the two
        // "lines" are complex conjugates, not real.
        return LineSplit::Complex;
    }

    let beta = (-b_ii).sqrt();
    let p = adj.column(i).into_owned() / beta;

    let skew = Matrix3::new(0.0, -p[2], p[1], p[2], 0.0, -p[0], -p[1], p[0], 0.0);

    let m_plus = q + skew;
    let m_minus = q - skew;

    match (largest_row(&m_plus, tol), largest_row(&m_minus, tol)) {
        (Some(l1), Some(l2)) => LineSplit::Lines(l1, l2),
        _ => LineSplit::Indeterminate,
    }
}

/// The adjugate (classical adjoint) of a general 3x3 matrix.
fn adjugate3(m: &Matrix3<f64>) -> Matrix3<f64> {
    let minor = |r0: usize, r1: usize, c0: usize, c1: usize| -> f64 {
        m[(r0, c0)] * m[(r1, c1)] - m[(r0, c1)] * m[(r1, c0)]
    };
    // Cofactor matrix, transposed (= cofactor matrix for a symmetric input).
    let cof = [
        [minor(1, 2, 1, 2), -minor(1, 2, 0, 2), minor(1, 2, 0, 1)],
        [-minor(0, 2, 1, 2), minor(0, 2, 0, 2), -minor(0, 2, 0, 1)],
        [minor(0, 1, 1, 2), -minor(0, 1, 0, 2), minor(0, 1, 0, 1)],
    ];
    Matrix3::new(
        cof[0][0], cof[1][0], cof[2][0], cof[0][1], cof[1][1], cof[2][1], cof[0][2], cof[1][2],
        cof[2][2],
    )
}

/// The row of `m` with the largest Euclidean norm, as a line `(a, b, c)`
/// representing `a*x + b*y + c = 0` in the invisible-momentum plane.
/// Returns `None` if every row is numerically zero.
///
/// `tol_sq_norm` is a threshold on the row's *squared* norm directly (it
/// already carries the same coefficient^2 units as `sq_norm`, matching the
/// `b_ii` comparison this shares its scale with in [`split_degenerate_conic`]);
/// squaring it again here would shrink the zero-band by another factor of
/// `scale^2` and let near-singular, ill-conditioned rows through unfiltered.
fn largest_row(m: &Matrix3<f64>, tol_sq_norm: f64) -> Option<(f64, f64, f64)> {
    let rows = [
        (m[(0, 0)], m[(0, 1)], m[(0, 2)]),
        (m[(1, 0)], m[(1, 1)], m[(1, 2)]),
        (m[(2, 0)], m[(2, 1)], m[(2, 2)]),
    ];
    rows.into_iter()
        .max_by(|a, b| sq_norm(*a).partial_cmp(&sq_norm(*b)).unwrap())
        .filter(|&row| sq_norm(row) > tol_sq_norm)
}

fn sq_norm((a, b, c): (f64, f64, f64)) -> f64 {
    a * a + b * b + c * c
}

/// Whether the line `a*x + b*y + c = 0` meets the ellipse `e` at a real,
/// finite point.
fn line_meets_ellipse((a, b, c): (f64, f64, f64), e: &Ellipse) -> bool {
    // Parametrise the line by whichever coordinate has the larger
    // coefficient, for numerical stability.
    if a.abs() >= b.abs() {
        if a == 0.0 {
            return false;
        }
        // x = -(b*y + c)/a
        let n = -b / a;
        let j = -c / a;
        let qa = e.c_yy + 2.0 * e.c_xy * n + e.c_xx * n * n;
        let qb = 2.0 * e.c_xy * j + 2.0 * e.c_xx * n * j + 2.0 * e.c_y + 2.0 * e.c_x * n;
        let qc = e.c_xx * j * j + 2.0 * e.c_x * j + e.c;
        has_real_root_quadratic(qc, qb, qa)
    } else {
        // y = -(a*x + c)/b
        let m = -a / b;
        let k = -c / b;
        let qa = e.c_xx + 2.0 * e.c_xy * m + e.c_yy * m * m;
        let qb = 2.0 * e.c_xy * k + 2.0 * e.c_yy * m * k + 2.0 * e.c_x + 2.0 * e.c_y * m;
        let qc = e.c_yy * k * k + 2.0 * e.c_y * k + e.c;
        has_real_root_quadratic(qc, qb, qa)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circle(cx: f64, cy: f64, r: f64) -> Ellipse {
        // (x-cx)^2 + (y-cy)^2 - r^2 = 0
        Ellipse {
            c_xx: 1.0,
            c_yy: 1.0,
            c_xy: 0.0,
            c_x: -cx,
            c_y: -cy,
            c: cx * cx + cy * cy - r * r,
        }
    }

    #[test]
    fn overlapping_circles_are_feasible() {
        let e1 = circle(0.0, 0.0, 2.0);
        let e2 = circle(1.0, 0.0, 2.0);
        assert_eq!(ellipses_intersect(&e1, &e2), Feasibility::Feasible);
    }

    #[test]
    fn disjoint_circles_are_infeasible() {
        let e1 = circle(0.0, 0.0, 1.0);
        let e2 = circle(10.0, 0.0, 1.0);
        assert_eq!(ellipses_intersect(&e1, &e2), Feasibility::Infeasible);
    }

    #[test]
    fn nested_disjoint_circles_are_infeasible() {
        let e1 = circle(0.0, 0.0, 1.0);
        let e2 = circle(0.0, 0.0, 0.1);
        assert_eq!(ellipses_intersect(&e1, &e2), Feasibility::Infeasible);
    }

    #[test]
    fn tangent_circles_are_feasible() {
        // Externally tangent: centres 2 apart, radii 1 each.
        let e1 = circle(0.0, 0.0, 1.0);
        let e2 = circle(2.0, 0.0, 1.0);
        assert_eq!(ellipses_intersect(&e1, &e2), Feasibility::Feasible);
    }

    #[test]
    fn degenerate_input_is_infeasible() {
        let e1 = circle(0.0, 0.0, 1.0);
        let degenerate = Ellipse {
            c_xx: 0.0,
            c_yy: 0.0,
            c_xy: 0.0,
            c_x: 0.0,
            c_y: 0.0,
            c: 0.0,
        };
        assert_eq!(ellipses_intersect(&e1, &degenerate), Feasibility::Infeasible);
    }
}

//! Real-root solvers for the low-degree polynomials that show up when
//! classifying members of a conic pencil (see [`crate::oracle`]).

/// Solve `d0 + d1*x + d2*x^2 + d3*x^3 = 0` for its real roots.
///
/// Falls back to [`real_roots_quadratic`] when the cubic term vanishes
/// within a scale-relative tolerance: the pencil's characteristic
/// polynomial can legitimately drop degree when one of the two ellipses is
/// itself singular along the pencil direction.
pub fn real_roots_cubic(d0: f64, d1: f64, d2: f64, d3: f64) -> Vec<f64> {
    let scale = d0.abs().max(d1.abs()).max(d2.abs()).max(d3.abs());
    if scale == 0.0 || !scale.is_finite() {
        return Vec::new();
    }
    let tol = scale * 1e-12;

    if d3.abs() <= tol {
        return real_roots_quadratic(d0, d1, d2);
    }

    // Normalise to a monic cubic: x^3 + a*x^2 + b*x + c = 0.
    let a = d2 / d3;
    let b = d1 / d3;
    let c = d0 / d3;

    // Depressed cubic t^3 + p*t + q = 0, with x = t - a/3.
    let shift = a / 3.0;
    let p = b - a * a / 3.0;
    let q = 2.0 * a * a * a / 27.0 - a * b / 3.0 + c;

    let discriminant = q * q / 4.0 + p * p * p / 27.0;
    let rel_tol = (q * q / 4.0).abs().max((p * p * p / 27.0).abs()) * 1e-12;

    let mut roots = Vec::with_capacity(3);
    if discriminant > rel_tol {
        // One real root.
        let sqrt_disc = discriminant.sqrt();
        roots.push(cbrt(-q / 2.0 + sqrt_disc) + cbrt(-q / 2.0 - sqrt_disc) - shift);
    } else if discriminant > -rel_tol {
        // A repeated root: either a double + simple root, or a triple root.
        if q.abs() <= rel_tol.max(1e-300) && p.abs() <= rel_tol.max(1e-300) {
            roots.push(-shift);
        } else {
            let u = cbrt(-q / 2.0);
            roots.push(2.0 * u - shift);
            roots.push(-u - shift);
        }
    } else {
        // Three distinct real roots: trigonometric (Viete) solution.
        let r = (-p / 3.0).max(0.0).sqrt();
        let cos_arg = if r > 0.0 {
            (-q / (2.0 * r * r * r)).clamp(-1.0, 1.0)
        } else {
            0.0
        };
        let phi = cos_arg.acos();
        for k in 0..3 {
            let angle = (phi + 2.0 * std::f64::consts::PI * k as f64) / 3.0;
            roots.push(2.0 * r * angle.cos() - shift);
        }
    }
    roots.retain(|r| r.is_finite());
    roots
}

fn cbrt(x: f64) -> f64 {
    x.cbrt()
}

/// Solve `d0 + d1*x + d2*x^2 = 0` for its real roots.
pub fn real_roots_quadratic(d0: f64, d1: f64, d2: f64) -> Vec<f64> {
    let scale = d0.abs().max(d1.abs()).max(d2.abs());
    if scale == 0.0 || !scale.is_finite() {
        return Vec::new();
    }
    let tol = scale * 1e-12;

    if d2.abs() <= tol {
        if d1.abs() <= tol {
            return Vec::new();
        }
        return vec![-d0 / d1];
    }

    let disc = d1 * d1 - 4.0 * d2 * d0;
    // `disc` carries units of coefficient^2, so its zero-band must scale
    // the same way rather than by the coefficient-scaled `tol` above
    // (which is linear in the coefficients and so under-tolerant here by
    // a factor of order `scale`) — a mismatch that let slightly-negative
    // discriminants just past a true tangency register as a real root.
    let disc_scale = (d1 * d1).abs().max((4.0 * d2 * d0).abs());
    let disc_tol = disc_scale * 1e-12;
    if disc < -disc_tol {
        Vec::new()
    } else if disc < disc_tol {
        vec![-d1 / (2.0 * d2)]
    } else {
        let sq = disc.max(0.0).sqrt();
        vec![(-d1 + sq) / (2.0 * d2), (-d1 - sq) / (2.0 * d2)]
    }
}

/// Returns `true` iff `d0 + d1*x + d2*x^2 = 0` has at least one real,
/// finite root.
pub fn has_real_root_quadratic(d0: f64, d1: f64, d2: f64) -> bool {
    if !d0.is_finite() || !d1.is_finite() || !d2.is_finite() {
        return false;
    }
    !real_roots_quadratic(d0, d1, d2).is_empty()
}

//! The MT2 bisection engine (spec §4.3): a monotone bracket search on the
//! trial parent mass, dispatching at each trial to the conic-intersection
//! oracle.

use crate::ellipse::build_ellipse;
use crate::oracle::{ellipses_intersect, Feasibility};
use crate::options::Mt2Options;

/// Returned in place of a computed MT2 when no solution exists for the
/// given inputs. Any strictly negative return value has this meaning; see
/// spec §6/§7.
pub const SENTINEL: f64 = -1.0;

/// Relative floor on bracket width: `2^-45`, slightly looser than full
/// double precision so the loop always terminates. See spec §4.3.
const RELATIVE_FLOOR: f64 = 1.0 / 35_184_372_088_832.0; // 2^-45

/// Bracket expansion is capped well beyond the representable range of
/// `f64`; if the oracle is still infeasible after this many doublings the
/// input is treated as `BracketExpansionExhausted`. See spec §7.
const MAX_BRACKET_DOUBLINGS: u32 = 60;

/// Clip a mass to zero if it is negative (including `-0.0`), bit-identically
/// to the same input with that field replaced by `0.0`. See spec §3.
pub fn clip_mass(m: f64) -> f64 {
    if m <= 0.0 {
        0.0
    } else {
        m
    }
}

/// Compute the asymmetric stransverse mass MT2 for one event.
///
/// Returns a value `>= 0` on success, or [`SENTINEL`] (any negative value)
/// if no MT2 can be computed for the given inputs — for example because
/// the inputs are non-finite, or because they specify an infeasible
/// optimisation problem. See spec §3, §6, §7.
#[allow(clippy::too_many_arguments)]
pub fn mt2(
    m_vis_1: f64,
    px_vis_1: f64,
    py_vis_1: f64,
    m_vis_2: f64,
    px_vis_2: f64,
    py_vis_2: f64,
    px_miss: f64,
    py_miss: f64,
    m_invis_1: f64,
    m_invis_2: f64,
    options: Mt2Options,
) -> f64 {
    let fields = [
        m_vis_1, px_vis_1, py_vis_1, m_vis_2, px_vis_2, py_vis_2, px_miss, py_miss, m_invis_1,
        m_invis_2,
    ];
    if !fields.iter().all(|v| v.is_finite()) {
        return SENTINEL;
    }

    let m_vis_1 = clip_mass(m_vis_1);
    let m_vis_2 = clip_mass(m_vis_2);
    let m_invis_1 = clip_mass(m_invis_1);
    let m_invis_2 = clip_mass(m_invis_2);

    let feasible_at = |m: f64| -> Feasibility {
        let m_sq = m * m;
        let e1 = build_ellipse(
            m_sq,
            m_vis_1 * m_vis_1,
            -px_vis_1,
            -py_vis_1,
            m_invis_1 * m_invis_1,
            0.0,
            0.0,
        );
        let e2 = build_ellipse(
            m_sq,
            m_vis_2 * m_vis_2,
            px_vis_2,
            py_vis_2,
            m_invis_2 * m_invis_2,
            px_miss,
            py_miss,
        );
        ellipses_intersect(&e1, &e2)
    };

    // The trial mass at which each branch's visible+invisible mass sum is
    // exactly saturated is a hard lower bound: below it, no real solution
    // can exist.
    let m_lo_1 = m_vis_1 + m_invis_1;
    let m_lo_2 = m_vis_2 + m_invis_2;
    let mut m_lo = m_lo_1.max(m_lo_2);
    if !m_lo.is_finite() {
        return SENTINEL;
    }

    let p_vis_1 = px_vis_1.hypot(py_vis_1);
    let p_vis_2 = px_vis_2.hypot(py_vis_2);
    let p_miss = px_miss.hypot(py_miss);
    let momentum_scale = p_vis_1 + p_vis_2 + p_miss;

    let mut m_hi = momentum_scale.hypot(m_lo);
    if !(m_hi > m_lo) {
        m_hi = m_lo + 1.0;
    }

    let mut doublings = 0;
    while !matches!(feasible_at(m_hi), Feasibility::Feasible) {
        if doublings >= MAX_BRACKET_DOUBLINGS {
            return SENTINEL;
        }
        m_hi *= 2.0;
        if !m_hi.is_finite() {
            return SENTINEL;
        }
        doublings += 1;
    }

    if !m_lo.is_finite() || !m_hi.is_finite() {
        return SENTINEL;
    }

    let precision = options.desired_precision_on_mt2.max(0.0);

    loop {
        let width = m_hi - m_lo;
        if width <= precision {
            break;
        }
        if width <= m_hi.abs().max(m_lo.abs()) * RELATIVE_FLOOR {
            break;
        }
        let m_mid = 0.5 * (m_lo + m_hi);
        if m_mid <= m_lo || m_mid >= m_hi {
            // No further progress is representable in floating point.
            break;
        }
        match feasible_at(m_mid) {
            Feasibility::Feasible => m_hi = m_mid,
            Feasibility::Infeasible | Feasibility::Indeterminate => m_lo = m_mid,
        }
    }

    m_hi
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn clip_mass_replaces_negatives_with_positive_zero() {
        assert_eq!(clip_mass(-5.0), 0.0);
        assert_eq!(clip_mass(-0.0), 0.0);
        assert!(clip_mass(-0.0).is_sign_positive());
        assert_eq!(clip_mass(0.0), 0.0);
        assert_eq!(clip_mass(3.0), 3.0);
    }

    #[test]
    fn non_finite_inputs_yield_sentinel() {
        let options = Mt2Options::default();
        let v = mt2(
            f64::NAN,
            410.0,
            20.0,
            150.0,
            -210.0,
            -300.0,
            -200.0,
            280.0,
            100.0,
            100.0,
            options,
        );
        assert!(v < 0.0);
    }

    #[test]
    fn simple_example_matches_reference_value() {
        let options = Mt2Options::default();
        let v = mt2(
            100.0, 410.0, 20.0, 150.0, -210.0, -300.0, -200.0, 280.0, 100.0, 100.0, options,
        );
        assert_relative_eq!(v, 412.627668458219, epsilon = 1e-9);
    }

    #[test]
    fn negative_masses_are_clipped_bit_identically() {
        let options = Mt2Options::default();
        let with_negative = mt2(
            1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, -90.0, -100.0, options,
        );
        let with_zero = mt2(1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 0.0, 0.0, options);
        let with_neg_zero = mt2(
            1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, -0.0, -0.0, options,
        );
        assert_eq!(with_negative, with_zero);
        assert_eq!(with_zero, with_neg_zero);
    }

    #[test]
    fn bracket_stays_monotone_around_the_answer() {
        let options = Mt2Options::default();
        let args = (
            100.0_f64, 410.0, 20.0, 150.0, -210.0, -300.0, -200.0, 280.0, 100.0, 100.0,
        );
        let value = mt2(
            args.0, args.1, args.2, args.3, args.4, args.5, args.6, args.7, args.8, args.9,
            options,
        );
        assert!(value > 0.0);

        let below = value * 0.999;
        let above = value * 1.001;

        let ellipses_at = |m: f64| {
            crate::ellipse::make_ellipses(
                m, args.0, args.1, args.2, args.3, args.4, args.5, args.6, args.7, args.8, args.9,
            )
        };
        let (e1_below, e2_below) = ellipses_at(below);
        let (e1_above, e2_above) = ellipses_at(above);
        assert_eq!(
            ellipses_intersect(&e1_below, &e2_below),
            Feasibility::Infeasible
        );
        assert_eq!(
            ellipses_intersect(&e1_above, &e2_above),
            Feasibility::Feasible
        );
    }
}

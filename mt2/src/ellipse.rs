//! Pure formulas mapping physical quantities to the coefficients of a
//! general conic in the invisible-momentum plane. See spec §4.1.

use nalgebra::Matrix3;

/// Coefficients of a general conic
///
/// `c_xx x² + 2 c_xy x y + c_yy y² + 2 c_x x + 2 c_y y + c = 0`
///
/// in the plane of one invisible particle's transverse momentum.
/// Notation follows the matrix representation of conic sections
/// (<https://en.wikipedia.org/wiki/Matrix_representation_of_conic_sections>).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipse {
    pub c_xx: f64,
    pub c_yy: f64,
    pub c_xy: f64,
    pub c_x: f64,
    pub c_y: f64,
    pub c: f64,
}

impl Ellipse {
    /// The symmetric 3x3 matrix representation of this conic.
    pub fn matrix(&self) -> Matrix3<f64> {
        Matrix3::new(
            self.c_xx, self.c_xy, self.c_x, self.c_xy, self.c_yy, self.c_y, self.c_x, self.c_y,
            self.c,
        )
    }

    /// Determinant of the upper-left 2x2 block of the conic matrix.
    pub fn det_a33(&self) -> f64 {
        self.c_xx * self.c_yy - self.c_xy * self.c_xy
    }

    /// Determinant of the full 3x3 conic matrix.
    pub fn det_a(&self) -> f64 {
        self.matrix().determinant()
    }

    /// Whether this conic represents a non-degenerate real ellipse.
    pub fn is_non_degenerate_real_ellipse(&self) -> bool {
        let det_a33 = self.det_a33();
        if det_a33 < 0.0 {
            return false;
        }
        let det_a = self.det_a();
        if det_a == 0.0 {
            return false;
        }
        (self.c_xx + self.c_yy) * det_a < 0.0
    }

    /// The centre of this conic section, undefined (division by ~zero) for
    /// degenerate conics with `det_a33 == 0`.
    pub fn centre(&self) -> (f64, f64) {
        let det_a33 = self.det_a33();
        (
            (self.c_xy * self.c_y - self.c_yy * self.c_x) / det_a33,
            (self.c_xy * self.c_x - self.c_xx * self.c_y) / det_a33,
        )
    }
}

/// Build a transverse-mass ellipse from physical quantities.
///
/// `m_sq` is the trial parent squared mass, `mt_sq` the visible squared
/// mass, `(tx, ty)` the visible transverse momentum, `mq_sq` the invisible
/// squared mass and `(qx, qy)` the invisible offset.
#[allow(clippy::many_single_char_names)]
pub fn build_ellipse(m_sq: f64, mt_sq: f64, tx: f64, ty: f64, mq_sq: f64, qx: f64, qy: f64) -> Ellipse {
    let tx_sq = tx * tx;
    let ty_sq = ty * ty;
    let qx_sq = qx * qx;
    let qy_sq = qy * qy;

    let c_xx = 4.0 * mt_sq + 4.0 * ty_sq;
    let c_yy = 4.0 * mt_sq + 4.0 * tx_sq;
    let c_xy = -4.0 * tx * ty;

    let c_x = -4.0 * mt_sq * qx - 2.0 * mq_sq * tx + 2.0 * m_sq * tx - 2.0 * mt_sq * tx
        + 4.0 * qy * tx * ty
        - 4.0 * qx * ty_sq;

    let c_y = -4.0 * mt_sq * qy - 4.0 * qy * tx_sq - 2.0 * mq_sq * ty + 2.0 * m_sq * ty
        - 2.0 * mt_sq * ty
        + 4.0 * qx * tx * ty;

    let c = -mq_sq * mq_sq + 2.0 * mq_sq * m_sq - m_sq * m_sq + 2.0 * mq_sq * mt_sq
        + 2.0 * m_sq * mt_sq
        - mt_sq * mt_sq
        + 4.0 * mt_sq * qx_sq
        + 4.0 * mt_sq * qy_sq
        + 4.0 * mq_sq * qx * tx
        - 4.0 * m_sq * qx * tx
        + 4.0 * mt_sq * qx * tx
        + 4.0 * mq_sq * tx_sq
        + 4.0 * qy_sq * tx_sq
        + 4.0 * mq_sq * qy * ty
        - 4.0 * m_sq * qy * ty
        + 4.0 * mt_sq * qy * ty
        - 8.0 * qx * qy * tx * ty
        + 4.0 * mq_sq * ty_sq
        + 4.0 * qx_sq * ty_sq;

    Ellipse {
        c_xx,
        c_yy,
        c_xy,
        c_x,
        c_y,
        c,
    }
}

/// Build the pair of transverse-mass ellipses for a proposed MT2 value and
/// the ten scalar kinematic fields.
///
/// This is the diagnostic entry point of spec §6: external plotting tools
/// can use the returned coefficients to visualise the feasibility region
/// without reaching into the bisection engine.
#[allow(clippy::too_many_arguments)]
pub fn make_ellipses(
    proposed_mt2: f64,
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
) -> (Ellipse, Ellipse) {
    let m_sq = proposed_mt2 * proposed_mt2;
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
    (e1, e2)
}

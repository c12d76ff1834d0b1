//! The batched evaluation harness (spec §4.4): vectorise the scalar engine
//! over broadcastable input arrays, writing results into a caller-supplied
//! (or freshly allocated) output buffer.

use ndarray::{ArrayD, ArrayViewD, IxDyn};

use crate::bisect::mt2;
use crate::error::Mt2Error;
use crate::options::Mt2Options;

/// Compute MT2 elementwise over ten broadcastable input arrays.
///
/// `options` applies uniformly to every element (the original library's
/// `desired_precision_on_mt2`/`use_deci_sections_initially` fields are
/// themselves broadcastable per-event arrays; this crate treats them as a
/// single scalar configuration shared by the whole batch, which covers the
/// overwhelming majority of real usage — see `DESIGN.md`).
///
/// If `out` is provided, its shape must match the broadcast shape of the
/// inputs; it is overwritten in place and returned. Otherwise a fresh
/// buffer is allocated.
///
/// Iteration order is unspecified and elements are independent: with the
/// `rayon` feature enabled, elements are computed in parallel.
#[allow(clippy::too_many_arguments)]
pub fn mt2_batched(
    m_vis_1: ArrayViewD<'_, f64>,
    px_vis_1: ArrayViewD<'_, f64>,
    py_vis_1: ArrayViewD<'_, f64>,
    m_vis_2: ArrayViewD<'_, f64>,
    px_vis_2: ArrayViewD<'_, f64>,
    py_vis_2: ArrayViewD<'_, f64>,
    px_miss: ArrayViewD<'_, f64>,
    py_miss: ArrayViewD<'_, f64>,
    m_invis_1: ArrayViewD<'_, f64>,
    m_invis_2: ArrayViewD<'_, f64>,
    options: Mt2Options,
    out: Option<ArrayD<f64>>,
) -> Result<ArrayD<f64>, Mt2Error> {
    let inputs = [
        m_vis_1.shape(),
        px_vis_1.shape(),
        py_vis_1.shape(),
        m_vis_2.shape(),
        px_vis_2.shape(),
        py_vis_2.shape(),
        px_miss.shape(),
        py_miss.shape(),
        m_invis_1.shape(),
        m_invis_2.shape(),
    ];
    let shape = broadcast_shape(&inputs)?;
    let dim = IxDyn(&shape);

    let broadcast = |a: &ArrayViewD<'_, f64>| -> Result<ArrayD<f64>, Mt2Error> {
        a.broadcast(dim.clone())
            .map(|v| v.to_owned())
            .ok_or(Mt2Error::ShapeMismatch)
    };

    let m_vis_1 = broadcast(&m_vis_1)?;
    let px_vis_1 = broadcast(&px_vis_1)?;
    let py_vis_1 = broadcast(&py_vis_1)?;
    let m_vis_2 = broadcast(&m_vis_2)?;
    let px_vis_2 = broadcast(&px_vis_2)?;
    let py_vis_2 = broadcast(&py_vis_2)?;
    let px_miss = broadcast(&px_miss)?;
    let py_miss = broadcast(&py_miss)?;
    let m_invis_1 = broadcast(&m_invis_1)?;
    let m_invis_2 = broadcast(&m_invis_2)?;

    let mut out = match out {
        Some(buf) => {
            if buf.shape() != shape.as_slice() {
                return Err(Mt2Error::OutputShapeMismatch {
                    out: buf.shape().to_vec(),
                    expected: shape,
                });
            }
            buf
        }
        None => ArrayD::zeros(dim.clone()),
    };

    let indices = multi_indices(&shape);

    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        let results: Vec<f64> = indices
            .par_iter()
            .map(|idx| {
                let idx = idx.as_slice();
                mt2(
                    m_vis_1[idx],
                    px_vis_1[idx],
                    py_vis_1[idx],
                    m_vis_2[idx],
                    px_vis_2[idx],
                    py_vis_2[idx],
                    px_miss[idx],
                    py_miss[idx],
                    m_invis_1[idx],
                    m_invis_2[idx],
                    options,
                )
            })
            .collect();
        for (idx, value) in indices.iter().zip(results) {
            out[idx.as_slice()] = value;
        }
    }

    #[cfg(not(feature = "rayon"))]
    {
        for idx in &indices {
            let idx = idx.as_slice();
            out[idx] = mt2(
                m_vis_1[idx],
                px_vis_1[idx],
                py_vis_1[idx],
                m_vis_2[idx],
                px_vis_2[idx],
                py_vis_2[idx],
                px_miss[idx],
                py_miss[idx],
                m_invis_1[idx],
                m_invis_2[idx],
                options,
            );
        }
    }

    Ok(out)
}

/// Enumerate every multi-index of an array with the given shape, in
/// row-major (C) order.
fn multi_indices(shape: &[usize]) -> Vec<Vec<usize>> {
    let mut result: Vec<Vec<usize>> = vec![Vec::new()];
    for &dim in shape {
        let mut next = Vec::with_capacity(result.len().saturating_mul(dim));
        for idx in &result {
            for k in 0..dim {
                let mut v = idx.clone();
                v.push(k);
                next.push(v);
            }
        }
        result = next;
    }
    result
}

/// Compute the common broadcast shape of a set of array shapes, following
/// standard (numpy-style) broadcasting rules: dimensions are compared from
/// the trailing axis inward, and are compatible if equal or if either is 1.
fn broadcast_shape(shapes: &[&[usize]]) -> Result<Vec<usize>, Mt2Error> {
    let ndim = shapes.iter().map(|s| s.len()).max().unwrap_or(0);
    let mut out = vec![1usize; ndim];
    for shape in shapes {
        let offset = ndim - shape.len();
        for (i, &dim) in shape.iter().enumerate() {
            let o = offset + i;
            if out[o] == 1 {
                out[o] = dim;
            } else if dim != 1 && dim != out[o] {
                return Err(Mt2Error::ShapeMismatch);
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, IxDyn};

    #[test]
    fn broadcasts_column_and_row_vectors() {
        let n = 20;
        let values: Vec<f64> = (0..n).map(|i| 10.0 + i as f64 * 10.0).collect();
        let mass_1 = Array2::from_shape_fn((n, 1), |(i, _)| values[i]);
        let mass_2 = Array2::from_shape_fn((1, n), |(_, j)| values[j]);
        let scalar = Array2::from_elem((1, 1), 0.0);

        let out = mt2_batched(
            mass_1.into_dyn().view(),
            scalar.clone().into_dyn().view(),
            scalar.clone().into_dyn().view(),
            mass_2.into_dyn().view(),
            scalar.clone().into_dyn().view(),
            scalar.clone().into_dyn().view(),
            scalar.clone().into_dyn().view(),
            scalar.clone().into_dyn().view(),
            scalar.clone().into_dyn().view(),
            scalar.into_dyn().view(),
            Mt2Options::default(),
            None,
        )
        .unwrap();

        assert_eq!(out.shape(), &[n, n]);
        assert!(out.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn incompatible_shapes_are_rejected() {
        let a = ndarray::Array1::from_elem(3, 1.0).into_dyn();
        let b = ndarray::Array1::from_elem(4, 1.0).into_dyn();
        let scalar = ndarray::Array0::from_elem(IxDyn(&[]), 0.0);

        let err = mt2_batched(
            a.view(),
            b.view(),
            scalar.view(),
            scalar.view(),
            scalar.view(),
            scalar.view(),
            scalar.view(),
            scalar.view(),
            scalar.view(),
            scalar.view(),
            Mt2Options::default(),
            None,
        )
        .unwrap_err();
        assert_eq!(err, Mt2Error::ShapeMismatch);
    }

    #[test]
    fn output_buffer_is_reused_and_shape_checked() {
        let a = ndarray::Array1::from_elem(5, 100.0).into_dyn();
        let scalar = ndarray::Array0::from_elem(IxDyn(&[]), 0.0);
        let wrong_out = ndarray::ArrayD::zeros(IxDyn(&[6]));

        let err = mt2_batched(
            a.view(),
            scalar.view(),
            scalar.view(),
            scalar.view(),
            scalar.view(),
            scalar.view(),
            scalar.view(),
            scalar.view(),
            scalar.view(),
            scalar.view(),
            Mt2Options::default(),
            Some(wrong_out),
        )
        .unwrap_err();
        assert!(matches!(err, Mt2Error::OutputShapeMismatch { .. }));
    }
}

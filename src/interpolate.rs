//! Pure interpolation kernels over axis/value arrays.
//!
//! All kernels clamp to the first/last sample outside the tabulated range
//! instead of extrapolating.

use ndarray::ArrayView1;
use thiserror::Error;

/// A 1-d sampled curve as (abscissae, ordinates).
pub type Curve<'a> = (ArrayView1<'a, f64>, ArrayView1<'a, f64>);

#[derive(Debug, Error)]
pub enum InterpError {
    #[error("interpolation axis needs at least 2 points, got {0}")]
    AxisTooSmall(usize),
    #[error("{0}")]
    Domain(String),
}

/// Slopes below this magnitude are treated as flat when building
/// monotonic cubic derivatives.
const FLAT_SLOPE: f64 = 1e-12;

/// Index of the lower cell bound on a rising axis: the largest `i` with
/// `axis[i] <= value`, clamped to `[0, len - 2]` for out of range values.
pub fn lower_index(axis: ArrayView1<f64>, value: f64) -> Result<usize, InterpError> {
    if axis.len() < 2 {
        return Err(InterpError::AxisTooSmall(axis.len()));
    }
    let mut idx = 0;
    for i in 0..axis.len() - 1 {
        if axis[i] <= value {
            idx = i;
        } else {
            break;
        }
    }
    Ok(idx)
}

/// Linear interpolation on a 1-d sampled curve.
///
/// A single sample curve is constant; queries outside the tabulated range
/// return the first/last ordinate.
pub fn linear(x: f64, xs: ArrayView1<f64>, ys: ArrayView1<f64>) -> Result<f64, InterpError> {
    if xs.is_empty() || xs.len() != ys.len() {
        return Err(InterpError::Domain(format!(
            "need matching non-empty axes, got {} abscissae and {} ordinates",
            xs.len(),
            ys.len()
        )));
    }
    if xs.len() == 1 || x <= xs[0] {
        return Ok(ys[0]);
    }
    let last = xs.len() - 1;
    if x >= xs[last] {
        return Ok(ys[last]);
    }
    // unique i with xs[i] < x <= xs[i + 1]
    let mut i = 0;
    while xs[i + 1] < x {
        i += 1;
    }
    Ok(ys[i] + (x - xs[i]) * (ys[i + 1] - ys[i]) / (xs[i + 1] - xs[i]))
}

/// interpolation between two scalar samples
fn lerp(x: f64, x0: f64, x1: f64, y0: f64, y1: f64) -> f64 {
    y0 + (x - x0) * (y1 - y0) / (x1 - x0)
}

/// Bilinear interpolation on a family of 1-d curves along a rising outer
/// axis (e.g. per-mach alpha curves).
///
/// The outer value is clamped to the axis range; the bracketing pair of
/// curves is evaluated at `x` and blended linearly.
pub fn bilinear(
    outer: f64,
    x: f64,
    outer_axis: ArrayView1<f64>,
    curves: &[Curve<'_>],
) -> Result<f64, InterpError> {
    if outer_axis.len() != curves.len() || curves.is_empty() {
        return Err(InterpError::Domain(format!(
            "need one curve per outer sample, got {} samples and {} curves",
            outer_axis.len(),
            curves.len()
        )));
    }
    if curves.len() == 1 {
        return linear(x, curves[0].0, curves[0].1);
    }
    let outer = outer.clamp(outer_axis[0], outer_axis[outer_axis.len() - 1]);
    let i = lower_index(outer_axis, outer)?;
    let lo = linear(x, curves[i].0, curves[i].1)?;
    let hi = linear(x, curves[i + 1].0, curves[i + 1].1)?;
    Ok(lerp(outer, outer_axis[i], outer_axis[i + 1], lo, hi))
}

/// Trilinear interpolation: one level above [`bilinear`], with a rising
/// outermost axis (e.g. Reynolds number) over bilinear blocks.
pub fn trilinear(
    outer: f64,
    mid: f64,
    x: f64,
    outer_axis: ArrayView1<f64>,
    blocks: &[(ArrayView1<'_, f64>, Vec<Curve<'_>>)],
) -> Result<f64, InterpError> {
    if outer_axis.len() != blocks.len() || blocks.is_empty() {
        return Err(InterpError::Domain(format!(
            "need one block per outer sample, got {} samples and {} blocks",
            outer_axis.len(),
            blocks.len()
        )));
    }
    if blocks.len() == 1 {
        return bilinear(mid, x, blocks[0].0, &blocks[0].1);
    }
    let outer = outer.clamp(outer_axis[0], outer_axis[outer_axis.len() - 1]);
    let i = lower_index(outer_axis, outer)?;
    let lo = bilinear(mid, x, blocks[i].0, &blocks[i].1)?;
    let hi = bilinear(mid, x, blocks[i + 1].0, &blocks[i + 1].1)?;
    Ok(lerp(outer, outer_axis[i], outer_axis[i + 1], lo, hi))
}

/// Monotonic cubic interpolation (harmonic-mean derivatives with cubic
/// Hermite evaluation). Overshoot-free on monotonic data, used for smooth
/// spanwise blade quantities.
///
/// Needs at least 3 sample points; queries outside the tabulated range are
/// clamped to the endpoint ordinates.
pub fn monotonic_cubic(
    x: f64,
    xs: ArrayView1<f64>,
    ys: ArrayView1<f64>,
) -> Result<f64, InterpError> {
    let n = xs.len();
    if n < 3 || ys.len() != n {
        return Err(InterpError::Domain(format!(
            "monotonic cubic needs at least 3 matching points, got {} and {}",
            n,
            ys.len()
        )));
    }
    if x <= xs[0] {
        return Ok(ys[0]);
    }
    if x >= xs[n - 1] {
        return Ok(ys[n - 1]);
    }

    // secant slopes between neighbouring samples
    let m: Vec<f64> = (0..n - 1)
        .map(|i| (ys[i + 1] - ys[i]) / (xs[i + 1] - xs[i]))
        .collect();

    let mut d = vec![0.0; n];
    d[0] = m[0];
    d[n - 1] = m[n - 2];
    for i in 1..n - 1 {
        let (prev, next) = (m[i - 1], m[i]);
        if prev.signum() != next.signum() || prev.abs() < FLAT_SLOPE || next.abs() < FLAT_SLOPE {
            d[i] = 0.0;
        } else {
            d[i] = 2.0 / (1.0 / prev + 1.0 / next);
        }
    }

    let mut i = 0;
    while xs[i + 1] < x {
        i += 1;
    }
    let h = xs[i + 1] - xs[i];
    let s = (x - xs[i]) / h;
    let h00 = (1.0 + 2.0 * s) * (1.0 - s).powi(2);
    let h10 = s * (1.0 - s).powi(2);
    let h01 = s.powi(2) * (3.0 - 2.0 * s);
    let h11 = s.powi(2) * (s - 1.0);
    Ok(h00 * ys[i] + h10 * h * d[i] + h01 * ys[i + 1] + h11 * h * d[i + 1])
}

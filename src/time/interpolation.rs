//! Linear-in-time interpolation of cell fields.

use crate::error::{Result, TransportError};

/// Interpolate between two snapshots of a cell field.
///
/// Writes `out = (1 - a) * v0 + a * v1` with `a = dt_int / dt`. The blend is
/// written so that `dt_int == 0` reproduces `v0` and `dt_int == dt`
/// reproduces `v1` bit for bit.
///
/// # Arguments
/// * `v0` - Field at the start of the flow interval
/// * `v1` - Field at the end of the flow interval
/// * `dt_int` - Elapsed time since the start of the interval
/// * `dt` - Length of the flow interval (must be positive)
/// * `out` - Destination, same length as the inputs
pub fn interpolate_cell_vector(
    v0: &[f64],
    v1: &[f64],
    dt_int: f64,
    dt: f64,
    out: &mut [f64],
) -> Result<()> {
    TransportError::check_len("interpolation end snapshot", v0.len(), v1.len())?;
    TransportError::check_len("interpolation output", v0.len(), out.len())?;
    if !(dt > 0.0) {
        return Err(TransportError::stability(
            dt,
            "saturation interpolation interval must be positive",
        ));
    }

    let a = dt_int / dt;
    let b = 1.0 - a;
    for ((o, x0), x1) in out.iter_mut().zip(v0).zip(v1) {
        *o = b * x0 + a * x1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_are_exact() {
        let v0 = [0.1, 0.3, 0.77];
        let v1 = [0.7, 0.9, 0.13];
        let mut out = [0.0; 3];

        interpolate_cell_vector(&v0, &v1, 0.0, 3.7, &mut out).unwrap();
        assert_eq!(out, v0);

        interpolate_cell_vector(&v0, &v1, 3.7, 3.7, &mut out).unwrap();
        assert_eq!(out, v1);
    }

    #[test]
    fn test_midpoint() {
        let mut out = [0.0; 1];
        interpolate_cell_vector(&[0.2], &[0.6], 1.0, 2.0, &mut out).unwrap();
        assert!((out[0] - 0.4).abs() < 1e-15);
    }

    #[test]
    fn test_rejects_bad_input() {
        let mut out = [0.0; 2];
        assert!(interpolate_cell_vector(&[0.0, 1.0], &[1.0], 0.5, 1.0, &mut out).is_err());
        assert!(interpolate_cell_vector(&[0.0, 1.0], &[1.0, 1.0], 0.5, 0.0, &mut out).is_err());
    }
}

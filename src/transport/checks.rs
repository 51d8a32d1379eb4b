//! Internal consistency checks run after sub-cycles.

use crate::error::{Result, TransportError};
use crate::parallel::Communicator;
use crate::state::ComponentField;
use crate::types::ComponentIndex;

/// Relative tolerance below zero accepted as round-off.
pub const NEGATIVE_TOLERANCE: f64 = 1e-12;

/// Check that the advected components are non-negative on owned cells.
///
/// Values down to `-NEGATIVE_TOLERANCE × max(1, max |c|)` are accepted as
/// round-off. The minimum is reduced over all partitions so every partition
/// reaches the same verdict.
pub fn check_non_negative(
    field: &ComponentField,
    num_advect: usize,
    comm: &dyn Communicator,
) -> Result<()> {
    for k in ComponentIndex::iter(num_advect) {
        let owned = field.owned(k);
        let (cell, local_min) = owned
            .iter()
            .copied()
            .enumerate()
            .fold((0, f64::INFINITY), |best, (c, v)| if v < best.1 { (c, v) } else { best });
        let scale = comm.max_all(owned.iter().fold(1.0_f64, |m, v| m.max(v.abs())));
        let global_min = comm.min_all(local_min);

        if global_min < -NEGATIVE_TOLERANCE * scale || global_min.is_nan() {
            return Err(TransportError::Conservation {
                component: k.get(),
                cell,
                value: global_min,
            });
        }
    }
    Ok(())
}

/// Report a conservation fault.
///
/// The fault is always logged. Builds with debug assertions return it as an
/// error; release builds continue with the diagnostic only.
pub fn report_fault(fault: TransportError) -> Result<()> {
    log::warn!("{}", fault);
    if cfg!(debug_assertions) {
        Err(fault)
    } else {
        Ok(())
    }
}

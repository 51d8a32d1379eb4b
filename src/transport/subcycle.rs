//! Sub-cycling of a macro step into stable explicit cycles.
//!
//! The controller walks `[t_old, t_new]` in sub-cycles no longer than the
//! stable step. It only decides cycle sizes and tracks its phase; the
//! transport kernel performs the work of each cycle.
//!
//! ```text
//! Init ──▶ Running ──▶ FinalCycle ──▶ Done
//!             │             │
//!             └──────┬──────┘
//!                    ▼
//!                 Failed
//! ```

use crate::config::TailPolicy;

/// Relative tolerance used to decide that the remaining time fits in one cycle.
pub const TAIL_TOLERANCE: f64 = 1e-14;

/// Phase of the sub-cycle controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControllerPhase {
    /// Created, no cycle issued yet.
    Init,
    /// Issuing regular cycles.
    Running,
    /// The last issued cycle closes the macro step.
    FinalCycle,
    /// The macro step is fully covered.
    Done,
    /// A cycle reported a fault; no more cycles are issued.
    Failed,
}

/// One sub-cycle issued by the controller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SubCycle {
    /// Zero-based cycle number.
    pub index: usize,
    /// Physical time at the start of the cycle.
    pub t_start: f64,
    /// Cycle length.
    pub dt: f64,
    /// Time elapsed since the start of the macro step at the end of the cycle.
    pub elapsed: f64,
    /// Whether this cycle closes the macro step.
    pub final_cycle: bool,
}

impl SubCycle {
    /// Physical time at the end of the cycle.
    #[inline]
    pub fn t_end(&self) -> f64 {
        self.t_start + self.dt
    }

    /// Physical time at the middle of the cycle.
    #[inline]
    pub fn t_mid(&self) -> f64 {
        self.t_start + self.dt / 2.0
    }
}

/// Size of the next cycle given the remaining time.
///
/// Returns the cycle length and whether it is the final one.
///
/// With [`TailPolicy::Balanced`], once less than two stable steps remain the
/// remainder is split in two equal cycles, so the last cycle is never much
/// smaller than the others. With [`TailPolicy::Remainder`], stable steps are
/// taken until at most one remains, which then forms the last cycle.
pub fn next_cycle_size(
    remaining: f64,
    dt_stable: f64,
    t_new: f64,
    policy: TailPolicy,
) -> (f64, bool) {
    let tol = TAIL_TOLERANCE * (remaining + dt_stable).max(t_new.abs());

    match policy {
        TailPolicy::Balanced => {
            if remaining >= 2.0 * dt_stable {
                (dt_stable, false)
            } else if remaining > dt_stable + tol {
                (remaining / 2.0, false)
            } else {
                (remaining, true)
            }
        }
        TailPolicy::Remainder => {
            if remaining > dt_stable + tol {
                (dt_stable, false)
            } else {
                (remaining, true)
            }
        }
    }
}

/// State machine issuing the sub-cycles of one macro step.
#[derive(Clone, Debug)]
pub struct SubcycleController {
    phase: ControllerPhase,
    policy: TailPolicy,
    t_physics: f64,
    t_new: f64,
    dt_mpc: f64,
    dt_stable: f64,
    dt_sum: f64,
    n_cycles: usize,
}

impl SubcycleController {
    /// Create a controller for `[t_old, t_new]` with a stable step.
    pub fn new(t_old: f64, t_new: f64, dt_stable: f64, policy: TailPolicy) -> Self {
        Self {
            phase: ControllerPhase::Init,
            policy,
            t_physics: t_old,
            t_new,
            dt_mpc: t_new - t_old,
            dt_stable,
            dt_sum: 0.0,
            n_cycles: 0,
        }
    }

    /// Issue the next cycle, or `None` once the macro step is covered or failed.
    pub fn next_cycle(&mut self) -> Option<SubCycle> {
        match self.phase {
            ControllerPhase::Done | ControllerPhase::Failed => return None,
            ControllerPhase::FinalCycle => {
                self.phase = ControllerPhase::Done;
                return None;
            }
            ControllerPhase::Init | ControllerPhase::Running => {}
        }

        let remaining = self.dt_mpc - self.dt_sum;
        let (dt, final_cycle) = next_cycle_size(remaining, self.dt_stable, self.t_new, self.policy);

        let cycle = SubCycle {
            index: self.n_cycles,
            t_start: self.t_physics,
            dt,
            elapsed: self.dt_sum + dt,
            final_cycle,
        };

        self.t_physics += dt;
        self.dt_sum += dt;
        self.n_cycles += 1;
        self.phase = if final_cycle {
            ControllerPhase::FinalCycle
        } else {
            ControllerPhase::Running
        };
        Some(cycle)
    }

    /// Mark the macro step as failed.
    pub fn fail(&mut self) {
        self.phase = ControllerPhase::Failed;
    }

    /// Current phase.
    pub fn phase(&self) -> ControllerPhase {
        self.phase
    }

    /// Number of cycles issued so far.
    pub fn n_cycles(&self) -> usize {
        self.n_cycles
    }

    /// Stable step the controller was created with.
    pub fn dt_stable(&self) -> f64 {
        self.dt_stable
    }

    /// Time covered so far.
    pub fn dt_sum(&self) -> f64 {
        self.dt_sum
    }
}

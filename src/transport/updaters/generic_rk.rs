//! Generic explicit Runge-Kutta update, one component at a time.

use crate::error::{Result, TransportError};
use crate::state::ComponentField;
use crate::time::{ExplicitRungeKutta, IntegratorInfo, RkMethod};
use crate::transport::advection::advective_mass_rate;
use crate::transport::balance::MassBalance;

use super::{CycleContext, CycleUpdater};

/// Runge-Kutta integration of the stored mass of each advected component.
///
/// The integrated state is `V phi ws c` on owned cells. At a stage time
/// `t + a dt` the saturation is taken as `(1 - a) ws_start + a ws_end`, the
/// stage concentration is recovered from the stage mass and exchanged with
/// the ghost layer before the advective rate is evaluated. Since every stage
/// rate is conservative and the weights sum to one, the update conserves
/// mass for every tableau.
#[derive(Clone, Debug)]
pub struct GenericRungeKutta {
    rk: ExplicitRungeKutta,
}

impl GenericRungeKutta {
    /// Create the updater for a Runge-Kutta method.
    pub fn new(method: RkMethod) -> Self {
        Self {
            rk: ExplicitRungeKutta::new(method),
        }
    }

    /// The method in use.
    pub fn method(&self) -> RkMethod {
        self.rk.method()
    }
}

impl CycleUpdater for GenericRungeKutta {
    fn name(&self) -> &'static str {
        self.rk.name()
    }

    fn advance_one_cycle(
        &mut self,
        ctx: &CycleContext<'_>,
        prev: &mut ComponentField,
        next: &mut ComponentField,
        balance: &mut MassBalance,
    ) -> Result<()> {
        let layout = ctx.mesh.cell_layout();
        let n_owned = layout.n_owned;
        let n_total = layout.n_total();
        let dt = ctx.dt;
        ctx.comm.scatter_field(prev)?;

        let (sources, totals) = ctx.source_rates(prev);
        let weights = self.rk.weights();

        for k in ctx.advected() {
            let c_prev = prev.component(k);
            let src = sources.component(k);
            let mut mass: Vec<f64> = (0..n_total)
                .map(|c| {
                    if c < n_owned {
                        c_prev[c] * ctx.pore_volume(c, ctx.ws_start)
                    } else {
                        0.0
                    }
                })
                .collect();

            let mut conc = vec![0.0; n_total];
            let mut stage = 0;
            self.rk
                .try_step(&mut mass, dt, 0.0, |m: &Vec<f64>, tau| -> Result<Vec<f64>> {
                    let a = tau / dt;
                    for c in 0..n_owned {
                        let ws = (1.0 - a) * ctx.ws_start[c] + a * ctx.ws_end[c];
                        conc[c] = m[c] / (ctx.mesh.cell_volume(c) * ctx.porosity[c] * ws);
                    }
                    ctx.comm.scatter_to_ghosts(layout, &mut conc)?;

                    let mut rate = vec![0.0; n_total];
                    let net = advective_mass_rate(ctx, k, &conc, &mut rate)?;
                    balance.add_boundary(k.get(), weights[stage] * dt * net);
                    stage += 1;

                    for (r, s) in rate[..n_owned].iter_mut().zip(src) {
                        *r += s;
                    }
                    Ok(rate)
                })?;
            debug_assert_eq!(stage, self.rk.n_stages());

            let c_next = next.component_mut(k);
            for c in 0..n_owned {
                c_next[c] = mass[c] / ctx.pore_volume(c, ctx.ws_end);
                if !c_next[c].is_finite() {
                    return Err(TransportError::Conservation {
                        component: k.get(),
                        cell: c,
                        value: c_next[c],
                    });
                }
            }
            c_next[n_owned..].iter_mut().for_each(|v| *v = 0.0);
        }

        balance.add_source(&totals, dt);
        Ok(())
    }
}

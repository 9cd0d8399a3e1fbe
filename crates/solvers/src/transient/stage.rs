use strand_core::{Channels, Integrator, Scheduler, StepContext, tally_votes};

use super::Error;

/// Fires every state-transition unit once, in schedule order.
pub(crate) fn fire_state_transition<S>(
    scheduler: &mut S,
    time: f64,
    integrators: &mut [Integrator],
) -> Result<(), Error>
where
    S: Scheduler + ?Sized,
{
    for unit in scheduler.state_transition_actors() {
        unit.fire(time, &mut Channels::new(integrators))
            .map_err(|source| Error::Transition { time, source })?;
    }
    Ok(())
}

/// Fires every dynamic-stage integrator once and returns the round's tally.
///
/// Inputs are checked before any integrator fires, so a bad derivative leaves
/// the round untouched. All integrators fire even after a dissenting vote.
pub(crate) fn fire_dynamic<S, F>(
    scheduler: &S,
    integrators: &mut [Integrator],
    mut fire: F,
) -> Result<bool, Error>
where
    S: Scheduler + ?Sized,
    F: FnMut(&mut Integrator) -> bool,
{
    let order = scheduler.dynamic_actors();

    for &index in order {
        let value = integrators[index].input();
        if !value.is_finite() {
            return Err(Error::InvalidDerivative { index, value });
        }
    }

    Ok(tally_votes(
        order.iter().map(|&index| fire(&mut integrators[index])),
    ))
}

/// Fires one full round: the state-transition stage at the context's time,
/// then the dynamic stage.
///
/// The round counter is incremented afterwards. Returns the vote tally; the
/// caller decides what convergence means for its method.
pub(crate) fn fire_round<S, F>(
    ctx: &mut StepContext,
    integrators: &mut [Integrator],
    scheduler: &mut S,
    mut fire: F,
) -> Result<bool, Error>
where
    S: Scheduler + ?Sized,
    F: FnMut(&mut Integrator, &StepContext) -> bool,
{
    fire_state_transition(scheduler, ctx.time(), integrators)?;

    let view: &StepContext = ctx;
    let tally = fire_dynamic(scheduler, integrators, |integrator| fire(integrator, view))?;

    ctx.round_mut().increment();
    log::trace!(
        "round {} at t = {}: converged = {tally}",
        ctx.round().count(),
        ctx.time()
    );

    Ok(tally)
}

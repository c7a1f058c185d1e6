use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use rand::rngs::StdRng;
use rand::Rng;
use stampede_core::prelude::{BrowserDriver, BrowserSession, DriverError};

use crate::context::UserContext;
use crate::user::{panic_message, SimulationError, StepOutcome, UserResult, VirtualUser};

/// Drive one virtual user through the whole workflow and return its terminal result.
///
/// Failures never escape as errors. They end up in the returned [UserResult] so that one user
/// cannot affect another. A launched session is closed exactly once whatever happens, including
/// when the user's deadline passes, the run is shut down or the workflow panics.
pub fn run_user<D: BrowserDriver>(ctx: &UserContext, driver: &D) -> UserResult {
    let mut user = VirtualUser::new(ctx.user_id());
    let mut rng = ctx.rng();

    user.start();
    log::info!("User {} starting test...", ctx.user_id());

    let outcome: Result<(), SimulationError> = ctx.runner_context().executor().block_on(async {
        // Never raced against the deadline. A launch dropped mid request leaves a session on the
        // server that nothing closes. The driver bounds how long a launch can take.
        let mut session = match ctx
            .instrument("launch_session", driver.launch_session())
            .await
        {
            Ok(session) => session,
            Err(e) => return Err(SimulationError::from(e)),
        };

        let workflow = AssertUnwindSafe(complete_workflow(ctx, &mut session, &mut user, &mut rng))
            .catch_unwind()
            .map(|result| {
                result.unwrap_or_else(|panic| {
                    Err(SimulationError::Aborted {
                        reason: panic_message(panic.as_ref()),
                    })
                })
            });
        let outcome = ctx.bounded(workflow).await;

        if let Err(e) = ctx.instrument("close_session", session.close()).await {
            log::warn!("User {} failed to close its session: {}", ctx.user_id(), e);
        }

        outcome
    });

    user.finish(outcome)
}

async fn complete_workflow<S: BrowserSession>(
    ctx: &UserContext,
    session: &mut S,
    user: &mut VirtualUser,
    rng: &mut StdRng,
) -> Result<(), SimulationError> {
    let config = ctx.config();
    let user_id = ctx.user_id();

    ctx.instrument("navigate", session.navigate(&config.target_url))
        .await?;
    log::info!("User {user_id} loaded page");

    let start_controls = wait_for(ctx, session, &config.start_selector).await?;
    ctx.instrument("click", session.click(&start_controls[0]))
        .await?;
    tokio::time::sleep(config.action_delay).await;
    log::info!("User {user_id} started challenge");

    for step in 1..=config.steps {
        let options = wait_for(ctx, session, &config.option_selector).await?;

        let chosen = rng.gen_range(0..options.len());
        ctx.instrument("click", session.click(&options[chosen]))
            .await?;
        user.record_step(StepOutcome {
            step,
            options_available: options.len(),
            chosen,
        });

        log::info!("User {user_id} answered question {step}");
        tokio::time::sleep(config.action_delay).await;
    }

    wait_for(ctx, session, &config.results_selector).await?;

    Ok(())
}

/// Wait for `selector`, treating an empty match the same as a timeout so callers can index the
/// first element.
async fn wait_for<S: BrowserSession>(
    ctx: &UserContext,
    session: &mut S,
    selector: &str,
) -> Result<Vec<S::Element>, SimulationError> {
    let timeout = ctx.config().selector_timeout;
    let elements = ctx
        .instrument(
            "wait_for_selector",
            session.wait_for_selector(selector, timeout),
        )
        .await?;

    if elements.is_empty() {
        return Err(DriverError::selector_timeout(selector, timeout).into());
    }

    Ok(elements)
}

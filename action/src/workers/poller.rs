//! Set status poller
//!
//! Polling runs after the deploy request was accepted. It only reports on the
//! progress of the set: whatever happens here, the step outcome is unchanged.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{error, info};

use crate::deploy::invoker::DeployServiceExt;
use crate::deploy::set_state::SetState;

/// Poller options
#[derive(Debug, Clone)]
pub struct Options {
    /// Pause between two status requests
    pub interval: Duration,

    /// Stop polling once this much time has passed
    pub timeout: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(2000),
            timeout: Duration::from_millis(60000),
        }
    }
}

/// How polling ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The set reached a terminal state
    Finished(SetState),

    /// The timeout elapsed before a terminal state was seen
    TimedOut,

    /// A status request failed; polling stopped there
    Abandoned(String),
}

/// Poll the set status until a terminal state, the timeout, or the first error
pub async fn poll_set_status<C, S, F>(
    options: &Options,
    service: &C,
    status_url: &str,
    set_id: &str,
    sleep_fn: S,
) -> PollOutcome
where
    C: DeployServiceExt + ?Sized,
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    info!("Polling the set status for setId: {}", set_id);
    let start = Instant::now();

    loop {
        if start.elapsed() >= options.timeout {
            info!(
                "Polling timed out after {} seconds.",
                options.timeout.as_secs_f64()
            );
            return PollOutcome::TimedOut;
        }

        let state = match service.get_set_status(status_url).await {
            Ok(status) => status.state,
            Err(e) => {
                error!("Error while polling: {}", e);
                return PollOutcome::Abandoned(e.to_string());
            }
        };

        info!("Current status: {}", state);

        if let Some(outcome) = state.outcome() {
            info!("{}", outcome.describe(set_id));
            return PollOutcome::Finished(state);
        }

        info!("Waiting for set to complete...");
        info!(
            "Waiting for {} seconds before the next poll...",
            options.interval.as_secs_f64()
        );
        sleep_fn(options.interval).await;
    }
}

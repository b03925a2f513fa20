//! Set status poller tests

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use ispw_deploy::deploy::invoker::{DeployReply, DeployServiceExt};
use ispw_deploy::deploy::request::DeployRequestBody;
use ispw_deploy::deploy::set_state::{SetState, SetStatusResponse};
use ispw_deploy::errors::DeployError;
use ispw_deploy::workers::poller::{poll_set_status, Options, PollOutcome};

const STATUS_URL: &str = "http://ces:48226/ispw/cw09-47623/sets/S000241246";

/// Replays scripted set states; once the script runs out it keeps answering `Executing`
struct ScriptedStates {
    script: Mutex<VecDeque<Result<&'static str, &'static str>>>,
    calls: Mutex<usize>,
}

impl ScriptedStates {
    fn new(script: Vec<Result<&'static str, &'static str>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(0),
        }
    }

    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl DeployServiceExt for ScriptedStates {
    async fn post_deploy(
        &self,
        _url: &Url,
        _body: &DeployRequestBody,
    ) -> Result<DeployReply, DeployError> {
        Err(DeployError::Transport("not used".to_string()))
    }

    async fn get_set_status(&self, url: &str) -> Result<SetStatusResponse, DeployError> {
        assert_eq!(url, STATUS_URL);
        *self.calls.lock().unwrap() += 1;

        match self.script.lock().unwrap().pop_front().unwrap_or(Ok("Executing")) {
            Ok(state) => Ok(SetStatusResponse {
                state: SetState::from(state),
            }),
            Err(message) => Err(DeployError::Transport(message.to_string())),
        }
    }
}

fn options(interval_secs: u64, timeout_secs: u64) -> Options {
    Options {
        interval: Duration::from_secs(interval_secs),
        timeout: Duration::from_secs(timeout_secs),
    }
}

#[tokio::test(start_paused = true)]
async fn test_poll_stops_on_first_terminal_state() {
    let service = ScriptedStates::new(vec![Ok("Dispatched"), Ok("Executing"), Ok("Complete")]);
    let start = tokio::time::Instant::now();

    let outcome = poll_set_status(
        &options(2, 60),
        &service,
        STATUS_URL,
        "S000241246",
        tokio::time::sleep,
    )
    .await;

    assert_eq!(outcome, PollOutcome::Finished(SetState::Complete));
    assert_eq!(service.calls(), 3);
    // Two pauses between three requests, and none after the terminal state
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(4) && elapsed < Duration::from_secs(5));
}

#[tokio::test(start_paused = true)]
async fn test_poll_each_terminal_state_ends_immediately() {
    for state in [
        "Failed",
        "Terminated",
        "Held",
        "Released",
        "Waiting-Lock",
        "Waiting-Approval",
        "Closed",
        "Complete",
    ] {
        let service = ScriptedStates::new(vec![Ok(state)]);
        let outcome =
            poll_set_status(&options(2, 60), &service, STATUS_URL, "S1", tokio::time::sleep).await;

        assert_eq!(outcome, PollOutcome::Finished(SetState::from(state)));
        assert_eq!(service.calls(), 1, "{state} should end polling");
    }
}

#[tokio::test(start_paused = true)]
async fn test_poll_times_out_without_error() {
    let service = ScriptedStates::new(vec![]);

    let outcome = poll_set_status(
        &options(2, 10),
        &service,
        STATUS_URL,
        "S000241246",
        tokio::time::sleep,
    )
    .await;

    assert_eq!(outcome, PollOutcome::TimedOut);
    // Requests at 0, 2, 4, 6 and 8 seconds; the 10 second check hits the timeout
    assert_eq!(service.calls(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_poll_unknown_state_keeps_polling() {
    let service = ScriptedStates::new(vec![Ok("Locked"), Ok("Closed")]);

    let outcome =
        poll_set_status(&options(1, 60), &service, STATUS_URL, "S1", tokio::time::sleep).await;

    assert_eq!(outcome, PollOutcome::Finished(SetState::Closed));
    assert_eq!(service.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_poll_error_abandons_polling() {
    let service = ScriptedStates::new(vec![
        Ok("Dispatched"),
        Err("connection reset"),
        Ok("Complete"),
    ]);

    let outcome =
        poll_set_status(&options(2, 60), &service, STATUS_URL, "S1", tokio::time::sleep).await;

    match outcome {
        PollOutcome::Abandoned(message) => assert!(message.contains("connection reset")),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(service.calls(), 2);
}

#[tokio::test]
async fn test_poll_waits_for_each_interval() {
    let service = ScriptedStates::new(vec![Ok("Executing"), Ok("Closed")]);
    let slept = Mutex::new(Vec::new());

    let outcome = poll_set_status(&options(2, 60), &service, STATUS_URL, "S1", |d| {
        slept.lock().unwrap().push(d);
        async {}
    })
    .await;

    assert_eq!(outcome, PollOutcome::Finished(SetState::Closed));
    assert_eq!(*slept.lock().unwrap(), vec![Duration::from_secs(2)]);
}

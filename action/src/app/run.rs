//! Deploy run: resolve, submit, then follow the set

use std::future::Future;
use std::time::Duration;

use tracing::info;
use url::Url;

use crate::app::options::ActionInputs;
use crate::authn::AuthMode;
use crate::deploy::invoker::{submit_deploy, DeployServiceExt};
use crate::deploy::params::{self, DeployParms};
use crate::deploy::request::{assemble_request_url, deploy_task_path, DeployRequestBody};
use crate::deploy::response::DeployResponse;
use crate::errors::DeployError;
use crate::http::client::HttpClient;
use crate::outputs::ActionOutputs;
use crate::utils::non_empty;
use crate::workers::poller::{self, PollOutcome};

/// Everything needed to submit the deploy, resolved from the inputs
#[derive(Debug, Clone)]
pub struct PreparedDeploy {
    pub parms: DeployParms,
    pub srid: String,
    pub url: Url,
    pub body: DeployRequestBody,
}

/// What a run did
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub response: DeployResponse,

    /// `None` when the set was not polled
    pub poll: Option<PollOutcome>,
}

fn required(value: Option<&str>, name: &str) -> Result<String, DeployError> {
    non_empty(value).ok_or_else(|| {
        DeployError::MissingArgument(format!(
            "The {} input is required for Code Pipeline Deploy. \nSkipping the deploy request....",
            name
        ))
    })
}

/// Resolve and validate the inputs, then assemble the request.
/// Nothing is sent over the network here.
pub fn prepare(inputs: &ActionInputs) -> Result<PreparedDeploy, DeployError> {
    let parms = params::resolve(
        inputs.deploy_automatically.as_deref(),
        inputs.assignment_id.as_deref(),
        inputs.level.as_deref(),
        inputs.task_id.as_deref(),
    )?;
    parms.validate()?;

    let ces_url = required(inputs.ces_url.as_deref(), "ces_url")?;
    let srid = required(inputs.srid.as_deref(), "srid")?;

    let url = assemble_request_url(&ces_url, &deploy_task_path(&srid, &parms))?;
    let body = DeployRequestBody::assemble(
        inputs.runtime_configuration.as_deref(),
        inputs.change_type.as_deref(),
        inputs.execution_status.as_deref(),
        inputs.deploy_environments.as_deref(),
        inputs.system.as_deref(),
    );

    Ok(PreparedDeploy {
        parms,
        srid,
        url,
        body,
    })
}

/// Submit a prepared deploy and, unless told not to, follow the set it created
pub async fn execute<C, S, F>(
    prepared: &PreparedDeploy,
    service: &C,
    outputs: &dyn ActionOutputs,
    poll_options: Option<&poller::Options>,
    sleep_fn: S,
) -> Result<RunSummary, DeployError>
where
    C: DeployServiceExt + ?Sized,
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    info!(
        "Starting to submit the deploy request for task {}",
        prepared.parms.task_list()
    );

    let response = submit_deploy(service, outputs, &prepared.url, &prepared.body).await?;

    info!(
        "The set_id is : {}",
        response.set_id.as_deref().unwrap_or_default()
    );
    info!("The set_url is : {}", response.url.as_deref().unwrap_or_default());

    let poll = match (poll_options, response.set_location()) {
        (None, _) => {
            info!("Skip waiting for the completion of the set for this job...");
            None
        }
        (Some(options), Some((set_id, status_url))) => {
            Some(poller::poll_set_status(options, service, status_url, set_id, sleep_fn).await)
        }
        (Some(_), None) => None,
    };

    Ok(RunSummary { response, poll })
}

/// Run the action end to end against the CES instance named by the inputs
pub async fn run<S, F>(
    inputs: &ActionInputs,
    outputs: &dyn ActionOutputs,
    sleep_fn: S,
) -> Result<RunSummary, DeployError>
where
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    let prepared = prepare(inputs)?;
    let poll_options = inputs.poll_options()?;

    let auth = AuthMode::select(
        inputs.ces_token.as_deref(),
        inputs.certificate.as_deref(),
        &prepared.srid,
    )?;
    let client = HttpClient::new(&auth)?;

    let poll_options = (!inputs.skip_waiting()).then_some(&poll_options);
    execute(&prepared, &client, outputs, poll_options, sleep_fn).await
}

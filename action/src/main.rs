//! Code Pipeline Deploy - Entry Point
//!
//! Pipeline step that submits a deploy request for Code Pipeline tasks and
//! reports the created set back to the workflow.

use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error, info};

use ispw_deploy::app::options::ActionInputs;
use ispw_deploy::app::run::run;
use ispw_deploy::logs::init_logging;
use ispw_deploy::outputs::{ActionOutputs, GithubOutputs};
use ispw_deploy::utils::version_info;

#[tokio::main]
async fn main() -> ExitCode {
    let inputs = ActionInputs::parse();

    if inputs.version {
        match serde_json::to_string_pretty(&version_info()) {
            Ok(version) => println!("{}", version),
            Err(e) => eprintln!("Failed to render version info: {e}"),
        }
        return ExitCode::SUCCESS;
    }

    let runner_debug = std::env::var("RUNNER_DEBUG").is_ok_and(|v| v == "1");
    if let Err(e) = init_logging(inputs.log_options(runner_debug)) {
        eprintln!("Failed to initialize logging: {e}");
    }
    debug!("Code Pipeline: parsed inputs: {:?}", inputs.redacted());

    let outputs = GithubOutputs::from_env();

    match run(&inputs, &outputs, tokio::time::sleep).await {
        Ok(summary) => {
            if let Some(outcome) = summary.poll {
                debug!("Code Pipeline: polling ended with {:?}", outcome);
            }
            ExitCode::SUCCESS
        }
        Err(e) if e.is_recoverable() => {
            // Nothing was deployed, so the step does not fail
            info!("{}", e);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("An error occurred while submitting the deploy request.");
            debug!("{:?}", e);
            outputs.set_failed(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

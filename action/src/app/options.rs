//! Action inputs
//!
//! Every input can be passed as a flag or through the `INPUT_<NAME>`
//! environment variable the runner sets for action inputs. Inputs the
//! workflow leaves out arrive as empty strings, so everything is read as
//! text and interpreted here.

use std::time::Duration;

use clap::Parser;

use crate::errors::DeployError;
use crate::logs::{LogLevel, LogOptions};
use crate::workers::poller;

/// Deploy Code Pipeline tasks through the CES REST API
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "ispw-deploy", about, long_about = None, disable_version_flag = true)]
pub struct ActionInputs {
    /// Assignment containing the tasks to deploy
    #[arg(long, env = "INPUT_ASSIGNMENT_ID")]
    pub assignment_id: Option<String>,

    /// Level the tasks are deployed from
    #[arg(long, env = "INPUT_LEVEL")]
    pub level: Option<String>,

    /// Comma separated list of task IDs
    #[arg(long, env = "INPUT_TASK_ID")]
    pub task_id: Option<String>,

    /// CES base URL, e.g. http://ces:48226
    #[arg(long, env = "INPUT_CES_URL")]
    pub ces_url: Option<String>,

    /// CES token
    #[arg(long, env = "INPUT_CES_TOKEN", hide_env_values = true)]
    pub ces_token: Option<String>,

    /// Client certificate, used when no CES token is given
    #[arg(long, env = "INPUT_CERTIFICATE", hide_env_values = true)]
    pub certificate: Option<String>,

    /// SRID of the Code Pipeline instance (host-port)
    #[arg(long, env = "INPUT_SRID")]
    pub srid: Option<String>,

    #[arg(long, env = "INPUT_RUNTIME_CONFIGURATION")]
    pub runtime_configuration: Option<String>,

    #[arg(long, env = "INPUT_CHANGE_TYPE")]
    pub change_type: Option<String>,

    #[arg(long, env = "INPUT_EXECUTION_STATUS")]
    pub execution_status: Option<String>,

    /// Deploy parameters as JSON, used instead of the assignment, level and task inputs
    #[arg(long, env = "INPUT_DEPLOY_AUTOMATICALLY")]
    pub deploy_automatically: Option<String>,

    /// Space separated list of deploy environments
    #[arg(long, env = "INPUT_DEPLOY_ENVIRONMENTS")]
    pub deploy_environments: Option<String>,

    /// Target system
    #[arg(long, env = "INPUT_SYSTEM")]
    pub system: Option<String>,

    /// Return as soon as the deploy is submitted ("true" or "false")
    #[arg(long, env = "INPUT_SKIP_WAITING_FOR_SET_COMPLETION")]
    pub skip_waiting_for_set_completion: Option<String>,

    /// Pause between set status requests, in milliseconds
    #[arg(long, env = "INPUT_POLL_INTERVAL_MS")]
    pub poll_interval_ms: Option<String>,

    /// Give up on the set status after this many milliseconds
    #[arg(long, env = "INPUT_POLL_TIMEOUT_MS")]
    pub poll_timeout_ms: Option<String>,

    /// trace, debug, info, warn or error
    #[arg(long, env = "INPUT_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// Print version information and exit
    #[arg(long)]
    pub version: bool,
}

fn has_content(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_millis(value: &Option<String>, name: &str) -> Result<Option<Duration>, DeployError> {
    has_content(value)
        .map(|raw| {
            raw.parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|e| DeployError::Config(format!("Invalid {} '{}': {}", name, raw, e)))
        })
        .transpose()
}

impl ActionInputs {
    /// Copy safe to log: credentials are masked
    pub fn redacted(&self) -> Self {
        let mask = |v: &Option<String>| has_content(v).map(|_| "***".to_string());
        Self {
            ces_token: mask(&self.ces_token),
            certificate: mask(&self.certificate),
            ..self.clone()
        }
    }

    /// Whether polling of the set status is switched off
    pub fn skip_waiting(&self) -> bool {
        has_content(&self.skip_waiting_for_set_completion)
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }

    /// Poller options, defaults filled in for inputs left empty.
    /// The interval must be at least one millisecond.
    pub fn poll_options(&self) -> Result<poller::Options, DeployError> {
        let defaults = poller::Options::default();
        let interval = parse_millis(&self.poll_interval_ms, "poll_interval_ms")?;
        if interval.is_some_and(|d| d.is_zero()) {
            return Err(DeployError::Config(
                "Invalid poll_interval_ms '0': the interval must be positive".to_string(),
            ));
        }
        Ok(poller::Options {
            interval: interval.unwrap_or(defaults.interval),
            timeout: parse_millis(&self.poll_timeout_ms, "poll_timeout_ms")?
                .unwrap_or(defaults.timeout),
        })
    }

    /// Logging options. An unknown level falls back to info.
    pub fn log_options(&self, runner_debug: bool) -> LogOptions {
        LogOptions {
            log_level: has_content(&self.log_level)
                .and_then(|level| level.parse().ok())
                .unwrap_or(LogLevel::Info),
            json_format: self.log_json,
            runner_debug,
        }
    }
}

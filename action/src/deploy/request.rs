//! Deploy request assembly

use serde::Serialize;
use url::Url;

use crate::deploy::params::DeployParms;
use crate::errors::DeployError;
use crate::utils::non_empty;

/// Body of the deploy request. Absent fields are left out of the JSON entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployRequestBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_configuration: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_status: Option<String>,

    /// Deploy environment list
    #[serde(rename = "dpenvlst", skip_serializing_if = "Option::is_none")]
    pub deploy_environments: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
}

impl DeployRequestBody {
    /// Keep each optional input that has content
    pub fn assemble(
        runtime_configuration: Option<&str>,
        change_type: Option<&str>,
        execution_status: Option<&str>,
        deploy_environments: Option<&str>,
        system: Option<&str>,
    ) -> Self {
        Self {
            runtime_configuration: non_empty(runtime_configuration),
            change_type: non_empty(change_type),
            execution_status: non_empty(execution_status),
            deploy_environments: non_empty(deploy_environments),
            system: non_empty(system),
        }
    }
}

/// Path of the deploy operation, relative to the CES base URL
pub fn deploy_task_path(srid: &str, parms: &DeployParms) -> String {
    let mut path = format!(
        "/ispw/{}/assignments/{}/taskIds/deploy?",
        srid,
        parms.container_id.as_deref().unwrap_or_default()
    );

    for id in parms.task_ids.iter().flatten() {
        path.push_str(&format!("taskId={}&", id));
    }

    path.push_str(&format!(
        "level={}",
        parms.task_level.as_deref().unwrap_or_default()
    ));
    path
}

/// Join the CES base URL and a request path. Any context root on the base URL is kept.
pub fn assemble_request_url(base_url: &str, path: &str) -> Result<Url, DeployError> {
    let base = base_url.trim().trim_end_matches('/');
    Url::parse(&format!("{}{}", base, path))
        .map_err(|e| DeployError::Config(format!("Invalid CES URL '{}': {}", base_url, e)))
}

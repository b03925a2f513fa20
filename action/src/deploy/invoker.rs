//! Deploy submission

use async_trait::async_trait;
use tracing::{debug, info};
use url::Url;

use crate::deploy::request::DeployRequestBody;
use crate::deploy::response::{interpret_response, set_outputs, DeployResponse};
use crate::deploy::set_state::SetStatusResponse;
use crate::errors::DeployError;
use crate::outputs::ActionOutputs;

/// How the deployment service answered a deploy request
#[derive(Debug, Clone, PartialEq)]
pub enum DeployReply {
    /// 2xx, with the body if the service sent one
    Accepted(Option<DeployResponse>),

    /// Error status with a structured body
    Rejected { status: u16, body: DeployResponse },
}

/// Deployment service operations, behind a trait for testability
#[async_trait]
pub trait DeployServiceExt: Send + Sync {
    /// Submit a deploy request
    async fn post_deploy(
        &self,
        url: &Url,
        body: &DeployRequestBody,
    ) -> Result<DeployReply, DeployError>;

    /// Read the state of a set from its status URL
    async fn get_set_status(&self, url: &str) -> Result<SetStatusResponse, DeployError>;
}

/// Submit the deploy request once and settle its outcome.
///
/// Identifiers are published from the response body whether the service
/// accepted the request or rejected it.
pub async fn submit_deploy<S>(
    service: &S,
    outputs: &dyn ActionOutputs,
    url: &Url,
    body: &DeployRequestBody,
) -> Result<DeployResponse, DeployError>
where
    S: DeployServiceExt + ?Sized,
{
    debug!("Code Pipeline: request url: {}", url);
    debug!("Code Pipeline: request body: {:?}", body);

    match service.post_deploy(url, body).await? {
        DeployReply::Accepted(body) => {
            let body = interpret_response(outputs, body)?;
            info!("The deploy request has been submitted.");
            Ok(body)
        }
        DeployReply::Rejected { status, body } => {
            debug!("Code Pipeline: received error code: {}", status);
            set_outputs(outputs, Some(&body))?;
            let message = body
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| format!("The deploy request failed with status {}.", status));
            Err(DeployError::DeployFailure(message))
        }
    }
}

//! Deploy and set status operations of the CES REST API

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::deploy::invoker::{DeployReply, DeployServiceExt};
use crate::deploy::request::DeployRequestBody;
use crate::deploy::response::DeployResponse;
use crate::deploy::set_state::SetStatusResponse;
use crate::errors::DeployError;
use crate::http::client::HttpClient;

impl HttpClient {
    /// Submit the deploy request. Any 2xx is accepted, whatever its body.
    /// Error statuses carrying a JSON body come back as [`DeployReply::Rejected`];
    /// other error statuses are transport errors.
    pub async fn deploy_tasks(
        &self,
        url: &Url,
        body: &DeployRequestBody,
    ) -> Result<DeployReply, DeployError> {
        let request = self.request(Method::POST, url.as_str()).json(body);
        let response = self.send(request).await?;

        let status = response.status();
        let text = response.text().await?;
        debug!("Code Pipeline: received status {} with body: {}", status, text);

        if status.is_success() {
            if text.trim().is_empty() {
                return Ok(DeployReply::Accepted(None));
            }
            return Ok(DeployReply::Accepted(Some(DeployResponse::from_text(&text))));
        }

        match serde_json::from_str::<Value>(&text) {
            Ok(raw) => Ok(DeployReply::Rejected {
                status: status.as_u16(),
                body: DeployResponse::from_value(raw),
            }),
            Err(_) => Err(DeployError::Transport(format!("{}: {}", status, text))),
        }
    }

    /// Read the current state of a set
    pub async fn set_status(&self, url: &str) -> Result<SetStatusResponse, DeployError> {
        let response = self.send(self.request(Method::GET, url)).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeployError::Transport(format!("{}: {}", status, body)));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl DeployServiceExt for HttpClient {
    async fn post_deploy(
        &self,
        url: &Url,
        body: &DeployRequestBody,
    ) -> Result<DeployReply, DeployError> {
        self.deploy_tasks(url, body).await
    }

    async fn get_set_status(&self, url: &str) -> Result<SetStatusResponse, DeployError> {
        self.set_status(url).await
    }
}

//! Deploy response handling

use serde_json::Value;
use tracing::{debug, info};

use crate::errors::DeployError;
use crate::outputs::{ActionOutputs, OUTPUT_SET_ID, OUTPUT_URL};
use crate::utils::{non_empty, status_message_to_print, string_has_content};

/// Message of the failure raised when the service sends no body back
pub const NO_RESPONSE_MESSAGE: &str = "No response was received from the deploy request.";

/// Body returned by the deploy operation, on success and on failure alike.
///
/// The service owns the shape of this body. Only `setId`, `url` and
/// `message` are read, and only when they are strings; the rest is kept as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeployResponse {
    /// ID of the set created for the deploy
    pub set_id: Option<String>,

    /// Status URL of the set
    pub url: Option<String>,

    /// Summary of the outcome
    pub message: Option<String>,

    /// The body as received
    pub raw: Value,
}

impl DeployResponse {
    /// Read the known fields out of a JSON body
    pub fn from_value(raw: Value) -> Self {
        let field = |name: &str| raw.get(name).and_then(Value::as_str).map(str::to_string);
        let set_id = field("setId");
        let url = field("url");
        let message = field("message");
        Self {
            set_id,
            url,
            message,
            raw,
        }
    }

    /// Body text of an accepted request. Text that is not JSON is kept as a string.
    pub fn from_text(text: &str) -> Self {
        let raw = serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()));
        Self::from_value(raw)
    }

    /// Set ID and status URL, when the service sent both
    pub fn set_location(&self) -> Option<(&str, &str)> {
        let set_id = self.set_id.as_deref().filter(|s| string_has_content(Some(*s)))?;
        let url = self.url.as_deref().filter(|u| string_has_content(Some(*u)))?;
        Some((set_id, url))
    }
}

/// Publish the set ID and URL found in a response body.
/// Fields the body lacks are left unpublished.
pub fn set_outputs(
    outputs: &dyn ActionOutputs,
    body: Option<&DeployResponse>,
) -> Result<(), DeployError> {
    let Some(body) = body else {
        return Ok(());
    };

    if let Some(set_id) = non_empty(body.set_id.as_deref()) {
        info!("Code Pipeline: received set ID: {}", set_id);
        outputs.set_output(OUTPUT_SET_ID, &set_id)?;
    }

    if let Some(url) = non_empty(body.url.as_deref()) {
        info!("Code Pipeline: received URL: {}", url);
        outputs.set_output(OUTPUT_URL, &url)?;
    }

    Ok(())
}

/// Decide whether a deploy response means the request went through
pub fn handle_response_body(body: Option<DeployResponse>) -> Result<DeployResponse, DeployError> {
    match body {
        None => Err(DeployError::DeployFailure(NO_RESPONSE_MESSAGE.to_string())),
        Some(body) => {
            debug!("Code Pipeline: deploy response: {}", body.raw);
            info!("{}", status_message_to_print(body.message.as_deref()));
            Ok(body)
        }
    }
}

/// Publish outputs for a successful exchange, then interpret its body
pub fn interpret_response(
    outputs: &dyn ActionOutputs,
    body: Option<DeployResponse>,
) -> Result<DeployResponse, DeployError> {
    set_outputs(outputs, body.as_ref())?;
    handle_response_body(body)
}

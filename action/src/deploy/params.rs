//! Deploy parameter resolution

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info};

use crate::errors::DeployError;
use crate::utils::{non_empty, string_has_content};

/// Message logged when the deploy is skipped for lack of inputs
pub const MISSING_INPUTS_MESSAGE: &str =
    "Inputs required for Code Pipeline Deploy are missing. \nSkipping the deploy request....";

/// What to deploy: the assignment, the level and the tasks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployParms {
    /// Assignment (container) holding the tasks
    #[serde(
        default,
        deserialize_with = "scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub container_id: Option<String>,

    /// Level the tasks are deployed from
    #[serde(
        default,
        deserialize_with = "scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub task_level: Option<String>,

    /// Task IDs, in the order they were supplied
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Option::is_none"
    )]
    pub task_ids: Option<Vec<String>>,
}

/// A JSON string or number, read as text
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

impl From<Scalar> for String {
    fn from(value: Scalar) -> Self {
        match value {
            Scalar::Text(text) => text,
            Scalar::Number(number) => number.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(Scalar),
    Many(Vec<Scalar>),
}

fn scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Scalar> = Option::deserialize(deserializer)?;
    Ok(value.map(String::from))
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<OneOrMany> = Option::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        OneOrMany::One(id) => vec![id.into()],
        OneOrMany::Many(ids) => ids.into_iter().map(String::from).collect(),
    }))
}

impl DeployParms {
    /// Build the parameters from the discrete inputs.
    /// Empty inputs leave their field unset; this never fails.
    pub fn from_inputs(
        assignment_id: Option<&str>,
        level: Option<&str>,
        task_id: Option<&str>,
    ) -> Self {
        Self {
            container_id: non_empty(assignment_id),
            task_level: non_empty(level),
            task_ids: non_empty(task_id)
                .map(|ids| ids.split(',').map(str::to_string).collect()),
        }
    }

    /// Parse the combined JSON parameters input.
    /// Well-formed JSON that is not an object carries no parameters, which
    /// skips the deploy like any other missing input.
    pub fn from_json(raw: &str) -> Result<Self, DeployError> {
        let value: serde_json::Value =
            serde_json::from_str(raw).map_err(|e| DeployError::Parse(e.to_string()))?;
        if !value.is_object() {
            debug!("Code Pipeline: deploy parameters are not an object: {}", value);
            return Err(DeployError::MissingArgument(MISSING_INPUTS_MESSAGE.to_string()));
        }
        serde_json::from_value(value).map_err(|e| DeployError::Parse(e.to_string()))
    }

    /// Ensure the assignment, level and task IDs are all present
    pub fn validate(&self) -> Result<(), DeployError> {
        let has_tasks = self
            .task_ids
            .as_ref()
            .is_some_and(|ids| ids.iter().any(|id| string_has_content(Some(id.as_str()))));

        if string_has_content(self.container_id.as_deref())
            && string_has_content(self.task_level.as_deref())
            && has_tasks
        {
            Ok(())
        } else {
            Err(DeployError::MissingArgument(MISSING_INPUTS_MESSAGE.to_string()))
        }
    }

    /// Task IDs joined for logging
    pub fn task_list(&self) -> String {
        self.task_ids
            .as_ref()
            .map(|ids| ids.join(","))
            .unwrap_or_default()
    }
}

/// Resolve the deploy parameters, preferring the combined JSON input when it has content
pub fn resolve(
    deploy_automatically: Option<&str>,
    assignment_id: Option<&str>,
    level: Option<&str>,
    task_id: Option<&str>,
) -> Result<DeployParms, DeployError> {
    let parms = match deploy_automatically.filter(|raw| string_has_content(Some(*raw))) {
        Some(raw) => {
            info!("Deploy parameters are being retrieved from the deploy_automatically input.");
            DeployParms::from_json(raw)?
        }
        None => {
            info!("Deploy parameters are being retrieved from the inputs.");
            DeployParms::from_inputs(assignment_id, level, task_id)
        }
    };

    debug!("Code Pipeline: parsed deploy parms: {:?}", parms);
    Ok(parms)
}

//! Lifecycle states of a deployment set

use serde::{Deserialize, Serialize};

/// State reported by the set status operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetState {
    Dispatched,
    Executing,
    Complete,
    Closed,
    Failed,
    Held,
    Released,
    Terminated,
    WaitingApproval,
    WaitingLock,
    /// Any state this client does not know about
    Other(String),
}

/// What a terminal state means for the deploy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    Failed,
    Terminated,
    Held,
    Released,
    ApprovalRequired,
    Completed,
}

impl SetState {
    pub fn as_str(&self) -> &str {
        match self {
            SetState::Dispatched => "Dispatched",
            SetState::Executing => "Executing",
            SetState::Complete => "Complete",
            SetState::Closed => "Closed",
            SetState::Failed => "Failed",
            SetState::Held => "Held",
            SetState::Released => "Released",
            SetState::Terminated => "Terminated",
            SetState::WaitingApproval => "Waiting-Approval",
            SetState::WaitingLock => "Waiting-Lock",
            SetState::Other(state) => state,
        }
    }

    /// Outcome class of the state, `None` while the set is still moving
    pub fn outcome(&self) -> Option<SetOutcome> {
        match self {
            SetState::Failed => Some(SetOutcome::Failed),
            SetState::Terminated => Some(SetOutcome::Terminated),
            SetState::Held => Some(SetOutcome::Held),
            SetState::Released | SetState::WaitingLock => Some(SetOutcome::Released),
            SetState::WaitingApproval => Some(SetOutcome::ApprovalRequired),
            SetState::Closed | SetState::Complete => Some(SetOutcome::Completed),
            SetState::Dispatched | SetState::Executing | SetState::Other(_) => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.outcome().is_some()
    }
}

impl From<&str> for SetState {
    fn from(s: &str) -> Self {
        match s {
            "Dispatched" => SetState::Dispatched,
            "Executing" => SetState::Executing,
            "Complete" => SetState::Complete,
            "Closed" => SetState::Closed,
            "Failed" => SetState::Failed,
            "Held" => SetState::Held,
            "Released" => SetState::Released,
            "Terminated" => SetState::Terminated,
            "Waiting-Approval" => SetState::WaitingApproval,
            "Waiting-Lock" => SetState::WaitingLock,
            other => SetState::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for SetState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SetState {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SetState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(SetState::from(s.as_str()))
    }
}

impl SetOutcome {
    /// Log line for a set that reached this outcome
    pub fn describe(&self, set_id: &str) -> String {
        match self {
            SetOutcome::Failed => {
                format!("Code Pipeline: Set {} - action [Deploy] failed.", set_id)
            }
            SetOutcome::Terminated => {
                format!("Code Pipeline: Set {} - successfully terminated.", set_id)
            }
            SetOutcome::Held => format!("Code Pipeline: Set {} - successfully held.", set_id),
            SetOutcome::Released => {
                format!("Code Pipeline: Set {} - successfully released.", set_id)
            }
            SetOutcome::ApprovalRequired => {
                format!("Code Pipeline: In set ({}) process, Approval required.", set_id)
            }
            SetOutcome::Completed => "Code Pipeline: Action completed.".to_string(),
        }
    }
}

/// Body of the set status operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetStatusResponse {
    pub state: SetState,
}

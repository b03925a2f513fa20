//! Utility functions

use serde::Serialize;

/// Version information for the action
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    pub version: String,
    pub git_hash: String,
    pub build_time: String,
}

/// Get version information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: option_env!("GIT_HASH").unwrap_or("unknown").to_string(),
        build_time: option_env!("BUILD_TIME").unwrap_or("unknown").to_string(),
    }
}

/// Whether an optional input carries a usable value
pub fn string_has_content(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

/// The input value when it has content, `None` otherwise
pub fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| string_has_content(Some(*v)))
        .map(str::to_string)
}

/// Format the status message sent back by the deployment service for the log
pub fn status_message_to_print(message: Option<&str>) -> String {
    match message.map(str::trim) {
        Some(m) if !m.is_empty() => m.to_string(),
        _ => "No status message was received from the deployment service.".to_string(),
    }
}

//! Outputs and failure reporting towards the hosting pipeline

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::debug;

use crate::errors::DeployError;

/// Output holding the ID of the created set
pub const OUTPUT_SET_ID: &str = "set_id";

/// Output holding the status URL of the created set
pub const OUTPUT_URL: &str = "url";

const MULTILINE_DELIMITER: &str = "ISPW_DEPLOY_OUTPUT_EOF";

/// Sink for step outputs, kept behind a trait so runs can be observed in tests
pub trait ActionOutputs: Send + Sync {
    /// Publish a named output. Publishing the same value twice is harmless.
    fn set_output(&self, name: &str, value: &str) -> Result<(), DeployError>;

    /// Mark the step as failed with the given message
    fn set_failed(&self, message: &str);
}

/// GitHub Actions outputs: `$GITHUB_OUTPUT` file and workflow commands
#[derive(Debug, Clone, Default)]
pub struct GithubOutputs {
    output_file: Option<PathBuf>,
}

impl GithubOutputs {
    /// Use the output file named by `GITHUB_OUTPUT`, if the runner set one
    pub fn from_env() -> Self {
        Self {
            output_file: std::env::var_os("GITHUB_OUTPUT")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        }
    }

    #[cfg(test)]
    fn with_file(path: impl Into<PathBuf>) -> Self {
        Self {
            output_file: Some(path.into()),
        }
    }

    fn format_entry(name: &str, value: &str) -> String {
        if value.contains('\n') {
            format!(
                "{name}<<{delim}\n{value}\n{delim}\n",
                delim = MULTILINE_DELIMITER
            )
        } else {
            format!("{}={}\n", name, value)
        }
    }
}

impl ActionOutputs for GithubOutputs {
    fn set_output(&self, name: &str, value: &str) -> Result<(), DeployError> {
        let entry = Self::format_entry(name, value);
        match &self.output_file {
            Some(path) => {
                debug!("Writing output {} to {}", name, path.display());
                let mut file = OpenOptions::new().create(true).append(true).open(path)?;
                file.write_all(entry.as_bytes())?;
            }
            None => print!("{}", entry),
        }
        Ok(())
    }

    fn set_failed(&self, message: &str) {
        // Workflow commands are single line; the runner decodes these escapes
        let escaped = message
            .replace('%', "%25")
            .replace('\r', "%0D")
            .replace('\n', "%0A");
        println!("::error::{}", escaped);
    }
}

/// Outputs kept in memory
#[derive(Debug, Default)]
pub struct MemoryOutputs {
    outputs: Mutex<BTreeMap<String, String>>,
    failure: Mutex<Option<String>>,
}

impl MemoryOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value published for an output, if any
    pub fn get(&self, name: &str) -> Option<String> {
        self.outputs
            .lock()
            .ok()
            .and_then(|outputs| outputs.get(name).cloned())
    }

    /// Number of distinct outputs published
    pub fn len(&self) -> usize {
        self.outputs.lock().map(|o| o.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Failure message, if the step was marked failed
    pub fn failure(&self) -> Option<String> {
        self.failure.lock().ok().and_then(|f| f.clone())
    }
}

impl ActionOutputs for MemoryOutputs {
    fn set_output(&self, name: &str, value: &str) -> Result<(), DeployError> {
        let mut outputs = self
            .outputs
            .lock()
            .map_err(|e| DeployError::Config(e.to_string()))?;
        outputs.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn set_failed(&self, message: &str) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = Some(message.to_string());
        }
    }
}

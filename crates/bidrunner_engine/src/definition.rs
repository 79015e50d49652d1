use bidrunner_core::JobParameters;

use crate::{AwsCredentials, ConfigError};

/// Fixed prefix the job container runs; the operator's parameters follow it
/// verbatim as positional arguments.
pub const COMMAND_PREFIX: [&str; 2] = ["bash", "execute.sh"];

/// Container-level override applied on top of the pre-registered task
/// definition: the command to run and the environment the job needs to
/// reach its own AWS resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOverride {
    pub container_name: String,
    pub command: Vec<String>,
    pub environment: Vec<(String, String)>,
}

/// Builds the override payload for one run request. No side effects; fails
/// only when the credential context is unset.
pub fn build_override(
    container_name: &str,
    parameters: &JobParameters,
    credentials: Option<&AwsCredentials>,
) -> Result<JobOverride, ConfigError> {
    let credentials = credentials.ok_or(ConfigError::MissingCredentials)?;

    let mut command: Vec<String> = COMMAND_PREFIX.iter().map(|s| s.to_string()).collect();
    command.extend(parameters.as_args());

    Ok(JobOverride {
        container_name: container_name.to_string(),
        command,
        environment: credentials.environment(),
    })
}

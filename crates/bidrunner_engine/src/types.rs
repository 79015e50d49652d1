use bidrunner_core::{JobHandle, ParameterError, StatusReport};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("credentials are not configured; fill in the [aws] section of the config file")]
    MissingCredentials,
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Failure to submit a run request. The previous job handle, if any, is left
/// untouched by a failed launch.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid job parameters: {0}")]
    Parameters(#[from] ParameterError),
    #[error("run request failed: {0}")]
    Service(String),
    #[error("run response contained no tasks")]
    NoTaskReturned,
}

#[derive(Debug, Error)]
pub enum PollError {
    /// Status was requested before any launch this session.
    #[error("no job has been launched in this session")]
    NoActiveJob,
    #[error("describe request failed: {0}")]
    Service(String),
    #[error("describe response contained no tasks")]
    Empty,
}

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("receive failed: {0}")]
    Receive(String),
    #[error("delete failed: {0}")]
    Delete(String),
}

/// Results delivered back from the engine worker to the driving loop.
#[derive(Debug)]
pub enum EngineEvent {
    Launched {
        result: Result<JobHandle, LaunchError>,
    },
    Status {
        report: StatusReport,
    },
}

//! Bidrunner engine: job launch, status polling, and queue correlation.
mod config;
mod correlator;
mod definition;
mod engine;
mod orchestrator;
mod queue;
mod runner;
mod types;

pub use config::{AwsCredentials, ReceiveSettings, RunnerConfig};
pub use correlator::{decode_message, DecodeIssue, QueueCorrelator};
pub use definition::{build_override, JobOverride, COMMAND_PREFIX};
pub use engine::EngineHandle;
pub use orchestrator::{
    EcsOrchestration, NetworkSettings, Orchestration, OrchestrationError, RunJobRequest,
    TaskOverview,
};
pub use queue::{MessageQueue, RawQueueMessage, SqsQueue, JOB_NAME_ATTRIBUTE};
pub use runner::JobRunner;
pub use types::{ConfigError, EngineEvent, LaunchError, PollError, QueueError};

//! Bidrunner core: pure domain types and queue-message correlation.
mod correlate;
mod types;

pub use correlate::correlate;
pub use types::{
    JobHandle, JobParameters, JobState, ParameterError, QueueMessage, StatusReport,
};

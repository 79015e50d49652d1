use std::fmt;

use chrono::{DateTime, Utc};

/// Ordered operator-supplied arguments for one bid run.
///
/// The order is the contract with the container's entry script: it receives
/// these verbatim, after the fixed command prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobParameters {
    pub bid_name: String,
    pub input_bucket: String,
    pub auction_shapefile: String,
    pub output_bucket: String,
}

impl JobParameters {
    pub fn new(
        bid_name: impl Into<String>,
        input_bucket: impl Into<String>,
        auction_shapefile: impl Into<String>,
        output_bucket: impl Into<String>,
    ) -> Self {
        Self {
            bid_name: bid_name.into(),
            input_bucket: input_bucket.into(),
            auction_shapefile: auction_shapefile.into(),
            output_bucket: output_bucket.into(),
        }
    }

    /// All required fields must be non-empty before submission.
    pub fn validate(&self) -> Result<(), ParameterError> {
        let required = [
            ("bid name", &self.bid_name),
            ("input bucket", &self.input_bucket),
            ("auction shapefile", &self.auction_shapefile),
            ("output bucket", &self.output_bucket),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ParameterError::EmptyField(field));
            }
        }
        Ok(())
    }

    /// The arguments in submission order.
    pub fn as_args(&self) -> Vec<String> {
        vec![
            self.bid_name.clone(),
            self.input_bucket.clone(),
            self.auction_shapefile.clone(),
            self.output_bucket.clone(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterError {
    EmptyField(&'static str),
}

impl fmt::Display for ParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterError::EmptyField(field) => write!(f, "required field is empty: {field}"),
        }
    }
}

impl std::error::Error for ParameterError {}

/// Identity of a launched job: the cluster it runs on plus the task ids the
/// orchestration service assigned. Immutable once created; a relaunch makes
/// a new handle rather than mutating this one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub cluster: String,
    pub task_ids: Vec<String>,
}

impl JobHandle {
    pub fn new(cluster: impl Into<String>, task_ids: Vec<String>) -> Self {
        Self {
            cluster: cluster.into(),
            task_ids,
        }
    }

    /// The task the status poller addresses.
    pub fn primary_task(&self) -> Option<&str> {
        self.task_ids.first().map(String::as_str)
    }
}

/// Lifecycle value reported by the orchestration service (PENDING, RUNNING,
/// STOPPED, ...). Opaque to this engine; not interpreted further.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobState(pub String);

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A decoded queue message, alive only between receipt and deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMessage {
    pub id: String,
    pub receipt_handle: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    pub job_name: String,
}

/// Merged view of the two status signals, rebuilt fresh on every check.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusReport {
    /// Latest orchestration-service state, if a poll succeeded this round.
    pub job_state: Option<JobState>,
    /// Message bodies for this job, ascending by sent timestamp.
    pub messages: Vec<String>,
}

use std::sync::Arc;

use aws_config::{BehaviorVersion, Region};
use bidrunner_core::{JobHandle, JobParameters, JobState, StatusReport};
use runner_logging::{runner_info, runner_warn};

use crate::{
    build_override, AwsCredentials, EcsOrchestration, LaunchError, MessageQueue, NetworkSettings,
    Orchestration, PollError, QueueCorrelator, QueueError, RunJobRequest, RunnerConfig, SqsQueue,
};

/// One job session: owns the single live [`JobHandle`] and the service
/// clients. Launching again replaces the handle; there is no concurrent
/// multi-job tracking.
pub struct JobRunner {
    config: RunnerConfig,
    credentials: Option<AwsCredentials>,
    orchestration: Arc<dyn Orchestration>,
    correlator: QueueCorrelator,
    handle: Option<JobHandle>,
}

impl JobRunner {
    pub fn new(
        config: RunnerConfig,
        credentials: Option<AwsCredentials>,
        orchestration: Arc<dyn Orchestration>,
        queue: Arc<dyn MessageQueue>,
    ) -> Self {
        let correlator = QueueCorrelator::new(queue, config.receive);
        Self {
            config,
            credentials,
            orchestration,
            correlator,
            handle: None,
        }
    }

    /// Build a runner against the real AWS services, using the configured
    /// static credentials and region for both clients.
    pub async fn connect(config: RunnerConfig, credentials: AwsCredentials) -> Self {
        let provider = aws_sdk_ecs::config::Credentials::new(
            credentials.access_key_id.clone(),
            credentials.secret_access_key.clone(),
            credentials.session_token.clone(),
            None,
            "bidrunner_config",
        );
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(provider)
            .load()
            .await;

        let orchestration = Arc::new(EcsOrchestration::new(aws_sdk_ecs::Client::new(&shared)));
        let queue = Arc::new(SqsQueue::new(aws_sdk_sqs::Client::new(&shared)));
        Self::new(config, Some(credentials), orchestration, queue)
    }

    /// Identity of the last successful launch, if any.
    pub fn handle(&self) -> Option<&JobHandle> {
        self.handle.as_ref()
    }

    /// Submit exactly one run request. On success the returned handle
    /// replaces any previous one; on failure the previous handle is kept.
    /// Not idempotent: two calls produce two independent jobs.
    pub async fn launch(&mut self, parameters: &JobParameters) -> Result<JobHandle, LaunchError> {
        parameters.validate()?;
        let overrides = build_override(
            &self.config.container_name,
            parameters,
            self.credentials.as_ref(),
        )?;

        runner_info!(
            "launching bid '{}' on cluster {}",
            parameters.bid_name,
            self.config.cluster
        );
        let request = RunJobRequest {
            cluster: self.config.cluster.clone(),
            task_definition: self.config.task_definition(),
            overrides,
            network: NetworkSettings {
                subnets: self.config.subnets.clone(),
                assign_public_ip: self.config.assign_public_ip,
            },
        };

        let task_ids = self
            .orchestration
            .run_job(request)
            .await
            .map_err(|err| LaunchError::Service(err.to_string()))?;
        let first = task_ids
            .into_iter()
            .next()
            .ok_or(LaunchError::NoTaskReturned)?;

        runner_info!("created new task: {first}");
        let handle = JobHandle::new(self.config.cluster.clone(), vec![first]);
        self.handle = Some(handle.clone());
        Ok(handle)
    }

    /// One describe-request for the held handle; the first task's lifecycle
    /// value. No retry here: the caller decides whether to poll again.
    pub async fn poll_state(&self) -> Result<JobState, PollError> {
        let handle = self.handle.as_ref().ok_or(PollError::NoActiveJob)?;
        let tasks = self
            .orchestration
            .describe_job(&handle.cluster, &handle.task_ids)
            .await
            .map_err(|err| PollError::Service(err.to_string()))?;
        let first = tasks.into_iter().next().ok_or(PollError::Empty)?;
        Ok(JobState(first.last_status))
    }

    /// One correlation round against the configured queue.
    pub async fn poll_messages(&self, job_name: &str) -> Result<Vec<String>, QueueError> {
        self.correlator
            .poll_messages(&self.config.queue_url, job_name)
            .await
    }

    /// Merge both status signals into one report. The two polls run
    /// independently: a failed state poll still yields any queue messages,
    /// and vice versa. Consuming messages is a side effect, so two calls in
    /// quick succession are not equivalent.
    pub async fn status(&self, job_name: &str) -> StatusReport {
        let job_state = match self.poll_state().await {
            Ok(state) => Some(state),
            Err(PollError::NoActiveJob) => {
                runner_info!("no job launched this session; reporting queue messages only");
                None
            }
            Err(err) => {
                runner_warn!("task state unavailable this round: {err}");
                None
            }
        };

        let messages = match self.poll_messages(job_name).await {
            Ok(messages) => messages,
            Err(err) => {
                runner_warn!("queue poll failed: {err}");
                Vec::new()
            }
        };

        StatusReport {
            job_state,
            messages,
        }
    }
}

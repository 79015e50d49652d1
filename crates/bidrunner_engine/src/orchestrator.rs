use aws_sdk_ecs::error::DisplayErrorContext;
use aws_sdk_ecs::types::{
    AssignPublicIp, AwsVpcConfiguration, ContainerOverride, KeyValuePair, LaunchType,
    NetworkConfiguration, TaskOverride,
};
use thiserror::Error;

use crate::JobOverride;

/// Static network placement for launched tasks; operator configuration, not
/// derived at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkSettings {
    pub subnets: Vec<String>,
    pub assign_public_ip: bool,
}

/// Everything one run request needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunJobRequest {
    pub cluster: String,
    pub task_definition: String,
    pub overrides: JobOverride,
    pub network: NetworkSettings,
}

/// Per-task slice of a describe response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOverview {
    pub task_id: String,
    pub last_status: String,
}

#[derive(Debug, Error)]
#[error("{0}")]
pub struct OrchestrationError(pub String);

/// Seam to the container-orchestration service. The engine only ever needs
/// these two calls; keeping them behind a trait lets tests drive the
/// launcher and poller without touching AWS.
#[async_trait::async_trait]
pub trait Orchestration: Send + Sync {
    /// Submit one run request; returns the assigned task ids.
    async fn run_job(&self, request: RunJobRequest) -> Result<Vec<String>, OrchestrationError>;

    /// Describe the given tasks' current lifecycle state.
    async fn describe_job(
        &self,
        cluster: &str,
        task_ids: &[String],
    ) -> Result<Vec<TaskOverview>, OrchestrationError>;
}

/// ECS-backed implementation over the official SDK client.
#[derive(Debug, Clone)]
pub struct EcsOrchestration {
    client: aws_sdk_ecs::Client,
}

impl EcsOrchestration {
    pub fn new(client: aws_sdk_ecs::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Orchestration for EcsOrchestration {
    async fn run_job(&self, request: RunJobRequest) -> Result<Vec<String>, OrchestrationError> {
        let vpc = AwsVpcConfiguration::builder()
            .set_subnets(Some(request.network.subnets))
            .assign_public_ip(if request.network.assign_public_ip {
                AssignPublicIp::Enabled
            } else {
                AssignPublicIp::Disabled
            })
            .build()
            .map_err(|err| OrchestrationError(err.to_string()))?;

        let environment = request
            .overrides
            .environment
            .into_iter()
            .map(|(name, value)| KeyValuePair::builder().name(name).value(value).build())
            .collect();
        let container = ContainerOverride::builder()
            .name(request.overrides.container_name)
            .set_command(Some(request.overrides.command))
            .set_environment(Some(environment))
            .build();

        let response = self
            .client
            .run_task()
            .cluster(request.cluster)
            .task_definition(request.task_definition)
            .count(1)
            .launch_type(LaunchType::Fargate)
            .network_configuration(
                NetworkConfiguration::builder().awsvpc_configuration(vpc).build(),
            )
            .overrides(TaskOverride::builder().container_overrides(container).build())
            .send()
            .await
            .map_err(|err| OrchestrationError(DisplayErrorContext(&err).to_string()))?;

        Ok(response
            .tasks()
            .iter()
            .filter_map(|task| task.task_arn().map(str::to_string))
            .collect())
    }

    async fn describe_job(
        &self,
        cluster: &str,
        task_ids: &[String],
    ) -> Result<Vec<TaskOverview>, OrchestrationError> {
        let response = self
            .client
            .describe_tasks()
            .cluster(cluster)
            .set_tasks(Some(task_ids.to_vec()))
            .send()
            .await
            .map_err(|err| OrchestrationError(DisplayErrorContext(&err).to_string()))?;

        Ok(response
            .tasks()
            .iter()
            .map(|task| TaskOverview {
                task_id: task.task_arn().unwrap_or_default().to_string(),
                last_status: task.last_status().unwrap_or_default().to_string(),
            })
            .collect())
    }
}

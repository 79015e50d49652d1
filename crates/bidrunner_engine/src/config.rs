use std::time::Duration;

use crate::ConfigError;

/// Access credentials handed to the orchestration client and forwarded to
/// the job container as environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl AwsCredentials {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token,
        }
    }

    /// Environment variables for the container override, keys upper-cased.
    pub fn environment(&self) -> Vec<(String, String)> {
        let mut vars = vec![
            ("AWS_ACCESS_KEY_ID".to_string(), self.access_key_id.clone()),
            (
                "AWS_SECRET_ACCESS_KEY".to_string(),
                self.secret_access_key.clone(),
            ),
        ];
        if let Some(token) = &self.session_token {
            vars.push(("AWS_SESSION_TOKEN".to_string(), token.clone()));
        }
        vars
    }
}

/// One receive call's shape: batch size and long-poll wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiveSettings {
    pub max_messages: i32,
    pub wait: Duration,
}

impl Default for ReceiveSettings {
    fn default() -> Self {
        Self {
            max_messages: 10,
            wait: Duration::from_secs(20),
        }
    }
}

/// Static deployment configuration, validated once at startup.
///
/// The defaults mirror the deployment this tool was written for; every field
/// can be overridden from the operator's config file. Cluster and task
/// definition are pre-registered by the AWS admin, not discovered at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    pub region: String,
    pub cluster: String,
    pub task_definition_family: String,
    pub task_definition_revision: String,
    pub container_name: String,
    pub subnets: Vec<String>,
    pub assign_public_ip: bool,
    pub queue_url: String,
    pub receive: ReceiveSettings,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            region: "us-west-2".to_string(),
            cluster: "water-tracker-cluster".to_string(),
            task_definition_family: "water-tracker-bid-runs".to_string(),
            task_definition_revision: "1".to_string(),
            container_name: "bidrunner".to_string(),
            subnets: vec![
                "subnet-f58504b8".to_string(),
                "subnet-876f54ee".to_string(),
                "subnet-71b3c80a".to_string(),
            ],
            assign_public_ip: true,
            queue_url: String::new(),
            receive: ReceiveSettings::default(),
        }
    }
}

impl RunnerConfig {
    /// The pre-registered task definition identifier, `family:revision`.
    pub fn task_definition(&self) -> String {
        format!(
            "{}:{}",
            self.task_definition_family, self.task_definition_revision
        )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("region", &self.region),
            ("cluster", &self.cluster),
            ("task_definition_family", &self.task_definition_family),
            ("task_definition_revision", &self.task_definition_revision),
            ("container_name", &self.container_name),
            ("queue_url", &self.queue_url),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{field} must be set")));
            }
        }
        if self.subnets.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one subnet must be configured".to_string(),
            ));
        }
        Ok(())
    }
}

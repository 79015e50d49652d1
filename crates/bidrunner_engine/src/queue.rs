use std::time::Duration;

use aws_sdk_sqs::error::DisplayErrorContext;
use aws_sdk_sqs::types::MessageSystemAttributeName;

use crate::QueueError;

/// Structured message attribute carrying the originating job's name. Lives
/// outside the body so correlation never has to parse free-form text.
pub const JOB_NAME_ATTRIBUTE: &str = "bid_name";

/// A message as the queue service hands it over, before decoding. Every
/// field is optional at this layer; the correlator decides what is usable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawQueueMessage {
    pub message_id: Option<String>,
    pub receipt_handle: Option<String>,
    pub body: Option<String>,
    /// Send time as the queue reports it: integer epoch milliseconds.
    pub sent_timestamp: Option<String>,
    pub job_name: Option<String>,
}

/// Seam to the shared message queue. At-least-once delivery; an undeleted
/// message reappears after the visibility timeout.
#[async_trait::async_trait]
pub trait MessageQueue: Send + Sync {
    /// One long-poll receive of up to `max_messages`, all metadata included.
    async fn receive(
        &self,
        queue_url: &str,
        max_messages: i32,
        wait: Duration,
    ) -> Result<Vec<RawQueueMessage>, QueueError>;

    /// Consume a single received message.
    async fn delete(&self, queue_url: &str, receipt_handle: &str) -> Result<(), QueueError>;
}

/// SQS-backed implementation over the official SDK client.
#[derive(Debug, Clone)]
pub struct SqsQueue {
    client: aws_sdk_sqs::Client,
}

impl SqsQueue {
    pub fn new(client: aws_sdk_sqs::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl MessageQueue for SqsQueue {
    async fn receive(
        &self,
        queue_url: &str,
        max_messages: i32,
        wait: Duration,
    ) -> Result<Vec<RawQueueMessage>, QueueError> {
        let response = self
            .client
            .receive_message()
            .queue_url(queue_url)
            .max_number_of_messages(max_messages)
            .wait_time_seconds(wait.as_secs() as i32)
            .message_system_attribute_names(MessageSystemAttributeName::All)
            .message_attribute_names("All")
            .send()
            .await
            .map_err(|err| QueueError::Receive(DisplayErrorContext(&err).to_string()))?;

        Ok(response
            .messages()
            .iter()
            .map(|message| RawQueueMessage {
                message_id: message.message_id().map(str::to_string),
                receipt_handle: message.receipt_handle().map(str::to_string),
                body: message.body().map(str::to_string),
                sent_timestamp: message
                    .attributes()
                    .and_then(|attrs| attrs.get(&MessageSystemAttributeName::SentTimestamp))
                    .cloned(),
                job_name: message
                    .message_attributes()
                    .and_then(|attrs| attrs.get(JOB_NAME_ATTRIBUTE))
                    .and_then(|value| value.string_value())
                    .map(str::to_string),
            })
            .collect())
    }

    async fn delete(&self, queue_url: &str, receipt_handle: &str) -> Result<(), QueueError> {
        self.client
            .delete_message()
            .queue_url(queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|err| QueueError::Delete(DisplayErrorContext(&err).to_string()))?;
        Ok(())
    }
}

use std::fmt;
use std::sync::Arc;

use bidrunner_core::{correlate, QueueMessage};
use chrono::TimeZone;
use chrono::Utc;
use runner_logging::{runner_debug, runner_warn};

use crate::{MessageQueue, QueueError, RawQueueMessage, ReceiveSettings};

/// Why a single raw message could not be decoded. Non-fatal: the message is
/// skipped (and left on the queue) while the rest of the batch proceeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeIssue {
    MissingField(&'static str),
    BadTimestamp(String),
}

impl fmt::Display for DecodeIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeIssue::MissingField(field) => write!(f, "missing field: {field}"),
            DecodeIssue::BadTimestamp(raw) => write!(f, "unparseable sent timestamp: {raw}"),
        }
    }
}

/// Decode one raw message into the form correlation works with.
pub fn decode_message(raw: RawQueueMessage) -> Result<QueueMessage, DecodeIssue> {
    let id = raw.message_id.ok_or(DecodeIssue::MissingField("message id"))?;
    let receipt_handle = raw
        .receipt_handle
        .ok_or(DecodeIssue::MissingField("receipt handle"))?;
    let body = raw.body.ok_or(DecodeIssue::MissingField("body"))?;
    let job_name = raw
        .job_name
        .ok_or(DecodeIssue::MissingField("job name attribute"))?;
    let raw_timestamp = raw
        .sent_timestamp
        .ok_or(DecodeIssue::MissingField("sent timestamp"))?;

    let millis: i64 = raw_timestamp
        .parse()
        .map_err(|_| DecodeIssue::BadTimestamp(raw_timestamp.clone()))?;
    let sent_at = Utc
        .timestamp_millis_opt(millis)
        .single()
        .ok_or(DecodeIssue::BadTimestamp(raw_timestamp))?;

    Ok(QueueMessage {
        id,
        receipt_handle,
        body,
        sent_at,
        job_name,
    })
}

/// Polls the shared queue and consumes exactly the messages that belong to
/// the current job.
pub struct QueueCorrelator {
    queue: Arc<dyn MessageQueue>,
    settings: ReceiveSettings,
}

impl QueueCorrelator {
    pub fn new(queue: Arc<dyn MessageQueue>, settings: ReceiveSettings) -> Self {
        Self { queue, settings }
    }

    /// One receive/filter/order/consume round.
    ///
    /// Messages attributed to other jobs are neither reported nor deleted;
    /// they stay visible for their own correlator. A failed delete is logged
    /// and the message still reported: it will reappear after the visibility
    /// timeout and may be reported again, which is acceptable for additive
    /// status narration.
    pub async fn poll_messages(
        &self,
        queue_url: &str,
        job_name: &str,
    ) -> Result<Vec<String>, QueueError> {
        let raw = self
            .queue
            .receive(queue_url, self.settings.max_messages, self.settings.wait)
            .await?;
        runner_debug!("received {} raw message(s) from queue", raw.len());

        let mut decoded = Vec::with_capacity(raw.len());
        for message in raw {
            match decode_message(message) {
                Ok(message) => decoded.push(message),
                Err(issue) => runner_warn!("skipping undecodable queue message: {issue}"),
            }
        }

        let kept = correlate(decoded, job_name);
        let mut bodies = Vec::with_capacity(kept.len());
        for message in kept {
            if let Err(err) = self.queue.delete(queue_url, &message.receipt_handle).await {
                runner_warn!(
                    "could not consume message {}; it may be reported again: {err}",
                    message.id
                );
            }
            bodies.push(message.body);
        }
        Ok(bodies)
    }
}

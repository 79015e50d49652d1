use std::collections::HashSet;

use crate::QueueMessage;

/// Selects the messages belonging to `job_name` from one received batch and
/// puts them in chronological order.
///
/// Messages for other jobs are dropped from the result; the caller must
/// leave them on the queue so their own correlator still sees them.
/// Duplicate deliveries (same message id) keep the first receipt only.
/// The sort is stable, so messages with equal timestamps keep their
/// receive order.
pub fn correlate(messages: Vec<QueueMessage>, job_name: &str) -> Vec<QueueMessage> {
    let mut seen = HashSet::new();
    let mut kept: Vec<QueueMessage> = messages
        .into_iter()
        .filter(|message| message.job_name == job_name)
        .filter(|message| seen.insert(message.id.clone()))
        .collect();
    kept.sort_by_key(|message| message.sent_at);
    kept
}

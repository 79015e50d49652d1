use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bidrunner_engine::{
    decode_message, MessageQueue, QueueCorrelator, QueueError, RawQueueMessage, ReceiveSettings,
};
use pretty_assertions::assert_eq;

const QUEUE_URL: &str = "https://queue.example/bid-status";

fn raw(id: &str, job_name: &str, sent_ms: i64, body: &str) -> RawQueueMessage {
    RawQueueMessage {
        message_id: Some(id.to_string()),
        receipt_handle: Some(format!("receipt-{id}")),
        body: Some(body.to_string()),
        sent_timestamp: Some(sent_ms.to_string()),
        job_name: Some(job_name.to_string()),
    }
}

/// In-memory queue with visibility-timeout semantics: everything undeleted
/// is visible to every receive call.
struct FakeQueue {
    messages: Mutex<Vec<RawQueueMessage>>,
    deleted: Mutex<Vec<String>>,
    failing_receipts: HashSet<String>,
}

impl FakeQueue {
    fn new(messages: Vec<RawQueueMessage>) -> Self {
        Self {
            messages: Mutex::new(messages),
            deleted: Mutex::new(Vec::new()),
            failing_receipts: HashSet::new(),
        }
    }

    fn failing_delete_of(mut self, receipt: &str) -> Self {
        self.failing_receipts.insert(receipt.to_string());
        self
    }

    fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    fn remaining_ids(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter_map(|m| m.message_id.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl MessageQueue for FakeQueue {
    async fn receive(
        &self,
        _queue_url: &str,
        max_messages: i32,
        _wait: Duration,
    ) -> Result<Vec<RawQueueMessage>, QueueError> {
        let messages = self.messages.lock().unwrap();
        Ok(messages.iter().take(max_messages as usize).cloned().collect())
    }

    async fn delete(&self, _queue_url: &str, receipt_handle: &str) -> Result<(), QueueError> {
        if self.failing_receipts.contains(receipt_handle) {
            return Err(QueueError::Delete("simulated delete failure".to_string()));
        }
        self.messages
            .lock()
            .unwrap()
            .retain(|m| m.receipt_handle.as_deref() != Some(receipt_handle));
        self.deleted.lock().unwrap().push(receipt_handle.to_string());
        Ok(())
    }
}

fn correlator(queue: Arc<FakeQueue>) -> QueueCorrelator {
    QueueCorrelator::new(queue, ReceiveSettings::default())
}

#[tokio::test]
async fn reports_matching_messages_in_timestamp_order_and_deletes_them() {
    let queue = Arc::new(FakeQueue::new(vec![
        raw("m1", "bidA", 100, "run started"),
        raw("m2", "bidA", 50, "inputs fetched"),
        raw("m3", "bidB", 75, "other job's message"),
    ]));

    let bodies = correlator(queue.clone())
        .poll_messages(QUEUE_URL, "bidA")
        .await
        .expect("poll ok");

    assert_eq!(bodies, vec!["inputs fetched", "run started"]);
    assert_eq!(queue.deleted(), vec!["receipt-m2", "receipt-m1"]);
    // The bidB message stays visible for its own correlator.
    assert_eq!(queue.remaining_ids(), vec!["m3"]);
}

#[tokio::test]
async fn consumed_messages_are_not_reported_on_the_next_poll() {
    let queue = Arc::new(FakeQueue::new(vec![raw("m1", "bidA", 100, "done")]));
    let correlator = correlator(queue.clone());

    let first = correlator.poll_messages(QUEUE_URL, "bidA").await.unwrap();
    let second = correlator.poll_messages(QUEUE_URL, "bidA").await.unwrap();

    assert_eq!(first, vec!["done"]);
    assert!(second.is_empty());
}

#[tokio::test]
async fn failed_delete_still_reports_and_message_reappears() {
    let queue = Arc::new(
        FakeQueue::new(vec![raw("m1", "bidA", 100, "done")]).failing_delete_of("receipt-m1"),
    );
    let correlator = correlator(queue.clone());

    let first = correlator.poll_messages(QUEUE_URL, "bidA").await.unwrap();
    assert_eq!(first, vec!["done"]);

    // Undeleted, so the visibility timeout will resurface it; a later poll
    // may legitimately report it again.
    let second = correlator.poll_messages(QUEUE_URL, "bidA").await.unwrap();
    assert_eq!(second, vec!["done"]);
}

#[tokio::test]
async fn undecodable_message_is_skipped_and_left_on_the_queue() {
    let mut broken = raw("m1", "bidA", 100, "no timestamp");
    broken.sent_timestamp = None;
    let queue = Arc::new(FakeQueue::new(vec![
        broken,
        raw("m2", "bidA", 200, "well formed"),
    ]));

    let bodies = correlator(queue.clone())
        .poll_messages(QUEUE_URL, "bidA")
        .await
        .unwrap();

    assert_eq!(bodies, vec!["well formed"]);
    assert_eq!(queue.remaining_ids(), vec!["m1"]);
}

#[tokio::test]
async fn receive_failure_aborts_the_whole_poll() {
    struct BrokenQueue;

    #[async_trait::async_trait]
    impl MessageQueue for BrokenQueue {
        async fn receive(
            &self,
            _queue_url: &str,
            _max_messages: i32,
            _wait: Duration,
        ) -> Result<Vec<RawQueueMessage>, QueueError> {
            Err(QueueError::Receive("simulated outage".to_string()))
        }

        async fn delete(&self, _queue_url: &str, _receipt: &str) -> Result<(), QueueError> {
            panic!("delete must not be attempted when receive fails");
        }
    }

    let correlator = QueueCorrelator::new(Arc::new(BrokenQueue), ReceiveSettings::default());
    let result = correlator.poll_messages(QUEUE_URL, "bidA").await;
    assert!(matches!(result, Err(QueueError::Receive(_))));
}

#[test]
fn decode_requires_the_job_name_attribute() {
    let mut message = raw("m1", "bidA", 100, "body");
    message.job_name = None;
    assert!(decode_message(message).is_err());
}

#[test]
fn decode_rejects_a_malformed_timestamp() {
    let mut message = raw("m1", "bidA", 100, "body");
    message.sent_timestamp = Some("not-a-number".to_string());
    assert!(decode_message(message).is_err());
}

#[test]
fn decode_converts_epoch_milliseconds() {
    let message = raw("m1", "bidA", 1_700_000_000_000, "body");
    let decoded = decode_message(message).expect("decodes");
    assert_eq!(decoded.sent_at.timestamp_millis(), 1_700_000_000_000);
}

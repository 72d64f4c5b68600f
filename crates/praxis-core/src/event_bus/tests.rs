use super::*;
use uuid::Uuid;

use crate::ledger::{ProgressEvent, StepStatus};
use crate::steps::{StepPhase, StepType};

fn event(task_id: Uuid, step_id: &str, status: StepStatus) -> ProgressEvent {
    ProgressEvent {
        task_id,
        step_id: step_id.to_string(),
        status,
        phase: StepPhase::Initialization,
        step: StepType::TaskReceived,
        agent: None,
        error: None,
        timestamp: chrono::Utc::now(),
    }
}

#[tokio::test]
async fn test_publish_subscribe() {
    let bus = TaskEventBus::new(16);
    let task_id = Uuid::new_v4();
    let mut rx = bus.subscribe(task_id);

    let delivered = bus.publish(
        task_id,
        event(task_id, "initialization_task_received", StepStatus::InProgress),
    );
    assert_eq!(delivered, 1);

    let received = rx.recv().await.unwrap();
    assert_eq!(received.task_id, task_id);
    assert_eq!(received.step_id, "initialization_task_received");
    assert_eq!(received.status, StepStatus::InProgress);
}

#[tokio::test]
async fn test_tasks_are_isolated() {
    let bus = TaskEventBus::new(16);
    let task_a = Uuid::new_v4();
    let task_b = Uuid::new_v4();

    let mut rx_a = bus.subscribe(task_a);
    let mut rx_b = bus.subscribe(task_b);

    bus.publish(task_a, event(task_a, "initialization_task_received", StepStatus::Completed));

    let received = rx_a.recv().await.unwrap();
    assert_eq!(received.task_id, task_a);
    // task B saw nothing
    assert!(matches!(
        rx_b.try_recv(),
        Err(tokio::sync::broadcast::error::TryRecvError::Empty)
    ));
}

#[test]
fn test_publish_without_subscribers_is_dropped() {
    let bus = TaskEventBus::new(16);
    let task_id = Uuid::new_v4();

    // no channel at all
    assert_eq!(
        bus.publish(task_id, event(task_id, "x", StepStatus::InProgress)),
        0
    );

    // channel exists but the only receiver is gone
    drop(bus.subscribe(task_id));
    assert_eq!(
        bus.publish(task_id, event(task_id, "x", StepStatus::InProgress)),
        0
    );
}

#[tokio::test]
async fn test_multiple_subscribers() {
    let bus = TaskEventBus::new(16);
    let task_id = Uuid::new_v4();
    let mut rx1 = bus.subscribe(task_id);
    let mut rx2 = bus.subscribe(task_id);

    assert_eq!(bus.subscriber_count(task_id), 2);

    let delivered = bus.publish(task_id, event(task_id, "completion_creating_pr", StepStatus::Completed));
    assert_eq!(delivered, 2);

    assert_eq!(rx1.recv().await.unwrap().step_id, "completion_creating_pr");
    assert_eq!(rx2.recv().await.unwrap().step_id, "completion_creating_pr");
}

#[test]
fn test_remove_task() {
    let bus = TaskEventBus::new(16);
    let task_id = Uuid::new_v4();
    let _rx = bus.subscribe(task_id);
    assert_eq!(bus.subscriber_count(task_id), 1);

    bus.remove_task(task_id);
    assert_eq!(bus.subscriber_count(task_id), 0);
}

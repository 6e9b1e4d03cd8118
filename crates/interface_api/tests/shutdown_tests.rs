//! Shutdown Sequencing Tests

use std::sync::Arc;
use std::time::Duration;

use domain_notification::sms::mock::RecordingSmsGateway;
use domain_notification::{ReminderScheduler, ReminderSettings, SmsNotificationService};
use domain_policy::{NotificationDispatcher, NotificationJob};
use interface_api::shutdown::drain_notifications;
use test_utils::{TemporalFixtures, TestPolicyBuilder};

const AGENT: &str = "+15550100";
const YEAR: Duration = Duration::from_secs(400 * 24 * 60 * 60);

fn scheduler(gateway: Arc<RecordingSmsGateway>) -> Arc<ReminderScheduler> {
    Arc::new(ReminderScheduler::new(
        gateway,
        Arc::new(TemporalFixtures::clock()),
        AGENT,
        ReminderSettings::default(),
    ))
}

#[tokio::test(start_paused = true)]
async fn test_queued_schedule_job_is_cancelled_after_drain() {
    let gateway = Arc::new(RecordingSmsGateway::new());
    let scheduler = scheduler(gateway.clone());
    let notifier = Arc::new(SmsNotificationService::new(gateway.clone(), scheduler.clone(), AGENT));
    let (dispatcher, worker) = NotificationDispatcher::spawn(notifier);

    let policies = vec![
        TestPolicyBuilder::new().renewing_in(30).build(),
        TestPolicyBuilder::new().renewing_in(60).build(),
    ];
    assert!(dispatcher.submit(NotificationJob::InitializeScheduler(policies)));
    drop(dispatcher);

    let drained = drain_notifications(worker, &scheduler, Duration::from_secs(5)).await;

    assert!(drained);
    tokio::time::sleep(YEAR).await;
    assert!(gateway.sent().await.is_empty());
    assert_eq!(scheduler.pending(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_reminders_cancelled_when_worker_is_idle() {
    let gateway = Arc::new(RecordingSmsGateway::new());
    let scheduler = scheduler(gateway.clone());
    assert!(scheduler.schedule(&[TestPolicyBuilder::new().renewing_in(30).build()]) > 0);

    let (dispatcher, worker) = NotificationDispatcher::spawn(Arc::new(SmsNotificationService::new(
        gateway.clone(),
        scheduler.clone(),
        AGENT,
    )));
    drop(dispatcher);

    assert!(drain_notifications(worker, &scheduler, Duration::from_secs(5)).await);
    tokio::time::sleep(YEAR).await;
    assert!(gateway.sent().await.is_empty());
    assert_eq!(scheduler.pending(), 0);
}

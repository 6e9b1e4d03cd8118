//! SMS Notification Service Tests
//!
//! Covers the notifier on its own and wired behind a `PolicyStore`.

use std::sync::Arc;

use core_kernel::PortError;
use domain_notification::sms::mock::RecordingSmsGateway;
use domain_notification::{
    LogSmsGateway, ReminderScheduler, ReminderSettings, SmsNotificationService,
};
use domain_policy::ports::mock::MockPolicyRepository;
use domain_policy::{NotificationDispatcher, PolicyNotifier, PolicyStore, StoreSettings};
use test_utils::{date, TemporalFixtures, TestPolicyBuilder};

const AGENT: &str = "+15550100";

fn service_with(
    gateway: Arc<RecordingSmsGateway>,
    recipient: &str,
) -> SmsNotificationService {
    let scheduler = Arc::new(ReminderScheduler::new(
        gateway.clone(),
        Arc::new(TemporalFixtures::clock()),
        recipient,
        ReminderSettings::default(),
    ));
    SmsNotificationService::new(gateway, scheduler, recipient)
}

#[tokio::test]
async fn test_policy_added_goes_to_agent() {
    let gateway = Arc::new(RecordingSmsGateway::new());
    let service = service_with(gateway.clone(), AGENT);
    let policy = TestPolicyBuilder::new().with_name("Arjun Mehta").build();

    let delivered = service.send_policy_added(&policy).await.unwrap();

    assert!(delivered);
    let sent = gateway.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, AGENT);
    assert!(sent[0].body.starts_with("New policy added: Arjun Mehta"));
}

#[tokio::test]
async fn test_missing_agent_number_skips_send() {
    let gateway = Arc::new(RecordingSmsGateway::new());
    let service = service_with(gateway.clone(), "");

    let delivered = service
        .send_policy_added(&TestPolicyBuilder::new().build())
        .await
        .unwrap();

    assert!(!delivered);
    assert!(gateway.sent().await.is_empty());
}

#[tokio::test]
async fn test_gateway_failure_is_returned() {
    let gateway = Arc::new(RecordingSmsGateway::new());
    gateway.fail_sends();
    let service = service_with(gateway, AGENT);

    let error = service
        .send_policy_added(&TestPolicyBuilder::new().build())
        .await
        .unwrap_err();

    assert!(matches!(error, PortError::ServiceUnavailable { .. }));
}

#[tokio::test]
async fn test_log_gateway_reports_not_delivered() {
    let scheduler = Arc::new(ReminderScheduler::new(
        Arc::new(LogSmsGateway),
        Arc::new(TemporalFixtures::clock()),
        AGENT,
        ReminderSettings::default(),
    ));
    let service = SmsNotificationService::new(Arc::new(LogSmsGateway), scheduler, AGENT);

    let delivered = service
        .send_policy_added(&TestPolicyBuilder::new().build())
        .await
        .unwrap();

    assert!(!delivered);
}

#[tokio::test]
async fn test_initialize_scheduler_plans_reminders() {
    let gateway = Arc::new(RecordingSmsGateway::new());
    let service = service_with(gateway, AGENT);
    let policies = vec![
        TestPolicyBuilder::new().with_date_of_birth(date(1980, 9, 1)).renewing_in(30).build(),
        TestPolicyBuilder::new().with_date_of_birth(date(1992, 1, 15)).renewing_in(-5).build(),
    ];

    service.initialize_scheduler(&policies).await.unwrap();

    assert_eq!(service.scheduler().pending(), 3);
    service.scheduler().cancel_all();
}

#[tokio::test]
async fn test_store_add_sends_one_sms() {
    let gateway = Arc::new(RecordingSmsGateway::new());
    let service = Arc::new(service_with(gateway.clone(), AGENT));
    let (dispatcher, worker) = NotificationDispatcher::spawn(service.clone());
    let store = PolicyStore::new(
        Arc::new(MockPolicyRepository::new()),
        dispatcher,
        Arc::new(TemporalFixtures::clock()),
        StoreSettings::default(),
    );

    store.load().await;
    let policy = store
        .add_policy(TestPolicyBuilder::new().with_name("Kavya Rao").build_new())
        .await;
    drop(store);
    worker.await.unwrap();

    let sent = gateway.sent().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].body.contains("Kavya Rao"));
    assert!(sent[0].body.contains(&policy.insurance_type));
}

//! SMS-backed `PolicyNotifier`

use std::sync::Arc;

use async_trait::async_trait;

use core_kernel::{DomainPort, PortError};
use domain_policy::{Policy, PolicyNotifier};

use crate::messages;
use crate::scheduler::ReminderScheduler;
use crate::sms::{SmsGateway, SmsMessage};

/// Sends policy notifications to the agent's phone
///
/// Policies carry no contact details, so every message goes to the single
/// configured agent number. An empty number turns sends into no-ops.
pub struct SmsNotificationService {
    gateway: Arc<dyn SmsGateway>,
    scheduler: Arc<ReminderScheduler>,
    recipient: String,
}

impl SmsNotificationService {
    pub fn new(
        gateway: Arc<dyn SmsGateway>,
        scheduler: Arc<ReminderScheduler>,
        recipient: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            scheduler,
            recipient: recipient.into(),
        }
    }

    pub fn scheduler(&self) -> &Arc<ReminderScheduler> {
        &self.scheduler
    }
}

impl std::fmt::Debug for SmsNotificationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmsNotificationService")
            .field("recipient", &self.recipient)
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}

impl DomainPort for SmsNotificationService {}

#[async_trait]
impl PolicyNotifier for SmsNotificationService {
    async fn send_policy_added(&self, policy: &Policy) -> Result<bool, PortError> {
        if self.recipient.trim().is_empty() {
            tracing::debug!(policy_id = %policy.id, "No agent number configured, skipping SMS");
            return Ok(false);
        }

        let message = SmsMessage::new(self.recipient.clone(), messages::policy_added(policy));
        let receipt = self.gateway.send(&message).await?;
        Ok(receipt.delivered)
    }

    async fn initialize_scheduler(&self, policies: &[Policy]) -> Result<(), PortError> {
        self.scheduler.schedule(policies);
        Ok(())
    }
}

//! Reminder Scheduler
//!
//! Plans birthday and renewal reminders for the agent and runs them as
//! sleeping tokio tasks. Each call to `schedule` replaces the previous plan,
//! so the scheduler always reflects the most recently loaded policy list.
//!
//! Reminders fire at `send_hour` local time in the clock's timezone:
//!
//! - **Birthday**: on the next anniversary of the date of birth. A Feb 29
//!   birthday falls on Feb 28 in non-leap years.
//! - **Renewal**: `renewal_lead_days` before the renewal date.
//!
//! Reminders whose fire time has already passed are not planned.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use tokio::task::JoinSet;

use core_kernel::{calculate_age, next_anniversary, Clock, PolicyId, ReminderId, Timezone};
use domain_policy::Policy;

use crate::messages;
use crate::sms::{SmsGateway, SmsMessage};

/// When and how far ahead reminders are sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderSettings {
    /// Days before the renewal date that the renewal reminder fires
    pub renewal_lead_days: i64,
    /// Local hour of day (0-23) at which reminders fire
    pub send_hour: u32,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            renewal_lead_days: 7,
            send_hour: 9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderKind {
    Birthday,
    Renewal,
}

impl fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReminderKind::Birthday => f.write_str("birthday"),
            ReminderKind::Renewal => f.write_str("renewal"),
        }
    }
}

/// A planned message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: ReminderId,
    pub policy_id: PolicyId,
    pub kind: ReminderKind,
    pub fire_at: DateTime<Utc>,
    pub body: String,
}

/// Plans reminders and runs them until they fire or are replaced
pub struct ReminderScheduler {
    gateway: Arc<dyn SmsGateway>,
    clock: Arc<dyn Clock>,
    recipient: String,
    settings: ReminderSettings,
    tasks: Mutex<JoinSet<()>>,
}

impl ReminderScheduler {
    pub fn new(
        gateway: Arc<dyn SmsGateway>,
        clock: Arc<dyn Clock>,
        recipient: impl Into<String>,
        settings: ReminderSettings,
    ) -> Self {
        Self {
            gateway,
            clock,
            recipient: recipient.into(),
            settings,
            tasks: Mutex::new(JoinSet::new()),
        }
    }

    pub fn settings(&self) -> ReminderSettings {
        self.settings
    }

    /// Computes the reminders for `policies` that fire after `now`
    ///
    /// The result is ordered by fire time; reminders firing at the same
    /// instant keep policy order.
    pub fn plan(&self, policies: &[Policy], now: DateTime<Utc>) -> Vec<Reminder> {
        let timezone = self.clock.timezone();
        let today = timezone.date_of(now);
        let mut reminders = Vec::with_capacity(policies.len() * 2);

        for policy in policies {
            if let Some(reminder) = self.plan_birthday(policy, &timezone, today, now) {
                reminders.push(reminder);
            }
            if let Some(reminder) = self.plan_renewal(policy, &timezone, now) {
                reminders.push(reminder);
            }
        }

        reminders.sort_by_key(|reminder| reminder.fire_at);
        reminders
    }

    fn plan_birthday(
        &self,
        policy: &Policy,
        timezone: &Timezone,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Option<Reminder> {
        let mut birthday = next_anniversary(policy.date_of_birth, today);
        let mut fire_at = timezone.at_hour(birthday, self.settings.send_hour)?;

        if fire_at <= now {
            // Today's send hour already passed.
            birthday = next_anniversary(policy.date_of_birth, today + Duration::days(1));
            fire_at = timezone.at_hour(birthday, self.settings.send_hour)?;
        }

        let turning = calculate_age(policy.date_of_birth, birthday);
        Some(Reminder {
            id: ReminderId::generate(),
            policy_id: policy.id.clone(),
            kind: ReminderKind::Birthday,
            fire_at,
            body: messages::birthday_reminder(policy, birthday, turning),
        })
    }

    fn plan_renewal(
        &self,
        policy: &Policy,
        timezone: &Timezone,
        now: DateTime<Utc>,
    ) -> Option<Reminder> {
        let lead = self.settings.renewal_lead_days;
        let send_on = policy.renewal_date - Duration::days(lead);
        let fire_at = timezone.at_hour(send_on, self.settings.send_hour)?;

        if fire_at <= now {
            return None;
        }

        Some(Reminder {
            id: ReminderId::generate(),
            policy_id: policy.id.clone(),
            kind: ReminderKind::Renewal,
            fire_at,
            body: messages::renewal_reminder(policy, lead),
        })
    }

    /// Replaces all pending reminders with a fresh plan for `policies`
    ///
    /// Must be called from within a tokio runtime. Returns the number of
    /// reminders scheduled.
    pub fn schedule(&self, policies: &[Policy]) -> usize {
        let now = self.clock.now();
        let reminders = self.plan(policies, now);
        let count = reminders.len();

        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.abort_all();
        *tasks = JoinSet::new();

        for reminder in reminders {
            let delay = (reminder.fire_at - now).to_std().unwrap_or_default();
            let gateway = Arc::clone(&self.gateway);
            let message = SmsMessage::new(self.recipient.clone(), reminder.body.clone());
            tasks.spawn(async move {
                tokio::time::sleep(delay).await;
                deliver(gateway.as_ref(), &reminder, &message).await;
            });
        }

        tracing::info!(
            policies = policies.len(),
            reminders = count,
            "Reminders scheduled"
        );
        count
    }

    /// Number of reminders that have not fired yet
    pub fn pending(&self) -> usize {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        while tasks.try_join_next().is_some() {}
        tasks.len()
    }

    /// Drops every pending reminder
    pub fn cancel_all(&self) {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .abort_all();
    }
}

async fn deliver(gateway: &dyn SmsGateway, reminder: &Reminder, message: &SmsMessage) {
    match gateway.send(message).await {
        Ok(receipt) if receipt.delivered => {
            tracing::info!(
                reminder_id = %reminder.id,
                policy_id = %reminder.policy_id,
                kind = %reminder.kind,
                "Reminder sent"
            );
        }
        Ok(_) => {
            tracing::debug!(
                reminder_id = %reminder.id,
                policy_id = %reminder.policy_id,
                kind = %reminder.kind,
                "Reminder not delivered"
            );
        }
        Err(error) => {
            tracing::error!(
                reminder_id = %reminder.id,
                policy_id = %reminder.policy_id,
                kind = %reminder.kind,
                error = %error,
                "Failed to send reminder"
            );
        }
    }
}

impl fmt::Debug for ReminderScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReminderScheduler")
            .field("recipient", &self.recipient)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

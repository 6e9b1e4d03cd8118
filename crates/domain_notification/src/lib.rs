//! Policy Notifications
//!
//! SMS delivery for the policy store: an announcement whenever a policy is
//! added, plus birthday and renewal reminders planned from the loaded list.
//!
//! # Components
//!
//! - **Port**: `SmsGateway`, with `HttpSmsGateway` and `LogSmsGateway`
//! - **Templates**: `messages`
//! - **Scheduling**: `ReminderScheduler`
//! - **Notifier**: `SmsNotificationService`, the `PolicyNotifier` handed to
//!   the store's dispatcher
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_notification::{
//!     HttpSmsGateway, ReminderScheduler, ReminderSettings, SmsNotificationService,
//! };
//!
//! let gateway = Arc::new(HttpSmsGateway::new(config)?);
//! let scheduler = Arc::new(ReminderScheduler::new(
//!     gateway.clone(), clock, "+15550100", ReminderSettings::default(),
//! ));
//! let notifier = Arc::new(SmsNotificationService::new(gateway, scheduler, "+15550100"));
//! let (dispatcher, worker) = NotificationDispatcher::spawn(notifier);
//! ```

pub mod error;
pub mod messages;
pub mod scheduler;
pub mod service;
pub mod sms;

pub use error::NotificationError;
pub use scheduler::{Reminder, ReminderKind, ReminderScheduler, ReminderSettings};
pub use service::SmsNotificationService;
pub use sms::{HttpSmsGateway, LogSmsGateway, SmsGateway, SmsGatewayConfig, SmsMessage, SmsReceipt};

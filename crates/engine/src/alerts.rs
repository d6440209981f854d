//! Budget alerts and local notifications.
//!
//! The budget alert is a two-state machine with a hysteresis band: it fires
//! once when spending first exceeds the budget and re-arms only after
//! spending drops to 90% of the budget or below.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::{BudgetSettings, MoneyCents};

/// Re-arm threshold, as `numerator / denominator` of the budget.
const REARM_NUMERATOR: i128 = 9;
const REARM_DENOMINATOR: i128 = 10;

/// Percentage above which the budget card turns into a warning.
const WARNING_PERCENT: f64 = 80.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Importance {
    Default,
    High,
}

/// Delivery channel of a local notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    BudgetAlerts,
    PasswordChanges,
}

impl NotificationChannel {
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::BudgetAlerts => "budget_channel",
            Self::PasswordChanges => "password_change_channel",
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::BudgetAlerts => "Budget Alerts",
            Self::PasswordChanges => "Password Changes",
        }
    }

    #[must_use]
    pub fn importance(self) -> Importance {
        match self {
            Self::BudgetAlerts => Importance::High,
            Self::PasswordChanges => Importance::Default,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub channel: NotificationChannel,
    pub title: String,
    pub body: String,
}

impl Notification {
    #[must_use]
    pub fn budget_exceeded(event: &BudgetExceeded) -> Self {
        Self {
            channel: NotificationChannel::BudgetAlerts,
            title: "Budget Exceeded!".to_string(),
            body: format!(
                "You spent {} (Budget: {})",
                event.total, event.budget
            ),
        }
    }

    #[must_use]
    pub fn password_changed() -> Self {
        Self {
            channel: NotificationChannel::PasswordChanges,
            title: "Password Changed".to_string(),
            body: "Your password has been changed successfully".to_string(),
        }
    }
}

/// Sink for local notifications.
///
/// Delivery is best effort: implementations log failures instead of
/// returning them.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification);
    }
}

/// Writes every notification to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        tracing::info!(
            channel = notification.channel.id(),
            title = %notification.title,
            "{}",
            notification.body
        );
    }
}

/// Forwards notifications to whoever holds the receiving half.
#[derive(Clone, Debug)]
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        if self.sender.send(notification).is_err() {
            tracing::warn!("notification dropped: receiver closed");
        }
    }
}

/// Emitted when spending crosses the budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BudgetExceeded {
    pub total: MoneyCents,
    pub budget: MoneyCents,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AlertState {
    #[default]
    Armed,
    Fired,
}

/// Session-scoped de-duplication of the budget-exceeded notification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BudgetAlert {
    state: AlertState,
}

impl BudgetAlert {
    #[must_use]
    pub fn state(&self) -> AlertState {
        self.state
    }

    /// Feed the current total; returns an event the first time the budget is
    /// exceeded since the last re-arm.
    pub fn observe(&mut self, total: MoneyCents, settings: &BudgetSettings) -> Option<BudgetExceeded> {
        let budget = settings.budget;
        if settings.notify_on_exceed && budget.is_positive() && total > budget {
            if self.state == AlertState::Armed {
                self.state = AlertState::Fired;
                return Some(BudgetExceeded { total, budget });
            }
        } else if within_rearm_band(total, budget) {
            self.state = AlertState::Armed;
        }
        None
    }
}

fn within_rearm_band(total: MoneyCents, budget: MoneyCents) -> bool {
    i128::from(total.cents()) * REARM_DENOMINATOR <= i128::from(budget.cents()) * REARM_NUMERATOR
}

/// Budget alert plus the notifier it reports to.
#[derive(Debug)]
pub struct NotificationDispatcher<N> {
    alert: Mutex<BudgetAlert>,
    notifier: N,
}

impl<N: Notifier> NotificationDispatcher<N> {
    pub fn new(notifier: N) -> Self {
        Self {
            alert: Mutex::new(BudgetAlert::default()),
            notifier,
        }
    }

    #[must_use]
    pub fn alert_state(&self) -> AlertState {
        self.alert
            .lock()
            .map(|alert| alert.state())
            .unwrap_or_default()
    }

    /// Run the budget alert for `total`; returns `true` if a notification was
    /// sent.
    pub fn observe_total(&self, total: MoneyCents, settings: &BudgetSettings) -> bool {
        let event = match self.alert.lock() {
            Ok(mut alert) => alert.observe(total, settings),
            Err(_) => {
                tracing::error!("budget alert state poisoned");
                return false;
            }
        };
        match event {
            Some(event) => {
                tracing::debug!(total = %event.total, budget = %event.budget, "budget exceeded");
                self.notifier.notify(Notification::budget_exceeded(&event));
                true
            }
            None => false,
        }
    }

    pub fn password_changed(&self) {
        self.notifier.notify(Notification::password_changed());
    }
}

/// Colour band of the home-screen budget card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetLevel {
    Unset,
    Ok,
    Warning,
    Exceeded,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BudgetStatus {
    pub total: MoneyCents,
    pub budget: MoneyCents,
    pub percent: f64,
    pub level: BudgetLevel,
    /// How far over budget; zero when within.
    pub over_by: MoneyCents,
}

impl BudgetStatus {
    #[must_use]
    pub fn new(total: MoneyCents, budget: MoneyCents) -> Self {
        let percent = total.percent_of(budget);
        let level = if !budget.is_positive() {
            BudgetLevel::Unset
        } else if total > budget {
            BudgetLevel::Exceeded
        } else if percent > WARNING_PERCENT {
            BudgetLevel::Warning
        } else {
            BudgetLevel::Ok
        };
        let over_by = if level == BudgetLevel::Exceeded {
            total - budget
        } else {
            MoneyCents::ZERO
        };
        Self {
            total,
            budget,
            percent,
            level,
            over_by,
        }
    }
}

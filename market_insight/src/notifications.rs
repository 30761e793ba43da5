//! User notifications and custom alert rules

use crate::alerts::{custom_alert, AlertField, CustomCondition, Severity};
use crate::data::DataStore;
use crate::error::{MarketError, Result};
use crate::weather::WeatherReading;
use chrono::{DateTime, Duration, Local};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    PriceAlert,
    WeatherAlert,
    MarketInsight,
    CustomAlert,
}

/// A stored notice; custom alerts carry their rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    pub severity: Severity,
    pub crop: String,
    pub timestamp: DateTime<Local>,
    pub read: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<CustomCondition>,
}

/// Notification before the store assigns its id
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub user_id: String,
    pub kind: NotificationKind,
    pub message: String,
    pub severity: Severity,
    pub crop: String,
    pub timestamp: DateTime<Local>,
    pub rule: Option<CustomCondition>,
}

/// Append-only notification log shared across requests
pub trait NotificationStore: Debug + Send + Sync {
    /// Store a notification and return it with its assigned id
    fn append(&self, notification: NewNotification) -> Notification;

    /// The last `limit` notifications, oldest first
    fn recent(&self, limit: usize) -> Vec<Notification>;

    /// Custom alerts that are still armed
    fn active_rules(&self) -> Vec<Notification>;

    /// Returns false when no notification has that id
    fn mark_read(&self, id: u64) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
struct Log {
    next_id: u64,
    entries: Vec<Notification>,
}

/// Mutex-guarded in-memory log
#[derive(Debug, Default)]
pub struct InMemoryNotificationStore {
    log: Mutex<Log>,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NotificationStore for InMemoryNotificationStore {
    fn append(&self, notification: NewNotification) -> Notification {
        let mut log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
        log.next_id += 1;
        let stored = Notification {
            id: log.next_id,
            user_id: notification.user_id,
            kind: notification.kind,
            message: notification.message,
            severity: notification.severity,
            crop: notification.crop,
            timestamp: notification.timestamp,
            read: false,
            rule: notification.rule,
        };
        log.entries.push(stored.clone());
        stored
    }

    fn recent(&self, limit: usize) -> Vec<Notification> {
        let log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
        let start = log.entries.len().saturating_sub(limit);
        log.entries[start..].to_vec()
    }

    fn active_rules(&self) -> Vec<Notification> {
        let log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
        log.entries
            .iter()
            .filter(|n| n.kind == NotificationKind::CustomAlert && n.rule.is_some())
            .cloned()
            .collect()
    }

    fn mark_read(&self, id: u64) -> bool {
        let mut log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
        match log.entries.iter_mut().find(|n| n.id == id) {
            Some(entry) => {
                entry.read = true;
                true
            }
            None => false,
        }
    }

    fn len(&self) -> usize {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }
}

/// Request to arm a custom alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomAlertRequest {
    /// `price` or `temperature`
    pub field: String,
    pub operator: String,
    pub threshold: f64,
    #[serde(default)]
    pub crop_type: Option<String>,
}

/// A custom rule whose condition currently holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggeredAlert {
    pub notification_id: u64,
    pub message: String,
    pub timestamp: DateTime<Local>,
}

/// Notification operations over an injected store
#[derive(Debug, Clone)]
pub struct NotificationCenter {
    store: Arc<dyn NotificationStore>,
}

impl NotificationCenter {
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryNotificationStore::new()))
    }

    /// Recent notifications; an empty log is first seeded with demo notices
    pub fn user_notifications(&self, user_id: &str, limit: usize) -> Vec<Notification> {
        if self.store.is_empty() {
            debug!("Seeding demo notifications for {}", user_id);
            for notice in demo_notifications(user_id) {
                self.store.append(notice);
            }
        }
        self.store.recent(limit)
    }

    /// Validate and store a custom alert rule
    pub fn create_custom_alert(
        &self,
        user_id: &str,
        request: &CustomAlertRequest,
    ) -> Result<Notification> {
        let rule = CustomCondition::parse(&request.field, &request.operator, request.threshold)?;
        let crop = request
            .crop_type
            .as_deref()
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        if rule.field == AlertField::Price && crop.is_none() {
            return Err(MarketError::InvalidParameter(
                "price alerts need a crop_type".to_string(),
            ));
        }

        let crop = crop.unwrap_or_else(|| "all".to_string());
        let notification = self.store.append(NewNotification {
            user_id: user_id.to_string(),
            kind: NotificationKind::CustomAlert,
            message: format!(
                "{} {} {} for {}",
                field_name(rule.field),
                rule.operator,
                rule.threshold,
                crop
            ),
            severity: Severity::Medium,
            crop,
            timestamp: Local::now(),
            rule: Some(rule),
        });
        info!("Custom alert {} created for {}", notification.id, user_id);
        Ok(notification)
    }

    /// Rules whose condition holds against the latest data
    pub fn check_custom_alerts(
        &self,
        store: &DataStore,
        weather: Option<&WeatherReading>,
    ) -> Vec<TriggeredAlert> {
        let mut triggered = Vec::new();
        for notification in self.store.active_rules() {
            let Some(rule) = notification.rule else {
                continue;
            };

            let message = match rule.field {
                AlertField::Price => store
                    .series(&notification.crop)
                    .and_then(|series| series.last())
                    .filter(|last| custom_alert(&rule, last.price))
                    .map(|last| {
                        format!(
                            "Price alert: {} price is {:.2}",
                            notification.crop, last.price
                        )
                    }),
                AlertField::Temperature => weather
                    .filter(|w| custom_alert(&rule, w.temperature))
                    .map(|w| format!("Weather alert: Temperature is {}°C", w.temperature)),
            };

            if let Some(message) = message {
                triggered.push(TriggeredAlert {
                    notification_id: notification.id,
                    message,
                    timestamp: Local::now(),
                });
            }
        }
        triggered
    }

    pub fn mark_read(&self, id: u64) -> Result<()> {
        if self.store.mark_read(id) {
            Ok(())
        } else {
            Err(MarketError::InvalidParameter(format!(
                "no notification with id {}",
                id
            )))
        }
    }
}

fn field_name(field: AlertField) -> &'static str {
    match field {
        AlertField::Price => "price",
        AlertField::Temperature => "temperature",
    }
}

fn demo_notifications(user_id: &str) -> Vec<NewNotification> {
    let now = Local::now();
    let notice = |kind, message: &str, severity, crop: &str, age_hours| NewNotification {
        user_id: user_id.to_string(),
        kind,
        message: message.to_string(),
        severity,
        crop: crop.to_string(),
        timestamp: now - Duration::hours(age_hours),
        rule: None,
    };

    vec![
        notice(
            NotificationKind::PriceAlert,
            "Wheat prices have increased by 15% in the last week",
            Severity::Medium,
            "wheat",
            0,
        ),
        notice(
            NotificationKind::WeatherAlert,
            "Heavy rainfall expected in your area - monitor for waterlogging",
            Severity::High,
            "all",
            2,
        ),
        notice(
            NotificationKind::MarketInsight,
            "Corn market showing high volatility - consider hedging strategies",
            Severity::Low,
            "corn",
            6,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MarketRecord;
    use chrono::NaiveDate;

    fn request(field: &str, op: &str, threshold: f64, crop: Option<&str>) -> CustomAlertRequest {
        CustomAlertRequest {
            field: field.to_string(),
            operator: op.to_string(),
            threshold,
            crop_type: crop.map(str::to_string),
        }
    }

    #[test]
    fn test_demo_seeding_happens_once() {
        let center = NotificationCenter::in_memory();
        let first = center.user_notifications("demo", 10);
        assert_eq!(first.len(), 3);
        assert_eq!(first[0].id, 1);

        let again = center.user_notifications("demo", 2);
        assert_eq!(again.len(), 2);
        assert_eq!(again[1].id, 3);
    }

    #[test]
    fn test_mark_read() {
        let center = NotificationCenter::in_memory();
        center.user_notifications("demo", 10);
        center.mark_read(2).unwrap();
        assert!(center.user_notifications("demo", 10)[1].read);
        assert!(matches!(
            center.mark_read(99),
            Err(MarketError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_create_custom_alert_validation() {
        let center = NotificationCenter::in_memory();
        assert!(center
            .create_custom_alert("u1", &request("price", "~", 1.0, Some("wheat")))
            .is_err());
        assert!(center
            .create_custom_alert("u1", &request("price", ">", 1.0, None))
            .is_err());

        let created = center
            .create_custom_alert("u1", &request("temperature", ">=", 30.0, None))
            .unwrap();
        assert_eq!(created.kind, NotificationKind::CustomAlert);
        assert_eq!(created.crop, "all");
        assert_eq!(created.message, "temperature >= 30 for all");
    }

    #[test]
    fn test_check_custom_alerts() {
        let store = DataStore::new(
            vec![],
            vec![MarketRecord {
                date: NaiveDate::from_ymd_opt(2023, 5, 1).unwrap(),
                crop_type: "wheat".to_string(),
                price: 250.0,
                demand: 100.0,
            }],
        );
        let center = NotificationCenter::in_memory();
        let price = center
            .create_custom_alert("u1", &request("price", ">", 200.0, Some("wheat")))
            .unwrap();
        center
            .create_custom_alert("u1", &request("price", "<", 200.0, Some("wheat")))
            .unwrap();
        let heat = center
            .create_custom_alert("u1", &request("temperature", ">", 30.0, None))
            .unwrap();

        let triggered =
            center.check_custom_alerts(&store, Some(&WeatherReading::new(33.0, 50.0, 0.0)));
        let ids: Vec<u64> = triggered.iter().map(|t| t.notification_id).collect();
        assert_eq!(ids, vec![price.id, heat.id]);
        assert_eq!(triggered[0].message, "Price alert: wheat price is 250.00");

        assert_eq!(center.check_custom_alerts(&store, None).len(), 1);
    }
}

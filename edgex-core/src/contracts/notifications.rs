//! support-notifications objects

use super::metadata::is_zero;
use super::Template;
use serde::{Deserialize, Serialize};

/// Category a notification belongs to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationCategory {
    Security,
    #[default]
    HwHealth,
    SwHealth,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NotificationSeverity {
    Critical,
    #[default]
    Normal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NotificationStatus {
    #[default]
    New,
    Processed,
    Escalated,
}

/// A notification sent through support-notifications
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Notification {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub slug: String,
    pub sender: String,
    pub category: NotificationCategory,
    pub severity: NotificationSeverity,
    pub content: String,
    pub description: String,
    pub status: NotificationStatus,
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub content_type: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub created: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub modified: i64,
}

impl Template for Notification {
    const KIND: &'static str = "notification";

    fn template() -> Self {
        Self {
            slug: "my-notification".to_string(),
            sender: "edgexctl".to_string(),
            content: "Notification body".to_string(),
            description: "Describe the notification".to_string(),
            labels: vec!["example".to_string()],
            content_type: "text/plain".to_string(),
            ..Default::default()
        }
    }
}

/// Transport used to deliver a notification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChannelType {
    #[default]
    Rest,
    Email,
}

/// Delivery channel of a subscription
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Channel {
    #[serde(rename = "type")]
    pub channel_type: ChannelType,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mail_addresses: Vec<String>,
}

/// A subscription to notification categories or labels
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Subscription {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub slug: String,
    pub receiver: String,
    pub description: String,
    pub subscribed_categories: Vec<NotificationCategory>,
    pub subscribed_labels: Vec<String>,
    pub channels: Vec<Channel>,
    #[serde(skip_serializing_if = "is_zero")]
    pub created: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub modified: i64,
}

impl Template for Subscription {
    const KIND: &'static str = "subscription";

    fn template() -> Self {
        Self {
            slug: "my-subscription".to_string(),
            receiver: "System Administrator".to_string(),
            description: "Describe the subscription".to_string(),
            subscribed_categories: vec![NotificationCategory::HwHealth],
            subscribed_labels: vec!["example".to_string()],
            channels: vec![Channel {
                channel_type: ChannelType::Rest,
                url: "http://localhost:7770/alerts".to_string(),
                mail_addresses: Vec::new(),
            }],
            ..Default::default()
        }
    }
}

//! support-scheduler objects

use super::metadata::is_zero;
use super::Template;
use serde::{Deserialize, Serialize};

/// A schedule that interval actions fire on
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Interval {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    /// Start time, `YYYYMMDD'T'HHmmss`
    #[serde(skip_serializing_if = "String::is_empty")]
    pub start: String,
    /// End time, `YYYYMMDD'T'HHmmss`
    #[serde(skip_serializing_if = "String::is_empty")]
    pub end: String,
    /// Go duration string such as `30s` or `1h`
    pub frequency: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cron: String,
    pub run_once: bool,
    #[serde(skip_serializing_if = "is_zero")]
    pub created: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub modified: i64,
}

impl Template for Interval {
    const KIND: &'static str = "interval";

    fn template() -> Self {
        Self {
            name: "my-interval".to_string(),
            start: "20200101T000000".to_string(),
            frequency: "30m".to_string(),
            ..Default::default()
        }
    }
}

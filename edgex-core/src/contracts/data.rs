//! core-data objects

use super::metadata::is_zero;
use serde::{Deserialize, Serialize};

/// A single sensor value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Reading {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Time the reading was pushed upstream, zero if never
    #[serde(skip_serializing_if = "is_zero")]
    pub pushed: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub created: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub origin: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub modified: i64,
    pub device: String,
    /// Name of the device resource that produced the value
    pub name: String,
    pub value: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub value_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub float_encoding: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub media_type: String,
}

/// A batch of readings emitted by one device
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Event {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub pushed: i64,
    pub device: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub created: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub modified: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub origin: i64,
    pub readings: Vec<Reading>,
}

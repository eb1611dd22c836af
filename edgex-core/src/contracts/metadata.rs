//! core-metadata objects

use super::Template;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Administrative state of a device or device service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AdminState {
    Locked,
    #[default]
    Unlocked,
}

/// Operating state of a device or device service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperatingState {
    #[default]
    Enabled,
    Disabled,
}

/// Reference to another object by name (and optionally id)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceRef {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
}

impl ResourceRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
        }
    }
}

/// Periodic reading schedule attached to a device
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AutoEvent {
    pub frequency: String,
    pub on_change: bool,
    pub resource: String,
}

/// A device registered with core-metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Device {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub admin_state: AdminState,
    pub operating_state: OperatingState,
    /// Protocol name to protocol properties
    pub protocols: BTreeMap<String, BTreeMap<String, String>>,
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<serde_json::Value>,
    pub service: ResourceRef,
    pub profile: ResourceRef,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub auto_events: Vec<AutoEvent>,
    #[serde(skip_serializing_if = "is_zero")]
    pub last_connected: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub last_reported: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub created: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub modified: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub origin: i64,
}

impl Template for Device {
    const KIND: &'static str = "device";

    fn template() -> Self {
        let mut properties = BTreeMap::new();
        properties.insert("Address".to_string(), "localhost".to_string());
        properties.insert("Port".to_string(), "502".to_string());
        properties.insert("UnitID".to_string(), "1".to_string());

        let mut protocols = BTreeMap::new();
        protocols.insert("modbus-tcp".to_string(), properties);

        Self {
            name: "my-device".to_string(),
            description: "Describe the device".to_string(),
            protocols,
            labels: vec!["example".to_string()],
            service: ResourceRef::named("device-service-name"),
            profile: ResourceRef::named("device-profile-name"),
            ..Default::default()
        }
    }
}

/// Network address of a service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Addressable {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    pub protocol: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub method: String,
    pub address: String,
    pub port: u16,
    pub path: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub publisher: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub topic: String,
}

/// A device service registered with core-metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeviceService {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub admin_state: AdminState,
    pub operating_state: OperatingState,
    pub labels: Vec<String>,
    pub addressable: Addressable,
    #[serde(skip_serializing_if = "is_zero")]
    pub last_connected: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub last_reported: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub created: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub modified: i64,
}

impl Template for DeviceService {
    const KIND: &'static str = "device service";

    fn template() -> Self {
        Self {
            name: "my-device-service".to_string(),
            description: "Describe the device service".to_string(),
            labels: vec!["example".to_string()],
            addressable: Addressable {
                name: "my-device-service-address".to_string(),
                protocol: "HTTP".to_string(),
                method: "POST".to_string(),
                address: "localhost".to_string(),
                port: 49990,
                path: "/api/v1/callback".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

/// A device profile; resources and commands are kept as raw JSON
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeviceProfile {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub manufacturer: String,
    pub model: String,
    pub labels: Vec<String>,
    pub device_resources: Vec<serde_json::Value>,
    pub device_commands: Vec<serde_json::Value>,
    pub core_commands: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "is_zero")]
    pub created: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub modified: i64,
}

pub(crate) fn is_zero(value: &i64) -> bool {
    *value == 0
}

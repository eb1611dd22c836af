//! EdgeX v1 contract objects
//!
//! These mirror the JSON documents exchanged with the platform's
//! microservices. Every struct defaults missing fields so that responses
//! from newer service releases still deserialize.
//!
//! - [`metadata`] - devices, device services, profiles, addressables
//! - [`data`] - events and readings
//! - [`notifications`] - notifications, subscriptions, channels
//! - [`scheduler`] - intervals

pub mod data;
pub mod metadata;
pub mod notifications;
pub mod scheduler;

pub use data::{Event, Reading};
pub use metadata::{
    Addressable, AdminState, AutoEvent, Device, DeviceProfile, DeviceService, OperatingState,
    ResourceRef,
};
pub use notifications::{
    Channel, ChannelType, Notification, NotificationCategory, NotificationSeverity,
    NotificationStatus, Subscription,
};
pub use scheduler::Interval;

use serde::{Deserialize, Serialize};

/// Response of the `/api/version` route
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionResponse {
    pub version: String,
}

/// Contract objects that can be created from the CLI.
///
/// The template is what the user sees in the editor when adding a new
/// object interactively.
pub trait Template: Serialize + Sized {
    /// Human-readable kind, e.g. `device`
    const KIND: &'static str;

    /// Example object with every commonly edited field filled in
    fn template() -> Self;

    /// The template rendered as pretty JSON followed by a newline
    fn template_bytes() -> crate::Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec_pretty(&Self::template())?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}

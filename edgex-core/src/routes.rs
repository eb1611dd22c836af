//! REST routes of the EdgeX v1 API

/// Version route, served outside the versioned prefix
pub const VERSION: &str = "/api/version";

pub const PING: &str = "/api/v1/ping";

// core-metadata
pub const DEVICE: &str = "/api/v1/device";
pub const DEVICE_SERVICE: &str = "/api/v1/deviceservice";
pub const DEVICE_PROFILE: &str = "/api/v1/deviceprofile";

// core-data
pub const EVENT: &str = "/api/v1/event";
pub const READING: &str = "/api/v1/reading";

// support-notifications
pub const NOTIFICATION: &str = "/api/v1/notification";
pub const SUBSCRIPTION: &str = "/api/v1/subscription";

// support-scheduler
pub const INTERVAL: &str = "/api/v1/interval";

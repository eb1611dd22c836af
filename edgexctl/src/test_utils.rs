//! Test utilities for CLI testing
//!
//! Provides a mock EdgeX server answering the v1 routes of core-data,
//! core-metadata, support-notifications and support-scheduler from one port.

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get},
    Router,
};
use edgex_core::{
    routes, Device, DeviceProfile, DeviceService, Event, Interval, Notification, Reading,
    ResourceRef, Subscription, VersionResponse,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

type HandlerError = (StatusCode, String);

/// Mock server state
#[derive(Debug, Clone)]
pub struct MockServerState {
    pub devices: Arc<Mutex<Vec<Device>>>,
    pub device_services: Arc<Mutex<Vec<DeviceService>>>,
    pub profiles: Arc<Mutex<Vec<DeviceProfile>>>,
    /// Raw bodies received on the profile upload route
    pub profile_uploads: Arc<Mutex<Vec<String>>>,
    pub events: Arc<Mutex<Vec<Event>>>,
    pub readings: Arc<Mutex<Vec<Reading>>>,
    pub notifications: Arc<Mutex<Vec<Notification>>>,
    pub subscriptions: Arc<Mutex<Vec<Subscription>>>,
    pub intervals: Arc<Mutex<Vec<Interval>>>,
    next_id: Arc<AtomicU64>,
}

fn reading(id: &str, device: &str, name: &str, value: &str, created: i64) -> Reading {
    Reading {
        id: id.to_string(),
        device: device.to_string(),
        name: name.to_string(),
        value: value.to_string(),
        value_type: "Int64".to_string(),
        created,
        origin: created * 1_000_000,
        ..Default::default()
    }
}

fn device(id: &str, name: &str) -> Device {
    let mut protocols = BTreeMap::new();
    protocols.insert(
        "other".to_string(),
        BTreeMap::from([("Address".to_string(), format!("{}-01", name.to_lowercase()))]),
    );

    Device {
        id: id.to_string(),
        name: name.to_string(),
        description: format!("Example of {}", name),
        protocols,
        labels: vec!["device-virtual-example".to_string()],
        service: ResourceRef::named("device-virtual"),
        profile: ResourceRef::named(name),
        created: 1_600_000_000_000,
        ..Default::default()
    }
}

impl Default for MockServerState {
    fn default() -> Self {
        let int_device = "Random-Integer-Device";
        let float_device = "Random-Float-Device";

        let readings = vec![
            reading("r-1", int_device, "Int8", "12", 1_600_000_001_000),
            reading("r-2", int_device, "Int16", "-301", 1_600_000_001_000),
            reading("r-3", int_device, "Int8", "7", 1_600_000_002_000),
            reading("r-4", float_device, "Float32", "3.25", 1_600_000_003_000),
        ];

        let events = vec![
            Event {
                id: "ev-1".to_string(),
                device: int_device.to_string(),
                pushed: 1_600_000_001_500,
                created: 1_600_000_001_000,
                readings: readings[0..2].to_vec(),
                ..Default::default()
            },
            Event {
                id: "ev-2".to_string(),
                device: int_device.to_string(),
                created: 1_600_000_002_000,
                readings: readings[2..3].to_vec(),
                ..Default::default()
            },
            Event {
                id: "ev-3".to_string(),
                device: float_device.to_string(),
                created: 1_600_000_003_000,
                readings: readings[3..4].to_vec(),
                ..Default::default()
            },
        ];

        let profiles = [int_device, float_device]
            .iter()
            .enumerate()
            .map(|(i, name)| DeviceProfile {
                id: format!("prof-{}", i + 1),
                name: name.to_string(),
                manufacturer: "IOTech".to_string(),
                model: "Device-Virtual-01".to_string(),
                ..Default::default()
            })
            .collect();

        let notifications = vec![
            Notification {
                id: "n-1".to_string(),
                slug: "disk-alert".to_string(),
                sender: "sys-mgmt".to_string(),
                content: "Disk usage above 90%".to_string(),
                labels: vec!["sw".to_string()],
                created: 1_600_000_000_000,
                ..Default::default()
            },
            Notification {
                id: "n-2".to_string(),
                slug: "fan-alert".to_string(),
                sender: "device-virtual".to_string(),
                content: "Fan stalled".to_string(),
                labels: vec!["hw".to_string()],
                created: 1_600_000_100_000,
                ..Default::default()
            },
        ];

        let intervals = vec![Interval {
            id: "int-1".to_string(),
            name: "midnight".to_string(),
            start: "20200101T000000".to_string(),
            frequency: "24h".to_string(),
            ..Default::default()
        }];

        let device_services = vec![DeviceService {
            id: "ds-1".to_string(),
            name: "device-virtual".to_string(),
            description: "Virtual device service".to_string(),
            ..Default::default()
        }];

        Self {
            devices: Arc::new(Mutex::new(vec![
                device("dev-1", int_device),
                device("dev-2", float_device),
            ])),
            device_services: Arc::new(Mutex::new(device_services)),
            profiles: Arc::new(Mutex::new(profiles)),
            profile_uploads: Arc::new(Mutex::new(Vec::new())),
            events: Arc::new(Mutex::new(events)),
            readings: Arc::new(Mutex::new(readings)),
            notifications: Arc::new(Mutex::new(notifications)),
            subscriptions: Arc::new(Mutex::new(Vec::new())),
            intervals: Arc::new(Mutex::new(intervals)),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl MockServerState {
    fn new_id(&self) -> String {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        format!("5f0c{:08x}-mock", n)
    }
}

/// Mock EdgeX server
#[derive(Debug)]
pub struct MockServer {
    state: MockServerState,
    port: u16,
}

impl Default for MockServer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockServer {
    /// Create a new mock server
    pub fn new() -> Self {
        Self {
            state: MockServerState::default(),
            port: 0, // Will be assigned when server starts
        }
    }

    /// Start the mock server and return the base URL
    pub async fn start(mut self) -> Result<(Self, String)> {
        let app = self.create_router();

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        self.port = addr.port();

        let server_url = format!("http://127.0.0.1:{}", self.port);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Mock server error: {}", e);
            }
        });

        for _ in 0..20 {
            if tokio::net::TcpStream::connect(("127.0.0.1", self.port))
                .await
                .is_ok()
            {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        Ok((self, server_url))
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn state(&self) -> &MockServerState {
        &self.state
    }

    fn create_router(&self) -> Router {
        Router::new()
            .route(routes::PING, get(ping_handler))
            .route(routes::VERSION, get(version_handler))
            // core-metadata
            .route(routes::DEVICE, get(list_devices).post(add_device))
            .route(
                "/api/v1/device/name/:name",
                get(device_by_name).delete(remove_device_by_name),
            )
            .route("/api/v1/device/id/:id", delete(remove_device_by_id))
            .route(
                routes::DEVICE_SERVICE,
                get(list_device_services).post(add_device_service),
            )
            .route(
                "/api/v1/deviceservice/name/:name",
                delete(remove_device_service_by_name),
            )
            .route(
                "/api/v1/deviceservice/id/:id",
                delete(remove_device_service_by_id),
            )
            .route(routes::DEVICE_PROFILE, get(list_profiles))
            .route(
                "/api/v1/deviceprofile/upload",
                axum::routing::post(upload_profile),
            )
            .route(
                "/api/v1/deviceprofile/name/:name",
                delete(remove_profile_by_name),
            )
            .route("/api/v1/deviceprofile/id/:id", delete(remove_profile_by_id))
            // core-data
            .route(routes::EVENT, get(list_events))
            .route("/api/v1/event/count", get(event_count))
            .route("/api/v1/event/count/:device", get(event_count_for_device))
            .route(
                "/api/v1/event/device/:device",
                delete(remove_events_by_device),
            )
            .route(
                "/api/v1/event/device/:device/:limit",
                get(list_events_for_device),
            )
            .route("/api/v1/event/removeold/age/:age", delete(remove_old_events))
            .route("/api/v1/event/scrub", delete(scrub_events))
            .route(routes::READING, get(list_readings))
            .route("/api/v1/reading/count", get(reading_count))
            .route(
                "/api/v1/reading/device/:device/:limit",
                get(list_readings_for_device),
            )
            // support-notifications
            .route(routes::NOTIFICATION, axum::routing::post(add_notification))
            .route(
                "/api/v1/notification/slug/:slug",
                get(notification_by_slug).delete(remove_notification_by_slug),
            )
            .route(
                "/api/v1/notification/labels/:labels/:limit",
                get(notifications_by_labels),
            )
            .route(
                "/api/v1/notification/start/:start/end/:end/:limit",
                get(notifications_in_range),
            )
            .route(
                "/api/v1/notification/age/:age",
                delete(remove_notifications_by_age),
            )
            .route(
                routes::SUBSCRIPTION,
                get(list_subscriptions).post(add_subscription),
            )
            .route(
                "/api/v1/subscription/slug/:slug",
                delete(remove_subscription_by_slug),
            )
            // support-scheduler
            .route(routes::INTERVAL, get(list_intervals).post(add_interval))
            .route("/api/v1/interval/name/:name", delete(remove_interval_by_name))
            .with_state(self.state.clone())
    }
}

fn not_found(what: &str, key: &str) -> HandlerError {
    (
        StatusCode::NOT_FOUND,
        format!("{} not found: {}", what, key),
    )
}

fn conflict(what: &str, key: &str) -> HandlerError {
    (
        StatusCode::CONFLICT,
        format!("Duplicate {} name: {}", what, key),
    )
}

/// Remove the first matching item, answering `true` like EdgeX does
fn remove_first<T>(
    items: &Mutex<Vec<T>>,
    what: &str,
    key: &str,
    matches: impl Fn(&T) -> bool,
) -> Result<String, HandlerError> {
    let mut items = items.lock().unwrap();
    let index = items
        .iter()
        .position(matches)
        .ok_or_else(|| not_found(what, key))?;
    items.remove(index);
    Ok("true".to_string())
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

// Handler functions

async fn ping_handler() -> &'static str {
    "pong"
}

async fn version_handler() -> Json<VersionResponse> {
    Json(VersionResponse {
        version: "1.2.1-mock".to_string(),
    })
}

async fn list_devices(State(state): State<MockServerState>) -> Json<Vec<Device>> {
    Json(state.devices.lock().unwrap().clone())
}

async fn device_by_name(
    Path(name): Path<String>,
    State(state): State<MockServerState>,
) -> Result<Json<Device>, HandlerError> {
    state
        .devices
        .lock()
        .unwrap()
        .iter()
        .find(|d| d.name == name)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found("device", &name))
}

async fn add_device(
    State(state): State<MockServerState>,
    Json(mut device): Json<Device>,
) -> Result<String, HandlerError> {
    let mut devices = state.devices.lock().unwrap();
    if devices.iter().any(|d| d.name == device.name) {
        return Err(conflict("device", &device.name));
    }
    device.id = state.new_id();
    device.created = now_millis();
    let id = device.id.clone();
    devices.push(device);
    Ok(id)
}

async fn remove_device_by_name(
    Path(name): Path<String>,
    State(state): State<MockServerState>,
) -> Result<String, HandlerError> {
    remove_first(&state.devices, "device", &name, |d| d.name == name)
}

async fn remove_device_by_id(
    Path(id): Path<String>,
    State(state): State<MockServerState>,
) -> Result<String, HandlerError> {
    remove_first(&state.devices, "device", &id, |d| d.id == id)
}

async fn list_device_services(State(state): State<MockServerState>) -> Json<Vec<DeviceService>> {
    Json(state.device_services.lock().unwrap().clone())
}

async fn add_device_service(
    State(state): State<MockServerState>,
    Json(mut service): Json<DeviceService>,
) -> Result<String, HandlerError> {
    let mut services = state.device_services.lock().unwrap();
    if services.iter().any(|s| s.name == service.name) {
        return Err(conflict("device service", &service.name));
    }
    service.id = state.new_id();
    let id = service.id.clone();
    services.push(service);
    Ok(id)
}

async fn remove_device_service_by_name(
    Path(name): Path<String>,
    State(state): State<MockServerState>,
) -> Result<String, HandlerError> {
    remove_first(&state.device_services, "device service", &name, |s| {
        s.name == name
    })
}

async fn remove_device_service_by_id(
    Path(id): Path<String>,
    State(state): State<MockServerState>,
) -> Result<String, HandlerError> {
    remove_first(&state.device_services, "device service", &id, |s| s.id == id)
}

async fn list_profiles(State(state): State<MockServerState>) -> Json<Vec<DeviceProfile>> {
    Json(state.profiles.lock().unwrap().clone())
}

async fn upload_profile(
    State(state): State<MockServerState>,
    body: String,
) -> Result<String, HandlerError> {
    let name = body
        .lines()
        .find_map(|line| line.strip_prefix("name:"))
        .map(|name| name.trim().trim_matches('"').to_string())
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                "profile has no name".to_string(),
            )
        })?;

    let id = state.new_id();
    state.profile_uploads.lock().unwrap().push(body);
    state.profiles.lock().unwrap().push(DeviceProfile {
        id: id.clone(),
        name,
        ..Default::default()
    });
    Ok(id)
}

async fn remove_profile_by_name(
    Path(name): Path<String>,
    State(state): State<MockServerState>,
) -> Result<String, HandlerError> {
    remove_first(&state.profiles, "profile", &name, |p| p.name == name)
}

async fn remove_profile_by_id(
    Path(id): Path<String>,
    State(state): State<MockServerState>,
) -> Result<String, HandlerError> {
    remove_first(&state.profiles, "profile", &id, |p| p.id == id)
}

async fn list_events(State(state): State<MockServerState>) -> Json<Vec<Event>> {
    Json(state.events.lock().unwrap().clone())
}

async fn list_events_for_device(
    Path((device, limit)): Path<(String, usize)>,
    State(state): State<MockServerState>,
) -> Json<Vec<Event>> {
    let events = state
        .events
        .lock()
        .unwrap()
        .iter()
        .filter(|e| e.device == device)
        .take(limit)
        .cloned()
        .collect();
    Json(events)
}

async fn event_count(State(state): State<MockServerState>) -> String {
    state.events.lock().unwrap().len().to_string()
}

async fn event_count_for_device(
    Path(device): Path<String>,
    State(state): State<MockServerState>,
) -> String {
    let events = state.events.lock().unwrap();
    events
        .iter()
        .filter(|e| e.device == device)
        .count()
        .to_string()
}

/// Drop events (and their readings) matching `predicate`, answering the count
fn remove_events(state: &MockServerState, predicate: impl Fn(&Event) -> bool) -> String {
    let mut events = state.events.lock().unwrap();
    let (removed, kept): (Vec<Event>, Vec<Event>) = events.drain(..).partition(|e| predicate(e));
    *events = kept;

    let removed_readings: Vec<String> = removed
        .iter()
        .flat_map(|e| e.readings.iter().map(|r| r.id.clone()))
        .collect();
    state
        .readings
        .lock()
        .unwrap()
        .retain(|r| !removed_readings.contains(&r.id));

    removed.len().to_string()
}

async fn remove_events_by_device(
    Path(device): Path<String>,
    State(state): State<MockServerState>,
) -> String {
    remove_events(&state, |e| e.device == device)
}

async fn remove_old_events(
    Path(age): Path<i64>,
    State(state): State<MockServerState>,
) -> String {
    let cutoff = now_millis() - age;
    remove_events(&state, |e| e.created < cutoff)
}

async fn scrub_events(State(state): State<MockServerState>) -> String {
    remove_events(&state, |e| e.pushed > 0)
}

async fn list_readings(State(state): State<MockServerState>) -> Json<Vec<Reading>> {
    Json(state.readings.lock().unwrap().clone())
}

async fn list_readings_for_device(
    Path((device, limit)): Path<(String, usize)>,
    State(state): State<MockServerState>,
) -> Json<Vec<Reading>> {
    let readings = state
        .readings
        .lock()
        .unwrap()
        .iter()
        .filter(|r| r.device == device)
        .take(limit)
        .cloned()
        .collect();
    Json(readings)
}

async fn reading_count(State(state): State<MockServerState>) -> String {
    state.readings.lock().unwrap().len().to_string()
}

async fn add_notification(
    State(state): State<MockServerState>,
    Json(mut notification): Json<Notification>,
) -> Result<String, HandlerError> {
    let mut notifications = state.notifications.lock().unwrap();
    if notifications.iter().any(|n| n.slug == notification.slug) {
        return Err(conflict("notification", &notification.slug));
    }
    notification.id = state.new_id();
    notification.created = now_millis();
    let id = notification.id.clone();
    notifications.push(notification);
    Ok(id)
}

async fn notification_by_slug(
    Path(slug): Path<String>,
    State(state): State<MockServerState>,
) -> Result<Json<Notification>, HandlerError> {
    state
        .notifications
        .lock()
        .unwrap()
        .iter()
        .find(|n| n.slug == slug)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found("notification", &slug))
}

async fn notifications_by_labels(
    Path((labels, limit)): Path<(String, usize)>,
    State(state): State<MockServerState>,
) -> Json<Vec<Notification>> {
    let wanted: Vec<&str> = labels.split(',').collect();
    let notifications = state
        .notifications
        .lock()
        .unwrap()
        .iter()
        .filter(|n| n.labels.iter().any(|l| wanted.contains(&l.as_str())))
        .take(limit)
        .cloned()
        .collect();
    Json(notifications)
}

async fn notifications_in_range(
    Path((start, end, limit)): Path<(i64, i64, usize)>,
    State(state): State<MockServerState>,
) -> Json<Vec<Notification>> {
    let notifications = state
        .notifications
        .lock()
        .unwrap()
        .iter()
        .filter(|n| n.created >= start && n.created <= end)
        .take(limit)
        .cloned()
        .collect();
    Json(notifications)
}

async fn remove_notification_by_slug(
    Path(slug): Path<String>,
    State(state): State<MockServerState>,
) -> Result<String, HandlerError> {
    remove_first(&state.notifications, "notification", &slug, |n| {
        n.slug == slug
    })
}

async fn remove_notifications_by_age(
    Path(age): Path<i64>,
    State(state): State<MockServerState>,
) -> String {
    let cutoff = now_millis() - age;
    let mut notifications = state.notifications.lock().unwrap();
    notifications.retain(|n| n.created >= cutoff);
    "true".to_string()
}

async fn list_subscriptions(State(state): State<MockServerState>) -> Json<Vec<Subscription>> {
    Json(state.subscriptions.lock().unwrap().clone())
}

async fn add_subscription(
    State(state): State<MockServerState>,
    Json(mut subscription): Json<Subscription>,
) -> Result<String, HandlerError> {
    let mut subscriptions = state.subscriptions.lock().unwrap();
    if subscriptions.iter().any(|s| s.slug == subscription.slug) {
        return Err(conflict("subscription", &subscription.slug));
    }
    subscription.id = state.new_id();
    let id = subscription.id.clone();
    subscriptions.push(subscription);
    Ok(id)
}

async fn remove_subscription_by_slug(
    Path(slug): Path<String>,
    State(state): State<MockServerState>,
) -> Result<String, HandlerError> {
    remove_first(&state.subscriptions, "subscription", &slug, |s| {
        s.slug == slug
    })
}

async fn list_intervals(State(state): State<MockServerState>) -> Json<Vec<Interval>> {
    Json(state.intervals.lock().unwrap().clone())
}

async fn add_interval(
    State(state): State<MockServerState>,
    Json(mut interval): Json<Interval>,
) -> Result<String, HandlerError> {
    let mut intervals = state.intervals.lock().unwrap();
    if intervals.iter().any(|i| i.name == interval.name) {
        return Err(conflict("interval", &interval.name));
    }
    interval.id = state.new_id();
    let id = interval.id.clone();
    intervals.push(interval);
    Ok(id)
}

async fn remove_interval_by_name(
    Path(name): Path<String>,
    State(state): State<MockServerState>,
) -> Result<String, HandlerError> {
    remove_first(&state.intervals, "interval", &name, |i| i.name == name)
}

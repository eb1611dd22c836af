//! HTTP client for the EdgeX microservices.

use anyhow::{Context, Result};
use edgex_core::{
    routes, Device, DeviceProfile, DeviceService, Event, Interval, Notification, Reading,
    Service, Subscription, VersionResponse,
};
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

use crate::config::CliConfig;

/// Normalize a base URL by removing trailing slashes.
fn normalize_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// Percent-encode one path segment.
fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// One completed HTTP request and its raw response
#[derive(Debug, Clone)]
pub struct Exchange {
    pub method: Method,
    pub url: String,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl Exchange {
    /// Deserialize the response body.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body)
            .with_context(|| format!("Failed to parse JSON response from {}", self.url))
    }

    /// Parse a plain-text numeric body such as an event count.
    pub fn count(&self) -> Result<u64> {
        self.body
            .trim()
            .parse()
            .with_context(|| format!("Expected a number from {}, got '{}'", self.url, self.body))
    }
}

/// Response data together with the exchange that produced it
#[derive(Debug, Clone)]
pub struct Reply<T> {
    pub exchange: Exchange,
    pub data: T,
}

impl Reply<String> {
    fn text(exchange: Exchange) -> Self {
        let data = exchange.body.trim().to_string();
        Self { exchange, data }
    }
}

/// How to select notifications
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationFilter {
    /// A single notification
    Slug(String),
    /// Notifications carrying any of the labels
    Labels(Vec<String>),
    /// Notifications created in a time window, milliseconds since the epoch
    Range { start: i64, end: i64 },
}

/// HTTP client for the EdgeX REST APIs.
///
/// Each request goes to the base URL configured for the owning service.
/// Requests are sent once; failures are reported to the caller as is.
///
/// # Examples
///
/// ```no_run
/// use edgexctl::client::EdgexClient;
/// use edgexctl::config::CliConfig;
///
/// # async fn example() -> anyhow::Result<()> {
/// let client = EdgexClient::new(&CliConfig::default())?;
///
/// let devices = client.list_devices().await?;
/// println!("{} devices", devices.data.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct EdgexClient {
    client: Client,
    base_urls: BTreeMap<Service, String>,
}

impl EdgexClient {
    /// Create a client for the endpoints in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &CliConfig) -> Result<Self> {
        let base_urls = Service::all()
            .iter()
            .map(|service| (*service, normalize_url(&config.service_url(*service))))
            .collect();

        Self::build(base_urls, config.timeout)
    }

    /// Create a client sending every service's requests to one base URL.
    pub fn with_base_url(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let base_url = normalize_url(base_url);
        let base_urls = Service::all()
            .iter()
            .map(|service| (*service, base_url.clone()))
            .collect();

        Self::build(base_urls, timeout_secs)
    }

    fn build(base_urls: BTreeMap<Service, String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("edgexctl/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, base_urls })
    }

    /// Base URL used for `service`
    pub fn base_url(&self, service: Service) -> &str {
        self.base_urls
            .get(&service)
            .map(String::as_str)
            .unwrap_or_default()
    }

    fn url(&self, service: Service, path: &str) -> String {
        format!("{}{}", self.base_url(service), path)
    }

    /// Send a request and capture the response.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The service is unreachable or the request times out
    /// - The response body cannot be read
    /// - The HTTP status code indicates failure (4xx or 5xx)
    async fn send(&self, method: Method, url: String, request: RequestBuilder) -> Result<Exchange> {
        debug!(%method, %url, "sending request");

        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", url))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {}", url))?;

        debug!(%method, %url, %status, bytes = body.len(), "response received");

        let exchange = Exchange {
            method,
            url,
            status,
            headers,
            body,
        };

        if !status.is_success() {
            return Err(Self::status_error(&exchange));
        }
        Ok(exchange)
    }

    fn status_error(exchange: &Exchange) -> anyhow::Error {
        let url = &exchange.url;
        let text = exchange.body.trim();
        let message = match exchange.status {
            StatusCode::NOT_FOUND => format!("Not found at {}: {}", url, text),
            StatusCode::BAD_REQUEST => format!("Bad request to {}: {}", url, text),
            StatusCode::CONFLICT => format!("Conflict at {}: {}", url, text),
            StatusCode::UNAUTHORIZED => format!("Unauthorized access to {}", url),
            StatusCode::FORBIDDEN => format!("Access forbidden to {}", url),
            StatusCode::INTERNAL_SERVER_ERROR => format!("Server error at {}: {}", url, text),
            StatusCode::SERVICE_UNAVAILABLE => format!("Service unavailable at {}", url),
            status => format!("HTTP {} error at {}: {}", status, url, text),
        };
        anyhow::anyhow!(message)
    }

    async fn get(&self, service: Service, path: &str) -> Result<Exchange> {
        let url = self.url(service, path);
        let request = self.client.get(&url);
        self.send(Method::GET, url, request).await
    }

    async fn get_json<T: DeserializeOwned>(&self, service: Service, path: &str) -> Result<Reply<T>> {
        let exchange = self.get(service, path).await?;
        let data = exchange.json()?;
        Ok(Reply { exchange, data })
    }

    async fn get_count(&self, service: Service, path: &str) -> Result<Reply<u64>> {
        let exchange = self.get(service, path).await?;
        let data = exchange.count()?;
        Ok(Reply { exchange, data })
    }

    async fn post_json<B: Serialize>(
        &self,
        service: Service,
        path: &str,
        body: &B,
    ) -> Result<Reply<String>> {
        let url = self.url(service, path);
        let request = self.client.post(&url).json(body);
        self.send(Method::POST, url, request).await.map(Reply::<String>::text)
    }

    async fn delete(&self, service: Service, path: &str) -> Result<Reply<String>> {
        let url = self.url(service, path);
        let request = self.client.delete(&url);
        self.send(Method::DELETE, url, request).await.map(Reply::<String>::text)
    }

    async fn delete_count(&self, service: Service, path: &str) -> Result<Reply<u64>> {
        let reply = self.delete(service, path).await?;
        let data = reply.exchange.count()?;
        Ok(Reply {
            exchange: reply.exchange,
            data,
        })
    }

    // =========================================================================
    // Devices (core-metadata)
    // =========================================================================

    /// Retrieve every registered device.
    pub async fn list_devices(&self) -> Result<Reply<Vec<Device>>> {
        self.get_json(Service::CoreMetadata, routes::DEVICE).await
    }

    /// Retrieve one device by name.
    pub async fn device_by_name(&self, name: &str) -> Result<Reply<Device>> {
        let path = format!("{}/name/{}", routes::DEVICE, segment(name));
        self.get_json(Service::CoreMetadata, &path).await
    }

    /// Register a device; the reply carries the new device id.
    pub async fn add_device(&self, device: &Device) -> Result<Reply<String>> {
        require_name("Device", &device.name)?;
        self.post_json(Service::CoreMetadata, routes::DEVICE, device)
            .await
    }

    pub async fn remove_device_by_name(&self, name: &str) -> Result<Reply<String>> {
        require_name("Device", name)?;
        let path = format!("{}/name/{}", routes::DEVICE, segment(name));
        self.delete(Service::CoreMetadata, &path).await
    }

    pub async fn remove_device_by_id(&self, id: &str) -> Result<Reply<String>> {
        require_name("Device id", id)?;
        let path = format!("{}/id/{}", routes::DEVICE, segment(id));
        self.delete(Service::CoreMetadata, &path).await
    }

    // =========================================================================
    // Device services (core-metadata)
    // =========================================================================

    pub async fn list_device_services(&self) -> Result<Reply<Vec<DeviceService>>> {
        self.get_json(Service::CoreMetadata, routes::DEVICE_SERVICE)
            .await
    }

    pub async fn add_device_service(&self, service: &DeviceService) -> Result<Reply<String>> {
        require_name("Device service", &service.name)?;
        self.post_json(Service::CoreMetadata, routes::DEVICE_SERVICE, service)
            .await
    }

    pub async fn remove_device_service_by_name(&self, name: &str) -> Result<Reply<String>> {
        require_name("Device service", name)?;
        let path = format!("{}/name/{}", routes::DEVICE_SERVICE, segment(name));
        self.delete(Service::CoreMetadata, &path).await
    }

    pub async fn remove_device_service_by_id(&self, id: &str) -> Result<Reply<String>> {
        require_name("Device service id", id)?;
        let path = format!("{}/id/{}", routes::DEVICE_SERVICE, segment(id));
        self.delete(Service::CoreMetadata, &path).await
    }

    // =========================================================================
    // Device profiles (core-metadata)
    // =========================================================================

    pub async fn list_profiles(&self) -> Result<Reply<Vec<DeviceProfile>>> {
        self.get_json(Service::CoreMetadata, routes::DEVICE_PROFILE)
            .await
    }

    /// Upload a profile in its YAML form; the reply carries the new profile id.
    pub async fn upload_profile_yaml(&self, yaml: String) -> Result<Reply<String>> {
        if yaml.trim().is_empty() {
            return Err(anyhow::anyhow!("Profile document cannot be empty"));
        }

        let url = self.url(
            Service::CoreMetadata,
            &format!("{}/upload", routes::DEVICE_PROFILE),
        );
        let request = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/x-yaml")
            .body(yaml);
        self.send(Method::POST, url, request).await.map(Reply::<String>::text)
    }

    pub async fn remove_profile_by_name(&self, name: &str) -> Result<Reply<String>> {
        require_name("Profile", name)?;
        let path = format!("{}/name/{}", routes::DEVICE_PROFILE, segment(name));
        self.delete(Service::CoreMetadata, &path).await
    }

    pub async fn remove_profile_by_id(&self, id: &str) -> Result<Reply<String>> {
        require_name("Profile id", id)?;
        let path = format!("{}/id/{}", routes::DEVICE_PROFILE, segment(id));
        self.delete(Service::CoreMetadata, &path).await
    }

    // =========================================================================
    // Events and readings (core-data)
    // =========================================================================

    /// Retrieve events, optionally only those of one device.
    ///
    /// Without a device the service returns its configured maximum; the
    /// result is then cut to `limit`.
    pub async fn list_events(&self, device: Option<&str>, limit: u32) -> Result<Reply<Vec<Event>>> {
        match device {
            Some(device) => {
                let path = format!("{}/device/{}/{}", routes::EVENT, segment(device), limit);
                self.get_json(Service::CoreData, &path).await
            }
            None => {
                let mut reply: Reply<Vec<Event>> =
                    self.get_json(Service::CoreData, routes::EVENT).await?;
                reply.data.truncate(limit as usize);
                Ok(reply)
            }
        }
    }

    /// Number of stored events, optionally only those of one device.
    pub async fn event_count(&self, device: Option<&str>) -> Result<Reply<u64>> {
        let path = match device {
            Some(device) => format!("{}/count/{}", routes::EVENT, segment(device)),
            None => format!("{}/count", routes::EVENT),
        };
        self.get_count(Service::CoreData, &path).await
    }

    /// Delete every event of a device; the reply carries the number removed.
    pub async fn remove_events_by_device(&self, device: &str) -> Result<Reply<u64>> {
        require_name("Device", device)?;
        let path = format!("{}/device/{}", routes::EVENT, segment(device));
        self.delete_count(Service::CoreData, &path).await
    }

    /// Delete events older than `age_ms` milliseconds.
    pub async fn remove_events_older_than(&self, age_ms: u64) -> Result<Reply<u64>> {
        let path = format!("{}/removeold/age/{}", routes::EVENT, age_ms);
        self.delete_count(Service::CoreData, &path).await
    }

    /// Delete every event that has already been pushed upstream.
    pub async fn scrub_events(&self) -> Result<Reply<u64>> {
        let path = format!("{}/scrub", routes::EVENT);
        self.delete_count(Service::CoreData, &path).await
    }

    /// Retrieve readings, optionally only those of one device.
    pub async fn list_readings(
        &self,
        device: Option<&str>,
        limit: u32,
    ) -> Result<Reply<Vec<Reading>>> {
        match device {
            Some(device) => {
                let path = format!("{}/device/{}/{}", routes::READING, segment(device), limit);
                self.get_json(Service::CoreData, &path).await
            }
            None => {
                let mut reply: Reply<Vec<Reading>> =
                    self.get_json(Service::CoreData, routes::READING).await?;
                reply.data.truncate(limit as usize);
                Ok(reply)
            }
        }
    }

    pub async fn reading_count(&self) -> Result<Reply<u64>> {
        let path = format!("{}/count", routes::READING);
        self.get_count(Service::CoreData, &path).await
    }

    // =========================================================================
    // Notifications and subscriptions (support-notifications)
    // =========================================================================

    pub async fn list_notifications(
        &self,
        filter: &NotificationFilter,
        limit: u32,
    ) -> Result<Reply<Vec<Notification>>> {
        let path = match filter {
            NotificationFilter::Slug(slug) => {
                require_name("Notification slug", slug)?;
                let path = format!("{}/slug/{}", routes::NOTIFICATION, segment(slug));
                let reply: Reply<Notification> =
                    self.get_json(Service::Notifications, &path).await?;
                return Ok(Reply {
                    exchange: reply.exchange,
                    data: vec![reply.data],
                });
            }
            NotificationFilter::Labels(labels) => {
                if labels.is_empty() {
                    return Err(anyhow::anyhow!("At least one label is required"));
                }
                let labels = labels
                    .iter()
                    .map(|label| segment(label))
                    .collect::<Vec<_>>()
                    .join(",");
                format!("{}/labels/{}/{}", routes::NOTIFICATION, labels, limit)
            }
            NotificationFilter::Range { start, end } => {
                if end < start {
                    return Err(anyhow::anyhow!(
                        "End time {} is before start time {}",
                        end,
                        start
                    ));
                }
                format!(
                    "{}/start/{}/end/{}/{}",
                    routes::NOTIFICATION,
                    start,
                    end,
                    limit
                )
            }
        };
        self.get_json(Service::Notifications, &path).await
    }

    pub async fn add_notification(&self, notification: &Notification) -> Result<Reply<String>> {
        require_name("Notification slug", &notification.slug)?;
        self.post_json(Service::Notifications, routes::NOTIFICATION, notification)
            .await
    }

    pub async fn remove_notification_by_slug(&self, slug: &str) -> Result<Reply<String>> {
        require_name("Notification slug", slug)?;
        let path = format!("{}/slug/{}", routes::NOTIFICATION, segment(slug));
        self.delete(Service::Notifications, &path).await
    }

    /// Delete notifications older than `age_ms` milliseconds.
    pub async fn remove_notifications_by_age(&self, age_ms: u64) -> Result<Reply<String>> {
        let path = format!("{}/age/{}", routes::NOTIFICATION, age_ms);
        self.delete(Service::Notifications, &path).await
    }

    pub async fn list_subscriptions(&self) -> Result<Reply<Vec<Subscription>>> {
        self.get_json(Service::Notifications, routes::SUBSCRIPTION)
            .await
    }

    pub async fn add_subscription(&self, subscription: &Subscription) -> Result<Reply<String>> {
        require_name("Subscription slug", &subscription.slug)?;
        self.post_json(Service::Notifications, routes::SUBSCRIPTION, subscription)
            .await
    }

    pub async fn remove_subscription_by_slug(&self, slug: &str) -> Result<Reply<String>> {
        require_name("Subscription slug", slug)?;
        let path = format!("{}/slug/{}", routes::SUBSCRIPTION, segment(slug));
        self.delete(Service::Notifications, &path).await
    }

    // =========================================================================
    // Intervals (support-scheduler)
    // =========================================================================

    pub async fn list_intervals(&self) -> Result<Reply<Vec<Interval>>> {
        self.get_json(Service::Scheduler, routes::INTERVAL).await
    }

    pub async fn add_interval(&self, interval: &Interval) -> Result<Reply<String>> {
        require_name("Interval", &interval.name)?;
        self.post_json(Service::Scheduler, routes::INTERVAL, interval)
            .await
    }

    pub async fn remove_interval_by_name(&self, name: &str) -> Result<Reply<String>> {
        require_name("Interval", name)?;
        let path = format!("{}/name/{}", routes::INTERVAL, segment(name));
        self.delete(Service::Scheduler, &path).await
    }

    // =========================================================================
    // System
    // =========================================================================

    /// Ping a service; the reply carries its answer (normally `pong`).
    pub async fn ping(&self, service: Service) -> Result<Reply<String>> {
        self.get(service, routes::PING).await.map(Reply::<String>::text)
    }

    pub async fn version(&self, service: Service) -> Result<Reply<VersionResponse>> {
        self.get_json(service, routes::VERSION).await
    }
}

fn require_name(what: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(anyhow::anyhow!("{} name cannot be empty", what));
    }
    Ok(())
}

//! Output formatting utilities for the CLI
//!
//! Provides table and JSON formatting with colors.

use anyhow::Result;
use chrono::DateTime;
use colored::*;
use edgex_core::{
    AdminState, Device, DeviceProfile, DeviceService, Event, Interval, Notification,
    NotificationSeverity, OperatingState, Reading, Subscription,
};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use crate::config::CliConfig;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    /// Format named in configuration; anything but `json` is a table
    pub fn from_config(value: &str) -> Self {
        match value {
            "json" => OutputFormat::Json,
            _ => OutputFormat::Table,
        }
    }
}

/// Outcome of contacting one service, used by `status` and `version`
#[derive(Debug, Clone, Serialize)]
pub struct ServiceReport {
    pub service: String,
    pub url: String,
    pub ok: bool,
    /// Response text, or the error when `ok` is false
    pub detail: String,
}

/// Render milliseconds since the epoch as UTC; zero means "never"
pub fn format_timestamp(millis: i64) -> String {
    if millis == 0 {
        return "-".to_string();
    }
    match DateTime::from_timestamp_millis(millis) {
        Some(time) => time.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => millis.to_string(),
    }
}

fn labels(labels: &[String]) -> String {
    if labels.is_empty() {
        "-".to_string()
    } else {
        labels.join(", ")
    }
}

fn admin_state(state: AdminState) -> String {
    match state {
        AdminState::Unlocked => "UNLOCKED".green().to_string(),
        AdminState::Locked => "LOCKED".red().to_string(),
    }
}

fn operating_state(state: OperatingState) -> String {
    match state {
        OperatingState::Enabled => "ENABLED".green().to_string(),
        OperatingState::Disabled => "DISABLED".yellow().to_string(),
    }
}

/// Shared shape of every list formatter
fn format_list<T, R>(
    items: &[T],
    format: &OutputFormat,
    title: &str,
    empty: &str,
    row: impl Fn(&T) -> R,
) -> Result<String>
where
    T: Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(items)?),
        OutputFormat::Table => {
            if items.is_empty() {
                return Ok(empty.dimmed().to_string());
            }
            let rows: Vec<R> = items.iter().map(row).collect();
            let table = Table::new(rows).with(Style::rounded()).to_string();
            Ok(format!("{}\n{}", title.bold(), table))
        }
    }
}

/// Format device list
pub fn format_devices(devices: &[Device], format: &OutputFormat) -> Result<String> {
    #[derive(Tabled)]
    struct DeviceRow {
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Service")]
        service: String,
        #[tabled(rename = "Profile")]
        profile: String,
        #[tabled(rename = "Admin")]
        admin: String,
        #[tabled(rename = "Operating")]
        operating: String,
        #[tabled(rename = "Labels")]
        labels: String,
        #[tabled(rename = "Last Reported")]
        last_reported: String,
    }

    format_list(devices, format, "Devices:", "No devices found", |d| DeviceRow {
        name: d.name.cyan().to_string(),
        id: d.id.clone(),
        service: d.service.name.clone(),
        profile: d.profile.name.clone(),
        admin: admin_state(d.admin_state),
        operating: operating_state(d.operating_state),
        labels: labels(&d.labels),
        last_reported: format_timestamp(d.last_reported),
    })
}

/// Format device service list
pub fn format_device_services(services: &[DeviceService], format: &OutputFormat) -> Result<String> {
    #[derive(Tabled)]
    struct ServiceRow {
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Address")]
        address: String,
        #[tabled(rename = "Admin")]
        admin: String,
        #[tabled(rename = "Operating")]
        operating: String,
        #[tabled(rename = "Created")]
        created: String,
    }

    format_list(
        services,
        format,
        "Device Services:",
        "No device services found",
        |s| {
            let addressable = &s.addressable;
            let address = if addressable.address.is_empty() {
                "-".to_string()
            } else {
                format!(
                    "{}://{}:{}{}",
                    addressable.protocol.to_lowercase(),
                    addressable.address,
                    addressable.port,
                    addressable.path
                )
            };
            ServiceRow {
                name: s.name.cyan().to_string(),
                id: s.id.clone(),
                address,
                admin: admin_state(s.admin_state),
                operating: operating_state(s.operating_state),
                created: format_timestamp(s.created),
            }
        },
    )
}

/// Format device profile list
pub fn format_profiles(profiles: &[DeviceProfile], format: &OutputFormat) -> Result<String> {
    #[derive(Tabled)]
    struct ProfileRow {
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Manufacturer")]
        manufacturer: String,
        #[tabled(rename = "Model")]
        model: String,
        #[tabled(rename = "Resources")]
        resources: usize,
        #[tabled(rename = "Labels")]
        labels: String,
    }

    format_list(
        profiles,
        format,
        "Device Profiles:",
        "No device profiles found",
        |p| ProfileRow {
            name: p.name.cyan().to_string(),
            id: p.id.clone(),
            manufacturer: p.manufacturer.clone(),
            model: p.model.clone(),
            resources: p.device_resources.len(),
            labels: labels(&p.labels),
        },
    )
}

/// Format event list
pub fn format_events(events: &[Event], format: &OutputFormat) -> Result<String> {
    #[derive(Tabled)]
    struct EventRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Device")]
        device: String,
        #[tabled(rename = "Readings")]
        readings: usize,
        #[tabled(rename = "Created")]
        created: String,
        #[tabled(rename = "Pushed")]
        pushed: String,
    }

    format_list(events, format, "Events:", "No events found", |e| EventRow {
        id: e.id.clone(),
        device: e.device.cyan().to_string(),
        readings: e.readings.len(),
        created: format_timestamp(e.created),
        pushed: format_timestamp(e.pushed),
    })
}

/// Format reading list
pub fn format_readings(readings: &[Reading], format: &OutputFormat) -> Result<String> {
    #[derive(Tabled)]
    struct ReadingRow {
        #[tabled(rename = "Device")]
        device: String,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Value")]
        value: String,
        #[tabled(rename = "Type")]
        value_type: String,
        #[tabled(rename = "Created")]
        created: String,
    }

    format_list(readings, format, "Readings:", "No readings found", |r| {
        ReadingRow {
            device: r.device.cyan().to_string(),
            name: r.name.clone(),
            value: r.value.yellow().to_string(),
            value_type: if r.value_type.is_empty() {
                "-".to_string()
            } else {
                r.value_type.clone()
            },
            created: format_timestamp(r.created),
        }
    })
}

/// Format notification list
pub fn format_notifications(
    notifications: &[Notification],
    format: &OutputFormat,
) -> Result<String> {
    #[derive(Tabled)]
    struct NotificationRow {
        #[tabled(rename = "Slug")]
        slug: String,
        #[tabled(rename = "Sender")]
        sender: String,
        #[tabled(rename = "Category")]
        category: String,
        #[tabled(rename = "Severity")]
        severity: String,
        #[tabled(rename = "Status")]
        status: String,
        #[tabled(rename = "Content")]
        content: String,
        #[tabled(rename = "Labels")]
        labels: String,
        #[tabled(rename = "Created")]
        created: String,
    }

    format_list(
        notifications,
        format,
        "Notifications:",
        "No notifications found",
        |n| {
            let severity = format!("{:?}", n.severity).to_uppercase();
            NotificationRow {
                slug: n.slug.cyan().to_string(),
                sender: n.sender.clone(),
                category: format!("{:?}", n.category),
                severity: match n.severity {
                    NotificationSeverity::Critical => severity.red().bold().to_string(),
                    NotificationSeverity::Normal => severity,
                },
                status: format!("{:?}", n.status).to_uppercase(),
                content: n.content.clone(),
                labels: labels(&n.labels),
                created: format_timestamp(n.created),
            }
        },
    )
}

/// Format subscription list
pub fn format_subscriptions(
    subscriptions: &[Subscription],
    format: &OutputFormat,
) -> Result<String> {
    #[derive(Tabled)]
    struct SubscriptionRow {
        #[tabled(rename = "Slug")]
        slug: String,
        #[tabled(rename = "Receiver")]
        receiver: String,
        #[tabled(rename = "Categories")]
        categories: String,
        #[tabled(rename = "Labels")]
        labels: String,
        #[tabled(rename = "Channels")]
        channels: String,
    }

    format_list(
        subscriptions,
        format,
        "Subscriptions:",
        "No subscriptions found",
        |s| SubscriptionRow {
            slug: s.slug.cyan().to_string(),
            receiver: s.receiver.clone(),
            categories: if s.subscribed_categories.is_empty() {
                "-".to_string()
            } else {
                s.subscribed_categories
                    .iter()
                    .map(|c| format!("{:?}", c))
                    .collect::<Vec<_>>()
                    .join(", ")
            },
            labels: labels(&s.subscribed_labels),
            channels: s
                .channels
                .iter()
                .map(|c| {
                    if c.url.is_empty() {
                        c.mail_addresses.join(" ")
                    } else {
                        c.url.clone()
                    }
                })
                .collect::<Vec<_>>()
                .join(", "),
        },
    )
}

/// Format interval list
pub fn format_intervals(intervals: &[Interval], format: &OutputFormat) -> Result<String> {
    #[derive(Tabled)]
    struct IntervalRow {
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Start")]
        start: String,
        #[tabled(rename = "End")]
        end: String,
        #[tabled(rename = "Frequency")]
        frequency: String,
        #[tabled(rename = "Run Once")]
        run_once: bool,
    }

    fn or_dash(value: &str) -> String {
        if value.is_empty() {
            "-".to_string()
        } else {
            value.to_string()
        }
    }

    format_list(intervals, format, "Intervals:", "No intervals found", |i| {
        IntervalRow {
            name: i.name.cyan().to_string(),
            start: or_dash(&i.start),
            end: or_dash(&i.end),
            frequency: if i.cron.is_empty() {
                or_dash(&i.frequency)
            } else {
                format!("cron {}", i.cron)
            },
            run_once: i.run_once,
        }
    })
}

/// Format a count such as the number of stored events
pub fn format_count(what: &str, count: u64, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
            "count": count
        }))?),
        OutputFormat::Table => Ok(format!("{}: {}", what, count.to_string().yellow())),
    }
}

fn format_reports(
    reports: &[ServiceReport],
    format: &OutputFormat,
    title: &str,
    detail_heading: &str,
) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(reports)?),
        OutputFormat::Table => {
            let mut builder = tabled::builder::Builder::default();
            builder.push_record(["Service", "URL", "Status", detail_heading].map(String::from));
            for report in reports {
                let status = if report.ok {
                    "OK".green().to_string()
                } else {
                    "DOWN".red().to_string()
                };
                builder.push_record([
                    report.service.cyan().to_string(),
                    report.url.clone(),
                    status,
                    report.detail.clone(),
                ]);
            }
            let table = builder.build().with(Style::rounded()).to_string();
            Ok(format!("{}\n{}", title.bold(), table))
        }
    }
}

/// Format the reachability of each service
pub fn format_status(reports: &[ServiceReport], format: &OutputFormat) -> Result<String> {
    format_reports(reports, format, "EdgeX Service Status:", "Response")
}

/// Format the CLI version followed by each service's reported version
pub fn format_versions(
    cli_version: &str,
    reports: &[ServiceReport],
    format: &OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
            "cli": cli_version,
            "services": reports,
        }))?),
        OutputFormat::Table => {
            let services = format_reports(reports, format, "EdgeX Service Versions:", "Version")?;
            Ok(format!(
                "edgexctl {}\n{}",
                cli_version.cyan(),
                services
            ))
        }
    }
}

/// Format the effective CLI configuration
pub fn format_config(config: &CliConfig, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(config)?),
        OutputFormat::Table => {
            let mut output = String::new();
            output.push_str(&"CLI Configuration:".bold().to_string());
            output.push('\n');
            output.push_str(&format!("{:<20} {}\n", "Host", config.host.cyan()));
            output.push_str(&format!("{:<20} {}\n", "Protocol", config.protocol));
            output.push_str(&format!("{:<20} {}\n", "Output Format", config.output_format));
            output.push_str(&format!("{:<20} {}\n", "Verbose", config.verbose));
            output.push_str(&format!("{:<20} {}s\n", "Timeout", config.timeout));
            output.push('\n');
            output.push_str(&"Service Endpoints:".bold().to_string());
            for service in edgex_core::Service::all() {
                output.push('\n');
                output.push_str(&format!(
                    "{:<20} {}",
                    service.key(),
                    config.service_url(*service)
                ));
            }
            Ok(output)
        }
    }
}

/// Format success message
pub fn format_success(message: &str) -> String {
    format!("{} {}", "✓".green().bold(), message)
}

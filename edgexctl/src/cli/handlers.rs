//! Command execution handlers

use anyhow::{Context, Result};
use edgex_core::{
    Device, DeviceService, Interval, Notification, Service, Subscription, Template,
};
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::client::{EdgexClient, NotificationFilter};
use crate::config::CliConfig;
use crate::editor::{capture_input_from_editor, EditorConfig};
use crate::format::{self, format_success, ServiceReport};
use crate::output::Output;

use super::commands::*;

/// Parse an object the user supplied, rejecting blank input.
pub fn parse_object<T: Template + DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(anyhow::anyhow!("empty input, nothing added"));
    }
    serde_json::from_slice(bytes).with_context(|| format!("Invalid {} JSON", T::KIND))
}

/// Read the object to add from `--file`, or from the editor seeded with the
/// type's template.
fn load_object<T: Template + DeserializeOwned>(
    source: &AddSource,
    editor: &EditorConfig,
) -> Result<T> {
    let bytes = match &source.file {
        Some(path) => std::fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => capture_input_from_editor(editor, &T::template_bytes()?)?,
    };
    parse_object(&bytes)
}

fn removed(out: &mut Output, what: &str, name: &str) -> Result<()> {
    out.line(format_success(&format!("Removed {} {}", what, name)))
}

fn added(out: &mut Output, what: &str, name: &str, id: &str) -> Result<()> {
    out.line(format_success(&format!("Added {} {} ({})", what, name, id)))
}

/// Handle device commands
pub async fn handle_device(
    client: &EdgexClient,
    command: DeviceCommands,
    editor: &EditorConfig,
    out: &mut Output,
) -> Result<()> {
    match command {
        DeviceCommands::List => {
            let reply = client.list_devices().await?;
            out.reply(&reply, |devices, f| format::format_devices(devices, f))?;
        }
        DeviceCommands::Rm(target) => {
            for name in &target.names {
                let reply = if target.id {
                    client.remove_device_by_id(name).await?
                } else {
                    client.remove_device_by_name(name).await?
                };
                out.exchange(&reply.exchange)?;
                removed(out, "device", name)?;
            }
        }
        DeviceCommands::Add(source) => {
            let device: Device = load_object(&source, editor)?;
            let reply = client.add_device(&device).await?;
            out.exchange(&reply.exchange)?;
            added(out, "device", &device.name, &reply.data)?;
        }
    }

    Ok(())
}

/// Handle device service commands
pub async fn handle_device_service(
    client: &EdgexClient,
    command: DeviceServiceCommands,
    editor: &EditorConfig,
    out: &mut Output,
) -> Result<()> {
    match command {
        DeviceServiceCommands::List => {
            let reply = client.list_device_services().await?;
            out.reply(&reply, |services, f| {
                format::format_device_services(services, f)
            })?;
        }
        DeviceServiceCommands::Rm(target) => {
            for name in &target.names {
                let reply = if target.id {
                    client.remove_device_service_by_id(name).await?
                } else {
                    client.remove_device_service_by_name(name).await?
                };
                out.exchange(&reply.exchange)?;
                removed(out, "device service", name)?;
            }
        }
        DeviceServiceCommands::Add(source) => {
            let service: DeviceService = load_object(&source, editor)?;
            let reply = client.add_device_service(&service).await?;
            out.exchange(&reply.exchange)?;
            added(out, "device service", &service.name, &reply.data)?;
        }
    }

    Ok(())
}

/// Handle device profile commands
pub async fn handle_profile(
    client: &EdgexClient,
    command: ProfileCommands,
    out: &mut Output,
) -> Result<()> {
    match command {
        ProfileCommands::List => {
            let reply = client.list_profiles().await?;
            out.reply(&reply, |profiles, f| format::format_profiles(profiles, f))?;
        }
        ProfileCommands::Rm(target) => {
            for name in &target.names {
                let reply = if target.id {
                    client.remove_profile_by_id(name).await?
                } else {
                    client.remove_profile_by_name(name).await?
                };
                out.exchange(&reply.exchange)?;
                removed(out, "profile", name)?;
            }
        }
        ProfileCommands::Add { files } => {
            for file in &files {
                let yaml = read_profile(file)?;
                let reply = client.upload_profile_yaml(yaml).await?;
                out.exchange(&reply.exchange)?;
                out.line(format_success(&format!(
                    "Uploaded profile {} ({})",
                    file.display(),
                    reply.data
                )))?;
            }
        }
    }

    Ok(())
}

/// Read a profile document and check that it is YAML
fn read_profile(path: &Path) -> Result<String> {
    let yaml = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_yaml::from_str::<serde_yaml::Value>(&yaml)
        .with_context(|| format!("{} is not valid YAML", path.display()))?;
    Ok(yaml)
}

/// Handle event commands
pub async fn handle_event(
    client: &EdgexClient,
    command: EventCommands,
    out: &mut Output,
) -> Result<()> {
    match command {
        EventCommands::List { device, limit } => {
            let reply = client.list_events(device.as_deref(), limit).await?;
            out.reply(&reply, |events, f| format::format_events(events, f))?;
        }
        EventCommands::Count { device } => {
            let reply = client.event_count(device.as_deref()).await?;
            let what = match &device {
                Some(device) => format!("Events of {}", device),
                None => "Events".to_string(),
            };
            out.reply(&reply, |count, f| format::format_count(&what, *count, f))?;
        }
        EventCommands::Rm { device, age, scrub } => {
            let (reply, message) = if scrub {
                (client.scrub_events().await?, "pushed events".to_string())
            } else if let Some(age) = age {
                (
                    client.remove_events_older_than(age).await?,
                    format!("events older than {} ms", age),
                )
            } else if let Some(device) = device {
                (
                    client.remove_events_by_device(&device).await?,
                    format!("events of {}", device),
                )
            } else {
                return Err(anyhow::anyhow!(
                    "Specify a device, --age or --scrub"
                ));
            };
            out.exchange(&reply.exchange)?;
            out.line(format_success(&format!(
                "Removed {} {}",
                reply.data, message
            )))?;
        }
    }

    Ok(())
}

/// Handle reading commands
pub async fn handle_reading(
    client: &EdgexClient,
    command: ReadingCommands,
    out: &mut Output,
) -> Result<()> {
    match command {
        ReadingCommands::List { device, limit } => {
            let reply = client.list_readings(device.as_deref(), limit).await?;
            out.reply(&reply, |readings, f| format::format_readings(readings, f))?;
        }
        ReadingCommands::Count => {
            let reply = client.reading_count().await?;
            out.reply(&reply, |count, f| format::format_count("Readings", *count, f))?;
        }
    }

    Ok(())
}

/// Filter selected by the `notification list` flags
pub fn notification_filter(
    slug: Option<String>,
    labels: Vec<String>,
    start: Option<i64>,
    end: Option<i64>,
) -> NotificationFilter {
    if let Some(slug) = slug {
        NotificationFilter::Slug(slug)
    } else if !labels.is_empty() {
        NotificationFilter::Labels(labels)
    } else {
        NotificationFilter::Range {
            start: start.unwrap_or(0),
            end: end.unwrap_or_else(|| chrono::Utc::now().timestamp_millis()),
        }
    }
}

/// Handle notification commands
pub async fn handle_notification(
    client: &EdgexClient,
    command: NotificationCommands,
    editor: &EditorConfig,
    out: &mut Output,
) -> Result<()> {
    match command {
        NotificationCommands::List {
            slug,
            labels,
            start,
            end,
            limit,
        } => {
            let filter = notification_filter(slug, labels, start, end);
            let reply = client.list_notifications(&filter, limit).await?;
            out.reply(&reply, |notifications, f| {
                format::format_notifications(notifications, f)
            })?;
        }
        NotificationCommands::Rm { slugs, age } => {
            if let Some(age) = age {
                let reply = client.remove_notifications_by_age(age).await?;
                out.exchange(&reply.exchange)?;
                out.line(format_success(&format!(
                    "Removed notifications older than {} ms",
                    age
                )))?;
            } else {
                for slug in &slugs {
                    let reply = client.remove_notification_by_slug(slug).await?;
                    out.exchange(&reply.exchange)?;
                    removed(out, "notification", slug)?;
                }
            }
        }
        NotificationCommands::Add(source) => {
            let notification: Notification = load_object(&source, editor)?;
            let reply = client.add_notification(&notification).await?;
            out.exchange(&reply.exchange)?;
            added(out, "notification", &notification.slug, &reply.data)?;
        }
    }

    Ok(())
}

/// Handle subscription commands
pub async fn handle_subscription(
    client: &EdgexClient,
    command: SubscriptionCommands,
    editor: &EditorConfig,
    out: &mut Output,
) -> Result<()> {
    match command {
        SubscriptionCommands::List => {
            let reply = client.list_subscriptions().await?;
            out.reply(&reply, |subscriptions, f| {
                format::format_subscriptions(subscriptions, f)
            })?;
        }
        SubscriptionCommands::Rm { slugs } => {
            for slug in &slugs {
                let reply = client.remove_subscription_by_slug(slug).await?;
                out.exchange(&reply.exchange)?;
                removed(out, "subscription", slug)?;
            }
        }
        SubscriptionCommands::Add(source) => {
            let subscription: Subscription = load_object(&source, editor)?;
            let reply = client.add_subscription(&subscription).await?;
            out.exchange(&reply.exchange)?;
            added(out, "subscription", &subscription.slug, &reply.data)?;
        }
    }

    Ok(())
}

/// Handle interval commands
pub async fn handle_interval(
    client: &EdgexClient,
    command: IntervalCommands,
    editor: &EditorConfig,
    out: &mut Output,
) -> Result<()> {
    match command {
        IntervalCommands::List => {
            let reply = client.list_intervals().await?;
            out.reply(&reply, |intervals, f| format::format_intervals(intervals, f))?;
        }
        IntervalCommands::Rm { names } => {
            for name in &names {
                let reply = client.remove_interval_by_name(name).await?;
                out.exchange(&reply.exchange)?;
                removed(out, "interval", name)?;
            }
        }
        IntervalCommands::Add(source) => {
            let interval: Interval = load_object(&source, editor)?;
            let reply = client.add_interval(&interval).await?;
            out.exchange(&reply.exchange)?;
            added(out, "interval", &interval.name, &reply.data)?;
        }
    }

    Ok(())
}

/// Handle status command
pub async fn handle_status(client: &EdgexClient, out: &mut Output) -> Result<()> {
    let mut reports = Vec::new();

    for service in Service::all() {
        let url = client.base_url(*service).to_string();
        let report = match client.ping(*service).await {
            Ok(reply) => {
                out.exchange(&reply.exchange)?;
                ServiceReport {
                    service: service.key().to_string(),
                    url,
                    ok: true,
                    detail: reply.data,
                }
            }
            Err(e) => ServiceReport {
                service: service.key().to_string(),
                url,
                ok: false,
                detail: e.to_string(),
            },
        };
        reports.push(report);
    }

    let formatted = format::format_status(&reports, &out.format())?;
    out.line(formatted)
}

/// Handle version command
pub async fn handle_version(client: &EdgexClient, out: &mut Output) -> Result<()> {
    let mut reports = Vec::new();

    for service in Service::all() {
        let url = client.base_url(*service).to_string();
        let report = match client.version(*service).await {
            Ok(reply) => {
                out.exchange(&reply.exchange)?;
                ServiceReport {
                    service: service.key().to_string(),
                    url,
                    ok: true,
                    detail: reply.data.version,
                }
            }
            Err(e) => ServiceReport {
                service: service.key().to_string(),
                url,
                ok: false,
                detail: e.to_string(),
            },
        };
        reports.push(report);
    }

    let formatted =
        format::format_versions(env!("CARGO_PKG_VERSION"), &reports, &out.format())?;
    out.line(formatted)
}

/// Handle db commands
pub async fn handle_db(client: &EdgexClient, command: DbCommands, out: &mut Output) -> Result<()> {
    match command {
        DbCommands::Purge { yes } => {
            if !yes {
                return Err(anyhow::anyhow!(
                    "Purging deletes all events, devices, device services and profiles; re-run with --yes to confirm"
                ));
            }

            // Everything created before now
            let reply = client.remove_events_older_than(0).await?;
            out.exchange(&reply.exchange)?;
            out.line(format_success(&format!("Removed {} events", reply.data)))?;

            let devices = client.list_devices().await?;
            out.exchange(&devices.exchange)?;
            for device in &devices.data {
                let reply = client.remove_device_by_id(&device.id).await?;
                out.exchange(&reply.exchange)?;
                removed(out, "device", &device.name)?;
            }

            let services = client.list_device_services().await?;
            out.exchange(&services.exchange)?;
            for service in &services.data {
                let reply = client.remove_device_service_by_id(&service.id).await?;
                out.exchange(&reply.exchange)?;
                removed(out, "device service", &service.name)?;
            }

            let profiles = client.list_profiles().await?;
            out.exchange(&profiles.exchange)?;
            for profile in &profiles.data {
                let reply = client.remove_profile_by_id(&profile.id).await?;
                out.exchange(&reply.exchange)?;
                removed(out, "profile", &profile.name)?;
            }
        }
    }

    Ok(())
}

/// Handle config commands
///
/// `set` and `reset` rewrite the file at `path`; the effective configuration
/// shown by `show` also reflects environment and flag overrides.
pub fn handle_config(
    command: ConfigCommands,
    current_config: &CliConfig,
    path: &Path,
    out: &mut Output,
) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            let formatted = format::format_config(current_config, &out.format())?;
            out.line(formatted)?;
        }
        ConfigCommands::Set { key, value } => {
            let mut config = CliConfig::load_from(path)?;
            config.set_value(&key, &value)?;
            config.save_to(path)?;
            out.line(format_success(&format!("Set {} = {}", key, value)))?;
        }
        ConfigCommands::Reset => {
            CliConfig::default().save_to(path)?;
            out.line(format_success("Configuration reset to defaults"))?;
        }
    }

    Ok(())
}

/// Generate shell completion script
pub fn generate_completion(shell: clap_complete::Shell, writer: &mut dyn std::io::Write) {
    use clap::CommandFactory;
    use clap_complete::generate;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, writer);
}

//! CLI command and subcommand definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line client for EdgeX Foundry
#[derive(Parser, Debug)]
#[command(name = "edgexctl")]
#[command(version, about = "Command-line client for EdgeX Foundry", long_about = None)]
pub struct Cli {
    /// Host running the EdgeX services (overrides config file)
    #[arg(short = 'H', long, global = true)]
    pub host: Option<String>,

    /// Output format (overrides config file)
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    /// Print the URL of every request
    #[arg(short = 'u', long = "url", global = true)]
    pub show_urls: bool,

    /// Print entire HTTP responses; implies --no-pager
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write output directly instead of through a pager
    #[arg(long, global = true)]
    pub no_pager: bool,

    /// Don't load config file
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Config file path (default: ~/.edgex-cli/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty table output
    Table,
    /// JSON output
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage devices
    Device {
        #[command(subcommand)]
        command: DeviceCommands,
    },

    /// Manage device services
    #[command(name = "deviceservice")]
    DeviceService {
        #[command(subcommand)]
        command: DeviceServiceCommands,
    },

    /// Manage device profiles
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },

    /// Inspect and remove events
    Event {
        #[command(subcommand)]
        command: EventCommands,
    },

    /// Inspect readings
    Reading {
        #[command(subcommand)]
        command: ReadingCommands,
    },

    /// Manage notifications
    Notification {
        #[command(subcommand)]
        command: NotificationCommands,
    },

    /// Manage notification subscriptions
    Subscription {
        #[command(subcommand)]
        command: SubscriptionCommands,
    },

    /// Manage scheduler intervals
    Interval {
        #[command(subcommand)]
        command: IntervalCommands,
    },

    /// Ping every EdgeX service
    Status,

    /// Bulk database operations
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },

    /// Show CLI and service versions
    Version,

    /// Show or manage CLI configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

impl Commands {
    /// Whether the command hands the terminal to the editor.
    ///
    /// The pager must not be running while the editor is, as both would read
    /// the same keystrokes.
    pub fn opens_editor(&self) -> bool {
        let source = match self {
            Commands::Device {
                command: DeviceCommands::Add(source),
            }
            | Commands::DeviceService {
                command: DeviceServiceCommands::Add(source),
            }
            | Commands::Notification {
                command: NotificationCommands::Add(source),
            }
            | Commands::Subscription {
                command: SubscriptionCommands::Add(source),
            }
            | Commands::Interval {
                command: IntervalCommands::Add(source),
            } => source,
            _ => return false,
        };
        source.file.is_none()
    }
}

/// Where the object to add comes from
#[derive(Args, Debug, Clone)]
pub struct AddSource {
    /// Read the object from a JSON file
    #[arg(short = 'F', long, conflicts_with = "interactive")]
    pub file: Option<PathBuf>,

    /// Write the object in $EDITOR, starting from a template
    #[arg(short, long)]
    pub interactive: bool,
}

/// Removal target addressed by name, or by id with `--id`
#[derive(Args, Debug, Clone)]
pub struct RemoveTarget {
    /// Names (or ids with --id) to remove
    #[arg(required = true)]
    pub names: Vec<String>,

    /// Treat the arguments as ids instead of names
    #[arg(long)]
    pub id: bool,
}

#[derive(Subcommand, Debug)]
pub enum DeviceCommands {
    /// List all devices
    #[command(alias = "ls")]
    List,

    /// Remove devices
    Rm(RemoveTarget),

    /// Add a device
    Add(AddSource),
}

#[derive(Subcommand, Debug)]
pub enum DeviceServiceCommands {
    /// List all device services
    #[command(alias = "ls")]
    List,

    /// Remove device services
    Rm(RemoveTarget),

    /// Add a device service
    Add(AddSource),
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// List all device profiles
    #[command(alias = "ls")]
    List,

    /// Remove device profiles
    Rm(RemoveTarget),

    /// Upload device profiles from YAML files
    Add {
        /// Profile YAML files
        #[arg(short = 'F', long = "file", required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum EventCommands {
    /// List events, optionally of one device
    #[command(alias = "ls")]
    List {
        /// Device name
        device: Option<String>,

        /// Maximum number of events
        #[arg(short, long, default_value_t = 50)]
        limit: u32,
    },

    /// Count events, optionally of one device
    Count {
        /// Device name
        device: Option<String>,
    },

    /// Remove events of a device, by age, or those already pushed
    Rm {
        /// Device whose events are removed
        #[arg(required_unless_present_any = ["age", "scrub"], conflicts_with_all = ["age", "scrub"])]
        device: Option<String>,

        /// Remove events older than this many milliseconds
        #[arg(long, conflicts_with = "scrub")]
        age: Option<u64>,

        /// Remove events that were pushed upstream
        #[arg(long)]
        scrub: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ReadingCommands {
    /// List readings, optionally of one device
    #[command(alias = "ls")]
    List {
        /// Device name
        device: Option<String>,

        /// Maximum number of readings
        #[arg(short, long, default_value_t = 50)]
        limit: u32,
    },

    /// Count all readings
    Count,
}

#[derive(Subcommand, Debug)]
pub enum NotificationCommands {
    /// List notifications by slug, labels or creation time
    #[command(alias = "ls")]
    List {
        /// Notification slug
        #[arg(long, conflicts_with_all = ["labels", "start", "end"])]
        slug: Option<String>,

        /// Comma-separated labels
        #[arg(long, value_delimiter = ',', conflicts_with_all = ["start", "end"])]
        labels: Vec<String>,

        /// Window start, milliseconds since the epoch (default: 0)
        #[arg(long)]
        start: Option<i64>,

        /// Window end, milliseconds since the epoch (default: now)
        #[arg(long)]
        end: Option<i64>,

        /// Maximum number of notifications
        #[arg(short, long, default_value_t = 50)]
        limit: u32,
    },

    /// Remove notifications by slug, or by age
    Rm {
        /// Notification slugs
        #[arg(required_unless_present = "age", conflicts_with = "age")]
        slugs: Vec<String>,

        /// Remove notifications older than this many milliseconds
        #[arg(long)]
        age: Option<u64>,
    },

    /// Add a notification
    Add(AddSource),
}

#[derive(Subcommand, Debug)]
pub enum SubscriptionCommands {
    /// List all subscriptions
    #[command(alias = "ls")]
    List,

    /// Remove subscriptions by slug
    Rm {
        /// Subscription slugs
        #[arg(required = true)]
        slugs: Vec<String>,
    },

    /// Add a subscription
    Add(AddSource),
}

#[derive(Subcommand, Debug)]
pub enum IntervalCommands {
    /// List all intervals
    #[command(alias = "ls")]
    List,

    /// Remove intervals by name
    Rm {
        /// Interval names
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Add an interval
    Add(AddSource),
}

#[derive(Subcommand, Debug)]
pub enum DbCommands {
    /// Remove all events, devices, device services and device profiles
    Purge {
        /// Confirm the purge
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set configuration value
    Set {
        /// Configuration key (host, protocol, format, verbose, timeout or a service name)
        key: String,
        /// Configuration value
        value: String,
    },

    /// Reset configuration to defaults
    Reset,
}

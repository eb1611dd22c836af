//! edgexctl
//!
//! Command-line client for the EdgeX Foundry microservices.

use anyhow::Result;
use clap::Parser;
use edgex_core::EdgexError;
use edgexctl::cli::{
    generate_completion, handle_config, handle_db, handle_device, handle_device_service,
    handle_event, handle_interval, handle_notification, handle_profile, handle_reading,
    handle_status, handle_subscription, handle_version, Cli, Commands,
};
use edgexctl::client::EdgexClient;
use edgexctl::config::CliConfig;
use edgexctl::editor::EditorConfig;
use edgexctl::format::OutputFormat;
use edgexctl::output::Output;
use edgexctl::pager::{OutputTarget, PagerConfig, PagerWriter};
use std::io;
use std::path::Path;
use tracing::debug;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Completion scripts are meant to be redirected, never paged
    if let Commands::Completion { shell } = &cli.command {
        generate_completion(*shell, &mut io::stdout());
        return Ok(());
    }

    let config_path = cli.config.clone().unwrap_or_else(CliConfig::default_path);

    let config = match build_config(&cli, &config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            std::process::exit(1);
        }
    };

    init_tracing(config.verbose);
    debug!(?config, path = %config_path.display(), "configuration loaded");

    // Verbose output is meant to be read in full, so it bypasses the pager.
    // The editor needs the terminal to itself.
    let no_pager = cli.no_pager || config.verbose || cli.command.opens_editor();
    let pager = PagerConfig::from_env(no_pager);
    let writer = PagerWriter::new(pager).unwrap_or_else(|e| {
        debug!("pager unavailable, writing directly: {}", e);
        PagerWriter::direct(OutputTarget::Stdout)
    });
    let mut out = Output::new(writer, OutputFormat::from_config(&config.output_format))
        .with_urls(cli.show_urls)
        .with_verbose(config.verbose);

    let result = run(cli.command, &config, &config_path, &mut out).await;
    let closed = out.close();

    let result = match (result, closed) {
        (Err(e), _) | (Ok(()), Err(e)) => Err(e),
        (Ok(()), Ok(())) => Ok(()),
    };

    if let Err(e) = result {
        // The user quit the pager before reading everything
        if is_broken_pipe(&e) {
            return Ok(());
        }
        eprintln!("Error: {}", e);
        if config.verbose {
            eprintln!("Error details: {:?}", e);
        }
        std::process::exit(1);
    }

    Ok(())
}

/// Build configuration using priority chain: defaults → file → env → CLI args
fn build_config(cli: &Cli, path: &Path) -> Result<CliConfig> {
    let mut builder = CliConfig::builder();

    if !cli.no_config {
        builder = builder.with_config_file(path)?;
    }

    builder = builder.with_env_overrides();

    if let Some(ref host) = cli.host {
        builder = builder.with_host(host)?;
    }
    if let Some(ref format) = cli.format {
        builder = builder.with_output_format(format.as_str())?;
    }
    if cli.verbose {
        builder = builder.with_verbose(true);
    }

    builder.build()
}

async fn run(
    command: Commands,
    config: &CliConfig,
    config_path: &Path,
    out: &mut Output,
) -> Result<()> {
    let client = EdgexClient::new(config)?;
    let editor = EditorConfig::from_env();

    match command {
        Commands::Device { command } => handle_device(&client, command, &editor, out).await,
        Commands::DeviceService { command } => {
            handle_device_service(&client, command, &editor, out).await
        }
        Commands::Profile { command } => handle_profile(&client, command, out).await,
        Commands::Event { command } => handle_event(&client, command, out).await,
        Commands::Reading { command } => handle_reading(&client, command, out).await,
        Commands::Notification { command } => {
            handle_notification(&client, command, &editor, out).await
        }
        Commands::Subscription { command } => {
            handle_subscription(&client, command, &editor, out).await
        }
        Commands::Interval { command } => handle_interval(&client, command, &editor, out).await,
        Commands::Status => handle_status(&client, out).await,
        Commands::Db { command } => handle_db(&client, command, out).await,
        Commands::Version => handle_version(&client, out).await,
        Commands::Config { command } => handle_config(command, config, config_path, out),
        Commands::Completion { shell } => {
            generate_completion(shell, &mut io::stdout());
            Ok(())
        }
    }
}

fn is_broken_pipe(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        let io_error = match cause.downcast_ref::<EdgexError>() {
            Some(EdgexError::Io(e)) => Some(e),
            _ => cause.downcast_ref::<io::Error>(),
        };
        io_error.is_some_and(|e| e.kind() == io::ErrorKind::BrokenPipe)
    })
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // Diagnostics go to stderr so they never end up in the pager
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

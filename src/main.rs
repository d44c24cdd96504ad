//! hidtool CLI
//!
//! Without arguments, lists HID devices whose parent is a USB node. With an
//! instance id, toggles that device between enabled and disabled.

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use hidtool::devtree::{DeviceDirectory, SimulatedDirectory};
use hidtool::{HidtoolConfig, ReportOptions};

// CLI definitions
mod cli;
use cli::Cli;

// Command handlers
mod commands;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config; a bad file must not stop the listing
    let config_path = cli.config.clone().unwrap_or_else(HidtoolConfig::default_path);
    let (config, config_err) = HidtoolConfig::load_or_default(&config_path);
    if let Some(err) = &config_err {
        eprintln!("Error: {err} (using defaults)");
    }

    // Initialize logging (stderr, so stdout stays the report)
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(cli.log_level.as_deref().unwrap_or(&config.log_level))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    debug!("Config from {:?}: {:?}", config_path, config);

    #[cfg(windows)]
    hidtool::devtree::windows::init_console_utf8();

    let options = ReportOptions {
        format: cli.format.unwrap_or(config.format),
        show_parent: config.show_parent && !cli.no_parent,
    };

    match &cli.simulate {
        Some(path) => {
            match SimulatedDirectory::load(path) {
                Ok(directory) => run(&directory, &cli, &options),
                Err(err) => eprintln!("Error: {err}"),
            }
        }
        None => run_native(&cli, &options),
    }

    Ok(())
}

fn run<D: DeviceDirectory>(directory: &D, cli: &Cli, options: &ReportOptions) {
    match &cli.instance_id {
        Some(instance_id) => commands::toggle::run(directory, instance_id),
        None => commands::list::run(directory, options),
    }
}

#[cfg(windows)]
fn run_native(cli: &Cli, options: &ReportOptions) {
    run(&hidtool::devtree::WindowsDirectory::new(), cli, options);
}

#[cfg(not(windows))]
fn run_native(_cli: &Cli, _options: &ReportOptions) {
    eprintln!("Error: no system device directory on this platform; use --simulate <TREE>");
}

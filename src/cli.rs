// CLI definitions using clap

use clap::Parser;
use hidtool::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hidtool")]
#[command(author, version, about = "List USB-attached HID devices, or enable/disable one")]
pub struct Cli {
    /// Device instance ID to toggle (omit to list USB-attached HID devices)
    #[arg(value_name = "INSTANCE_ID")]
    pub instance_id: Option<String>,

    /// Listing output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Don't print the parent device line in text output
    #[arg(long)]
    pub no_parent: bool,

    /// Config file path (default: ~/.config/hidtool/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Use a simulated device tree from a TOML file instead of the system
    #[arg(long, value_name = "TREE")]
    pub simulate: Option<PathBuf>,
}

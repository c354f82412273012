// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spoolwerk — command-line front end.
//
// Entry point. Initialises logging, loads the config, picks the spooler and
// runs one subcommand.

mod services;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use spoolwerk_core::error::{Result, SpoolError};
use spoolwerk_core::human_errors::humanize_error;
use spoolwerk_core::types::{DeviceListing, Orientation, PageGeometry, PrinterIdentity};

use services::app_services::AppServices;
use services::data_dir;
use services::test_page;

#[derive(Parser)]
#[command(
    name = "spoolwerk",
    about = "List printers and spool test pages through the system print spooler",
    author,
    version
)]
struct Cli {
    /// Config file (defaults to the per-user Spoolwerk config).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Use an in-memory virtual spooler instead of real printers.
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List installed printers; the default is marked with `*`, server
    /// connections with `(network)`.
    List {
        /// Print the listing as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show the system default printer.
    #[command(name = "default")]
    ShowDefault,
    /// Spool a one-page text document.
    Print(PrintArgs),
    /// Show or update the saved settings.
    Config(ConfigArgs),
}

#[derive(Args)]
struct PrintArgs {
    /// Target printer (defaults to the configured, then the system default).
    #[arg(long, short)]
    printer: Option<String>,

    /// Paper width in millimetres.
    #[arg(long, requires = "height_mm")]
    width_mm: Option<u32>,

    /// Paper height in millimetres.
    #[arg(long, requires = "width_mm")]
    height_mm: Option<u32>,

    /// Landscape orientation (needs an explicit paper size).
    #[arg(long, requires = "width_mm")]
    landscape: bool,

    /// Text to print; `\n` separates lines.
    #[arg(long)]
    text: Option<String>,
}

#[derive(Args)]
struct ConfigArgs {
    /// Save a preferred printer.
    #[arg(long, value_name = "NAME", conflicts_with = "clear_printer")]
    set_printer: Option<String>,

    /// Forget the preferred printer.
    #[arg(long)]
    clear_printer: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, category = ?e.category(), "command failed");
            let human = humanize_error(&e);
            eprintln!("{}", human.message);
            eprintln!("  {}", human.suggestion);
            for failure in e.cleanup_failures() {
                eprintln!("  warning: {} while leaving {:?}", failure.error, failure.stage);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.unwrap_or_else(data_dir::config_path);
    let services = AppServices::init(&config_path, cli.dry_run)?;
    tracing::debug!(platform = services.platform_name(), config = %config_path.display(), "spooler selected");

    match cli.command {
        Command::List { json } => list(&services, json),
        Command::ShowDefault => {
            let printer = services.default_printer()?.ok_or(SpoolError::NoDefaultDevice)?;
            println!("{printer}");
            Ok(())
        }
        Command::Print(args) => print(&services, args),
        Command::Config(args) => config(services, args),
    }
}

fn list(services: &AppServices, json: bool) -> Result<()> {
    let listing = services.listing()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }
    if listing.devices.is_empty() {
        println!("No printers installed.");
    }
    for line in listing_lines(&listing) {
        println!("{line}");
    }
    Ok(())
}

/// One line per device: `*` marks the default, `(network)` a server connection.
fn listing_lines(listing: &DeviceListing) -> Vec<String> {
    listing
        .devices
        .iter()
        .map(|device| {
            let marker = if listing.is_default(device) { '*' } else { ' ' };
            let network = if listing.is_network(device) { " (network)" } else { "" };
            format!("{marker} {device}{network}")
        })
        .collect()
}

fn print(services: &AppServices, args: PrintArgs) -> Result<()> {
    let geometry = match (args.width_mm, args.height_mm) {
        (Some(width), Some(height)) => Some(PageGeometry::new(
            width,
            height,
            Orientation::from_landscape(args.landscape),
        )?),
        _ => None,
    };
    let text = args
        .text
        .map(|t| t.replace("\\n", "\n"))
        .unwrap_or_else(|| test_page::DEFAULT_TEXT.to_string());

    let report = services.print_test_page(args.printer.as_deref(), geometry, &text)?;

    let target = if services.is_dry_run() { " (dry run)" } else { "" };
    println!("Job {} sent to {}{target}.", report.id, report.printer);
    for failure in &report.cleanup_failures {
        println!("  warning: {} while leaving {:?}", failure.error, failure.stage);
    }
    Ok(())
}

fn config(services: AppServices, args: ConfigArgs) -> Result<()> {
    let mut config = services.config().clone();
    let changed = if let Some(name) = args.set_printer {
        config.preferred_printer = Some(PrinterIdentity::new(name)?);
        true
    } else if args.clear_printer {
        config.preferred_printer = None;
        true
    } else {
        false
    };

    if changed {
        config.save(services.config_path())?;
        tracing::info!(path = %services.config_path().display(), "config updated");
    }
    println!("# {}", services.config_path().display());
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

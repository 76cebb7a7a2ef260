mod frontend;
mod simulate;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use frontend::Frontend;
use phoniebox_controls::{
    CommandPowerOff, DryRunPowerOff, InMemoryHost, PhonieboxControls, PowerOff,
};
use phoniebox_core::{init_logging, AppDirs, Config, EdgeKind, GpioSettings};
use phoniebox_gpio::{GpioDispatcher, NullGpioDriver};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "phoniebox", version, about = "Button and idle shutdown control for a phoniebox")]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate the button configuration and list the resulting bindings
    Check,
    /// Print the [gpio] table in canonical form
    Normalize,
    /// Drive the buttons from stdin against an in-memory player
    Simulate {
        /// Log the shutdown instead of running shutdown_command
        #[arg(long)]
        dry_run: bool,
        /// Number of tracks in the simulated tracklist
        #[arg(long, default_value_t = 10)]
        tracks: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let dirs = AppDirs::discover()?;
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(&dirs)?,
    };
    let _logging = init_logging(&config.logging, &dirs)?;
    tracing::debug!("config dir: {}", dirs.config_dir().display());

    let settings = config.gpio_settings();
    match cli.command {
        Command::Check => {
            let host = Arc::new(InMemoryHost::default());
            let controls = Arc::new(PhonieboxControls::new(host, Box::new(DryRunPowerOff)));
            let mut driver = NullGpioDriver::new();
            let dispatcher = GpioDispatcher::configure(&settings, &mut driver, controls);

            print!("{}", check_report(&settings, &dispatcher));
            let errors = settings.errors.len() + dispatcher.binding_errors().len();
            if errors > 0 {
                bail!("{errors} configuration error(s)");
            }
        }
        Command::Normalize => {
            print!("{}", normalized_gpio_table(&settings)?);
        }
        Command::Simulate { dry_run, tracks } => {
            let power: Box<dyn PowerOff> = match CommandPowerOff::from_argv(&config.shutdown_command)
            {
                Some(command) if !dry_run => Box::new(command),
                _ => Box::new(DryRunPowerOff),
            };
            let host = Arc::new(InMemoryHost::new(tracks));
            let controls = Arc::new(PhonieboxControls::new(host.clone(), power));
            let mut driver = NullGpioDriver::new();
            let frontend = Frontend::start(
                &settings,
                &mut driver,
                controls,
                config.idle_seconds(),
                host.subscribe(),
            );
            tracing::info!(
                "simulating {} configured pin(s), idle shutdown after {}s",
                driver.configured().len(),
                config.idle_seconds()
            );

            let result = simulate::run(&frontend, &host).await;
            frontend.stop().await?;
            result?;
        }
    }

    Ok(())
}

fn check_report(settings: &GpioSettings, dispatcher: &GpioDispatcher) -> String {
    let mut out = String::new();
    for (pin, slot) in dispatcher.slots() {
        let Some(config) = slot.config() else {
            continue;
        };
        let _ = writeln!(out, "{pin}: {config}");
        for edge in EdgeKind::ALL {
            if let Some(binding) = slot.binding(edge) {
                let _ = writeln!(
                    out,
                    "  {} -> {} {:?}",
                    edge.config_name(),
                    binding.action.name(),
                    binding.args
                );
            }
        }
    }
    for error in &settings.errors {
        let _ = writeln!(out, "error: {error}");
    }
    for error in dispatcher.binding_errors() {
        let _ = writeln!(out, "error: {error}");
    }
    out
}

#[derive(Serialize)]
struct GpioTable<'a> {
    gpio: &'a BTreeMap<String, String>,
}

fn normalized_gpio_table(settings: &GpioSettings) -> Result<String> {
    let gpio = settings.to_gpio_table();
    Ok(toml::to_string(&GpioTable { gpio: &gpio })?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(entries: &[(&str, &str)], buttons: &[(&str, &str)]) -> GpioSettings {
        let table = |entries: &[(&str, &str)]| {
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>()
        };
        GpioSettings::from_tables(&table(entries), &table(buttons))
    }

    fn dispatcher(settings: &GpioSettings) -> GpioDispatcher {
        let host = Arc::new(InMemoryHost::default());
        let controls = Arc::new(PhonieboxControls::new(host, Box::new(DryRunPowerOff)));
        GpioDispatcher::configure(settings, &mut NullGpioDriver::new(), controls)
    }

    #[test]
    fn cli_parses_simulate_flags() {
        let cli = Cli::try_parse_from([
            "phoniebox",
            "--config",
            "/tmp/box.toml",
            "simulate",
            "--dry-run",
        ])
        .expect("valid arguments");
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/box.toml")));
        assert!(matches!(
            cli.command,
            Command::Simulate {
                dry_run: true,
                tracks: 10
            }
        ));
    }

    #[test]
    fn check_report_lists_bindings_and_errors() {
        let settings = settings(
            &[
                ("gpio17", "pull_up"),
                ("gpio17.when_pressed", "vol_up,vol_step=5"),
                ("gpio3.when_held", "next"),
                ("gpio40", "pull_up"),
            ],
            &[],
        );
        let dispatcher = dispatcher(&settings);
        let report = check_report(&settings, &dispatcher);

        assert!(report.contains("gpio17: pull_up,None,1,False\n"));
        assert!(report.contains("  when_pressed -> vol_up VolStep(5)\n"));
        assert!(report.contains("error: cannot configure gpio3.when_held: gpio3 not configured\n"));
        assert!(report.contains("error: gpio.gpio40:"));
    }

    #[test]
    fn normalize_quotes_dotted_keys() {
        let settings = settings(
            &[
                ("gpio5", " pull_down , 20 "),
                ("gpio5.when_pressed", "seek_fwd, seconds = 15"),
            ],
            &[],
        );
        let table = normalized_gpio_table(&settings).expect("serializable");
        assert!(table.starts_with("[gpio]\n"));
        assert!(table.contains("gpio5 = \"pull_down,20,1,False\"\n"));
        assert!(table.contains("\"gpio5.when_pressed\" = \"seek_fwd,seconds=15\"\n"));
    }
}

//! Provides the `temscript-cli` tool for reading and writing Gun1 attributes.
//!
//! Usage: `temscript-cli [OPTIONS] <COMMAND>`
//!
//! Values are given and printed as JSON: `1.5`, `[x, y]`, `"On"`,
//! `{"min": a, "max": b}`.
//!
//! # Examples
//! ```text
//! temscript-cli --simulate get HighVoltageOffset
//! temscript-cli set HighVoltageOffset 0.5
//! temscript-cli invoke GetHighVoltageOffsetRange
//! ```

use std::fmt::Write as _;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use temscript::config::{Backend, Config};
use temscript::gun1::{self, Gun1Handle};
use temscript::simulated::SimulatedGun1;
use temscript::value::Value;
use temscript::{logging, PropertyBindingAdapter};

#[derive(Parser)]
#[command(name = "temscript-cli", version, about = "Access the TEMScripting Gun1 interface")]
struct Cli {
    /// Configuration file (default: <config dir>/CEOS/temscript.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use the simulated gun instead of the instrument
    #[arg(long)]
    simulate: bool,

    /// Expose attributes disabled on current instruments
    #[arg(long)]
    expose_disabled: bool,

    /// Log level
    #[arg(long, value_parser = logging::LEVELS)]
    loglevel: Option<String>,

    /// Suppress logging to console
    #[arg(long)]
    quiet: bool,

    /// Log to file
    #[arg(long)]
    logfile: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List exposed attributes and methods
    List,
    /// Read an attribute
    Get { name: String },
    /// Write an attribute from a JSON value
    Set { name: String, value: String },
    /// Invoke a method with JSON arguments
    Invoke { name: String, args: Vec<String> },
    /// Write the effective configuration to the configuration file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    if let Err(err) = run(Cli::parse()) {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::default_path()?,
    };
    let mut config = Config::load(&path)?;
    if cli.simulate {
        config.backend = Backend::Simulated;
    }
    config.expose_disabled |= cli.expose_disabled;
    if let Some(level) = &cli.loglevel {
        config.log.level = level.clone();
    }
    config.log.quiet |= cli.quiet;
    if cli.logfile.is_some() {
        config.log.file = cli.logfile.clone();
    }

    if let Command::InitConfig { force } = cli.command {
        if path.exists() && !force {
            anyhow::bail!("{} already exists (use --force)", path.display());
        }
        config.save(&path)?;
        eprintln!("Saved {}", path.display());
        return Ok(());
    }

    logging::init(&config.log)?;
    tracing::debug!(config = %path.display(), backend = ?config.backend, "starting");

    match config.backend {
        Backend::Simulated => {
            let gun = SimulatedGun1::with_state(config.simulation.clone());
            execute(&cli.command, &config, &gun)
        }
        Backend::Com => run_com(&cli.command, &config),
    }
}

#[cfg(windows)]
fn run_com(command: &Command, config: &Config) -> Result<()> {
    use temscript::com::dispatch::{ComApartment, Instrument};

    let _apartment = ComApartment::initialize().context("initializing COM")?;
    let instrument = Instrument::connect().context("connecting to TEMScripting.Instrument")?;
    let gun = instrument.gun().context("reading Instrument.Gun")?;
    execute(command, config, &gun)
}

#[cfg(not(windows))]
fn run_com(_command: &Command, _config: &Config) -> Result<()> {
    anyhow::bail!("the COM backend is only available on Windows (use --simulate)")
}

fn execute(command: &Command, config: &Config, gun: &Gun1Handle) -> Result<()> {
    let adapter = gun1::bind(gun).with_policy(config.exposure_policy());
    match command {
        Command::List => print!("{}", render_list(&adapter)),
        Command::Get { name } => {
            let value = adapter.get(name)?;
            println!("{}", serde_json::to_string(&value)?);
        }
        Command::Set { name, value } => {
            adapter.set(name, parse_value(value)?)?;
        }
        Command::Invoke { name, args } => {
            let args = args.iter().map(|a| parse_value(a)).collect::<Result<Vec<_>>>()?;
            let value = adapter.invoke(name, &args)?;
            println!("{}", serde_json::to_string(&value)?);
        }
        Command::InitConfig { .. } => anyhow::bail!("init-config does not access the instrument"),
    }
    Ok(())
}

fn render_list(adapter: &PropertyBindingAdapter<'_, Gun1Handle>) -> String {
    let mut out = format!("{}:\n", adapter.type_name());
    for name in adapter.attributes() {
        let _ = writeln!(out, "  {name}");
    }
    for name in adapter.methods() {
        let _ = writeln!(out, "  {name}()");
    }
    out
}

fn parse_value(text: &str) -> Result<Value> {
    serde_json::from_str(text).with_context(|| format!("invalid value '{text}'"))
}

#[cfg(test)]
mod tests {
    use glam::DVec2;
    use temscript::gun1::HighTensionState;
    use temscript::ExposurePolicy;

    use super::*;

    #[test]
    fn test_parse_value_per_kind() {
        assert_eq!(parse_value("3").unwrap(), Value::Double(3.0));
        assert_eq!(parse_value("-0.5").unwrap(), Value::Double(-0.5));
        assert_eq!(parse_value("[1,2]").unwrap(), Value::Vector(DVec2::new(1.0, 2.0)));
        assert_eq!(parse_value("\"Off\"").unwrap(), Value::Enum(HighTensionState::Off));
    }

    #[test]
    fn test_parse_value_rejects_unknown_input() {
        for text in ["Off", "\"Sideways\"", "[1]", ""] {
            let err = parse_value(text).unwrap_err();
            assert!(err.to_string().contains("invalid value"), "{text}: {err:#}");
        }
    }

    #[test]
    fn test_list_shows_enabled_surface() {
        let gun = SimulatedGun1::new();
        let adapter = gun1::bind(&gun);
        assert_eq!(
            render_list(&adapter),
            "Gun1:\n  HighVoltageOffset\n  GetHighVoltageOffsetRange()\n"
        );

        let listed = render_list(&adapter.with_policy(ExposurePolicy::All));
        for name in ["HTState", "HTValue", "HTMaxValue", "Shift", "Tilt"] {
            assert!(listed.contains(&format!("  {name}\n")), "{listed}");
        }
        assert_eq!(gun.native_calls(), 0);
    }

    #[test]
    fn test_execute_set_reaches_gun() {
        let gun = SimulatedGun1::new();
        let config = Config {
            backend: Backend::Simulated,
            ..Config::default()
        };
        let set = Command::Set {
            name: "HighVoltageOffset".to_string(),
            value: "1.25".to_string(),
        };
        execute(&set, &config, &gun).unwrap();
        assert_eq!(gun.snapshot().unwrap().high_voltage_offset, 1.25);

        let hidden = Command::Set {
            name: "Shift".to_string(),
            value: "[1, 2]".to_string(),
        };
        assert!(execute(&hidden, &config, &gun).is_err());

        let config = Config {
            expose_disabled: true,
            ..config
        };
        execute(&hidden, &config, &gun).unwrap();
        assert_eq!(gun.snapshot().unwrap().shift, [1.0, 2.0]);
    }

    #[test]
    fn test_execute_rejects_bad_arguments() {
        let gun = SimulatedGun1::new();
        let config = Config::default();
        let invoke = Command::Invoke {
            name: "GetHighVoltageOffsetRange".to_string(),
            args: vec!["1".to_string()],
        };
        assert!(execute(&invoke, &config, &gun).is_err());
        let set = Command::Set {
            name: "HighVoltageOffset".to_string(),
            value: "oops".to_string(),
        };
        assert!(execute(&set, &config, &gun).is_err());
        assert_eq!(gun.native_calls(), 0);
    }
}

use clap::{Parser, Subcommand, ValueEnum};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use phyctl::config::Profile;
use phyctl::controller::{ControllerWorker, PhyController};
use phyctl::directory;
use phyctl::error::{ControllerError, ControllerResult};
use phyctl::transport::HttpTransport;
use phyctl::ui::progress::{ProgressManager, ProgressTransport};
use phyctl::ui::{
    self, APPLY_BAR, print_banner, print_state, select_with_progress, switch_with_progress,
    tune_with_progress,
};
use phyctl::utils::consts::*;
use phyctl::utils::logging::init_logging;
use phyctl::{ControllerState, PhyField, PhyIndex};

type CliController = PhyController<ProgressTransport<HttpTransport>>;

#[derive(Parser, Debug)]
#[command(author, version, about = "Switch a dual-PHY SDR flowgraph between waveforms", long_about = None)]
struct Cli {
    /// Control-plane URL of the flowgraph
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    url: String,
    /// JSON profile with PHY parameters, channels, tuning mode and block names
    #[arg(short, long)]
    profile: Option<PathBuf>,
    /// Per-request timeout in milliseconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_MS)]
    timeout_ms: u64,
    /// Refuse to run unless every block role was discovered
    #[arg(long)]
    strict: bool,
    /// Log every remote call
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List discovered blocks, resolved roles and call endpoints
    Blocks,
    /// Print the effective profile as JSON without contacting the flowgraph
    Show,
    /// Apply a PHY's configuration and route traffic through it
    Select {
        #[arg(value_parser = clap::value_parser!(u8).range(0..=1))]
        phy: u8,
        /// Override a parameter of the selected PHY, e.g. `rx-gain=40`
        #[arg(long = "set", value_parser = parse_override)]
        overrides: Vec<(PhyField, f64)>,
    },
    /// Apply the inactive PHY (PHY 1 in a fresh session) and route traffic through it
    Switch,
    /// Keep toggling between the PHYs until Ctrl-C or `count` switches
    Hop {
        #[arg(long, default_value_t = DEFAULT_HOP_INTERVAL_MS)]
        interval_ms: u64,
        #[arg(long)]
        count: Option<u64>,
    },
    /// Send one frontend parameter immediately, bypassing the PHY table
    Tune {
        #[arg(value_enum)]
        param: TuneParam,
        #[arg(allow_negative_numbers = true)]
        value: f64,
        /// Frontend channel (center frequency and offset only)
        #[arg(long, default_value_t = 0)]
        channel: u32,
    },
    /// Interactive menu
    Console,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum TuneParam {
    RxFrequency,
    TxFrequency,
    RxGain,
    TxGain,
    RxSampleRate,
    TxSampleRate,
    RxCenterFrequency,
    TxCenterFrequency,
    RxFrequencyOffset,
    TxFrequencyOffset,
}

fn parse_override(s: &str) -> Result<(PhyField, f64), String> {
    let (field, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected <parameter>=<value>, got '{}'", s))?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|e| format!("bad value '{}': {}", value, e))?;
    Ok((field.trim().parse()?, value))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let profile = match &cli.profile {
        Some(path) => {
            info!("Loading profile {}", path.display());
            Profile::load(path)?
        }
        None => Profile::default(),
    };

    if let Commands::Show = cli.command {
        let state = ControllerState {
            phys: profile.phy_table(),
            channels: profile.channels,
            tuning_mode: profile.tuning_mode,
            ..Default::default()
        };
        println!("{}", Profile::from_state(&state, profile.roles.clone()).to_json_pretty()?);
        return Ok(());
    }

    let progress = ProgressManager::new();
    let mut controller = connect(&cli, &profile, &progress)?;

    match cli.command {
        Commands::Blocks => {
            let endpoints = controller.endpoints();
            println!(
                "{}: {} of {} call endpoints resolved",
                controller.base_url(),
                endpoints.len(),
                phyctl::wire::RemoteOp::ALL.len()
            );
            if endpoints.is_empty() {
                warn!("No control block found; check --url and the profile's role names");
            }
            for (op, url) in controller.endpoints().iter() {
                println!("{:<28} {}", op.name(), url);
            }
            for role in controller.missing_roles() {
                println!("{:<28} <missing: {}>", role.name(), profile.roles.name_of(*role));
            }
        }
        Commands::Select { phy, overrides } => {
            let target = PhyIndex::try_from(phy as usize)?;
            for (field, value) in overrides {
                controller.set_field(target.as_usize(), field, value)?;
            }
            select_with_progress(&mut controller, &progress, target)?;
            print_state(controller.state());
        }
        Commands::Switch => {
            let phy = switch_with_progress(&mut controller, &progress)?;
            info!("{} active", phy);
            print_state(controller.state());
        }
        Commands::Hop { interval_ms, count } => hop(controller, interval_ms, count)?,
        Commands::Tune {
            param,
            value,
            channel,
        } => {
            let label = format!("{:?}", param);
            tune_with_progress(&progress, &label, || tune(&mut controller, param, value, channel))?;
        }
        Commands::Console => {
            print_banner();
            ui::console::run_console(&mut controller, &progress)?;
        }
        Commands::Show => {}
    }
    Ok(())
}

fn connect(cli: &Cli, profile: &Profile, progress: &ProgressManager) -> ControllerResult<CliController> {
    let http = HttpTransport::new(Duration::from_millis(cli.timeout_ms)).map_err(ControllerError::Discovery)?;
    let mut transport = ProgressTransport::new(http, progress.clone(), APPLY_BAR);
    let matchers = profile.roles.matchers();

    let (description, resolution) = directory::discover(&mut transport, &cli.url, &matchers)?;
    info!("Discovered {} blocks at {}", description.blocks.len(), cli.url);
    let resolution = if cli.strict {
        resolution.require_complete()?
    } else {
        resolution
    };

    let mut controller = PhyController::with_resolution(transport, &cli.url, &resolution);
    profile.apply_to(&mut controller);
    Ok(controller)
}

fn tune(controller: &mut CliController, param: TuneParam, value: f64, channel: u32) -> ControllerResult<()> {
    match param {
        TuneParam::RxFrequency => controller.send_rx_frequency(value),
        TuneParam::TxFrequency => controller.send_tx_frequency(value),
        TuneParam::RxGain => controller.send_rx_gain(value),
        TuneParam::TxGain => controller.send_tx_gain(value),
        TuneParam::RxSampleRate => controller.send_rx_sample_rate(value),
        TuneParam::TxSampleRate => controller.send_tx_sample_rate(value),
        TuneParam::RxCenterFrequency => controller.send_rx_center_frequency(value, channel),
        TuneParam::TxCenterFrequency => controller.send_tx_center_frequency(value, channel),
        TuneParam::RxFrequencyOffset => controller.send_rx_frequency_offset(value, channel),
        TuneParam::TxFrequencyOffset => controller.send_tx_frequency_offset(value, channel),
    }?;
    info!("{:?} = {} sent", param, value);
    Ok(())
}

fn hop(controller: CliController, interval_ms: u64, count: Option<u64>) -> ControllerResult<()> {
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    // Ctrl+C stops after the switch in progress
    if let Err(e) = ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Cannot install Ctrl-C handler: {}", e);
    }

    let worker = ControllerWorker::spawn(controller);
    let handle = worker.handle();
    let interval = Duration::from_millis(interval_ms);

    // Start from a known state before toggling
    handle.select(PhyIndex::Phy0.as_usize())?;
    let mut switches = 0u64;
    let mut result = Ok(());

    'hop: while running.load(Ordering::SeqCst) && count.is_none_or(|n| switches < n) {
        let started = Instant::now();
        while started.elapsed() < interval {
            if !running.load(Ordering::SeqCst) {
                break 'hop;
            }
            std::thread::sleep(Duration::from_millis(HOP_POLL_MS));
        }

        match handle.switch() {
            Ok(phy) => {
                switches += 1;
                info!("Hop {}: {} active", switches, phy);
            }
            Err(e) => {
                result = Err(e);
                break;
            }
        }
    }

    let controller = worker.join()?;
    info!(
        "Stopped after {} switches, {} active",
        switches,
        controller.active_phy()
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subcommands() {
        for (args, name) in [
            (vec!["phyctl", "blocks"], "blocks"),
            (vec!["phyctl", "show"], "show"),
            (vec!["phyctl", "select", "1"], "select"),
            (vec!["phyctl", "switch"], "switch"),
            (vec!["phyctl", "hop", "--count", "4"], "hop"),
            (vec!["phyctl", "tune", "rx-gain", "40"], "tune"),
            (vec!["phyctl", "console"], "console"),
        ] {
            let cli = Cli::try_parse_from(args).unwrap();
            let parsed = match cli.command {
                Commands::Blocks => "blocks",
                Commands::Show => "show",
                Commands::Select { .. } => "select",
                Commands::Switch => "switch",
                Commands::Hop { .. } => "hop",
                Commands::Tune { .. } => "tune",
                Commands::Console => "console",
            };
            assert_eq!(parsed, name);
        }
    }

    #[test]
    fn test_parse_select_overrides() {
        let cli = Cli::try_parse_from([
            "phyctl", "select", "0", "--set", "rx-gain=40", "--set", "center_frequency=2.44e9",
        ])
        .unwrap();
        match cli.command {
            Commands::Select { phy, overrides } => {
                assert_eq!(phy, 0);
                assert_eq!(
                    overrides,
                    vec![(PhyField::RxGain, 40.0), (PhyField::CenterFrequency, 2.44e9)]
                );
            }
            other => panic!("unexpected command: {:?}", other),
        }

        assert!(Cli::try_parse_from(["phyctl", "select", "2"]).is_err());
        assert!(Cli::try_parse_from(["phyctl", "select", "0", "--set", "bandwidth=1"]).is_err());
        assert!(Cli::try_parse_from(["phyctl", "select", "0", "--set", "rx-gain"]).is_err());
    }

    #[test]
    fn test_parse_tune_and_globals() {
        let cli = Cli::try_parse_from([
            "phyctl", "--url", "http://sdr:1337/api/fg/1/", "--strict", "tune",
            "tx-frequency-offset", "-250000", "--channel", "1",
        ])
        .unwrap();
        assert_eq!(cli.url, "http://sdr:1337/api/fg/1/");
        assert!(cli.strict);
        assert_eq!(cli.timeout_ms, DEFAULT_TIMEOUT_MS);
        match cli.command {
            Commands::Tune { param, value, channel } => {
                assert_eq!(param, TuneParam::TxFrequencyOffset);
                assert_eq!(value, -250000.0);
                assert_eq!(channel, 1);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}

use std::path::PathBuf;

use clap::Parser;
use log::{info, warn};

use pedalplot::config::PedalPlotConfig;
use pedalplot::context::PipelineContext;
use pedalplot::source::{available_ports, LineDevice, SerialDevice, SimulatedPedals};
use pedalplot::run_pedalplot;

#[derive(Parser, Debug)]
#[command(name = "pedalplot")]
#[command(about = "Live brake/throttle plot for serial pedal controllers", long_about = None)]
struct Args {
    /// Serial port of the controller (overrides the config file).
    #[arg(short, long)]
    port: Option<String>,

    /// YAML config file. Defaults to ~/.pedalplot/config.yaml when present.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the effective configuration to the config path and exit.
    #[arg(long)]
    save_config: bool,

    /// Use a simulated controller instead of a serial port.
    #[arg(long)]
    simulate: bool,

    /// Print the available serial ports and exit.
    #[arg(long)]
    list_ports: bool,

    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn load_config(args: &Args) -> (PedalPlotConfig, Option<PathBuf>) {
    let path = args
        .config
        .clone()
        .or_else(|| PedalPlotConfig::default_path().ok());
    let mut cfg = match &path {
        Some(p) if p.exists() => match PedalPlotConfig::load(p) {
            Ok(cfg) => {
                info!("Loaded config from {p:?}");
                cfg
            }
            Err(e) => {
                warn!("{e}; using defaults");
                PedalPlotConfig::default()
            }
        },
        _ => PedalPlotConfig::default(),
    };
    if let Some(port) = &args.port {
        cfg.port = port.clone();
    }
    (cfg, path)
}

fn main() -> eframe::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if args.list_ports {
        for port in available_ports() {
            println!("{port}");
        }
        return Ok(());
    }

    let (cfg, path) = load_config(&args);

    if args.save_config {
        match &path {
            Some(p) => match cfg.save(p) {
                Ok(()) => info!("Saved config to {p:?}"),
                Err(e) => warn!("{e}"),
            },
            None => warn!("No config path available"),
        }
        return Ok(());
    }

    let pipeline = if args.simulate {
        PipelineContext::connect(|| Ok(Box::new(SimulatedPedals::default()) as Box<dyn LineDevice>))
    } else {
        let port = cfg.port.clone();
        PipelineContext::connect(move || {
            SerialDevice::open(&port).map(|d| Box::new(d) as Box<dyn LineDevice>)
        })
    };

    run_pedalplot(pipeline, cfg)
}

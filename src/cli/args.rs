use crate::execution::Strategy;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "travel-weather")]
#[command(about = "Five-day forecasts for a catalog of destinations")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(
        short,
        long,
        global = true,
        help = "Configuration file [default: ./travel-weather.toml if present]"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Look up forecasts for selected places
    Fetch {
        #[arg(
            short,
            long = "place",
            help = "Place to look up, repeatable [default: every catalog place]"
        )]
        places: Vec<String>,

        #[arg(long, value_enum, help = "Strategy for the geocoding stage")]
        geo_strategy: Option<Strategy>,

        #[arg(long, value_enum, help = "Strategy for the forecast stage")]
        forecast_strategy: Option<Strategy>,

        #[arg(long, help = "Worker processes for the process strategy")]
        max_workers: Option<usize>,

        #[arg(short, long, help = "Hide the progress spinner")]
        quiet: bool,
    },

    /// Time serial, threaded and multi-process lookups over the catalog
    Benchmark {
        #[arg(long, help = "Worker processes for the process strategy")]
        max_workers: Option<usize>,
    },

    /// Write every saved forecast to weather.txt
    Export {
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// List catalog places and their cached coordinates
    Places,

    /// Serve lookup requests on stdin for the process strategy
    #[command(hide = true)]
    Worker,
}

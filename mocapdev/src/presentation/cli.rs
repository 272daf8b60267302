use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "mocapdev: C3D inspection and marker clustering CLI", long_about = None)]
pub struct Cli {
    /// Debug logging (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Viewer settings as JSON
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Dump the 512-byte header record
    Header {
        file: PathBuf,
        /// write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Dump every group and parameter
    Params {
        file: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Export marker samples as semicolon separated values
    Points {
        file: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Export analog samples as semicolon separated values
    Analog {
        file: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Summarise one file
    Info {
        file: PathBuf,
        #[arg(long)]
        json: bool,
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Summarise every .c3d file under a directory
    Scan {
        dir: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Cluster the first frame's markers with k-means
    Cluster {
        file: PathBuf,
        /// cluster count (defaults to the configured one)
        #[arg(short, long)]
        k: Option<usize>,
        #[arg(long)]
        json: bool,
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Infer rigid marker pairs inside one cluster
    Bones {
        file: PathBuf,
        #[arg(short, long)]
        k: Option<usize>,
        /// cluster name; the first cluster when omitted
        #[arg(long)]
        cluster: Option<String>,
        #[arg(long)]
        json: bool,
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Step playback and print the frame and centroid per tick
    Play {
        file: PathBuf,
        #[arg(long, default_value_t = 10)]
        ticks: usize,
        #[arg(long, allow_hyphen_values = true)]
        velocity: Option<i32>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

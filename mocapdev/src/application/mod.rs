pub mod handlers;

use crate::presentation::cli::{Cli, Commands};
use mocap_core::error::Result;

pub fn run(cli: Cli) -> Result<()> {
    let config = handlers::load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Header { file, out } => handlers::handle_header(file, out),
        Commands::Params { file, out } => handlers::handle_params(file, out),
        Commands::Points { file, out } => handlers::handle_points(file, out),
        Commands::Analog { file, out } => handlers::handle_analog(file, out),
        Commands::Info { file, json, out } => handlers::handle_info(file, json, out),
        Commands::Scan { dir, out } => handlers::handle_scan(dir, out),
        Commands::Cluster { file, k, json, out } => {
            handlers::handle_cluster(file, config, k, json, out)
        }
        Commands::Bones {
            file,
            k,
            cluster,
            json,
            out,
        } => handlers::handle_bones(file, config, k, cluster, json, out),
        Commands::Play {
            file,
            ticks,
            velocity,
            out,
        } => handlers::handle_play(file, config, ticks, velocity, out),
    }
}

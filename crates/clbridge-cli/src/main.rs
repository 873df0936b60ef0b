use clap::{Parser, Subcommand};
use tracing::info;

use clbridge_core::config::{default_config_path, BridgeConfig};
use clbridge_core::status::StatusCode;
use clbridge_core::Bridge;

#[derive(Parser)]
#[command(name = "clbridge")]
#[command(about = "clbridge - host-side bridge to the CLBlast GPU BLAS library")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Attach to the native library and run a smoke call against it
    Probe,

    /// Print the symbolic name of a status code
    Status {
        /// Raw status code as returned by a bridge call
        code: i32,
    },
}

fn main() -> anyhow::Result<()> {
    clbridge_common::init_logging();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(default_config_path);

    match cli.command {
        Commands::Probe => {
            info!("probing with config: {}", config_path);
            let config = BridgeConfig::load_or_default(&config_path);
            let bridge = Bridge::attach(&config)?;
            println!("attach ok, abi v{}", clbridge_core::ABI_VERSION);

            // ClearCache takes no handles, so it makes a safe smoke call.
            let status = bridge.clear_cache();
            println!("clear_cache: {}", status);
            bridge.detach();

            if !status.is_success() {
                anyhow::bail!("smoke call failed: {}", status);
            }
        }
        Commands::Status { code } => {
            let status = StatusCode::from_raw(code);
            println!("{}: {}", status, status.description());
        }
    }

    Ok(())
}

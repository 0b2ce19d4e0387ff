use clap::Parser;
use gogen::cli::{run_cli, Cli};
use gogen::error::GenError;
use gogen::logging::{init_logging_with_config, LogConfig};

fn main() {
    let cli = Cli::parse();

    let log_config = LogConfig::from_env().verbose(cli.verbose());
    if let Err(e) = init_logging_with_config(&log_config) {
        eprintln!("Warning: {e:#}");
    }

    if let Err(err) = run_cli(cli) {
        eprintln!("❌ {err:#}");
        let code = err
            .chain()
            .find_map(|cause| cause.downcast_ref::<GenError>())
            .map_or(1, GenError::exit_code);
        std::process::exit(code);
    }
}

mod cli;

use tracing_subscriber::EnvFilter;

/// Log filter variable, e.g. `OPTFLOW_LOG=optflow_core=debug`.
const LOG_ENV: &str = "OPTFLOW_LOG";

fn main() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    std::process::exit(cli::run_from_env());
}

mod commands;
mod helpers;

use clap::Parser;
use optflow_core::domain::OptError;

const PROGRAM_NAME: &str = "optflow";

pub fn run_from_env() -> i32 {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match run(args) {
        Ok(code) => code,
        Err(error) => {
            let error = error.as_opt_error();
            eprintln!("{}", error.diagnostic_line());
            error.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once(PROGRAM_NAME.to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    parse_and_dispatch(full_args)
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => dispatch_parsed(cli.command),
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(
    name = "optflow",
    version,
    about = "Write Abinit wavefunction jobs and LATM optical-response inputs"
)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Write a non-self-consistent wavefunction job from a JSON config
    Wfn(commands::ConfigArgs),
    /// Write the LATM response inputs from a JSON config
    Responses(commands::ConfigArgs),
    /// Print the k-point range of every task
    Split(commands::SplitArgs),
    /// Print the shell fragment that selects one task's k-points
    KptFragment(commands::FragmentArgs),
    /// Print the output file the solver actually wrote
    ResolveOutput(commands::JobArgs),
    /// Report whether the solver finished (exit 1 if not)
    Status(commands::JobArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Wfn(args) => commands::run_wfn_command(args),
        CliCommand::Responses(args) => commands::run_responses_command(args),
        CliCommand::Split(args) => commands::run_split_command(args),
        CliCommand::KptFragment(args) => commands::run_fragment_command(args),
        CliCommand::ResolveOutput(args) => commands::run_resolve_output_command(args),
        CliCommand::Status(args) => commands::run_status_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Core(#[from] OptError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    fn as_opt_error(&self) -> OptError {
        match self {
            Self::Usage(message) => {
                OptError::configuration("CONFIG.CLI_USAGE", message.trim_end().to_string())
            }
            Self::Core(error) => error.clone(),
            Self::Internal(error) => OptError::internal("RUN.CLI", format!("{error:#}")),
        }
    }
}

use super::CliError;
use super::helpers::{emit, emit_lines, write_job};
use optflow_core::common::naming::FileNaming;
use optflow_core::config::{JobConfig, ResponseConfig, load_config};
use optflow_core::modules::kpoints::{KpointFragment, kpoint_list_name, partition_all};
use optflow_core::modules::serialization::absolute_path;
use std::path::{Path, PathBuf};

#[derive(clap::Args)]
pub(super) struct ConfigArgs {
    /// JSON configuration file
    #[arg(long)]
    config: PathBuf,
}

#[derive(clap::Args)]
pub(super) struct SplitArgs {
    /// Number of k-points in the list
    #[arg(long)]
    total: usize,

    /// Number of tasks sharing the list
    #[arg(long)]
    tasks: usize,
}

#[derive(clap::Args)]
pub(super) struct FragmentArgs {
    /// Job prefix the k-point list is named after
    #[arg(long, default_value = "wfn")]
    prefix: String,

    /// Response k-point grid
    #[arg(long, required = true, num_args = 3, value_names = ["N1", "N2", "N3"])]
    grid: Vec<u32>,

    /// 1-based task index
    #[arg(long, default_value_t = 1)]
    task: usize,

    /// Number of tasks
    #[arg(long, default_value_t = 1)]
    ntask: usize,

    /// Directory holding the k-point list (default: current directory)
    #[arg(long)]
    source_dir: Option<PathBuf>,
}

#[derive(clap::Args)]
pub(super) struct JobArgs {
    /// Job directory
    #[arg(long)]
    dir: PathBuf,

    /// Job prefix
    #[arg(long)]
    prefix: String,
}

pub(super) fn run_wfn_command(args: ConfigArgs) -> Result<i32, CliError> {
    let config: JobConfig = load_config(&args.config)?;
    let job = config.build()?;
    let written = write_job(&job)?;
    emit_lines(written.iter().map(|path| path.display().to_string()))?;
    Ok(0)
}

pub(super) fn run_responses_command(args: ConfigArgs) -> Result<i32, CliError> {
    let config: ResponseConfig = load_config(&args.config)?;
    let flow = config.build()?;
    let written = write_job(&flow)?;
    emit_lines(written.iter().map(|path| path.display().to_string()))?;
    Ok(0)
}

pub(super) fn run_split_command(args: SplitArgs) -> Result<i32, CliError> {
    let partitions = partition_all(args.total, args.tasks)?;
    emit_lines(partitions.iter().map(|part| {
        if part.is_empty() {
            format!("task {}: none (0 k-points)", part.task_index())
        } else {
            format!(
                "task {}: {}-{} ({} k-points)",
                part.task_index(),
                part.start(),
                part.end(),
                part.len()
            )
        }
    }))?;
    Ok(0)
}

pub(super) fn run_fragment_command(args: FragmentArgs) -> Result<i32, CliError> {
    let grid: [u32; 3] = args
        .grid
        .as_slice()
        .try_into()
        .map_err(|_| CliError::Usage("--grid takes exactly three integers".to_string()))?;
    let source_dir = absolute_path(args.source_dir.as_deref().unwrap_or(Path::new(".")))?;
    let fragment = KpointFragment::new(
        kpoint_list_name(&args.prefix, grid),
        source_dir,
        args.task,
        args.ntask,
    )?;
    emit(&fragment.render()?)?;
    Ok(0)
}

pub(super) fn run_resolve_output_command(args: JobArgs) -> Result<i32, CliError> {
    let naming = FileNaming::new(absolute_path(&args.dir)?, args.prefix);
    emit_lines([naming.resolve_output().display().to_string()])?;
    Ok(0)
}

pub(super) fn run_status_command(args: JobArgs) -> Result<i32, CliError> {
    let naming = FileNaming::new(absolute_path(&args.dir)?, args.prefix);
    let output = naming.resolve_output();

    if naming.completed() {
        emit_lines([format!("completed: {}", output.display())])?;
        Ok(0)
    } else {
        emit_lines([format!("not completed: {}", output.display())])?;
        Ok(1)
    }
}

use super::CliError;
use anyhow::Context;
use optflow_core::domain::JobArtifact;
use optflow_core::modules::JobWriter;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Writes `writer`'s tree and returns the absolute paths it produced.
pub(super) fn write_job(writer: &dyn JobWriter) -> Result<Vec<PathBuf>, CliError> {
    let artifacts = writer.write()?;
    info!(
        kind = %writer.kind(),
        root = %writer.root().display(),
        count = artifacts.len(),
        "job written"
    );
    Ok(artifact_paths(writer, &artifacts))
}

fn artifact_paths(writer: &dyn JobWriter, artifacts: &[JobArtifact]) -> Vec<PathBuf> {
    artifacts
        .iter()
        .map(|artifact| writer.root().join(&artifact.relative_path))
        .collect()
}

pub(super) fn emit(text: &str) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .and_then(|()| stdout.flush())
        .context("failed to write to stdout")?;
    Ok(())
}

pub(super) fn emit_lines<I, S>(lines: I) -> Result<(), CliError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut text = String::new();
    for line in lines {
        text.push_str(line.as_ref());
        text.push('\n');
    }
    emit(&text)
}

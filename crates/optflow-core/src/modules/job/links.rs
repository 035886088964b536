use crate::domain::{OptError, OptResult};
use crate::modules::serialization::{create_dir, relative_path};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A symbolic link a job needs: `destination` (relative to the job
/// directory) pointing at `source` (absolute).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLink {
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl DataLink {
    /// Target stored in the link itself, relative to the link's directory.
    pub fn target_from(&self, job_dir: &Path) -> PathBuf {
        let link_path = job_dir.join(&self.destination);
        let link_dir = link_path.parent().unwrap_or(job_dir);
        relative_path(&self.source, link_dir)
    }
}

/// Creates `link` inside `job_dir`. An existing link with the same target
/// is left alone; a link pointing elsewhere is replaced. Regular files are
/// never overwritten.
pub(super) fn materialize(job_dir: &Path, link: &DataLink) -> OptResult<()> {
    let link_path = job_dir.join(&link.destination);
    let target = link.target_from(job_dir);

    if let Some(parent) = link_path.parent() {
        create_dir(parent, "IO.LINK_DIRECTORY")?;
    }

    match fs::symlink_metadata(&link_path) {
        Ok(metadata) if metadata.file_type().is_symlink() => {
            let current = fs::read_link(&link_path).map_err(|source| link_error(&link_path, source))?;
            if current == target {
                debug!(link = %link_path.display(), "data link already in place");
                return Ok(());
            }
            warn!(
                link = %link_path.display(),
                old = %current.display(),
                new = %target.display(),
                "replacing data link"
            );
            fs::remove_file(&link_path).map_err(|source| link_error(&link_path, source))?;
        }
        Ok(_) => {
            return Err(OptError::file_system(
                "IO.LINK_OCCUPIED",
                format!(
                    "cannot link '{}': a regular file already exists there",
                    link_path.display()
                ),
            ));
        }
        Err(_) => {}
    }

    symlink(&target, &link_path).map_err(|source| link_error(&link_path, source))?;
    debug!(link = %link_path.display(), target = %target.display(), "linked data file");
    Ok(())
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}

fn link_error(path: &Path, source: std::io::Error) -> OptError {
    OptError::file_system(
        "IO.DATA_LINK",
        format!("failed to link '{}': {}", path.display(), source),
    )
}

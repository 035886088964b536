use crate::domain::{OptError, OptResult};
use path_abs::PathAbs;
use std::fs;
use std::path::{Component, Path, PathBuf};

pub fn format_fixed_f64(value: f64, precision: usize) -> String {
    format!("{value:.precision$}", precision = precision)
}

pub fn normalize_text_artifact(content: &str) -> String {
    let mut normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    if !normalized.is_empty() && !normalized.ends_with('\n') {
        normalized.push('\n');
    }
    normalized
}

/// Writes (or overwrites) a text file with canonical line endings.
pub fn write_text_artifact(path: &Path, content: &str) -> OptResult<()> {
    fs::write(path, normalize_text_artifact(content)).map_err(|source| {
        OptError::file_system(
            "IO.WRITE_ARTIFACT",
            format!("failed to write '{}': {}", path.display(), source),
        )
    })
}

/// Like [`write_text_artifact`], then marks the file executable.
pub fn write_script_artifact(path: &Path, content: &str) -> OptResult<()> {
    write_text_artifact(path, content)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).map_err(|source| {
            OptError::file_system(
                "IO.WRITE_ARTIFACT",
                format!("failed to mark '{}' executable: {}", path.display(), source),
            )
        })?;
    }
    Ok(())
}

pub fn create_dir(path: &Path, placeholder: &'static str) -> OptResult<()> {
    fs::create_dir_all(path).map_err(|source| {
        OptError::file_system(
            placeholder,
            format!("failed to create directory '{}': {}", path.display(), source),
        )
    })
}

/// Absolute form of `path`, resolved against the process working directory.
/// Symlinks are kept and `..` is resolved lexically; the path need not exist.
pub fn absolute_path(path: &Path) -> OptResult<PathBuf> {
    let absolute = PathAbs::new(path).map_err(|source| {
        OptError::file_system(
            "IO.ABSOLUTE_PATH",
            format!("failed to make '{}' absolute: {}", path.display(), source),
        )
    })?;
    Ok(AsRef::<Path>::as_ref(&absolute).to_path_buf())
}

/// Path to `target` as seen from directory `base`. Both must be absolute,
/// as returned by [`absolute_path`].
pub fn relative_path(target: &Path, base: &Path) -> PathBuf {
    let target = normalize_components(target);
    let base = normalize_components(base);
    let target_parts: Vec<_> = target.components().collect();
    let base_parts: Vec<_> = base.components().collect();
    let common = target_parts
        .iter()
        .zip(&base_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base_parts.len() {
        relative.push("..");
    }
    for part in &target_parts[common..] {
        relative.push(part.as_os_str());
    }
    if relative.as_os_str().is_empty() {
        relative.push(".");
    }
    relative
}

/// Lexically removes `.` and resolves `..` without touching the disk.
fn normalize_components(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

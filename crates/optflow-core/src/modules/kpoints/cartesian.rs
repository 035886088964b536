use crate::common::constants::BOHR;
use crate::common::lattice::{Lattice, row_times};
use crate::domain::{OptError, OptResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// `symmetries/<prefix>.kcartesian_<nk>`, relative to the working
/// directory of the symmetry step.
pub fn cartesian_kpoint_file(prefix: &str, nk: usize) -> PathBuf {
    Path::new("symmetries").join(format!("{prefix}.kcartesian_{nk}"))
}

/// Reads Cartesian k-points and converts them to reduced coordinates of
/// `lattice`, rounded to six decimals. The file must hold exactly `nk`
/// points.
pub fn reduced_kpoints_from_file(
    path: &Path,
    nk: usize,
    lattice: &Lattice,
) -> OptResult<Vec<[f64; 3]>> {
    let content = fs::read_to_string(path).map_err(|source| {
        OptError::file_system(
            "IO.KPOINT_FILE",
            format!("failed to read '{}': {}", path.display(), source),
        )
    })?;
    let cartesian = parse_cartesian(&content, path)?;
    if cartesian.len() != nk {
        return Err(OptError::configuration(
            "CONFIG.KPOINT_COUNT",
            format!(
                "'{}' holds {} k-points, expected {}",
                path.display(),
                cartesian.len(),
                nk
            ),
        ));
    }
    debug!(path = %path.display(), nk, "converting cartesian k-points");
    to_reduced(&cartesian, lattice)
}

pub fn to_reduced(cartesian: &[[f64; 3]], lattice: &Lattice) -> OptResult<Vec<[f64; 3]>> {
    let transform = lattice
        .reciprocal_inverse()?
        .map(|row| row.map(|value| value / BOHR));
    Ok(cartesian
        .iter()
        .map(|k| row_times(*k, &transform).map(round6))
        .collect())
}

fn parse_cartesian(content: &str, path: &Path) -> OptResult<Vec<[f64; 3]>> {
    let values = content
        .split_whitespace()
        .map(|token| {
            token.parse::<f64>().map_err(|_| {
                OptError::configuration(
                    "CONFIG.KPOINT_FILE",
                    format!("'{}': '{token}' is not a number", path.display()),
                )
            })
        })
        .collect::<OptResult<Vec<f64>>>()?;
    if values.len() % 3 != 0 {
        return Err(OptError::configuration(
            "CONFIG.KPOINT_FILE",
            format!(
                "'{}': {} values do not form whole k-points",
                path.display(),
                values.len()
            ),
        ));
    }
    Ok(values
        .chunks_exact(3)
        .map(|chunk| [chunk[0], chunk[1], chunk[2]])
        .collect())
}

fn round6(value: f64) -> f64 {
    let rounded = (value * 1.0e6).round() / 1.0e6;
    if rounded == 0.0 { 0.0 } else { rounded }
}

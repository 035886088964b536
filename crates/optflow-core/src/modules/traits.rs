use crate::domain::{JobArtifact, JobKind, OptResult};
use std::path::Path;

/// Anything that materialises a directory of input files for an external
/// executable.
pub trait JobWriter {
    fn kind(&self) -> JobKind;

    /// Directory the artifacts are written under.
    fn root(&self) -> &Path;

    fn write(&self) -> OptResult<Vec<JobArtifact>>;
}

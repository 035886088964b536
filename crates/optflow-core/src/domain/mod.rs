pub mod deck;
pub mod errors;

pub use deck::{DeckValue, InputDeck};
pub use errors::{OptError, OptErrorCategory, OptResult};

use std::fmt::{Display, Formatter};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    Abinit,
    Wavefunction,
    Responses,
}

impl JobKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Abinit => "ABINIT",
            Self::Wavefunction => "WFN",
            Self::Responses => "RESPONSES",
        }
    }
}

impl Display for JobKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

/// A file produced by writing a job, relative to the job's root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobArtifact {
    pub relative_path: PathBuf,
}

impl JobArtifact {
    pub fn new(relative_path: impl Into<PathBuf>) -> Self {
        Self {
            relative_path: relative_path.into(),
        }
    }
}

/// Which data root a data file lives under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataRole {
    Input,
    Output,
    Temporary,
}

/// Names a solver data file, e.g. the density of dataset 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFileReference {
    pub role: DataRole,
    /// 0 means "no dataset".
    pub dataset: u32,
    pub tag: String,
}

impl DataFileReference {
    pub fn new(role: DataRole, dataset: u32, tag: impl Into<String>) -> Self {
        Self {
            role,
            dataset,
            tag: tag.into(),
        }
    }
}

/// Files produced by an earlier job that a later one reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    Density,
    Wavefunction,
}

impl ReferenceKind {
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Density => "DEN",
            Self::Wavefunction => "WFK",
        }
    }

    /// Where a later job expects this file: the undatasetted input root.
    pub fn input_reference(self) -> DataFileReference {
        DataFileReference::new(DataRole::Input, 0, self.tag())
    }
}

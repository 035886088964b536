//! Deterministic split of a k-point list across independent tasks.

mod cartesian;
mod fragment;
mod partition;

pub use cartesian::{cartesian_kpoint_file, reduced_kpoints_from_file, to_reduced};
pub use fragment::{KPT_INCLUDE_FILE, KpointFragment, kpoint_list_name};
pub use partition::{KpointPartition, partition_all};

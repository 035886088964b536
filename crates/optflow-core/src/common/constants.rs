//! Physical constants and fixed conventions shared by the job writers.

pub const PI2: f64 = 6.283_185_307_179_586_476_925_286_766_559_f64;
/// Bohr radius in Angstrom.
pub const BOHR: f64 = 0.529_177_249_f64;

/// Marker the solver prints at the end of a successful run.
pub const COMPLETION_TAG: &str = "Calculation completed";

/// Fixed values the downstream response executable expects.
pub const FIRST_RESPONSE_UNIT: usize = 501;
pub const DEFAULT_SCISSORS: f64 = 0.0;
pub const DEFAULT_RESPONSE_TOLERANCE: f64 = 0.03;
pub const DEFAULT_CELL_LENGTH_Z: f64 = 1.0;
pub const DEFAULT_ENERGY_MIN: f64 = 0.0;
pub const DEFAULT_ENERGY_MAX: f64 = 10.0;
pub const DEFAULT_ENERGY_STEPS: usize = 2001;

/// Defaults of the non-self-consistent wavefunction step.
pub const DEFAULT_TOLWFR: f64 = 1.0e-16;
pub const NSCF_ISCF: i64 = -3;
pub const DEFAULT_ISTWFK: &str = "*1";

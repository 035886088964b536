use crate::common::constants::{
    DEFAULT_CELL_LENGTH_Z, DEFAULT_ENERGY_MAX, DEFAULT_ENERGY_MIN, DEFAULT_ENERGY_STEPS,
    DEFAULT_RESPONSE_TOLERANCE, DEFAULT_SCISSORS,
};
use crate::domain::OptResult;
use crate::modules::response::{BandCounts, ResponseFlow, ResponseKind, ResponseSpec};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResponseConfig {
    /// Directory `LATM` is created in.
    #[serde(default = "default_root")]
    pub root: PathBuf,
    pub response: u32,
    pub components: Vec<String>,
    pub nval: usize,
    pub nval_total: usize,
    pub ncond: usize,
    pub nband: usize,
    pub nk_tetra: usize,
    pub ecut: f64,
    #[serde(default = "default_nspinor")]
    pub nspinor: u32,
    #[serde(default = "default_scissors")]
    pub scissors: f64,
    #[serde(default = "default_tolerance")]
    pub tol: f64,
    #[serde(default = "default_acellz")]
    pub acellz: f64,
    #[serde(default = "default_energy_min")]
    pub energy_min: f64,
    #[serde(default = "default_energy_max")]
    pub energy_max: f64,
    #[serde(default = "default_energy_steps")]
    pub energy_steps: usize,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_nspinor() -> u32 {
    1
}

fn default_scissors() -> f64 {
    DEFAULT_SCISSORS
}

fn default_tolerance() -> f64 {
    DEFAULT_RESPONSE_TOLERANCE
}

fn default_acellz() -> f64 {
    DEFAULT_CELL_LENGTH_Z
}

fn default_energy_min() -> f64 {
    DEFAULT_ENERGY_MIN
}

fn default_energy_max() -> f64 {
    DEFAULT_ENERGY_MAX
}

fn default_energy_steps() -> usize {
    DEFAULT_ENERGY_STEPS
}

impl ResponseConfig {
    pub fn spec(&self) -> OptResult<ResponseSpec> {
        let response = ResponseKind::try_from(self.response)?;
        let components = self
            .components
            .iter()
            .map(|component| component.parse())
            .collect::<OptResult<Vec<_>>>()?;
        let bands = BandCounts {
            valence: self.nval,
            valence_total: self.nval_total,
            conduction: self.ncond,
            total: self.nband,
        };

        let mut spec = ResponseSpec::new(
            response,
            components,
            bands,
            self.nk_tetra,
            self.ecut,
            self.nspinor,
        );
        spec.scissors = self.scissors;
        spec.tolerance = self.tol;
        spec.acellz = self.acellz;
        spec.energy_min = self.energy_min;
        spec.energy_max = self.energy_max;
        spec.energy_steps = self.energy_steps;
        Ok(spec)
    }

    pub fn build(&self) -> OptResult<ResponseFlow> {
        ResponseFlow::new(&self.root, self.spec()?)
    }
}

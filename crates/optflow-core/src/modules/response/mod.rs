//! Inputs of the LATM optical-response executable.

mod kind;
mod render;

pub use kind::{ResponseKind, TensorComponent};
pub use render::{component_table, namelist, staging_script};

use super::serialization::{absolute_path, create_dir, write_script_artifact, write_text_artifact};
use super::traits::JobWriter;
use crate::common::constants::{
    DEFAULT_CELL_LENGTH_Z, DEFAULT_ENERGY_MAX, DEFAULT_ENERGY_MIN, DEFAULT_ENERGY_STEPS,
    DEFAULT_RESPONSE_TOLERANCE, DEFAULT_SCISSORS,
};
use crate::common::naming::RUN_SCRIPT;
use crate::domain::{JobArtifact, JobKind, OptError, OptResult};
use std::path::{Path, PathBuf};
use tracing::info;

/// Directory, under the flow root, the response inputs are written to.
pub const LATM_DIR: &str = "LATM";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandCounts {
    /// Valence bands entering the response.
    pub valence: usize,
    /// Valence bands of the wavefunction run.
    pub valence_total: usize,
    /// Conduction bands entering the response.
    pub conduction: usize,
    /// All bands of the wavefunction run.
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSpec {
    pub response: ResponseKind,
    pub components: Vec<TensorComponent>,
    pub bands: BandCounts,
    /// k-points of the tetrahedron integration grid.
    pub nk_tetra: usize,
    /// Plane-wave cutoff of the wavefunction run, only used in the case id.
    pub ecut: f64,
    pub nspinor: u32,
    /// eV.
    pub scissors: f64,
    /// eV.
    pub tolerance: f64,
    /// Bohr; used by layer responses.
    pub acellz: f64,
    pub energy_min: f64,
    pub energy_max: f64,
    pub energy_steps: usize,
}

impl ResponseSpec {
    pub fn new(
        response: ResponseKind,
        components: Vec<TensorComponent>,
        bands: BandCounts,
        nk_tetra: usize,
        ecut: f64,
        nspinor: u32,
    ) -> Self {
        Self {
            response,
            components,
            bands,
            nk_tetra,
            ecut,
            nspinor,
            scissors: DEFAULT_SCISSORS,
            tolerance: DEFAULT_RESPONSE_TOLERANCE,
            acellz: DEFAULT_CELL_LENGTH_Z,
            energy_min: DEFAULT_ENERGY_MIN,
            energy_max: DEFAULT_ENERGY_MAX,
            energy_steps: DEFAULT_ENERGY_STEPS,
        }
    }

    /// `<nk>_<floor(ecut)>`, with `-spin` appended for spinor runs.
    pub fn case_id(&self) -> String {
        let mut case = format!("{}_{}", self.nk_tetra, self.ecut.floor() as i64);
        if self.nspinor > 1 {
            case.push_str("-spin");
        }
        case
    }

    pub fn validate(&self) -> OptResult<()> {
        if self.components.is_empty() {
            return Err(invalid("at least one tensor component is required"));
        }
        if self.nk_tetra == 0 {
            return Err(invalid("nk_tetra must be positive"));
        }
        if !(self.ecut.is_finite() && self.ecut > 0.0) {
            return Err(invalid(format!("cutoff must be positive, got {}", self.ecut)));
        }
        if !matches!(self.nspinor, 1 | 2) {
            return Err(invalid(format!("nspinor must be 1 or 2, got {}", self.nspinor)));
        }
        let bands = &self.bands;
        if bands.valence > bands.valence_total || bands.valence_total > bands.total {
            return Err(invalid(format!(
                "band counts must satisfy nval <= nval_total <= nband, got {} / {} / {}",
                bands.valence, bands.valence_total, bands.total
            )));
        }
        if self.energy_steps == 0 || self.energy_max <= self.energy_min {
            return Err(invalid(format!(
                "energy grid [{}, {}] with {} steps is empty",
                self.energy_min, self.energy_max, self.energy_steps
            )));
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> OptError {
    OptError::configuration("CONFIG.RESPONSE", message)
}

/// Writes the namelist, staging script and component table of one
/// response calculation into `<root>/LATM`.
#[derive(Debug, Clone)]
pub struct ResponseFlow {
    root: PathBuf,
    spec: ResponseSpec,
}

impl ResponseFlow {
    pub fn new(root: impl AsRef<Path>, spec: ResponseSpec) -> OptResult<Self> {
        spec.validate()?;
        Ok(Self {
            root: absolute_path(root.as_ref())?,
            spec,
        })
    }

    pub fn spec(&self) -> &ResponseSpec {
        &self.spec
    }

    pub fn latm_dir(&self) -> PathBuf {
        self.root.join(LATM_DIR)
    }

    pub fn namelist_name(&self) -> String {
        format!("tmp_{}", self.spec.case_id())
    }

    pub fn component_table_name(&self) -> String {
        format!("spectra.params_{}", self.spec.case_id())
    }
}

impl JobWriter for ResponseFlow {
    fn kind(&self) -> JobKind {
        JobKind::Responses
    }

    fn root(&self) -> &Path {
        &self.root
    }

    fn write(&self) -> OptResult<Vec<JobArtifact>> {
        let dir = self.latm_dir();
        info!(
            dir = %dir.display(),
            response = %self.spec.response,
            case = %self.spec.case_id(),
            "writing response inputs"
        );
        create_dir(&dir, "IO.RESPONSE_DIRECTORY")?;

        let namelist_name = self.namelist_name();
        let table_name = self.component_table_name();
        write_text_artifact(&dir.join(&namelist_name), &namelist(&self.spec))?;
        write_script_artifact(&dir.join(RUN_SCRIPT), &staging_script(&self.spec))?;
        write_text_artifact(&dir.join(&table_name), &component_table(&self.spec))?;

        let latm = Path::new(LATM_DIR);
        Ok(vec![
            JobArtifact::new(latm.join(namelist_name)),
            JobArtifact::new(latm.join(RUN_SCRIPT)),
            JobArtifact::new(latm.join(table_name)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::{
        BandCounts, ResponseFlow, ResponseKind, ResponseSpec, TensorComponent, component_table,
        namelist, staging_script,
    };
    use crate::domain::{JobKind, OptErrorCategory};
    use crate::modules::JobWriter;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn components(names: &[&str]) -> Vec<TensorComponent> {
        names
            .iter()
            .map(|name| name.parse().expect("component"))
            .collect()
    }

    fn chi1(nspinor: u32) -> ResponseSpec {
        ResponseSpec::new(
            ResponseKind::Chi1,
            components(&["xx", "yy"]),
            BandCounts {
                valence: 4,
                valence_total: 4,
                conduction: 10,
                total: 14,
            },
            385,
            10.9,
            nspinor,
        )
    }

    #[test]
    fn case_id_truncates_cutoff_and_marks_spinors() {
        assert_eq!(chi1(1).case_id(), "385_10");
        assert_eq!(chi1(2).case_id(), "385_10-spin");
    }

    #[test]
    fn namelist_matches_executable_layout() {
        let expected = "&INDATA\n\
            nVal = 4,\n\
            nMax = 14,\n\
            nVal_tetra = 4,\n\
            nMax_tetra = 10,\n\
            kMax = 385,\n\
            scissor = 0.000000,\n\
            tol = 0.030000,\n\
            nSpinor = 2,\n\
            acellz = 1.000000,\n\
            withSO = .True.,\n\
            energy_data_filename = \"eigen_385_10-spin\",\n\
            energys_data_filename = \"energys.d_385_10-spin\",\n\
            half_energys_data_filename = \"halfenergys.d_385_10-spin\",\n\
            pmn_data_filename = \"me_pmn_385_10-spin\",\n\
            rmn_data_filename = \"rmn.d_385_10-spin\",\n\
            der_data_filename = \"der.d_385_10-spin\",\n\
            tet_list_filename = \"tetrahedra_385_10-spin\",\n\
            integrand_filename = \"Integrand_385_10-spin\",\n\
            spectrum_filename = \"Spectrum_385_10-spin\",\n\
            energy_min = 0,\n\
            energy_max = 10,\n\
            energy_steps = 2001\n\
            /\n";
        assert_eq!(namelist(&chi1(2)), expected);
        assert!(namelist(&chi1(1)).contains("withSO = .False.,\n"));
    }

    #[test]
    fn staging_script_copies_symmetry_and_matrix_elements() {
        assert_eq!(
            staging_script(&chi1(1)),
            "cp ../symmetries/tetrahedra_385 .\n\
             cp ../symmetries/Symmetries.Cartesian_385 Symmetries.Cartesian\n\
             cp ../eigen_385_10 .\n\
             cp ../me_pmn_385_10 .\n"
        );
    }

    #[test]
    fn component_table_numbers_units_from_501() {
        assert_eq!(
            component_table(&chi1(1)),
            "2\n1 chi1.xx.dat_385_10 501 T\n1 1 \n1 chi1.yy.dat_385_10 502 T\n2 2 \n"
        );

        let mut shg = chi1(1);
        shg.response = ResponseKind::Shg1L;
        shg.components = components(&["xyz"]);
        assert_eq!(
            component_table(&shg),
            "1\n21 shg1L.xyz.dat_385_10 501 T\n1 2 3 \n"
        );
    }

    #[test]
    fn invalid_settings_fail_before_writing() {
        let temp = TempDir::new().expect("tempdir should be created");
        let mut empty = chi1(1);
        empty.components.clear();
        let error = ResponseFlow::new(temp.path(), empty).expect_err("no components");
        assert_eq!(error.category(), OptErrorCategory::ConfigurationError);

        let mut bands = chi1(1);
        bands.bands.valence = 8;
        assert_eq!(
            ResponseFlow::new(temp.path(), bands).expect_err("nval > nval_total").placeholder(),
            "CONFIG.RESPONSE"
        );
        assert!(!temp.path().join("LATM").exists());
    }

    #[test]
    fn write_creates_three_files_under_latm() {
        let temp = TempDir::new().expect("tempdir should be created");
        let flow = ResponseFlow::new(temp.path(), chi1(1)).expect("flow");

        let artifacts = flow.write().expect("write");
        let paths: Vec<PathBuf> = artifacts.into_iter().map(|a| a.relative_path).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("LATM/tmp_385_10"),
                PathBuf::from("LATM/run.sh"),
                PathBuf::from("LATM/spectra.params_385_10"),
            ]
        );
        for path in &paths {
            assert!(temp.path().join(path).is_file());
        }
        assert_eq!(flow.kind(), JobKind::Responses);

        let table = fs::read_to_string(temp.path().join("LATM/spectra.params_385_10"))
            .expect("component table");
        assert!(table.starts_with("2\n"));
        flow.write().expect("second write overwrites");
    }
}

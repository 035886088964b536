use crate::common::constants::{DEFAULT_ISTWFK, DEFAULT_TOLWFR, NSCF_ISCF};
use crate::common::lattice::Structure;
use crate::domain::{DeckValue, OptResult};
use crate::modules::wavefunction::{DEFAULT_PREFIX, WavefunctionJob, WavefunctionSettings};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A wavefunction job as described in a JSON file. Relative paths are
/// resolved against the working directory.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    pub directory: PathBuf,
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default)]
    pub ecut: Option<f64>,
    #[serde(default)]
    pub ecutwfc: Option<f64>,
    #[serde(default)]
    pub nband: Option<i64>,
    #[serde(default)]
    pub nbnd: Option<i64>,
    #[serde(default)]
    pub nbdbuf: i64,
    #[serde(default = "default_tolwfr")]
    pub tolwfr: f64,
    #[serde(default = "default_iscf")]
    pub iscf: i64,
    #[serde(default = "default_istwfk")]
    pub istwfk: String,
    #[serde(default = "default_nspinor")]
    pub nspinor: i64,
    pub kgrid_response: [u32; 3],
    #[serde(default = "default_task")]
    pub task: usize,
    #[serde(default = "default_task")]
    pub ntask: usize,
    #[serde(default)]
    pub kpoint_source_dir: Option<PathBuf>,
    pub density_file: PathBuf,
    #[serde(default)]
    pub restart_file: Option<PathBuf>,
    #[serde(default)]
    pub pseudo_dir: Option<PathBuf>,
    #[serde(default)]
    pub pseudos: Vec<String>,
    #[serde(default)]
    pub structure: Option<Structure>,
    /// Additional input variables; these win over derived ones and a
    /// `null` removes the variable from the deck.
    #[serde(default)]
    pub variables: BTreeMap<String, Option<DeckValue>>,
    #[serde(default)]
    pub module_lines: Vec<String>,
    #[serde(default)]
    pub extra_lines: Vec<String>,
    #[serde(default)]
    pub executable: Option<String>,
    #[serde(default)]
    pub mpirun: Option<String>,
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

fn default_tolwfr() -> f64 {
    DEFAULT_TOLWFR
}

fn default_iscf() -> i64 {
    NSCF_ISCF
}

fn default_istwfk() -> String {
    DEFAULT_ISTWFK.to_string()
}

fn default_nspinor() -> i64 {
    1
}

fn default_task() -> usize {
    1
}

impl JobConfig {
    pub fn settings(&self) -> WavefunctionSettings {
        let mut settings = WavefunctionSettings::new(
            &self.directory,
            self.kgrid_response,
            &self.density_file,
        );
        settings.prefix = self.prefix.clone();
        settings.ecut = self.ecut;
        settings.ecutwfc = self.ecutwfc;
        settings.nband = self.nband;
        settings.nbnd = self.nbnd;
        settings.nbdbuf = self.nbdbuf;
        settings.tolwfr = self.tolwfr;
        settings.iscf = self.iscf;
        settings.istwfk = self.istwfk.clone();
        settings.nspinor = self.nspinor;
        settings.task_index = self.task;
        settings.task_count = self.ntask;
        settings.kpoint_source_dir = self.kpoint_source_dir.clone();
        settings.restart_file = self.restart_file.clone();
        settings.module_lines = self.module_lines.clone();
        settings
    }

    pub fn build(&self) -> OptResult<WavefunctionJob> {
        let mut wfn = WavefunctionJob::new(self.settings())?;
        let job = wfn.job_mut();

        if let Some(structure) = &self.structure {
            job.set_structure(structure)?;
        }
        job.set_variables(
            self.variables
                .iter()
                .map(|(name, value)| (name.as_str(), value.clone())),
        );
        if let Some(pseudo_dir) = &self.pseudo_dir {
            job.set_pseudos(pseudo_dir, self.pseudos.iter().cloned());
        } else if !self.pseudos.is_empty() {
            job.set_pseudos(".", self.pseudos.iter().cloned());
        }
        if let Some(executable) = &self.executable {
            job.set_executable(executable.as_str());
        }
        if let Some(mpirun) = &self.mpirun {
            job.set_mpirun(mpirun.as_str());
        }
        job.append_run_block(self.extra_lines.iter().cloned());
        Ok(wfn)
    }
}

#[cfg(test)]
mod tests {
    use super::JobConfig;
    use crate::config::parse_config;
    use crate::domain::DeckValue;
    use std::path::PathBuf;

    const MINIMAL: &str = r#"{
        "directory": "/work/wfn",
        "kgrid_response": [6, 6, 6],
        "density_file": "/work/scf/out_data/odat_DEN",
        "ecutwfc": 18.0
    }"#;

    #[test]
    fn defaults_follow_the_wavefunction_step() {
        let config: JobConfig = parse_config(MINIMAL).expect("config");
        assert_eq!(config.prefix, "wfn");
        assert_eq!(config.iscf, -3);
        assert_eq!(config.istwfk, "*1");
        assert_eq!((config.task, config.ntask), (1, 1));

        let wfn = config.build().expect("job");
        assert_eq!(wfn.ecut(), 18.0);
        assert_eq!(wfn.fragment().list_name(), "wfn.klist_6x6x6");
        assert_eq!(wfn.job().dirname(), PathBuf::from("/work/wfn"));
    }

    #[test]
    fn extra_variables_and_run_lines_are_applied() {
        let config: JobConfig = parse_config(
            r#"{
                "directory": "/work/wfn",
                "prefix": "gaas",
                "kgrid_response": [4, 4, 4],
                "density_file": "/work/scf/out_data/odat_DEN",
                "ecut": 15,
                "nband": 30,
                "task": 2,
                "ntask": 4,
                "variables": {"diemac": 12.0, "ngfft": [24, 24, 24], "tolwfr": 1e-12},
                "module_lines": ["module load abinit/9"],
                "extra_lines": ["echo done"],
                "executable": "abinit-9",
                "mpirun": "mpirun -np 8"
            }"#,
        )
        .expect("config");

        let wfn = config.build().expect("job");
        let deck = wfn.job().deck();
        assert_eq!(deck.get("diemac"), Some(&DeckValue::Real(12.0)));
        assert_eq!(deck.get("ngfft"), Some(&DeckValue::Integers(vec![24, 24, 24])));
        assert_eq!(deck.get("tolwfr"), Some(&DeckValue::Real(1.0e-12)));
        assert_eq!(deck.get("ecut"), Some(&DeckValue::Real(15.0)));

        let script = wfn.job().runscript().render();
        let module_at = script.find("module load abinit/9").expect("module line");
        let task_at = script.find("task=2").expect("fragment");
        let extra_at = script.find("echo done").expect("extra line");
        let solver_at = script.find("$MPIRUN $ABINIT").expect("invocation");
        assert!(module_at < task_at && task_at < extra_at && extra_at < solver_at);
        assert!(script.contains("ABINIT=\"abinit-9\""));
        assert!(script.contains("MPIRUN=\"mpirun -np 8\""));
    }

    #[test]
    fn null_variables_clear_derived_ones() {
        let config: JobConfig = parse_config(
            r#"{
                "directory": "/work/wfn",
                "kgrid_response": [4, 4, 4],
                "density_file": "/work/scf/out_data/odat_DEN",
                "ecut": 15,
                "variables": {"nbdbuf": null, "istwfk": null, "diemac": 4.0}
            }"#,
        )
        .expect("null values should parse");
        assert_eq!(config.variables.get("nbdbuf"), Some(&None));

        let wfn = config.build().expect("job");
        let deck = wfn.job().deck();
        assert!(!deck.contains("nbdbuf"));
        assert!(!deck.contains("istwfk"));
        assert_eq!(deck.get("diemac"), Some(&DeckValue::Real(4.0)));
        assert!(!deck.render().contains("nbdbuf"));
    }

    #[test]
    fn structure_is_staged_when_present() {
        let config: JobConfig = parse_config(
            r#"{
                "directory": "/work/wfn",
                "kgrid_response": [4, 4, 4],
                "density_file": "/work/scf/out_data/odat_DEN",
                "ecut": 15,
                "structure": {
                    "lattice": [[0.0, 2.7, 2.7], [2.7, 0.0, 2.7], [2.7, 2.7, 0.0]],
                    "znucl": [14],
                    "typat": [1, 1],
                    "xred": [[0.0, 0.0, 0.0], [0.25, 0.25, 0.25]]
                }
            }"#,
        )
        .expect("config");

        let wfn = config.build().expect("job");
        assert_eq!(wfn.job().deck().get("natom"), Some(&DeckValue::Integer(2)));
    }

    #[test]
    fn missing_cutoff_surfaces_from_build() {
        let config: JobConfig = parse_config(
            r#"{"directory": "/work/wfn", "kgrid_response": [4, 4, 4],
                "density_file": "/work/scf/out_data/odat_DEN"}"#,
        )
        .expect("config");
        assert_eq!(
            config.build().expect_err("no cutoff").placeholder(),
            "CONFIG.MISSING_CUTOFF"
        );
    }
}

//! Non-self-consistent wavefunction job on an explicit, task-partitioned
//! k-point list.

use super::job::JobDirectory;
use super::kpoints::{KPT_INCLUDE_FILE, KpointFragment, kpoint_list_name};
use super::serialization::{absolute_path, relative_path};
use super::traits::JobWriter;
use crate::common::constants::{DEFAULT_ISTWFK, DEFAULT_TOLWFR, NSCF_ISCF};
use crate::domain::{DeckValue, JobArtifact, JobKind, OptError, OptResult, ReferenceKind};
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_PREFIX: &str = "wfn";

/// Everything a wavefunction job needs, checked once by
/// [`WavefunctionJob::new`].
#[derive(Debug, Clone, PartialEq)]
pub struct WavefunctionSettings {
    pub dirname: PathBuf,
    pub prefix: String,
    pub ecut: Option<f64>,
    /// Alias of `ecut`, used only when `ecut` is absent.
    pub ecutwfc: Option<f64>,
    pub nband: Option<i64>,
    /// Alias of `nband`.
    pub nbnd: Option<i64>,
    pub nbdbuf: i64,
    pub tolwfr: f64,
    pub iscf: i64,
    pub istwfk: String,
    pub nspinor: i64,
    pub kgrid_response: [u32; 3],
    pub task_index: usize,
    pub task_count: usize,
    /// Directory holding the k-point list; the working directory if unset.
    pub kpoint_source_dir: Option<PathBuf>,
    pub density_file: PathBuf,
    pub restart_file: Option<PathBuf>,
    /// Run-script lines placed ahead of the k-point selection, e.g.
    /// `module load abinit`.
    pub module_lines: Vec<String>,
}

impl WavefunctionSettings {
    pub fn new(
        dirname: impl Into<PathBuf>,
        kgrid_response: [u32; 3],
        density_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            dirname: dirname.into(),
            prefix: DEFAULT_PREFIX.to_string(),
            ecut: None,
            ecutwfc: None,
            nband: None,
            nbnd: None,
            nbdbuf: 0,
            tolwfr: DEFAULT_TOLWFR,
            iscf: NSCF_ISCF,
            istwfk: DEFAULT_ISTWFK.to_string(),
            nspinor: 1,
            kgrid_response,
            task_index: 1,
            task_count: 1,
            kpoint_source_dir: None,
            density_file: density_file.into(),
            restart_file: None,
            module_lines: Vec::new(),
        }
    }

    fn cutoff(&self) -> OptResult<f64> {
        let ecut = self.ecut.or(self.ecutwfc).ok_or_else(|| {
            OptError::configuration(
                "CONFIG.MISSING_CUTOFF",
                "cutoff required: set 'ecut' or 'ecutwfc'",
            )
        })?;
        if !(ecut.is_finite() && ecut > 0.0) {
            return Err(OptError::configuration(
                "CONFIG.CUTOFF",
                format!("cutoff must be positive, got {ecut}"),
            ));
        }
        Ok(ecut)
    }

    fn band_count(&self) -> OptResult<Option<i64>> {
        match self.nband.or(self.nbnd) {
            Some(nband) if nband <= 0 => Err(OptError::configuration(
                "CONFIG.BAND_COUNT",
                format!("band count must be positive, got {nband}"),
            )),
            other => Ok(other),
        }
    }

    fn check(&self) -> OptResult<()> {
        if self.kgrid_response.contains(&0) {
            return Err(OptError::configuration(
                "CONFIG.KPOINT_GRID",
                format!("k-point grid {:?} has an empty axis", self.kgrid_response),
            ));
        }
        if !matches!(self.nspinor, 1 | 2) {
            return Err(OptError::configuration(
                "CONFIG.NSPINOR",
                format!("nspinor must be 1 or 2, got {}", self.nspinor),
            ));
        }
        if self.nbdbuf < 0 {
            return Err(OptError::configuration(
                "CONFIG.BAND_BUFFER",
                format!("nbdbuf must not be negative, got {}", self.nbdbuf),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct WavefunctionJob {
    job: JobDirectory,
    fragment: KpointFragment,
    ecut: f64,
    nspinor: i64,
    density_file: Option<PathBuf>,
    restart_file: Option<PathBuf>,
}

impl WavefunctionJob {
    pub fn new(settings: WavefunctionSettings) -> OptResult<Self> {
        settings.check()?;
        let ecut = settings.cutoff()?;
        let nband = settings.band_count()?;

        let source_dir = absolute_path(
            settings
                .kpoint_source_dir
                .as_deref()
                .unwrap_or_else(|| Path::new(".")),
        )?;
        let fragment = KpointFragment::new(
            kpoint_list_name(&settings.prefix, settings.kgrid_response),
            source_dir,
            settings.task_index,
            settings.task_count,
        )?;

        let mut job = JobDirectory::new(&settings.dirname, settings.prefix.as_str())?;
        job.set_variables([
            ("ecut", Some(DeckValue::from(ecut))),
            ("nband", nband.map(DeckValue::from)),
            ("nbdbuf", Some(DeckValue::from(settings.nbdbuf))),
            ("irdden", Some(DeckValue::from(1_i64))),
            ("tolwfr", Some(DeckValue::from(settings.tolwfr))),
            ("iscf", Some(DeckValue::from(settings.iscf))),
            ("istwfk", Some(DeckValue::token(settings.istwfk.as_str()))),
            ("nspinor", Some(DeckValue::from(settings.nspinor))),
            ("include", Some(DeckValue::quoted(KPT_INCLUDE_FILE))),
        ]);
        // The included list carries its own kptopt/nkpt.
        job.set_variables(
            ["kptopt", "ngkpt", "nshiftk", "shiftk", "kpt", "nkpt", "wtk"]
                .map(|name| (name, None::<DeckValue>)),
        );
        job.require_variable("include");
        job.append_run_block(settings.module_lines.iter().cloned());
        job.append_run_block(fragment.render()?.lines().map(str::to_string));

        let mut wfn = Self {
            job,
            fragment,
            ecut,
            nspinor: settings.nspinor,
            density_file: None,
            restart_file: None,
        };
        wfn.set_reference(ReferenceKind::Density, &settings.density_file)?;
        if let Some(restart) = &settings.restart_file {
            wfn.set_reference(ReferenceKind::Wavefunction, restart)?;
        }
        Ok(wfn)
    }

    /// Points the job at a product of an earlier job: the path is stored
    /// and linked into `input_data` under the matching `idat_` name.
    pub fn set_reference(&mut self, kind: ReferenceKind, path: &Path) -> OptResult<()> {
        let source = absolute_path(path)?;
        let idat = self.job.naming().data_path(&kind.input_reference());
        let destination = relative_path(&idat, self.job.dirname());
        self.job.link_data(&source, destination)?;
        match kind {
            ReferenceKind::Density => self.density_file = Some(source),
            ReferenceKind::Wavefunction => {
                self.job
                    .set_variable("irdwfk", Some(DeckValue::from(1_i64)));
                self.restart_file = Some(source);
            }
        }
        Ok(())
    }

    pub fn job(&self) -> &JobDirectory {
        &self.job
    }

    /// Extra variables, run lines and pseudopotentials go through here.
    pub fn job_mut(&mut self) -> &mut JobDirectory {
        &mut self.job
    }

    pub fn fragment(&self) -> &KpointFragment {
        &self.fragment
    }

    pub fn ecut(&self) -> f64 {
        self.ecut
    }

    pub fn nspinor(&self) -> i64 {
        self.nspinor
    }

    pub fn density_file(&self) -> Option<&Path> {
        self.density_file.as_deref()
    }

    pub fn restart_file(&self) -> Option<&Path> {
        self.restart_file.as_deref()
    }

    pub fn wavefunction_fname(&self) -> PathBuf {
        self.job.odat("WFK")
    }

    pub fn density_fname(&self) -> PathBuf {
        self.job.odat("DEN")
    }

    pub fn vxc_fname(&self) -> PathBuf {
        self.job.odat("VXC")
    }
}

impl JobWriter for WavefunctionJob {
    fn kind(&self) -> JobKind {
        JobKind::Wavefunction
    }

    fn root(&self) -> &Path {
        self.job.dirname()
    }

    fn write(&self) -> OptResult<Vec<JobArtifact>> {
        info!(
            task = self.fragment.task_index(),
            ntask = self.fragment.task_count(),
            klist = self.fragment.list_name(),
            "writing wavefunction job"
        );
        self.job.write()
    }
}

#[cfg(test)]
mod tests {
    use super::{WavefunctionJob, WavefunctionSettings};
    use crate::domain::{DeckValue, JobKind, OptErrorCategory, ReferenceKind};
    use crate::modules::JobWriter;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn settings(root: &Path) -> WavefunctionSettings {
        let mut settings = WavefunctionSettings::new(
            root.join("wfn"),
            [4, 4, 4],
            root.join("scf/out_data/odat_DEN"),
        );
        settings.ecut = Some(15.0);
        settings.nbnd = Some(24);
        settings.kpoint_source_dir = Some(root.to_path_buf());
        settings
    }

    #[test]
    fn defaults_are_staged_in_the_deck() {
        let job = WavefunctionJob::new(settings(Path::new("/work"))).expect("job");
        let deck = job.job().deck();

        assert_eq!(deck.get("ecut"), Some(&DeckValue::Real(15.0)));
        assert_eq!(deck.get("nband"), Some(&DeckValue::Integer(24)));
        assert_eq!(deck.get("irdden"), Some(&DeckValue::Integer(1)));
        assert_eq!(deck.get("iscf"), Some(&DeckValue::Integer(-3)));
        assert_eq!(deck.get("tolwfr"), Some(&DeckValue::Real(1.0e-16)));
        assert_eq!(deck.get("istwfk"), Some(&DeckValue::token("*1")));
        assert_eq!(deck.get("nspinor"), Some(&DeckValue::Integer(1)));
        assert_eq!(deck.get("nbdbuf"), Some(&DeckValue::Integer(0)));
        assert_eq!(deck.get("include"), Some(&DeckValue::quoted("kpt.in")));
        assert!(!deck.contains("irdwfk"));
        assert!(!deck.contains("ngkpt") && !deck.contains("kptopt"));
        assert_eq!(job.kind(), JobKind::Wavefunction);
        assert_eq!(job.job().prefix(), "wfn");
    }

    #[test]
    fn ecutwfc_is_used_only_without_ecut() {
        let mut with_alias = settings(Path::new("/work"));
        with_alias.ecut = None;
        with_alias.ecutwfc = Some(12.5);
        assert_eq!(WavefunctionJob::new(with_alias.clone()).expect("job").ecut(), 12.5);

        with_alias.ecut = Some(20.0);
        assert_eq!(WavefunctionJob::new(with_alias).expect("job").ecut(), 20.0);
    }

    #[test]
    fn missing_cutoff_is_a_configuration_error() {
        let mut no_cutoff = settings(Path::new("/work"));
        no_cutoff.ecut = None;

        let error = WavefunctionJob::new(no_cutoff).expect_err("cutoff required");
        assert_eq!(error.category(), OptErrorCategory::ConfigurationError);
        assert!(error.message().contains("cutoff required"));
    }

    #[test]
    fn invalid_task_split_fails_at_construction() {
        let mut split = settings(Path::new("/work"));
        split.task_index = 5;
        split.task_count = 4;
        assert_eq!(
            WavefunctionJob::new(split).expect_err("task outside split").placeholder(),
            "CONFIG.TASK_INDEX"
        );
    }

    #[test]
    fn restart_reference_enables_irdwfk_and_links_wfk() {
        let mut with_restart = settings(Path::new("/work"));
        with_restart.restart_file = Some(PathBuf::from("/work/prev/out_data/odat_WFK"));
        let job = WavefunctionJob::new(with_restart).expect("job");

        assert_eq!(job.job().deck().get("irdwfk"), Some(&DeckValue::Integer(1)));
        let destinations: Vec<_> = job.job().links().iter().map(|l| l.destination.clone()).collect();
        assert_eq!(
            destinations,
            vec![
                PathBuf::from("input_data/idat_DEN"),
                PathBuf::from("input_data/idat_WFK")
            ]
        );
        assert_eq!(job.restart_file(), Some(Path::new("/work/prev/out_data/odat_WFK")));
    }

    #[test]
    fn set_reference_replaces_the_density_link() {
        let mut job = WavefunctionJob::new(settings(Path::new("/work"))).expect("job");
        job.set_reference(ReferenceKind::Density, Path::new("/other/odat_DEN"))
            .expect("reference");

        assert_eq!(job.job().links().len(), 1);
        assert_eq!(job.density_file(), Some(Path::new("/other/odat_DEN")));
    }

    #[test]
    fn clearing_the_kpoint_include_fails_the_write() {
        let temp = TempDir::new().expect("tempdir should be created");
        let mut job = WavefunctionJob::new(settings(temp.path())).expect("job");
        job.job_mut().set_variable("include", None);

        let error = job.write().expect_err("include is required");
        assert_eq!(error.placeholder(), "CONFIG.MISSING_VARIABLE");
        assert!(error.message().contains("'include'"));
        assert!(!temp.path().join("wfn").exists());
    }

    #[test]
    fn output_accessors_point_into_out_data() {
        let job = WavefunctionJob::new(settings(Path::new("/work"))).expect("job");
        assert_eq!(job.wavefunction_fname(), PathBuf::from("/work/wfn/out_data/odat_WFK"));
        assert_eq!(job.density_fname(), PathBuf::from("/work/wfn/out_data/odat_DEN"));
        assert_eq!(job.vxc_fname(), PathBuf::from("/work/wfn/out_data/odat_VXC"));
    }

    #[test]
    fn written_run_script_selects_kpoints_before_the_solver() {
        let temp = TempDir::new().expect("tempdir should be created");
        let mut split = settings(temp.path());
        split.task_index = 2;
        split.task_count = 3;
        let job = WavefunctionJob::new(split).expect("job");
        job.write().expect("write");

        let script = fs::read_to_string(temp.path().join("wfn/run.sh")).expect("run.sh");
        let fragment_at = script.find("task=2\n").expect("fragment present");
        let solver_at = script.find("$MPIRUN $ABINIT < wfn.files &> wfn.log").expect("invocation");
        assert!(fragment_at < solver_at);
        assert!(script.contains(&format!(
            "ln -nfs \"{}\"",
            temp.path().join("wfn.klist_4x4x4").display()
        )));

        let deck = fs::read_to_string(temp.path().join("wfn/wfn.in")).expect("deck");
        assert!(deck.contains("include  \"kpt.in\"\n"));
        assert!(
            fs::symlink_metadata(temp.path().join("wfn/input_data/idat_DEN"))
                .expect("density link")
                .file_type()
                .is_symlink()
        );
    }
}

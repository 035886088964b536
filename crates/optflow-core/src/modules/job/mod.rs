//! Abinit job directory: input deck, files list, run script and data links.

mod links;

pub use links::DataLink;

use super::runscript::RunScript;
use super::serialization::{
    absolute_path, create_dir, relative_path, write_script_artifact, write_text_artifact,
};
use super::traits::JobWriter;
use crate::common::lattice::Structure;
use crate::common::naming::{FileNaming, RUN_SCRIPT};
use crate::domain::{DeckValue, InputDeck, JobArtifact, JobKind, OptError, OptResult};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_EXECUTABLE: &str = "abinit";

#[derive(Debug, Clone)]
pub struct JobDirectory {
    naming: FileNaming,
    deck: InputDeck,
    runscript: RunScript,
    links: Vec<DataLink>,
    required: BTreeSet<String>,
    pseudo_dir: PathBuf,
    pseudos: Vec<String>,
}

impl JobDirectory {
    /// A job rooted at `dirname`, resolved against the working directory
    /// when relative. Nothing is created until [`JobDirectory::write`].
    pub fn new(dirname: impl AsRef<Path>, prefix: impl Into<String>) -> OptResult<Self> {
        let prefix = prefix.into();
        if prefix.is_empty() || prefix.contains(['/', '\\']) {
            return Err(OptError::configuration(
                "CONFIG.JOB_PREFIX",
                format!("invalid job prefix '{prefix}'"),
            ));
        }
        let naming = FileNaming::new(absolute_path(dirname.as_ref())?, prefix);

        let mut runscript = RunScript::default();
        runscript.set_variable("MPIRUN", "");
        runscript.set_variable("ABINIT", DEFAULT_EXECUTABLE);
        runscript.set_invocation(format!(
            "$MPIRUN $ABINIT < {} &> {}",
            naming.files_basename(),
            naming.log_basename()
        ));

        Ok(Self {
            naming,
            deck: InputDeck::default(),
            runscript,
            links: Vec::new(),
            required: BTreeSet::from(["ecut".to_string()]),
            pseudo_dir: PathBuf::new(),
            pseudos: Vec::new(),
        })
    }

    pub fn naming(&self) -> &FileNaming {
        &self.naming
    }

    pub fn dirname(&self) -> &Path {
        self.naming.dirname()
    }

    pub fn prefix(&self) -> &str {
        self.naming.prefix()
    }

    pub fn deck(&self) -> &InputDeck {
        &self.deck
    }

    pub fn runscript(&self) -> &RunScript {
        &self.runscript
    }

    pub fn links(&self) -> &[DataLink] {
        &self.links
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: Option<DeckValue>) {
        self.deck.set_variable(name, value);
    }

    pub fn set_variables<I, K>(&mut self, variables: I)
    where
        I: IntoIterator<Item = (K, Option<DeckValue>)>,
        K: Into<String>,
    {
        self.deck.set_variables(variables);
    }

    /// Makes [`JobDirectory::write`] fail unless `name` is staged.
    pub fn require_variable(&mut self, name: impl Into<String>) {
        self.required.insert(name.into());
    }

    pub fn append_run_line(&mut self, line: impl Into<String>) {
        self.runscript.append(line);
    }

    pub fn append_run_block<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.runscript.append_block(lines);
    }

    pub fn set_executable(&mut self, executable: impl Into<String>) {
        self.runscript.set_variable("ABINIT", executable);
    }

    pub fn set_mpirun(&mut self, launcher: impl Into<String>) {
        self.runscript.set_variable("MPIRUN", launcher);
    }

    /// Pseudopotentials listed in the files list, looked up under
    /// `pseudo_dir`. A relative `pseudo_dir` is taken relative to the job
    /// directory.
    pub fn set_pseudos<I, S>(&mut self, pseudo_dir: impl Into<PathBuf>, pseudos: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pseudo_dir = pseudo_dir.into();
        self.pseudos = pseudos.into_iter().map(Into::into).collect();
    }

    /// Queues a link from `source` to `destination` (relative to the job
    /// directory). Linking the same pair twice is a no-op; relinking a
    /// destination replaces its source.
    pub fn link_data(
        &mut self,
        source: impl AsRef<Path>,
        destination: impl Into<PathBuf>,
    ) -> OptResult<()> {
        let destination = destination.into();
        if destination.is_absolute() {
            return Err(OptError::configuration(
                "CONFIG.LINK_DESTINATION",
                format!(
                    "link destination '{}' must be relative to the job directory",
                    destination.display()
                ),
            ));
        }
        let link = DataLink {
            source: absolute_path(source.as_ref())?,
            destination,
        };

        match self
            .links
            .iter_mut()
            .find(|existing| existing.destination == link.destination)
        {
            Some(existing) if *existing == link => {}
            Some(existing) => {
                debug!(
                    destination = %link.destination.display(),
                    "data link source replaced before write"
                );
                *existing = link;
            }
            None => self.links.push(link),
        }
        Ok(())
    }

    /// Monkhorst-Pack grid; clears any explicit k-point list.
    pub fn set_ngkpt(&mut self, ngkpt: [i64; 3], shifts: &[[f64; 3]], kptopt: i64) {
        let shifts = if shifts.is_empty() {
            vec![[0.0; 3]]
        } else {
            shifts.to_vec()
        };
        self.deck.set_variables([
            ("kptopt", Some(DeckValue::from(kptopt))),
            ("ngkpt", Some(DeckValue::from(ngkpt.to_vec()))),
            ("nshiftk", Some(DeckValue::from(shifts.len()))),
            ("shiftk", Some(DeckValue::from(shifts))),
            ("kpt", None),
            ("wtk", None),
            ("nkpt", None),
        ]);
    }

    /// Explicit k-point list with weights normalised to one; clears any
    /// Monkhorst-Pack grid.
    pub fn set_kpoints(&mut self, kpoints: &[[f64; 3]], weights: &[f64]) -> OptResult<()> {
        if kpoints.is_empty() || kpoints.len() != weights.len() {
            return Err(OptError::configuration(
                "CONFIG.KPOINT_LIST",
                format!(
                    "expected one weight per k-point, got {} k-points and {} weights",
                    kpoints.len(),
                    weights.len()
                ),
            ));
        }
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Err(OptError::configuration(
                "CONFIG.KPOINT_LIST",
                "k-point weights must sum to a positive value",
            ));
        }

        self.deck.set_variables([
            ("kptopt", Some(DeckValue::from(0_i64))),
            ("kpt", Some(DeckValue::from(kpoints.to_vec()))),
            ("nkpt", Some(DeckValue::from(kpoints.len()))),
            ("ngkpt", None),
            ("nshiftk", None),
            ("shiftk", None),
        ]);
        let normalized = weights.iter().map(|weight| weight / total).collect();
        self.deck
            .set_variable("wtk", Some(DeckValue::fixed_reals(normalized, 16)));
        Ok(())
    }

    pub fn set_structure(&mut self, structure: &Structure) -> OptResult<()> {
        self.deck.set_variables(structure.input_variables()?);
        Ok(())
    }

    /// Output-side data file of this job, e.g. `odat_WFK`.
    pub fn odat(&self, tag: &str) -> PathBuf {
        self.naming.odat(tag, 0)
    }

    /// Solver control file: input deck, output name, the three data roots,
    /// then one pseudopotential per line.
    pub fn files_content(&self) -> String {
        let mut lines = vec![
            relative_path(&self.naming.input_path(), self.dirname())
                .display()
                .to_string(),
            self.naming.output_basename(),
        ];
        lines.extend(
            self.naming
                .relative_data_roots()
                .iter()
                .map(|root| root.display().to_string()),
        );
        let pseudo_dir = self.pseudo_dir_from_job();
        lines.extend(
            self.pseudos
                .iter()
                .map(|pseudo| pseudo_dir.join(pseudo).display().to_string()),
        );

        let mut content = lines.join("\n");
        content.push('\n');
        content
    }

    /// Configuration checks that must pass before anything is written.
    pub fn validate(&self) -> OptResult<()> {
        if let Some(missing) = self
            .required
            .iter()
            .find(|name| !self.deck.contains(name.as_str()))
        {
            return Err(OptError::missing_variable(missing));
        }
        Ok(())
    }

    /// Whether the solver reported completion in its (resolved) output file.
    pub fn completed(&self) -> bool {
        self.naming.completed()
    }

    fn pseudo_dir_from_job(&self) -> PathBuf {
        if self.pseudo_dir.is_absolute() {
            relative_path(&self.pseudo_dir, self.dirname())
        } else {
            self.pseudo_dir.clone()
        }
    }

    fn check_pseudos(&self) -> OptResult<()> {
        let base = self.dirname().join(self.pseudo_dir_from_job());
        for pseudo in &self.pseudos {
            let path = absolute_path(&base.join(pseudo))?;
            if !path.is_file() {
                return Err(OptError::file_system(
                    "IO.MISSING_PSEUDO",
                    format!("pseudopotential '{}' not found", path.display()),
                ));
            }
        }
        Ok(())
    }

    fn artifacts(&self) -> Vec<JobArtifact> {
        let mut artifacts = vec![
            JobArtifact::new(RUN_SCRIPT),
            JobArtifact::new(self.naming.files_basename()),
            JobArtifact::new(self.naming.input_basename()),
        ];
        artifacts.extend(
            self.links
                .iter()
                .map(|link| JobArtifact::new(&link.destination)),
        );
        artifacts
    }
}

impl JobWriter for JobDirectory {
    fn kind(&self) -> JobKind {
        JobKind::Abinit
    }

    fn root(&self) -> &Path {
        self.dirname()
    }

    /// Creates the directory tree, then the run script, files list and
    /// input deck, then the data links. Safe to call again: files are
    /// overwritten and existing links are kept.
    fn write(&self) -> OptResult<Vec<JobArtifact>> {
        self.validate()?;
        self.check_pseudos()?;

        let dirname = self.dirname();
        info!(job = %dirname.display(), prefix = self.prefix(), "writing job directory");
        create_dir(dirname, "IO.JOB_DIRECTORY")?;
        for dir in self.naming.data_dirs() {
            create_dir(&dir, "IO.JOB_DIRECTORY")?;
        }

        write_script_artifact(&self.naming.run_script_path(), &self.runscript.render())?;
        write_text_artifact(
            &dirname.join(self.naming.files_basename()),
            &self.files_content(),
        )?;
        write_text_artifact(&self.naming.input_path(), &self.deck.render())?;

        for link in &self.links {
            links::materialize(dirname, link)?;
        }

        Ok(self.artifacts())
    }
}

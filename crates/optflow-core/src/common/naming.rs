//! Canonical file names of a solver job directory.
//!
//! Everything here is derived from the job directory and its prefix; no
//! function in this module writes to disk.

use super::constants::COMPLETION_TAG;
use crate::domain::{DataFileReference, DataRole};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const INPUT_DATA_DIR: &str = "input_data";
pub const OUT_DATA_DIR: &str = "out_data";
pub const TMP_DATA_DIR: &str = "tmp_data";
pub const RUN_SCRIPT: &str = "run.sh";

/// Suffix letters the solver appends when an output name is already taken,
/// newest first.
const OUTPUT_SUFFIXES: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNaming {
    dirname: PathBuf,
    prefix: String,
}

impl FileNaming {
    pub fn new(dirname: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dirname: dirname.into(),
            prefix: prefix.into(),
        }
    }

    pub fn dirname(&self) -> &Path {
        &self.dirname
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn input_basename(&self) -> String {
        format!("{}.in", self.prefix)
    }

    pub fn output_basename(&self) -> String {
        format!("{}.out", self.prefix)
    }

    pub fn log_basename(&self) -> String {
        format!("{}.log", self.prefix)
    }

    pub fn files_basename(&self) -> String {
        format!("{}.files", self.prefix)
    }

    pub fn input_path(&self) -> PathBuf {
        self.dirname.join(self.input_basename())
    }

    pub fn run_script_path(&self) -> PathBuf {
        self.dirname.join(RUN_SCRIPT)
    }

    pub fn input_data_dir(&self) -> PathBuf {
        self.dirname.join(INPUT_DATA_DIR)
    }

    pub fn out_data_dir(&self) -> PathBuf {
        self.dirname.join(OUT_DATA_DIR)
    }

    pub fn tmp_data_dir(&self) -> PathBuf {
        self.dirname.join(TMP_DATA_DIR)
    }

    pub fn data_dirs(&self) -> [PathBuf; 3] {
        [self.input_data_dir(), self.out_data_dir(), self.tmp_data_dir()]
    }

    pub fn idat_root(&self) -> PathBuf {
        self.input_data_dir().join("idat")
    }

    pub fn odat_root(&self) -> PathBuf {
        self.out_data_dir().join("odat")
    }

    pub fn tmp_root(&self) -> PathBuf {
        self.tmp_data_dir().join("tmp")
    }

    pub fn root_for(&self, role: DataRole) -> PathBuf {
        match role {
            DataRole::Input => self.idat_root(),
            DataRole::Output => self.odat_root(),
            DataRole::Temporary => self.tmp_root(),
        }
    }

    /// Data roots relative to the job directory, in files-list order.
    pub fn relative_data_roots(&self) -> [PathBuf; 3] {
        [
            Path::new(INPUT_DATA_DIR).join("idat"),
            Path::new(OUT_DATA_DIR).join("odat"),
            Path::new(TMP_DATA_DIR).join("tmp"),
        ]
    }

    pub fn data_path(&self, reference: &DataFileReference) -> PathBuf {
        data_file(
            &self.root_for(reference.role),
            reference.role,
            reference.dataset,
            &reference.tag,
        )
    }

    /// Output-side data file, e.g. `out_data/odat_WFK`.
    pub fn odat(&self, tag: &str, dataset: u32) -> PathBuf {
        data_file(&self.odat_root(), DataRole::Output, dataset, tag)
    }

    /// The output file the solver actually wrote.
    ///
    /// Looks for `<prefix>.outZ` down to `<prefix>.outA` before falling back
    /// to the unsuffixed name, which is returned even when it does not exist.
    pub fn resolve_output(&self) -> PathBuf {
        resolve_output(&self.dirname.join(self.output_basename()))
    }

    /// Whether the resolved output carries the solver's completion tag.
    pub fn completed(&self) -> bool {
        fs::read_to_string(self.resolve_output())
            .map(|content| content.contains(COMPLETION_TAG))
            .unwrap_or(false)
    }
}

/// `<root>[_DS<n>]_<TAG>`.
///
/// Input-side tags are uppercased, output- and temporary-side tags are kept
/// as given. The asymmetry matches what existing job trees on disk use.
pub fn data_file(root: &Path, role: DataRole, dataset: u32, tag: &str) -> PathBuf {
    let mut name = root.as_os_str().to_os_string();
    if dataset > 0 {
        name.push(format!("_DS{dataset}"));
    }
    let tag = tag.trim_start_matches('_');
    name.push("_");
    match role {
        DataRole::Input => name.push(tag.to_uppercase()),
        DataRole::Output | DataRole::Temporary => name.push(tag),
    }
    PathBuf::from(name)
}

pub fn resolve_output(base: &Path) -> PathBuf {
    for suffix in OUTPUT_SUFFIXES.chars().rev() {
        let mut candidate = base.as_os_str().to_os_string();
        candidate.push(suffix.to_string());
        let candidate = PathBuf::from(candidate);
        if candidate.exists() {
            debug!(output = %candidate.display(), "resolved suffixed output");
            return candidate;
        }
    }
    base.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::{FileNaming, data_file, resolve_output};
    use crate::domain::{DataFileReference, DataRole};
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    #[test]
    fn basenames_follow_prefix() {
        let naming = FileNaming::new("jobs/wfn", "wfn");

        assert_eq!(naming.input_basename(), "wfn.in");
        assert_eq!(naming.output_basename(), "wfn.out");
        assert_eq!(naming.log_basename(), "wfn.log");
        assert_eq!(naming.files_basename(), "wfn.files");
        assert_eq!(naming.idat_root(), PathBuf::from("jobs/wfn/input_data/idat"));
        assert_eq!(naming.odat_root(), PathBuf::from("jobs/wfn/out_data/odat"));
        assert_eq!(naming.tmp_root(), PathBuf::from("jobs/wfn/tmp_data/tmp"));
    }

    #[test]
    fn input_tags_are_uppercased_with_dataset_segment() {
        let path = data_file(Path::new("r/idat"), DataRole::Input, 2, "den");
        assert_eq!(path, PathBuf::from("r/idat_DS2_DEN"));
    }

    #[test]
    fn output_tags_keep_case_and_skip_zero_dataset() {
        let path = data_file(Path::new("r/odat"), DataRole::Output, 0, "den");
        assert_eq!(path, PathBuf::from("r/odat_den"));

        let path = data_file(Path::new("r/odat"), DataRole::Output, 3, "_WFK");
        assert_eq!(path, PathBuf::from("r/odat_DS3_WFK"));
    }

    #[test]
    fn data_path_uses_the_root_of_the_reference_role() {
        let naming = FileNaming::new("job", "abinit");
        let reference = DataFileReference::new(DataRole::Temporary, 1, "wfk");

        assert_eq!(
            naming.data_path(&reference),
            PathBuf::from("job/tmp_data/tmp_DS1_wfk")
        );
        assert_eq!(
            naming.data_path(&DataFileReference::new(DataRole::Input, 0, "den")),
            PathBuf::from("job/input_data/idat_DEN")
        );
    }

    #[test]
    fn resolve_output_prefers_latest_suffix() {
        let temp = TempDir::new().expect("tempdir should be created");
        let naming = FileNaming::new(temp.path(), "scf");
        for name in ["scf.out", "scf.outC", "scf.outZ"] {
            fs::write(temp.path().join(name), "").expect("output should be written");
        }

        assert_eq!(naming.resolve_output(), temp.path().join("scf.outZ"));
    }

    #[test]
    fn resolve_output_picks_highest_letter_present() {
        let temp = TempDir::new().expect("tempdir should be created");
        for name in ["scf.outA", "scf.outC"] {
            fs::write(temp.path().join(name), "").expect("output should be written");
        }

        assert_eq!(
            resolve_output(&temp.path().join("scf.out")),
            temp.path().join("scf.outC")
        );
    }

    #[test]
    fn resolve_output_falls_back_to_base_name() {
        let temp = TempDir::new().expect("tempdir should be created");
        let naming = FileNaming::new(temp.path(), "scf");
        assert_eq!(naming.resolve_output(), temp.path().join("scf.out"));

        fs::write(temp.path().join("scf.out"), "").expect("output should be written");
        assert_eq!(naming.resolve_output(), temp.path().join("scf.out"));
        assert_eq!(naming.resolve_output(), naming.resolve_output());
    }
}

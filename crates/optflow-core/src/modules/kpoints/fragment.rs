use super::partition::validate_tasks;
use crate::domain::{OptError, OptResult};
use std::path::{Path, PathBuf};

/// File the fragment writes and the input deck includes.
pub const KPT_INCLUDE_FILE: &str = "kpt.in";

const SPLIT_TEMPLATE: &str = r#"ln -nfs "@SOURCE@"
#k-points read from @KPT@ file:
#Basic algebra to select this task's k-points:
ntask=@NTASK@
task=@TASK@
nkpt=`cat @KLIST@ | wc -l`
nk_task=$(($nkpt/$ntask))
if [ $ntask -eq $task ]
then
   nk=$(($nk_task*$task))
   residual=$(($nkpt-$nk))
   me_nk=$(($nk_task+$residual))
else
   me_nk=$nk_task
fi
ik_start=$(($nk_task*($task-1)+1))
ik_end=$(($ik_start+$me_nk-1))
echo Doing kpoints $ik_start to $ik_end

#Write @KPT@ file:
echo kptopt 0 > @KPT@
echo nkpt $me_nk >> @KPT@
echo kpt >> @KPT@
if [ $me_nk -gt 0 ]
then
   sed -n "${ik_start},${ik_end}p" @KLIST@ >> @KPT@
fi
"#;

const SINGLE_TEMPLATE: &str = r#"#k-points read from @KPT@ file:
ln -nfs "@SOURCE@"
echo kptopt 0 > @KPT@
echo nkpt $(wc -l < @KLIST@) >> @KPT@
echo kpt >> @KPT@
cat @KLIST@ >> @KPT@
"#;

/// `<prefix>.klist_<n1>x<n2>x<n3>`
pub fn kpoint_list_name(prefix: &str, grid: [u32; 3]) -> String {
    format!("{prefix}.klist_{}x{}x{}", grid[0], grid[1], grid[2])
}

/// Shell fragment that, run inside a job directory, links the k-point
/// list from `source_dir` and writes this task's share of it to
/// `kpt.in`. The line count is read at run time, so the list may be
/// produced after the job is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KpointFragment {
    list_name: String,
    source_dir: PathBuf,
    task_index: usize,
    task_count: usize,
}

impl KpointFragment {
    pub fn new(
        list_name: impl Into<String>,
        source_dir: impl Into<PathBuf>,
        task_index: usize,
        task_count: usize,
    ) -> OptResult<Self> {
        validate_tasks(task_index, task_count)?;
        let list_name = list_name.into();
        if list_name.is_empty() || list_name.contains(['/', '\\', ' ']) {
            return Err(OptError::configuration(
                "CONFIG.KPOINT_LIST_NAME",
                format!("invalid k-point list name '{list_name}'"),
            ));
        }
        Ok(Self {
            list_name,
            source_dir: source_dir.into(),
            task_index,
            task_count,
        })
    }

    pub fn list_name(&self) -> &str {
        &self.list_name
    }

    pub fn task_index(&self) -> usize {
        self.task_index
    }

    pub fn task_count(&self) -> usize {
        self.task_count
    }

    pub fn source_path(&self) -> PathBuf {
        self.source_dir.join(&self.list_name)
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn render(&self) -> OptResult<String> {
        let source = self.source_path().display().to_string();
        let ntask = self.task_count.to_string();
        let task = self.task_index.to_string();
        let slots = [
            ("SOURCE", source.as_str()),
            ("KLIST", self.list_name.as_str()),
            ("KPT", KPT_INCLUDE_FILE),
            ("NTASK", ntask.as_str()),
            ("TASK", task.as_str()),
        ];
        let template = if self.task_count == 1 {
            SINGLE_TEMPLATE
        } else {
            SPLIT_TEMPLATE
        };
        fill_template(template, &slots)
    }
}

/// Replaces every `@NAME@` slot; a slot left without a value is an
/// internal error.
fn fill_template(template: &str, slots: &[(&str, &str)]) -> OptResult<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('@') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after.find('@').ok_or_else(|| {
            OptError::internal("RUN.TEMPLATE", "unterminated slot in shell template")
        })?;
        let name = &after[..close];
        let value = slots
            .iter()
            .find(|(slot, _)| *slot == name)
            .map(|(_, value)| *value)
            .ok_or_else(|| {
                OptError::internal(
                    "RUN.TEMPLATE",
                    format!("no value for template slot '{name}'"),
                )
            })?;
        out.push_str(value);
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

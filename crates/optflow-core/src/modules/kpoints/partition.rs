use crate::domain::{OptError, OptResult};
use std::ops::RangeInclusive;

/// The slice of an ordered k-point list handled by one of `task_count`
/// independent tasks.
///
/// Every task but the last gets `total / task_count` points; the last task
/// also takes the remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KpointPartition {
    total: usize,
    task_index: usize,
    task_count: usize,
}

impl KpointPartition {
    pub fn new(total: usize, task_index: usize, task_count: usize) -> OptResult<Self> {
        validate_tasks(task_index, task_count)?;
        if total == 0 {
            return Err(OptError::configuration(
                "CONFIG.KPOINT_TOTAL",
                "k-point list is empty",
            ));
        }
        Ok(Self {
            total,
            task_index,
            task_count,
        })
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn task_index(&self) -> usize {
        self.task_index
    }

    pub fn task_count(&self) -> usize {
        self.task_count
    }

    pub fn is_last(&self) -> bool {
        self.task_index == self.task_count
    }

    /// Points per task before the remainder is added.
    pub fn base(&self) -> usize {
        self.total / self.task_count
    }

    pub fn remainder(&self) -> usize {
        self.total - self.base() * self.task_count
    }

    pub fn len(&self) -> usize {
        if self.is_last() {
            self.base() + self.remainder()
        } else {
            self.base()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 1-based first line of this task's slice.
    pub fn start(&self) -> usize {
        self.base() * (self.task_index - 1) + 1
    }

    /// 1-based last line (inclusive); `start - 1` when the slice is empty.
    pub fn end(&self) -> usize {
        self.start() + self.len() - 1
    }

    pub fn range(&self) -> RangeInclusive<usize> {
        self.start()..=self.end()
    }
}

/// Partitions for every task, in task order.
pub fn partition_all(total: usize, task_count: usize) -> OptResult<Vec<KpointPartition>> {
    (1..=task_count.max(1))
        .map(|task_index| KpointPartition::new(total, task_index, task_count))
        .collect()
}

pub(crate) fn validate_tasks(task_index: usize, task_count: usize) -> OptResult<()> {
    if task_count == 0 {
        return Err(OptError::configuration(
            "CONFIG.TASK_COUNT",
            "task count must be at least 1",
        ));
    }
    if task_index == 0 || task_index > task_count {
        return Err(OptError::configuration(
            "CONFIG.TASK_INDEX",
            format!("task index {task_index} is outside 1..={task_count}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{KpointPartition, partition_all};

    #[test]
    fn hundred_points_over_three_tasks() {
        let parts = partition_all(100, 3).expect("partitions");
        let ranges: Vec<_> = parts.iter().map(KpointPartition::range).collect();

        assert_eq!(ranges, vec![1..=33, 34..=66, 67..=100]);
        assert_eq!(parts.iter().map(KpointPartition::len).sum::<usize>(), 100);
    }

    #[test]
    fn partitions_cover_every_point_exactly_once() {
        for total in 1..=60 {
            for task_count in 1..=12 {
                let parts = partition_all(total, task_count).expect("partitions");
                let covered: Vec<usize> = parts.iter().flat_map(KpointPartition::range).collect();

                assert_eq!(
                    covered,
                    (1..=total).collect::<Vec<_>>(),
                    "total={total} tasks={task_count}"
                );
                for part in &parts[..task_count - 1] {
                    assert_eq!(part.len(), total / task_count);
                }
            }
        }
    }

    #[test]
    fn remainder_goes_to_last_task_only() {
        let last = KpointPartition::new(10, 4, 4).expect("partition");
        assert_eq!(last.base(), 2);
        assert_eq!(last.remainder(), 2);
        assert_eq!(last.len(), 4);
        assert_eq!(last.range(), 7..=10);

        let first = KpointPartition::new(10, 1, 4).expect("partition");
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn fewer_points_than_tasks_leaves_early_tasks_empty() {
        let early = KpointPartition::new(2, 1, 3).expect("partition");
        assert!(early.is_empty());
        assert_eq!(early.range().count(), 0);

        let last = KpointPartition::new(2, 3, 3).expect("partition");
        assert_eq!(last.range(), 1..=2);
    }

    #[test]
    fn invalid_task_arguments_are_configuration_errors() {
        assert_eq!(
            KpointPartition::new(10, 1, 0).expect_err("zero tasks").placeholder(),
            "CONFIG.TASK_COUNT"
        );
        assert_eq!(
            KpointPartition::new(10, 0, 2).expect_err("zero index").placeholder(),
            "CONFIG.TASK_INDEX"
        );
        assert_eq!(
            KpointPartition::new(10, 3, 2).expect_err("index past count").placeholder(),
            "CONFIG.TASK_INDEX"
        );
        assert_eq!(
            KpointPartition::new(0, 1, 1).expect_err("empty list").placeholder(),
            "CONFIG.KPOINT_TOTAL"
        );
    }
}

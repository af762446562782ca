use thiserror::Error;
use tracing::{debug, error, info};

use crate::pipeline::progress::Progress;

type Action<'a, C> = Box<dyn FnMut(&mut C, &mut TaskControl) -> anyhow::Result<()> + 'a>;
type Predicate<'a, C> = Box<dyn Fn(&C) -> bool + 'a>;

/// A named step of a pipeline
pub struct Task<'a, C> {
    title: String,
    action: Action<'a, C>,
    enabled: Option<Predicate<'a, C>>,
}

impl<'a, C> Task<'a, C> {
    pub fn new<F>(title: impl Into<String>, action: F) -> Self
    where
        F: FnMut(&mut C, &mut TaskControl) -> anyhow::Result<()> + 'a,
    {
        Self {
            title: title.into(),
            action: Box::new(action),
            enabled: None,
        }
    }

    /// Only run this task when `predicate` holds for the context at the moment the task is reached
    pub fn enabled_when<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&C) -> bool + 'a,
    {
        self.enabled = Some(Box::new(predicate));
        self
    }

    fn is_enabled(&self, ctx: &C) -> bool {
        self.enabled.as_ref().map_or(true, |predicate| predicate(ctx))
    }
}

/// Handle given to a running task
#[derive(Debug, Default)]
pub struct TaskControl {
    skipped: Option<String>,
}

impl TaskControl {
    /// Mark the current task as skipped. The pipeline carries on.
    pub fn skip(&mut self, reason: impl Into<String>) {
        self.skipped = Some(reason.into());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Completed,
    Skipped { reason: String },
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub title: String,
    pub status: TaskStatus,
}

/// Outcome of every task reached by a pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub records: Vec<TaskRecord>,
}

impl PipelineReport {
    /// Titles of tasks whose action actually ran
    pub fn executed(&self) -> Vec<&str> {
        self.records
            .iter()
            .filter(|r| r.status != TaskStatus::Disabled)
            .map(|r| r.title.as_str())
            .collect()
    }
}

#[derive(Error, Debug)]
#[error("task {position} \"{title}\" failed")]
pub struct PipelineError {
    pub title: String,
    pub position: usize,
    pub report: PipelineReport,
    #[source]
    pub source: anyhow::Error,
}

/// Ordered list of tasks sharing one context
pub struct Pipeline<'a, C> {
    tasks: Vec<Task<'a, C>>,
}

impl<'a, C> Default for Pipeline<'a, C> {
    fn default() -> Self {
        Self { tasks: Vec::new() }
    }
}

impl<'a, C> Pipeline<'a, C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, task: Task<'a, C>) -> &mut Self {
        self.tasks.push(task);
        self
    }

    /// Run every enabled task in order. The first failing task stops the run.
    pub fn run(self, ctx: &mut C, progress: &mut dyn Progress) -> Result<PipelineReport, PipelineError> {
        let mut report = PipelineReport::default();

        for (position, mut task) in self.tasks.into_iter().enumerate() {
            if !task.is_enabled(ctx) {
                debug!(task = %task.title, "task disabled");
                report.records.push(TaskRecord {
                    title: task.title,
                    status: TaskStatus::Disabled,
                });
                continue;
            }

            progress.started(&task.title);
            let mut control = TaskControl::default();

            if let Err(source) = (task.action)(&mut *ctx, &mut control) {
                error!(task = %task.title, error = %source, "task failed");
                progress.failed(&task.title, &source);
                return Err(PipelineError {
                    title: task.title,
                    position,
                    report,
                    source,
                });
            }

            let status = match control.skipped {
                Some(reason) => {
                    info!(task = %task.title, %reason, "task skipped");
                    TaskStatus::Skipped { reason }
                }
                None => {
                    debug!(task = %task.title, "task completed");
                    TaskStatus::Completed
                }
            };
            progress.finished(&task.title, &status);
            report.records.push(TaskRecord {
                title: task.title,
                status,
            });
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::progress::Silent;
    use anyhow::bail;

    #[derive(Default)]
    struct Counter {
        steps: Vec<&'static str>,
        flag: bool,
    }

    #[test]
    fn test_runs_tasks_in_order() {
        let mut pipeline = Pipeline::new();
        pipeline
            .push(Task::new("a", |ctx: &mut Counter, _| {
                ctx.steps.push("a");
                Ok(())
            }))
            .push(Task::new("b", |ctx: &mut Counter, _| {
                ctx.steps.push("b");
                Ok(())
            }));

        let mut ctx = Counter::default();
        let report = pipeline.run(&mut ctx, &mut Silent).unwrap();

        assert_eq!(ctx.steps, vec!["a", "b"]);
        assert_eq!(report.executed(), vec!["a", "b"]);
    }

    #[test]
    fn test_failure_stops_later_tasks_and_keeps_partial_state() {
        let mut pipeline = Pipeline::new();
        pipeline
            .push(Task::new("first", |ctx: &mut Counter, _| {
                ctx.steps.push("first");
                Ok(())
            }))
            .push(Task::new("broken", |ctx: &mut Counter, _| {
                ctx.steps.push("broken");
                bail!("disk on fire")
            }))
            .push(Task::new("never", |ctx: &mut Counter, _| {
                ctx.steps.push("never");
                Ok(())
            }));

        let mut ctx = Counter::default();
        let err = pipeline.run(&mut ctx, &mut Silent).unwrap_err();

        assert_eq!(ctx.steps, vec!["first", "broken"]);
        assert_eq!(err.title, "broken");
        assert_eq!(err.position, 1);
        assert_eq!(err.source.to_string(), "disk on fire");
        assert_eq!(err.report.executed(), vec!["first"]);
    }

    #[test]
    fn test_failure_keeps_original_cause() {
        let mut pipeline = Pipeline::new();
        pipeline.push(Task::new("read", |_: &mut Counter, _| {
            std::fs::read_to_string("/definitely/not/here")?;
            Ok(())
        }));

        let err = pipeline.run(&mut Counter::default(), &mut Silent).unwrap_err();
        let io = err.source.downcast_ref::<std::io::Error>().unwrap();
        assert_eq!(io.kind(), std::io::ErrorKind::NotFound);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_disabled_task_is_not_executed() {
        let mut pipeline = Pipeline::new();
        pipeline.push(
            Task::new("off", |ctx: &mut Counter, _| {
                ctx.steps.push("off");
                ctx.flag = true;
                Ok(())
            })
            .enabled_when(|_| false),
        );

        let mut ctx = Counter::default();
        let report = pipeline.run(&mut ctx, &mut Silent).unwrap();

        assert!(ctx.steps.is_empty());
        assert!(!ctx.flag);
        assert!(report.executed().is_empty());
        assert_eq!(report.records[0].status, TaskStatus::Disabled);
    }

    #[test]
    fn test_predicate_sees_earlier_mutations() {
        let mut pipeline = Pipeline::new();
        pipeline
            .push(Task::new("set", |ctx: &mut Counter, _| {
                ctx.flag = true;
                Ok(())
            }))
            .push(
                Task::new("gated", |ctx: &mut Counter, _| {
                    ctx.steps.push("gated");
                    Ok(())
                })
                .enabled_when(|ctx| ctx.flag),
            );

        let mut ctx = Counter::default();
        pipeline.run(&mut ctx, &mut Silent).unwrap();
        assert_eq!(ctx.steps, vec!["gated"]);
    }

    #[test]
    fn test_skip_is_not_a_failure() {
        let mut pipeline = Pipeline::new();
        pipeline
            .push(Task::new("skipper", |_: &mut Counter, control: &mut TaskControl| {
                control.skip("already there");
                Ok(())
            }))
            .push(Task::new("after", |ctx: &mut Counter, _| {
                ctx.steps.push("after");
                Ok(())
            }));

        let mut ctx = Counter::default();
        let report = pipeline.run(&mut ctx, &mut Silent).unwrap();

        assert_eq!(ctx.steps, vec!["after"]);
        assert_eq!(
            report.records[0].status,
            TaskStatus::Skipped { reason: "already there".to_string() }
        );
    }
}

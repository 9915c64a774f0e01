use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, anyhow};
use chrono::{Local, NaiveDate};
use daybook_shared::{LOAD_TASKS_BY_DATE, SAVE_TASK, UPDATE_TASK_STATUS};
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

use crate::backend::Backend;
use crate::config::Config;
use crate::draft::TaskDraft;
use crate::error::StoreError;
use crate::task::{Priority, Task, TaskKey, format_date};

pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of "today" in the user's local time zone.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    pub call_timeout: Duration,
    pub default_priority: Priority,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            call_timeout: DEFAULT_CALL_TIMEOUT,
            default_priority: Priority::default(),
        }
    }
}

impl StoreOptions {
    #[instrument(skip(cfg))]
    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        let mut options = Self::default();

        if let Some(ms) = cfg.get_u64("backend.timeout")? {
            if ms == 0 {
                return Err(anyhow!("backend.timeout must be greater than zero"));
            }
            options.call_timeout = Duration::from_millis(ms);
        }

        if let Some(raw) = cfg.get("form.priority") {
            let value: i64 = raw
                .trim()
                .parse()
                .with_context(|| format!("invalid form.priority value: {raw}"))?;
            options.default_priority = Priority::new(value).context("invalid form.priority")?;
        }

        debug!(?options, "resolved store options");
        Ok(options)
    }
}

/// Tasks for a single date, with O(1) lookup by key.
///
/// A working set is never modified once built; every change produces a new
/// value which replaces the old one in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingSet {
    date: NaiveDate,
    tasks: Vec<Task>,
    index: HashMap<TaskKey, usize>,
}

impl WorkingSet {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            tasks: vec![],
            index: HashMap::new(),
        }
    }

    /// Keeps the first task seen for each key.
    pub fn from_tasks<I>(date: NaiveDate, tasks: I) -> Self
    where
        I: IntoIterator<Item = Task>,
    {
        let mut set = Self::empty(date);
        for task in tasks {
            if set.index.contains_key(&task.key) {
                warn!(key = %task.key, "dropping task with duplicate key");
                continue;
            }
            set.index.insert(task.key.clone(), set.tasks.len());
            set.tasks.push(task);
        }
        set
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, key: &TaskKey) -> Option<&Task> {
        self.index.get(key).map(|&idx| &self.tasks[idx])
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    fn with_completed(&self, key: &TaskKey, completed: bool) -> Option<Self> {
        let &idx = self.index.get(key)?;
        let mut next = self.clone();
        next.tasks[idx].completed = completed;
        Some(next)
    }
}

/// Client-side view of the tasks for today, kept in step with a [`Backend`].
pub struct TaskStore<B, C = LocalClock> {
    backend: B,
    clock: C,
    options: StoreOptions,
    state: watch::Sender<Arc<WorkingSet>>,
}

impl<B: Backend> TaskStore<B, LocalClock> {
    pub fn new(backend: B, options: StoreOptions) -> Self {
        Self::with_clock(backend, LocalClock, options)
    }
}

impl<B: Backend, C: Clock> TaskStore<B, C> {
    pub fn with_clock(backend: B, clock: C, options: StoreOptions) -> Self {
        let (state, _) = watch::channel(Arc::new(WorkingSet::empty(clock.today())));
        Self {
            backend,
            clock,
            options,
            state,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn working_set(&self) -> Arc<WorkingSet> {
        self.state.borrow().clone()
    }

    /// Receiver that observes every replacement of the working set.
    pub fn subscribe(&self) -> watch::Receiver<Arc<WorkingSet>> {
        self.state.subscribe()
    }

    pub fn task(&self, key: &TaskKey) -> Result<Task, StoreError> {
        self.state
            .borrow()
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.clone()))
    }

    pub fn new_draft(&self) -> TaskDraft {
        TaskDraft::new(self.options.default_priority)
    }

    #[instrument(skip(self))]
    pub async fn load_tasks_for_date(
        &mut self,
        date: NaiveDate,
    ) -> Result<Arc<WorkingSet>, StoreError> {
        let wanted = format_date(date);
        let records = self
            .call(LOAD_TASKS_BY_DATE, self.backend.load_tasks_by_date(&wanted))
            .await?;

        let mut tasks = Vec::with_capacity(records.len());
        for record in records {
            let task = Task::try_from(record).map_err(|err| {
                error!(error = %err, "backend returned an invalid task");
                StoreError::Persistence {
                    command: LOAD_TASKS_BY_DATE,
                    source: anyhow::Error::new(err).context("backend returned an invalid task"),
                }
            })?;
            if task.date() != date {
                warn!(key = %task.key, task_date = %task.date(), "ignoring task for another date");
                continue;
            }
            tasks.push(task);
        }

        let set = Arc::new(WorkingSet::from_tasks(date, tasks));
        self.state.send_replace(set.clone());
        info!(count = set.len(), "loaded working set");
        Ok(set)
    }

    pub async fn refresh(&mut self) -> Result<Arc<WorkingSet>, StoreError> {
        let today = self.clock.today();
        self.load_tasks_for_date(today).await
    }

    /// Saves a new task for today and reloads today's tasks from the backend.
    ///
    /// Blank name or body and out-of-range priority are rejected before any
    /// backend call.
    #[instrument(skip(self, name, body), fields(name_len = name.len(), body_len = body.len()))]
    pub async fn create_task(
        &mut self,
        name: &str,
        body: &str,
        priority: i64,
    ) -> Result<TaskKey, StoreError> {
        let today = self.clock.today();
        let task = Priority::new(priority)
            .and_then(|priority| Task::new_pending(name, body, priority, today))
            .inspect_err(|err| warn!(error = %err, "rejected new task"))?;

        let key = task.key.clone();
        self.call(SAVE_TASK, self.backend.save_task(task.to_dto()))
            .await?;
        info!(key = %key, "saved new task");

        self.load_tasks_for_date(today).await?;
        Ok(key)
    }

    pub async fn create_from_draft(&mut self, draft: &TaskDraft) -> Result<TaskKey, StoreError> {
        self.create_task(&draft.name, &draft.body, i64::from(draft.priority.value()))
            .await
    }

    /// Returns `Ok(false)` without touching anything when `key` is not in the
    /// working set. On backend failure the previous working set is restored.
    #[instrument(skip(self, key), fields(key = %key))]
    pub async fn set_completed(
        &mut self,
        key: &TaskKey,
        completed: bool,
    ) -> Result<bool, StoreError> {
        let previous = self.working_set();
        let Some(current) = previous.get(key) else {
            warn!("completion toggle for unknown task ignored");
            return Ok(false);
        };
        if current.completed == completed {
            debug!("completion unchanged");
            return Ok(true);
        }

        let Some(next) = previous.with_completed(key, completed) else {
            return Ok(false);
        };
        self.state.send_replace(Arc::new(next));

        let persisted = self
            .call(
                UPDATE_TASK_STATUS,
                self.backend.update_task_status(key.as_str(), completed),
            )
            .await;
        if let Err(err) = persisted {
            warn!("restoring previous completion state");
            self.state.send_replace(previous);
            return Err(err);
        }

        debug!(completed, "completion persisted");
        Ok(true)
    }

    async fn call<T, F>(&self, command: &'static str, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = anyhow::Result<T>>,
    {
        match tokio::time::timeout(self.options.call_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(source)) => {
                error!(command, error = %format!("{source:#}"), "backend command failed");
                Err(StoreError::Persistence { command, source })
            }
            Err(_) => {
                let timeout = self.options.call_timeout;
                error!(command, ?timeout, "backend command timed out");
                Err(StoreError::Timeout { command, timeout })
            }
        }
    }
}

use std::future::Future;

use anyhow::{Context, anyhow};
use daybook_shared::{
    LOAD_TASKS, LOAD_TASKS_BY_DATE, LoadTasksArgs, LoadTasksByDateArgs, SAVE_TASK, SaveTaskArgs,
    TaskDto, UPDATE_TASK_STATUS, UpdateTaskStatusArgs,
};
use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};

/// Persistence port for tasks.
///
/// `save_task` overwrites an existing record with the same key rather than
/// storing a second copy. `load_tasks_by_date` returns records in no
/// particular order.
pub trait Backend {
    fn save_task(&self, task: TaskDto) -> impl Future<Output = anyhow::Result<()>> + Send;

    fn load_tasks_by_date(
        &self,
        date: &str,
    ) -> impl Future<Output = anyhow::Result<Vec<TaskDto>>> + Send;

    fn update_task_status(
        &self,
        key: &str,
        completed: bool,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;

    /// Every stored task regardless of date. [`crate::TaskStore`] only ever
    /// loads one day; this is the host's list-all command, kept on the port
    /// for history or export views built on top of the store.
    fn load_tasks(&self) -> impl Future<Output = anyhow::Result<Vec<TaskDto>>> + Send;
}

/// Something that can run a named backend command with a JSON argument object,
/// such as a webview `invoke` bridge.
pub trait CommandInvoker {
    fn invoke(
        &self,
        command: &str,
        args: serde_json::Value,
    ) -> impl Future<Output = Result<serde_json::Value, String>> + Send;
}

/// [`Backend`] that speaks the named-command protocol through a [`CommandInvoker`].
#[derive(Debug, Clone)]
pub struct CommandBackend<I> {
    invoker: I,
}

impl<I: CommandInvoker + Sync> CommandBackend<I> {
    pub fn new(invoker: I) -> Self {
        Self { invoker }
    }

    pub fn invoker(&self) -> &I {
        &self.invoker
    }

    async fn call<A, R>(&self, command: &str, args: &A) -> anyhow::Result<R>
    where
        A: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let payload = serde_json::to_value(args)
            .with_context(|| format!("failed to encode args for {command}"))?;
        debug!(command, "invoking backend command");
        let reply = self
            .invoker
            .invoke(command, payload)
            .await
            .map_err(|e| anyhow!("invoke error: {e}"))
            .with_context(|| format!("{command} failed"))?;
        serde_json::from_value(reply).with_context(|| format!("failed to decode {command} reply"))
    }
}

impl<I: CommandInvoker + Sync> Backend for CommandBackend<I> {
    async fn save_task(&self, task: TaskDto) -> anyhow::Result<()> {
        self.call::<_, ()>(SAVE_TASK, &SaveTaskArgs { task }).await
    }

    async fn load_tasks_by_date(&self, date: &str) -> anyhow::Result<Vec<TaskDto>> {
        let args = LoadTasksByDateArgs {
            date: date.to_string(),
        };
        self.call(LOAD_TASKS_BY_DATE, &args).await
    }

    async fn update_task_status(&self, key: &str, completed: bool) -> anyhow::Result<()> {
        let args = UpdateTaskStatusArgs {
            key: key.to_string(),
            completed,
        };
        self.call::<_, ()>(UPDATE_TASK_STATUS, &args).await
    }

    async fn load_tasks(&self) -> anyhow::Result<Vec<TaskDto>> {
        self.call(LOAD_TASKS, &LoadTasksArgs::default()).await
    }
}

/// In-process [`Backend`] keeping records in insertion order.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tasks: Mutex<Vec<TaskDto>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<TaskDto>) -> Self {
        Self {
            tasks: Mutex::new(tasks),
        }
    }

    pub fn snapshot(&self) -> Vec<TaskDto> {
        self.tasks.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.tasks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.lock().is_empty()
    }
}

impl Backend for MemoryBackend {
    #[instrument(skip(self, task), fields(key = %task.key))]
    async fn save_task(&self, task: TaskDto) -> anyhow::Result<()> {
        let mut tasks = self.tasks.lock();
        if let Some(existing) = tasks.iter_mut().find(|t| t.key == task.key) {
            debug!("overwriting existing task");
            *existing = task;
        } else {
            tasks.push(task);
        }
        info!(count = tasks.len(), "saved task");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn load_tasks_by_date(&self, date: &str) -> anyhow::Result<Vec<TaskDto>> {
        let found: Vec<TaskDto> = self
            .tasks
            .lock()
            .iter()
            .filter(|t| t.date == date)
            .cloned()
            .collect();
        debug!(count = found.len(), "loaded tasks for date");
        Ok(found)
    }

    #[instrument(skip(self))]
    async fn update_task_status(&self, key: &str, completed: bool) -> anyhow::Result<()> {
        let mut tasks = self.tasks.lock();
        let task = tasks
            .iter_mut()
            .find(|t| t.key == key)
            .ok_or_else(|| anyhow!("task not found: {key}"))?;
        task.completed = completed;
        Ok(())
    }

    async fn load_tasks(&self) -> anyhow::Result<Vec<TaskDto>> {
        Ok(self.snapshot())
    }
}

//! Client-side core of a single-user, date-scoped to-do list.
//!
//! [`store::TaskStore`] keeps today's tasks in step with a [`backend::Backend`];
//! [`view`] turns the current working set into the lists a UI shows.

pub mod backend;
pub mod config;
pub mod draft;
pub mod error;
pub mod logging;
pub mod store;
pub mod task;
pub mod view;

use std::path::Path;

use anyhow::Context;
use tracing::info;

pub use backend::{Backend, CommandBackend, CommandInvoker, MemoryBackend};
pub use error::StoreError;
pub use store::{Clock, FixedClock, LocalClock, StoreOptions, TaskStore, WorkingSet};
pub use task::{Priority, Task, TaskKey, ValidationError};

/// Loads the daybookrc (explicit path, `DAYBOOKRC`, or `~/.daybookrc`), layers
/// `overrides` on top (keys may carry an `rc.` prefix), and builds a store over
/// `backend` with the resulting options.
#[tracing::instrument(skip_all)]
pub fn open_store<B, I>(
    backend: B,
    rc_override: Option<&Path>,
    overrides: I,
) -> anyhow::Result<TaskStore<B>>
where
    B: Backend,
    I: IntoIterator<Item = (String, String)>,
{
    let mut cfg = config::Config::load(rc_override)?;
    cfg.apply_overrides(overrides);
    let options = StoreOptions::from_config(&cfg).with_context(|| {
        format!(
            "invalid store settings in {:?}",
            cfg.loaded_files
        )
    })?;

    info!(
        timeout_ms = options.call_timeout.as_millis() as u64,
        default_priority = %options.default_priority,
        "opened task store"
    );
    Ok(TaskStore::new(backend, options))
}

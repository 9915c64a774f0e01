//! Wire types exchanged with the task
//! backend.
//!
//! Every backend operation is a named
//! command taking a JSON object of
//! arguments. The structs here are those
//! argument objects and the records that
//! come back.

use serde::{
  Deserialize,
  Serialize
};

pub const SAVE_TASK: &str = "save_task";
pub const LOAD_TASKS_BY_DATE: &str =
  "load_tasks_by_date";
pub const LOAD_TASKS: &str =
  "load_tasks";
pub const UPDATE_TASK_STATUS: &str =
  "update_task_status";

/// A task as stored by the backend.
///
/// `date` is `YYYY-MM-DD`. `priority` is
/// kept signed so that out-of-range
/// values from a misbehaving backend can
/// still be decoded and rejected by the
/// caller.
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct TaskDto {
  pub key:       String,
  pub name:      String,
  #[serde(default)]
  pub body:      String,
  pub priority:  i8,
  pub date:      String,
  #[serde(default)]
  pub completed: bool
}

#[derive(
  Debug, Clone, Serialize, Deserialize,
)]
pub struct SaveTaskArgs {
  pub task: TaskDto
}

#[derive(
  Debug, Clone, Serialize, Deserialize,
)]
pub struct LoadTasksByDateArgs {
  pub date: String
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  Default,
)]
pub struct LoadTasksArgs {}

#[derive(
  Debug, Clone, Serialize, Deserialize,
)]
pub struct UpdateTaskStatusArgs {
  pub key:       String,
  pub completed: bool
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn task_dto_uses_flat_field_names() {
    let dto = TaskDto {
      key:       "k1".to_string(),
      name:      "Buy milk".to_string(),
      body:      "2%".to_string(),
      priority:  0,
      date:      "2026-10-16".to_string(),
      completed: false
    };

    let value = serde_json::to_value(
      SaveTaskArgs {
        task: dto
      }
    )
    .expect("serialize");

    assert_eq!(
      value,
      json!({
        "task": {
          "key": "k1",
          "name": "Buy milk",
          "body": "2%",
          "priority": 0,
          "date": "2026-10-16",
          "completed": false
        }
      })
    );
  }

  #[test]
  fn missing_body_and_completed_default()
  {
    let dto: TaskDto =
      serde_json::from_value(json!({
        "key": "a",
        "name": "n",
        "priority": 3,
        "date": "2026-01-02"
      }))
      .expect("deserialize");

    assert_eq!(dto.body, "");
    assert!(!dto.completed);
  }

  #[test]
  fn load_tasks_args_is_an_empty_object()
  {
    let value = serde_json::to_value(
      LoadTasksArgs::default()
    )
    .expect("serialize");
    assert_eq!(value, json!({}));
  }
}
